//! load a Caddyfile and provision its site directives
use crate::caddyfile::{parse_document, tokenize, Dispenser, Helper, Source};
use crate::config::{parse_app_config, App, AppEntry, APP_NAME};
use crate::directive::{parse_directive, Directive, DIRECTIVE_NAME};
use crate::error::{LoadError, ParseError};
use crate::site_configs::SiteConfigs;
use indexmap::IndexMap;
use std::path::Path;

/// Result of the parse phase
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Loaded {
    /// defaults when the global options lack a `tailscale` option
    pub app: App,
    /// in document order
    pub directives: Vec<Directive>,
}

impl Loaded {
    /// Parse the `tailscale` global option and every `tailscale` site directive
    #[tracing::instrument(level = "debug", skip(input))]
    pub fn parse(input: &str, source: Source) -> Result<Self, ParseError> {
        let blocks = parse_document(tokenize(input, source)?)?;
        let mut loaded = Loaded::default();
        let mut app_seen = false;

        for block in &blocks {
            if block.is_global_options() {
                for segment in &block.segments {
                    let mut d = Dispenser::new(segment.clone());
                    if segment.first().map(|token| token.text.as_str()) != Some(APP_NAME) {
                        d.next();
                        tracing::debug!(option = d.val(), "ignoring global option");
                        continue;
                    }

                    if app_seen {
                        d.next();
                        return Err(d.errf(format_args!(
                            "global option '{APP_NAME}' specified more than once"
                        )));
                    }
                    loaded.app = parse_app_config(&mut d)?;
                    app_seen = true;
                }
                continue;
            }

            for segment in block.segments_named(DIRECTIVE_NAME) {
                let mut helper = Helper::new(Dispenser::new(segment.clone()), &block.keys);
                loaded.directives.push(parse_directive(&mut helper)?);
            }
        }

        tracing::debug!(
            nodes = loaded.app.nodes.len(),
            directives = loaded.directives.len(),
            "configuration parsed"
        );
        Ok(loaded)
    }

    /// The directive that decides each node name: the last one in document order
    pub fn winners(&self) -> IndexMap<&str, &Directive> {
        let mut winners = IndexMap::new();
        for directive in &self.directives {
            let name = directive.effective_node_name();
            if winners.insert(name, directive).is_some() {
                tracing::debug!(node = name, "node declared by several sites, later site wins");
            }
        }
        winners
    }

    /// Publish the winning directive of every node name, each from its own thread
    pub fn provision(&self, site_configs: &SiteConfigs) {
        let winners = self.winners();
        std::thread::scope(|scope| {
            for directive in winners.values().copied() {
                scope.spawn(move || directive.provision(site_configs));
            }
        });
    }

    /// Replace whatever a previous load provisioned with this one, in a single step
    pub fn reprovision(&self, site_configs: &SiteConfigs) {
        let nodes = self
            .winners()
            .into_values()
            .map(|directive| {
                let node = directive.to_node();
                (node.name().to_string(), node)
            })
            .collect();
        site_configs.replace_all(nodes);
    }

    pub fn app_entry(&self) -> serde_json::Result<AppEntry> {
        self.app.entry()
    }
}

pub fn load_file(path: &Path) -> Result<Loaded, LoadError> {
    let path = path.canonicalize()?;
    tracing::info!(path=%path.display(), "loading file");

    let contents = std::fs::read_to_string(&path)?;
    Ok(Loaded::parse(&contents, Some(path.into()))?)
}
