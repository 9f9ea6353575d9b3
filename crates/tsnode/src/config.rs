//! app defaults and named nodes
//!
//! ```caddyfile
//! {
//!     tailscale {
//!         auth_key tskey-default
//!         ephemeral
//!
//!         edge {
//!             hostname edge-proxy
//!             tags tag:edge
//!         }
//!     }
//! }
//! ```
//!
//! Everything directly inside the `tailscale` block sets an [App] default. Any other name opens a
//! named [Node] block.
use crate::caddyfile::Dispenser;
use crate::error::ParseError;
use crate::options::{self, Keyword, OptionTarget, Setting};
use crate::tristate::TriState;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Name of the app entry in the host configuration (and of the global option)
pub const APP_NAME: &str = "tailscale";

/// Process-wide defaults and named node overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct App {
    /// used by every node that has no auth key of its own
    #[serde(rename = "auth_key", default, skip_serializing_if = "String::is_empty")]
    pub default_auth_key: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub control_url: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub ephemeral: bool,

    /// parent directory; each node keeps its state in a subdirectory
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub state_dir: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub webui: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// in declaration order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub nodes: IndexMap<String, Node>,
}

/// Settings of one node
///
/// [TriState] flags stay `Unset` unless given at this layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub auth_key: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub control_url: String,

    #[serde(default, skip_serializing_if = "TriState::is_unset")]
    pub ephemeral: TriState,

    #[serde(default, skip_serializing_if = "TriState::is_unset")]
    pub webui: TriState,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hostname: String,

    /// 0 means unset
    #[serde(default, skip_serializing_if = "is_zero")]
    pub port: u16,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub state_dir: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// map / registry key
    #[serde(skip)]
    pub(crate) name: String,
}

fn is_zero(value: &u16) -> bool {
    *value == 0
}

impl Node {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl OptionTarget for Node {
    fn accepts(&self, _keyword: Keyword) -> bool {
        true
    }

    fn apply(&mut self, setting: Setting) {
        match setting {
            Setting::AuthKey(value) => self.auth_key = value,
            Setting::ControlUrl(value) => self.control_url = value,
            Setting::Ephemeral(value) => self.ephemeral = value.into(),
            Setting::Hostname(value) => self.hostname = value,
            Setting::Port(value) => self.port = value,
            Setting::StateDir(value) => self.state_dir = value,
            Setting::WebUi(value) => self.webui = value.into(),
            Setting::Tags(tags) => self.tags.extend(tags),
        }
    }
}

impl OptionTarget for App {
    /// `hostname` and `port` only make sense per node
    fn accepts(&self, keyword: Keyword) -> bool {
        !matches!(keyword, Keyword::Hostname | Keyword::Port)
    }

    fn apply(&mut self, setting: Setting) {
        match setting {
            Setting::AuthKey(value) => self.default_auth_key = value,
            Setting::ControlUrl(value) => self.control_url = value,
            Setting::Ephemeral(value) => self.ephemeral = value,
            Setting::StateDir(value) => self.state_dir = value,
            Setting::WebUi(value) => self.webui = value,
            Setting::Tags(tags) => self.tags.extend(tags),
            // never produced for an App, `accepts` rejects both keywords
            Setting::Hostname(_) | Setting::Port(_) => {}
        }
    }
}

impl App {
    /// Decode an app entry, restoring each node's name from its key
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let mut app: App = serde_json::from_str(json)?;
        for (name, node) in app.nodes.iter_mut() {
            node.name.clone_from(name);
        }
        Ok(app)
    }

    /// The host configuration entry for this app
    pub fn entry(&self) -> serde_json::Result<AppEntry> {
        Ok(AppEntry {
            name: APP_NAME,
            value: serde_json::to_value(self)?,
        })
    }
}

/// App registration in the host configuration document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppEntry {
    pub name: &'static str,
    pub value: serde_json::Value,
}

/// Parse the `tailscale` global option
///
/// `d` holds the option's segment; its first token is the option name.
pub fn parse_app_config(d: &mut Dispenser) -> Result<App, ParseError> {
    let mut app = App::default();
    if !d.next() {
        return Err(d.arg_err());
    }

    parse_app_options(d, &mut app)?;
    Ok(app)
}

/// App defaults first, anything else is a named node block
pub fn parse_app_options(d: &mut Dispenser, app: &mut App) -> Result<(), ParseError> {
    while d.next_block(0) {
        if let Some(keyword) = options::recognize(d.val(), &*app) {
            let setting = options::parse_setting(d, keyword)?;
            app.apply(setting);
            continue;
        }

        let node = parse_named_node(d)?;
        if app.nodes.contains_key(&node.name) {
            tracing::debug!(node = %node.name, "named node declared again, replacing");
        }
        app.nodes.insert(node.name.clone(), node);
    }
    Ok(())
}

/// Parse `<name> { ... }` with the cursor on `<name>`
pub fn parse_named_node(d: &mut Dispenser) -> Result<Node, ParseError> {
    let name = d.val().to_string();
    if !d.opens_block() {
        return Err(d.arg_err());
    }

    let mut segment = d.new_from_next_segment();
    if !segment.next() {
        return Err(d.arg_err());
    }

    let mut node = Node::named(name);
    options::parse_options(&mut segment, &mut node)?;
    tracing::debug!(node = %node.name, "parsed named node");

    Ok(node)
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_app(input: &str) -> Result<App, ParseError> {
        let mut d = Dispenser::parse(input, None)?;
        parse_app_config(&mut d)
    }

    #[test]
    fn app_defaults() {
        let app = parse_app(
            "tailscale {
                auth_key tskey-default
                control_url https://ctl.example
                ephemeral
                state_dir /var/lib/ts
                webui false
                tags tag:a tag:b
            }",
        )
        .unwrap();

        assert_eq!(
            app,
            App {
                default_auth_key: "tskey-default".into(),
                control_url: "https://ctl.example".into(),
                ephemeral: true,
                state_dir: "/var/lib/ts".into(),
                webui: false,
                tags: vec!["tag:a".into(), "tag:b".into()],
                nodes: IndexMap::new(),
            }
        );
    }

    #[test]
    fn no_block_means_no_nodes() {
        let app = parse_app("tailscale").unwrap();
        assert!(app.nodes.is_empty());
    }

    #[test]
    fn named_nodes() {
        let app = parse_app(
            "tailscale {
                webui
                node1 {
                    hostname h1
                    port 8443
                }
                node2 {
                }
            }",
        )
        .unwrap();

        assert!(app.webui);
        assert_eq!(app.nodes.keys().collect::<Vec<_>>(), vec!["node1", "node2"]);

        let node1 = &app.nodes["node1"];
        assert_eq!(node1.name(), "node1");
        assert_eq!(node1.hostname, "h1");
        assert_eq!(node1.port, 8443);
        assert_eq!(node1.webui, TriState::Unset);

        assert_eq!(app.nodes["node2"], Node::named("node2"));
    }

    #[test]
    fn named_node_collision_last_wins() {
        let app = parse_app(
            "tailscale {
                edge {
                    hostname first
                }
                edge {
                    hostname second
                }
            }",
        )
        .unwrap();

        assert_eq!(app.nodes.len(), 1);
        assert_eq!(app.nodes["edge"].hostname, "second");
    }

    #[test]
    fn node_only_keywords_open_node_blocks() {
        // at app level `hostname` is not an option, so it names a node that lacks a body
        let err = parse_app("tailscale {\n  hostname h1\n}").unwrap_err();
        assert!(matches!(err, ParseError::ArgMissing { ref token, .. } if token == "hostname"));
    }

    #[test]
    fn app_vocabulary_excludes_node_keywords() {
        let app = App::default();
        assert_eq!(options::recognize("hostname", &app), None);
        assert_eq!(options::recognize("port", &app), None);
        assert_eq!(options::recognize("webui", &app), Some(Keyword::WebUi));
        assert_eq!(options::recognize("port", &Node::default()), Some(Keyword::Port));
    }

    #[test]
    fn named_node_without_body() {
        let err = parse_app("tailscale {\n  lonely\n}").unwrap_err();
        assert!(matches!(err, ParseError::ArgMissing { .. }));
        assert_eq!(err.location().line, 2);
    }

    #[test]
    fn errors_inside_named_node() {
        let err = parse_app("tailscale {\n  edge {\n    bogus 1\n  }\n}").unwrap_err();
        assert_eq!(err.to_string(), "Caddyfile:3: unrecognized subdirective: bogus");
    }

    #[test]
    fn json_field_names() {
        let app = parse_app(
            "tailscale {
                auth_key k
                ephemeral
                node1 {
                    webui false
                    port 80
                }
            }",
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&app).unwrap(),
            serde_json::json!({
                "auth_key": "k",
                "ephemeral": true,
                "nodes": {
                    "node1": { "webui": false, "port": 80 }
                }
            })
        );
    }

    #[test]
    fn from_json_restores_names() {
        let app = App::from_json(r#"{"nodes": {"edge": {"hostname": "e", "ephemeral": "true"}}}"#)
            .unwrap();
        assert_eq!(app.nodes["edge"].name(), "edge");
        assert_eq!(app.nodes["edge"].ephemeral, TriState::True);
    }

    #[test]
    fn entry_is_named_tailscale() {
        let entry = App::default().entry().unwrap();
        assert_eq!(entry.name, "tailscale");
        assert_eq!(entry.value, serde_json::json!({}));
    }
}
