//! the per-site `tailscale` directive
//!
//! ```caddyfile
//! example.com {
//!     tailscale edge {
//!         port 8443
//!     }
//! }
//! ```
//!
//! Parsing happens while the configuration is loaded. Provisioning (a later phase) publishes the
//! directive's node into [SiteConfigs].
use crate::caddyfile::Helper;
use crate::config::Node;
use crate::error::ParseError;
use crate::options::{self, TokenSource};
use crate::site_configs::SiteConfigs;
use serde::{Deserialize, Serialize};

/// Directive name inside site blocks, also the handler name in the host configuration
pub const DIRECTIVE_NAME: &str = "tailscale";

/// Node name used when the directive has no argument
pub const DEFAULT_NODE_NAME: &str = "default";

/// Per-site overlay for one node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub node_name: String,

    #[serde(flatten)]
    pub settings: Node,
}

impl Directive {
    /// The explicit node name, or [DEFAULT_NODE_NAME]
    pub fn effective_node_name(&self) -> &str {
        if self.node_name.is_empty() {
            DEFAULT_NODE_NAME
        } else {
            &self.node_name
        }
    }

    /// The node this directive describes, keyed by its effective name
    ///
    /// Fields not given in the directive stay empty; defaults are not inherited here.
    pub fn to_node(&self) -> Node {
        Node {
            name: self.effective_node_name().to_string(),
            ..self.settings.clone()
        }
    }

    /// Publish this directive's node, replacing any earlier node of the same name
    pub fn provision(&self, site_configs: &SiteConfigs) {
        let node = self.to_node();
        tracing::debug!(node = %node.name(), "provisioning site node");
        site_configs.set(node.name().to_string(), node);
    }

    /// The handler entry for the host configuration
    pub fn handler_entry(&self) -> HandlerEntry<'_> {
        HandlerEntry {
            handler: DIRECTIVE_NAME,
            directive: self,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HandlerEntry<'d> {
    pub handler: &'static str,
    #[serde(flatten)]
    pub directive: &'d Directive,
}

/// Parse a `tailscale [<node name>] [{ ... }]` directive
pub fn parse_directive(h: &mut Helper) -> Result<Directive, ParseError> {
    let mut directive = Directive::default();

    while h.next() {
        if h.next_arg() {
            directive.node_name = h.val().to_string();
        }
        if directive.node_name.is_empty() {
            directive.node_name = DEFAULT_NODE_NAME.to_string();
        }

        // a second argument would hide the block from the option parser
        if h.next_arg() {
            return Err(h.arg_err());
        }

        let mut node = Node::default();
        options::parse_options(h, &mut node)?;
        directive.settings = node;
    }

    tracing::debug!(
        node = %directive.node_name,
        sites = ?h.site_addresses().collect::<Vec<_>>(),
        "parsed site directive"
    );
    Ok(directive)
}
