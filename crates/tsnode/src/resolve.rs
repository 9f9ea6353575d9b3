//! which layer configures a node
//!
//! Precedence, first match wins:
//! 1. a node published by a site directive ([SiteConfigs])
//! 2. a named node block of the app ([App::nodes])
//! 3. the app defaults alone
//!
//! Merging fields of lower layers into the winner is up to the node client.
use crate::config::{App, Node};
use crate::site_configs::SiteConfigs;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", content = "node", rename_all = "snake_case")]
pub enum Resolved<'a> {
    Site(Node),
    Named(&'a Node),
    Defaults(&'a App),
}

impl Resolved<'_> {
    /// The node settings found, `None` when only the defaults apply
    pub fn node(&self) -> Option<&Node> {
        match self {
            Resolved::Site(node) => Some(node),
            Resolved::Named(node) => Some(node),
            Resolved::Defaults(_) => None,
        }
    }
}

pub fn lookup<'a>(name: &str, site_configs: &SiteConfigs, app: &'a App) -> Resolved<'a> {
    if let Some(node) = site_configs.get(name) {
        return Resolved::Site(node);
    }
    if let Some(node) = app.nodes.get(name) {
        return Resolved::Named(node);
    }
    tracing::debug!(node = name, "no node configuration, using app defaults");
    Resolved::Defaults(app)
}
