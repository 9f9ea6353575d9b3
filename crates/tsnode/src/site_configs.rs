//! node configurations published by site directives
//!
//! Sites are provisioned independently (possibly in parallel), the node client reads the result
//! later. [SiteConfigs] is the handover point between the two. It is an ordinary value: whoever
//! owns the loaded configuration owns it and hands out `Arc<SiteConfigs>`.
use crate::config::Node;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Default)]
pub struct SiteConfigs {
    nodes: RwLock<HashMap<String, Node>>,
}

impl SiteConfigs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `node` under `name`, replacing what was there
    pub fn set(&self, name: impl Into<String>, node: Node) {
        let name = name.into();
        if let Some(previous) = self.nodes.write().insert(name, node) {
            tracing::debug!(node = %previous.name(), "site node replaced");
        }
    }

    pub fn get(&self, name: &str) -> Option<Node> {
        self.nodes.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.read().contains_key(name)
    }

    /// Drop every entry, e.g. before provisioning a reloaded configuration
    pub fn clear(&self) {
        let mut nodes = self.nodes.write();
        tracing::debug!(count = nodes.len(), "clearing site nodes");
        nodes.clear();
    }

    /// Swap in a whole new set of entries under one write lock
    ///
    /// Readers see either the old entries or the new ones, never a mix or an empty registry.
    pub fn replace_all(&self, nodes: HashMap<String, Node>) {
        let mut current = self.nodes.write();
        tracing::debug!(old = current.len(), new = nodes.len(), "replacing site nodes");
        *current = nodes;
    }

    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }

    /// Sorted copy of all entries
    pub fn snapshot(&self) -> BTreeMap<String, Node> {
        self.nodes
            .read()
            .iter()
            .map(|(name, node)| (name.clone(), node.clone()))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn node(name: &str, hostname: &str) -> Node {
        Node {
            hostname: hostname.to_string(),
            ..Node::named(name)
        }
    }

    #[test]
    fn last_write_wins() {
        let site_configs = SiteConfigs::new();
        site_configs.set("x", node("x", "a"));
        site_configs.set("x", node("x", "b"));

        assert_eq!(site_configs.len(), 1);
        assert_eq!(site_configs.get("x").unwrap().hostname, "b");
    }

    #[test]
    fn missing_entry() {
        let site_configs = SiteConfigs::new();
        assert_eq!(site_configs.get("nope"), None);
        assert!(!site_configs.contains("nope"));
    }

    #[test]
    fn clear_empties() {
        let site_configs = SiteConfigs::new();
        site_configs.set("x", node("x", "a"));
        site_configs.clear();
        assert!(site_configs.is_empty());
    }

    #[test]
    fn replace_all_swaps_contents() {
        let site_configs = SiteConfigs::new();
        site_configs.set("old", node("old", "a"));

        site_configs.replace_all(HashMap::from([("new".to_string(), node("new", "b"))]));

        assert!(!site_configs.contains("old"));
        assert_eq!(site_configs.get("new").unwrap().hostname, "b");
    }

    #[test]
    fn concurrent_writers_lose_nothing() {
        const WRITERS: usize = 64;
        let site_configs = Arc::new(SiteConfigs::new());

        let handles: Vec<_> = (0..WRITERS)
            .map(|i| {
                let site_configs = Arc::clone(&site_configs);
                std::thread::spawn(move || {
                    let name = format!("node{i}");
                    site_configs.set(name.clone(), node(&name, &format!("host{i}")));
                    // readers run alongside writers
                    site_configs.get(&name).is_some()
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }

        assert_eq!(site_configs.len(), WRITERS);
        for i in 0..WRITERS {
            let node = site_configs.get(&format!("node{i}")).unwrap();
            assert_eq!(node.hostname, format!("host{i}"));
        }
    }

    #[test]
    fn snapshot_is_sorted() {
        let site_configs = SiteConfigs::new();
        site_configs.set("b", node("b", "2"));
        site_configs.set("a", node("a", "1"));
        let names: Vec<_> = site_configs.snapshot().into_keys().collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
