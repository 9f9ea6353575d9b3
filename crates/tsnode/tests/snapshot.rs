//! Snapshot tests
//!
//! Loads each *.caddyfile in /tests/ individually, provisions its site directives and compares
//! the app defaults and the published site nodes.

use std::collections::BTreeMap;
use tsnode::config::{App, Node};

#[derive(serde::Serialize)]
struct Rendered {
    app: App,
    sites: BTreeMap<String, Node>,
}

#[test]
fn snapshots() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("TSNODE_LOG"))
        .with_writer(std::io::stderr)
        .try_init();

    insta::glob!("*.caddyfile", |path| {
        let loaded = tsnode::loader::load_file(path).expect("must be a valid configuration");

        let site_configs = tsnode::site_configs::SiteConfigs::new();
        loaded.provision(&site_configs);

        let rendered = Rendered {
            app: loaded.app,
            sites: site_configs.snapshot(),
        };

        insta::assert_yaml_snapshot!(rendered);
    });
}
