//! # tsnode - layered tailscale node configuration
//!
//! Reads the `tailscale` configuration out of a Caddyfile and hands the resulting node settings
//! to whatever registers the nodes.
//!
//! ## Introduction for developers
//!
//! Read this to understand how `tsnode` works internally.
//!
//! ### Layers
//!
//! A node's settings can come from three places:
//!
//! ```caddyfile
//! {
//!     tailscale {
//!         # 1. app defaults
//!         auth_key tskey-default
//!         webui
//!
//!         # 2. named node
//!         node1 {
//!             hostname h1
//!         }
//!     }
//! }
//!
//! example.com {
//!     # 3. site directive
//!     tailscale node1 {
//!         port 8443
//!     }
//! }
//! ```
//!
//! - [config::App]: the defaults, plain values
//! - [config::Node]: one named node. Flags are [tristate::TriState] so "not given here" is
//!   distinguishable from "turned off here"
//! - [directive::Directive]: a site's overlay for one node (named `default` when no name is given)
//!
//! Layers are never merged while loading: the site directive above yields a node with *only*
//! `port` set. [resolve::lookup] tells a consumer which layer applies.
//!
//! ### Parsing
//!
//! [caddyfile::tokenize] splits the text into tokens, [caddyfile::parse_document] groups them
//! into server blocks. The first block without addresses holds the global options.
//!
//! The option lines (`auth_key`, `port`, `tags`, ...) are parsed by [options::parse_options]. It
//! is written against the [options::TokenSource] trait and runs on both token sources:
//!
//! - [caddyfile::Dispenser] for the `tailscale` global option ([config::parse_app_config])
//! - [caddyfile::Helper] for site directives ([directive::parse_directive])
//!
//! In the app block a name that is not an option opens a named node block.
//!
//! Any error aborts the whole load.
//!
//! ### Provisioning
//!
//! [loader::Loaded::provision] publishes each directive's node into a
//! [site_configs::SiteConfigs]. For a node name declared by several sites the last site in the
//! document wins. Distinct node names are provisioned concurrently.
//!
//! ### Output
//!
//! [config::App] and [directive::Directive] serialize with [serde] to the JSON the host expects
//! (`auth_key`, `control_url`, `nodes`, `node_name`, ...). Empty fields are omitted.
//!
pub mod caddyfile;
pub mod config;
pub mod directive;
pub mod error;
pub mod loader;
pub mod options;
pub mod resolve;
pub mod site_configs;
pub mod tristate;
