//! # Connection Configuration
//!
//! The connection record this crate consumes. Loading it (files, environment,
//! a DI container) is the embedding application's business; the client only
//! needs the five fields.

use serde::{Deserialize, Serialize};

/// Connection details for one Odoo instance.
///
/// `url` and `port` are what a transport implementation needs to address the
/// `{url}/xmlrpc/{kind}` endpoints; the remaining fields feed the login call.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub url: String,
    #[serde(default = "default_port")]
    pub port: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

fn default_port() -> String {
    "443".to_string()
}
