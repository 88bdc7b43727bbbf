//! Client configuration: node list, VM choice, polling budget and default
//! transaction parameters.
//!
//! The on-disk format is the one used by STRATO application configs:
//!
//! ```yaml
//! apiDebug: true
//! timeout: 600000
//! VM: SolidVM
//! nodes:
//!   - id: 0
//!     url: "http://localhost:8080"
//! ```

use crate::error::Result;
use crate::transactions::TxParams;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default polling budget in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// OAuth provider settings of a node.
///
/// Carried through untouched: token acquisition is up to the application,
/// which hands the resulting bearer token to [`User`](crate::options::User).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// Discovery document URL
    #[serde(rename = "openIdDiscoveryUrl", skip_serializing_if = "Option::is_none")]
    pub open_id_discovery_url: Option<String>,
    /// OAuth client id
    #[serde(rename = "clientId", skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// OAuth client secret
    #[serde(rename = "clientSecret", skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    /// Name of the token response field to use
    #[serde(rename = "tokenField", skip_serializing_if = "Option::is_none")]
    pub token_field: Option<String>,
}

/// Single STRATO node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Node label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    /// API base url
    pub url: Url,
    /// OAuth provider of this node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth: Option<OAuthConfig>,
}

/// Application-wide settings shared by all calls.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Available nodes; [`Options::node`](crate::options::Options::node) indexes into it.
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,
    /// Contract VM. Kept raw: it is validated per call.
    #[serde(rename = "VM", default, skip_serializing_if = "Option::is_none")]
    pub vm: Option<String>,
    /// Polling budget in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Transaction parameters applied to every transaction body
    #[serde(rename = "txParams", default, skip_serializing_if = "Option::is_none")]
    pub tx_params: Option<TxParams>,
    /// Log every request at `debug` level instead of `trace`.
    #[serde(rename = "apiDebug", default)]
    pub api_debug: bool,
}

impl Config {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        //! Parse a YAML config.
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        //! Parse a JSON config.
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        //! Read a config file. `.json` files are parsed as JSON,
        //! anything else as YAML.
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            _ => Self::from_yaml_str(&contents),
        }
    }

    #[must_use]
    pub fn with_node(mut self, url: Url) -> Self {
        //! Append a node without OAuth settings.
        let id = u32::try_from(self.nodes.len()).ok();
        self.nodes.push(NodeConfig {
            id,
            url,
            oauth: None,
        });
        self
    }

    #[must_use]
    pub fn with_vm(mut self, vm: impl Into<String>) -> Self {
        //! Select contract VM.
        self.vm = Some(vm.into());
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        //! Set polling budget.
        self.timeout = Some(timeout_ms);
        self
    }

    #[must_use]
    pub const fn with_tx_params(mut self, tx_params: TxParams) -> Self {
        //! Set config-level transaction parameters.
        self.tx_params = Some(tx_params);
        self
    }

    pub fn timeout_ms(&self) -> u64 {
        //! Polling budget, falling back to [`DEFAULT_TIMEOUT_MS`].
        self.timeout.unwrap_or(DEFAULT_TIMEOUT_MS)
    }
}
