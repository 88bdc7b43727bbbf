//! Per-call options.
//!
//! [`Options`] is a value object: every `with_*` builder consumes the value
//! and returns a new one, and helpers taking `&Options` hand back a fresh
//! copy. A base [`Options`] can therefore be shared between concurrent calls.

use crate::address::Address;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::transactions::TxParams;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

/// Authenticated API user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Bearer token issued by the node's OAuth provider
    pub token: String,
    /// Username, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// On-chain address, once a key was created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

impl User {
    pub fn new(token: impl Into<String>) -> Self {
        //! User authenticated with given token.
        Self {
            token: token.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_address(mut self, address: Address) -> Self {
        //! Attach a known address.
        self.address = Some(address);
        self
    }
}

/// Paginated contract state read parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StateQuery {
    /// Single state variable to read
    pub name: Option<String>,
    /// First array element to read
    pub offset: Option<u64>,
    /// Number of array elements to read
    pub count: Option<u64>,
    /// Return array length instead of contents
    pub length: bool,
}

impl StateQuery {
    pub(crate) fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![];
        if let Some(name) = &self.name {
            pairs.push(("name", name.clone()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        if let Some(count) = self.count {
            pairs.push(("count", count.to_string()));
        }
        if self.length {
            pairs.push(("length", "true".to_string()));
        }
        pairs
    }
}

/// Options shaping a single API call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Options {
    /// Shared client configuration
    pub config: Arc<Config>,
    /// Index of the target node in `config.nodes`
    pub node: usize,
    /// Extra HTTP headers
    pub headers: IndexMap<String, String>,
    /// Custom query parameters; highest priority in the query string
    pub query: IndexMap<String, String>,
    /// Contract state pagination
    pub state_query: Option<StateQuery>,
    /// Do not wait for transactions to finalize
    pub is_async: bool,
    /// Return full transaction results instead of their contents
    pub is_detailed: bool,
    /// Restrict to given private chains
    pub chain_ids: Vec<String>,
    /// Track history of the contract being created or called
    pub enable_history: bool,
    /// Additional contracts to track history of
    pub history: Option<Vec<String>>,
    /// Set to `Some(false)` to exclude the contract from search indexing
    pub enable_index: Option<bool>,
    /// Additional contracts to exclude from indexing
    pub noindex: Option<Vec<String>>,
    /// Call-level transaction parameters
    pub tx_params: Option<TxParams>,
    /// Submit through the parallel (nonce-caching) endpoint
    pub cache_nonce: bool,
}

impl Options {
    pub fn new(config: impl Into<Arc<Config>>) -> Self {
        //! Options with given config and everything else default.
        Self {
            config: config.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_node(mut self, node: usize) -> Self {
        //! Target another configured node.
        self.node = node;
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        //! Add or replace an HTTP header.
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        //! Add or replace a query parameter.
        self.query.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_query_map(mut self, query: IndexMap<String, String>) -> Self {
        //! Replace all custom query parameters.
        self.query = query;
        self
    }

    #[must_use]
    pub fn with_state_query(mut self, state_query: StateQuery) -> Self {
        //! Set contract state pagination.
        self.state_query = Some(state_query);
        self
    }

    #[must_use]
    pub const fn asynchronous(mut self) -> Self {
        //! Return pending results without waiting for them.
        self.is_async = true;
        self
    }

    #[must_use]
    pub const fn detailed(mut self) -> Self {
        //! Return full transaction results.
        self.is_detailed = true;
        self
    }

    #[must_use]
    pub fn with_chain_id(mut self, chain_id: impl Into<String>) -> Self {
        //! Add a private chain to the chain filter.
        self.chain_ids.push(chain_id.into());
        self
    }

    #[must_use]
    pub fn with_chain_ids(mut self, chain_ids: Vec<String>) -> Self {
        //! Replace the chain filter.
        self.chain_ids = chain_ids;
        self
    }

    #[must_use]
    pub const fn enable_history(mut self) -> Self {
        //! Track history of the contract being created or called.
        self.enable_history = true;
        self
    }

    #[must_use]
    pub fn with_history<I, S>(mut self, contracts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        //! Track history of additional contracts.
        //!
        //! Entries may themselves be comma-separated lists.
        self.history = Some(contracts.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub const fn disable_index(mut self) -> Self {
        //! Exclude the contract from search indexing.
        self.enable_index = Some(false);
        self
    }

    #[must_use]
    pub fn with_noindex<I, S>(mut self, contracts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        //! Exclude additional contracts from search indexing.
        self.noindex = Some(contracts.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub const fn with_tx_params(mut self, tx_params: TxParams) -> Self {
        //! Set call-level transaction parameters.
        self.tx_params = Some(tx_params);
        self
    }

    #[must_use]
    pub const fn cache_nonce(mut self) -> Self {
        //! Submit through the parallel endpoint.
        self.cache_nonce = true;
        self
    }

    pub fn node_url(&self) -> Result<&Url> {
        //! Base url of the selected node.
        self.config
            .nodes
            .get(self.node)
            .map(|node| &node.url)
            .ok_or(Error::NodeLookup {
                index: self.node,
                count: self.config.nodes.len(),
            })
    }

    pub fn timeout_ms(&self) -> u64 {
        //! Polling budget from config.
        self.config.timeout_ms()
    }
}

pub fn set_auth_headers(user: &User, options: &Options) -> Options {
    //! Copy of `options` authenticated as `user`.
    options
        .clone()
        .with_header("Authorization", format!("Bearer {}", user.token))
}
