//! Endpoint templates and query string construction.

use crate::options::Options;
use indexmap::IndexMap;
use itertools::Itertools;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters escaped in path parameters and query values.
///
/// Everything except ASCII alphanumerics and `-_.!~*'()`.
const COMPONENT_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Endpoint templates. `:name` segments are placeholders.
pub mod endpoints {
    /// Create a user (url-encoded password)
    pub const USER: &str = "/users/:username";
    /// Faucet
    pub const FILL: &str = "/users/:username/:address/fill";
    /// Key of authenticated user
    pub const KEY: &str = "/key";
    /// Account lookup
    pub const ACCOUNT: &str = "/account";
    /// Transaction submission
    pub const SEND: &str = "/transaction";
    /// Transaction submission with nonce caching
    pub const SEND_PARALLEL: &str = "/transaction/parallel";
    /// Transaction results by hash
    pub const TX_RESULTS: &str = "/transactions/results";
    /// Contract state
    pub const STATE: &str = "/contracts/:name/:address/state";
    /// Solidity compilation
    pub const COMPILE: &str = "/contracts/compile";
    /// Cirrus search
    pub const SEARCH: &str = "/cirrus/search/:name";
    /// Private chain creation and lookup
    pub const CHAIN: &str = "/chain";
    /// Batch private chain creation
    pub const CHAINS: &str = "/chains";
    /// Debugger root
    pub const DEBUG: &str = "/vm-debug";
}

pub(crate) fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT_ENCODE).to_string()
}

/// Ordered query parameters. Later layers replace earlier keys in place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams(IndexMap<String, Vec<String>>);

impl QueryParams {
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        //! Set a single-valued parameter.
        self.0.insert(key.into(), vec![value.into()]);
    }

    pub fn set_all<I, S>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        //! Set a repeated parameter. An empty list leaves the key out.
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        let key = key.into();
        if values.is_empty() {
            self.0.shift_remove(&key);
        } else {
            self.0.insert(key, values);
        }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        //! Values of a parameter.
        self.0.get(key).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        //! No parameters at all?
        self.0.is_empty()
    }

    pub fn to_query_string(&self) -> String {
        //! Render as `?k=v&...`, or an empty string without parameters.
        if self.0.is_empty() {
            return String::new();
        }
        let body = self
            .0
            .iter()
            .flat_map(|(key, values)| {
                values
                    .iter()
                    .map(move |value| format!("{}={}", encode_component(key), encode_component(value)))
            })
            .join("&");
        format!("?{body}")
    }
}

pub fn build_query(options: &Options) -> QueryParams {
    //! Merge query layers: defaults, then state query, then custom query.
    let mut params = QueryParams::default();
    params.set_all("chainid", options.chain_ids.iter().cloned());
    params.set("resolve", (!options.is_async).to_string());
    if let Some(state_query) = &options.state_query {
        for (key, value) in state_query.to_pairs() {
            params.set(key, value);
        }
    }
    for (key, value) in &options.query {
        params.set(key.clone(), value.clone());
    }
    params
}

pub fn construct_query(options: &Options) -> String {
    //! Query string for a regular endpoint.
    //!
    //! Carries `resolve=true` unless the call is asynchronous.
    build_query(options).to_query_string()
}

pub fn search_query(options: &Options) -> IndexMap<String, String> {
    //! Custom query for Cirrus search with the chain filter folded in.
    //!
    //! One chain is matched with `eq.`, several with `in.(...)`.
    let mut query = options.query.clone();
    match options.chain_ids.as_slice() {
        [] => {}
        [chain_id] => {
            query.insert("chainId".to_string(), format!("eq.{chain_id}"));
        }
        chain_ids => {
            query.insert(
                "chainId".to_string(),
                format!("in.({})", chain_ids.iter().join(",")),
            );
        }
    }
    query
}

pub fn construct_search_query(options: &Options) -> String {
    //! Query string for a Cirrus search endpoint.
    let mut params = QueryParams::default();
    for (key, value) in search_query(options) {
        params.set(key, value);
    }
    params.to_query_string()
}

pub fn expand_template(template: &str, params: &[(&str, &str)]) -> String {
    //! Substitute `:key` placeholders with percent-encoded values.
    //!
    //! Only the first occurrence of every key is replaced; placeholders
    //! without a value are left untouched.
    params
        .iter()
        .fold(template.to_string(), |path, (key, value)| {
            path.replacen(&format!(":{key}"), &encode_component(value), 1)
        })
}

pub fn construct_endpoint(template: &str, options: &Options, params: &[(&str, &str)]) -> String {
    //! Expand a template and append the query built from `options`.
    format!(
        "{}{}",
        expand_template(template, params),
        construct_query(options)
    )
}
