//! STRATO REST API client.
//!
//! [`StratoClient`] is stateless apart from its HTTP connection pool: the
//! target node, authentication and all other per-call knobs come from the
//! [`Options`] passed to every method.

use crate::address::Address;
use crate::endpoint::{
    construct_endpoint, construct_search_query, endpoints, expand_template,
};
use crate::error::{Error, Result};
use crate::network::HttpTransport;
use crate::options::{set_auth_headers, Options, StateQuery, User};
use crate::polling::until;
use crate::transactions::{
    CallArgs, ContractDefinition, ContractRef, Outcome, PendingResult, TransactionBody,
    TransactionResult, TransferPayload, TxStatus,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, info};

/// Largest array slice requested by [`StratoClient::get_array`].
pub const MAX_SEGMENT_SIZE: u64 = 100;

/// Source to compile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileRequest {
    /// Contract to compile
    #[serde(rename = "contractName")]
    pub contract_name: String,
    /// Solidity source
    pub source: String,
    /// Contracts of the source to index in Cirrus
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub searchable: Vec<String>,
}

/// Compiled contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileResult {
    /// Contract name
    #[serde(rename = "contractName")]
    pub contract_name: String,
    /// Hash of the compiled code
    #[serde(rename = "codeHash")]
    pub code_hash: Value,
}

/// Parsed `content-range` header: `start-end/count`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ContentRange {
    /// First returned row; `None` for `*`
    pub start: Option<u64>,
    /// Last returned row; `None` for `*`
    pub end: Option<u64>,
    /// Total number of rows; `None` when unknown
    pub count: Option<u64>,
}

impl FromStr for ContentRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let malformed = || Error::UnexpectedResponse(format!("Malformed content-range: {s:?}"));
        let number = |part: &str| -> Result<Option<u64>> {
            match part.trim() {
                "*" => Ok(None),
                digits => digits.parse().map(Some).map_err(|_| malformed()),
            }
        };
        let (range, count) = s.split_once('/').ok_or_else(malformed)?;
        let (start, end) = match range.split_once('-') {
            Some((start, end)) => (number(start)?, number(end)?),
            None => (number(range)?, None),
        };
        Ok(Self {
            start,
            end,
            count: number(count)?,
        })
    }
}

/// One page of search results.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchPage {
    /// Matched rows
    pub data: Vec<Value>,
    /// Position of the page within all matches
    pub content_range: ContentRange,
}

/// Client for a STRATO deployment.
#[derive(Clone, Debug, Default)]
pub struct StratoClient {
    pub(crate) transport: HttpTransport,
}

pub(crate) fn as_list(response: Value) -> Result<Vec<Value>> {
    match response {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(vec![]),
        other => Ok(vec![other]),
    }
}

fn address_of(response: &Value) -> Result<Address> {
    let raw = match response {
        Value::String(raw) => raw.as_str(),
        other => other
            .get("address")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::UnexpectedResponse(format!("No address in {other}")))?,
    };
    Ok(raw.parse()?)
}

fn check_success(result: TransactionResult) -> Result<TransactionResult> {
    match result.status {
        TxStatus::Failure => Err(Error::TransactionFailed {
            message: result
                .failure_message()
                .unwrap_or("transaction failed")
                .to_string(),
            hash: result.hash,
            tx_result: result.tx_result.unwrap_or_default(),
        }),
        _ => Ok(result),
    }
}

fn order_by_hash(hashes: &[String], results: Vec<TransactionResult>) -> Result<Vec<TransactionResult>> {
    let by_hash: HashMap<&str, &TransactionResult> = results
        .iter()
        .map(|result| (result.hash.as_str(), result))
        .collect();
    hashes
        .iter()
        .map(|hash| {
            by_hash
                .get(hash.as_str())
                .map(|result| (*result).clone())
                .ok_or_else(|| Error::UnexpectedResponse(format!("No result for transaction {hash}")))
        })
        .collect()
}

impl StratoClient {
    pub fn new() -> Self {
        //! Client with a default HTTP connection pool.
        Self::default()
    }

    pub const fn with_transport(transport: HttpTransport) -> Self {
        //! Client over a preconfigured transport.
        Self { transport }
    }

    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        options: &Options,
    ) -> Result<Address> {
        //! Create a password-protected user and return its address.
        let path = construct_endpoint(endpoints::USER, options, &[("username", username)]);
        let response = self
            .transport
            .post_urlencoded(options.node_url()?, &path, &[("password", password)], options)
            .await?;
        let address = address_of(&response)?;
        info!(username, %address, "created user");
        Ok(address)
    }

    pub async fn fill(&self, user: &User, options: &Options) -> Result<Value> {
        //! Top up user balance from the faucet.
        let (Some(username), Some(address)) = (&user.username, user.address) else {
            return Err(Error::bad_request(
                "Faucet requires both username and address of the user",
                options,
            ));
        };
        let address = address.to_string();
        let options = set_auth_headers(user, options);
        let path = construct_endpoint(
            endpoints::FILL,
            &options,
            &[("username", username.as_str()), ("address", address.as_str())],
        );
        self.transport
            .post_urlencoded(options.node_url()?, &path, &[], &options)
            .await
    }

    pub async fn get_key(&self, user: &User, options: &Options) -> Result<Address> {
        //! Address of the key held by the node for `user`.
        let options = set_auth_headers(user, options);
        let path = construct_endpoint(endpoints::KEY, &options, &[]);
        let response = self
            .transport
            .get(options.node_url()?, &path, &options)
            .await?;
        address_of(&response)
    }

    pub async fn create_key(&self, user: &User, options: &Options) -> Result<Address> {
        //! Create a key for `user` on the node.
        let options = set_auth_headers(user, options);
        let path = construct_endpoint(endpoints::KEY, &options, &[]);
        let response = self
            .transport
            .post(options.node_url()?, &path, None, &options)
            .await?;
        address_of(&response)
    }

    pub async fn get_account(
        &self,
        user: &User,
        address: Address,
        options: &Options,
    ) -> Result<Vec<Value>> {
        //! Account details (balance, nonce, code hash).
        let options = set_auth_headers(user, options).with_query("address", address.to_string());
        let path = construct_endpoint(endpoints::ACCOUNT, &options, &[]);
        as_list(
            self.transport
                .get(options.node_url()?, &path, &options)
                .await?,
        )
    }

    pub async fn send_transactions(
        &self,
        user: &User,
        body: &TransactionBody,
        options: &Options,
    ) -> Result<Vec<PendingResult>> {
        //! Submit a batch of envelopes.
        //!
        //! The node answers with one result per envelope, in order. Unless
        //! `options.is_async` is set, the node holds the answer until the
        //! transactions finalize; otherwise the results come back `Pending`
        //! and can be passed to [`Self::resolve_results`].
        let options = set_auth_headers(user, options);
        let template = if options.cache_nonce {
            endpoints::SEND_PARALLEL
        } else {
            endpoints::SEND
        };
        let path = construct_endpoint(template, &options, &[]);
        debug!(txs = body.txs.len(), %path, "submitting transactions");
        let response = self
            .transport
            .post(
                options.node_url()?,
                &path,
                Some(serde_json::to_value(body)?),
                &options,
            )
            .await?;
        let results: Vec<PendingResult> = as_list(response)?
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<_, _>>()?;
        if results.len() != body.txs.len() {
            return Err(Error::UnexpectedResponse(format!(
                "Submitted {} transactions, got {} results",
                body.txs.len(),
                results.len()
            )));
        }
        Ok(results)
    }

    async fn fetch_results(&self, hashes: &[String], options: &Options) -> Result<Vec<TransactionResult>> {
        let path = construct_endpoint(endpoints::TX_RESULTS, options, &[]);
        let response = self
            .transport
            .post(
                options.node_url()?,
                &path,
                Some(serde_json::to_value(hashes)?),
                options,
            )
            .await?;
        let results = as_list(response)?
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<TransactionResult>, _>>()?;
        order_by_hash(hashes, results)
    }

    pub async fn resolve_results(
        &self,
        user: &User,
        pending: &[PendingResult],
        options: &Options,
    ) -> Result<Vec<TransactionResult>> {
        //! Poll the node until none of `pending` is still pending.
        //!
        //! Results come back in the order of `pending`. Polling gives up
        //! after `config.timeout` milliseconds (60 s by default).
        if pending.iter().all(|result| !result.is_pending()) {
            return Ok(pending.to_vec());
        }
        let options = set_auth_headers(user, options);
        let hashes: Vec<String> = pending.iter().map(|result| result.hash.clone()).collect();
        let hashes = &hashes;
        until(
            |results: &Vec<TransactionResult>| results.iter().all(|result| !result.is_pending()),
            move |options| async move { self.fetch_results(hashes, &options).await },
            &options,
            Some(options.timeout_ms()),
        )
        .await
    }

    pub async fn resolve_result(
        &self,
        user: &User,
        pending: &PendingResult,
        options: &Options,
    ) -> Result<TransactionResult> {
        //! Poll the node until `pending` is no longer pending.
        let mut resolved = self
            .resolve_results(user, std::slice::from_ref(pending), options)
            .await?;
        resolved
            .pop()
            .ok_or_else(|| Error::UnexpectedResponse("Empty resolution result".to_string()))
    }

    async fn submit_and_resolve(
        &self,
        user: &User,
        body: &TransactionBody,
        options: &Options,
    ) -> Result<Vec<Outcome<TransactionResult>>> {
        let submitted = self.send_transactions(user, body, options).await?;
        let results = if options.is_async {
            submitted
        } else {
            self.resolve_results(user, &submitted, options).await?
        };
        results
            .into_iter()
            .map(|result| {
                if result.is_pending() {
                    Ok(Outcome::Pending(result))
                } else {
                    check_success(result).map(Outcome::Done)
                }
            })
            .collect()
    }

    pub async fn create_contract_list(
        &self,
        user: &User,
        contracts: &[ContractDefinition],
        options: &Options,
    ) -> Result<Vec<Outcome<ContractRef>>> {
        //! Upload several contracts in one submission.
        //!
        //! With `options.is_async` the uploads are not waited for and come
        //! back as [`Outcome::Pending`].
        let body = TransactionBody::contract_creates(contracts, options)?;
        let outcomes = self.submit_and_resolve(user, &body, options).await?;
        contracts
            .iter()
            .zip(outcomes)
            .map(|(contract, outcome)| {
                outcome.try_map(|result| {
                    let address = address_of(result.contents().unwrap_or(&Value::Null))?;
                    info!(contract = %contract.name, %address, "uploaded contract");
                    Ok(ContractRef {
                        name: contract.name.clone(),
                        address,
                        chain_id: contract.chain_id.clone(),
                    })
                })
            })
            .collect()
    }

    pub async fn create_contract(
        &self,
        user: &User,
        contract: &ContractDefinition,
        options: &Options,
    ) -> Result<Outcome<ContractRef>> {
        //! Upload a contract and wait for its address, unless asynchronous.
        let mut created = self
            .create_contract_list(user, std::slice::from_ref(contract), options)
            .await?;
        created
            .pop()
            .ok_or_else(|| Error::UnexpectedResponse("Empty upload result".to_string()))
    }

    fn call_output(result: TransactionResult, options: &Options) -> Result<Value> {
        if options.is_detailed {
            Ok(serde_json::to_value(result)?)
        } else {
            Ok(result.contents().cloned().unwrap_or_default())
        }
    }

    pub async fn call_list(
        &self,
        user: &User,
        calls: &[CallArgs],
        options: &Options,
    ) -> Result<Vec<Outcome<Value>>> {
        //! Call several contract methods in one submission.
        //!
        //! Returns the method outputs, or full transaction results when
        //! `options.is_detailed` is set. Asynchronous calls return
        //! [`Outcome::Pending`] without waiting.
        let body = TransactionBody::function_calls(calls, options)?;
        self.submit_and_resolve(user, &body, options)
            .await?
            .into_iter()
            .map(|outcome| outcome.try_map(|result| Self::call_output(result, options)))
            .collect()
    }

    pub async fn call(
        &self,
        user: &User,
        call: &CallArgs,
        options: &Options,
    ) -> Result<Outcome<Value>> {
        //! Call a contract method.
        let mut outputs = self
            .call_list(user, std::slice::from_ref(call), options)
            .await?;
        outputs
            .pop()
            .ok_or_else(|| Error::UnexpectedResponse("Empty call result".to_string()))
    }

    pub async fn send_many(
        &self,
        user: &User,
        transfers: &[TransferPayload],
        options: &Options,
    ) -> Result<Vec<TransactionResult>> {
        //! Send several value transfers in one submission.
        //!
        //! Asynchronous transfers come back as the node's pending results.
        let body = TransactionBody::transfers(transfers);
        Ok(self
            .submit_and_resolve(user, &body, options)
            .await?
            .into_iter()
            .map(|outcome| match outcome {
                Outcome::Pending(result) | Outcome::Done(result) => result,
            })
            .collect())
    }

    pub async fn send(
        &self,
        user: &User,
        transfer: &TransferPayload,
        options: &Options,
    ) -> Result<TransactionResult> {
        //! Send a value transfer.
        let mut results = self
            .send_many(user, std::slice::from_ref(transfer), options)
            .await?;
        results
            .pop()
            .ok_or_else(|| Error::UnexpectedResponse("Empty transfer result".to_string()))
    }

    pub async fn get_state(
        &self,
        user: &User,
        contract: &ContractRef,
        options: &Options,
    ) -> Result<Value> {
        //! Contract state, shaped by `options.state_query`.
        let options = set_auth_headers(user, options);
        let address = contract.address.to_string();
        let path = construct_endpoint(
            endpoints::STATE,
            &options,
            &[("name", contract.name.as_str()), ("address", address.as_str())],
        );
        self.transport
            .get(options.node_url()?, &path, &options)
            .await
    }

    pub async fn get_array(
        &self,
        user: &User,
        contract: &ContractRef,
        name: &str,
        options: &Options,
    ) -> Result<Vec<Value>> {
        //! Read a whole state array, [`MAX_SEGMENT_SIZE`] elements at a time.
        let missing = || Error::UnexpectedResponse(format!("State has no array {name:?}"));
        let length_query = StateQuery {
            name: Some(name.to_string()),
            length: true,
            ..StateQuery::default()
        };
        let length = self
            .get_state(user, contract, &options.clone().with_state_query(length_query))
            .await?
            .get(name)
            .and_then(Value::as_u64)
            .ok_or_else(missing)?;

        let mut items = Vec::new();
        let mut offset = 0;
        while offset < length {
            let count = MAX_SEGMENT_SIZE.min(length - offset);
            let page_query = StateQuery {
                name: Some(name.to_string()),
                offset: Some(offset),
                count: Some(count),
                length: false,
            };
            let mut page = self
                .get_state(user, contract, &options.clone().with_state_query(page_query))
                .await?;
            match page.get_mut(name).map(Value::take) {
                Some(Value::Array(chunk)) => items.extend(chunk),
                _ => return Err(missing()),
            }
            offset += count;
        }
        Ok(items)
    }

    fn search_path(contract_name: &str, options: &Options) -> String {
        format!(
            "{}{}",
            expand_template(endpoints::SEARCH, &[("name", contract_name)]),
            construct_search_query(options)
        )
    }

    pub async fn search(
        &self,
        user: &User,
        contract_name: &str,
        options: &Options,
    ) -> Result<Vec<Value>> {
        //! Query indexed contract instances.
        //!
        //! `options.query` holds the filters (`field=eq.value` style) and
        //! `options.chain_ids` restricts the chains searched.
        let options = set_auth_headers(user, options);
        let path = Self::search_path(contract_name, &options);
        as_list(
            self.transport
                .get(options.node_url()?, &path, &options)
                .await?,
        )
    }

    pub async fn search_until<P>(
        &self,
        user: &User,
        contract_name: &str,
        predicate: P,
        options: &Options,
    ) -> Result<Vec<Value>>
    where
        P: Fn(&Vec<Value>) -> bool,
    {
        //! Repeat a search until `predicate` accepts the rows, e.g. until a
        //! freshly uploaded contract gets indexed.
        until(
            predicate,
            move |options| async move { self.search(user, contract_name, &options).await },
            options,
            Some(options.timeout_ms()),
        )
        .await
    }

    pub async fn search_with_content_range(
        &self,
        user: &User,
        contract_name: &str,
        options: &Options,
    ) -> Result<SearchPage> {
        //! Query indexed contract instances together with the total count.
        let options = set_auth_headers(user, options)
            .with_header("Range-Unit", "items")
            .with_header("Prefer", "count=exact");
        let path = Self::search_path(contract_name, &options);
        let response = self
            .transport
            .get_response(options.node_url()?, &path, &options)
            .await?;
        let content_range = response
            .headers
            .get("content-range")
            .ok_or_else(|| Error::UnexpectedResponse("Missing content-range header".to_string()))?
            .to_str()
            .map_err(|_| Error::UnexpectedResponse("Non-ASCII content-range header".to_string()))?
            .parse()?;
        Ok(SearchPage {
            data: as_list(response.data)?,
            content_range,
        })
    }

    pub async fn compile_contracts(
        &self,
        user: &User,
        contracts: &[CompileRequest],
        options: &Options,
    ) -> Result<Vec<CompileResult>> {
        //! Compile sources without uploading them.
        let options = set_auth_headers(user, options);
        let path = construct_endpoint(endpoints::COMPILE, &options, &[]);
        let response = self
            .transport
            .post(
                options.node_url()?,
                &path,
                Some(serde_json::to_value(contracts)?),
                &options,
            )
            .await?;
        as_list(response)?
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(Error::from))
            .collect()
    }
}
