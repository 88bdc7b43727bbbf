//! Transaction envelopes, submission bodies and results.
//!
//! Every mutating call (contract upload, function call, value transfer)
//! ends up as one or more [`TransactionEnvelope`]s inside a single
//! [`TransactionBody`]. The node answers with one [`TransactionResult`]
//! per envelope, in submission order.

use crate::address::Address;
use crate::error::Result;
use crate::metadata::{construct_metadata, Metadata, Vm};
use crate::options::Options;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Gas limit used when no layer provides one.
pub const DEFAULT_GAS_LIMIT: u64 = 32_100_000_000;
/// Gas price used when no layer provides one.
pub const DEFAULT_GAS_PRICE: u64 = 1;

/// Transaction parameters. Unset fields fall through to lower-priority layers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxParams {
    /// Maximal amount of gas to spend
    #[serde(rename = "gasLimit", default, skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<u64>,
    /// Price of a gas unit
    #[serde(rename = "gasPrice", default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<u64>,
    /// Explicit account nonce
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
}

impl TxParams {
    pub const fn new(gas_limit: u64, gas_price: u64) -> Self {
        //! Parameters with both gas fields set.
        Self {
            gas_limit: Some(gas_limit),
            gas_price: Some(gas_price),
            nonce: None,
        }
    }

    pub const fn defaults() -> Self {
        //! Built-in fallback parameters.
        Self::new(DEFAULT_GAS_LIMIT, DEFAULT_GAS_PRICE)
    }

    #[must_use]
    pub const fn or(self, lower: Self) -> Self {
        //! Field-wise merge: fields of `self` win, missing ones come from `lower`.
        Self {
            gas_limit: match self.gas_limit {
                Some(v) => Some(v),
                None => lower.gas_limit,
            },
            gas_price: match self.gas_price {
                Some(v) => Some(v),
                None => lower.gas_price,
            },
            nonce: match self.nonce {
                Some(v) => Some(v),
                None => lower.nonce,
            },
        }
    }
}

fn merge_object(target: &mut Map<String, Value>, layer: Map<String, Value>) {
    target.extend(layer.into_iter().filter(|(_, value)| !value.is_null()));
}

fn params_object(params: &TxParams) -> Result<Map<String, Value>> {
    match serde_json::to_value(params)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

pub fn compose_body(body: Value, options: &Options) -> Result<Value> {
    //! Prepare a JSON request body.
    //!
    //! Arrays are sent as is. Objects get their `txParams` completed with
    //! priority body > options > config > built-in defaults, field by field.
    match body {
        Value::Object(mut body) => {
            let mut tx_params = params_object(&TxParams::defaults())?;
            for layer in [options.config.tx_params.as_ref(), options.tx_params.as_ref()]
                .into_iter()
                .flatten()
            {
                merge_object(&mut tx_params, params_object(layer)?);
            }
            if let Some(Value::Object(own)) = body.remove("txParams") {
                merge_object(&mut tx_params, own);
            }
            body.insert("txParams".to_string(), Value::Object(tx_params));
            Ok(Value::Object(body))
        }
        other => Ok(other),
    }
}

/// Contract to upload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContractDefinition {
    /// Contract name
    pub name: String,
    /// Solidity source
    pub source: String,
    /// Constructor arguments by name
    pub args: Map<String, Value>,
    /// Private chain to upload to
    pub chain_id: Option<String>,
    /// Per-transaction parameters
    pub tx_params: Option<TxParams>,
}

impl ContractDefinition {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        //! Contract without constructor arguments.
        Self {
            name: name.into(),
            source: source.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_args(mut self, args: Map<String, Value>) -> Self {
        //! Set constructor arguments.
        self.args = args;
        self
    }

    #[must_use]
    pub fn on_chain(mut self, chain_id: impl Into<String>) -> Self {
        //! Upload to a private chain.
        self.chain_id = Some(chain_id.into());
        self
    }
}

/// Uploaded contract instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractRef {
    /// Contract name
    pub name: String,
    /// Contract address
    pub address: Address,
    /// Private chain the contract lives on
    #[serde(rename = "chainId", default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
}

/// Contract method invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct CallArgs {
    /// Target contract
    pub contract: ContractRef,
    /// Method name
    pub method: String,
    /// Method arguments by name
    pub args: Map<String, Value>,
    /// Amount of funds sent along
    pub value: Option<BigUint>,
    /// Per-transaction parameters
    pub tx_params: Option<TxParams>,
}

impl CallArgs {
    pub fn new(contract: ContractRef, method: impl Into<String>) -> Self {
        //! Call without arguments and value.
        Self {
            contract,
            method: method.into(),
            args: Map::new(),
            value: None,
            tx_params: None,
        }
    }

    #[must_use]
    pub fn with_args(mut self, args: Map<String, Value>) -> Self {
        //! Set method arguments.
        self.args = args;
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<BigUint>) -> Self {
        //! Send funds along with the call.
        self.value = Some(value.into());
        self
    }
}

/// Payload of a contract upload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContractCreatePayload {
    /// Contract name
    pub contract: String,
    /// Solidity source; not sent for EVM uploads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Constructor arguments
    #[serde(default)]
    pub args: Map<String, Value>,
    /// Private chain
    #[serde(rename = "chainid", default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
    /// Per-transaction parameters
    #[serde(rename = "txParams", default, skip_serializing_if = "Option::is_none")]
    pub tx_params: Option<TxParams>,
    /// Call metadata
    #[serde(default)]
    pub metadata: Metadata,
}

/// Payload of a contract method call.
#[serde_with::serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionCallPayload {
    /// Contract name
    #[serde(rename = "contractName")]
    pub contract_name: String,
    /// Contract address
    #[serde(rename = "contractAddress")]
    pub contract_address: Address,
    /// Private chain
    #[serde(rename = "chainid", default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
    /// Amount of funds sent along, as a decimal string
    #[serde_as(as = "Option<serde_with::DisplayFromStr>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<BigUint>,
    /// Method name
    pub method: String,
    /// Method arguments
    #[serde(default)]
    pub args: Map<String, Value>,
    /// Per-transaction parameters
    #[serde(rename = "txParams", default, skip_serializing_if = "Option::is_none")]
    pub tx_params: Option<TxParams>,
    /// Call metadata
    #[serde(default)]
    pub metadata: Metadata,
}

/// Value transfer; sent exactly as given.
#[serde_with::serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferPayload {
    /// Recipient
    #[serde(rename = "toAddress")]
    pub to_address: Address,
    /// Amount, as a decimal string
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub value: BigUint,
    /// Private chain
    #[serde(rename = "chainid", default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
}

impl TransferPayload {
    pub fn new(to_address: Address, value: impl Into<BigUint>) -> Self {
        //! Transfer on the main chain.
        Self {
            to_address,
            value: value.into(),
            chain_id: None,
        }
    }
}

/// Kind of a transaction envelope.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TxPayloadType {
    /// Contract upload
    ContractCreate,
    /// Contract method call
    FunctionCall,
    /// Value transfer
    Transfer,
}

impl TxPayloadType {
    pub const fn as_str(&self) -> &'static str {
        //! Wire name
        match self {
            Self::ContractCreate => "CONTRACT",
            Self::FunctionCall => "FUNCTION",
            Self::Transfer => "TRANSFER",
        }
    }
}

/// Typed `{ type, payload }` wrapper submitted in [`TransactionBody::txs`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum TransactionEnvelope {
    /// Contract upload
    #[serde(rename = "CONTRACT")]
    ContractCreate(ContractCreatePayload),
    /// Contract method call
    #[serde(rename = "FUNCTION")]
    FunctionCall(FunctionCallPayload),
    /// Value transfer
    #[serde(rename = "TRANSFER")]
    Transfer(TransferPayload),
}

impl TransactionEnvelope {
    pub fn contract_create(contract: &ContractDefinition, options: &Options) -> Result<Self> {
        //! Wrap a contract upload.
        let metadata = construct_metadata(options, &contract.name)?;
        let src = (metadata.vm != Some(Vm::Evm)).then(|| contract.source.clone());
        Ok(Self::ContractCreate(ContractCreatePayload {
            contract: contract.name.clone(),
            src,
            args: contract.args.clone(),
            chain_id: contract.chain_id.clone(),
            tx_params: contract.tx_params,
            metadata,
        }))
    }

    pub fn function_call(call: &CallArgs, options: &Options) -> Result<Self> {
        //! Wrap a contract method call.
        let metadata = construct_metadata(options, &call.contract.name)?;
        Ok(Self::FunctionCall(FunctionCallPayload {
            contract_name: call.contract.name.clone(),
            contract_address: call.contract.address,
            chain_id: call.contract.chain_id.clone(),
            value: call.value.clone(),
            method: call.method.clone(),
            args: call.args.clone(),
            tx_params: call.tx_params,
            metadata,
        }))
    }

    pub fn transfer(transfer: &TransferPayload) -> Self {
        //! Wrap a value transfer.
        Self::Transfer(transfer.clone())
    }

    pub const fn payload_type(&self) -> TxPayloadType {
        //! Kind of this envelope.
        match self {
            Self::ContractCreate(_) => TxPayloadType::ContractCreate,
            Self::FunctionCall(_) => TxPayloadType::FunctionCall,
            Self::Transfer(_) => TxPayloadType::Transfer,
        }
    }
}

/// Submission body: a batch of envelopes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionBody {
    /// Envelopes, answered in the same order
    pub txs: Vec<TransactionEnvelope>,
    /// Body-level transaction parameters; highest priority
    #[serde(rename = "txParams", default, skip_serializing_if = "Option::is_none")]
    pub tx_params: Option<TxParams>,
}

impl TransactionBody {
    pub fn new(txs: Vec<TransactionEnvelope>) -> Self {
        //! Body without own transaction parameters.
        Self {
            txs,
            tx_params: None,
        }
    }

    pub fn contract_creates(contracts: &[ContractDefinition], options: &Options) -> Result<Self> {
        //! Batch of uploads, in input order.
        contracts
            .iter()
            .map(|contract| TransactionEnvelope::contract_create(contract, options))
            .collect::<Result<Vec<_>>>()
            .map(Self::new)
    }

    pub fn function_calls(calls: &[CallArgs], options: &Options) -> Result<Self> {
        //! Batch of method calls, in input order.
        calls
            .iter()
            .map(|call| TransactionEnvelope::function_call(call, options))
            .collect::<Result<Vec<_>>>()
            .map(Self::new)
    }

    pub fn transfers(transfers: &[TransferPayload]) -> Self {
        //! Batch of transfers, in input order.
        Self::new(transfers.iter().map(TransactionEnvelope::transfer).collect())
    }

    pub fn to_request(&self, options: &Options) -> Result<Value> {
        //! JSON body as sent over the wire.
        compose_body(serde_json::to_value(self)?, options)
    }
}

/// Execution status of a submitted transaction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxStatus {
    /// Not finalized yet
    Pending,
    /// Executed
    Success,
    /// Rejected or reverted
    Failure,
}

/// Resolved payload of a transaction result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TxResultData {
    /// Kind of the result (`Upload`, `Call`, `Send`, ...)
    pub tag: String,
    /// Result contents
    #[serde(default)]
    pub contents: Value,
}

/// Result of a submitted transaction, possibly still pending.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionResult {
    /// Transaction hash
    pub hash: String,
    /// Execution status
    pub status: TxStatus,
    /// Execution details
    #[serde(rename = "txResult", default, skip_serializing_if = "Option::is_none")]
    pub tx_result: Option<Value>,
    /// Decoded result, once available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<TxResultData>,
}

/// A result right after submission.
pub type PendingResult = TransactionResult;

/// Output of a mutating call.
///
/// Asynchronous calls do not wait for finalization and hand back the
/// node's pending result instead of the output.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome<T> {
    /// Submitted, not finalized yet
    Pending(PendingResult),
    /// Finalized successfully
    Done(T),
}

impl<T> Outcome<T> {
    pub const fn is_pending(&self) -> bool {
        //! Still waiting for finalization?
        matches!(self, Self::Pending(_))
    }

    pub fn pending(&self) -> Option<&PendingResult> {
        //! Pending result, if the call did not wait.
        match self {
            Self::Pending(result) => Some(result),
            Self::Done(_) => None,
        }
    }

    pub fn into_done(self) -> Option<T> {
        //! Output, if the call waited for it.
        match self {
            Self::Pending(_) => None,
            Self::Done(output) => Some(output),
        }
    }

    pub fn try_map<U, F>(self, f: F) -> Result<Outcome<U>>
    where
        F: FnOnce(T) -> Result<U>,
    {
        //! Convert the output, keeping pending results as they are.
        match self {
            Self::Pending(result) => Ok(Outcome::Pending(result)),
            Self::Done(output) => f(output).map(Outcome::Done),
        }
    }
}

impl TransactionResult {
    pub fn is_pending(&self) -> bool {
        //! Still waiting for finalization?
        self.status == TxStatus::Pending
    }

    pub fn contents(&self) -> Option<&Value> {
        //! Decoded result contents, if any.
        self.data.as_ref().map(|data| &data.contents)
    }

    pub fn failure_message(&self) -> Option<&str> {
        //! Node-provided failure reason.
        self.tx_result
            .as_ref()
            .and_then(|result| result.get("message"))
            .and_then(Value::as_str)
    }
}
