//! Private chains: creation and lookup.

use crate::address::Address;
use crate::endpoint::{construct_endpoint, endpoints};
use crate::error::{Error, Result};
use crate::metadata::{construct_metadata, Metadata};
use crate::options::{set_auth_headers, Options, User};
use crate::rest::{as_list, StratoClient};
use crate::transactions::ContractDefinition;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

/// Chain member node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainMember {
    /// Member account
    pub address: Address,
    /// Member node enode url
    pub enode: String,
}

/// Initial balance on a new chain.
#[serde_with::serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainBalance {
    /// Funded account
    pub address: Address,
    /// Amount, as a decimal string
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub balance: BigUint,
}

/// Private chain description.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainInput {
    /// Chain label
    pub label: String,
    /// Participating nodes
    #[serde(default)]
    pub members: Vec<ChainMember>,
    /// Genesis balances
    #[serde(default)]
    pub balances: Vec<ChainBalance>,
    /// Parent chain
    #[serde(rename = "parentChain", default, skip_serializing_if = "Option::is_none")]
    pub parent_chain: Option<String>,
}

#[derive(Serialize)]
struct ChainRequest<'a> {
    #[serde(flatten)]
    chain: &'a ChainInput,
    src: &'a str,
    contract: &'a str,
    args: &'a Map<String, Value>,
    metadata: Metadata,
}

impl<'a> ChainRequest<'a> {
    fn new(chain: &'a ChainInput, contract: &'a ContractDefinition, options: &Options) -> Result<Self> {
        Ok(Self {
            chain,
            src: &contract.source,
            contract: &contract.name,
            args: &contract.args,
            metadata: construct_metadata(options, &contract.name)?,
        })
    }
}

fn chain_id_of(response: Value) -> Result<String> {
    match response {
        Value::String(id) => Ok(id),
        other => Err(Error::UnexpectedResponse(format!(
            "Expected chain id, got {other}"
        ))),
    }
}

impl StratoClient {
    pub async fn create_chain(
        &self,
        user: &User,
        chain: &ChainInput,
        contract: &ContractDefinition,
        options: &Options,
    ) -> Result<String> {
        //! Create a private chain governed by `contract`; returns its id.
        let options = set_auth_headers(user, options);
        let body = serde_json::to_value(ChainRequest::new(chain, contract, &options)?)?;
        let path = construct_endpoint(endpoints::CHAIN, &options, &[]);
        let chain_id = chain_id_of(
            self.transport
                .post(options.node_url()?, &path, Some(body), &options)
                .await?,
        )?;
        info!(label = %chain.label, %chain_id, "created chain");
        Ok(chain_id)
    }

    pub async fn create_chains(
        &self,
        user: &User,
        chains: &[(ChainInput, ContractDefinition)],
        options: &Options,
    ) -> Result<Vec<String>> {
        //! Create several private chains at once; ids come in input order.
        let options = set_auth_headers(user, options);
        let requests = chains
            .iter()
            .map(|(chain, contract)| ChainRequest::new(chain, contract, &options))
            .collect::<Result<Vec<_>>>()?;
        let path = construct_endpoint(endpoints::CHAINS, &options, &[]);
        let response = self
            .transport
            .post(
                options.node_url()?,
                &path,
                Some(serde_json::to_value(requests)?),
                &options,
            )
            .await?;
        as_list(response)?.into_iter().map(chain_id_of).collect()
    }

    pub async fn get_chain(&self, user: &User, chain_id: &str, options: &Options) -> Result<Value> {
        //! Private chain details.
        let mut chains = self
            .get_chains(user, std::slice::from_ref(&chain_id.to_string()), options)
            .await?;
        if chains.is_empty() {
            Err(Error::UnexpectedResponse(format!("Chain {chain_id} not found")))
        } else {
            Ok(chains.swap_remove(0))
        }
    }

    pub async fn get_chains(
        &self,
        user: &User,
        chain_ids: &[String],
        options: &Options,
    ) -> Result<Vec<Value>> {
        //! Details of several private chains; all visible chains for an empty list.
        let options = set_auth_headers(user, options).with_chain_ids(chain_ids.to_vec());
        let path = construct_endpoint(endpoints::CHAIN, &options, &[]);
        as_list(
            self.transport
                .get(options.node_url()?, &path, &options)
                .await?,
        )
    }
}
