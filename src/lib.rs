#![doc(html_root_url = "https://docs.rs/strato-rest/0.1.0-beta.1")]
#![warn(rust_2018_idioms, missing_docs)]
#![deny(dead_code, unused_imports, unused_mut)]

//! Rust client for the STRATO blockchain REST API: users and keys, contract
//! upload and calls, value transfers, transaction resolution, Cirrus search,
//! private chains and the SolidVM debugger.
//!
//! The client itself is stateless. Everything that shapes a call (target
//! node, authentication, query parameters, transaction parameters, history
//! and indexing metadata) travels in an [`Options`] value, which is never
//! mutated by the library.
//!
//! ## Usage
//!
//! Let's upload a contract and call one of its methods.
//!
//! ```rust,no_run
//! use strato_rest::{CallArgs, Config, ContractDefinition, Options, Outcome, StratoClient, User};
//!
//! # async fn run() -> strato_rest::Result<()> {
//! let config = Config::default()
//!     .with_node("http://localhost:8080/bloc/v2.2".parse()?)
//!     .with_vm("SolidVM");
//! let options = Options::new(config).enable_history();
//! let user = User::new("<oauth bearer token>");
//!
//! let client = StratoClient::new();
//! let contract = ContractDefinition::new(
//!     "Counter",
//!     "contract Counter { uint n; function inc() returns (uint) { n += 1; return n; } }",
//! );
//! let Outcome::Done(counter) = client.create_contract(&user, &contract, &options).await? else {
//!     unreachable!("synchronous uploads wait for the address");
//! };
//! let value = client
//!     .call(&user, &CallArgs::new(counter.clone(), "inc"), &options)
//!     .await?;
//! println!("{} at {} returned {value:?}", counter.name, counter.address);
//! # Ok(())
//! # }
//! ```
//!
//! Mutating calls wait for their transactions to finalize by polling the
//! node (see [`polling::until`]); the polling budget is `timeout` from the
//! [`Config`], 60 seconds by default. Calls made with
//! [`Options::asynchronous`] return [`Outcome::Pending`] right after
//! submission instead.
//!
//! ## Logging
//!
//! The crate logs through [`tracing`] and installs no subscriber: plug in
//! whatever the application uses. Requests are logged at `trace` level, or
//! at `debug` level with `apiDebug: true` in the config.
//!
//! ## Features
//!
//! `http` (enabled by default) pulls in [`reqwest`] and the client itself.
//! Without it only the request composition layer (endpoints, metadata,
//! envelopes, polling) is available.
//!
//! ## License
//!
//! This project is licensed under the GNU General Public License v3.

mod address;
pub use address::{Address, AddressValidationError};
#[cfg(feature = "http")]
pub mod chain;
pub mod config;
#[cfg(feature = "http")]
pub mod debug;
pub mod endpoint;
mod error;
pub use error::{Error, Result};
pub mod metadata;
#[cfg(feature = "http")]
pub mod network;
pub mod options;
pub mod polling;
#[cfg(feature = "http")]
pub mod rest;
pub mod transactions;

pub use config::Config;
pub use options::{set_auth_headers, Options, StateQuery, User};
#[cfg(feature = "http")]
pub use rest::StratoClient;
pub use transactions::{
    CallArgs, ContractDefinition, ContractRef, Outcome, PendingResult, TransactionResult,
    TransferPayload, TxParams, TxStatus,
};
