//! Per-call contract metadata: history tracking, indexing opt-out and VM choice.

use crate::error::{Error, Result};
use crate::options::Options;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Contract execution engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vm {
    /// Ethereum VM
    #[serde(rename = "EVM")]
    Evm,
    /// STRATO native Solidity interpreter
    #[serde(rename = "SolidVM")]
    SolidVm,
}

impl Vm {
    /// All accepted values, in their wire form.
    pub const VARIANTS: [&'static str; 2] = ["EVM", "SolidVM"];

    pub const fn as_str(&self) -> &'static str {
        //! Wire name
        match self {
            Self::Evm => "EVM",
            Self::SolidVm => "SolidVM",
        }
    }
}

impl fmt::Display for Vm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Vm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "EVM" => Ok(Self::Evm),
            "SolidVM" => Ok(Self::SolidVm),
            other => Err(other.to_string()),
        }
    }
}

/// Metadata attached to contract creation and function call payloads.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Contracts to keep history of, comma-separated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<String>,
    /// Contracts excluded from indexing, comma-separated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noindex: Option<String>,
    /// Execution engine
    #[serde(rename = "VM", default, skip_serializing_if = "Option::is_none")]
    pub vm: Option<Vm>,
}

impl Metadata {
    pub fn is_empty(&self) -> bool {
        //! Nothing set?
        self.history.is_none() && self.noindex.is_none() && self.vm.is_none()
    }
}

/// Append names to a comma-separated list, skipping names already in it.
fn append_names<'a>(current: Option<String>, incoming: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let mut names: Vec<String> = current
        .iter()
        .flat_map(|list| list.split(','))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();
    for name in incoming {
        if !name.is_empty() && !names.iter().any(|known| known == name) {
            names.push(name.to_string());
        }
    }
    (!names.is_empty()).then(|| names.join(","))
}

/// Flatten list entries, each of which may be a comma-separated list itself.
fn split_entries(entries: &[String]) -> impl Iterator<Item = &str> {
    entries.iter().flat_map(|entry| entry.split(',')).map(str::trim)
}

pub fn construct_metadata(options: &Options, contract_name: &str) -> Result<Metadata> {
    //! Derive metadata for a call on `contract_name`.
    //!
    //! Fails with [`Error::BadRequest`] when the configured VM is not
    //! one of [`Vm::VARIANTS`].
    let mut metadata = Metadata::default();

    if options.enable_history {
        metadata.history = Some(contract_name.to_string());
    }
    if let Some(history) = &options.history {
        metadata.history = append_names(metadata.history.take(), split_entries(history));
    }

    if options.enable_index == Some(false) {
        metadata.noindex = Some(contract_name.to_string());
    }
    if let Some(noindex) = &options.noindex {
        metadata.noindex = append_names(
            metadata.noindex.take(),
            split_entries(noindex).filter(|name| *name != contract_name),
        );
    }

    if let Some(vm) = &options.config.vm {
        let vm = vm.parse::<Vm>().map_err(|illegal| {
            Error::bad_request(
                format!(
                    "Illegal VM type {illegal:?}, expected one of {}",
                    Vm::VARIANTS.iter().join(", ")
                ),
                options,
            )
        })?;
        metadata.vm = Some(vm);
    }

    Ok(metadata)
}
