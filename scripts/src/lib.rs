//! Scripts for deploying, wiring, bootstrapping and verifying the Liblock smart contracts.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod artifacts;
pub mod bootstrap;
pub mod cli;
pub mod client;
mod commands;
pub mod config;
pub mod constants;
pub mod deployment;
pub mod errors;
pub mod explorer;
pub mod report;
pub mod solidity;
#[cfg(test)]
pub(crate) mod test_helpers;
pub mod types;
pub mod utils;
pub mod verification;
