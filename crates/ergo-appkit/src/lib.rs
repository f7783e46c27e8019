//! # ergo-appkit
//!
//! Building blocks for Ergo applications.
//!
//! This crate provides:
//! - First-fit box selection for ERG and token amounts
//! - Unsigned transaction assembly with fee and change handling
//! - Provers backed by mnemonics, encrypted secret storage or raw keys
//! - A blockchain context built from a pluggable data source
//!
//! ## Example
//!
//! ```ignore
//! use ergo_appkit::{box_operations, ErgoClient};
//!
//! let signed_json = client.execute(|ctx| {
//!     let mut builder = ctx.new_prover_builder();
//!     builder.with_mnemonic(mnemonic, "")?;
//!     let prover = builder.build()?;
//!     box_operations::send(ctx, &prover, recipient, 1_000_000_000)
//! })?;
//! ```

pub mod box_operations;
mod box_selector;
mod context;
mod contract;
mod data_source;
mod error;
pub mod parameters;
mod prover;
mod secret_storage;
mod transaction;
mod tx_builder;
mod wallet;

#[cfg(test)]
mod test_util;

pub use box_selector::{select_top, select_top_erg};
pub use context::{BlockchainContext, ErgoClient};
pub use contract::{encode_address, parse_address, ErgoContract};
pub use data_source::{BlockchainDataSource, NodeInfo, ProtocolParameters};
pub use error::{AppkitError, AppkitResult};
pub use prover::{ErgoProver, ErgoProverBuilder, SecretSource};
pub use secret_storage::{EncryptedSeed, KdfParams, SecretStorage, SECRET_FILE_NAME};
pub use transaction::{SignedTx, UnsignedTx};
pub use tx_builder::{OutBox, OutBoxBuilder, UnsignedTransactionBuilder};
pub use wallet::ErgoWallet;

// Re-export ergo-lib types that appear in the public API
pub use ergo_lib::chain::{ergo_state_context::ErgoStateContext, parameters::Parameters};
pub use ergo_lib::ergo_chain_types::Header;
pub use ergo_lib::ergotree_ir::chain::address::{Address, NetworkPrefix};
pub use ergo_lib::ergotree_ir::chain::ergo_box::ErgoBox;
pub use ergo_lib::ergotree_ir::chain::token::Token;
