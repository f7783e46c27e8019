//! # ergo-client
//!
//! Blocking REST clients for the Ergo node and explorer, and an
//! `ErgoClient` that builds appkit contexts from them.

mod error;
mod explorer;
mod http;
mod node;
mod rest;

pub use error::{ClientError, ClientResult};
pub use explorer::{
    default_explorer_url, ExplorerClient, ExplorerOutput, MAINNET_EXPLORER_URL,
    TESTNET_EXPLORER_URL,
};
pub use node::{NodeClient, WalletBox};
pub use rest::{ClientConfig, RestApiErgoClient, RestDataSource};
