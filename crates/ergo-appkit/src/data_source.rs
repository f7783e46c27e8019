//! Remote blockchain data used to build contexts and load boxes.

use crate::AppkitResult;
use ergo_lib::{
    chain::{parameters::Parameters, transaction::Transaction},
    ergo_chain_types::Header,
    ergotree_ir::chain::ergo_box::ErgoBox,
};
use serde::{Deserialize, Serialize};

/// Protocol parameters as reported by the node `/info` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolParameters {
    #[serde(default)]
    pub height: u32,
    pub storage_fee_factor: i32,
    pub min_value_per_byte: i32,
    pub max_block_size: i32,
    pub max_block_cost: i32,
    pub block_version: i32,
    pub token_access_cost: i32,
    pub input_cost: i32,
    pub data_input_cost: i32,
    pub output_cost: i32,
}

impl Default for ProtocolParameters {
    fn default() -> Self {
        // Mainnet values at launch.
        Self {
            height: 0,
            storage_fee_factor: 1_250_000,
            min_value_per_byte: 360,
            max_block_size: 524_288,
            max_block_cost: 1_000_000,
            block_version: 1,
            token_access_cost: 100,
            input_cost: 2_000,
            data_input_cost: 100,
            output_cost: 100,
        }
    }
}

impl From<&ProtocolParameters> for Parameters {
    fn from(p: &ProtocolParameters) -> Self {
        Parameters::new(
            p.block_version,
            p.storage_fee_factor,
            p.min_value_per_byte,
            p.max_block_size,
            p.max_block_cost,
            p.token_access_cost,
            p.input_cost,
            p.data_input_cost,
            p.output_cost,
        )
    }
}

/// Subset of the node `/info` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub app_version: String,
    #[serde(default)]
    pub full_height: Option<u32>,
    #[serde(default)]
    pub headers_height: Option<u32>,
    pub parameters: ProtocolParameters,
}

/// Source of chain data and sink for signed transactions.
///
/// Implemented over the node and explorer REST APIs by `ergo-client`.
pub trait BlockchainDataSource: Send + Sync {
    fn node_info(&self) -> AppkitResult<NodeInfo>;

    /// The `count` most recent headers, oldest first.
    fn last_headers(&self, count: usize) -> AppkitResult<Vec<Header>>;

    /// Unspent box by hex id, `None` when the node does not know it.
    fn box_by_id(&self, box_id: &str) -> AppkitResult<Option<ErgoBox>>;

    /// Unspent boxes protected by an encoded address.
    fn unspent_boxes_for(&self, address: &str) -> AppkitResult<Vec<ErgoBox>>;

    /// Unspent boxes whose tree matches a hex encoded template.
    fn unspent_boxes_for_template(&self, template: &str) -> AppkitResult<Vec<ErgoBox>>;

    /// Unspent boxes of the node's own wallet.
    fn wallet_unspent_boxes(
        &self,
        min_confirmations: u32,
        min_inclusion_height: u32,
    ) -> AppkitResult<Vec<ErgoBox>>;

    /// Submit a signed transaction, returning its id.
    fn send_transaction(&self, tx: &Transaction) -> AppkitResult<String>;
}
