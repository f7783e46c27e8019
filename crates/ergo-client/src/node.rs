//! Ergo node REST API client.

use crate::error::ClientResult;
use crate::http::JsonTransport;
use ergo_appkit::NodeInfo;
use ergo_lib::{
    chain::transaction::Transaction, ergo_chain_types::Header,
    ergotree_ir::chain::ergo_box::ErgoBox,
};
use serde::Deserialize;
use std::time::Duration;

/// Entry of `/wallet/boxes/unspent`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletBox {
    #[serde(rename = "box")]
    pub ergo_box: ErgoBox,
    #[serde(default)]
    pub confirmations_num: Option<u32>,
    #[serde(default)]
    pub inclusion_height: Option<u32>,
}

/// Client for the node endpoints used by the appkit.
pub struct NodeClient {
    transport: JsonTransport,
}

impl NodeClient {
    pub fn new(api_url: &str, api_key: Option<String>, timeout: Duration) -> ClientResult<Self> {
        Ok(Self {
            transport: JsonTransport::new(api_url, api_key, timeout)?,
        })
    }

    pub fn api_url(&self) -> &str {
        self.transport.base_url()
    }

    /// `GET /info`
    pub fn info(&self) -> ClientResult<NodeInfo> {
        self.transport.get("info")
    }

    /// `GET /blocks/lastHeaders/{count}`, oldest first.
    pub fn last_headers(&self, count: usize) -> ClientResult<Vec<Header>> {
        self.transport.get(&format!("blocks/lastHeaders/{}", count))
    }

    /// `GET /utxo/byId/{id}`, `None` on 404.
    pub fn box_by_id(&self, box_id: &str) -> ClientResult<Option<ErgoBox>> {
        match self.transport.get(&format!("utxo/byId/{}", box_id)) {
            Ok(ergo_box) => Ok(Some(ergo_box)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// `GET /wallet/boxes/unspent`
    pub fn wallet_unspent_boxes(
        &self,
        min_confirmations: u32,
        min_inclusion_height: u32,
    ) -> ClientResult<Vec<WalletBox>> {
        self.transport.get(&format!(
            "wallet/boxes/unspent?minConfirmations={}&minInclusionHeight={}",
            min_confirmations, min_inclusion_height
        ))
    }

    /// `POST /transactions`, returning the transaction id.
    pub fn send_transaction(&self, tx: &Transaction) -> ClientResult<String> {
        self.transport.post("transactions", tx)
    }
}
