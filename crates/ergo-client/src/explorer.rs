//! Ergo explorer (v0) REST API client.

use crate::error::ClientResult;
use crate::http::JsonTransport;
use ergo_lib::ergotree_ir::chain::address::NetworkPrefix;
use serde::Deserialize;
use std::time::Duration;

pub const MAINNET_EXPLORER_URL: &str = "https://api.ergoplatform.com/api/v0";
pub const TESTNET_EXPLORER_URL: &str = "https://api-testnet.ergoplatform.com/api/v0";

/// Public explorer for a network.
pub fn default_explorer_url(network: NetworkPrefix) -> &'static str {
    match network {
        NetworkPrefix::Mainnet => MAINNET_EXPLORER_URL,
        NetworkPrefix::Testnet => TESTNET_EXPLORER_URL,
    }
}

/// Output summary returned by the explorer. Only the id is used; full
/// boxes are loaded from the node.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerOutput {
    pub id: String,
    #[serde(default)]
    pub value: u64,
    #[serde(default)]
    pub creation_height: u32,
}

pub struct ExplorerClient {
    transport: JsonTransport,
}

impl ExplorerClient {
    pub fn new(url: &str, timeout: Duration) -> ClientResult<Self> {
        Ok(Self {
            transport: JsonTransport::new(url, None, timeout)?,
        })
    }

    pub fn url(&self) -> &str {
        self.transport.base_url()
    }

    /// `GET /transactions/boxes/byAddress/unspent/{address}`
    pub fn unspent_outputs_by_address(&self, address: &str) -> ClientResult<Vec<ExplorerOutput>> {
        self.transport
            .get(&format!("transactions/boxes/byAddress/unspent/{}", address))
    }

    /// `GET /transactions/boxes/byErgoTreeTemplate/unspent/{template}`
    pub fn unspent_outputs_by_template(
        &self,
        template: &str,
    ) -> ClientResult<Vec<ExplorerOutput>> {
        self.transport.get(&format!(
            "transactions/boxes/byErgoTreeTemplate/unspent/{}",
            template
        ))
    }
}
