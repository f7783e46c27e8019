//! Data source and client over the node and explorer REST APIs.

use crate::error::ClientResult;
use crate::explorer::{default_explorer_url, ExplorerClient, ExplorerOutput};
use crate::node::NodeClient;
use ergo_appkit::{
    AppkitResult, BlockchainContext, BlockchainDataSource, ErgoClient, NodeInfo,
};
use ergo_lib::{
    chain::transaction::Transaction,
    ergo_chain_types::Header,
    ergotree_ir::chain::{address::NetworkPrefix, ergo_box::ErgoBox},
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Connection settings for `RestApiErgoClient`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub node_url: String,
    pub api_key: Option<String>,
    /// Explorer base URL; the public explorer of the network when unset.
    pub explorer_url: Option<String>,
    pub network: NetworkPrefix,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(node_url: impl Into<String>, network: NetworkPrefix) -> Self {
        Self {
            node_url: node_url.into(),
            api_key: None,
            explorer_url: None,
            network,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_explorer_url(mut self, url: impl Into<String>) -> Self {
        self.explorer_url = Some(url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn resolved_explorer_url(&self) -> &str {
        self.explorer_url
            .as_deref()
            .unwrap_or_else(|| default_explorer_url(self.network))
    }
}

/// `BlockchainDataSource` backed by a node and an explorer.
///
/// The explorer is only asked for box ids; full boxes always come from the
/// node, and ids the node cannot resolve are skipped.
pub struct RestDataSource {
    node: NodeClient,
    explorer: ExplorerClient,
}

impl RestDataSource {
    pub fn new(node: NodeClient, explorer: ExplorerClient) -> Self {
        Self { node, explorer }
    }

    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let node = NodeClient::new(&config.node_url, config.api_key.clone(), config.timeout)?;
        let explorer = ExplorerClient::new(config.resolved_explorer_url(), config.timeout)?;
        Ok(Self::new(node, explorer))
    }

    pub fn node(&self) -> &NodeClient {
        &self.node
    }

    pub fn explorer(&self) -> &ExplorerClient {
        &self.explorer
    }

    /// Load the full boxes behind explorer outputs.
    ///
    /// Ids the node answers with 404 are skipped. Any other failure is
    /// returned as is.
    fn resolve(&self, outputs: Vec<ExplorerOutput>) -> ClientResult<Vec<ErgoBox>> {
        let mut boxes = Vec::with_capacity(outputs.len());
        for output in outputs {
            match self.node.box_by_id(&output.id)? {
                Some(ergo_box) => boxes.push(ergo_box),
                None => warn!(box_id = %output.id, "Box not found on node, skipping"),
            }
        }
        Ok(boxes)
    }
}

impl BlockchainDataSource for RestDataSource {
    fn node_info(&self) -> AppkitResult<NodeInfo> {
        Ok(self.node.info()?)
    }

    fn last_headers(&self, count: usize) -> AppkitResult<Vec<Header>> {
        Ok(self.node.last_headers(count)?)
    }

    fn box_by_id(&self, box_id: &str) -> AppkitResult<Option<ErgoBox>> {
        Ok(self.node.box_by_id(box_id)?)
    }

    fn unspent_boxes_for(&self, address: &str) -> AppkitResult<Vec<ErgoBox>> {
        let outputs = self.explorer.unspent_outputs_by_address(address)?;
        debug!(address, count = outputs.len(), "Explorer returned unspent outputs");
        Ok(self.resolve(outputs)?)
    }

    fn unspent_boxes_for_template(&self, template: &str) -> AppkitResult<Vec<ErgoBox>> {
        let outputs = self.explorer.unspent_outputs_by_template(template)?;
        Ok(self.resolve(outputs)?)
    }

    fn wallet_unspent_boxes(
        &self,
        min_confirmations: u32,
        min_inclusion_height: u32,
    ) -> AppkitResult<Vec<ErgoBox>> {
        let boxes = self
            .node
            .wallet_unspent_boxes(min_confirmations, min_inclusion_height)?;
        Ok(boxes.into_iter().map(|b| b.ergo_box).collect())
    }

    fn send_transaction(&self, tx: &Transaction) -> AppkitResult<String> {
        Ok(self.node.send_transaction(tx)?)
    }
}

/// `ErgoClient` that builds each context from the REST APIs.
pub struct RestApiErgoClient {
    source: Arc<RestDataSource>,
    network: NetworkPrefix,
}

impl RestApiErgoClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        Ok(Self {
            source: Arc::new(RestDataSource::from_config(config)?),
            network: config.network,
        })
    }

    pub fn network(&self) -> NetworkPrefix {
        self.network
    }

    pub fn data_source(&self) -> &RestDataSource {
        &self.source
    }
}

impl ErgoClient for RestApiErgoClient {
    fn execute<T, F>(&self, action: F) -> AppkitResult<T>
    where
        F: FnOnce(&BlockchainContext) -> AppkitResult<T>,
    {
        let ctx = BlockchainContext::build(self.source.clone(), self.network)?;
        action(&ctx)
    }
}
