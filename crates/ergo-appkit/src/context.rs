//! Blockchain context: a snapshot of the chain tip used to build and sign
//! transactions.

use crate::box_selector::select_top_erg;
use crate::data_source::{BlockchainDataSource, NodeInfo};
use crate::parameters::NUM_LAST_HEADERS;
use crate::prover::ErgoProverBuilder;
use crate::transaction::SignedTx;
use crate::tx_builder::UnsignedTransactionBuilder;
use crate::wallet::ErgoWallet;
use crate::{AppkitError, AppkitResult};
use ergo_lib::{
    chain::{ergo_state_context::ErgoStateContext, parameters::Parameters},
    ergo_chain_types::{Header, PreHeader},
    ergotree_ir::chain::{address::NetworkPrefix, ergo_box::ErgoBox},
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Chain state at the time the context was built, plus access to the
/// data source it was built from.
pub struct BlockchainContext {
    source: Arc<dyn BlockchainDataSource>,
    network: NetworkPrefix,
    node_info: NodeInfo,
    headers: Vec<Header>,
    state_context: ErgoStateContext,
    wallet: ErgoWallet,
}

impl BlockchainContext {
    /// Fetch node info and the last headers and snapshot them.
    ///
    /// One header more than the state context keeps is fetched: the newest
    /// becomes the pre-header and sets the context height, the next ten are
    /// the state context's last headers. Headers are kept newest first.
    #[instrument(skip(source))]
    pub fn build(
        source: Arc<dyn BlockchainDataSource>,
        network: NetworkPrefix,
    ) -> AppkitResult<Self> {
        let needed = NUM_LAST_HEADERS + 1;
        let node_info = source.node_info()?;
        let mut headers = source.last_headers(needed)?;
        if headers.len() < needed {
            return Err(AppkitError::NotEnoughHeaders {
                needed,
                got: headers.len(),
            });
        }
        headers.reverse();
        headers.truncate(needed);

        let pre_header = PreHeader::from(headers[0].clone());
        let last_headers: [Header; NUM_LAST_HEADERS] = headers[1..]
            .to_vec()
            .try_into()
            .map_err(|v: Vec<Header>| AppkitError::NotEnoughHeaders {
                needed,
                got: v.len() + 1,
            })?;
        let parameters = Parameters::from(&node_info.parameters);
        let state_context = ErgoStateContext::new(pre_header, last_headers, parameters);

        info!(height = headers[0].height, "Blockchain context built");
        Ok(Self {
            wallet: ErgoWallet::new(source.clone()),
            source,
            network,
            node_info,
            headers,
            state_context,
        })
    }

    pub fn network(&self) -> NetworkPrefix {
        self.network
    }

    /// Height of the newest header.
    pub fn height(&self) -> u32 {
        self.headers[0].height
    }

    pub fn node_info(&self) -> &NodeInfo {
        &self.node_info
    }

    /// Protocol parameters reported by the node.
    pub fn parameters(&self) -> Parameters {
        Parameters::from(&self.node_info.parameters)
    }

    /// Fetched headers, newest first. The first one is the pre-header's
    /// source; the rest are the state context's last headers.
    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    pub fn state_context(&self) -> &ErgoStateContext {
        &self.state_context
    }

    pub fn data_source(&self) -> &Arc<dyn BlockchainDataSource> {
        &self.source
    }

    pub fn new_tx_builder(&self) -> UnsignedTransactionBuilder {
        UnsignedTransactionBuilder::new(self.network, self.height(), self.state_context.clone())
    }

    pub fn new_prover_builder(&self) -> ErgoProverBuilder {
        ErgoProverBuilder::new(self.network, self.parameters())
    }

    /// Load unspent boxes by hex id, in the order given.
    pub fn boxes_by_id(&self, box_ids: &[&str]) -> AppkitResult<Vec<ErgoBox>> {
        box_ids
            .iter()
            .map(|id| {
                self.source
                    .box_by_id(id)?
                    .ok_or_else(|| AppkitError::BoxNotFound(id.to_string()))
            })
            .collect()
    }

    /// Unspent boxes of an encoded address.
    pub fn unspent_boxes_for(&self, address: &str) -> AppkitResult<Vec<ErgoBox>> {
        let boxes = self.source.unspent_boxes_for(address)?;
        debug!(address, count = boxes.len(), "Loaded unspent boxes");
        Ok(boxes)
    }

    /// Unspent boxes of an encoded address covering `amount`.
    pub fn unspent_boxes_covering(&self, address: &str, amount: u64) -> AppkitResult<Vec<ErgoBox>> {
        select_top_erg(&self.unspent_boxes_for(address)?, amount)
    }

    pub fn unspent_boxes_for_template(&self, template: &str) -> AppkitResult<Vec<ErgoBox>> {
        self.source.unspent_boxes_for_template(template)
    }

    /// Submit a signed transaction and return its id.
    pub fn send_transaction(&self, tx: &SignedTx) -> AppkitResult<String> {
        let tx_id = self.source.send_transaction(tx.transaction())?;
        info!(tx_id = %tx_id, "Transaction submitted");
        Ok(tx_id)
    }

    pub fn signed_tx_from_json(&self, json: &str) -> AppkitResult<SignedTx> {
        SignedTx::from_json(json)
    }

    /// The node wallet.
    pub fn wallet(&self) -> &ErgoWallet {
        &self.wallet
    }
}

/// Entry point for running code against a freshly built context.
pub trait ErgoClient {
    /// Build a context and pass it to `action`.
    fn execute<T, F>(&self, action: F) -> AppkitResult<T>
    where
        F: FnOnce(&BlockchainContext) -> AppkitResult<T>;
}
