//! Test harness for integration tests.
//!
//! `MockDataSource` keeps an in-memory UTXO set: submitted transactions
//! spend their inputs and add their outputs, so flows can be chained.

use ergo_appkit::{
    parse_address, Address, AppkitError, AppkitResult, BlockchainContext, BlockchainDataSource,
    ErgoBox, ErgoClient, Header, NetworkPrefix, NodeInfo, ProtocolParameters,
};
use ergo_lib::chain::transaction::Transaction;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

use crate::generators::header_chain;

/// In-memory chain with a UTXO set and the node wallet's boxes.
pub struct MockDataSource {
    network: NetworkPrefix,
    headers: Vec<Header>,
    utxo: RwLock<Vec<ErgoBox>>,
    wallet_boxes: RwLock<Vec<ErgoBox>>,
    submitted: Mutex<Vec<Transaction>>,
    reject_submissions: bool,
}

impl MockDataSource {
    /// Eleven headers ending at `height`.
    pub fn new(network: NetworkPrefix, height: u32) -> Self {
        Self {
            network,
            headers: header_chain(11, height - 10),
            utxo: RwLock::new(Vec::new()),
            wallet_boxes: RwLock::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
            reject_submissions: false,
        }
    }

    /// Replace the headers served by `last_headers`.
    pub fn with_headers(mut self, headers: Vec<Header>) -> Self {
        self.headers = headers;
        self
    }

    /// Make every submission fail as if the node rejected it.
    pub fn rejecting_submissions(mut self) -> Self {
        self.reject_submissions = true;
        self
    }

    pub fn add_utxo(&self, ergo_box: ErgoBox) {
        self.utxo.write().push(ergo_box);
    }

    pub fn add_wallet_box(&self, ergo_box: ErgoBox) {
        self.wallet_boxes.write().push(ergo_box);
    }

    pub fn utxo(&self) -> Vec<ErgoBox> {
        self.utxo.read().clone()
    }

    pub fn submitted(&self) -> Vec<Transaction> {
        self.submitted.lock().clone()
    }

    /// Total value of unspent boxes guarded by `address`.
    pub fn balance_of(&self, address: &Address) -> u64 {
        let tree = address.script().unwrap();
        self.utxo
            .read()
            .iter()
            .filter(|b| b.ergo_tree == tree)
            .map(|b| u64::from(b.value))
            .sum()
    }
}

impl BlockchainDataSource for MockDataSource {
    fn node_info(&self) -> AppkitResult<NodeInfo> {
        Ok(NodeInfo {
            name: "mock-node".into(),
            app_version: "0.0.0".into(),
            full_height: self.headers.last().map(|h| h.height),
            headers_height: self.headers.last().map(|h| h.height),
            parameters: ProtocolParameters::default(),
        })
    }

    fn last_headers(&self, count: usize) -> AppkitResult<Vec<Header>> {
        let skip = self.headers.len().saturating_sub(count);
        Ok(self.headers[skip..].to_vec())
    }

    fn box_by_id(&self, box_id: &str) -> AppkitResult<Option<ErgoBox>> {
        Ok(self
            .utxo
            .read()
            .iter()
            .find(|b| hex::encode(b.box_id().as_ref()) == box_id)
            .cloned())
    }

    fn unspent_boxes_for(&self, address: &str) -> AppkitResult<Vec<ErgoBox>> {
        let tree = parse_address(self.network, address)?.script()?;
        Ok(self
            .utxo
            .read()
            .iter()
            .filter(|b| b.ergo_tree == tree)
            .cloned()
            .collect())
    }

    fn unspent_boxes_for_template(&self, template: &str) -> AppkitResult<Vec<ErgoBox>> {
        Ok(self
            .utxo
            .read()
            .iter()
            .filter(|b| {
                b.ergo_tree
                    .template_bytes()
                    .map(|t| hex::encode(t) == template)
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    fn wallet_unspent_boxes(&self, _: u32, _: u32) -> AppkitResult<Vec<ErgoBox>> {
        Ok(self.wallet_boxes.read().clone())
    }

    fn send_transaction(&self, tx: &Transaction) -> AppkitResult<String> {
        let endpoint = "mock://transactions".to_string();
        if self.reject_submissions {
            return Err(AppkitError::Api {
                endpoint,
                message: "transaction rejected".into(),
            });
        }
        let mut utxo = self.utxo.write();
        // Reject before touching the set so a failed submission changes nothing
        if let Some(missing) = tx
            .inputs
            .iter()
            .find(|input| !utxo.iter().any(|b| b.box_id() == input.box_id))
        {
            return Err(AppkitError::Api {
                endpoint,
                message: format!("input {} is not unspent", hex::encode(missing.box_id.as_ref())),
            });
        }
        utxo.retain(|b| tx.inputs.iter().all(|input| input.box_id != b.box_id()));
        utxo.extend(tx.outputs.iter().cloned());
        self.submitted.lock().push(tx.clone());
        Ok(hex::encode(tx.id().as_ref()))
    }
}

/// `ErgoClient` over a shared `MockDataSource`.
pub struct MockErgoClient {
    source: Arc<MockDataSource>,
    network: NetworkPrefix,
}

impl MockErgoClient {
    pub fn new(source: MockDataSource) -> Self {
        let network = source.network;
        Self {
            source: Arc::new(source),
            network,
        }
    }

    pub fn source(&self) -> &MockDataSource {
        &self.source
    }
}

impl ErgoClient for MockErgoClient {
    fn execute<T, F>(&self, action: F) -> AppkitResult<T>
    where
        F: FnOnce(&BlockchainContext) -> AppkitResult<T>,
    {
        let ctx = BlockchainContext::build(self.source.clone(), self.network)?;
        action(&ctx)
    }
}
