//! Box and context fixtures shared by unit tests.

use crate::data_source::{BlockchainDataSource, NodeInfo, ProtocolParameters};
use crate::AppkitResult;
use ergo_lib::chain::ergo_state_context::ErgoStateContext;
use ergo_lib::chain::transaction::Transaction;
use ergo_lib::ergo_chain_types::Header;
use ergo_lib::ergo_chain_types::Digest32;
use ergo_lib::ergotree_ir::chain::address::Address;
use ergo_lib::ergotree_ir::chain::ergo_box::{
    box_value::BoxValue, BoxTokens, ErgoBox, ErgoBoxCandidate, NonMandatoryRegisters,
};
use ergo_lib::ergotree_ir::chain::token::{Token, TokenAmount, TokenId};
use ergo_lib::ergotree_ir::chain::tx_id::TxId;
use ergo_lib::ergotree_ir::ergo_tree::ErgoTree;
use ergo_lib::ergotree_ir::mir::constant::Constant;
use ergo_lib::ergotree_ir::mir::expr::Expr;
use ergo_lib::ergotree_ir::sigma_protocol::sigma_boolean::{SigmaBoolean, SigmaProp};
use proptest::arbitrary::{any, Arbitrary};
use proptest::strategy::{Strategy, ValueTree};
use proptest::test_runner::TestRunner;
use parking_lot::Mutex;
use std::convert::TryFrom;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const TEST_MNEMONIC: &str =
    "slow silly start wash bundle suffer bulb ancient height spin express remind today effort helmet";

/// Tree that any prover can satisfy.
pub fn true_tree() -> ErgoTree {
    let sigma_prop = SigmaProp::new(SigmaBoolean::TrivialProp(true));
    let constant: Constant = sigma_prop.into();
    ErgoTree::try_from(Expr::Const(constant)).unwrap()
}

fn box_from(value: u64, seed: u8, ergo_tree: ErgoTree, tokens: Option<BoxTokens>) -> ErgoBox {
    let candidate = ErgoBoxCandidate {
        value: BoxValue::try_from(value).unwrap(),
        ergo_tree,
        tokens,
        additional_registers: NonMandatoryRegisters::empty(),
        creation_height: 1,
    };
    let mut tx_id_bytes = [0u8; 32];
    tx_id_bytes[0] = seed;
    let tx_id = TxId::from(Digest32::from(tx_id_bytes));
    ErgoBox::from_box_candidate(&candidate, tx_id, 0).unwrap()
}

/// Box guarded by `true` with a unique id per seed.
pub fn mock_box(value: u64, seed: u8) -> ErgoBox {
    box_from(value, seed, true_tree(), None)
}

pub fn mock_box_with_tokens(value: u64, seed: u8, tokens: Vec<Token>) -> ErgoBox {
    box_from(value, seed, true_tree(), Some(BoxTokens::from_vec(tokens).unwrap()))
}

/// Box guarded by a single sigma proposition.
pub fn mock_box_guarded_by(value: u64, seed: u8, proposition: SigmaBoolean) -> ErgoBox {
    let constant: Constant = SigmaProp::new(proposition).into();
    let tree = ErgoTree::try_from(Expr::Const(constant)).unwrap();
    box_from(value, seed, tree, None)
}

/// Box spendable only by the owner of `address`.
pub fn mock_box_for(value: u64, seed: u8, address: &Address) -> ErgoBox {
    box_from(value, seed, address.script().unwrap(), None)
}

pub fn mock_token(id_byte: u8, amount: u64) -> Token {
    let mut id = [0u8; 32];
    id[0] = id_byte;
    Token {
        token_id: TokenId::from(Digest32::from(id)),
        amount: TokenAmount::try_from(amount).unwrap(),
    }
}

/// Generate a single arbitrary value.
pub fn force_any_val<T: Arbitrary>() -> T {
    let mut runner = TestRunner::default();
    any::<T>().new_tree(&mut runner).unwrap().current()
}

pub fn state_context() -> ErgoStateContext {
    force_any_val::<ErgoStateContext>()
}

/// `count` headers with consecutive heights starting at `first_height`,
/// oldest first as the node returns them.
pub fn mock_headers(count: u32, first_height: u32) -> Vec<Header> {
    (0..count)
        .map(|i| {
            let mut header = force_any_val::<Header>();
            header.height = first_height + i;
            header
        })
        .collect()
}

/// In-memory data source keyed by address strings.
#[derive(Default)]
pub struct MemorySource {
    pub headers: Vec<Header>,
    pub boxes: Vec<(String, ErgoBox)>,
    pub wallet_boxes: Vec<ErgoBox>,
    pub wallet_loads: AtomicUsize,
    pub submitted: Mutex<Vec<Transaction>>,
}

impl MemorySource {
    pub fn with_headers(headers: Vec<Header>) -> Self {
        Self {
            headers,
            ..Default::default()
        }
    }

    pub fn add_box(&mut self, address: &str, ergo_box: ErgoBox) {
        self.boxes.push((address.to_string(), ergo_box));
    }
}

impl BlockchainDataSource for MemorySource {
    fn node_info(&self) -> AppkitResult<NodeInfo> {
        Ok(NodeInfo {
            name: "memory".into(),
            app_version: "test".into(),
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
            .boxes
            .iter()
            .map(|(_, b)| b)
            .find(|b| hex::encode(b.box_id().as_ref()) == box_id)
            .cloned())
    }

    fn unspent_boxes_for(&self, address: &str) -> AppkitResult<Vec<ErgoBox>> {
        Ok(self
            .boxes
            .iter()
            .filter(|(a, _)| a == address)
            .map(|(_, b)| b.clone())
            .collect())
    }

    fn unspent_boxes_for_template(&self, _template: &str) -> AppkitResult<Vec<ErgoBox>> {
        Ok(Vec::new())
    }

    fn wallet_unspent_boxes(&self, _: u32, _: u32) -> AppkitResult<Vec<ErgoBox>> {
        self.wallet_loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.wallet_boxes.clone())
    }

    fn send_transaction(&self, tx: &Transaction) -> AppkitResult<String> {
        self.submitted.lock().push(tx.clone());
        Ok(hex::encode(tx.id().as_ref()))
    }
}
