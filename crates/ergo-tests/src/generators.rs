//! Test data generators for integration tests.
//!
//! Provides boxes, tokens, headers and keys, plus proptest strategies for
//! box lists.

use ergo_appkit::{Address, ErgoBox, Header, Token};
use ergo_lib::chain::ergo_state_context::ErgoStateContext;
use ergo_lib::ergo_chain_types::Digest32;
use ergo_lib::ergotree_interpreter::sigma_protocol::private_input::DlogProverInput;
use ergo_lib::ergotree_ir::chain::ergo_box::{
    box_value::BoxValue, BoxTokens, ErgoBoxCandidate, NonMandatoryRegisters,
};
use ergo_lib::ergotree_ir::chain::token::{TokenAmount, TokenId};
use ergo_lib::ergotree_ir::chain::tx_id::TxId;
use ergo_lib::ergotree_ir::ergo_tree::ErgoTree;
use ergo_lib::ergotree_ir::mir::constant::Constant;
use ergo_lib::ergotree_ir::mir::expr::Expr;
use ergo_lib::ergotree_ir::sigma_protocol::sigma_boolean::{SigmaBoolean, SigmaProp};
use proptest::prelude::*;
use proptest::strategy::ValueTree;
use proptest::test_runner::TestRunner;
use std::convert::TryFrom;
use std::sync::atomic::{AtomicU64, Ordering};

/// Mnemonic with known derived addresses.
pub const TEST_MNEMONIC: &str =
    "slow silly start wash bundle suffer bulb ancient height spin express remind today effort helmet";

/// Global counter for unique ID generation
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique test transaction ID.
pub fn test_tx_id() -> TxId {
    let counter = ID_COUNTER.fetch_add(1, Ordering::SeqCst);
    let mut id = [0u8; 32];
    id[0] = 0xAA;
    id[1..9].copy_from_slice(&counter.to_be_bytes());
    TxId::from(Digest32::from(id))
}

/// Tree that any prover can satisfy.
pub fn true_tree() -> ErgoTree {
    let sigma_prop = SigmaProp::new(SigmaBoolean::TrivialProp(true));
    let constant: Constant = sigma_prop.into();
    ErgoTree::try_from(Expr::Const(constant)).unwrap()
}

/// Box with a unique id guarded by `tree`.
pub fn make_box(value: u64, tree: ErgoTree, tokens: Vec<Token>) -> ErgoBox {
    let candidate = ErgoBoxCandidate {
        value: BoxValue::try_from(value).unwrap(),
        ergo_tree: tree,
        tokens: if tokens.is_empty() {
            None
        } else {
            Some(BoxTokens::from_vec(tokens).unwrap())
        },
        additional_registers: NonMandatoryRegisters::empty(),
        creation_height: 1,
    };
    ErgoBox::from_box_candidate(&candidate, test_tx_id(), 0).unwrap()
}

/// Box spendable by anyone.
pub fn open_box(value: u64) -> ErgoBox {
    make_box(value, true_tree(), Vec::new())
}

/// Box spendable by the owner of `address`.
pub fn box_for(address: &Address, value: u64) -> ErgoBox {
    make_box(value, address.script().unwrap(), Vec::new())
}

pub fn token(id_byte: u8, amount: u64) -> Token {
    let mut id = [0u8; 32];
    id[0] = id_byte;
    Token {
        token_id: TokenId::from(Digest32::from(id)),
        amount: TokenAmount::try_from(amount).unwrap(),
    }
}

/// Fresh random P2PK key and its address.
pub fn random_key() -> (DlogProverInput, Address) {
    let secret = DlogProverInput::random();
    let address = Address::P2Pk(secret.public_image());
    (secret, address)
}

/// Generate a single arbitrary value.
pub fn force_any_val<T: Arbitrary>() -> T {
    let mut runner = TestRunner::default();
    any::<T>().new_tree(&mut runner).unwrap().current()
}

pub fn state_context() -> ErgoStateContext {
    force_any_val::<ErgoStateContext>()
}

/// Headers at consecutive heights, oldest first.
pub fn header_chain(count: u32, first_height: u32) -> Vec<Header> {
    (0..count)
        .map(|i| {
            let mut header = force_any_val::<Header>();
            header.height = first_height + i;
            header
        })
        .collect()
}

// ============================================================================
// Proptest strategies
// ============================================================================

/// nanoERG values from dust up to 100 ERG.
pub fn arb_box_value() -> impl Strategy<Value = u64> {
    1u64..=100_000_000_000u64
}

/// A box, carrying a token of id 1 roughly one time in four.
pub fn arb_box() -> impl Strategy<Value = ErgoBox> {
    (arb_box_value(), 0u8..4, 1u64..1_000).prop_map(|(value, kind, amount)| {
        if kind == 0 {
            make_box(value, true_tree(), vec![token(1, amount)])
        } else {
            open_box(value)
        }
    })
}

pub fn arb_boxes(max: usize) -> impl Strategy<Value = Vec<ErgoBox>> {
    prop::collection::vec(arb_box(), 0..max)
}
