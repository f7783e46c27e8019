//! Unsigned and signed transaction wrappers.

use crate::AppkitResult;
use ergo_lib::{
    chain::{
        ergo_state_context::ErgoStateContext,
        transaction::{unsigned::UnsignedTransaction, Transaction},
    },
    ergotree_ir::chain::ergo_box::{ErgoBox, ErgoBoxCandidate},
};

/// An unsigned transaction together with everything the prover needs:
/// the boxes it spends, the boxes it reads and the state snapshot taken
/// when it was built.
#[derive(Debug, Clone)]
pub struct UnsignedTx {
    tx: UnsignedTransaction,
    input_boxes: Vec<ErgoBox>,
    data_boxes: Vec<ErgoBox>,
    state_context: ErgoStateContext,
}

impl UnsignedTx {
    pub(crate) fn new(
        tx: UnsignedTransaction,
        input_boxes: Vec<ErgoBox>,
        data_boxes: Vec<ErgoBox>,
        state_context: ErgoStateContext,
    ) -> Self {
        Self {
            tx,
            input_boxes,
            data_boxes,
            state_context,
        }
    }

    pub fn unsigned_transaction(&self) -> &UnsignedTransaction {
        &self.tx
    }

    pub fn input_boxes(&self) -> &[ErgoBox] {
        &self.input_boxes
    }

    pub fn data_boxes(&self) -> &[ErgoBox] {
        &self.data_boxes
    }

    pub fn state_context(&self) -> &ErgoStateContext {
        &self.state_context
    }

    /// Output candidates in transaction order.
    pub fn outputs(&self) -> Vec<ErgoBoxCandidate> {
        self.tx.output_candidates.iter().cloned().collect()
    }

    /// Output values in transaction order.
    pub fn output_values(&self) -> Vec<u64> {
        self.tx
            .output_candidates
            .iter()
            .map(|o| u64::from(o.value))
            .collect()
    }
}

/// A transaction with a proof for every input.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedTx {
    tx: Transaction,
}

impl SignedTx {
    pub fn new(tx: Transaction) -> Self {
        Self { tx }
    }

    /// Decode a signed transaction from node JSON.
    pub fn from_json(json: &str) -> AppkitResult<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Hex encoded transaction id.
    pub fn id(&self) -> String {
        hex::encode(self.tx.id().as_ref())
    }

    pub fn transaction(&self) -> &Transaction {
        &self.tx
    }

    pub fn into_transaction(self) -> Transaction {
        self.tx
    }

    /// Node JSON encoding.
    pub fn to_json(&self, pretty: bool) -> AppkitResult<String> {
        let json = if pretty {
            serde_json::to_string_pretty(&self.tx)?
        } else {
            serde_json::to_string(&self.tx)?
        };
        Ok(json)
    }

    /// Outputs as boxes that later transactions can spend.
    pub fn outputs_to_spend(&self) -> Vec<ErgoBox> {
        self.tx.outputs.iter().cloned().collect()
    }
}

impl From<Transaction> for SignedTx {
    fn from(tx: Transaction) -> Self {
        Self::new(tx)
    }
}
