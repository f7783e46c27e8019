//! Unsigned transaction assembly.
//!
//! The builder collects inputs, outputs, a fee and a change destination,
//! then computes change and appends the miner fee and change outputs. Change
//! smaller than `MIN_CHANGE_VALUE` is not returned; it is added to the fee.

use crate::box_selector::total_value;
use crate::contract::ErgoContract;
use crate::parameters::MIN_CHANGE_VALUE;
use crate::transaction::UnsignedTx;
use crate::{AppkitError, AppkitResult};
use ergo_lib::{
    chain::{
        ergo_box::box_builder::ErgoBoxCandidateBuilder,
        ergo_state_context::ErgoStateContext,
        transaction::{unsigned::UnsignedTransaction, DataInput, UnsignedInput},
    },
    ergotree_ir::{
        chain::{
            address::{Address, NetworkPrefix},
            ergo_box::{
                box_value::BoxValue, ErgoBox, ErgoBoxCandidate, NonMandatoryRegisterId,
                NonMandatoryRegisters,
            },
            token::Token,
            tx_id::TxId,
        },
        mir::constant::Constant,
    },
};
use std::convert::TryFrom;
use tracing::debug;

const REGISTER_IDS: [NonMandatoryRegisterId; 6] = [
    NonMandatoryRegisterId::R4,
    NonMandatoryRegisterId::R5,
    NonMandatoryRegisterId::R6,
    NonMandatoryRegisterId::R7,
    NonMandatoryRegisterId::R8,
    NonMandatoryRegisterId::R9,
];

fn box_value(amount: u64) -> AppkitResult<BoxValue> {
    BoxValue::try_from(amount).map_err(|e| AppkitError::InvalidAmount(e.to_string()))
}

fn check_registers(registers: &[Constant]) -> AppkitResult<()> {
    if registers.len() > REGISTER_IDS.len() {
        return Err(AppkitError::TooManyRegisters(registers.len()));
    }
    Ok(())
}

/// Candidate with registers filled densely from R4.
fn build_candidate(
    value: u64,
    contract: &ErgoContract,
    tokens: &[Token],
    registers: &[Constant],
    height: u32,
) -> AppkitResult<ErgoBoxCandidate> {
    check_registers(registers)?;
    let mut builder =
        ErgoBoxCandidateBuilder::new(box_value(value)?, contract.ergo_tree().clone(), height);
    for token in tokens {
        builder.add_token(token.clone());
    }
    for (id, constant) in REGISTER_IDS.iter().zip(registers) {
        builder.set_register_value(*id, constant.clone());
    }
    Ok(builder.build()?)
}

/// An output box candidate, not yet part of any accepted transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct OutBox {
    candidate: ErgoBoxCandidate,
}

impl OutBox {
    pub fn new(candidate: ErgoBoxCandidate) -> Self {
        Self { candidate }
    }

    /// Value in nanoERG.
    pub fn value(&self) -> u64 {
        u64::from(self.candidate.value)
    }

    pub fn candidate(&self) -> &ErgoBoxCandidate {
        &self.candidate
    }

    pub fn into_candidate(self) -> ErgoBoxCandidate {
        self.candidate
    }

    /// The box this candidate becomes as output `index` of transaction
    /// `tx_id`. Mostly useful to chain unsubmitted transactions.
    pub fn convert_to_input_with(&self, tx_id: TxId, index: u16) -> AppkitResult<ErgoBox> {
        ErgoBox::from_box_candidate(&self.candidate, tx_id, index)
            .map_err(|e| AppkitError::Transaction(e.to_string()))
    }
}

/// Builder for a single output box.
pub struct OutBoxBuilder {
    height: u32,
    value: Option<u64>,
    contract: Option<ErgoContract>,
    tokens: Vec<Token>,
    registers: Vec<Constant>,
}

impl OutBoxBuilder {
    /// New builder stamping `height` as the creation height.
    pub fn new(height: u32) -> Self {
        Self {
            height,
            value: None,
            contract: None,
            tokens: Vec::new(),
            registers: Vec::new(),
        }
    }

    pub fn value(mut self, value: u64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn contract(mut self, contract: ErgoContract) -> Self {
        self.contract = Some(contract);
        self
    }

    pub fn tokens(mut self, tokens: Vec<Token>) -> Self {
        self.tokens.extend(tokens);
        self
    }

    /// Register values, assigned to R4, R5, ... in order.
    pub fn registers(mut self, registers: Vec<Constant>) -> Self {
        self.registers.extend(registers);
        self
    }

    pub fn build(self) -> AppkitResult<OutBox> {
        let value = self.value.ok_or(AppkitError::MissingConfiguration("value"))?;
        let contract = self
            .contract
            .ok_or(AppkitError::MissingConfiguration("contract"))?;
        let candidate =
            build_candidate(value, &contract, &self.tokens, &self.registers, self.height)?;
        Ok(OutBox::new(candidate))
    }
}

#[derive(Debug, Clone)]
struct ChangeDestination {
    address: Address,
    registers: Vec<Constant>,
}

/// Single-use builder for an unsigned transaction.
///
/// Each of `boxes_to_spend`, `outputs`, `fee` and `send_change_to` may be
/// called once; a second call fails with `AlreadyConfigured`.
pub struct UnsignedTransactionBuilder {
    network: NetworkPrefix,
    height: u32,
    state_context: ErgoStateContext,
    inputs: Option<Vec<ErgoBox>>,
    data_inputs: Vec<ErgoBox>,
    outputs: Option<Vec<OutBox>>,
    fee: Option<u64>,
    change: Option<ChangeDestination>,
}

impl UnsignedTransactionBuilder {
    /// Create a builder for transactions at `height` signed against
    /// `state_context`.
    pub fn new(network: NetworkPrefix, height: u32, state_context: ErgoStateContext) -> Self {
        Self {
            network,
            height,
            state_context,
            inputs: None,
            data_inputs: Vec::new(),
            outputs: None,
            fee: None,
            change: None,
        }
    }

    pub fn network(&self) -> NetworkPrefix {
        self.network
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Output builder bound to this transaction's height.
    pub fn out_box_builder(&self) -> OutBoxBuilder {
        OutBoxBuilder::new(self.height)
    }

    /// Boxes to spend, in the order they become inputs.
    pub fn boxes_to_spend(&mut self, boxes: Vec<ErgoBox>) -> AppkitResult<&mut Self> {
        if self.inputs.is_some() {
            return Err(AppkitError::AlreadyConfigured("inputs"));
        }
        self.inputs = Some(boxes);
        Ok(self)
    }

    /// Boxes read (not spent) by the transaction scripts.
    pub fn with_data_inputs(&mut self, boxes: Vec<ErgoBox>) -> &mut Self {
        self.data_inputs.extend(boxes);
        self
    }

    pub fn outputs(&mut self, outputs: Vec<OutBox>) -> AppkitResult<&mut Self> {
        if self.outputs.is_some() {
            return Err(AppkitError::AlreadyConfigured("outputs"));
        }
        self.outputs = Some(outputs);
        Ok(self)
    }

    /// Miner fee in nanoERG. Zero is allowed.
    pub fn fee(&mut self, fee: u64) -> AppkitResult<&mut Self> {
        if self.fee.is_some() {
            return Err(AppkitError::AlreadyConfigured("fee"));
        }
        self.fee = Some(fee);
        Ok(self)
    }

    pub fn send_change_to(&mut self, address: Address) -> AppkitResult<&mut Self> {
        self.send_change_to_with_registers(address, Vec::new())
    }

    /// Change destination with register values for the change box.
    pub fn send_change_to_with_registers(
        &mut self,
        address: Address,
        registers: Vec<Constant>,
    ) -> AppkitResult<&mut Self> {
        if self.change.is_some() {
            return Err(AppkitError::AlreadyConfigured("change address"));
        }
        check_registers(&registers)?;
        self.change = Some(ChangeDestination { address, registers });
        Ok(self)
    }

    /// Compute change and fee and produce the unsigned transaction.
    ///
    /// Outputs are ordered as declared, then the fee output, then change.
    pub fn build(self) -> AppkitResult<UnsignedTx> {
        let fee = self.fee.ok_or(AppkitError::MissingConfiguration("fee"))?;
        let inputs = self
            .inputs
            .ok_or(AppkitError::MissingConfiguration("inputs"))?;
        let outputs = self.outputs.unwrap_or_default();

        let input_total = total_value(&inputs)
            .ok_or_else(|| AppkitError::InvalidAmount("input total overflows u64".into()))?;
        let output_total = outputs
            .iter()
            .try_fold(fee, |acc, o| acc.checked_add(o.value()))
            .ok_or_else(|| AppkitError::InvalidAmount("output total overflows u64".into()))?;
        if input_total < output_total {
            return Err(AppkitError::InsufficientFunds {
                needed: output_total,
                available: input_total,
            });
        }

        let change = input_total - output_total;
        let send_change = change >= MIN_CHANGE_VALUE;
        let actual_fee = if send_change { fee } else { fee + change };

        let mut candidates: Vec<ErgoBoxCandidate> =
            outputs.into_iter().map(OutBox::into_candidate).collect();
        if actual_fee > 0 {
            candidates.push(ErgoBoxCandidate {
                value: box_value(actual_fee)?,
                ergo_tree: ErgoContract::miner_fee()?.ergo_tree().clone(),
                tokens: None,
                additional_registers: NonMandatoryRegisters::empty(),
                creation_height: self.height,
            });
        }
        if send_change {
            let destination = self
                .change
                .ok_or(AppkitError::MissingConfiguration("change address"))?;
            let contract = ErgoContract::from_address(&destination.address)?;
            candidates.push(build_candidate(
                change,
                &contract,
                &[],
                &destination.registers,
                self.height,
            )?);
        }

        let unsigned_inputs: Vec<UnsignedInput> =
            inputs.iter().cloned().map(UnsignedInput::from).collect();
        let data_inputs: Vec<DataInput> = self
            .data_inputs
            .iter()
            .map(|b| DataInput::from(b.box_id()))
            .collect();
        let tx = UnsignedTransaction::new_from_vec(unsigned_inputs, data_inputs, candidates)
            .map_err(|e| AppkitError::Transaction(e.to_string()))?;

        debug!(
            inputs = inputs.len(),
            input_total,
            fee = actual_fee,
            change = if send_change { change } else { 0 },
            "Built unsigned transaction"
        );
        Ok(UnsignedTx::new(
            tx,
            inputs,
            self.data_inputs,
            self.state_context,
        ))
    }
}
