//! Common transaction flows built on the context, builder and prover.

use crate::box_selector::select_top_erg;
use crate::context::BlockchainContext;
use crate::contract::{parse_address, ErgoContract};
use crate::parameters::MIN_FEE;
use crate::prover::ErgoProver;
use crate::secret_storage::SecretStorage;
use crate::transaction::SignedTx;
use crate::tx_builder::UnsignedTransactionBuilder;
use crate::{AppkitError, AppkitResult};
use ergo_lib::ergotree_ir::chain::{address::Address, ergo_box::ErgoBox};
use std::path::Path;
use tracing::{debug, info};

fn with_fee(amount: u64) -> AppkitResult<u64> {
    amount
        .checked_add(MIN_FEE)
        .ok_or_else(|| AppkitError::InvalidAmount(format!("{} plus fee overflows", amount)))
}

/// Unlock a secret storage file and build a prover from its key.
pub fn create_prover<P: AsRef<Path>>(
    ctx: &BlockchainContext,
    storage_file: P,
    storage_password: &str,
) -> AppkitResult<ErgoProver> {
    let storage = SecretStorage::load_from(storage_file)?;
    storage.unlock(storage_password)?;
    let mut builder = ctx.new_prover_builder();
    builder.with_secret_storage(&storage)?;
    builder.build()
}

/// First-fit unspent boxes of `address` covering `amount`.
pub fn load_top(ctx: &BlockchainContext, address: &str, amount: u64) -> AppkitResult<Vec<ErgoBox>> {
    select_top_erg(&ctx.unspent_boxes_for(address)?, amount)
}

/// Spend `boxes` paying `amount` to `recipient` with `fee`, returning change
/// to the prover, and sign the result.
pub fn spend_boxes_tx(
    ctx: &BlockchainContext,
    mut builder: UnsignedTransactionBuilder,
    boxes: Vec<ErgoBox>,
    prover: &ErgoProver,
    recipient: &Address,
    amount: u64,
    fee: u64,
) -> AppkitResult<SignedTx> {
    let payment = builder
        .out_box_builder()
        .value(amount)
        .contract(ErgoContract::from_address(recipient)?)
        .build()?;
    builder
        .boxes_to_spend(boxes)?
        .outputs(vec![payment])?
        .fee(fee)?
        .send_change_to(prover.p2pk_address()?)?;
    let signed = prover.sign(&builder.build()?)?;
    debug!(tx_id = %signed.id(), height = ctx.height(), amount, fee, "Payment signed");
    Ok(signed)
}

/// Lock `amount` under `contract`, paid from the prover's address, and
/// sign the transaction.
pub fn put_to_contract_tx(
    ctx: &BlockchainContext,
    prover: &ErgoProver,
    contract: ErgoContract,
    amount: u64,
) -> AppkitResult<SignedTx> {
    let boxes = load_top(ctx, &prover.address()?, with_fee(amount)?)?;
    let mut builder = ctx.new_tx_builder();
    let locked = builder
        .out_box_builder()
        .value(amount)
        .contract(contract)
        .build()?;
    builder
        .boxes_to_spend(boxes)?
        .outputs(vec![locked])?
        .fee(MIN_FEE)?
        .send_change_to(prover.p2pk_address()?)?;
    prover.sign(&builder.build()?)
}

/// Pay `amount` to an encoded `recipient` from the prover's address, sign
/// and submit. Returns the signed transaction as pretty JSON.
pub fn send(
    ctx: &BlockchainContext,
    prover: &ErgoProver,
    recipient: &str,
    amount: u64,
) -> AppkitResult<String> {
    let recipient = parse_address(ctx.network(), recipient)?;
    let boxes = load_top(ctx, &prover.address()?, with_fee(amount)?)?;

    let signed = spend_boxes_tx(
        ctx,
        ctx.new_tx_builder(),
        boxes,
        prover,
        &recipient,
        amount,
        MIN_FEE,
    )?;
    let tx_id = ctx.send_transaction(&signed)?;
    info!(tx_id = %tx_id, amount, "Payment sent");
    signed.to_json(true)
}
