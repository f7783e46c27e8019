//! Property-based tests using proptest.
//!
//! Box selection and transaction assembly are checked against randomly
//! generated box lists and amounts.

use crate::generators::{arb_boxes, open_box, random_key, state_context, token};
use ergo_appkit::parameters::{MIN_CHANGE_VALUE, MIN_FEE};
use ergo_appkit::{
    select_top, select_top_erg, AppkitError, ErgoBox, ErgoContract, NetworkPrefix,
    UnsignedTransactionBuilder,
};
use proptest::prelude::*;

fn values(boxes: &[ErgoBox]) -> u64 {
    boxes.iter().map(|b| u64::from(b.value)).sum()
}

fn has_tokens(ergo_box: &ErgoBox) -> bool {
    ergo_box.tokens.is_some()
}

// ============================================================================
// Box Selection Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn zero_amount_returns_input(boxes in arb_boxes(12)) {
        let selected = select_top_erg(&boxes, 0).unwrap();
        prop_assert_eq!(selected, boxes);
    }

    #[test]
    fn erg_selection_skips_token_boxes(
        boxes in arb_boxes(12),
        amount in 1u64..=200_000_000_000u64,
    ) {
        if let Ok(selected) = select_top_erg(&boxes, amount) {
            prop_assert!(selected.iter().all(|b| !has_tokens(b)));
        }
    }

    #[test]
    fn selection_is_minimal_prefix(
        boxes in arb_boxes(12),
        amount in 1u64..=200_000_000_000u64,
    ) {
        let plain: Vec<ErgoBox> = boxes.iter().filter(|b| !has_tokens(b)).cloned().collect();
        if let Ok(selected) = select_top_erg(&boxes, amount) {
            prop_assert!(values(&selected) >= amount);
            prop_assert_eq!(&selected[..], &plain[..selected.len()]);
            // Dropping the last box leaves the amount uncovered
            let without_last = &selected[..selected.len() - 1];
            prop_assert!(values(without_last) < amount);
        }
    }

    #[test]
    fn selection_fails_iff_plain_total_short(
        boxes in arb_boxes(12),
        amount in 1u64..=200_000_000_000u64,
    ) {
        let plain_total: u64 = boxes
            .iter()
            .filter(|b| !has_tokens(b))
            .map(|b| u64::from(b.value))
            .sum();
        match select_top_erg(&boxes, amount) {
            Ok(_) => prop_assert!(plain_total >= amount),
            Err(AppkitError::InsufficientFunds { needed, available }) => {
                prop_assert!(plain_total < amount);
                prop_assert_eq!(needed, amount);
                prop_assert_eq!(available, plain_total);
            }
            Err(e) => prop_assert!(false, "unexpected error: {}", e),
        }
    }

    #[test]
    fn token_selection_collects_token(
        boxes in arb_boxes(12),
        wanted in 1u64..2_000,
    ) {
        let wanted_token = token(1, wanted);
        let available: u64 = boxes
            .iter()
            .flat_map(|b| b.tokens.iter().flat_map(|t| t.as_slice().to_vec()))
            .filter(|t| t.token_id == wanted_token.token_id)
            .map(|t| u64::from(t.amount))
            .sum();
        match select_top(&boxes, 0, Some(&wanted_token)) {
            Ok(selected) => {
                let collected: u64 = selected
                    .iter()
                    .flat_map(|b| b.tokens.iter().flat_map(|t| t.as_slice().to_vec()))
                    .map(|t| u64::from(t.amount))
                    .sum();
                prop_assert!(collected >= wanted);
            }
            Err(AppkitError::InsufficientTokens { needed, found, .. }) => {
                prop_assert!(available < wanted);
                prop_assert_eq!(needed, wanted);
                prop_assert_eq!(found, available);
            }
            Err(e) => prop_assert!(false, "unexpected error: {}", e),
        }
    }
}

// ============================================================================
// Transaction Builder Properties
// ============================================================================

fn arb_input_values() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(1_000_000u64..=10_000_000_000u64, 1..5)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn built_transaction_conserves_value(
        input_values in arb_input_values(),
        payment_percent in 0u64..=95,
        fee in 0u64..=2 * MIN_FEE,
    ) {
        let inputs: Vec<ErgoBox> = input_values.iter().map(|v| open_box(*v)).collect();
        let input_total = values(&inputs);
        let payment = (input_total / 100 * payment_percent).max(1_000_000);
        prop_assume!(input_total >= payment + fee);

        let (_, change_address) = random_key();
        let (_, recipient) = random_key();
        let mut builder =
            UnsignedTransactionBuilder::new(NetworkPrefix::Mainnet, 100_000, state_context());
        let out = builder
            .out_box_builder()
            .value(payment)
            .contract(ErgoContract::from_address(&recipient).unwrap())
            .build()
            .unwrap();
        builder
            .boxes_to_spend(inputs)
            .unwrap()
            .outputs(vec![out])
            .unwrap()
            .fee(fee)
            .unwrap()
            .send_change_to(change_address.clone())
            .unwrap();
        let unsigned = builder.build().unwrap();

        let outputs = unsigned.outputs();
        let output_total: u64 = outputs.iter().map(|o| u64::from(o.value)).sum();
        prop_assert_eq!(output_total, input_total);
        prop_assert_eq!(u64::from(outputs[0].value), payment);

        let change = input_total - payment - fee;
        let fee_tree = ErgoContract::miner_fee().unwrap().ergo_tree().clone();
        let fee_value: u64 = outputs
            .iter()
            .filter(|o| o.ergo_tree == fee_tree)
            .map(|o| u64::from(o.value))
            .sum();
        let change_tree = change_address.script().unwrap();
        let change_outputs: Vec<_> =
            outputs.iter().filter(|o| o.ergo_tree == change_tree).collect();

        if change >= MIN_CHANGE_VALUE {
            prop_assert_eq!(change_outputs.len(), 1);
            prop_assert_eq!(u64::from(change_outputs[0].value), change);
            prop_assert_eq!(fee_value, fee);
        } else {
            prop_assert!(change_outputs.is_empty());
            prop_assert_eq!(fee_value, fee + change);
        }
    }

    #[test]
    fn builder_rejects_short_inputs(
        input_values in arb_input_values(),
        extra in 1_000_000u64..=1_000_000_000u64,
    ) {
        let inputs: Vec<ErgoBox> = input_values.iter().map(|v| open_box(*v)).collect();
        let input_total = values(&inputs);
        // Inputs are at least MIN_FEE each
        let payment = input_total - MIN_FEE + extra;

        let (_, address) = random_key();
        let mut builder =
            UnsignedTransactionBuilder::new(NetworkPrefix::Mainnet, 100_000, state_context());
        let out = builder
            .out_box_builder()
            .value(payment)
            .contract(ErgoContract::from_address(&address).unwrap())
            .build()
            .unwrap();
        builder
            .boxes_to_spend(inputs)
            .unwrap()
            .outputs(vec![out])
            .unwrap()
            .fee(MIN_FEE)
            .unwrap()
            .send_change_to(address)
            .unwrap();

        match builder.build() {
            Err(AppkitError::InsufficientFunds { needed, available }) => {
                prop_assert_eq!(needed, payment + MIN_FEE);
                prop_assert_eq!(available, input_total);
            }
            other => prop_assert!(false, "expected InsufficientFunds, got {:?}", other.err()),
        }
    }
}
