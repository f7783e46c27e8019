//! First-fit input selection.
//!
//! Boxes are scanned in the order the caller supplies them and taken until
//! the requested nanoERG amount (and optionally a token amount) is covered.
//! There is no attempt to minimize the number of inputs or the change.

use crate::{AppkitError, AppkitResult};
use ergo_lib::ergotree_ir::chain::{ergo_box::ErgoBox, token::Token};
use tracing::debug;

/// Tokens carried by a box, empty when it has none.
pub(crate) fn box_tokens(ergo_box: &ErgoBox) -> &[Token] {
    ergo_box.tokens.as_ref().map(|t| t.as_slice()).unwrap_or(&[])
}

/// Sum of box values, or `None` on overflow.
pub(crate) fn total_value(boxes: &[ErgoBox]) -> Option<u64> {
    boxes
        .iter()
        .try_fold(0u64, |acc, b| acc.checked_add(u64::from(b.value)))
}

/// Select boxes covering `amount_to_spend` nanoERG and, when given, the
/// token amount.
///
/// With a zero amount and no token the input is returned unchanged. When
/// no token is requested, boxes carrying any token are skipped so tokens
/// are never spent by accident.
pub fn select_top(
    boxes: &[ErgoBox],
    amount_to_spend: u64,
    token: Option<&Token>,
) -> AppkitResult<Vec<ErgoBox>> {
    if amount_to_spend == 0 && token.is_none() {
        return Ok(boxes.to_vec());
    }

    let needed_tokens = token.map(|t| u64::from(t.amount)).unwrap_or(0);
    let mut selected = Vec::new();
    let mut collected: u64 = 0;
    let mut collected_tokens: u64 = 0;

    for ergo_box in boxes {
        if collected >= amount_to_spend && collected_tokens >= needed_tokens {
            break;
        }
        let tokens = box_tokens(ergo_box);
        match token {
            None if !tokens.is_empty() => continue,
            None => {}
            Some(wanted) => {
                let found: u64 = tokens
                    .iter()
                    .filter(|t| t.token_id == wanted.token_id)
                    .map(|t| u64::from(t.amount))
                    .sum();
                collected_tokens = collected_tokens.saturating_add(found);
            }
        }
        collected = collected.saturating_add(u64::from(ergo_box.value));
        selected.push(ergo_box.clone());
    }

    if collected < amount_to_spend {
        return Err(AppkitError::InsufficientFunds {
            needed: amount_to_spend,
            available: collected,
        });
    }
    if let Some(wanted) = token {
        if collected_tokens < needed_tokens {
            return Err(AppkitError::InsufficientTokens {
                token_id: hex::encode(wanted.token_id.as_ref()),
                needed: needed_tokens,
                found: collected_tokens,
            });
        }
    }

    debug!(
        needed = amount_to_spend,
        collected,
        count = selected.len(),
        "Selected input boxes"
    );
    Ok(selected)
}

/// Select boxes covering an ERG amount only.
pub fn select_top_erg(boxes: &[ErgoBox], amount_to_spend: u64) -> AppkitResult<Vec<ErgoBox>> {
    select_top(boxes, amount_to_spend, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{mock_box, mock_box_with_tokens, mock_token};

    #[test]
    fn test_zero_amount_is_identity() {
        let boxes = vec![mock_box(5, 1), mock_box_with_tokens(7, 2, vec![mock_token(1, 3)])];
        let selected = select_top(&boxes, 0, None).unwrap();
        assert_eq!(selected, boxes);
    }

    #[test]
    fn test_first_fit_in_order() {
        let boxes = vec![mock_box(400, 1), mock_box(400, 2), mock_box(400, 3)];
        let selected = select_top_erg(&boxes, 700).unwrap();
        assert_eq!(selected, boxes[..2].to_vec());
    }

    #[test]
    fn test_exact_amount_stops() {
        let boxes = vec![mock_box(500, 1), mock_box(500, 2)];
        let selected = select_top_erg(&boxes, 500).unwrap();
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn test_insufficient_funds() {
        let boxes = vec![mock_box(100, 1), mock_box(200, 2)];
        let err = select_top_erg(&boxes, 1_000).unwrap_err();
        assert!(matches!(
            err,
            AppkitError::InsufficientFunds {
                needed: 1_000,
                available: 300
            }
        ));
    }

    #[test]
    fn test_token_boxes_skipped_without_token() {
        let boxes = vec![
            mock_box_with_tokens(1_000, 1, vec![mock_token(9, 10)]),
            mock_box(600, 2),
            mock_box(600, 3),
        ];
        let selected = select_top_erg(&boxes, 1_000).unwrap();
        assert_eq!(selected, boxes[1..].to_vec());
    }

    #[test]
    fn test_token_boxes_skipped_count_toward_shortfall() {
        let boxes = vec![
            mock_box_with_tokens(1_000, 1, vec![mock_token(9, 10)]),
            mock_box(100, 2),
        ];
        let err = select_top_erg(&boxes, 500).unwrap_err();
        assert!(matches!(
            err,
            AppkitError::InsufficientFunds { available: 100, .. }
        ));
    }

    #[test]
    fn test_token_selection() {
        let wanted = mock_token(4, 15);
        let boxes = vec![
            mock_box_with_tokens(100, 1, vec![mock_token(4, 10)]),
            mock_box(100, 2),
            mock_box_with_tokens(100, 3, vec![mock_token(4, 10)]),
            mock_box(100, 4),
        ];
        let selected = select_top(&boxes, 100, Some(&wanted)).unwrap();
        assert_eq!(selected, boxes[..3].to_vec());
    }

    #[test]
    fn test_token_only_request() {
        let wanted = mock_token(4, 5);
        let boxes = vec![mock_box(100, 1), mock_box_with_tokens(100, 2, vec![mock_token(4, 5)])];
        let selected = select_top(&boxes, 0, Some(&wanted)).unwrap();
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_insufficient_tokens() {
        let wanted = mock_token(4, 50);
        let boxes = vec![
            mock_box_with_tokens(100, 1, vec![mock_token(4, 10)]),
            mock_box_with_tokens(100, 2, vec![mock_token(5, 100)]),
        ];
        let err = select_top(&boxes, 100, Some(&wanted)).unwrap_err();
        match err {
            AppkitError::InsufficientTokens { needed, found, .. } => {
                assert_eq!(needed, 50);
                assert_eq!(found, 10);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_erg_shortfall_reported_before_token_shortfall() {
        let wanted = mock_token(4, 50);
        let boxes = vec![mock_box_with_tokens(100, 1, vec![mock_token(4, 10)])];
        let err = select_top(&boxes, 1_000, Some(&wanted)).unwrap_err();
        assert!(matches!(err, AppkitError::InsufficientFunds { .. }));
    }

    #[test]
    fn test_total_value() {
        let boxes = vec![mock_box(1, 1), mock_box(2, 2)];
        assert_eq!(total_value(&boxes), Some(3));
        assert_eq!(total_value(&[]), Some(0));
    }
}
