//! Access to the node's own wallet boxes.

use crate::box_selector::{select_top_erg, total_value};
use crate::data_source::BlockchainDataSource;
use crate::{AppkitError, AppkitResult};
use ergo_lib::ergotree_ir::chain::ergo_box::ErgoBox;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// Unspent boxes of the wallet managed by the connected node.
///
/// Boxes are fetched on first use and cached until `refresh`.
pub struct ErgoWallet {
    source: Arc<dyn BlockchainDataSource>,
    unspent: RwLock<Option<Vec<ErgoBox>>>,
}

impl ErgoWallet {
    pub fn new(source: Arc<dyn BlockchainDataSource>) -> Self {
        Self {
            source,
            unspent: RwLock::new(None),
        }
    }

    fn load(&self) -> AppkitResult<Vec<ErgoBox>> {
        if let Some(boxes) = self.unspent.read().as_ref() {
            return Ok(boxes.clone());
        }
        let boxes = self.source.wallet_unspent_boxes(0, 0)?;
        debug!(count = boxes.len(), "Loaded wallet unspent boxes");
        *self.unspent.write() = Some(boxes.clone());
        Ok(boxes)
    }

    /// Boxes covering `amount` nanoERG, picked first-fit.
    pub fn unspent_boxes(&self, amount: u64) -> AppkitResult<Vec<ErgoBox>> {
        select_top_erg(&self.load()?, amount)
    }

    /// All known unspent boxes.
    pub fn all_unspent_boxes(&self) -> AppkitResult<Vec<ErgoBox>> {
        self.load()
    }

    /// Total nanoERG in unspent boxes.
    pub fn balance(&self) -> AppkitResult<u64> {
        total_value(&self.load()?)
            .ok_or_else(|| AppkitError::InvalidAmount("wallet balance overflows u64".into()))
    }

    /// Forget cached boxes so the next call fetches them again.
    pub fn refresh(&self) {
        *self.unspent.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{mock_box, mock_box_with_tokens, mock_token, MemorySource};
    use std::sync::atomic::Ordering;

    fn wallet_with(boxes: Vec<ErgoBox>) -> (Arc<MemorySource>, ErgoWallet) {
        let source = Arc::new(MemorySource {
            wallet_boxes: boxes,
            ..Default::default()
        });
        let wallet = ErgoWallet::new(source.clone());
        (source, wallet)
    }

    #[test]
    fn test_unspent_boxes_selects_first_fit() {
        let (_, wallet) = wallet_with(vec![
            mock_box(1_000_000, 1),
            mock_box(2_000_000, 2),
            mock_box(4_000_000, 3),
        ]);
        let selected = wallet.unspent_boxes(2_500_000).unwrap();
        assert_eq!(selected.len(), 2);
        assert!(matches!(
            wallet.unspent_boxes(10_000_000),
            Err(AppkitError::InsufficientFunds {
                available: 7_000_000,
                ..
            })
        ));
    }

    #[test]
    fn test_boxes_cached_until_refresh() {
        let (source, wallet) = wallet_with(vec![mock_box(1_000_000, 1)]);
        wallet.unspent_boxes(1).unwrap();
        wallet.balance().unwrap();
        assert_eq!(source.wallet_loads.load(Ordering::SeqCst), 1);

        wallet.refresh();
        wallet.all_unspent_boxes().unwrap();
        assert_eq!(source.wallet_loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_balance_counts_token_boxes() {
        let (_, wallet) = wallet_with(vec![
            mock_box(1_000_000, 1),
            mock_box_with_tokens(2_000_000, 2, vec![mock_token(1, 5)]),
        ]);
        assert_eq!(wallet.balance().unwrap(), 3_000_000);
        assert_eq!(wallet.unspent_boxes(0).unwrap().len(), 2);
    }
}
