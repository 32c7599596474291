//! Order-complete summary, read from the single-use local snapshots.

use tracing::warn;

use crate::domain::payment::{PaymentReceipt, PendingOrder};
use crate::storage::Receipts;

/// The completed-order summary. Loading never fails: an unreadable snapshot
/// is the same as an absent one, and the view falls back to "no order".
pub struct CompletionView {
    receipts: Receipts,
    order: Option<PendingOrder>,
    receipt: Option<PaymentReceipt>,
}

impl CompletionView {
    pub fn load(receipts: Receipts) -> Self {
        let order = receipts.pending_order().unwrap_or_else(|e| {
            warn!(error = %e, "failed to load pending order snapshot");
            None
        });
        let receipt = receipts.payment_receipt().unwrap_or_else(|e| {
            warn!(error = %e, "failed to load payment receipt snapshot");
            None
        });
        Self {
            receipts,
            order,
            receipt,
        }
    }

    /// Without a staged order there is nothing to show; the caller should
    /// send the user back to the storefront.
    pub fn is_ready(&self) -> bool {
        self.order.is_some()
    }

    pub fn order(&self) -> Option<&PendingOrder> {
        self.order.as_ref()
    }

    pub fn receipt(&self) -> Option<&PaymentReceipt> {
        self.receipt.as_ref()
    }

    /// Leaving the summary consumes both snapshots; revisiting the page
    /// later shows nothing.
    pub fn dismiss(self) {
        if let Err(e) = self.receipts.clear() {
            warn!(error = %e, "failed to clear checkout snapshots");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::ShippingAddress;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn staged_receipts() -> Receipts {
        let receipts = Receipts::in_memory();
        receipts
            .save_pending_order(&PendingOrder {
                order_id: "o42".into(),
                shipping_address: ShippingAddress::default(),
                order_items: vec![],
                total_amount: Decimal::new(2000, 2),
            })
            .unwrap();
        receipts
            .save_payment_receipt(&PaymentReceipt {
                payment_intent_id: "pi_1".into(),
                amount: Decimal::new(2000, 2),
                timestamp: Utc::now(),
            })
            .unwrap();
        receipts
    }

    #[test]
    fn shows_the_staged_order_and_receipt() {
        let view = CompletionView::load(staged_receipts());
        assert!(view.is_ready());
        assert_eq!(view.order().unwrap().order_id, "o42");
        assert_eq!(view.receipt().unwrap().payment_intent_id, "pi_1");
    }

    #[test]
    fn empty_storage_means_nothing_to_show() {
        let view = CompletionView::load(Receipts::in_memory());
        assert!(!view.is_ready());
        assert!(view.order().is_none());
        assert!(view.receipt().is_none());
    }

    #[test]
    fn dismissing_consumes_both_snapshots() {
        let receipts = staged_receipts();
        CompletionView::load(receipts.clone()).dismiss();
        let revisited = CompletionView::load(receipts);
        assert!(!revisited.is_ready());
        assert!(revisited.receipt().is_none());
    }
}
