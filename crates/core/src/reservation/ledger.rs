//! Ledger entries for a sale.

use rust_decimal::Decimal;

use crate::reservation::types::{
    LedgerLine, PaymentMethod, SalePlan, Settlement, TransactionStatus,
};

/// Builds the transactions a sale appends: one for the wallet-covered part,
/// one for the part paid by cash, card or mobile money. Empty parts are skipped.
#[must_use]
pub fn sale_lines(plan: &SalePlan, reference: &str) -> Vec<LedgerLine> {
    let mut lines = Vec::with_capacity(2);

    let mut wallet_tickets = 0u32;
    let mut credits_used = 0u32;
    let mut subscription_id = None;
    for ticket in plan.wallet_tickets() {
        if let Settlement::WalletCovered {
            subscription_id: id,
            charge,
            ..
        } = ticket.settlement
        {
            subscription_id = Some(id);
            credits_used += charge.credits();
            wallet_tickets += 1;
        }
    }

    if wallet_tickets > 0 {
        lines.push(LedgerLine {
            amount: plan.wallet_covered_total,
            payment_method: PaymentMethod::Subscription,
            status: TransactionStatus::Completed,
            subscription_id,
            credits_used,
            description: format!("Subscription coverage for {wallet_tickets} ticket(s), booking {reference}"),
        });
    }

    if plan.payable_total > Decimal::ZERO {
        let method = plan
            .tickets
            .iter()
            .find_map(|t| match t.settlement {
                Settlement::FullPrice { method, amount } if amount > Decimal::ZERO => Some(method),
                _ => None,
            })
            .unwrap_or(plan.payment_method);

        lines.push(LedgerLine {
            amount: plan.payable_total,
            payment_method: method,
            status: TransactionStatus::Completed,
            subscription_id: None,
            credits_used: 0,
            description: format!("Payment for booking {reference}"),
        });
    }

    lines
}

/// Builds the pending refund obligation for a cancellation, if anything was paid.
#[must_use]
pub fn refund_line(
    refund_amount: Decimal,
    payment_method: PaymentMethod,
    reference: &str,
) -> Option<LedgerLine> {
    (refund_amount > Decimal::ZERO).then(|| LedgerLine {
        amount: -refund_amount,
        payment_method,
        status: TransactionStatus::Pending,
        subscription_id: None,
        credits_used: 0,
        description: format!("Refund due for cancelled booking {reference}"),
    })
}
