//! # Balance Reconciliation
//!
//! Lifecycle writes are not transactional, so a failed compensation step
//! leaves a party balance out of line with its documents. This module
//! recomputes what each balance should be and can reset it.
//!
//! ```text
//! expected = Σ sale totals − Σ purchase totals − Σ payment-in + Σ payment-out
//! drift    = stored − expected
//! ```
//!
//! Manual `set_balance` corrections show up as drift too; repairing such a
//! party discards the hand-entered figure.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use billing_core::{BalanceOperation, ListFilter, Money, Party, PaymentType};

use crate::balance::BalanceAdjuster;
use crate::error::{LedgerError, LedgerResult};
use crate::store::LedgerStore;

/// A party whose stored balance disagrees with its documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceDrift {
    pub party_id: String,
    pub party_name: String,
    pub stored: Money,
    pub expected: Money,
    pub drift: Money,
}

pub struct Reconciler<S> {
    store: Arc<S>,
    balance: BalanceAdjuster<S>,
}

impl<S: LedgerStore> Reconciler<S> {
    pub fn new(store: Arc<S>) -> Self {
        Reconciler {
            balance: BalanceAdjuster::new(Arc::clone(&store)),
            store,
        }
    }

    /// Every party whose stored balance differs from the recomputed one.
    pub async fn balance_drift(&self) -> LedgerResult<Vec<BalanceDrift>> {
        let expected = self.expected_balances(&ListFilter::default()).await?;
        let parties = self.store.list_parties().await?;

        let drifts: Vec<BalanceDrift> = parties
            .into_iter()
            .filter_map(|party| {
                let expected = expected.get(&party.id).copied().unwrap_or_default();
                (party.balance != expected).then(|| drift_of(party, expected))
            })
            .collect();

        info!(drifting = drifts.len(), "Balance drift computed");
        Ok(drifts)
    }

    /// Resets one party's balance to the value its documents imply.
    pub async fn repair_balance(&self, party_id: &str) -> LedgerResult<Party> {
        let party = self
            .store
            .get_party(party_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Party", party_id))?;

        let filter = ListFilter::default().party(party_id);
        let expected = self
            .expected_balances(&filter)
            .await?
            .get(party_id)
            .copied()
            .unwrap_or_default();

        let repaired = self
            .balance
            .update_balance(party_id, expected, BalanceOperation::Set)
            .await?;

        info!(
            party_id = %party_id,
            before = %party.balance,
            after = %repaired.balance,
            "Party balance repaired"
        );
        Ok(repaired)
    }

    async fn expected_balances(&self, filter: &ListFilter) -> LedgerResult<HashMap<String, Money>> {
        let mut expected: HashMap<String, Money> = HashMap::new();

        for sale in self.store.list_sales(filter).await? {
            if let Some(party_id) = sale.party_id {
                *expected.entry(party_id).or_default() += sale.total_amount;
            }
        }
        for purchase in self.store.list_purchases(filter).await? {
            if let Some(party_id) = purchase.party_id {
                *expected.entry(party_id).or_default() -= purchase.total_amount;
            }
        }
        for payment in self.store.list_payments(filter).await? {
            if let Some(party_id) = payment.party_id {
                let entry = expected.entry(party_id).or_default();
                match payment.payment_type {
                    PaymentType::PaymentIn => *entry -= payment.amount,
                    PaymentType::PaymentOut => *entry += payment.amount,
                }
            }
        }

        Ok(expected)
    }
}

fn drift_of(party: Party, expected: Money) -> BalanceDrift {
    BalanceDrift {
        drift: party.balance - expected,
        party_id: party.id,
        party_name: party.name,
        stored: party.balance,
        expected,
    }
}
