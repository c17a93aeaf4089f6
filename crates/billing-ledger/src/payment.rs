//! # Payment Lifecycle
//!
//! ```text
//! ┌──────────┬──────────────────────────────────────────────────────────────┐
//! │ create   │ payment-in: balance − amount   payment-out: balance + amount │
//! │ update   │ only if amount changed: + old amount (always add),          │
//! │          │ then the type rule with the new amount and current type     │
//! │ delete   │ + amount (always add), then remove                          │
//! └──────────┴──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reversal always uses `add`, whatever the payment type. For a payment-out
//! that means an edit or delete moves the balance the same way the create
//! did. This is kept as-is until the business decides otherwise; the
//! reconciliation report shows the resulting drift.
//!
//! ## Payment Numbers
//! The store does not enforce unique payment numbers. Creation checks up to
//! [`PAYMENT_NO_MAX_ATTEMPTS`] random candidates, then falls back to a longer
//! form. Concurrent creators can still collide; [`PaymentLifecycle::cleanup_duplicates`]
//! removes the later copies.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};

use billing_core::numbering::{
    format_fallback_payment_no, format_payment_no, FALLBACK_SUFFIX_LIMIT,
    PAYMENT_NO_MAX_ATTEMPTS, PAYMENT_SUFFIX_RANGE,
};
use billing_core::requests::{CreatePaymentRequest, UpdatePaymentRequest};
use billing_core::validation::today;
use billing_core::{new_id, BalanceOperation, ListFilter, Payment, PaymentType};

use crate::compensation::{Compensation, CompensationRunner, LifecycleOutcome};
use crate::error::{LedgerError, LedgerResult};
use crate::party::PartyDirectory;
use crate::store::LedgerStore;

/// Result of a duplicate payment number cleanup.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateCleanupReport {
    /// Payments looked at.
    pub scanned: usize,
    /// Payment numbers that had more than one payment.
    pub duplicate_numbers: Vec<String>,
    /// Ids of the payments removed.
    pub removed_ids: Vec<String>,
}

pub struct PaymentLifecycle<S> {
    store: Arc<S>,
    parties: PartyDirectory<S>,
    runner: CompensationRunner<S>,
}

impl<S: LedgerStore> PaymentLifecycle<S> {
    pub fn new(store: Arc<S>, parties: PartyDirectory<S>, runner: CompensationRunner<S>) -> Self {
        PaymentLifecycle {
            store,
            parties,
            runner,
        }
    }

    pub async fn get(&self, id: &str) -> LedgerResult<Payment> {
        self.store
            .get_payment(id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Payment", id))
    }

    pub async fn list(&self, filter: &ListFilter) -> LedgerResult<Vec<Payment>> {
        Ok(self.store.list_payments(filter).await?)
    }

    /// Records a payment under a freshly generated number.
    ///
    /// If the party cannot be resolved the payment is still recorded, just
    /// without a party link and without a balance effect.
    pub async fn create(
        &self,
        request: CreatePaymentRequest,
    ) -> LedgerResult<LifecycleOutcome<Payment>> {
        request.validate()?;

        let party_id = match request.party_key() {
            Some((name, phone)) => match self.parties.find_or_create(name.trim(), phone).await {
                Ok(party) => Some(party.id),
                Err(e) => {
                    warn!(error = %e, party = %name, "Payment party could not be resolved; recording unlinked");
                    None
                }
            },
            None => None,
        };

        let payment_no = self.generate_payment_no(request.payment_type).await?;
        let now = Utc::now();
        let payment = Payment {
            id: new_id(),
            payment_no,
            payment_type: request.payment_type,
            party_name: request.party_name.map(|n| n.trim().to_string()),
            phone_number: request.phone_number,
            party_id,
            amount: request.amount,
            total_amount: request.total_amount.unwrap_or(request.amount),
            payment_method: request.payment_method.unwrap_or_default(),
            reference: request.reference,
            description: request.description,
            date: request.date.unwrap_or_else(today),
            created_at: now,
            updated_at: now,
        };
        self.store.insert_payment(&payment).await?;

        let plan = match &payment.party_id {
            Some(party_id) => vec![Compensation::balance(
                party_id.as_str(),
                payment.amount,
                payment.payment_type.balance_operation(),
            )],
            None => Vec::new(),
        };
        let report = self.runner.run(&payment.payment_no, plan).await;

        info!(
            payment_no = %payment.payment_no,
            payment_type = %payment.payment_type,
            amount = %payment.amount,
            linked = payment.party_id.is_some(),
            "Payment created"
        );
        Ok(LifecycleOutcome::new(payment, report))
    }

    /// Edits a payment. The balance is touched only when the amount changes.
    pub async fn update(
        &self,
        id: &str,
        request: UpdatePaymentRequest,
    ) -> LedgerResult<LifecycleOutcome<Payment>> {
        request.validate()?;
        let mut payment = self.get(id).await?;
        let old_amount = payment.amount;

        if let Some(payment_type) = request.payment_type {
            payment.payment_type = payment_type;
        }
        if let Some(amount) = request.amount {
            payment.amount = amount;
        }
        if let Some(total) = request.total_amount {
            payment.total_amount = total;
        }
        if let Some(method) = request.payment_method {
            payment.payment_method = method;
        }
        if let Some(reference) = request.reference {
            payment.reference = Some(reference);
        }
        if let Some(description) = request.description {
            payment.description = Some(description);
        }
        if let Some(date) = request.date {
            payment.date = date;
        }
        payment.updated_at = Utc::now();
        self.store.update_payment(&payment).await?;

        let mut plan = Vec::new();
        if payment.amount != old_amount {
            if let Some(party_id) = &payment.party_id {
                plan.push(Compensation::balance(
                    party_id.as_str(),
                    old_amount,
                    BalanceOperation::Add,
                ));
                plan.push(Compensation::balance(
                    party_id.as_str(),
                    payment.amount,
                    payment.payment_type.balance_operation(),
                ));
            }
        }
        let report = self.runner.run(&payment.payment_no, plan).await;

        info!(
            payment_no = %payment.payment_no,
            old_amount = %old_amount,
            new_amount = %payment.amount,
            "Payment updated"
        );
        Ok(LifecycleOutcome::new(payment, report))
    }

    /// Reverses the payment's balance effect, then removes it.
    pub async fn delete(&self, id: &str) -> LedgerResult<LifecycleOutcome<Payment>> {
        let payment = self.get(id).await?;

        let plan = match &payment.party_id {
            Some(party_id) => vec![Compensation::balance(
                party_id.as_str(),
                payment.amount,
                BalanceOperation::Add,
            )],
            None => Vec::new(),
        };
        let report = self.runner.run(&payment.payment_no, plan).await;

        self.store.delete_payment(&payment.id).await?;

        info!(payment_no = %payment.payment_no, "Payment deleted");
        Ok(LifecycleOutcome::new(payment, report))
    }

    /// Keeps the first-created payment of every number and deletes the rest.
    ///
    /// Balances are not touched: removed duplicates keep whatever balance
    /// effect their creation had.
    pub async fn cleanup_duplicates(&self) -> LedgerResult<DuplicateCleanupReport> {
        let payments = self.store.payments_in_creation_order().await?;
        let mut report = DuplicateCleanupReport {
            scanned: payments.len(),
            ..Default::default()
        };

        let mut seen = HashSet::new();
        let mut duplicated = HashSet::new();
        for payment in payments {
            if seen.insert(payment.payment_no.clone()) {
                continue;
            }
            self.store.delete_payment(&payment.id).await?;
            if duplicated.insert(payment.payment_no.clone()) {
                report.duplicate_numbers.push(payment.payment_no.clone());
            }
            report.removed_ids.push(payment.id);
        }

        info!(
            scanned = report.scanned,
            duplicate_numbers = report.duplicate_numbers.len(),
            removed = report.removed_ids.len(),
            "Duplicate payment cleanup finished"
        );
        Ok(report)
    }

    async fn generate_payment_no(&self, payment_type: PaymentType) -> LedgerResult<String> {
        for _ in 0..PAYMENT_NO_MAX_ATTEMPTS {
            let candidate = {
                let suffix = rand::thread_rng().gen_range(PAYMENT_SUFFIX_RANGE);
                format_payment_no(payment_type, Utc::now().timestamp_millis(), suffix)
            };
            if !self.store.payment_no_exists(&candidate).await? {
                return Ok(candidate);
            }
        }

        let suffix = rand::thread_rng().gen_range(0..FALLBACK_SUFFIX_LIMIT);
        let fallback =
            format_fallback_payment_no(payment_type, Utc::now().timestamp_millis(), suffix);
        warn!(payment_no = %fallback, "Payment number retries exhausted; using fallback form");
        Ok(fallback)
    }
}
