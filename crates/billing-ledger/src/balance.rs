//! Balance adjuster: the only code path that changes `Party.balance`.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use billing_core::{BalanceOperation, Money, Party, ValidationError};

use crate::error::{LedgerError, LedgerResult};
use crate::store::PartyStore;

pub struct BalanceAdjuster<S> {
    store: Arc<S>,
}

impl<S> Clone for BalanceAdjuster<S> {
    fn clone(&self) -> Self {
        BalanceAdjuster {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: PartyStore> BalanceAdjuster<S> {
    pub fn new(store: Arc<S>) -> Self {
        BalanceAdjuster { store }
    }

    /// Applies `operation` with `amount` to the party balance. No clamping.
    ///
    /// ## Errors
    /// `NotFound` if `party_id` does not resolve. `Validation` if the new
    /// balance would overflow; the party is left untouched.
    pub async fn update_balance(
        &self,
        party_id: &str,
        amount: Money,
        operation: BalanceOperation,
    ) -> LedgerResult<Party> {
        let mut party = self
            .store
            .get_party(party_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Party", party_id))?;

        let before = party.balance;
        party.balance = operation
            .apply(before, amount)
            .ok_or_else(|| ValidationError::out_of_range("balance"))?;
        party.updated_at = Utc::now();
        self.store.update_party(&party).await?;

        debug!(
            party_id = %party_id,
            %operation,
            %amount,
            %before,
            after = %party.balance,
            "Balance updated"
        );
        Ok(party)
    }
}
