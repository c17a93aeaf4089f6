//! # Compensation Plans
//!
//! Every lifecycle write is a primary document mutation followed by an
//! ordered list of follow-up adjustments. The follow-ups run one by one;
//! each may fail on its own without stopping the rest or undoing the
//! document write.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create sale (2 lines, 30 kg + 60 kg, total 4200)                      │
//! │                                                                         │
//! │  primary:  insert Sale ───────────────────────────────► committed      │
//! │                                                                         │
//! │  plan:     1. Balance  party += 4200              ✓                    │
//! │            2. Stock    Rice  −1 bag               ✓                    │
//! │            3. Stock    Dal   −2 bags              ✗ item missing       │
//! │            4. Bardana        −3 bags              ✓                    │
//! │                                                                         │
//! │  report:   applied 3, failed [3]  ──► warn! log, returned to caller    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use serde::Serialize;
use tracing::warn;

use billing_core::{
    items_total, items_weight, BalanceOperation, Kilograms, LineItem, Money, StockDirection,
    ValidationError,
};

use crate::balance::BalanceAdjuster;
use crate::error::LedgerResult;
use crate::stock::StockAdjuster;
use crate::store::{ItemStore, PartyStore};

// =============================================================================
// Plan Steps
// =============================================================================

/// One follow-up adjustment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Compensation {
    /// Move one line's quantity on the item it references.
    #[serde(rename_all = "camelCase")]
    Stock {
        item_ref: String,
        item_name: String,
        quantity: Kilograms,
        direction: StockDirection,
    },
    /// Move a batch quantity on Bardana.
    Bardana {
        quantity: Kilograms,
        direction: StockDirection,
    },
    /// Change a party balance.
    #[serde(rename_all = "camelCase")]
    Balance {
        party_id: String,
        amount: Money,
        operation: BalanceOperation,
    },
}

impl Compensation {
    pub fn stock(line: &LineItem, direction: StockDirection) -> Self {
        Compensation::Stock {
            item_ref: line.id.clone(),
            item_name: line.item_name.clone(),
            quantity: line.quantity,
            direction,
        }
    }

    pub fn balance(party_id: impl Into<String>, amount: Money, operation: BalanceOperation) -> Self {
        Compensation::Balance {
            party_id: party_id.into(),
            amount,
            operation,
        }
    }
}

impl fmt::Display for Compensation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compensation::Stock {
                item_name,
                quantity,
                direction,
                ..
            } => write!(f, "stock {direction} {quantity} of '{item_name}'"),
            Compensation::Bardana {
                quantity,
                direction,
            } => write!(f, "bardana {direction} {quantity}"),
            Compensation::Balance {
                party_id,
                amount,
                operation,
            } => write!(f, "balance {operation} {amount} on party {party_id}"),
        }
    }
}

/// One stock step per line, in order.
pub fn line_steps(items: &[LineItem], direction: StockDirection) -> Vec<Compensation> {
    items
        .iter()
        .map(|line| Compensation::stock(line, direction))
        .collect()
}

/// Per-line steps followed by one Bardana step for the summed weight.
pub fn stock_steps(items: &[LineItem], direction: StockDirection) -> Vec<Compensation> {
    let mut steps = line_steps(items, direction);
    steps.push(Compensation::Bardana {
        quantity: items_weight(items),
        direction,
    });
    steps
}

/// Σ line totals for a document about to be written.
pub fn document_total(items: &[LineItem]) -> LedgerResult<Money> {
    items_total(items).ok_or_else(|| ValidationError::out_of_range("totalAmount").into())
}

/// Balance move for an edited document: `new - old`.
pub fn total_delta(new: Money, old: Money) -> LedgerResult<Money> {
    new.checked_sub(old)
        .ok_or_else(|| ValidationError::out_of_range("totalAmount").into())
}

// =============================================================================
// Report
// =============================================================================

/// A step that did not apply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompensationFailure {
    pub step: Compensation,
    pub error: String,
}

/// What happened to a plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompensationReport {
    pub applied: usize,
    pub failures: Vec<CompensationFailure>,
}

impl CompensationReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn merge(&mut self, other: CompensationReport) {
        self.applied += other.applied;
        self.failures.extend(other.failures);
    }
}

/// A successful lifecycle result with the outcome of its follow-ups.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleOutcome<T> {
    pub record: T,
    pub compensation: CompensationReport,
}

impl<T> LifecycleOutcome<T> {
    pub fn new(record: T, compensation: CompensationReport) -> Self {
        LifecycleOutcome {
            record,
            compensation,
        }
    }
}

// =============================================================================
// Runner
// =============================================================================

/// Runs plans step by step, capturing every failure.
pub struct CompensationRunner<S> {
    stock: StockAdjuster<S>,
    balance: BalanceAdjuster<S>,
}

impl<S> Clone for CompensationRunner<S> {
    fn clone(&self) -> Self {
        CompensationRunner {
            stock: self.stock.clone(),
            balance: self.balance.clone(),
        }
    }
}

impl<S: ItemStore + PartyStore> CompensationRunner<S> {
    pub fn new(stock: StockAdjuster<S>, balance: BalanceAdjuster<S>) -> Self {
        CompensationRunner { stock, balance }
    }

    /// Runs `plan` in order. Never fails; see the report.
    ///
    /// `document` names the write the plan belongs to, for the logs.
    pub async fn run(&self, document: &str, plan: Vec<Compensation>) -> CompensationReport {
        let mut report = CompensationReport::default();

        for step in plan {
            let result = match &step {
                Compensation::Stock {
                    item_ref,
                    item_name,
                    quantity,
                    direction,
                } => self
                    .stock
                    .adjust(item_ref, item_name, *quantity, *direction)
                    .await
                    .map(|_| ()),
                Compensation::Bardana {
                    quantity,
                    direction,
                } => self
                    .stock
                    .adjust_bardana(*quantity, *direction)
                    .await
                    .map(|_| ()),
                Compensation::Balance {
                    party_id,
                    amount,
                    operation,
                } => self
                    .balance
                    .update_balance(party_id, *amount, *operation)
                    .await
                    .map(|_| ()),
            };

            match result {
                Ok(()) => report.applied += 1,
                Err(e) => {
                    warn!(document = %document, step = %step, error = %e, "Compensation step failed");
                    report.failures.push(CompensationFailure {
                        step,
                        error: e.to_string(),
                    });
                }
            }
        }

        report
    }
}
