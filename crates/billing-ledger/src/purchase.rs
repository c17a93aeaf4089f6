//! # Purchase Lifecycle
//!
//! Mirror of the sale lifecycle with the directions flipped: a purchase
//! lowers the party balance and brings stock in.
//!
//! ```text
//! ┌──────────┬────────────────────────┬──────────────────────────────────────┐
//! │ Op       │ Balance                │ Stock                                │
//! ├──────────┼────────────────────────┼──────────────────────────────────────┤
//! │ create   │ − total                │ each line +, Bardana + Σkg           │
//! │ update   │ − (new − old) if moved │ if lines changed:                    │
//! │          │                        │   each old line −, each new line +   │
//! │          │                        │   Bardana ± (Σnew − Σold), once      │
//! │ delete   │ + total                │ each line −, Bardana − Σkg           │
//! └──────────┴────────────────────────┴──────────────────────────────────────┘
//! ```
//!
//! Unlike sales, the bill number comes from the caller and must be unique.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use billing_core::requests::{
    build_line_items, lines_unchanged, CreatePurchaseRequest, UpdatePurchaseRequest,
};
use billing_core::validation::today;
use billing_core::{
    items_weight, new_id, BalanceOperation, Kilograms, ListFilter, Purchase,
    StockDirection,
};

use crate::compensation::{
    document_total, line_steps, stock_steps, total_delta, Compensation, CompensationRunner,
    LifecycleOutcome,
};
use crate::error::{LedgerError, LedgerResult};
use crate::party::PartyDirectory;
use crate::store::LedgerStore;

const BALANCE_ON_CREATE: BalanceOperation = BalanceOperation::Subtract;
const STOCK_ON_CREATE: StockDirection = StockDirection::Increase;

pub struct PurchaseLifecycle<S> {
    store: Arc<S>,
    parties: PartyDirectory<S>,
    runner: CompensationRunner<S>,
}

impl<S: LedgerStore> PurchaseLifecycle<S> {
    pub fn new(store: Arc<S>, parties: PartyDirectory<S>, runner: CompensationRunner<S>) -> Self {
        PurchaseLifecycle {
            store,
            parties,
            runner,
        }
    }

    pub async fn get(&self, id: &str) -> LedgerResult<Purchase> {
        self.store
            .get_purchase(id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Purchase", id))
    }

    pub async fn list(&self, filter: &ListFilter) -> LedgerResult<Vec<Purchase>> {
        Ok(self.store.list_purchases(filter).await?)
    }

    /// Records a purchase under the caller's bill number.
    ///
    /// ## Errors
    /// `Conflict` if the bill number exists. Nothing is written in that case.
    pub async fn create(
        &self,
        request: CreatePurchaseRequest,
    ) -> LedgerResult<LifecycleOutcome<Purchase>> {
        request.validate()?;

        if self
            .store
            .find_purchase_by_bill_no(&request.bill_no)
            .await?
            .is_some()
        {
            return Err(LedgerError::conflict("billNo", request.bill_no));
        }

        let items = build_line_items(request.items)?;
        let total_amount = document_total(&items)?;

        let party = self
            .parties
            .find_or_create(request.party_name.trim(), &request.phone_number)
            .await?;
        let now = Utc::now();
        let purchase = Purchase {
            id: new_id(),
            bill_no: request.bill_no,
            party_name: party.name.clone(),
            phone_number: party.phone_number.clone(),
            party_id: Some(party.id.clone()),
            date: request.date.unwrap_or_else(today),
            total_amount,
            items,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_purchase(&purchase).await?;

        let mut plan = vec![Compensation::balance(
            party.id.as_str(),
            purchase.total_amount,
            BALANCE_ON_CREATE,
        )];
        plan.extend(stock_steps(&purchase.items, STOCK_ON_CREATE));
        let report = self.runner.run(&purchase.bill_no, plan).await;

        info!(
            bill_no = %purchase.bill_no,
            party_id = %party.id,
            total = %purchase.total_amount,
            lines = purchase.items.len(),
            "Purchase created"
        );
        Ok(LifecycleOutcome::new(purchase, report))
    }

    /// Edits a purchase and replays its balance and stock effects.
    pub async fn update(
        &self,
        id: &str,
        request: UpdatePurchaseRequest,
    ) -> LedgerResult<LifecycleOutcome<Purchase>> {
        request.validate()?;
        let mut purchase = self.get(id).await?;

        if let Some(bill_no) = &request.bill_no {
            if *bill_no != purchase.bill_no
                && self
                    .store
                    .find_purchase_by_bill_no(bill_no)
                    .await?
                    .is_some()
            {
                return Err(LedgerError::conflict("billNo", bill_no.as_str()));
            }
        }

        let old_total = purchase.total_amount;
        let old_items = purchase.items.clone();

        if let Some(bill_no) = request.bill_no {
            purchase.bill_no = bill_no;
        }
        if let Some(name) = request.party_name {
            purchase.party_name = name.trim().to_string();
        }
        if let Some(phone) = request.phone_number {
            purchase.phone_number = phone;
        }
        if let Some(date) = request.date {
            purchase.date = date;
        }
        if let Some(notes) = request.notes {
            purchase.notes = Some(notes);
        }
        if let Some(items) = request.items {
            // Resent lines without ids would get fresh ones; keep the stored set.
            if !lines_unchanged(&items, &purchase.items) {
                purchase.items = build_line_items(items)?;
            }
        }
        purchase.total_amount = document_total(&purchase.items)?;
        let balance_delta = total_delta(purchase.total_amount, old_total)?;
        purchase.updated_at = Utc::now();
        self.store.update_purchase(&purchase).await?;

        let mut plan = Vec::new();
        if purchase.total_amount != old_total {
            if let Some(party_id) = &purchase.party_id {
                plan.push(Compensation::balance(
                    party_id.as_str(),
                    balance_delta,
                    BALANCE_ON_CREATE,
                ));
            }
        }
        if purchase.items != old_items {
            plan.extend(line_steps(&old_items, STOCK_ON_CREATE.reversed()));
            plan.extend(line_steps(&purchase.items, STOCK_ON_CREATE));
            plan.extend(bardana_net_step(
                items_weight(&old_items),
                items_weight(&purchase.items),
            ));
        }
        let report = self.runner.run(&purchase.bill_no, plan).await;

        info!(
            bill_no = %purchase.bill_no,
            old_total = %old_total,
            new_total = %purchase.total_amount,
            "Purchase updated"
        );
        Ok(LifecycleOutcome::new(purchase, report))
    }

    /// Reverses a purchase's effects, then removes it.
    pub async fn delete(&self, id: &str) -> LedgerResult<LifecycleOutcome<Purchase>> {
        let purchase = self.get(id).await?;

        let mut plan = stock_steps(&purchase.items, STOCK_ON_CREATE.reversed());
        if let Some(party_id) = &purchase.party_id {
            plan.push(Compensation::balance(
                party_id.as_str(),
                purchase.total_amount,
                BalanceOperation::Add,
            ));
        }
        let report = self.runner.run(&purchase.bill_no, plan).await;

        self.store.delete_purchase(&purchase.id).await?;

        info!(bill_no = %purchase.bill_no, "Purchase deleted");
        Ok(LifecycleOutcome::new(purchase, report))
    }
}

/// One Bardana step for the net weight change; none when it is zero.
fn bardana_net_step(old: Kilograms, new: Kilograms) -> Option<Compensation> {
    match new.cmp(&old) {
        Ordering::Equal => None,
        Ordering::Greater => Some(Compensation::Bardana {
            quantity: new - old,
            direction: STOCK_ON_CREATE,
        }),
        Ordering::Less => Some(Compensation::Bardana {
            quantity: old - new,
            direction: STOCK_ON_CREATE.reversed(),
        }),
    }
}
