//! # Sale Lifecycle
//!
//! Create, edit and delete sales, keeping party balance and stock in step.
//!
//! ## Effects
//! ```text
//! ┌──────────┬────────────────────────┬──────────────────────────────────────┐
//! │ Op       │ Balance                │ Stock                                │
//! ├──────────┼────────────────────────┼──────────────────────────────────────┤
//! │ create   │ + total                │ each line −, Bardana − Σkg           │
//! │ update   │ + (new − old) if moved │ if lines changed:                    │
//! │          │                        │   each old line +, Bardana + Σold    │
//! │          │                        │   each new line −, Bardana − Σnew    │
//! │ delete   │ − total                │ each line +, Bardana + Σkg           │
//! └──────────┴────────────────────────┴──────────────────────────────────────┘
//! ```
//!
//! The document write happens first. Balance and stock follow as a
//! compensation plan whose failures are logged and reported, never raised.
//!
//! ## Invoice Numbers
//! The next number is the leading integer of the text-greatest stored
//! invoice number, plus one. Text order puts "9" above "10", so once "10"
//! exists every further create computes "10" again and fails with
//! `Conflict` on `invoiceNo`. This stays as-is until the numbering rule is
//! settled; editing a sale's `invoiceNo` is the way out for an affected
//! store. Concurrent creates can also compute the same number, and the
//! loser gets the same `Conflict`.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use billing_core::numbering::next_invoice_no;
use billing_core::requests::{
    build_line_items, lines_unchanged, CreateSaleRequest, UpdateSaleRequest,
};
use billing_core::validation::today;
use billing_core::{new_id, BalanceOperation, ListFilter, Sale, StockDirection};

use crate::compensation::{
    document_total, stock_steps, total_delta, Compensation, CompensationRunner, LifecycleOutcome,
};
use crate::error::{LedgerError, LedgerResult};
use crate::party::PartyDirectory;
use crate::store::LedgerStore;

/// A sale moves the balance up and stock out.
const BALANCE_ON_CREATE: BalanceOperation = BalanceOperation::Add;
const STOCK_ON_CREATE: StockDirection = StockDirection::Decrease;

pub struct SaleLifecycle<S> {
    store: Arc<S>,
    parties: PartyDirectory<S>,
    runner: CompensationRunner<S>,
}

impl<S: LedgerStore> SaleLifecycle<S> {
    pub fn new(store: Arc<S>, parties: PartyDirectory<S>, runner: CompensationRunner<S>) -> Self {
        SaleLifecycle {
            store,
            parties,
            runner,
        }
    }

    pub async fn get(&self, id: &str) -> LedgerResult<Sale> {
        self.store
            .get_sale(id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Sale", id))
    }

    pub async fn list(&self, filter: &ListFilter) -> LedgerResult<Vec<Sale>> {
        Ok(self.store.list_sales(filter).await?)
    }

    /// Records a sale under the next invoice number.
    ///
    /// Any caller-supplied total is ignored; the total is Σ quantity × rate.
    pub async fn create(&self, request: CreateSaleRequest) -> LedgerResult<LifecycleOutcome<Sale>> {
        request.validate()?;

        let items = build_line_items(request.items)?;
        let total_amount = document_total(&items)?;

        let party = self
            .parties
            .find_or_create(request.party_name.trim(), &request.phone_number)
            .await?;
        let invoice_no = next_invoice_no(self.store.last_invoice_no().await?.as_deref());
        let now = Utc::now();
        let sale = Sale {
            id: new_id(),
            invoice_no,
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
        self.store.insert_sale(&sale).await?;

        let mut plan = vec![Compensation::balance(
            party.id.as_str(),
            sale.total_amount,
            BALANCE_ON_CREATE,
        )];
        plan.extend(stock_steps(&sale.items, STOCK_ON_CREATE));
        let report = self.runner.run(&sale.invoice_no, plan).await;

        info!(
            invoice_no = %sale.invoice_no,
            party_id = %party.id,
            total = %sale.total_amount,
            lines = sale.items.len(),
            "Sale created"
        );
        Ok(LifecycleOutcome::new(sale, report))
    }

    /// Edits a sale and replays its balance and stock effects.
    ///
    /// `partyId` never changes here, even when name or phone are edited.
    pub async fn update(
        &self,
        id: &str,
        request: UpdateSaleRequest,
    ) -> LedgerResult<LifecycleOutcome<Sale>> {
        request.validate()?;
        let mut sale = self.get(id).await?;

        if let Some(invoice_no) = &request.invoice_no {
            if *invoice_no != sale.invoice_no
                && self
                    .store
                    .find_sale_by_invoice_no(invoice_no)
                    .await?
                    .is_some()
            {
                return Err(LedgerError::conflict("invoiceNo", invoice_no.as_str()));
            }
        }

        let old_total = sale.total_amount;
        let old_items = sale.items.clone();

        if let Some(invoice_no) = request.invoice_no {
            sale.invoice_no = invoice_no;
        }
        if let Some(name) = request.party_name {
            sale.party_name = name.trim().to_string();
        }
        if let Some(phone) = request.phone_number {
            sale.phone_number = phone;
        }
        if let Some(date) = request.date {
            sale.date = date;
        }
        if let Some(notes) = request.notes {
            sale.notes = Some(notes);
        }
        if let Some(items) = request.items {
            // Resent lines without ids would get fresh ones; keep the stored set.
            if !lines_unchanged(&items, &sale.items) {
                sale.items = build_line_items(items)?;
            }
        }
        sale.total_amount = document_total(&sale.items)?;
        let balance_delta = total_delta(sale.total_amount, old_total)?;
        sale.updated_at = Utc::now();
        self.store.update_sale(&sale).await?;

        let mut plan = Vec::new();
        if sale.total_amount != old_total {
            if let Some(party_id) = &sale.party_id {
                plan.push(Compensation::balance(
                    party_id.as_str(),
                    balance_delta,
                    BALANCE_ON_CREATE,
                ));
            }
        }
        if sale.items != old_items {
            // Two full Bardana passes: out with the old sum, in with the new.
            plan.extend(stock_steps(&old_items, STOCK_ON_CREATE.reversed()));
            plan.extend(stock_steps(&sale.items, STOCK_ON_CREATE));
        }
        let report = self.runner.run(&sale.invoice_no, plan).await;

        info!(
            invoice_no = %sale.invoice_no,
            old_total = %old_total,
            new_total = %sale.total_amount,
            "Sale updated"
        );
        Ok(LifecycleOutcome::new(sale, report))
    }

    /// Reverses a sale's effects, then removes it.
    pub async fn delete(&self, id: &str) -> LedgerResult<LifecycleOutcome<Sale>> {
        let sale = self.get(id).await?;

        let mut plan = stock_steps(&sale.items, STOCK_ON_CREATE.reversed());
        if let Some(party_id) = &sale.party_id {
            plan.push(Compensation::balance(
                party_id.as_str(),
                sale.total_amount,
                BalanceOperation::Subtract,
            ));
        }
        let report = self.runner.run(&sale.invoice_no, plan).await;

        self.store.delete_sale(&sale.id).await?;

        info!(invoice_no = %sale.invoice_no, "Sale deleted");
        Ok(LifecycleOutcome::new(sale, report))
    }
}
