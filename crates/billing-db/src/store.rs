//! Ledger store ports on top of [`Database`].
//!
//! Thin delegation: every port method is one repository call, with
//! [`DbError`](crate::DbError) turned into the port's `StoreError`.

use async_trait::async_trait;
use billing_core::{Item, ListFilter, Party, Payment, Purchase, Sale};
use billing_ledger::store::{ItemStore, PartyStore, PaymentStore, PurchaseStore, SaleStore};
use billing_ledger::StoreResult;

use crate::pool::Database;

#[async_trait]
impl PartyStore for Database {
    async fn get_party(&self, id: &str) -> StoreResult<Option<Party>> {
        Ok(self.parties().get_by_id(id).await?)
    }

    async fn find_party_by_key(&self, name: &str, phone_number: &str) -> StoreResult<Option<Party>> {
        Ok(self.parties().find_by_key(name, phone_number).await?)
    }

    async fn insert_party(&self, party: &Party) -> StoreResult<()> {
        Ok(self.parties().insert(party).await?)
    }

    async fn update_party(&self, party: &Party) -> StoreResult<()> {
        Ok(self.parties().update(party).await?)
    }

    async fn list_parties(&self) -> StoreResult<Vec<Party>> {
        Ok(self.parties().list().await?)
    }
}

#[async_trait]
impl ItemStore for Database {
    async fn get_item(&self, id: &str) -> StoreResult<Option<Item>> {
        Ok(self.items().get_by_id(id).await?)
    }

    async fn find_item_by_name(&self, product_name: &str) -> StoreResult<Option<Item>> {
        Ok(self.items().find_by_name(product_name).await?)
    }

    async fn find_universal_item(&self) -> StoreResult<Option<Item>> {
        Ok(self.items().find_universal().await?)
    }

    async fn insert_item(&self, item: &Item) -> StoreResult<()> {
        Ok(self.items().insert(item).await?)
    }

    async fn update_item(&self, item: &Item) -> StoreResult<()> {
        Ok(self.items().update(item).await?)
    }

    async fn delete_item(&self, id: &str) -> StoreResult<()> {
        Ok(self.items().delete(id).await?)
    }

    async fn list_items(&self) -> StoreResult<Vec<Item>> {
        Ok(self.items().list().await?)
    }
}

#[async_trait]
impl SaleStore for Database {
    async fn get_sale(&self, id: &str) -> StoreResult<Option<Sale>> {
        Ok(self.sales().get_by_id(id).await?)
    }

    async fn find_sale_by_invoice_no(&self, invoice_no: &str) -> StoreResult<Option<Sale>> {
        Ok(self.sales().find_by_invoice_no(invoice_no).await?)
    }

    async fn last_invoice_no(&self) -> StoreResult<Option<String>> {
        Ok(self.sales().last_invoice_no().await?)
    }

    async fn insert_sale(&self, sale: &Sale) -> StoreResult<()> {
        Ok(self.sales().insert(sale).await?)
    }

    async fn update_sale(&self, sale: &Sale) -> StoreResult<()> {
        Ok(self.sales().update(sale).await?)
    }

    async fn delete_sale(&self, id: &str) -> StoreResult<()> {
        Ok(self.sales().delete(id).await?)
    }

    async fn list_sales(&self, filter: &ListFilter) -> StoreResult<Vec<Sale>> {
        Ok(self.sales().list(filter).await?)
    }
}

#[async_trait]
impl PurchaseStore for Database {
    async fn get_purchase(&self, id: &str) -> StoreResult<Option<Purchase>> {
        Ok(self.purchases().get_by_id(id).await?)
    }

    async fn find_purchase_by_bill_no(&self, bill_no: &str) -> StoreResult<Option<Purchase>> {
        Ok(self.purchases().find_by_bill_no(bill_no).await?)
    }

    async fn insert_purchase(&self, purchase: &Purchase) -> StoreResult<()> {
        Ok(self.purchases().insert(purchase).await?)
    }

    async fn update_purchase(&self, purchase: &Purchase) -> StoreResult<()> {
        Ok(self.purchases().update(purchase).await?)
    }

    async fn delete_purchase(&self, id: &str) -> StoreResult<()> {
        Ok(self.purchases().delete(id).await?)
    }

    async fn list_purchases(&self, filter: &ListFilter) -> StoreResult<Vec<Purchase>> {
        Ok(self.purchases().list(filter).await?)
    }
}

#[async_trait]
impl PaymentStore for Database {
    async fn get_payment(&self, id: &str) -> StoreResult<Option<Payment>> {
        Ok(self.payments().get_by_id(id).await?)
    }

    async fn payment_no_exists(&self, payment_no: &str) -> StoreResult<bool> {
        Ok(self.payments().payment_no_exists(payment_no).await?)
    }

    async fn insert_payment(&self, payment: &Payment) -> StoreResult<()> {
        Ok(self.payments().insert(payment).await?)
    }

    async fn update_payment(&self, payment: &Payment) -> StoreResult<()> {
        Ok(self.payments().update(payment).await?)
    }

    async fn delete_payment(&self, id: &str) -> StoreResult<()> {
        Ok(self.payments().delete(id).await?)
    }

    async fn list_payments(&self, filter: &ListFilter) -> StoreResult<Vec<Payment>> {
        Ok(self.payments().list(filter).await?)
    }

    async fn payments_in_creation_order(&self) -> StoreResult<Vec<Payment>> {
        Ok(self.payments().list_in_creation_order().await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
