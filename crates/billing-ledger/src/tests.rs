//! Lifecycle tests over the in-memory store.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use billing_core::requests::{
    CreateItemRequest, CreatePaymentRequest, CreatePurchaseRequest, CreateSaleRequest,
    LineItemInput, UpdateItemRequest, UpdatePaymentRequest, UpdatePurchaseRequest,
    UpdateSaleRequest,
};
use billing_core::{
    Bags, Item, ItemCategory, Kilograms, ListFilter, Money, PaymentMethod, PaymentType,
};

use crate::store::PaymentStore;
use crate::{Ledger, LedgerError, MemoryStore};

const PHONE: &str = "9876543210";

// =============================================================================
// Fixtures
// =============================================================================

async fn ledger() -> Ledger<MemoryStore> {
    Ledger::open(MemoryStore::new()).await.unwrap()
}

async fn stocked_item(ledger: &Ledger<MemoryStore>, name: &str, bags: Decimal) -> Item {
    ledger
        .items()
        .create(CreateItemRequest {
            product_name: name.into(),
            category: ItemCategory::Primary,
            purchase_price: Money::new(dec!(20)),
            sale_price: Money::new(dec!(25)),
            opening_stock: Bags::new(bags),
            low_stock_alert: Bags::zero(),
        })
        .await
        .unwrap()
}

async fn set_bardana(ledger: &Ledger<MemoryStore>, bags: Decimal) {
    ledger
        .items()
        .update(
            ledger.bardana_id(),
            UpdateItemRequest {
                opening_stock: Some(Bags::new(bags)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
}

async fn stock_of(ledger: &Ledger<MemoryStore>, id: &str) -> Bags {
    ledger.items().get(id).await.unwrap().opening_stock
}

async fn balance_of(ledger: &Ledger<MemoryStore>, party_id: &str) -> Decimal {
    ledger.parties().get(party_id).await.unwrap().balance.amount()
}

fn line(item: &Item, kg: Decimal, rate: Decimal) -> LineItemInput {
    LineItemInput {
        id: Some(item.id.clone()),
        item_name: item.product_name.clone(),
        quantity: Kilograms::new(kg),
        rate: Money::new(rate),
    }
}

fn sale_request(items: Vec<LineItemInput>) -> CreateSaleRequest {
    CreateSaleRequest {
        party_name: "Ramesh Traders".into(),
        phone_number: PHONE.into(),
        date: None,
        items,
        total_amount: None,
        notes: None,
    }
}

fn purchase_request(bill_no: &str, items: Vec<LineItemInput>) -> CreatePurchaseRequest {
    CreatePurchaseRequest {
        bill_no: bill_no.into(),
        party_name: "Mahesh Mills".into(),
        phone_number: PHONE.into(),
        date: Some("03/01/2024".into()),
        items,
        total_amount: None,
        notes: None,
    }
}

fn payment_request(payment_type: PaymentType, amount: Decimal) -> CreatePaymentRequest {
    CreatePaymentRequest {
        payment_type,
        party_name: Some("Ramesh Traders".into()),
        phone_number: Some(PHONE.into()),
        amount: Money::new(amount),
        total_amount: None,
        payment_method: None,
        reference: None,
        description: None,
        date: None,
    }
}

// =============================================================================
// Sales
// =============================================================================

#[tokio::test]
async fn test_sale_total_ignores_caller_total() {
    let ledger = ledger().await;
    let rice = stocked_item(&ledger, "Rice", dec!(100)).await;

    let mut request = sale_request(vec![line(&rice, dec!(12.5), dec!(40)), line(&rice, dec!(30), dec!(10))]);
    request.total_amount = Some(Money::new(dec!(1)));

    let sale = ledger.sales().create(request).await.unwrap().record;
    assert_eq!(sale.total_amount.amount(), dec!(800));
    assert_eq!(sale.items[0].total.amount(), dec!(500));
    assert_eq!(sale.invoice_no, "1");
    assert_eq!(sale.date.len(), 10);
}

#[tokio::test]
async fn test_sale_90kg_clamps_item_but_not_bardana() {
    let ledger = ledger().await;
    let rice = stocked_item(&ledger, "Rice", dec!(2)).await;
    set_bardana(&ledger, dec!(10)).await;

    let outcome = ledger
        .sales()
        .create(sale_request(vec![line(&rice, dec!(90), dec!(30))]))
        .await
        .unwrap();

    assert!(outcome.compensation.is_clean());
    assert_eq!(stock_of(&ledger, &rice.id).await, Bags::zero());
    assert_eq!(stock_of(&ledger, ledger.bardana_id()).await, Bags::new(dec!(7)));
    let party_id = outcome.record.party_id.unwrap();
    assert_eq!(balance_of(&ledger, &party_id).await, dec!(2700));
}

#[tokio::test]
async fn test_sale_invoice_numbers_increment() {
    let ledger = ledger().await;
    let rice = stocked_item(&ledger, "Rice", dec!(100)).await;

    let first = ledger.sales().create(sale_request(vec![line(&rice, dec!(1), dec!(1))])).await.unwrap();
    let second = ledger.sales().create(sale_request(vec![line(&rice, dec!(1), dec!(1))])).await.unwrap();
    assert_eq!(first.record.invoice_no, "1");
    assert_eq!(second.record.invoice_no, "2");
    assert_eq!(first.record.party_id, second.record.party_id);
}

#[tokio::test]
async fn test_eleventh_sale_stalls_on_text_ordered_invoice_numbers() {
    let ledger = ledger().await;
    let rice = stocked_item(&ledger, "Rice", dec!(100)).await;

    for expected in 1..=10 {
        let outcome = ledger
            .sales()
            .create(sale_request(vec![line(&rice, dec!(30), dec!(1))]))
            .await
            .unwrap();
        assert_eq!(outcome.record.invoice_no, expected.to_string());
    }
    assert_eq!(stock_of(&ledger, &rice.id).await, Bags::new(dec!(90)));

    let err = ledger
        .sales()
        .create(sale_request(vec![line(&rice, dec!(30), dec!(1))]))
        .await
        .unwrap_err();
    match err {
        LedgerError::Conflict { field, value } => {
            assert_eq!(field, "invoiceNo");
            assert_eq!(value, "10");
        }
        other => panic!("expected conflict, got {other:?}"),
    }
    assert_eq!(stock_of(&ledger, &rice.id).await, Bags::new(dec!(90)));
    assert_eq!(ledger.sales().list(&ListFilter::default()).await.unwrap().len(), 10);
}

#[tokio::test]
async fn test_oversized_sale_is_rejected_without_effects() {
    let ledger = ledger().await;
    let rice = stocked_item(&ledger, "Rice", dec!(10)).await;

    let err = ledger
        .sales()
        .create(sale_request(vec![line(&rice, dec!(1e15), dec!(1e15))]))
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::Validation(_)));
    assert!(ledger.parties().list(None).await.unwrap().is_empty());
    assert!(ledger.sales().list(&ListFilter::default()).await.unwrap().is_empty());
    assert_eq!(stock_of(&ledger, &rice.id).await, Bags::new(dec!(10)));
}

#[tokio::test]
async fn test_sale_update_resending_lines_without_ids_leaves_stock() {
    let ledger = ledger().await;
    let rice = stocked_item(&ledger, "Rice", dec!(10)).await;
    set_bardana(&ledger, dec!(5)).await;
    let unreferenced = || {
        vec![LineItemInput::new(
            "Rice",
            Kilograms::new(dec!(30)),
            Money::new(dec!(10)),
        )]
    };

    let sale = ledger
        .sales()
        .create(sale_request(unreferenced()))
        .await
        .unwrap()
        .record;
    assert_eq!(stock_of(&ledger, &rice.id).await, Bags::new(dec!(9)));

    let outcome = ledger
        .sales()
        .update(
            &sale.id,
            UpdateSaleRequest {
                items: Some(unreferenced()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(outcome.compensation.applied, 0);
    assert_eq!(outcome.record.items, sale.items);
    assert_eq!(stock_of(&ledger, &rice.id).await, Bags::new(dec!(9)));
    assert_eq!(stock_of(&ledger, ledger.bardana_id()).await, Bags::new(dec!(4)));
}

#[tokio::test]
async fn test_sale_create_then_delete_restores_everything() {
    let ledger = ledger().await;
    let rice = stocked_item(&ledger, "Rice", dec!(50)).await;
    let dal = stocked_item(&ledger, "Dal", dec!(20)).await;
    set_bardana(&ledger, dec!(40)).await;

    let sale = ledger
        .sales()
        .create(sale_request(vec![line(&rice, dec!(45), dec!(30)), line(&dal, dec!(15), dec!(90))]))
        .await
        .unwrap()
        .record;
    let party_id = sale.party_id.clone().unwrap();
    assert_ne!(stock_of(&ledger, &rice.id).await, Bags::new(dec!(50)));

    ledger.sales().delete(&sale.id).await.unwrap();

    assert_eq!(stock_of(&ledger, &rice.id).await, Bags::new(dec!(50)));
    assert_eq!(stock_of(&ledger, &dal.id).await, Bags::new(dec!(20)));
    assert_eq!(stock_of(&ledger, ledger.bardana_id()).await, Bags::new(dec!(40)));
    assert_eq!(balance_of(&ledger, &party_id).await, Decimal::ZERO);
    assert!(matches!(
        ledger.sales().get(&sale.id).await,
        Err(LedgerError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_sale_update_30_to_60kg_nets_two_bags() {
    let ledger = ledger().await;
    let rice = stocked_item(&ledger, "Rice", dec!(10)).await;
    set_bardana(&ledger, dec!(10)).await;

    let sale = ledger
        .sales()
        .create(sale_request(vec![line(&rice, dec!(30), dec!(10))]))
        .await
        .unwrap()
        .record;
    assert_eq!(stock_of(&ledger, &rice.id).await, Bags::new(dec!(9)));

    let updated = ledger
        .sales()
        .update(
            &sale.id,
            UpdateSaleRequest {
                items: Some(vec![line(&rice, dec!(60), dec!(10))]),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .record;

    assert_eq!(stock_of(&ledger, &rice.id).await, Bags::new(dec!(8)));
    assert_eq!(stock_of(&ledger, ledger.bardana_id()).await, Bags::new(dec!(8)));
    assert_eq!(updated.total_amount.amount(), dec!(600));
    let party_id = updated.party_id.unwrap();
    assert_eq!(balance_of(&ledger, &party_id).await, dec!(600));
}

#[tokio::test]
async fn test_sale_update_without_item_change_leaves_stock() {
    let ledger = ledger().await;
    let rice = stocked_item(&ledger, "Rice", dec!(10)).await;
    let sale = ledger
        .sales()
        .create(sale_request(vec![line(&rice, dec!(30), dec!(10))]))
        .await
        .unwrap()
        .record;

    let outcome = ledger
        .sales()
        .update(
            &sale.id,
            UpdateSaleRequest {
                notes: Some("paid by cheque".into()),
                party_name: Some("Ramesh & Sons".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(outcome.compensation.applied, 0);
    assert_eq!(outcome.record.party_id, sale.party_id);
    assert_eq!(outcome.record.party_name, "Ramesh & Sons");
    assert_eq!(stock_of(&ledger, &rice.id).await, Bags::new(dec!(9)));
}

#[tokio::test]
async fn test_sale_rename_to_taken_invoice_conflicts() {
    let ledger = ledger().await;
    let rice = stocked_item(&ledger, "Rice", dec!(10)).await;
    ledger.sales().create(sale_request(vec![line(&rice, dec!(1), dec!(1))])).await.unwrap();
    let second = ledger.sales().create(sale_request(vec![line(&rice, dec!(1), dec!(1))])).await.unwrap();

    let err = ledger
        .sales()
        .update(
            &second.record.id,
            UpdateSaleRequest {
                invoice_no: Some("1".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Conflict { .. }));
}

#[tokio::test]
async fn test_sale_with_unknown_item_is_still_recorded() {
    let ledger = ledger().await;
    set_bardana(&ledger, dec!(5)).await;

    let outcome = ledger
        .sales()
        .create(sale_request(vec![LineItemInput::new(
            "Saffron",
            Kilograms::new(dec!(30)),
            Money::new(dec!(100)),
        )]))
        .await
        .unwrap();

    assert_eq!(outcome.compensation.failures.len(), 1);
    assert_eq!(stock_of(&ledger, ledger.bardana_id()).await, Bags::new(dec!(4)));
    assert!(ledger.sales().get(&outcome.record.id).await.is_ok());
}

#[tokio::test]
async fn test_invalid_sale_writes_nothing() {
    let ledger = ledger().await;
    let rice = stocked_item(&ledger, "Rice", dec!(10)).await;

    let err = ledger
        .sales()
        .create(sale_request(vec![line(&rice, dec!(0), dec!(10))]))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
    assert!(ledger.parties().list(None).await.unwrap().is_empty());
    assert!(ledger.sales().list(&ListFilter::default()).await.unwrap().is_empty());
}

// =============================================================================
// Purchases
// =============================================================================

#[tokio::test]
async fn test_purchase_adds_stock_and_lowers_balance() {
    let ledger = ledger().await;
    let wheat = stocked_item(&ledger, "Wheat", dec!(0)).await;

    let purchase = ledger
        .purchases()
        .create(purchase_request("PB-1", vec![line(&wheat, dec!(60), dec!(22))]))
        .await
        .unwrap()
        .record;

    assert_eq!(stock_of(&ledger, &wheat.id).await, Bags::new(dec!(2)));
    assert_eq!(stock_of(&ledger, ledger.bardana_id()).await, Bags::new(dec!(2)));
    assert_eq!(balance_of(&ledger, purchase.party_id.as_deref().unwrap()).await, dec!(-1320));
}

#[tokio::test]
async fn test_duplicate_bill_no_conflicts_without_effects() {
    let ledger = ledger().await;
    let wheat = stocked_item(&ledger, "Wheat", dec!(0)).await;
    let first = ledger
        .purchases()
        .create(purchase_request("PB-1", vec![line(&wheat, dec!(30), dec!(10))]))
        .await
        .unwrap()
        .record;
    let party_id = first.party_id.unwrap();

    let err = ledger
        .purchases()
        .create(purchase_request("PB-1", vec![line(&wheat, dec!(90), dec!(10))]))
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::Conflict { ref field, .. } if field == "billNo"));
    assert_eq!(stock_of(&ledger, &wheat.id).await, Bags::new(dec!(1)));
    assert_eq!(stock_of(&ledger, ledger.bardana_id()).await, Bags::new(dec!(1)));
    assert_eq!(balance_of(&ledger, &party_id).await, dec!(-300));
}

#[tokio::test]
async fn test_purchase_update_moves_bardana_by_net_difference() {
    let ledger = ledger().await;
    let wheat = stocked_item(&ledger, "Wheat", dec!(0)).await;
    let purchase = ledger
        .purchases()
        .create(purchase_request("PB-7", vec![line(&wheat, dec!(90), dec!(10))]))
        .await
        .unwrap()
        .record;
    assert_eq!(stock_of(&ledger, ledger.bardana_id()).await, Bags::new(dec!(3)));

    let outcome = ledger
        .purchases()
        .update(
            &purchase.id,
            UpdatePurchaseRequest {
                items: Some(vec![line(&wheat, dec!(30), dec!(10))]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(outcome.compensation.is_clean());
    // balance step, old line, new line, one Bardana step
    assert_eq!(outcome.compensation.applied, 4);
    assert_eq!(stock_of(&ledger, &wheat.id).await, Bags::new(dec!(1)));
    assert_eq!(stock_of(&ledger, ledger.bardana_id()).await, Bags::new(dec!(1)));
    let party_id = outcome.record.party_id.unwrap();
    assert_eq!(balance_of(&ledger, &party_id).await, dec!(-300));
}

#[tokio::test]
async fn test_purchase_update_with_unchanged_lines_has_no_stock_steps() {
    let ledger = ledger().await;
    let wheat = stocked_item(&ledger, "Wheat", dec!(0)).await;
    let purchase = ledger
        .purchases()
        .create(purchase_request("PB-8", vec![line(&wheat, dec!(60), dec!(22))]))
        .await
        .unwrap()
        .record;

    let outcome = ledger
        .purchases()
        .update(
            &purchase.id,
            UpdatePurchaseRequest {
                items: Some(vec![LineItemInput::new(
                    "Wheat",
                    Kilograms::new(dec!(60)),
                    Money::new(dec!(22)),
                )]),
                notes: Some("resent from the form".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(outcome.compensation.applied, 0);
    assert_eq!(outcome.record.items[0].id, wheat.id);
    assert_eq!(stock_of(&ledger, &wheat.id).await, Bags::new(dec!(2)));
}

#[tokio::test]
async fn test_purchase_create_then_delete_restores_everything() {
    let ledger = ledger().await;
    let wheat = stocked_item(&ledger, "Wheat", dec!(4)).await;
    set_bardana(&ledger, dec!(4)).await;

    let purchase = ledger
        .purchases()
        .create(purchase_request("PB-9", vec![line(&wheat, dec!(75), dec!(12))]))
        .await
        .unwrap()
        .record;
    ledger.purchases().delete(&purchase.id).await.unwrap();

    assert_eq!(stock_of(&ledger, &wheat.id).await, Bags::new(dec!(4)));
    assert_eq!(stock_of(&ledger, ledger.bardana_id()).await, Bags::new(dec!(4)));
    assert_eq!(balance_of(&ledger, purchase.party_id.as_deref().unwrap()).await, Decimal::ZERO);
}

// =============================================================================
// Payments
// =============================================================================

#[tokio::test]
async fn test_payment_directions() {
    let ledger = ledger().await;

    let incoming = ledger
        .payments()
        .create(payment_request(PaymentType::PaymentIn, dec!(250)))
        .await
        .unwrap()
        .record;
    let party_id = incoming.party_id.clone().unwrap();
    assert_eq!(balance_of(&ledger, &party_id).await, dec!(-250));
    assert!(incoming.payment_no.starts_with("PAY-IN-"));
    assert_eq!(incoming.total_amount, incoming.amount);
    assert_eq!(incoming.payment_method, PaymentMethod::Cash);

    let outgoing = ledger
        .payments()
        .create(payment_request(PaymentType::PaymentOut, dec!(100)))
        .await
        .unwrap()
        .record;
    assert!(outgoing.payment_no.starts_with("PAY-OUT-"));
    assert_eq!(balance_of(&ledger, &party_id).await, dec!(-150));
}

#[tokio::test]
async fn test_payment_without_party_is_unlinked() {
    let ledger = ledger().await;
    let mut request = payment_request(PaymentType::PaymentIn, dec!(10));
    request.party_name = None;

    let outcome = ledger.payments().create(request).await.unwrap();
    assert!(outcome.record.party_id.is_none());
    assert_eq!(outcome.compensation.applied, 0);
}

#[tokio::test]
async fn test_payment_amount_update_reverses_with_add() {
    let ledger = ledger().await;
    let payment = ledger
        .payments()
        .create(payment_request(PaymentType::PaymentIn, dec!(100)))
        .await
        .unwrap()
        .record;
    let party_id = payment.party_id.clone().unwrap();

    ledger
        .payments()
        .update(
            &payment.id,
            UpdatePaymentRequest {
                amount: Some(Money::new(dec!(150))),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // -100, then +100 reversal, then -150
    assert_eq!(balance_of(&ledger, &party_id).await, dec!(-150));
}

#[tokio::test]
async fn test_payment_type_change_alone_has_no_balance_effect() {
    let ledger = ledger().await;
    let payment = ledger
        .payments()
        .create(payment_request(PaymentType::PaymentIn, dec!(100)))
        .await
        .unwrap()
        .record;

    let outcome = ledger
        .payments()
        .update(
            &payment.id,
            UpdatePaymentRequest {
                payment_type: Some(PaymentType::PaymentOut),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(outcome.record.payment_type, PaymentType::PaymentOut);
    assert_eq!(outcome.compensation.applied, 0);
    assert_eq!(balance_of(&ledger, payment.party_id.as_deref().unwrap()).await, dec!(-100));
}

#[tokio::test]
async fn test_payment_delete_always_adds() {
    let ledger = ledger().await;
    let incoming = ledger
        .payments()
        .create(payment_request(PaymentType::PaymentIn, dec!(100)))
        .await
        .unwrap()
        .record;
    let party_id = incoming.party_id.clone().unwrap();
    ledger.payments().delete(&incoming.id).await.unwrap();
    assert_eq!(balance_of(&ledger, &party_id).await, Decimal::ZERO);

    let outgoing = ledger
        .payments()
        .create(payment_request(PaymentType::PaymentOut, dec!(40)))
        .await
        .unwrap()
        .record;
    ledger.payments().delete(&outgoing.id).await.unwrap();
    assert_eq!(balance_of(&ledger, &party_id).await, dec!(80));
}

#[tokio::test]
async fn test_cleanup_keeps_first_created() {
    let ledger = ledger().await;
    let first = ledger
        .payments()
        .create(payment_request(PaymentType::PaymentIn, dec!(1)))
        .await
        .unwrap()
        .record;

    let mut copy = first.clone();
    copy.id = billing_core::new_id();
    copy.created_at = first.created_at + chrono::Duration::seconds(1);
    ledger.store().insert_payment(&copy).await.unwrap();

    let report = ledger.payments().cleanup_duplicates().await.unwrap();
    assert_eq!(report.scanned, 2);
    assert_eq!(report.duplicate_numbers, vec![first.payment_no.clone()]);
    assert_eq!(report.removed_ids, vec![copy.id.clone()]);
    assert!(ledger.payments().get(&first.id).await.is_ok());
}

// =============================================================================
// Reconciliation
// =============================================================================

#[tokio::test]
async fn test_drift_is_reported_and_repaired() {
    let ledger = ledger().await;
    let rice = stocked_item(&ledger, "Rice", dec!(10)).await;
    let sale = ledger
        .sales()
        .create(sale_request(vec![line(&rice, dec!(30), dec!(10))]))
        .await
        .unwrap()
        .record;
    ledger
        .payments()
        .create(payment_request(PaymentType::PaymentIn, dec!(120)))
        .await
        .unwrap();
    let party_id = sale.party_id.unwrap();

    assert!(ledger.reconciler().balance_drift().await.unwrap().is_empty());

    ledger.parties().set_balance(&party_id, Money::new(dec!(5))).await.unwrap();
    let drift = ledger.reconciler().balance_drift().await.unwrap();
    assert_eq!(drift.len(), 1);
    assert_eq!(drift[0].expected.amount(), dec!(180));
    assert_eq!(drift[0].drift.amount(), dec!(-175));

    let repaired = ledger.reconciler().repair_balance(&party_id).await.unwrap();
    assert_eq!(repaired.balance.amount(), dec!(180));
    assert!(ledger.reconciler().balance_drift().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reopen_keeps_single_bardana() {
    let store = std::sync::Arc::new(MemoryStore::new());
    let first = Ledger::open_shared(std::sync::Arc::clone(&store)).await.unwrap();
    let second = Ledger::open_shared(store).await.unwrap();
    assert_eq!(first.bardana_id(), second.bardana_id());
    assert_eq!(first.items().list(None, None).await.unwrap().len(), 1);
}
