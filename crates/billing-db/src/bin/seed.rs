//! # Seed Data Generator
//!
//! Fills a database with demo parties, items and documents, going through
//! the ledger so balances and stock end up consistent.
//!
//! ## Usage
//! ```bash
//! # 20 parties with a few documents each (default)
//! cargo run -p billing-db --bin seed
//!
//! # Custom amount and database path
//! cargo run -p billing-db --bin seed -- --parties 50 --db ./data/billing.db
//! ```

use std::env;

use billing_core::requests::{
    CreateItemRequest, CreatePaymentRequest, CreatePurchaseRequest, CreateSaleRequest,
    LineItemInput,
};
use billing_core::{Bags, Item, ItemCategory, Kilograms, Money, PaymentMethod, PaymentType};
use billing_db::{Database, DbConfig};
use billing_ledger::Ledger;
use rust_decimal::Decimal;

/// `(name, category, purchase price, sale price per kg)`
const ITEMS: &[(&str, ItemCategory, i64, i64)] = &[
    ("Basmati Rice", ItemCategory::Primary, 62, 70),
    ("Sona Masoori Rice", ItemCategory::Primary, 44, 50),
    ("Wheat", ItemCategory::Primary, 26, 30),
    ("Toor Dal", ItemCategory::Primary, 110, 125),
    ("Chana Dal", ItemCategory::Primary, 72, 80),
    ("Sugar", ItemCategory::Kirana, 38, 42),
    ("Jaggery", ItemCategory::Kirana, 48, 55),
    ("Mustard Oil", ItemCategory::Kirana, 140, 155),
];

const FIRST_NAMES: &[&str] = &[
    "Ramesh", "Suresh", "Mahesh", "Anita", "Kavita", "Rajesh", "Sunita", "Vijay", "Meena", "Arjun",
];

const SUFFIXES: &[&str] = &["Traders", "& Sons", "Kirana Store", "Wholesale", "Agencies"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let mut parties: usize = 20;
    let mut db_path = String::from("./data/billing_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--parties" | "-p" => {
                if i + 1 < args.len() {
                    parties = args[i + 1].parse().unwrap_or(20);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Bardana Ledger Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -p, --parties <N>  Number of parties to generate (default: 20)");
                println!("  -d, --db <PATH>    Database file path (default: ./data/billing_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Bardana Ledger Seed Data Generator");
    println!("=====================================");
    println!("Database: {}", db_path);
    println!("Parties:  {}", parties);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let ledger = Ledger::open(db).await?;

    let existing = ledger.parties().list(None).await?.len();
    if existing > 0 {
        println!("⚠ Database already has {} parties", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();

    let mut items = Vec::with_capacity(ITEMS.len());
    for (name, category, purchase, sale) in ITEMS {
        let item = ledger
            .items()
            .create(CreateItemRequest {
                product_name: name.to_string(),
                category: *category,
                purchase_price: Money::new(Decimal::from(*purchase)),
                sale_price: Money::new(Decimal::from(*sale)),
                opening_stock: Bags::new(Decimal::from(50)),
                low_stock_alert: Bags::new(Decimal::from(5)),
            })
            .await?;
        items.push(item);
    }
    println!("✓ Created {} items", items.len());

    let mut failed_steps = 0;
    for seed in 0..parties {
        let name = format!(
            "{} {}",
            FIRST_NAMES[seed % FIRST_NAMES.len()],
            SUFFIXES[(seed / FIRST_NAMES.len()) % SUFFIXES.len()]
        );
        let phone = format!("98{:08}", 10_000_000 + seed * 7919);

        let purchase = ledger
            .purchases()
            .create(CreatePurchaseRequest {
                bill_no: format!("PB-{:04}", seed + 1),
                party_name: name.clone(),
                phone_number: phone.clone(),
                date: None,
                items: lines(&items, seed, true),
                total_amount: None,
                notes: Some("Seeded purchase".to_string()),
            })
            .await?;
        failed_steps += purchase.compensation.failures.len();

        let sale = ledger
            .sales()
            .create(CreateSaleRequest {
                party_name: name.clone(),
                phone_number: phone.clone(),
                date: None,
                items: lines(&items, seed, false),
                total_amount: None,
                notes: None,
            })
            .await?;
        failed_steps += sale.compensation.failures.len();

        let payment_type = if seed % 2 == 0 {
            PaymentType::PaymentIn
        } else {
            PaymentType::PaymentOut
        };
        let payment = ledger
            .payments()
            .create(CreatePaymentRequest {
                payment_type,
                party_name: Some(name),
                phone_number: Some(phone),
                amount: Money::new(Decimal::from(500 + (seed as i64 * 37) % 2_000)),
                total_amount: None,
                payment_method: Some(if seed % 3 == 0 {
                    PaymentMethod::Upi
                } else {
                    PaymentMethod::Cash
                }),
                reference: None,
                description: None,
                date: None,
            })
            .await?;
        failed_steps += payment.compensation.failures.len();

        if (seed + 1) % 10 == 0 {
            println!("  Seeded {} parties...", seed + 1);
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Seeded {} parties in {:?}", parties, elapsed);
    if failed_steps > 0 {
        println!("⚠ {} compensation steps failed; see the log", failed_steps);
    }

    let drift = ledger.reconciler().balance_drift().await?;
    println!("  Parties with balance drift: {}", drift.len());

    let low = ledger.items().low_stock().await?;
    println!("  Items low on stock: {}", low.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Two lines per document, in multiples of 15 kg.
fn lines(items: &[Item], seed: usize, purchase: bool) -> Vec<LineItemInput> {
    (0..2)
        .map(|n| {
            let item = &items[(seed + n * 3) % items.len()];
            let bags_worth = if purchase { 4 } else { 1 + (seed + n) % 3 };
            let rate = if purchase {
                item.purchase_price
            } else {
                item.sale_price
            };
            LineItemInput {
                id: Some(item.id.clone()),
                ..LineItemInput::new(
                    item.product_name.clone(),
                    Kilograms::new(Decimal::from(bags_worth * 15)),
                    rate,
                )
            }
        })
        .collect()
}
