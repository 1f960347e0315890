//! # Seed Data Generator
//!
//! Populates a database with an oil shop's catalogue for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./lubri_dev.db with every brand in every grade
//! cargo run -p lubri-db --bin seed
//!
//! # Limit the catalogue size
//! cargo run -p lubri-db --bin seed -- --count 40
//!
//! # Specify database path
//! cargo run -p lubri-db --bin seed -- --db ./data/oil_inventory.db
//! ```
//!
//! ## Generated Data
//! - Categories: engine, gear, two-stroke, coolant, brake fluid
//! - One supplier and two employees
//! - Products named `{brand} {grade} {pack}` with a batch number, a price
//!   and a cost basis around 75% of the price
//!
//! Finishes with a JSON summary on stdout.

use lubri_core::Money;
use lubri_db::repository::employee::EmployeeInput;
use lubri_db::repository::product::NewProduct;
use lubri_db::repository::supplier::SupplierInput;
use lubri_db::{Database, DbConfig};
use serde_json::json;
use std::env;

/// Category name, grades sold in it, base price per litre in paise.
const CATEGORIES: &[(&str, &[&str], i64)] = &[
    ("Engine Oil", &["10W-30", "15W-40", "20W-40", "20W-50", "5W-30"], 42_000),
    ("Gear Oil", &["80W-90", "85W-140", "EP-90"], 36_000),
    ("2T Oil", &["2T Regular", "2T Synthetic"], 28_000),
    ("Coolant", &["Green", "Red"], 22_000),
    ("Brake Fluid", &["DOT 3", "DOT 4"], 30_000),
];

const BRANDS: &[&str] = &["Servo", "Castrol", "Gulf", "HP Racer", "Veedol"];

/// Pack label and litres.
const PACKS: &[(&str, i64)] = &[("1L", 1), ("3.5L", 3), ("5L", 5)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = usize::MAX;
    let mut db_path = String::from("./lubri_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(count);
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
                println!("Lubri POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Maximum number of products (default: all)");
                println!("  -d, --db <PATH>    Database file path (default: ./lubri_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Lubri POS Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let existing = db.products().list(true).await?.len();
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let supplier = db
        .suppliers()
        .insert(&SupplierInput {
            name: "Sri Lakshmi Lubricants".to_string(),
            phone: Some("0422 2345678".to_string()),
            email: None,
            address: Some("Ukkadam, Coimbatore".to_string()),
        })
        .await?;

    for (name, salary) in [("Ravi", 1_800_000), ("Selvi", 1_650_000)] {
        db.employees()
            .insert(&EmployeeInput {
                name: name.to_string(),
                phone: None,
                joining_date: None,
                salary: Money::from_paise(salary),
            })
            .await?;
    }
    println!("✓ Supplier and employees added");

    let start = std::time::Instant::now();
    let mut generated = 0usize;
    let mut seed = 0usize;

    'outer: for (category_name, grades, base_price) in CATEGORIES {
        let category = db.categories().insert(category_name).await?;

        for brand in BRANDS {
            for grade in grades.iter() {
                for (pack, litres) in PACKS {
                    if generated >= count {
                        break 'outer;
                    }
                    seed += 1;

                    // Bigger packs are a little cheaper per litre
                    let price = base_price * litres * (100 - (litres - 1) * 2) / 100;
                    let product = NewProduct {
                        name: format!("{brand} {grade} {pack}"),
                        quantity: (seed * 7 % 40) as i64,
                        price: Money::from_paise(price),
                        unit_cost: Money::from_paise(price * (70 + (seed % 10) as i64) / 100),
                        batch_number: Some(format!("B{:02}-{:04}", seed % 12 + 1, seed)),
                        category_id: Some(category.id),
                        supplier_id: Some(supplier.id),
                        description: None,
                    };

                    if let Err(e) = db.products().insert(&product).await {
                        eprintln!("Failed to insert {}: {}", product.name, e);
                        continue;
                    }
                    generated += 1;
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!("✓ Generated {} products in {:?}", generated, elapsed);

    let low_stock = db.dashboard().stats(lubri_core::DEFAULT_LOW_STOCK_THRESHOLD).await?.low_stock_count;
    let summary = json!({
        "database": db_path,
        "migrations": db.migration_status().await?,
        "categories": db.categories().list().await?.len(),
        "products": generated,
        "lowStock": low_stock,
        "sample": db.products().search("20W-40", 3).await?,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    db.close().await;
    Ok(())
}
