//! # Seed Data Generator
//!
//! Populates a development database with accounts, orders and
//! subscriptions.
//!
//! ## Usage
//! ```bash
//! # Seed ./mehfil_dev.db
//! cargo run -p mehfil-db --bin seed
//!
//! # Specify database path and admin password
//! cargo run -p mehfil-db --bin seed -- --db ./data/mehfil.db --admin-password s3cret!
//! ```
//!
//! ## Generated Data
//! - The default administrator (`admin@cafemehfil.com`)
//! - A handful of customers, all with password `customer123`
//! - One order per customer, mixing PayPal and e-transfer
//! - One subscription per customer, every offered frequency

use mehfil_core::{Frequency, LineItem, Money, NewOrder, NewSubscription, PaymentMethod};
use mehfil_db::{Database, DbConfig};
use std::env;

/// Customers: (name, email)
const CUSTOMERS: &[(&str, &str)] = &[
    ("Ayesha Siddiqui", "ayesha@example.com"),
    ("Bilal Chaudhry", "bilal@example.com"),
    ("Hina Qureshi", "hina@example.com"),
    ("Omar Farooq", "omar@example.com"),
    ("Sana Malik", "sana@example.com"),
];

/// Storefront products: (id, name, price in cents)
const PRODUCTS: &[(&str, &str, i64)] = &[
    ("karak-chai-blend", "Karak Chai Blend 250g", 1499),
    ("cardamom-latte-kit", "Cardamom Latte Kit", 1800),
    ("rose-cold-brew", "Rose Cold Brew Concentrate", 2250),
    ("house-espresso-beans", "House Espresso Beans 1kg", 3499),
    ("saffron-honey", "Saffron Honey Syrup", 999),
];

const CUSTOMER_PASSWORD: &str = "customer123";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./mehfil_dev.db");
    let mut admin_password = String::from("admin123");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--admin-password" | "-p" => {
                if i + 1 < args.len() {
                    admin_password = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Cafe Mehfil Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>                Database file path (default: ./mehfil_dev.db)");
                println!("  -p, --admin-password <PASS>    Default admin password (default: admin123)");
                println!("  -h, --help                     Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Cafe Mehfil Seed Data Generator");
    println!("==================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let repos = db.repositories();

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    match repos.users().ensure_default_admin(&admin_password).await? {
        Some(admin) => println!("✓ Created admin account {}", admin.email),
        None => println!("  Admin account already exists"),
    }

    // Skip if customers were seeded before
    let existing = repos.users().list().await?.len();
    if existing > 1 {
        println!("⚠ Database already has {} accounts", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating customers...");

    for (idx, (name, email)) in CUSTOMERS.iter().enumerate() {
        let user = match repos
            .users()
            .signup(email, CUSTOMER_PASSWORD, CUSTOMER_PASSWORD, name)
            .await
        {
            Ok(user) => user,
            Err(e) => {
                eprintln!("Failed to create {}: {}", email, e);
                continue;
            }
        };

        let method = if idx % 2 == 0 {
            PaymentMethod::Paypal
        } else {
            PaymentMethod::Etransfer
        };

        let items = basket(idx);
        let total_amount = mehfil_core::cart_total(&items);
        let order = repos
            .orders()
            .create(NewOrder {
                user_id: user.id.clone(),
                user_name: user.name.clone(),
                user_email: user.email.clone(),
                items: items.clone(),
                payment_method: method,
                total_amount,
            })
            .await?;

        let frequency = Frequency::OFFERED[idx % Frequency::OFFERED.len()];
        let subscription = repos
            .subscriptions()
            .create(NewSubscription {
                user_id: user.id.clone(),
                user_name: user.name.clone(),
                user_email: user.email.clone(),
                products: items,
                frequency,
                payment_method: method,
            })
            .await?;

        println!(
            "  {} → order {} ({}), {} subscription ({})",
            user.name, order.total_amount, order.payment_status, frequency, subscription.status
        );
    }

    println!();
    println!("✓ Seed complete!");
    println!("  Customers log in with password '{}'", CUSTOMER_PASSWORD);

    Ok(())
}

/// One or two products, picked by customer index.
fn basket(seed: usize) -> Vec<LineItem> {
    let line = |offset: usize, quantity: i64| {
        let (product_id, name, cents) = PRODUCTS[(seed + offset) % PRODUCTS.len()];
        LineItem {
            product_id: product_id.to_string(),
            name: name.to_string(),
            image: None,
            unit_price: Money::from_cents(cents),
            quantity,
        }
    };

    if seed % 3 == 0 {
        vec![line(0, 1)]
    } else {
        vec![line(0, 2), line(2, 1)]
    }
}
