//! # Catalog Seeder
//!
//! Performs the explicit idempotent seeding step: upserts the fee-type
//! catalog every installation starts with. Safe to run any number of
//! times; user data is never touched.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p racedesk-db --bin seed
//!
//! # Specify database path
//! cargo run -p racedesk-db --bin seed -- --db ./data/racedesk.db
//! ```

use std::env;

use racedesk_core::MovementScope;
use racedesk_db::{Database, DbConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./racedesk.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Racedesk Catalog Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./racedesk.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Racedesk Catalog Seeder");
    println!("=======================");
    println!("Database: {}", db_path);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    db.ledger().seed_movement_types().await?;

    let global = db.ledger().movement_types(MovementScope::Global).await?;
    let event = db.ledger().movement_types(MovementScope::Event).await?;

    println!("✓ Movement types seeded");
    println!("  Global ledger: {} types", global.len());
    for t in &global {
        println!("    {} ({})", t.id, t.group);
    }
    println!("  Event books:   {} types", event.len());
    for t in &event {
        println!("    {} ({})", t.id, t.group);
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
