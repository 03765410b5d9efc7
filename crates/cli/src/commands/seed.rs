//! Seed the catalog with the starter guitar inventory.
//!
//! # Usage
//!
//! ```bash
//! knavetone-cli seed
//! ```
//!
//! Seeding is skipped when the catalog already has products, so the command
//! is safe to run repeatedly.

use rust_decimal::Decimal;

use super::CliError;

struct SeedProduct {
    name: &'static str,
    brand: &'static str,
    category: &'static str,
    /// Price in cents.
    price_cents: i64,
    stock: i32,
    description: &'static str,
}

/// The starter inventory: a small spread across every catalog category.
const STARTER_CATALOG: &[SeedProduct] = &[
    SeedProduct {
        name: "Player Stratocaster",
        brand: "Fender",
        category: "Electric",
        price_cents: 79_999,
        stock: 12,
        description: "Alder body, maple neck, three single-coil pickups.",
    },
    SeedProduct {
        name: "Les Paul Standard 60s",
        brand: "Gibson",
        category: "Electric",
        price_cents: 269_900,
        stock: 4,
        description: "Mahogany body with AA figured maple top, BurstBucker pickups.",
    },
    SeedProduct {
        name: "SE Custom 24",
        brand: "PRS",
        category: "Electric",
        price_cents: 89_900,
        stock: 7,
        description: "Maple top, wide thin neck, 85/15 S humbuckers.",
    },
    SeedProduct {
        name: "D-28",
        brand: "Martin",
        category: "Acoustic",
        price_cents: 319_900,
        stock: 3,
        description: "Sitka spruce top, East Indian rosewood back and sides.",
    },
    SeedProduct {
        name: "FG800",
        brand: "Yamaha",
        category: "Acoustic",
        price_cents: 23_999,
        stock: 20,
        description: "Solid spruce top dreadnought, the standard first guitar.",
    },
    SeedProduct {
        name: "Player Jazz Bass",
        brand: "Fender",
        category: "Bass",
        price_cents: 82_499,
        stock: 6,
        description: "Two single-coil Jazz Bass pickups, slim C neck.",
    },
    SeedProduct {
        name: "Katana-50 MkII",
        brand: "Boss",
        category: "Amplifier",
        price_cents: 26_999,
        stock: 15,
        description: "50-watt 1x12 combo with five amp characters.",
    },
    SeedProduct {
        name: "Tube Screamer TS9",
        brand: "Ibanez",
        category: "Accessory",
        price_cents: 9_999,
        stock: 25,
        description: "The classic mid-hump overdrive pedal.",
    },
];

/// Insert the starter catalog if the products table is empty.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CliError> {
    let pool = super::connect().await?;

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
        .fetch_one(&pool)
        .await?;

    if count > 0 {
        tracing::info!(existing = count, "Catalog already seeded, nothing to do");
        return Ok(());
    }

    for product in STARTER_CATALOG {
        sqlx::query(
            r"
            INSERT INTO products (name, brand, category, price, stock, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(product.name)
        .bind(product.brand)
        .bind(product.category)
        .bind(Decimal::new(product.price_cents, 2))
        .bind(product.stock)
        .bind(product.description)
        .execute(&pool)
        .await?;

        tracing::info!(name = product.name, brand = product.brand, "Seeded product");
    }

    tracing::info!(products = STARTER_CATALOG.len(), "Catalog seeded!");
    Ok(())
}
