//! Catalog seeding command.
//!
//! Inserts a small set of sample jewelry products for local development.
//! Skips any product whose name already exists, so the command is safe to
//! run repeatedly.

use rust_decimal::Decimal;

use super::{CommandError, connect};

struct SampleProduct {
    name: &'static str,
    description: &'static str,
    /// Price in minor units (paise).
    price_minor: i64,
    category: &'static str,
}

const SAMPLE_PRODUCTS: &[SampleProduct] = &[
    SampleProduct {
        name: "Solitaire Diamond Ring",
        description: "Classic 18k gold band with a 0.5 carat solitaire.",
        price_minor: 8_499_900,
        category: "rings",
    },
    SampleProduct {
        name: "Pearl Drop Earrings",
        description: "Freshwater pearls on sterling silver hooks.",
        price_minor: 349_900,
        category: "earrings",
    },
    SampleProduct {
        name: "Gold Chain Necklace",
        description: "22k gold rope chain, 18 inches.",
        price_minor: 5_299_900,
        category: "necklaces",
    },
    SampleProduct {
        name: "Ruby Tennis Bracelet",
        description: "Lab-grown rubies set in white gold.",
        price_minor: 2_199_900,
        category: "bracelets",
    },
    SampleProduct {
        name: "Emerald Stud Earrings",
        description: "Colombian emeralds in a 14k gold bezel.",
        price_minor: 1_649_900,
        category: "earrings",
    },
    SampleProduct {
        name: "Silver Bangle Set",
        description: "Set of three hammered sterling silver bangles.",
        price_minor: 129_900,
        category: "bracelets",
    },
];

/// Seed the catalog with sample products.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or an insert
/// fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    let currency = std::env::var("STORE_CURRENCY").unwrap_or_else(|_| "INR".to_string());

    let mut inserted = 0_usize;
    for product in SAMPLE_PRODUCTS {
        let result = sqlx::query(
            "INSERT INTO shop.products (name, description, price, currency, category)
             SELECT $1, $2, $3, $4, $5
             WHERE NOT EXISTS (SELECT 1 FROM shop.products WHERE name = $1)",
        )
        .bind(product.name)
        .bind(product.description)
        .bind(Decimal::new(product.price_minor, 2))
        .bind(&currency)
        .bind(product.category)
        .execute(&pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
            tracing::info!("Seeded: {}", product.name);
        }
    }

    tracing::info!(
        "Seeding complete: {} inserted, {} already present",
        inserted,
        SAMPLE_PRODUCTS.len() - inserted
    );
    Ok(())
}
