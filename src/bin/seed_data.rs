//! Seed data script - stocks a fresh database with a demo catalogue
//!
//! Run with: cargo run --bin seed-data
//!
//! This creates:
//! - 4 coffee types
//! - 8 coffee items, two of them below the low-stock threshold
//! - 2 sample orders placed through the checkout flow

use std::sync::Arc;

use anyhow::{Context, Result};
use rust_decimal_macros::dec;
use tracing::info;

use coffee_grinder::{
    config, db,
    services::{
        inventory::CoffeeItemInput,
        orders::{CartLineRequest, PlaceOrderRequest},
        AppServices,
    },
};

const TYPES: [&str; 4] = ["عربيكا", "روبوستا", "Espresso Blend", "تركي"];

// (name, type index, quantity text, price per kg, description)
const ITEMS: [(&str, usize, &str, &str, Option<&str>); 8] = [
    ("برازيلي سانتوس", 0, "25", "320", Some("تحميص متوسط")),
    ("كولومبي سوبريمو", 0, "18.500", "380", None),
    ("يمني مطري", 0, "4.250", "950", Some("محصول محدود")),
    ("Vietnam Robusta", 1, "40", "210", None),
    ("Uganda Robusta", 1, "7.50", "230", Some("Low stock demo item")),
    ("Crema Blend", 2, "30", "290", Some("Espresso house blend")),
    ("تركي بالهيل", 3, "22", "340", Some("مع الهيل")),
    ("تركي سادة", 3, "15", "300", None),
];

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = config::load_config().context("loading configuration")?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    info!("=== Coffee Grinder Seed Data ===");

    let pool = db::establish_connection_from_app_config(&cfg)
        .await
        .context("connecting to the database")?;
    db::run_migrations(&pool).await?;

    let services = AppServices::new(Arc::new(pool), &cfg);

    info!("Creating coffee types...");
    let mut type_ids = Vec::with_capacity(TYPES.len());
    for name in TYPES {
        let created = services.coffee_types.create_type(name).await?;
        type_ids.push(created.id);
    }
    info!("  Created {} coffee types", type_ids.len());

    info!("Creating coffee items...");
    let mut coffee_ids = Vec::with_capacity(ITEMS.len());
    for (name, type_index, quantity, price, description) in ITEMS {
        let item = services
            .inventory
            .create_item(CoffeeItemInput {
                name: name.to_string(),
                type_id: type_ids.get(type_index).copied(),
                description: description.map(str::to_string),
                quantity: quantity.to_string(),
                price_per_kg: price.to_string(),
            })
            .await?;
        coffee_ids.push(item.id);
    }
    info!("  Created {} coffee items", coffee_ids.len());

    info!("Placing sample orders...");
    let first = services
        .orders
        .place_order(PlaceOrderRequest {
            customer_name: "أحمد علي".to_string(),
            phone_number: Some("01012345678".to_string()),
            notes: None,
            amount_paid: "1000".to_string(),
            items: vec![
                CartLineRequest {
                    coffee_id: coffee_ids[0],
                    quantity: dec!(1.5),
                },
                CartLineRequest {
                    coffee_id: coffee_ids[6],
                    quantity: dec!(0.25),
                },
            ],
        })
        .await?;
    info!(
        "  Order {} total {} {}",
        first.order_id(),
        first.total(),
        cfg.currency_label
    );

    let second = services
        .orders
        .place_order(PlaceOrderRequest {
            customer_name: "Sara Hassan".to_string(),
            phone_number: None,
            notes: Some("طحن ناعم".to_string()),
            amount_paid: "500".to_string(),
            items: vec![CartLineRequest {
                coffee_id: coffee_ids[5],
                quantity: dec!(1),
            }],
        })
        .await?;
    info!(
        "  Order {} total {} {}",
        second.order_id(),
        second.total(),
        cfg.currency_label
    );

    info!("=== Seed complete ===");
    Ok(())
}
