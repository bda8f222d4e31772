//! Shared test utilities for the farm ledger.
//!
//! Provides an in-memory database, a fully populated sales record for pure tests and
//! helpers that create partners and sales with sensible defaults.

use crate::{
    core::{
        context::FarmContext,
        directory,
        sales::{self, Channel, DeliveryMethod, NewSale},
    },
    entities,
    errors::Result,
};
use chrono::{DateTime, TimeZone, Utc};
use sea_orm::DatabaseConnection;

/// Farm id used by [`setup_with_farm`].
pub const TEST_FARM_ID: i64 = 1;

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Sets up a database plus the context of the test farm.
pub async fn setup_with_farm() -> Result<(DatabaseConnection, FarmContext)> {
    Ok((setup_test_db().await?, FarmContext::new(TEST_FARM_ID)))
}

/// Midnight UTC on the given day.
///
/// # Panics
/// Panics on an impossible date.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// An unsettled, unclassified sale of one unit with every optional field empty.
///
/// Override fields with struct update syntax.
#[must_use]
pub fn sale_fixture() -> entities::sales_record::Model {
    entities::sales_record::Model {
        id: 1,
        farm_id: TEST_FARM_ID,
        sale_type: "etc".to_string(),
        quantity: 1,
        price: None,
        partner_id: None,
        customer_id: None,
        customer_name: None,
        delivery_method: None,
        shipping_cost: None,
        shipping_fee_type: None,
        packaging_cost: None,
        is_settled: false,
        settled_amount: None,
        settled_at: None,
        payment_method: None,
        grade: None,
        crop_name: None,
        sale_unit: None,
        recipient_name: None,
        recipient_phone: None,
        address: None,
        postal_code: None,
        detail_address: None,
        delivery_note: None,
        harvest_note: None,
        recorded_at: utc(2026, 3, 1),
    }
}

/// Registers a partner settling per delivery.
pub async fn create_test_partner(
    db: &DatabaseConnection,
    ctx: &FarmContext,
    name: &str,
) -> Result<entities::partner::Model> {
    directory::create_partner(db, ctx, name, "per_delivery", None).await
}

/// Records a courier sale happening now with the given price and shipping cost.
pub async fn create_courier_sale(
    db: &DatabaseConnection,
    ctx: &FarmContext,
    price: i64,
    shipping_cost: i64,
) -> Result<entities::sales_record::Model> {
    let sale = NewSale {
        price: Some(price),
        shipping_cost: Some(shipping_cost),
        ..NewSale::new(courier_channel(), 1, Utc::now())
    };
    sales::create_sale(db, ctx, sale).await
}

/// Records a courier sale at `at` with 4000 shipping.
pub async fn create_courier_sale_at(
    db: &DatabaseConnection,
    ctx: &FarmContext,
    price: i64,
    at: DateTime<Utc>,
) -> Result<entities::sales_record::Model> {
    let sale = NewSale {
        price: Some(price),
        shipping_cost: Some(4_000),
        ..NewSale::new(courier_channel(), 1, at)
    };
    sales::create_sale(db, ctx, sale).await
}

/// Records a B2B delivery at `at`.
pub async fn create_b2b_sale_at(
    db: &DatabaseConnection,
    ctx: &FarmContext,
    partner_id: i64,
    price: Option<i64>,
    at: DateTime<Utc>,
) -> Result<entities::sales_record::Model> {
    let sale = NewSale {
        price,
        ..NewSale::new(Channel::B2b { partner_id }, 1, at)
    };
    sales::create_sale(db, ctx, sale).await
}

const fn courier_channel() -> Channel {
    Channel::B2c {
        customer_id: None,
        delivery_method: DeliveryMethod::Courier,
    }
}
