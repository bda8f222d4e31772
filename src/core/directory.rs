//! Partner and customer directory - the counterparties sales are recorded against.
//!
//! Reports only need names, so besides simple creation and lookup this module offers
//! id-to-name maps for the current farm.

use crate::{
    core::context::FarmContext,
    entities::{Customer, Partner, customer, partner},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use std::collections::HashMap;
use tracing::info;

/// Registers a new business partner for the farm.
pub async fn create_partner(
    db: &DatabaseConnection,
    ctx: &FarmContext,
    company_name: &str,
    settlement_type: &str,
    default_unit_price: Option<i64>,
) -> Result<partner::Model> {
    if company_name.trim().is_empty() {
        return Err(Error::Config {
            message: "Partner name cannot be empty".to_string(),
        });
    }
    if let Some(price) = default_unit_price.filter(|p| *p < 0) {
        return Err(Error::InvalidAmount { amount: price });
    }

    let model = partner::ActiveModel {
        farm_id: Set(ctx.farm_id()),
        company_name: Set(company_name.trim().to_string()),
        business_number: Set(None),
        manager_contact: Set(None),
        settlement_type: Set(settlement_type.to_string()),
        payment_method: Set(None),
        default_unit_price: Set(default_unit_price),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(farm_id = ctx.farm_id(), partner_id = model.id, "Partner registered");
    Ok(model)
}

/// Registers a new consumer for the farm.
pub async fn create_customer(
    db: &DatabaseConnection,
    ctx: &FarmContext,
    name: &str,
    contact: Option<String>,
    address: Option<String>,
) -> Result<customer::Model> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Customer name cannot be empty".to_string(),
        });
    }

    let model = customer::ActiveModel {
        farm_id: Set(ctx.farm_id()),
        name: Set(name.trim().to_string()),
        contact: Set(contact),
        address: Set(address),
        is_vip: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(farm_id = ctx.farm_id(), customer_id = model.id, "Customer registered");
    Ok(model)
}

/// Looks up a partner of the current farm.
pub async fn get_partner<C>(
    db: &C,
    ctx: &FarmContext,
    partner_id: i64,
) -> Result<Option<partner::Model>>
where
    C: ConnectionTrait,
{
    Partner::find_by_id(partner_id)
        .filter(partner::Column::FarmId.eq(ctx.farm_id()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Looks up a customer of the current farm.
pub async fn get_customer<C>(
    db: &C,
    ctx: &FarmContext,
    customer_id: i64,
) -> Result<Option<customer::Model>>
where
    C: ConnectionTrait,
{
    Customer::find_by_id(customer_id)
        .filter(customer::Column::FarmId.eq(ctx.farm_id()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// All partners of the farm, alphabetically.
pub async fn list_partners(
    db: &DatabaseConnection,
    ctx: &FarmContext,
) -> Result<Vec<partner::Model>> {
    Partner::find()
        .filter(partner::Column::FarmId.eq(ctx.farm_id()))
        .order_by_asc(partner::Column::CompanyName)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Partner and customer display names, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct NameBook {
    /// Partner id to company name
    pub partners: HashMap<i64, String>,
    /// Customer id to customer name
    pub customers: HashMap<i64, String>,
}

/// Loads the display names of every partner and customer of the farm.
pub async fn load_name_book(db: &DatabaseConnection, ctx: &FarmContext) -> Result<NameBook> {
    let partners = Partner::find()
        .filter(partner::Column::FarmId.eq(ctx.farm_id()))
        .all(db)
        .await?
        .into_iter()
        .map(|p| (p.id, p.company_name))
        .collect();

    let customers = Customer::find()
        .filter(customer::Column::FarmId.eq(ctx.farm_id()))
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    Ok(NameBook {
        partners,
        customers,
    })
}
