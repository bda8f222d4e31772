//! Sales record entity - One shipment or sale of produce.
//!
//! A record carries every signal the settlement classifier reads (`sale_type`,
//! `partner_id`, `delivery_method`, `price`, `shipping_cost`, `is_settled`,
//! `settled_amount`) alongside the delivery details the farm keeps for courier
//! orders. Money columns hold whole currency units.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sales record database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales_records")]
pub struct Model {
    /// Unique identifier for the sale
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Farm (tenant) owning this record
    pub farm_id: i64,
    /// Channel tag: `"nonghyup"`, `"jam"`, `"etc"`, `"b2b"` or `"b2c"`
    pub sale_type: String,
    /// Number of units sold
    pub quantity: i64,
    /// Agreed sale price; `None` while the price is not yet set
    pub price: Option<i64>,
    /// Business partner for B2B sales
    pub partner_id: Option<i64>,
    /// Registered customer for B2C sales
    pub customer_id: Option<i64>,
    /// Free-text buyer name for walk-in or legacy records
    pub customer_name: Option<String>,
    /// `"courier"`, `"direct"` or `"nonghyup"`
    pub delivery_method: Option<String>,
    /// Courier charge billed to the customer
    pub shipping_cost: Option<i64>,
    /// `"prepaid"` or `"collect"`
    pub shipping_fee_type: Option<String>,
    /// Box and material cost for courier shipments
    pub packaging_cost: Option<i64>,
    /// Whether payment has been confirmed
    pub is_settled: bool,
    /// Confirmed amount recorded at settlement
    pub settled_amount: Option<i64>,
    /// When payment was confirmed
    pub settled_at: Option<DateTimeUtc>,
    /// `"card"`, `"cash"`, `"transfer"` or free text
    pub payment_method: Option<String>,
    /// Produce grade label
    pub grade: Option<String>,
    /// Crop sold (e.g. strawberry)
    pub crop_name: Option<String>,
    /// Unit the quantity is counted in (box, kg)
    pub sale_unit: Option<String>,
    /// Person receiving the shipment
    pub recipient_name: Option<String>,
    /// Recipient phone number
    pub recipient_phone: Option<String>,
    /// Shipping address
    pub address: Option<String>,
    /// Postal code of the shipping address
    pub postal_code: Option<String>,
    /// Apartment, floor or unit
    pub detail_address: Option<String>,
    /// Instructions for the courier
    pub delivery_note: Option<String>,
    /// Field note, also used to explain settlement differences
    pub harvest_note: Option<String>,
    /// When the sale happened
    pub recorded_at: DateTimeUtc,
}

/// Defines relationships between `SalesRecord` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// B2B sales belong to a partner
    #[sea_orm(
        belongs_to = "super::partner::Entity",
        from = "Column::PartnerId",
        to = "super::partner::Column::Id"
    )]
    Partner,
    /// B2C sales may belong to a registered customer
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
}

impl Related<super::partner::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Partner.def()
    }
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
