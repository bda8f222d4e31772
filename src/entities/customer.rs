//! Customer entity - An individual buyer, usually served by courier.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Customer database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    /// Unique identifier for the customer
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Farm (tenant) this customer buys from
    pub farm_id: i64,
    /// Customer name
    pub name: String,
    /// Phone number
    pub contact: Option<String>,
    /// Default shipping address
    pub address: Option<String>,
    /// Regular customers get priority handling
    pub is_vip: bool,
}

/// Defines relationships between Customer and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One customer has many sales
    #[sea_orm(has_many = "super::sales_record::Entity")]
    SalesRecords,
}

impl Related<super::sales_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SalesRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
