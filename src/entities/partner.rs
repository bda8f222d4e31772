//! Partner entity - A business buyer supplied in bulk (cooperative, market, factory).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Partner database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "partners")]
pub struct Model {
    /// Unique identifier for the partner
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Farm (tenant) this partner trades with
    pub farm_id: i64,
    /// Company name shown on settlement reports
    pub company_name: String,
    /// Business registration number, digits only
    pub business_number: Option<String>,
    /// Contact number of the partner's manager
    pub manager_contact: Option<String>,
    /// How the partner settles (per delivery, monthly)
    pub settlement_type: String,
    /// Usual payment method
    pub payment_method: Option<String>,
    /// Default per-unit price offered to this partner
    pub default_unit_price: Option<i64>,
}

/// Defines relationships between Partner and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One partner has many sales
    #[sea_orm(has_many = "super::sales_record::Entity")]
    SalesRecords,
}

impl Related<super::sales_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SalesRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
