//! Entity module - Contains all SeaORM entity definitions for the database.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod customer;
pub mod partner;
pub mod sales_record;

// Re-export specific types to avoid conflicts
pub use customer::{Column as CustomerColumn, Entity as Customer, Model as CustomerModel};
pub use partner::{Column as PartnerColumn, Entity as Partner, Model as PartnerModel};
pub use sales_record::{
    Column as SalesRecordColumn, Entity as SalesRecord, Model as SalesRecordModel,
};
