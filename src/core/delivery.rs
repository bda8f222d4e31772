//! Recent shipping addresses for repeat courier customers.

use crate::{
    core::context::FarmContext,
    entities::{SalesRecord, sales_record},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, QuerySelect, prelude::*};
use std::collections::HashSet;
use tracing::warn;

const LOOKBACK: u64 = 50;
const MAX_SETS: usize = 5;

/// Recipient and address details of one past shipment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressSet {
    /// Recipient name
    pub recipient_name: String,
    /// Recipient phone
    pub recipient_phone: String,
    /// Street address
    pub address: String,
    /// Postal code
    pub postal_code: String,
    /// Apartment or unit
    pub detail_address: String,
    /// Courier instructions
    pub delivery_note: String,
    /// When this set was last shipped to
    pub last_used: DateTime<Utc>,
}

/// Extracts distinct (recipient, address) pairs from records sorted newest first.
///
/// Records without an address are skipped and at most five sets are returned.
#[must_use]
pub fn distinct_address_sets(records: &[sales_record::Model]) -> Vec<AddressSet> {
    let mut seen = HashSet::new();

    records
        .iter()
        .filter_map(|record| {
            let address = record.address.as_deref().filter(|a| !a.is_empty())?;
            let recipient = record.recipient_name.clone().unwrap_or_default();
            if !seen.insert((recipient.clone(), address.to_string())) {
                return None;
            }

            Some(AddressSet {
                recipient_name: recipient,
                recipient_phone: record.recipient_phone.clone().unwrap_or_default(),
                address: address.to_string(),
                postal_code: record.postal_code.clone().unwrap_or_default(),
                detail_address: record.detail_address.clone().unwrap_or_default(),
                delivery_note: record.delivery_note.clone().unwrap_or_default(),
                last_used: record.recorded_at,
            })
        })
        .take(MAX_SETS)
        .collect()
}

/// The customer's most recent distinct shipping destinations, newest first.
///
/// Looks at the last fifty sales only. A storage failure is logged and yields an empty
/// list so an order form can still be filled in by hand.
pub async fn recent_address_sets(
    db: &DatabaseConnection,
    ctx: &FarmContext,
    customer_id: i64,
) -> Vec<AddressSet> {
    let records = SalesRecord::find()
        .filter(sales_record::Column::FarmId.eq(ctx.farm_id()))
        .filter(sales_record::Column::CustomerId.eq(customer_id))
        .order_by_desc(sales_record::Column::RecordedAt)
        .limit(LOOKBACK)
        .all(db)
        .await;

    match records {
        Ok(records) => distinct_address_sets(&records),
        Err(e) => {
            warn!(customer_id, "Recent addresses unavailable: {e}");
            Vec::new()
        }
    }
}
