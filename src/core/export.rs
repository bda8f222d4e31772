//! Settlement CSV export for spreadsheet review.
//!
//! The export is the partner settlement ledger: settled B2B deliveries in a date
//! range, one row each, with the agreed and received amounts side by side.

use crate::{
    core::{classifier, context::FarmContext, directory, report, sales},
    entities::sales_record,
    errors::Result,
};
use chrono::{Duration, NaiveDate, NaiveTime};
use sea_orm::DatabaseConnection;
use std::{fs::File, io::Write, path::Path};
use tracing::info;

const HEADER: [&str; 11] = [
    "partner",
    "date",
    "grade",
    "quantity",
    "unit",
    "expected",
    "settled",
    "difference",
    "difference_note",
    "payment_method",
    "memo",
];

// Spreadsheet applications need the byte order mark to detect UTF-8.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Writes one CSV row per record, preceded by a header row.
///
/// `difference` is settled minus expected and is only filled in when both amounts are
/// recorded and non-zero.
pub fn write_settlement_csv<W: Write>(
    mut writer: W,
    records: &[sales_record::Model],
    names: &directory::NameBook,
) -> Result<()> {
    writer.write_all(UTF8_BOM)?;
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(HEADER)?;

    for record in records {
        let difference = match (record.price, record.settled_amount) {
            (Some(price), Some(settled)) if price != 0 && settled != 0 => {
                (settled - price).to_string()
            }
            _ => String::new(),
        };

        csv.write_record([
            report::partner_name(record, names),
            record.recorded_at.date_naive().to_string(),
            optional(record.grade.as_deref()),
            record.quantity.to_string(),
            optional(record.sale_unit.as_deref()),
            optional(record.price),
            optional(record.settled_amount),
            difference,
            optional(record.harvest_note.as_deref()),
            optional(record.payment_method.as_deref()),
            optional(record.delivery_note.as_deref()),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

/// Exports the farm's settled partner deliveries to `path`.
///
/// # Arguments
/// * `db` - Database connection
/// * `ctx` - Farm to export
/// * `from` - First delivery day included
/// * `to` - Last delivery day included
/// * `path` - Output file, overwritten if present
///
/// # Returns
/// The number of rows written, header excluded
pub async fn export_settled(
    db: &DatabaseConnection,
    ctx: &FarmContext,
    from: NaiveDate,
    to: NaiveDate,
    path: &Path,
) -> Result<usize> {
    let start = from.and_time(NaiveTime::MIN).and_utc();
    let end = to.and_time(NaiveTime::MIN).and_utc() + Duration::days(1);
    let records: Vec<_> = sales::list_sales_between(db, ctx, start, end)
        .await?
        .into_iter()
        .filter(|r| r.is_settled && classifier::is_b2b(r))
        .collect();
    let names = directory::load_name_book(db, ctx).await?;

    let file = File::create(path)?;
    write_settlement_csv(file, &records, &names)?;

    info!(
        farm_id = ctx.farm_id(),
        rows = records.len(),
        %from,
        %to,
        path = %path.display(),
        "Settlement export written"
    );
    Ok(records.len())
}
