//! Report generation business logic.
//!
//! Aggregates classified sales into the summaries the farm reviews: the monthly
//! revenue board, unsettled deliveries grouped by partner and day, per-partner
//! settlement totals and payment-method tallies. The aggregation functions are pure
//! and work on any slice of records; [`generate_monthly_summary`] is the one loader
//! that talks to the database.

use crate::{
    core::{
        classifier::{self, SettlementStatus},
        context::FarmContext,
        directory::NameBook,
        sales,
    },
    entities::sales_record,
    errors::{Error, Result},
};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use sea_orm::DatabaseConnection;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Name shown when a record has no partner or customer to name it by.
pub const UNASSIGNED: &str = "unassigned";

/// A calendar month in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Builds a month, rejecting month numbers outside 1..=12.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|_| Self { year, month })
            .ok_or_else(|| Error::InvalidMonth {
                value: format!("{year}-{month:02}"),
            })
    }

    /// Parses `YYYY-MM`.
    pub fn parse(value: &str) -> Result<Self> {
        let invalid = || Error::InvalidMonth {
            value: value.to_string(),
        };
        let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }

    /// The month containing `at`.
    #[must_use]
    pub fn containing(at: DateTime<Utc>) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
        }
    }

    /// First instant of the month and first instant of the next one.
    #[must_use]
    pub fn bounds(self) -> (DateTime<Utc>, DateTime<Utc>) {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        (
            first_instant(self.year, self.month),
            first_instant(next_year, next_month),
        )
    }

    /// Whether `at` falls in this month.
    #[must_use]
    pub fn contains(self, at: DateTime<Utc>) -> bool {
        at.year() == self.year && at.month() == self.month
    }
}

fn first_instant(year: i32, month: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Picks the name a record is listed under: partner company, registered customer,
/// free-text buyer name, then [`UNASSIGNED`].
#[must_use]
pub fn display_name(record: &sales_record::Model, names: &NameBook) -> String {
    record
        .partner_id
        .and_then(|id| names.partners.get(&id))
        .or_else(|| record.customer_id.and_then(|id| names.customers.get(&id)))
        .cloned()
        .or_else(|| {
            record
                .customer_name
                .as_ref()
                .filter(|name| !name.trim().is_empty())
                .cloned()
        })
        .unwrap_or_else(|| UNASSIGNED.to_string())
}

/// A record together with everything a list view shows for it.
#[derive(Debug, Clone)]
pub struct SaleLine {
    /// The record itself
    pub record: sales_record::Model,
    /// Who the sale is listed under
    pub name: String,
    /// Settlement badge
    pub status: SettlementStatus,
    /// Amount as computed by [`classifier::calculate_total`]
    pub total: i64,
}

/// Classifies each record for display, keeping input order.
#[must_use]
pub fn annotate(records: &[sales_record::Model], names: &NameBook) -> Vec<SaleLine> {
    records
        .iter()
        .map(|record| SaleLine {
            name: display_name(record, names),
            status: classifier::classify_settlement(record),
            total: classifier::calculate_total(record),
            record: record.clone(),
        })
        .collect()
}

/// Revenue board for one month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlySummary {
    /// Month the revenue figures cover
    pub month: Month,
    /// All revenue recorded in the month
    pub total_revenue: i64,
    /// Revenue from B2B records
    pub b2b_revenue: i64,
    /// Revenue from every other record
    pub b2c_revenue: i64,
    /// Shipping plus packaging spent on B2C records
    pub b2c_shipping_spend: i64,
    /// Amount still owed by partners, across all months
    pub unsettled_b2b_amount: i64,
    /// Number of unsettled B2B records, across all months
    pub unsettled_b2b_count: usize,
    /// Number of settled B2B records in the month
    pub settled_b2b_count: usize,
    /// Unsettled B2B records, across all months
    pub unsettled_b2b: Vec<sales_record::Model>,
    /// Unsettled B2C records, across all months
    pub unsettled_b2c: Vec<sales_record::Model>,
}

/// Builds the revenue board.
///
/// Revenue only counts records dated inside `month`. Outstanding balances count every
/// unsettled record supplied, whatever its date, so callers pass the month's records
/// plus all unsettled ones. Records that are both B2B and B2C count as B2B.
#[must_use]
pub fn summarize_month(records: &[sales_record::Model], month: Month) -> MonthlySummary {
    let mut summary = MonthlySummary {
        month,
        total_revenue: 0,
        b2b_revenue: 0,
        b2c_revenue: 0,
        b2c_shipping_spend: 0,
        unsettled_b2b_amount: 0,
        unsettled_b2b_count: 0,
        settled_b2b_count: 0,
        unsettled_b2b: Vec::new(),
        unsettled_b2c: Vec::new(),
    };

    for record in records {
        let total = classifier::calculate_total(record);
        let b2b = classifier::is_b2b(record);
        let b2c = classifier::is_b2c(record);

        if !record.is_settled {
            if b2b {
                summary.unsettled_b2b_amount += total;
                summary.unsettled_b2b_count += 1;
                summary.unsettled_b2b.push(record.clone());
            } else if b2c {
                summary.unsettled_b2c.push(record.clone());
            }
        }

        if !month.contains(record.recorded_at) {
            continue;
        }

        summary.total_revenue += total;
        if b2b {
            summary.b2b_revenue += total;
            if record.is_settled {
                summary.settled_b2b_count += 1;
            }
        } else {
            summary.b2c_revenue += total;
            if b2c {
                summary.b2c_shipping_spend +=
                    record.shipping_cost.unwrap_or(0) + record.packaging_cost.unwrap_or(0);
            }
        }
    }

    summary
}

/// Loads the month's sales plus every unsettled sale and builds the revenue board.
///
/// # Arguments
/// * `db` - Database connection
/// * `ctx` - Farm to report on
/// * `month` - Month whose revenue is summed
///
/// # Returns
/// A [`MonthlySummary`] whose outstanding figures span every month
pub async fn generate_monthly_summary(
    db: &DatabaseConnection,
    ctx: &FarmContext,
    month: Month,
) -> Result<MonthlySummary> {
    let (from, to) = month.bounds();
    let mut records = sales::list_sales_between(db, ctx, from, to).await?;

    let mut seen: HashSet<i64> = records.iter().map(|r| r.id).collect();
    for record in sales::list_unsettled(db, ctx).await? {
        if seen.insert(record.id) {
            records.push(record);
        }
    }

    tracing::debug!(
        farm_id = ctx.farm_id(),
        %month,
        records = records.len(),
        "Building monthly summary"
    );
    Ok(summarize_month(&records, month))
}

/// Unsettled B2B records delivered to one partner on one day.
#[derive(Debug, Clone)]
pub struct DeliveryGroup {
    /// Partner, when the records name one
    pub partner_id: Option<i64>,
    /// Name the group is listed under
    pub name: String,
    /// Delivery day (UTC)
    pub day: NaiveDate,
    /// Records in the group, input order
    pub records: Vec<sales_record::Model>,
}

impl DeliveryGroup {
    /// Units delivered.
    #[must_use]
    pub fn total_quantity(&self) -> i64 {
        self.records.iter().map(|r| r.quantity).sum()
    }

    /// Sum of agreed prices.
    #[must_use]
    pub fn expected_total(&self) -> i64 {
        self.records.iter().map(|r| r.price.unwrap_or(0)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum GroupKey {
    Partner(i64, NaiveDate),
    Named(String, NaiveDate),
}

/// Groups unsettled B2B records by partner and day, in first-seen order.
///
/// Records without a partner are grouped by display name instead, so unrelated buyers
/// never end up in the same group.
#[must_use]
pub fn group_unsettled_b2b(
    records: &[sales_record::Model],
    names: &NameBook,
) -> Vec<DeliveryGroup> {
    let mut groups: Vec<DeliveryGroup> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();

    for record in records
        .iter()
        .filter(|r| !r.is_settled && classifier::is_b2b(r))
    {
        let day = record.recorded_at.date_naive();
        let name = display_name(record, names);
        let key = record.partner_id.map_or_else(
            || GroupKey::Named(name.clone(), day),
            |id| GroupKey::Partner(id, day),
        );

        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(DeliveryGroup {
                partner_id: record.partner_id,
                name,
                day,
                records: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].records.push(record.clone());
    }

    groups
}

/// Quantity, expected and settled sums.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettlementTotals {
    /// Units
    pub quantity: i64,
    /// Sum of agreed prices
    pub expected: i64,
    /// Sum of confirmed amounts
    pub settled: i64,
}

impl SettlementTotals {
    fn add(&mut self, record: &sales_record::Model) {
        self.quantity += record.quantity;
        self.expected += record.price.unwrap_or(0);
        self.settled += record.settled_amount.unwrap_or(0);
    }

    /// Confirmed minus expected; negative when partners paid less than agreed.
    #[must_use]
    pub const fn difference(&self) -> i64 {
        self.settled - self.expected
    }
}

/// Settlement rows of one partner.
#[derive(Debug, Clone)]
pub struct PartnerGroup {
    /// Company name, or [`UNASSIGNED`]
    pub partner_name: String,
    /// Records, input order
    pub rows: Vec<sales_record::Model>,
    /// Sums over `rows`
    pub totals: SettlementTotals,
}

/// Groups records by partner company name, in first-seen order.
#[must_use]
pub fn group_by_partner(records: &[sales_record::Model], names: &NameBook) -> Vec<PartnerGroup> {
    let mut groups: Vec<PartnerGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let name = partner_name(record, names);
        let slot = *index.entry(name.clone()).or_insert_with(|| {
            groups.push(PartnerGroup {
                partner_name: name,
                rows: Vec::new(),
                totals: SettlementTotals::default(),
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.rows.push(record.clone());
        group.totals.add(record);
    }

    groups
}

pub(crate) fn partner_name(record: &sales_record::Model, names: &NameBook) -> String {
    record
        .partner_id
        .and_then(|id| names.partners.get(&id))
        .cloned()
        .unwrap_or_else(|| UNASSIGNED.to_string())
}

/// Sums over every record.
#[must_use]
pub fn grand_total(records: &[sales_record::Model]) -> SettlementTotals {
    let mut totals = SettlementTotals::default();
    for record in records {
        totals.add(record);
    }
    totals
}

/// Payment method buckets used by the consumer settlement board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    /// Card payment
    Card,
    /// Cash
    Cash,
    /// Bank transfer
    Transfer,
    /// Anything else, including no method recorded
    Other,
}

impl PaymentMethod {
    /// Maps a stored tag onto a bucket.
    #[must_use]
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag.map(|t| t.trim().to_ascii_lowercase()).as_deref() {
            Some("card") => Self::Card,
            Some("cash") => Self::Cash,
            Some("transfer" | "bank_transfer") => Self::Transfer,
            _ => Self::Other,
        }
    }
}

/// Count and `price` sum of one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MethodTally {
    /// Records in the bucket
    pub count: usize,
    /// Sum of their prices
    pub total: i64,
}

/// Settled records per payment method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaymentStats {
    /// Card
    pub card: MethodTally,
    /// Cash
    pub cash: MethodTally,
    /// Bank transfer
    pub transfer: MethodTally,
    /// Everything else
    pub other: MethodTally,
}

impl PaymentStats {
    /// The tally for one bucket.
    #[must_use]
    pub const fn get(&self, method: PaymentMethod) -> MethodTally {
        match method {
            PaymentMethod::Card => self.card,
            PaymentMethod::Cash => self.cash,
            PaymentMethod::Transfer => self.transfer,
            PaymentMethod::Other => self.other,
        }
    }

    fn slot(&mut self, method: PaymentMethod) -> &mut MethodTally {
        match method {
            PaymentMethod::Card => &mut self.card,
            PaymentMethod::Cash => &mut self.cash,
            PaymentMethod::Transfer => &mut self.transfer,
            PaymentMethod::Other => &mut self.other,
        }
    }
}

/// Tallies settled records by payment method. Unsettled records are skipped.
#[must_use]
pub fn payment_method_stats(records: &[sales_record::Model]) -> PaymentStats {
    let mut stats = PaymentStats::default();
    for record in records.iter().filter(|r| r.is_settled) {
        let tally = stats.slot(PaymentMethod::from_tag(record.payment_method.as_deref()));
        tally.count += 1;
        tally.total += record.price.unwrap_or(0);
    }
    stats
}

/// Settled versus pending `price` sums.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettledPending {
    /// Settled records
    pub settled: MethodTally,
    /// Unsettled records
    pub pending: MethodTally,
}

/// Splits records into settled and pending tallies.
#[must_use]
pub fn settled_pending_totals(records: &[sales_record::Model]) -> SettledPending {
    let mut totals = SettledPending::default();
    for record in records {
        let tally = if record.is_settled {
            &mut totals.settled
        } else {
            &mut totals.pending
        };
        tally.count += 1;
        tally.total += record.price.unwrap_or(0);
    }
    totals
}

/// Which settlement state a list shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SettleFilter {
    /// Everything
    #[default]
    All,
    /// Settled only
    Settled,
    /// Unsettled only
    Pending,
}

/// Search and filter options for the consumer settlement list.
#[derive(Debug, Clone, Default)]
pub struct SaleFilter {
    /// Substring of the buyer name, recipient name or recipient phone
    pub query: Option<String>,
    /// Exact stored payment method
    pub payment_method: Option<String>,
    /// Settlement state
    pub settle: SettleFilter,
}

impl SaleFilter {
    /// Whether `record` passes every active filter.
    #[must_use]
    pub fn matches(&self, record: &sales_record::Model, names: &NameBook) -> bool {
        let query_match = self.query.as_deref().filter(|q| !q.is_empty()).is_none_or(|q| {
            let registered = record.customer_id.and_then(|id| names.customers.get(&id));
            [
                record.customer_name.as_ref(),
                registered,
                record.recipient_name.as_ref(),
                record.recipient_phone.as_ref(),
            ]
            .into_iter()
            .flatten()
            .any(|field| field.contains(q))
        });

        let method_match = self
            .payment_method
            .as_deref()
            .is_none_or(|m| record.payment_method.as_deref() == Some(m));

        let settle_match = match self.settle {
            SettleFilter::All => true,
            SettleFilter::Settled => record.is_settled,
            SettleFilter::Pending => !record.is_settled,
        };

        query_match && method_match && settle_match
    }
}

/// Keeps the records that pass `filter`, input order.
#[must_use]
pub fn filter_sales(
    records: &[sales_record::Model],
    filter: &SaleFilter,
    names: &NameBook,
) -> Vec<sales_record::Model> {
    records
        .iter()
        .filter(|r| filter.matches(r, names))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::sales::settle_sale;
    use crate::test_utils::*;

    fn names() -> NameBook {
        let mut names = NameBook::default();
        names.partners.insert(1, "Valley Co-op".to_string());
        names.partners.insert(2, "Jam Factory".to_string());
        names.customers.insert(10, "Kim".to_string());
        names
    }

    fn b2b(id: i64, partner_id: i64, price: Option<i64>, at: DateTime<Utc>) -> sales_record::Model {
        sales_record::Model {
            id,
            partner_id: Some(partner_id),
            sale_type: "b2b".to_string(),
            price,
            recorded_at: at,
            ..sale_fixture()
        }
    }

    fn courier(id: i64, price: i64, shipping: i64, at: DateTime<Utc>) -> sales_record::Model {
        sales_record::Model {
            id,
            sale_type: "b2c".to_string(),
            delivery_method: Some("courier".to_string()),
            price: Some(price),
            shipping_cost: Some(shipping),
            packaging_cost: Some(2_000),
            recorded_at: at,
            ..sale_fixture()
        }
    }

    #[test]
    fn test_month_parse() {
        let month = Month::parse("2026-03").unwrap();
        assert_eq!(month.to_string(), "2026-03");
        assert_eq!(month.bounds(), (utc(2026, 3, 1), utc(2026, 4, 1)));
        assert_eq!(Month::parse("2026-12").unwrap().bounds().1, utc(2027, 1, 1));

        assert!(matches!(Month::parse("2026-13"), Err(Error::InvalidMonth { .. })));
        assert!(matches!(Month::parse("March"), Err(Error::InvalidMonth { .. })));
        assert!(matches!(Month::parse("2026-xx"), Err(Error::InvalidMonth { .. })));
    }

    #[test]
    fn test_display_name_precedence() {
        let names = names();
        let partner = sales_record::Model {
            partner_id: Some(1),
            customer_id: Some(10),
            ..sale_fixture()
        };
        assert_eq!(display_name(&partner, &names), "Valley Co-op");

        let customer = sales_record::Model {
            customer_id: Some(10),
            customer_name: Some("walk-in".to_string()),
            ..sale_fixture()
        };
        assert_eq!(display_name(&customer, &names), "Kim");

        let walk_in = sales_record::Model {
            customer_name: Some("walk-in".to_string()),
            ..sale_fixture()
        };
        assert_eq!(display_name(&walk_in, &names), "walk-in");

        let blank = sales_record::Model {
            partner_id: Some(99),
            customer_name: Some("  ".to_string()),
            ..sale_fixture()
        };
        assert_eq!(display_name(&blank, &names), UNASSIGNED);
    }

    #[test]
    fn test_summarize_month() {
        let month = Month::parse("2026-03").unwrap();
        let settled_b2b = sales_record::Model {
            is_settled: true,
            settled_amount: Some(95_000),
            ..b2b(1, 1, Some(100_000), utc(2026, 3, 5))
        };
        let records = vec![
            settled_b2b,
            b2b(2, 2, Some(60_000), utc(2026, 3, 9)),
            // Unsettled from an earlier month still counts as owed.
            b2b(3, 1, Some(40_000), utc(2026, 1, 20)),
            courier(4, 30_000, 4_000, utc(2026, 3, 12)),
        ];

        let summary = summarize_month(&records, month);
        assert_eq!(summary.b2b_revenue, 155_000);
        assert_eq!(summary.b2c_revenue, 34_000);
        assert_eq!(summary.total_revenue, 189_000);
        assert_eq!(summary.b2c_shipping_spend, 6_000);
        assert_eq!(summary.unsettled_b2b_amount, 100_000);
        assert_eq!(summary.unsettled_b2b_count, 2);
        assert_eq!(summary.settled_b2b_count, 1);
        assert_eq!(summary.unsettled_b2c.len(), 1);
        assert_eq!(summary.unsettled_b2c[0].id, 4);
    }

    #[test]
    fn test_group_unsettled_b2b() {
        let names = names();
        let day1 = utc(2026, 3, 5);
        let day2 = utc(2026, 3, 6);
        let walk_in = sales_record::Model {
            id: 5,
            sale_type: "b2b".to_string(),
            customer_name: Some("Roadside stand".to_string()),
            price: Some(5_000),
            recorded_at: day1,
            ..sale_fixture()
        };
        let records = vec![
            b2b(1, 1, Some(100_000), day1),
            b2b(2, 1, Some(50_000), day1),
            b2b(3, 1, None, day2),
            b2b(4, 2, Some(10_000), day1),
            walk_in,
            sales_record::Model {
                is_settled: true,
                ..b2b(6, 1, Some(1), day1)
            },
            courier(7, 10_000, 4_000, day1),
        ];

        let groups = group_unsettled_b2b(&records, &names);
        assert_eq!(groups.len(), 4);

        assert_eq!(groups[0].name, "Valley Co-op");
        assert_eq!(groups[0].day, day1.date_naive());
        assert_eq!(groups[0].records.len(), 2);
        assert_eq!(groups[0].expected_total(), 150_000);
        assert_eq!(groups[0].total_quantity(), 2);

        assert_eq!(groups[1].day, day2.date_naive());
        assert_eq!(groups[2].name, "Jam Factory");
        assert_eq!(groups[3].partner_id, None);
        assert_eq!(groups[3].name, "Roadside stand");
    }

    #[test]
    fn test_group_by_partner_and_grand_total() {
        let names = names();
        let at = utc(2026, 3, 5);
        let records = vec![
            sales_record::Model {
                is_settled: true,
                settled_amount: Some(90_000),
                quantity: 10,
                ..b2b(1, 1, Some(100_000), at)
            },
            sales_record::Model {
                quantity: 4,
                ..b2b(2, 2, Some(40_000), at)
            },
            sales_record::Model {
                is_settled: true,
                settled_amount: Some(20_000),
                quantity: 2,
                ..b2b(3, 1, Some(20_000), at)
            },
        ];

        let groups = group_by_partner(&records, &names);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].partner_name, "Valley Co-op");
        assert_eq!(
            groups[0].totals,
            SettlementTotals {
                quantity: 12,
                expected: 120_000,
                settled: 110_000,
            }
        );
        assert_eq!(groups[0].totals.difference(), -10_000);
        assert_eq!(groups[1].rows.len(), 1);

        let total = grand_total(&records);
        assert_eq!(total.quantity, 16);
        assert_eq!(total.expected, 160_000);
        assert_eq!(total.settled, 110_000);
    }

    #[test]
    fn test_payment_method_stats_counts_settled_only() {
        let at = utc(2026, 3, 5);
        let settled = |id, method: Option<&str>, price| sales_record::Model {
            is_settled: true,
            payment_method: method.map(ToString::to_string),
            ..courier(id, price, 4_000, at)
        };
        let records = vec![
            settled(1, Some("card"), 10_000),
            settled(2, Some("card"), 20_000),
            settled(3, Some("cash"), 5_000),
            settled(4, Some("transfer"), 7_000),
            settled(5, Some("voucher"), 3_000),
            settled(6, None, 1_000),
            courier(7, 99_000, 4_000, at),
        ];

        let stats = payment_method_stats(&records);
        assert_eq!(stats.card, MethodTally { count: 2, total: 30_000 });
        assert_eq!(stats.cash, MethodTally { count: 1, total: 5_000 });
        assert_eq!(stats.get(PaymentMethod::Transfer).total, 7_000);
        assert_eq!(stats.other, MethodTally { count: 2, total: 4_000 });

        let split = settled_pending_totals(&records);
        assert_eq!(split.settled.count, 6);
        assert_eq!(split.pending, MethodTally { count: 1, total: 99_000 });
    }

    #[test]
    fn test_sale_filter() {
        let names = names();
        let at = utc(2026, 3, 5);
        let records = vec![
            sales_record::Model {
                customer_id: Some(10),
                recipient_phone: Some("010-1234-5678".to_string()),
                is_settled: true,
                payment_method: Some("card".to_string()),
                ..courier(1, 10_000, 4_000, at)
            },
            sales_record::Model {
                recipient_name: Some("Lee".to_string()),
                ..courier(2, 20_000, 4_000, at)
            },
        ];

        let by_name = SaleFilter {
            query: Some("Kim".to_string()),
            ..SaleFilter::default()
        };
        assert_eq!(filter_sales(&records, &by_name, &names).len(), 1);

        let by_phone = SaleFilter {
            query: Some("5678".to_string()),
            ..SaleFilter::default()
        };
        assert_eq!(filter_sales(&records, &by_phone, &names)[0].id, 1);

        let pending = SaleFilter {
            settle: SettleFilter::Pending,
            ..SaleFilter::default()
        };
        assert_eq!(filter_sales(&records, &pending, &names)[0].id, 2);

        let cash = SaleFilter {
            payment_method: Some("cash".to_string()),
            ..SaleFilter::default()
        };
        assert!(filter_sales(&records, &cash, &names).is_empty());

        assert_eq!(filter_sales(&records, &SaleFilter::default(), &names).len(), 2);
    }

    #[test]
    fn test_annotate() {
        let names = names();
        let lines = annotate(&[courier(1, 30_000, 4_000, utc(2026, 3, 5))], &names);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].total, 34_000);
        assert_eq!(lines[0].name, UNASSIGNED);
        assert!(!lines[0].status.is_completed);
    }

    #[tokio::test]
    async fn test_generate_monthly_summary_integration() -> Result<()> {
        let (db, ctx) = setup_with_farm().await?;
        let partner = create_test_partner(&db, &ctx, "Valley Co-op").await?;

        create_b2b_sale_at(&db, &ctx, partner.id, Some(80_000), utc(2026, 2, 10)).await?;
        let march = create_b2b_sale_at(&db, &ctx, partner.id, Some(50_000), utc(2026, 3, 10)).await?;
        settle_sale(&db, &ctx, march.id, Some(45_000), None).await?;
        create_courier_sale_at(&db, &ctx, 30_000, utc(2026, 3, 11)).await?;

        let summary = generate_monthly_summary(&db, &ctx, Month::parse("2026-03")?).await?;
        assert_eq!(summary.b2b_revenue, 45_000);
        assert_eq!(summary.b2c_revenue, 34_000);
        assert_eq!(summary.unsettled_b2b_amount, 80_000);
        assert_eq!(summary.unsettled_b2b_count, 1);
        assert_eq!(summary.settled_b2b_count, 1);
        assert_eq!(summary.unsettled_b2c.len(), 1);

        Ok(())
    }
}
