//! Sales business logic - Records sales and moves them through settlement.
//!
//! New sales are written from a single [`Channel`] value, so a record created here
//! never carries conflicting B2B/B2C signals. Older records that do are still read
//! through the classifier. [`settle_sale`] confirms payment for one sale and
//! [`unsettle_sale`] undoes it as a manual correction. Partner deliveries are usually
//! paid per day with a single transfer; [`settle_delivery_group`] books that payment
//! against the whole day so the group adds up to what was actually received.
//!
//! Every query is scoped to the farm in the supplied [`FarmContext`]; a sale of another
//! farm behaves exactly like a missing one.

use crate::{
    core::{
        classifier::{DELIVERY_COURIER, SALE_TYPE_B2B, SALE_TYPE_B2C},
        context::FarmContext,
        directory,
    },
    entities::{SalesRecord, sales_record},
    errors::{Error, Result},
};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use std::collections::HashSet;
use tracing::{debug, info};

/// How goods reach the buyer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryMethod {
    /// Parcel courier
    Courier,
    /// Farm delivers or buyer collects
    Direct,
    /// Through the agricultural cooperative
    Nonghyup,
}

impl DeliveryMethod {
    /// Value stored in `delivery_method`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Courier => DELIVERY_COURIER,
            Self::Direct => "direct",
            Self::Nonghyup => "nonghyup",
        }
    }
}

/// Who pays the courier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShippingFeeType {
    /// Farm pays up front and bills the customer
    Prepaid,
    /// Recipient pays on delivery
    Collect,
}

impl ShippingFeeType {
    /// Value stored in `shipping_fee_type`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Prepaid => "prepaid",
            Self::Collect => "collect",
        }
    }
}

/// The sales pathway, fixed when the sale is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Delivery to a registered business partner
    B2b {
        /// Partner receiving the goods
        partner_id: i64,
    },
    /// Sale to an individual
    B2c {
        /// Registered customer, if any
        customer_id: Option<i64>,
        /// How the order is delivered
        delivery_method: DeliveryMethod,
    },
}

/// Input for [`create_sale`].
#[derive(Debug, Clone)]
pub struct NewSale {
    /// Sales pathway
    pub channel: Channel,
    /// Units sold, must be positive
    pub quantity: i64,
    /// Agreed price, `None` when not yet negotiated
    pub price: Option<i64>,
    /// Courier charge billed to the customer
    pub shipping_cost: Option<i64>,
    /// Who pays the courier
    pub shipping_fee_type: Option<ShippingFeeType>,
    /// Box and material cost
    pub packaging_cost: Option<i64>,
    /// Intended payment method
    pub payment_method: Option<String>,
    /// Produce grade
    pub grade: Option<String>,
    /// Crop sold
    pub crop_name: Option<String>,
    /// Unit of `quantity`
    pub sale_unit: Option<String>,
    /// Free-text buyer name
    pub customer_name: Option<String>,
    /// Recipient name
    pub recipient_name: Option<String>,
    /// Recipient phone
    pub recipient_phone: Option<String>,
    /// Shipping address
    pub address: Option<String>,
    /// Shipping postal code
    pub postal_code: Option<String>,
    /// Apartment or unit
    pub detail_address: Option<String>,
    /// Courier instructions
    pub delivery_note: Option<String>,
    /// Field note
    pub harvest_note: Option<String>,
    /// When the sale happened
    pub recorded_at: DateTime<Utc>,
}

impl NewSale {
    /// A sale with only the required fields set.
    #[must_use]
    pub const fn new(channel: Channel, quantity: i64, recorded_at: DateTime<Utc>) -> Self {
        Self {
            channel,
            quantity,
            price: None,
            shipping_cost: None,
            shipping_fee_type: None,
            packaging_cost: None,
            payment_method: None,
            grade: None,
            crop_name: None,
            sale_unit: None,
            customer_name: None,
            recipient_name: None,
            recipient_phone: None,
            address: None,
            postal_code: None,
            detail_address: None,
            delivery_note: None,
            harvest_note: None,
            recorded_at,
        }
    }
}

fn check_amount(amount: Option<i64>) -> Result<()> {
    match amount {
        Some(amount) if amount < 0 => Err(Error::InvalidAmount { amount }),
        _ => Ok(()),
    }
}

fn check_quantity(quantity: i64) -> Result<()> {
    if quantity <= 0 {
        return Err(Error::InvalidQuantity { quantity });
    }
    Ok(())
}

/// Recipient stored on a consumer sale when no name is known at all.
pub const UNKNOWN_RECIPIENT: &str = "unknown recipient";

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

async fn recipient_or_fallback(
    db: &DatabaseConnection,
    ctx: &FarmContext,
    sale: &NewSale,
    customer_id: Option<i64>,
) -> Result<String> {
    if let Some(name) = non_blank(sale.recipient_name.as_deref())
        .or_else(|| non_blank(sale.customer_name.as_deref()))
    {
        return Ok(name);
    }

    let registered = match customer_id {
        Some(id) => directory::get_customer(db, ctx, id).await?.map(|c| c.name),
        None => None,
    };
    Ok(registered.unwrap_or_else(|| UNKNOWN_RECIPIENT.to_string()))
}

/// Records a new, unsettled sale.
///
/// B2B sales must name a partner of the current farm and are stored as direct
/// deliveries. A collect-on-delivery courier charge is paid by the recipient straight
/// to the courier, so it is stored as zero shipping. Consumer sales without a
/// recipient name are addressed to the buyer, the registered customer or
/// [`UNKNOWN_RECIPIENT`], in that order.
///
/// # Arguments
/// * `db` - Database connection
/// * `ctx` - Farm the sale belongs to
/// * `sale` - Channel, amounts and delivery details of the sale
///
/// # Errors
/// `InvalidQuantity` for a non-positive quantity, `InvalidAmount` for a negative
/// price, shipping or packaging cost, and `PartnerNotFound` when a B2B partner is
/// not registered for the farm.
pub async fn create_sale(
    db: &DatabaseConnection,
    ctx: &FarmContext,
    sale: NewSale,
) -> Result<sales_record::Model> {
    check_quantity(sale.quantity)?;
    check_amount(sale.price)?;
    check_amount(sale.shipping_cost)?;
    check_amount(sale.packaging_cost)?;

    let shipping_cost = match sale.shipping_fee_type {
        Some(ShippingFeeType::Collect) => Some(0),
        _ => sale.shipping_cost,
    };

    let (sale_type, partner_id, customer_id, delivery_method) = match sale.channel {
        Channel::B2b { partner_id } => {
            directory::get_partner(db, ctx, partner_id)
                .await?
                .ok_or(Error::PartnerNotFound { id: partner_id })?;
            (
                SALE_TYPE_B2B,
                Some(partner_id),
                None,
                DeliveryMethod::Direct,
            )
        }
        Channel::B2c {
            customer_id,
            delivery_method,
        } => (SALE_TYPE_B2C, None, customer_id, delivery_method),
    };

    let recipient_name = match sale.channel {
        Channel::B2b { .. } => non_blank(sale.recipient_name.as_deref()),
        Channel::B2c { .. } => Some(recipient_or_fallback(db, ctx, &sale, customer_id).await?),
    };

    let model = sales_record::ActiveModel {
        farm_id: Set(ctx.farm_id()),
        sale_type: Set(sale_type.to_string()),
        quantity: Set(sale.quantity),
        price: Set(sale.price),
        partner_id: Set(partner_id),
        customer_id: Set(customer_id),
        customer_name: Set(sale.customer_name),
        delivery_method: Set(Some(delivery_method.as_str().to_string())),
        shipping_cost: Set(shipping_cost),
        shipping_fee_type: Set(sale.shipping_fee_type.map(|t| t.as_str().to_string())),
        packaging_cost: Set(sale.packaging_cost),
        is_settled: Set(false),
        settled_amount: Set(None),
        settled_at: Set(None),
        payment_method: Set(sale.payment_method),
        grade: Set(sale.grade),
        crop_name: Set(sale.crop_name),
        sale_unit: Set(sale.sale_unit),
        recipient_name: Set(recipient_name),
        recipient_phone: Set(sale.recipient_phone),
        address: Set(sale.address),
        postal_code: Set(sale.postal_code),
        detail_address: Set(sale.detail_address),
        delivery_note: Set(sale.delivery_note),
        harvest_note: Set(sale.harvest_note),
        recorded_at: Set(sale.recorded_at),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        farm_id = ctx.farm_id(),
        sale_id = model.id,
        sale_type,
        "Sale recorded"
    );
    Ok(model)
}

/// Looks up one sale of the current farm.
pub async fn get_sale(
    db: &DatabaseConnection,
    ctx: &FarmContext,
    sale_id: i64,
) -> Result<Option<sales_record::Model>> {
    SalesRecord::find_by_id(sale_id)
        .filter(sales_record::Column::FarmId.eq(ctx.farm_id()))
        .one(db)
        .await
        .map_err(Into::into)
}

async fn require_sale(
    db: &DatabaseConnection,
    ctx: &FarmContext,
    sale_id: i64,
) -> Result<sales_record::Model> {
    get_sale(db, ctx, sale_id)
        .await?
        .ok_or(Error::SaleNotFound { id: sale_id })
}

/// Sales recorded in `[from, to)`, newest first.
pub async fn list_sales_between(
    db: &DatabaseConnection,
    ctx: &FarmContext,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<sales_record::Model>> {
    SalesRecord::find()
        .filter(sales_record::Column::FarmId.eq(ctx.farm_id()))
        .filter(sales_record::Column::RecordedAt.gte(from))
        .filter(sales_record::Column::RecordedAt.lt(to))
        .order_by_desc(sales_record::Column::RecordedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Every unsettled sale of the farm regardless of date, newest first.
pub async fn list_unsettled(
    db: &DatabaseConnection,
    ctx: &FarmContext,
) -> Result<Vec<sales_record::Model>> {
    SalesRecord::find()
        .filter(sales_record::Column::FarmId.eq(ctx.farm_id()))
        .filter(sales_record::Column::IsSettled.eq(false))
        .order_by_desc(sales_record::Column::RecordedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Settled sales, newest first, capped at `limit` rows when given.
pub async fn list_settled(
    db: &DatabaseConnection,
    ctx: &FarmContext,
    limit: Option<u64>,
) -> Result<Vec<sales_record::Model>> {
    let mut query = SalesRecord::find()
        .filter(sales_record::Column::FarmId.eq(ctx.farm_id()))
        .filter(sales_record::Column::IsSettled.eq(true))
        .order_by_desc(sales_record::Column::RecordedAt);
    if let Some(limit) = limit {
        query = query.limit(limit);
    }

    query.all(db).await.map_err(Into::into)
}

/// Removes a sale.
pub async fn delete_sale(db: &DatabaseConnection, ctx: &FarmContext, sale_id: i64) -> Result<()> {
    let sale = require_sale(db, ctx, sale_id).await?;
    sale.delete(db).await?;

    info!(farm_id = ctx.farm_id(), sale_id, "Sale deleted");
    Ok(())
}

/// Confirms payment for a sale.
///
/// `settled_amount` is the amount actually received; when given it replaces the
/// computed total in every report. Settling an already settled sale overwrites the
/// recorded amount and method.
pub async fn settle_sale(
    db: &DatabaseConnection,
    ctx: &FarmContext,
    sale_id: i64,
    settled_amount: Option<i64>,
    payment_method: Option<String>,
) -> Result<sales_record::Model> {
    check_amount(settled_amount)?;
    let sale = require_sale(db, ctx, sale_id).await?;

    let mut active: sales_record::ActiveModel = sale.into();
    active.is_settled = Set(true);
    active.settled_amount = Set(settled_amount);
    active.settled_at = Set(Some(Utc::now()));
    if payment_method.is_some() {
        active.payment_method = Set(payment_method);
    }
    let updated = active.update(db).await?;

    info!(
        farm_id = ctx.farm_id(),
        sale_id,
        settled_amount = ?updated.settled_amount,
        "Sale settled"
    );
    Ok(updated)
}

/// Reopens a settled sale to correct a data-entry mistake.
///
/// The recorded `settled_amount` is kept; totals ignore it until the sale is settled
/// again. The settlement time is cleared.
pub async fn unsettle_sale(
    db: &DatabaseConnection,
    ctx: &FarmContext,
    sale_id: i64,
) -> Result<sales_record::Model> {
    let sale = require_sale(db, ctx, sale_id).await?;

    let mut active: sales_record::ActiveModel = sale.into();
    active.is_settled = Set(false);
    active.settled_at = Set(None);
    let updated = active.update(db).await?;

    info!(farm_id = ctx.farm_id(), sale_id, "Sale reopened");
    Ok(updated)
}

/// Replacement values for the fields a settlement ledger lets the farm correct.
///
/// Every field is written as given, so `None` clears it. Start from
/// [`SaleUpdate::from_record`] to change only some of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleUpdate {
    /// Agreed price
    pub price: Option<i64>,
    /// Confirmed amount
    pub settled_amount: Option<i64>,
    /// Payment method
    pub payment_method: Option<String>,
    /// Field note, explains settlement differences
    pub harvest_note: Option<String>,
    /// Memo
    pub delivery_note: Option<String>,
}

impl SaleUpdate {
    /// The record's current values.
    #[must_use]
    pub fn from_record(record: &sales_record::Model) -> Self {
        Self {
            price: record.price,
            settled_amount: record.settled_amount,
            payment_method: record.payment_method.clone(),
            harvest_note: record.harvest_note.clone(),
            delivery_note: record.delivery_note.clone(),
        }
    }
}

/// Corrects the price, confirmed amount, payment method and notes of a sale.
///
/// Setting a price on a `price-undetermined` record moves it back into the normal
/// settlement flow. The settled flag itself is left alone.
///
/// # Errors
/// `InvalidAmount` for a negative price or confirmed amount, `SaleNotFound` when the
/// sale does not belong to the farm.
pub async fn update_sale(
    db: &DatabaseConnection,
    ctx: &FarmContext,
    sale_id: i64,
    update: SaleUpdate,
) -> Result<sales_record::Model> {
    check_amount(update.price)?;
    check_amount(update.settled_amount)?;
    let sale = require_sale(db, ctx, sale_id).await?;

    let mut active: sales_record::ActiveModel = sale.into();
    active.price = Set(update.price);
    active.settled_amount = Set(update.settled_amount);
    active.payment_method = Set(update.payment_method);
    active.harvest_note = Set(update.harvest_note);
    active.delivery_note = Set(update.delivery_note);
    let updated = active.update(db).await?;

    info!(
        farm_id = ctx.farm_id(),
        sale_id,
        price = ?updated.price,
        "Sale corrected"
    );
    Ok(updated)
}

/// Quantity of one grade in a bulk delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeQuantity {
    /// Grade label, unique within a delivery
    pub grade: String,
    /// Units delivered; zero removes the grade from the day
    pub quantity: i64,
    /// Agreed price for this grade
    pub price: Option<i64>,
}

/// One partner's deliveries for one day, split by grade.
#[derive(Debug, Clone)]
pub struct BulkDelivery {
    /// Receiving partner
    pub partner_id: i64,
    /// Delivery day (UTC)
    pub day: NaiveDate,
    /// Crop delivered
    pub crop_name: Option<String>,
    /// Unit of the quantities
    pub sale_unit: Option<String>,
    /// Per-grade quantities
    pub grades: Vec<GradeQuantity>,
    /// Whether the partner already paid
    pub is_settled: bool,
    /// How the partner pays
    pub payment_method: Option<String>,
}

fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

fn new_delivery_row(
    ctx: &FarmContext,
    partner_id: i64,
    grade: &str,
    recorded_at: DateTime<Utc>,
) -> sales_record::ActiveModel {
    sales_record::ActiveModel {
        farm_id: Set(ctx.farm_id()),
        sale_type: Set(SALE_TYPE_B2B.to_string()),
        partner_id: Set(Some(partner_id)),
        customer_id: Set(None),
        customer_name: Set(None),
        delivery_method: Set(Some(DeliveryMethod::Direct.as_str().to_string())),
        shipping_cost: Set(None),
        shipping_fee_type: Set(None),
        packaging_cost: Set(None),
        settled_amount: Set(None),
        settled_at: Set(None),
        grade: Set(Some(grade.to_string())),
        recipient_name: Set(None),
        recipient_phone: Set(None),
        address: Set(None),
        postal_code: Set(None),
        detail_address: Set(None),
        delivery_note: Set(None),
        harvest_note: Set(None),
        recorded_at: Set(recorded_at),
        ..Default::default()
    }
}

fn check_grades(grades: &[GradeQuantity]) -> Result<()> {
    for entry in grades {
        if entry.quantity < 0 {
            return Err(Error::InvalidQuantity {
                quantity: entry.quantity,
            });
        }
        check_amount(entry.price)?;
    }
    Ok(())
}

/// Saves a partner's deliveries for a day as one unit.
///
/// Rows are matched on (farm, partner, day, grade); ungraded sales of the same day are
/// left alone. Matching rows are updated in place, new grades are inserted, and grades
/// absent from the batch or given a zero quantity are removed. Everything happens
/// inside one database transaction, so readers never see the day half-written.
///
/// # Arguments
/// * `db` - Database connection
/// * `ctx` - Farm the deliveries belong to
/// * `delivery` - Partner, day and per-grade quantities
///
/// # Returns
/// The day's graded rows after the save
pub async fn record_bulk_delivery(
    db: &DatabaseConnection,
    ctx: &FarmContext,
    delivery: BulkDelivery,
) -> Result<Vec<sales_record::Model>> {
    check_grades(&delivery.grades)?;

    let txn = db.begin().await?;

    directory::get_partner(&txn, ctx, delivery.partner_id)
        .await?
        .ok_or(Error::PartnerNotFound {
            id: delivery.partner_id,
        })?;

    let (start, end) = day_bounds(delivery.day);
    let existing = SalesRecord::find()
        .filter(sales_record::Column::FarmId.eq(ctx.farm_id()))
        .filter(sales_record::Column::PartnerId.eq(delivery.partner_id))
        .filter(sales_record::Column::RecordedAt.gte(start))
        .filter(sales_record::Column::RecordedAt.lt(end))
        .filter(sales_record::Column::Grade.is_not_null())
        .order_by_asc(sales_record::Column::Id)
        .all(&txn)
        .await?;

    let mut kept = HashSet::new();
    let mut saved = Vec::new();

    for entry in delivery.grades.iter().filter(|g| g.quantity > 0) {
        if !kept.insert(entry.grade.clone()) {
            debug!(grade = %entry.grade, "Duplicate grade in bulk delivery, keeping first");
            continue;
        }

        let current = existing
            .iter()
            .find(|row| row.grade.as_deref() == Some(entry.grade.as_str()));

        let mut active = match current {
            Some(row) => sales_record::ActiveModel::from(row.clone()),
            None => new_delivery_row(ctx, delivery.partner_id, &entry.grade, start),
        };

        active.quantity = Set(entry.quantity);
        active.price = Set(entry.price);
        active.is_settled = Set(delivery.is_settled);
        active.settled_at = Set(match (delivery.is_settled, current.and_then(|r| r.settled_at)) {
            (true, Some(at)) => Some(at),
            (true, None) => Some(Utc::now()),
            (false, _) => None,
        });
        active.payment_method = Set(delivery.payment_method.clone());
        active.crop_name = Set(delivery.crop_name.clone());
        active.sale_unit = Set(delivery.sale_unit.clone());

        let row = if current.is_some() {
            active.update(&txn).await?
        } else {
            active.insert(&txn).await?
        };
        saved.push(row);
    }

    // Rows not matched above: dropped grades, zero quantities and stale duplicates.
    let saved_ids: HashSet<i64> = saved.iter().map(|row| row.id).collect();
    let mut removed = 0_usize;
    for row in existing {
        if !saved_ids.contains(&row.id) {
            row.delete(&txn).await?;
            removed += 1;
        }
    }

    txn.commit().await?;

    info!(
        farm_id = ctx.farm_id(),
        partner_id = delivery.partner_id,
        day = %delivery.day,
        saved = saved.len(),
        removed,
        "Bulk delivery recorded"
    );
    Ok(saved)
}

/// A partner's payment for one day of deliveries.
#[derive(Debug, Clone)]
pub struct GroupSettlement {
    /// Paying partner
    pub partner_id: i64,
    /// Delivery day (UTC) the payment covers
    pub day: NaiveDate,
    /// Final per-grade quantities and agreed prices
    pub grades: Vec<GradeQuantity>,
    /// Amount actually received for the whole day
    pub actual_amount: i64,
    /// Day the payment arrived
    pub settled_on: NaiveDate,
    /// How the partner paid; keeps the stored method when `None`
    pub payment_method: Option<String>,
}

/// Books one payment against a partner's unsettled deliveries of a day.
///
/// The day's unsettled rows are rewritten per grade: existing rows are reused in id
/// order, extra grades are inserted and leftover rows deleted. Every row ends up
/// settled on `settled_on`. The received amount is recorded on the first row and the
/// others get zero, so the group's totals add up to exactly what was paid while each
/// row keeps its agreed price. Runs in one database transaction.
///
/// # Arguments
/// * `db` - Database connection
/// * `ctx` - Farm the deliveries belong to
/// * `settlement` - Group key, final grades and the received amount
///
/// # Returns
/// The group's rows after settlement, in grade order as given
///
/// # Errors
/// `EmptySettlement` when no grade has a positive quantity, `InvalidQuantity` or
/// `InvalidAmount` for negative inputs, `PartnerNotFound` for an unknown partner.
pub async fn settle_delivery_group(
    db: &DatabaseConnection,
    ctx: &FarmContext,
    settlement: GroupSettlement,
) -> Result<Vec<sales_record::Model>> {
    check_amount(Some(settlement.actual_amount))?;
    check_grades(&settlement.grades)?;

    let mut seen = HashSet::new();
    let entries: Vec<&GradeQuantity> = settlement
        .grades
        .iter()
        .filter(|g| g.quantity > 0 && seen.insert(g.grade.as_str()))
        .collect();
    if entries.is_empty() {
        return Err(Error::EmptySettlement {
            partner_id: settlement.partner_id,
            day: settlement.day,
        });
    }

    let txn = db.begin().await?;

    directory::get_partner(&txn, ctx, settlement.partner_id)
        .await?
        .ok_or(Error::PartnerNotFound {
            id: settlement.partner_id,
        })?;

    let (start, end) = day_bounds(settlement.day);
    let existing = SalesRecord::find()
        .filter(sales_record::Column::FarmId.eq(ctx.farm_id()))
        .filter(sales_record::Column::PartnerId.eq(settlement.partner_id))
        .filter(sales_record::Column::RecordedAt.gte(start))
        .filter(sales_record::Column::RecordedAt.lt(end))
        .filter(sales_record::Column::IsSettled.eq(false))
        .order_by_asc(sales_record::Column::Id)
        .all(&txn)
        .await?;

    let first = existing.first().cloned();
    let recorded_at = first.as_ref().map_or(start, |row| row.recorded_at);
    let settled_at = day_bounds(settlement.settled_on).0;
    let mut saved = Vec::with_capacity(entries.len());

    for (idx, entry) in entries.iter().enumerate() {
        let current = existing.get(idx);
        let mut active = match current {
            Some(row) => sales_record::ActiveModel::from(row.clone()),
            None => {
                let mut row =
                    new_delivery_row(ctx, settlement.partner_id, &entry.grade, recorded_at);
                if let Some(first) = &first {
                    row.crop_name = Set(first.crop_name.clone());
                    row.sale_unit = Set(first.sale_unit.clone());
                }
                row
            }
        };

        active.grade = Set(Some(entry.grade.clone()));
        active.quantity = Set(entry.quantity);
        active.price = Set(entry.price);
        active.is_settled = Set(true);
        active.settled_amount = Set(Some(if idx == 0 { settlement.actual_amount } else { 0 }));
        active.settled_at = Set(Some(settled_at));
        if settlement.payment_method.is_some() {
            active.payment_method = Set(settlement.payment_method.clone());
        }

        let row = if current.is_some() {
            active.update(&txn).await?
        } else {
            active.insert(&txn).await?
        };
        saved.push(row);
    }

    let mut removed = 0_usize;
    for row in existing.into_iter().skip(entries.len()) {
        row.delete(&txn).await?;
        removed += 1;
    }

    txn.commit().await?;

    info!(
        farm_id = ctx.farm_id(),
        partner_id = settlement.partner_id,
        day = %settlement.day,
        actual_amount = settlement.actual_amount,
        rows = saved.len(),
        removed,
        "Delivery group settled"
    );
    Ok(saved)
}
