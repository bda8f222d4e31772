//! Settlement classification - derives channel, settlement status and totals.
//!
//! Every function here is pure: it reads one [`sales_record::Model`] and returns a
//! value for display or aggregation. Missing fields count as unknown: absent numbers
//! are zero and absent tags never match. Nothing in this module can fail.
//!
//! Channel signals are allowed to disagree on legacy records (a partner sale shipped by
//! courier reads as both B2B and B2C). Wherever one answer is needed, B2B wins.

use crate::entities::sales_record;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `sale_type` tag for business sales
pub const SALE_TYPE_B2B: &str = "b2b";
/// `sale_type` tag for consumer sales
pub const SALE_TYPE_B2C: &str = "b2c";
/// `delivery_method` tag for courier shipments
pub const DELIVERY_COURIER: &str = "courier";

/// Which settlement rules apply to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaleChannel {
    /// Business partner sale
    B2b,
    /// Consumer sale
    B2c,
    /// Neither signal present
    Unclassified,
}

/// Display label for a record's settlement state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettlementLabel {
    /// Settled B2B delivery
    DeliverySettled,
    /// Settled consumer payment
    PaymentConfirmed,
    /// Priced B2B delivery awaiting payment
    DeliveryUnsettled,
    /// B2B delivery without an agreed price
    PriceUndetermined,
    /// Consumer order awaiting payment
    PaymentPendingCourier,
}

impl SettlementLabel {
    /// Stable string form used by views and exports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DeliverySettled => "delivery-settled",
            Self::PaymentConfirmed => "payment-confirmed",
            Self::DeliveryUnsettled => "delivery-unsettled",
            Self::PriceUndetermined => "price-undetermined",
            Self::PaymentPendingCourier => "payment-pending-courier",
        }
    }
}

impl fmt::Display for SettlementLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Badge colour paired with a [`SettlementLabel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorTag {
    /// Settled B2B
    Green,
    /// Settled B2C
    Blue,
    /// Unsettled, priced B2B
    Amber,
    /// Unpriced B2B
    Red,
    /// Unsettled B2C
    Pink,
}

impl ColorTag {
    /// Stable string form used by views.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Amber => "amber",
            Self::Red => "red",
            Self::Pink => "pink",
        }
    }
}

impl fmt::Display for ColorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`classify_settlement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementStatus {
    /// What to show
    pub label: SettlementLabel,
    /// How to colour it
    pub color: ColorTag,
    /// Whether payment has been confirmed
    pub is_completed: bool,
}

/// Default per-unit courier costs offered to entry forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostDefaults {
    /// Courier charge per box
    pub unit_shipping: i64,
    /// Packaging material per box
    pub unit_material: i64,
}

impl Default for CostDefaults {
    fn default() -> Self {
        Self {
            unit_shipping: 4000,
            unit_material: 2000,
        }
    }
}

/// Returns the fixed default courier costs.
#[must_use]
pub fn default_b2c_costs() -> CostDefaults {
    CostDefaults::default()
}

/// A record is B2B when it is tagged `b2b` or names a partner.
#[must_use]
pub fn is_b2b(record: &sales_record::Model) -> bool {
    record.sale_type == SALE_TYPE_B2B || record.partner_id.is_some()
}

/// A record is B2C when it is tagged `b2c` or ships by courier.
#[must_use]
pub fn is_b2c(record: &sales_record::Model) -> bool {
    record.sale_type == SALE_TYPE_B2C
        || record.delivery_method.as_deref() == Some(DELIVERY_COURIER)
}

/// Resolves a single channel, checking B2B first.
#[must_use]
pub fn channel_of(record: &sales_record::Model) -> SaleChannel {
    if is_b2b(record) {
        SaleChannel::B2b
    } else if is_b2c(record) {
        SaleChannel::B2c
    } else {
        SaleChannel::Unclassified
    }
}

/// Labels a record's settlement state.
///
/// Unsettled records that are not B2B, including unclassified ones, take the
/// courier-payment branch.
#[must_use]
pub fn classify_settlement(record: &sales_record::Model) -> SettlementStatus {
    let b2b = is_b2b(record);

    if record.is_settled {
        return if b2b {
            SettlementStatus {
                label: SettlementLabel::DeliverySettled,
                color: ColorTag::Green,
                is_completed: true,
            }
        } else {
            SettlementStatus {
                label: SettlementLabel::PaymentConfirmed,
                color: ColorTag::Blue,
                is_completed: true,
            }
        };
    }

    let (label, color) = match (b2b, record.price.unwrap_or(0) > 0) {
        (true, true) => (SettlementLabel::DeliveryUnsettled, ColorTag::Amber),
        (true, false) => (SettlementLabel::PriceUndetermined, ColorTag::Red),
        (false, _) => (SettlementLabel::PaymentPendingCourier, ColorTag::Pink),
    };

    SettlementStatus {
        label,
        color,
        is_completed: false,
    }
}

/// Monetary total of a record.
///
/// A settled record with a recorded `settled_amount` reports exactly that amount.
/// Otherwise the total is `price`, plus `shipping_cost` for B2C records since the
/// customer pays the courier charge too.
#[must_use]
pub fn calculate_total(record: &sales_record::Model) -> i64 {
    if record.is_settled {
        if let Some(settled) = record.settled_amount {
            return settled;
        }
    }

    let mut total = record.price.unwrap_or(0);
    if is_b2c(record) {
        total += record.shipping_cost.unwrap_or(0);
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sale_fixture;

    #[test]
    fn test_settled_amount_wins_over_price_and_shipping() {
        let record = sales_record::Model {
            is_settled: true,
            settled_amount: Some(48_000),
            price: Some(50_000),
            shipping_cost: Some(4_000),
            delivery_method: Some("courier".to_string()),
            ..sale_fixture()
        };

        assert_eq!(calculate_total(&record), 48_000);
    }

    #[test]
    fn test_unsettled_courier_sale_adds_shipping() {
        let record = sales_record::Model {
            price: Some(50_000),
            shipping_cost: Some(4_000),
            delivery_method: Some("courier".to_string()),
            sale_type: "etc".to_string(),
            ..sale_fixture()
        };

        assert!(is_b2c(&record));
        assert!(!is_b2b(&record));
        assert_eq!(calculate_total(&record), 54_000);

        let status = classify_settlement(&record);
        assert_eq!(status.label, SettlementLabel::PaymentPendingCourier);
        assert_eq!(status.color, ColorTag::Pink);
        assert!(!status.is_completed);
    }

    #[test]
    fn test_partner_sale_without_price_is_undetermined() {
        let record = sales_record::Model {
            price: Some(0),
            partner_id: Some(1),
            ..sale_fixture()
        };

        assert!(is_b2b(&record));
        let status = classify_settlement(&record);
        assert_eq!(status.label, SettlementLabel::PriceUndetermined);
        assert_eq!(status.color, ColorTag::Red);
        assert!(!status.is_completed);

        let unpriced = sales_record::Model {
            price: None,
            ..record
        };
        assert_eq!(
            classify_settlement(&unpriced).label,
            SettlementLabel::PriceUndetermined
        );
    }

    #[test]
    fn test_priced_partner_sale_is_unsettled_delivery() {
        let record = sales_record::Model {
            price: Some(120_000),
            partner_id: Some(1),
            ..sale_fixture()
        };

        let status = classify_settlement(&record);
        assert_eq!(status.label, SettlementLabel::DeliveryUnsettled);
        assert_eq!(status.color, ColorTag::Amber);
        assert_eq!(calculate_total(&record), 120_000);
    }

    #[test]
    fn test_settled_without_amount_falls_back_to_price() {
        let record = sales_record::Model {
            is_settled: true,
            settled_amount: None,
            price: Some(90_000),
            partner_id: Some(1),
            ..sale_fixture()
        };

        assert_eq!(calculate_total(&record), 90_000);
        let status = classify_settlement(&record);
        assert_eq!(status.label, SettlementLabel::DeliverySettled);
        assert_eq!(status.color, ColorTag::Green);
        assert!(status.is_completed);
    }

    #[test]
    fn test_settled_consumer_sale_is_payment_confirmed() {
        let record = sales_record::Model {
            is_settled: true,
            sale_type: "b2c".to_string(),
            price: Some(30_000),
            ..sale_fixture()
        };

        let status = classify_settlement(&record);
        assert_eq!(status.label, SettlementLabel::PaymentConfirmed);
        assert_eq!(status.color, ColorTag::Blue);
        assert!(status.is_completed);
    }

    #[test]
    fn test_partner_signal_alone_makes_b2b() {
        for sale_type in ["nonghyup", "jam", "etc", "b2b", "b2c"] {
            let record = sales_record::Model {
                sale_type: sale_type.to_string(),
                partner_id: Some(3),
                ..sale_fixture()
            };
            assert!(is_b2b(&record), "sale_type {sale_type}");
        }
    }

    #[test]
    fn test_courier_signal_alone_makes_b2c() {
        for sale_type in ["nonghyup", "jam", "etc", "b2b", "b2c"] {
            let record = sales_record::Model {
                sale_type: sale_type.to_string(),
                delivery_method: Some("courier".to_string()),
                ..sale_fixture()
            };
            assert!(is_b2c(&record), "sale_type {sale_type}");
        }
    }

    #[test]
    fn test_conflicting_signals_resolve_to_b2b() {
        let record = sales_record::Model {
            partner_id: Some(2),
            delivery_method: Some("courier".to_string()),
            price: Some(10_000),
            shipping_cost: Some(4_000),
            ..sale_fixture()
        };

        assert!(is_b2b(&record));
        assert!(is_b2c(&record));
        assert_eq!(channel_of(&record), SaleChannel::B2b);
        assert_eq!(
            classify_settlement(&record).label,
            SettlementLabel::DeliveryUnsettled
        );
        // Shipping is still added because the record reads as B2C too.
        assert_eq!(calculate_total(&record), 14_000);
    }

    #[test]
    fn test_unclassified_record_takes_courier_branch() {
        let record = sales_record::Model {
            sale_type: "jam".to_string(),
            price: Some(7_000),
            shipping_cost: Some(4_000),
            ..sale_fixture()
        };

        assert_eq!(channel_of(&record), SaleChannel::Unclassified);
        assert_eq!(
            classify_settlement(&record).label,
            SettlementLabel::PaymentPendingCourier
        );
        assert_eq!(calculate_total(&record), 7_000);
    }

    #[test]
    fn test_missing_numbers_count_as_zero() {
        let record = sales_record::Model {
            sale_type: "b2c".to_string(),
            ..sale_fixture()
        };
        assert_eq!(calculate_total(&record), 0);
    }

    #[test]
    fn test_classification_is_repeatable() {
        let record = sales_record::Model {
            price: Some(25_000),
            delivery_method: Some("courier".to_string()),
            shipping_cost: Some(4_000),
            ..sale_fixture()
        };

        assert_eq!(classify_settlement(&record), classify_settlement(&record));
        assert_eq!(calculate_total(&record), calculate_total(&record));
        assert_eq!(is_b2b(&record), is_b2b(&record));
        assert_eq!(is_b2c(&record), is_b2c(&record));
    }

    #[test]
    fn test_label_and_color_strings() {
        assert_eq!(SettlementLabel::DeliverySettled.to_string(), "delivery-settled");
        assert_eq!(
            SettlementLabel::PaymentPendingCourier.to_string(),
            "payment-pending-courier"
        );
        assert_eq!(ColorTag::Amber.to_string(), "amber");
    }

    #[test]
    fn test_default_b2c_costs() {
        let costs = default_b2c_costs();
        assert_eq!(costs.unit_shipping, 4000);
        assert_eq!(costs.unit_material, 2000);
    }
}
