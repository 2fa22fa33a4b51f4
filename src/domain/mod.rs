//! Core data model for the simulated exchange
//!
//! Persisted records (listings, profiles, daily bars, financial reports,
//! orders) plus the ephemeral quote snapshot and the broadcast payload.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One entry in the ticker universe (the authoritative tradable list)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyListing {
    /// Listing identifier
    pub id: Uuid,
    /// Full company name
    pub company_name: String,
    /// Ticker symbol
    pub ticker: String,
}

/// Descriptive company attributes, one per ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// Profile identifier
    pub id: Uuid,
    /// Ticker symbol
    pub ticker: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub employee_count: Option<i64>,
    pub description: Option<String>,
}

/// One daily OHLCV bar for a ticker
///
/// Append-only: unique on (ticker, date) and never updated once inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    /// Record identifier
    pub id: Uuid,
    /// Ticker symbol
    pub ticker: String,
    /// Trading day (UTC timestamp as delivered by the provider)
    pub date: DateTime<Utc>,
    pub open: Option<Decimal>,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub close: Option<Decimal>,
    pub adjusted_close: Option<Decimal>,
    pub volume: Option<i64>,
}

/// The full set of financial-statement line items, all optional
///
/// Shared between the provider payload and the persisted report; an
/// update replaces the whole set at once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialFigures {
    pub total_revenue: Option<Decimal>,
    pub cost_of_revenue: Option<Decimal>,
    pub gross_profit: Option<Decimal>,
    pub operating_expense: Option<Decimal>,
    pub operating_income: Option<Decimal>,
    pub net_non_operating_interest: Option<Decimal>,
    pub other_income_expense: Option<Decimal>,
    pub pretax_income: Option<Decimal>,
    pub tax_provision: Option<Decimal>,
    pub net_income_common: Option<Decimal>,
    pub diluted_ni_common: Option<Decimal>,
    pub basic_eps: Option<Decimal>,
    pub diluted_eps: Option<Decimal>,
    pub basic_average_shares: Option<Decimal>,
    pub diluted_average_shares: Option<Decimal>,
    pub total_operating_income_reported: Option<Decimal>,
    pub total_expenses: Option<Decimal>,
    pub net_income_continuing_discontinued: Option<Decimal>,
    pub normalized_income: Option<Decimal>,
    pub interest_income: Option<Decimal>,
    pub interest_expense: Option<Decimal>,
    pub net_interest_income: Option<Decimal>,
    pub ebit: Option<Decimal>,
    pub ebitda: Option<Decimal>,
    pub reconciled_cost_of_revenue: Option<Decimal>,
    pub reconciled_depreciation: Option<Decimal>,
    pub net_income_continuing_minority: Option<Decimal>,
    pub unusual_items_ex_goodwill: Option<Decimal>,
    pub unusual_items: Option<Decimal>,
    pub normalized_ebitda: Option<Decimal>,
    pub tax_rate_for_calcs: Option<Decimal>,
    pub tax_effect_unusual_items: Option<Decimal>,
}

impl FinancialFigures {
    /// True when any material line item (total revenue, net income to
    /// common stockholders, basic EPS) differs from `other`.
    ///
    /// Option inequality counts: one side None and the other Some is a
    /// difference.
    pub fn material_fields_differ(&self, other: &FinancialFigures) -> bool {
        self.total_revenue != other.total_revenue
            || self.net_income_common != other.net_income_common
            || self.basic_eps != other.basic_eps
    }
}

/// A financial-statement snapshot for one (ticker, report label)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialReport {
    /// Report identifier
    pub id: Uuid,
    /// Ticker symbol
    pub ticker: String,
    /// Report label (e.g. a fiscal period)
    pub label: String,
    /// Line items
    #[serde(flatten)]
    pub figures: FinancialFigures,
}

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Executed,
    Cancelled,
}

/// A client order; Pending orders represent live book pressure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Order identifier
    pub id: Uuid,
    /// Ticker symbol
    pub ticker: String,
    /// Buy or sell
    pub side: OrderSide,
    /// Quantity in units
    pub quantity: i64,
    /// Limit price
    pub price: Decimal,
    /// Lifecycle status
    pub status: OrderStatus,
    /// Submission time
    pub created_at: DateTime<Utc>,
    /// Execution time, if executed
    pub executed_at: Option<DateTime<Utc>>,
    /// Unfilled quantity, if partially executed
    pub remaining_quantity: Option<i64>,
}

/// Ephemeral per-ticker quote state, rebuilt every simulation tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    /// Ticker symbol
    pub ticker: String,
    /// Last traded / simulated price
    pub last_price: Option<Decimal>,
    /// 52-week high
    pub high_52w: Option<Decimal>,
    /// 52-week low
    pub low_52w: Option<Decimal>,
    /// Market volume
    pub volume: Option<i64>,
    /// When this snapshot was last written
    pub updated_at: DateTime<Utc>,
}

/// The unit broadcast to subscribers when a simulated price moves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdate {
    /// Ticker symbol
    pub ticker: String,
    /// New simulated price
    pub price: Decimal,
    /// When the price was computed
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn figures(
        revenue: Option<Decimal>,
        income: Option<Decimal>,
        eps: Option<Decimal>,
    ) -> FinancialFigures {
        FinancialFigures {
            total_revenue: revenue,
            net_income_common: income,
            basic_eps: eps,
            ..Default::default()
        }
    }

    #[test]
    fn test_material_fields_identical() {
        let a = figures(Some(dec!(1000)), Some(dec!(100)), Some(dec!(1.5)));
        let mut b = figures(Some(dec!(1000)), Some(dec!(100)), Some(dec!(1.5)));
        // Non-material differences do not count
        b.ebitda = Some(dec!(250));
        assert!(!a.material_fields_differ(&b));
    }

    #[test]
    fn test_material_fields_differ_on_one_field() {
        let a = figures(Some(dec!(1000)), Some(dec!(100)), Some(dec!(1.5)));
        let b = figures(Some(dec!(1000)), Some(dec!(100)), Some(dec!(1.6)));
        assert!(a.material_fields_differ(&b));
    }

    #[test]
    fn test_material_fields_none_vs_some() {
        let a = figures(Some(dec!(1000)), None, Some(dec!(1.5)));
        let b = figures(Some(dec!(1000)), Some(dec!(100)), Some(dec!(1.5)));
        assert!(a.material_fields_differ(&b));
    }

    #[test]
    fn test_report_figures_replacement() {
        let mut report = FinancialReport {
            id: Uuid::new_v4(),
            ticker: "ACME".to_string(),
            label: "FY2024".to_string(),
            figures: figures(Some(dec!(1000)), Some(dec!(100)), Some(dec!(1.5))),
        };
        let id = report.id;

        let mut incoming = figures(Some(dec!(2000)), Some(dec!(200)), Some(dec!(3.0)));
        incoming.ebitda = Some(dec!(500));
        report.figures = incoming;

        assert_eq!(report.id, id);
        assert_eq!(report.label, "FY2024");
        assert_eq!(report.figures.total_revenue, Some(dec!(2000)));
        assert_eq!(report.figures.ebitda, Some(dec!(500)));
    }
}
