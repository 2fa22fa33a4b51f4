//! REST market-data provider
//!
//! Thin client over a JSON quote API. Raw payloads are deserialized into
//! wire DTOs and converted tolerantly: units that do not convert cleanly
//! are dropped rather than failing the whole response.

use super::{DailyBar, FetchedProfile, FetchedQuote, MarketDataProvider};
use crate::domain::FinancialFigures;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Configuration for the REST provider
#[derive(Debug, Clone)]
pub struct RestProviderConfig {
    /// Base URL for the quote API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl RestProviderConfig {
    /// Build from the application config section
    pub fn from_config(config: &crate::config::ProviderConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Client for the market-data REST API
pub struct RestProvider {
    config: RestProviderConfig,
    client: Client,
}

impl RestProvider {
    /// Create a new provider with the given configuration
    pub fn new(config: RestProviderConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }
}

#[async_trait]
impl MarketDataProvider for RestProvider {
    async fn get_profile(&self, ticker: &str) -> anyhow::Result<Option<FetchedProfile>> {
        let url = format!("{}/v1/profile", self.config.base_url);

        tracing::debug!(ticker, url = %url, "Fetching company profile");

        let response = self
            .client
            .get(&url)
            .query(&[("symbol", ticker)])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            anyhow::bail!("Profile request failed for {}: {}", ticker, response.status());
        }

        let dto: Option<ProfileDto> = response.json().await?;
        Ok(dto.map(convert_profile))
    }

    async fn get_daily_bars(
        &self,
        ticker: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<DailyBar>> {
        let url = format!("{}/v1/history", self.config.base_url);

        tracing::debug!(ticker, %start, %end, "Fetching daily bars");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", ticker),
                ("start", &start.to_rfc3339()),
                ("end", &end.to_rfc3339()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("History request failed for {}: {}", ticker, response.status());
        }

        let dtos: Vec<BarDto> = response.json().await?;
        Ok(dtos.into_iter().map(convert_bar).collect())
    }

    async fn get_financials(
        &self,
        ticker: &str,
    ) -> anyhow::Result<HashMap<String, FinancialFigures>> {
        let url = format!("{}/v1/financials", self.config.base_url);

        tracing::debug!(ticker, "Fetching financial statements");

        let response = self
            .client
            .get(&url)
            .query(&[("symbol", ticker)])
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Financials request failed for {}: {}",
                ticker,
                response.status()
            );
        }

        let dtos: HashMap<String, FinancialDto> = response.json().await?;
        Ok(dtos
            .into_iter()
            .map(|(label, dto)| (label, convert_financials(dto)))
            .collect())
    }

    async fn get_quotes(&self, tickers: &[String]) -> anyhow::Result<Vec<FetchedQuote>> {
        let url = format!("{}/v1/quotes", self.config.base_url);
        let symbols = tickers.join(",");

        tracing::debug!(symbol_count = tickers.len(), "Fetching batched quotes");

        let response = self
            .client
            .get(&url)
            .query(&[("symbols", symbols.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("Quotes request failed: {}", response.status());
        }

        let dtos: Vec<QuoteDto> = response.json().await?;
        Ok(dtos.into_iter().map(convert_quote).collect())
    }
}

/// Raw profile payload
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileDto {
    address: Option<String>,
    phone: Option<String>,
    website: Option<String>,
    sector: Option<String>,
    industry: Option<String>,
    cnt_employees: Option<i64>,
    description: Option<String>,
}

/// Raw daily bar payload
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BarDto {
    /// Trading day as an RFC 3339 timestamp
    date: Option<String>,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    adjusted_close: Option<f64>,
    volume: Option<i64>,
}

/// Raw financial-statement payload
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinancialDto {
    total_revenue: Option<f64>,
    cost_of_revenue: Option<f64>,
    gross_profit: Option<f64>,
    operating_expense: Option<f64>,
    operating_income: Option<f64>,
    net_non_operating_interest_income_expense: Option<f64>,
    other_income_expense: Option<f64>,
    pretax_income: Option<f64>,
    tax_provision: Option<f64>,
    net_income_common_stockholders: Option<f64>,
    #[serde(rename = "dilutedNIAvailableToComStockholders")]
    diluted_ni_available_to_com_stockholders: Option<f64>,
    #[serde(rename = "basicEPS")]
    basic_eps: Option<f64>,
    #[serde(rename = "dilutedEPS")]
    diluted_eps: Option<f64>,
    basic_average_shares: Option<f64>,
    diluted_average_shares: Option<f64>,
    total_operating_income_as_reported: Option<f64>,
    total_expenses: Option<f64>,
    net_income_from_continuing_and_discontinued_operation: Option<f64>,
    normalized_income: Option<f64>,
    interest_income: Option<f64>,
    interest_expense: Option<f64>,
    net_interest_income: Option<f64>,
    ebit: Option<f64>,
    ebitda: Option<f64>,
    reconciled_cost_of_revenue: Option<f64>,
    reconciled_depreciation: Option<f64>,
    net_income_from_continuing_operation_net_minority_interest: Option<f64>,
    total_unusual_items_excluding_goodwill: Option<f64>,
    total_unusual_items: Option<f64>,
    #[serde(rename = "normalizedEBITDA")]
    normalized_ebitda: Option<f64>,
    tax_rate_for_calcs: Option<f64>,
    tax_effect_of_unusual_items: Option<f64>,
}

/// Raw quote payload
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteDto {
    symbol: Option<String>,
    regular_market_price: Option<f64>,
    fifty_two_week_high: Option<f64>,
    fifty_two_week_low: Option<f64>,
    regular_market_volume: Option<i64>,
}

/// Convert an optional float to a decimal, dropping unrepresentable values
fn dec(value: Option<f64>) -> Option<Decimal> {
    value.and_then(|v| Decimal::try_from(v).ok())
}

/// Parse an RFC 3339 timestamp, dropping malformed values
fn parse_date(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn convert_profile(dto: ProfileDto) -> FetchedProfile {
    FetchedProfile {
        address: dto.address,
        phone: dto.phone,
        website: dto.website,
        sector: dto.sector,
        industry: dto.industry,
        employee_count: dto.cnt_employees,
        description: dto.description,
    }
}

fn convert_bar(dto: BarDto) -> DailyBar {
    DailyBar {
        date: parse_date(dto.date.as_deref()),
        open: dec(dto.open),
        high: dec(dto.high),
        low: dec(dto.low),
        close: dec(dto.close),
        adjusted_close: dec(dto.adjusted_close),
        volume: dto.volume,
    }
}

fn convert_financials(dto: FinancialDto) -> FinancialFigures {
    FinancialFigures {
        total_revenue: dec(dto.total_revenue),
        cost_of_revenue: dec(dto.cost_of_revenue),
        gross_profit: dec(dto.gross_profit),
        operating_expense: dec(dto.operating_expense),
        operating_income: dec(dto.operating_income),
        net_non_operating_interest: dec(dto.net_non_operating_interest_income_expense),
        other_income_expense: dec(dto.other_income_expense),
        pretax_income: dec(dto.pretax_income),
        tax_provision: dec(dto.tax_provision),
        net_income_common: dec(dto.net_income_common_stockholders),
        diluted_ni_common: dec(dto.diluted_ni_available_to_com_stockholders),
        basic_eps: dec(dto.basic_eps),
        diluted_eps: dec(dto.diluted_eps),
        basic_average_shares: dec(dto.basic_average_shares),
        diluted_average_shares: dec(dto.diluted_average_shares),
        total_operating_income_reported: dec(dto.total_operating_income_as_reported),
        total_expenses: dec(dto.total_expenses),
        net_income_continuing_discontinued: dec(
            dto.net_income_from_continuing_and_discontinued_operation,
        ),
        normalized_income: dec(dto.normalized_income),
        interest_income: dec(dto.interest_income),
        interest_expense: dec(dto.interest_expense),
        net_interest_income: dec(dto.net_interest_income),
        ebit: dec(dto.ebit),
        ebitda: dec(dto.ebitda),
        reconciled_cost_of_revenue: dec(dto.reconciled_cost_of_revenue),
        reconciled_depreciation: dec(dto.reconciled_depreciation),
        net_income_continuing_minority: dec(
            dto.net_income_from_continuing_operation_net_minority_interest,
        ),
        unusual_items_ex_goodwill: dec(dto.total_unusual_items_excluding_goodwill),
        unusual_items: dec(dto.total_unusual_items),
        normalized_ebitda: dec(dto.normalized_ebitda),
        tax_rate_for_calcs: dec(dto.tax_rate_for_calcs),
        tax_effect_unusual_items: dec(dto.tax_effect_of_unusual_items),
    }
}

fn convert_quote(dto: QuoteDto) -> FetchedQuote {
    FetchedQuote {
        symbol: dto.symbol,
        last_price: dec(dto.regular_market_price),
        high_52w: dec(dto.fifty_two_week_high),
        low_52w: dec(dto.fifty_two_week_low),
        volume: dto.regular_market_volume,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec as rdec;

    #[test]
    fn test_rest_provider_creation() {
        let provider = RestProvider::new(RestProviderConfig {
            base_url: "https://quotes.example.com".to_string(),
            timeout: Duration::from_secs(5),
        });
        assert_eq!(provider.config.base_url, "https://quotes.example.com");
    }

    #[test]
    fn test_parse_date() {
        let parsed = parse_date(Some("2024-03-15T00:00:00Z")).unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-03-15T00:00:00+00:00");
        assert_eq!(parse_date(Some("not a date")), None);
        assert_eq!(parse_date(None), None);
    }

    #[test]
    fn test_convert_bar() {
        let json = r#"{
            "date": "2024-03-15T00:00:00Z",
            "open": 100.5,
            "high": 103.0,
            "low": 99.25,
            "close": 102.0,
            "adjustedClose": 101.8,
            "volume": 1500000
        }"#;

        let dto: BarDto = serde_json::from_str(json).unwrap();
        let bar = convert_bar(dto);

        assert!(bar.date.is_some());
        assert_eq!(bar.close, Some(rdec!(102.0)));
        assert_eq!(bar.volume, Some(1_500_000));
    }

    #[test]
    fn test_convert_bar_malformed_date() {
        let json = r#"{"date": "15/03/2024", "close": 102.0}"#;

        let dto: BarDto = serde_json::from_str(json).unwrap();
        let bar = convert_bar(dto);

        assert_eq!(bar.date, None);
        assert_eq!(bar.close, Some(rdec!(102.0)));
    }

    #[test]
    fn test_convert_quote() {
        let json = r#"{
            "symbol": "ACME",
            "regularMarketPrice": 100.0,
            "fiftyTwoWeekHigh": 120.0,
            "fiftyTwoWeekLow": 90.0,
            "regularMarketVolume": 42000
        }"#;

        let dto: QuoteDto = serde_json::from_str(json).unwrap();
        let quote = convert_quote(dto);

        assert_eq!(quote.symbol.as_deref(), Some("ACME"));
        assert_eq!(quote.last_price, Some(rdec!(100)));
        assert_eq!(quote.high_52w, Some(rdec!(120)));
        assert_eq!(quote.low_52w, Some(rdec!(90)));
    }

    #[test]
    fn test_convert_quote_null_symbol() {
        let json = r#"{"regularMarketPrice": 55.0}"#;

        let dto: QuoteDto = serde_json::from_str(json).unwrap();
        let quote = convert_quote(dto);

        assert!(quote.symbol.is_none());
        assert_eq!(quote.last_price, Some(rdec!(55)));
    }

    #[test]
    fn test_convert_financials() {
        let json = r#"{
            "totalRevenue": 1000000.0,
            "netIncomeCommonStockholders": 150000.0,
            "basicEPS": 2.5,
            "ebitda": 300000.0
        }"#;

        let dto: FinancialDto = serde_json::from_str(json).unwrap();
        let figures = convert_financials(dto);

        assert_eq!(figures.total_revenue, Some(rdec!(1000000)));
        assert_eq!(figures.net_income_common, Some(rdec!(150000)));
        assert_eq!(figures.basic_eps, Some(rdec!(2.5)));
        assert_eq!(figures.ebitda, Some(rdec!(300000)));
        assert_eq!(figures.gross_profit, None);
    }

    #[test]
    fn test_convert_profile() {
        let json = r#"{
            "address": "1 Main St",
            "sector": "Technology",
            "industry": "Software",
            "cntEmployees": 5000
        }"#;

        let dto: ProfileDto = serde_json::from_str(json).unwrap();
        let profile = convert_profile(dto);

        assert_eq!(profile.address.as_deref(), Some("1 Main St"));
        assert_eq!(profile.sector.as_deref(), Some("Technology"));
        assert_eq!(profile.employee_count, Some(5000));
        assert!(profile.phone.is_none());
    }
}
