//! Order-book pressure price model
//!
//! Pure given its inputs except for one bounded random term, which is
//! injected through `StepSource` so tests can pin it.

use crate::domain::{Order, QuoteSnapshot};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Source of the random price step
///
/// Implementations draw uniformly from [0, max_step).
pub trait StepSource: Send + Sync {
    fn next_step(&self, max_step: Decimal) -> Decimal;
}

/// Production step source backed by the thread-local RNG
///
/// Every draw is independent; no seed is persisted across ticks or
/// tickers.
pub struct ThreadRngStep;

impl StepSource for ThreadRngStep {
    fn next_step(&self, max_step: Decimal) -> Decimal {
        let unit: f64 = rand::random();
        Decimal::try_from(unit)
            .map(|u| u * max_step)
            .unwrap_or(Decimal::ZERO)
    }
}

/// Deterministic step source for tests and replays
pub struct FixedStep(pub Decimal);

impl StepSource for FixedStep {
    fn next_step(&self, _max_step: Decimal) -> Decimal {
        self.0
    }
}

/// Aggregated pending-order pressure for one ticker
#[derive(Debug, Clone, PartialEq)]
pub struct BookPressure {
    /// Volume-weighted average buy price; None when no buy orders
    pub avg_buy_price: Option<Decimal>,
    /// Volume-weighted average sell price; None when no sell orders
    pub avg_sell_price: Option<Decimal>,
    /// Mid-point of the weighted averages; diagnostic only, not part of
    /// the price formula
    pub mid_price: Option<Decimal>,
    /// Total buy quantity minus total sell quantity
    pub net_volume: i64,
    /// sign(net_volume)
    pub direction: i64,
    /// |net_volume| / max_expected_volume, capped at 1.0
    pub volume_factor: Decimal,
}

impl BookPressure {
    /// Aggregate pending buy and sell orders into book pressure
    pub fn from_orders(buys: &[Order], sells: &[Order], max_expected_volume: i64) -> Self {
        let buy_volume: i64 = buys.iter().map(|o| o.quantity).sum();
        let sell_volume: i64 = sells.iter().map(|o| o.quantity).sum();

        let avg_buy_price = weighted_average(buys, buy_volume);
        let avg_sell_price = weighted_average(sells, sell_volume);

        let mid_price = match (avg_buy_price, avg_sell_price) {
            (Some(buy), Some(sell)) => Some((buy + sell) / dec!(2)),
            _ => None,
        };

        let net_volume = buy_volume - sell_volume;
        let direction = net_volume.signum();

        let volume_factor = if max_expected_volume > 0 {
            (Decimal::from(net_volume.abs()) / Decimal::from(max_expected_volume)).min(dec!(1.0))
        } else {
            dec!(1.0)
        };

        Self {
            avg_buy_price,
            avg_sell_price,
            mid_price,
            net_volume,
            direction,
            volume_factor,
        }
    }
}

fn weighted_average(orders: &[Order], total_volume: i64) -> Option<Decimal> {
    if total_volume <= 0 {
        return None;
    }
    let total_value: Decimal = orders
        .iter()
        .map(|o| o.price * Decimal::from(o.quantity))
        .sum();
    Some(total_value / Decimal::from(total_volume))
}

/// Trait for pluggable price strategies
///
/// The scheduler only depends on this seam, so the heuristic can be
/// swapped without touching the tick loop.
pub trait PriceStrategy: Send + Sync {
    /// Next simulated price for a ticker
    ///
    /// Returns None when the snapshot has no base price or the computed
    /// price equals the base price (no update, no broadcast).
    fn next_price(
        &self,
        snapshot: &QuoteSnapshot,
        pressure: &BookPressure,
        steps: &dyn StepSource,
    ) -> Option<Decimal>;
}

/// Book-pressure random-walk strategy
///
/// new = clamp(base + direction * volume_factor * step,
///             max(0.01, (52w low ?? base) - 5),
///             (52w high ?? base) + 5)
pub struct PressureModel {
    max_step: Decimal,
}

impl PressureModel {
    /// Create a model with the given random-step upper bound
    pub fn new(max_step: Decimal) -> Self {
        Self { max_step }
    }
}

impl Default for PressureModel {
    fn default() -> Self {
        Self::new(dec!(5))
    }
}

impl PriceStrategy for PressureModel {
    fn next_price(
        &self,
        snapshot: &QuoteSnapshot,
        pressure: &BookPressure,
        steps: &dyn StepSource,
    ) -> Option<Decimal> {
        let base = snapshot.last_price?;

        let min_price = (snapshot.low_52w.unwrap_or(base) - dec!(5)).max(dec!(0.01));
        let max_price = snapshot.high_52w.unwrap_or(base) + dec!(5);

        if let Some(mid) = pressure.mid_price {
            tracing::trace!(ticker = %snapshot.ticker, %mid, "Weighted mid-price");
        }

        let step = steps.next_step(self.max_step);
        let change = Decimal::from(pressure.direction) * pressure.volume_factor * step;
        // Bounds can cross when the provider reports an inconsistent
        // 52-week range; min-then-max keeps the floor authoritative
        // instead of panicking like Ord::clamp would.
        let new_price = (base + change).min(max_price).max(min_price);

        (new_price != base).then_some(new_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderSide, OrderStatus};
    use chrono::Utc;
    use uuid::Uuid;

    fn order(side: OrderSide, quantity: i64, price: Decimal) -> Order {
        Order {
            id: Uuid::new_v4(),
            ticker: "ACME".to_string(),
            side,
            quantity,
            price,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            executed_at: None,
            remaining_quantity: None,
        }
    }

    fn snapshot(
        price: Option<Decimal>,
        low: Option<Decimal>,
        high: Option<Decimal>,
    ) -> QuoteSnapshot {
        QuoteSnapshot {
            ticker: "ACME".to_string(),
            last_price: price,
            high_52w: high,
            low_52w: low,
            volume: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_pressure_weighted_averages() {
        let buys = vec![
            order(OrderSide::Buy, 100, dec!(10)),
            order(OrderSide::Buy, 300, dec!(12)),
        ];
        let sells = vec![order(OrderSide::Sell, 50, dec!(11))];

        let pressure = BookPressure::from_orders(&buys, &sells, 10_000);

        // (100*10 + 300*12) / 400 = 11.5
        assert_eq!(pressure.avg_buy_price, Some(dec!(11.5)));
        assert_eq!(pressure.avg_sell_price, Some(dec!(11)));
        assert_eq!(pressure.mid_price, Some(dec!(11.25)));
        assert_eq!(pressure.net_volume, 350);
        assert_eq!(pressure.direction, 1);
        assert_eq!(pressure.volume_factor, dec!(0.035));
    }

    #[test]
    fn test_pressure_empty_sides() {
        let pressure = BookPressure::from_orders(&[], &[], 10_000);

        assert_eq!(pressure.avg_buy_price, None);
        assert_eq!(pressure.avg_sell_price, None);
        assert_eq!(pressure.mid_price, None);
        assert_eq!(pressure.net_volume, 0);
        assert_eq!(pressure.direction, 0);
        assert_eq!(pressure.volume_factor, dec!(0));
    }

    #[test]
    fn test_pressure_volume_factor_saturates() {
        let sells = vec![order(OrderSide::Sell, 50_000, dec!(10))];
        let pressure = BookPressure::from_orders(&[], &sells, 10_000);

        assert_eq!(pressure.direction, -1);
        assert_eq!(pressure.volume_factor, dec!(1.0));
    }

    #[test]
    fn test_scenario_acme() {
        // base 100, 52w range [90, 120] -> bounds [85, 125]
        let snapshot = snapshot(Some(dec!(100)), Some(dec!(90)), Some(dec!(120)));
        let buys = vec![order(OrderSide::Buy, 50, dec!(101))];
        let sells = vec![order(OrderSide::Sell, 10, dec!(99))];

        let pressure = BookPressure::from_orders(&buys, &sells, 10_000);
        assert_eq!(pressure.net_volume, 40);
        assert_eq!(pressure.direction, 1);
        assert_eq!(pressure.volume_factor, dec!(0.004));

        let model = PressureModel::default();
        let new_price = model.next_price(&snapshot, &pressure, &FixedStep(dec!(3.0)));

        assert_eq!(new_price, Some(dec!(100.012)));
    }

    #[test]
    fn test_no_base_price_skips_ticker() {
        let snapshot = snapshot(None, Some(dec!(90)), Some(dec!(120)));
        let pressure = BookPressure::from_orders(&[], &[], 10_000);

        let model = PressureModel::default();
        assert_eq!(model.next_price(&snapshot, &pressure, &FixedStep(dec!(3))), None);
    }

    #[test]
    fn test_zero_net_volume_is_noop() {
        let snapshot = snapshot(Some(dec!(100)), Some(dec!(90)), Some(dec!(120)));
        let buys = vec![order(OrderSide::Buy, 25, dec!(101))];
        let sells = vec![order(OrderSide::Sell, 25, dec!(99))];

        let pressure = BookPressure::from_orders(&buys, &sells, 10_000);
        assert_eq!(pressure.direction, 0);

        let model = PressureModel::default();
        assert_eq!(model.next_price(&snapshot, &pressure, &FixedStep(dec!(3))), None);
    }

    #[test]
    fn test_price_clamped_to_upper_bound() {
        // Saturated buy pressure with a huge step would overshoot the cap
        let snapshot = snapshot(Some(dec!(124.9)), Some(dec!(90)), Some(dec!(120)));
        let buys = vec![order(OrderSide::Buy, 50_000, dec!(130))];

        let pressure = BookPressure::from_orders(&buys, &[], 10_000);
        let model = PressureModel::default();
        let new_price = model.next_price(&snapshot, &pressure, &FixedStep(dec!(4.9)));

        assert_eq!(new_price, Some(dec!(125)));
    }

    #[test]
    fn test_price_clamped_to_lower_bound() {
        let snapshot = snapshot(Some(dec!(85.05)), Some(dec!(90)), Some(dec!(120)));
        let sells = vec![order(OrderSide::Sell, 50_000, dec!(80))];

        let pressure = BookPressure::from_orders(&[], &sells, 10_000);
        let model = PressureModel::default();
        let new_price = model.next_price(&snapshot, &pressure, &FixedStep(dec!(4.9)));

        assert_eq!(new_price, Some(dec!(85)));
    }

    #[test]
    fn test_min_bound_floor_near_zero() {
        // 52w low of 3 would put the naive floor below zero
        let snapshot = snapshot(Some(dec!(4)), Some(dec!(3)), Some(dec!(10)));
        let sells = vec![order(OrderSide::Sell, 50_000, dec!(2))];

        let pressure = BookPressure::from_orders(&[], &sells, 10_000);
        let model = PressureModel::default();
        let new_price = model.next_price(&snapshot, &pressure, &FixedStep(dec!(4.9)));

        assert_eq!(new_price, Some(dec!(0.01)));
    }

    #[test]
    fn test_inconsistent_52w_range_floors_price() {
        // low 100 / high 10 crosses the bounds: [95, 15]. The floor wins
        // and the computation must not panic.
        let snapshot = snapshot(Some(dec!(50)), Some(dec!(100)), Some(dec!(10)));
        let buys = vec![order(OrderSide::Buy, 50_000, dec!(55))];

        let pressure = BookPressure::from_orders(&buys, &[], 10_000);
        let model = PressureModel::default();
        let new_price = model.next_price(&snapshot, &pressure, &FixedStep(dec!(4.9)));

        assert_eq!(new_price, Some(dec!(95)));
    }

    #[test]
    fn test_missing_bounds_fall_back_to_base() {
        let snapshot = snapshot(Some(dec!(100)), None, None);
        let buys = vec![order(OrderSide::Buy, 50_000, dec!(101))];

        let pressure = BookPressure::from_orders(&buys, &[], 10_000);
        let model = PressureModel::default();
        // bounds become [95, 105]; saturated pressure with step 4.9 stays inside
        let new_price = model.next_price(&snapshot, &pressure, &FixedStep(dec!(4.9)));

        assert_eq!(new_price, Some(dec!(104.9)));
    }

    #[test]
    fn test_thread_rng_step_within_range() {
        let source = ThreadRngStep;
        for _ in 0..100 {
            let step = source.next_step(dec!(5));
            assert!(step >= dec!(0) && step < dec!(5));
        }
    }
}
