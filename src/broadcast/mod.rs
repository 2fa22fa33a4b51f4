//! Price broadcast module
//!
//! Pushes price updates to subscribers grouped by ticker. Publishing is
//! fire-and-forget: a group with no subscribers swallows the update.

mod hub;

pub use hub::PriceHub;

use crate::domain::PriceUpdate;
use async_trait::async_trait;

/// Subscriber group key for a ticker
pub fn group_key(ticker: &str) -> String {
    format!("Stock_{ticker}")
}

/// Trait for price broadcast implementations
#[async_trait]
pub trait PriceBroadcaster: Send + Sync {
    /// Publish an update to the ticker's subscriber group
    async fn publish(&self, ticker: &str, update: PriceUpdate) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_key_format() {
        assert_eq!(group_key("ACME"), "Stock_ACME");
    }
}
