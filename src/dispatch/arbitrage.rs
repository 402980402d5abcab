use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::devices::Battery;
use crate::error::{Error, Result};
use crate::sim::advisory::Advisory;

/// Side of an arbitrage transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Buy,
    Sell,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// One market transaction.
///
/// Volume follows the battery sign convention: positive when buying,
/// negative when selling. Revenue is negative when buying.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transaction {
    pub datetime: NaiveDateTime,
    #[serde(rename = "transaction_type")]
    pub kind: TransactionKind,
    pub price_eur_per_mwh: f64,
    pub volume_mwh: f64,
    pub revenue_eur: f64,
}

/// Result of an arbitrage run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArbitrageOutcome {
    /// Buy and sell rows only. Idle steps leave no row.
    pub transactions: Vec<Transaction>,
    pub advisories: Vec<Advisory>,
}

impl ArbitrageOutcome {
    /// Net revenue over all transactions in €.
    pub fn total_revenue_eur(&self) -> f64 {
        self.transactions.iter().map(|t| t.revenue_eur).sum()
    }

    /// Traded volume in MWh, counting buys and sells alike.
    pub fn traded_volume_mwh(&self) -> f64 {
        self.transactions.iter().map(|t| t.volume_mwh.abs()).sum()
    }

    pub fn count(&self, kind: TransactionKind) -> usize {
        self.transactions.iter().filter(|t| t.kind == kind).count()
    }
}

/// Charges fully whenever the price is at or below `buy_price` and discharges
/// fully whenever it is at or above `sell_price`.
///
/// One battery record is appended per price. Prices in between leave the
/// battery idle and produce no transaction.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `buy_price >= sell_price`. Nothing is
/// recorded in that case.
#[instrument(skip(battery, prices), fields(steps = prices.len()))]
pub fn arbitrage(
    battery: &mut Battery,
    prices: &[f64],
    buy_price: f64,
    sell_price: f64,
) -> Result<ArbitrageOutcome> {
    if !(buy_price < sell_price) {
        return Err(Error::invalid_argument(
            "buy_price must be lower than sell_price",
        ));
    }

    let mut transactions = Vec::new();
    for &price in prices {
        let (kind, record) = if price <= buy_price {
            (TransactionKind::Buy, battery.charge_max_possible())
        } else if price >= sell_price {
            (TransactionKind::Sell, battery.discharge_max_possible())
        } else {
            battery.do_nothing();
            continue;
        };

        transactions.push(Transaction {
            datetime: record.datetime,
            kind,
            price_eur_per_mwh: price,
            volume_mwh: record.energy_kwh / 1000.0,
            revenue_eur: -record.energy_kwh * price / 1000.0,
        });
    }

    let outcome = ArbitrageOutcome {
        transactions,
        advisories: battery.take_advisories(),
    };
    debug!(
        transactions = outcome.transactions.len(),
        revenue_eur = outcome.total_revenue_eur(),
        "arbitrage finished"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_buy_low_sell_high() {
        let mut battery = Battery::default();
        let outcome = arbitrage(&mut battery, &[10.0, 100.0, 50.0], 20.0, 80.0).unwrap();

        assert_eq!(outcome.transactions.len(), 2);
        assert_eq!(outcome.transactions[0].kind, TransactionKind::Buy);
        assert_eq!(outcome.transactions[0].price_eur_per_mwh, 10.0);
        assert_eq!(outcome.transactions[1].kind, TransactionKind::Sell);
        assert_eq!(outcome.transactions[1].price_eur_per_mwh, 100.0);

        // The idle step is still recorded.
        assert_eq!(battery.curves().len(), 3);
        assert_eq!(battery.curves().power_kw()[2], 0.0);
    }

    #[test]
    fn test_rejects_inverted_band() {
        let mut battery = Battery::default();
        let err = arbitrage(&mut battery, &[10.0, 100.0], 80.0, 20.0).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(battery.curves().is_empty());
    }

    #[test]
    fn test_rejects_equal_prices() {
        let mut battery = Battery::default();
        assert!(arbitrage(&mut battery, &[10.0], 50.0, 50.0).is_err());
    }

    #[test]
    fn test_transaction_signs() {
        let mut battery = Battery::default();
        let outcome = arbitrage(&mut battery, &[10.0, 100.0], 20.0, 80.0).unwrap();
        let buy = outcome.transactions[0];
        let sell = outcome.transactions[1];

        assert!(buy.volume_mwh > 0.0);
        assert!(buy.revenue_eur < 0.0);
        assert!(sell.volume_mwh < 0.0);
        assert!(sell.revenue_eur > 0.0);
        assert_relative_eq!(buy.revenue_eur, -buy.volume_mwh * 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_transaction_timestamps_follow_records() {
        let mut battery = Battery::default();
        let outcome = arbitrage(&mut battery, &[50.0, 10.0, 50.0, 100.0], 20.0, 80.0).unwrap();
        let datetimes = battery.curves().datetime();
        assert_eq!(outcome.transactions[0].datetime, datetimes[1]);
        assert_eq!(outcome.transactions[1].datetime, datetimes[3]);
    }

    #[test]
    fn test_totals() {
        let mut battery = Battery::default();
        let outcome = arbitrage(&mut battery, &[10.0, 100.0], 20.0, 80.0).unwrap();
        let expected: f64 = outcome.transactions.iter().map(|t| t.revenue_eur).sum();
        assert_relative_eq!(outcome.total_revenue_eur(), expected);
        assert_eq!(outcome.count(TransactionKind::Buy), 1);
        assert_eq!(outcome.count(TransactionKind::Sell), 1);
        assert!(outcome.traded_volume_mwh() > 0.0);
    }
}
