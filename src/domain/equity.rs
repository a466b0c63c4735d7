//! Cumulative P&L curve ordered by trade date.

use chrono::{DateTime, Utc};

use super::trade::Trade;

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: DateTime<Utc>,
    pub symbol: String,
    pub trade_pnl: f64,
    pub cumulative_pnl: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EquityCurve {
    pub points: Vec<EquityPoint>,
}

impl EquityCurve {
    /// Build the curve over every trade. Open trades contribute zero P&L.
    /// Trades sharing a date keep their collection order.
    pub fn from_trades(trades: &[Trade]) -> Self {
        let mut sorted: Vec<&Trade> = trades.iter().collect();
        sorted.sort_by_key(|t| t.date);

        let mut cumulative = 0.0_f64;
        let points = sorted
            .into_iter()
            .map(|trade| {
                cumulative += trade.pnl();
                EquityPoint {
                    date: trade.date,
                    symbol: trade.symbol.clone(),
                    trade_pnl: trade.pnl(),
                    cumulative_pnl: cumulative,
                }
            })
            .collect();

        EquityCurve { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn final_pnl(&self) -> f64 {
        self.points.last().map(|p| p.cumulative_pnl).unwrap_or(0.0)
    }

    /// Largest peak-to-trough decline of cumulative P&L, in money.
    /// The running peak starts at zero, before the first trade.
    pub fn max_drawdown(&self) -> f64 {
        let mut peak = 0.0_f64;
        let mut max_dd = 0.0_f64;
        for point in &self.points {
            if point.cumulative_pnl > peak {
                peak = point.cumulative_pnl;
            }
            let dd = peak - point.cumulative_pnl;
            if dd > max_dd {
                max_dd = dd;
            }
        }
        max_dd
    }
}
