//! Performance statistics over closed trades.

use super::trade::Trade;
use std::collections::BTreeMap;

/// Profit factor reported when there are winning trades but no losing P&L.
pub const NO_LOSS_PROFIT_FACTOR: f64 = 999.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    pub total_trades: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub net_pnl: f64,
    pub best_trade: f64,
    pub worst_trade: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
}

impl Statistics {
    /// Recompute every figure from scratch. Open trades are ignored.
    pub fn compute(trades: &[Trade]) -> Self {
        let mut total_trades = 0usize;
        let mut trades_won = 0usize;
        let mut net_pnl = 0.0_f64;
        let mut gross_profit = 0.0_f64;
        let mut losing_sum = 0.0_f64;
        let mut best_trade = 0.0_f64;
        let mut worst_trade = 0.0_f64;

        for trade in trades.iter().filter(|t| t.is_closed()) {
            let pnl = trade.pnl();
            total_trades += 1;
            net_pnl += pnl;
            if pnl > 0.0 {
                trades_won += 1;
                gross_profit += pnl;
            } else {
                losing_sum += pnl;
            }
            if pnl > best_trade {
                best_trade = pnl;
            }
            if pnl < worst_trade {
                worst_trade = pnl;
            }
        }

        let win_rate = if total_trades > 0 {
            trades_won as f64 / total_trades as f64 * 100.0
        } else {
            0.0
        };

        let gross_loss = losing_sum.abs();
        let profit_factor = if gross_loss > 0.0 {
            gross_profit / gross_loss
        } else if gross_profit > 0.0 {
            NO_LOSS_PROFIT_FACTOR
        } else {
            0.0
        };

        Statistics {
            total_trades,
            win_rate,
            profit_factor,
            net_pnl,
            best_trade,
            worst_trade,
            gross_profit,
            gross_loss,
        }
    }

    /// Profit factor as a ratio, or `None` when there is profit but no loss
    /// to divide by.
    pub fn profit_factor_ratio(&self) -> Option<f64> {
        if self.gross_loss == 0.0 && self.gross_profit > 0.0 {
            None
        } else {
            Some(self.profit_factor)
        }
    }
}

/// Share of all logged trades (open ones included) that are winners versus
/// everything else, in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WinLossDistribution {
    pub wins_pct: f64,
    pub losses_pct: f64,
}

impl WinLossDistribution {
    pub fn compute(trades: &[Trade]) -> Self {
        if trades.is_empty() {
            return Self::default();
        }
        let total = trades.len() as f64;
        let wins = trades.iter().filter(|t| t.pnl() > 0.0).count() as f64;
        WinLossDistribution {
            wins_pct: wins / total * 100.0,
            losses_pct: (total - wins) / total * 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolResult {
    pub symbol: String,
    pub total_trades: usize,
    pub net_pnl: f64,
    pub win_rate: f64,
}

impl SymbolResult {
    /// Closed-trade breakdown per symbol, sorted by symbol.
    pub fn compute_per_symbol(trades: &[Trade]) -> Vec<SymbolResult> {
        let mut groups: BTreeMap<&str, (usize, usize, f64)> = BTreeMap::new();
        for trade in trades.iter().filter(|t| t.is_closed()) {
            let entry = groups.entry(trade.symbol.as_str()).or_insert((0, 0, 0.0));
            entry.0 += 1;
            if trade.pnl() > 0.0 {
                entry.1 += 1;
            }
            entry.2 += trade.pnl();
        }

        groups
            .into_iter()
            .map(|(symbol, (count, won, pnl))| SymbolResult {
                symbol: symbol.to_string(),
                total_trades: count,
                net_pnl: pnl,
                win_rate: won as f64 / count as f64 * 100.0,
            })
            .collect()
    }
}
