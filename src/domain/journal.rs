//! Owned trade collection with add/update/delete.
//!
//! Trades are kept newest first. Statistics are recomputed in full after
//! every mutation, so readers always see a snapshot consistent with the
//! current collection.

use tracing::debug;
use uuid::Uuid;

use super::metrics::Statistics;
use super::trade::{NewTrade, Trade, TradeStatus, TradeUpdate};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Journal {
    trades: Vec<Trade>,
    stats: Statistics,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing collection, re-deriving status and P&L of each trade.
    pub fn from_trades(mut trades: Vec<Trade>) -> Self {
        for trade in &mut trades {
            trade.refresh_derived();
        }
        let stats = Statistics::compute(&trades);
        Journal { trades, stats }
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Trade> {
        self.trades.iter().find(|t| t.id == id)
    }

    pub fn with_status(&self, status: TradeStatus) -> impl Iterator<Item = &Trade> {
        self.trades.iter().filter(move |t| t.status() == status)
    }

    /// The `n` most recently added trades.
    pub fn recent(&self, n: usize) -> &[Trade] {
        &self.trades[..n.min(self.trades.len())]
    }

    pub fn add(&mut self, input: NewTrade) -> &Trade {
        let trade = Trade::new(Uuid::new_v4().to_string(), input);
        debug!(id = %trade.id, symbol = %trade.symbol, status = %trade.status(), "trade added");
        self.trades.insert(0, trade);
        self.recompute();
        &self.trades[0]
    }

    /// Merge `update` into the trade with `id`. Returns `None` and leaves the
    /// journal untouched when no such trade exists.
    pub fn update(&mut self, id: &str, update: TradeUpdate) -> Option<&Trade> {
        let Some(index) = self.trades.iter().position(|t| t.id == id) else {
            debug!(id, "update skipped, trade not found");
            return None;
        };
        self.trades[index].apply(update);
        debug!(id, pnl = self.trades[index].pnl(), "trade updated");
        self.recompute();
        Some(&self.trades[index])
    }

    pub fn delete(&mut self, id: &str) -> Option<Trade> {
        let Some(index) = self.trades.iter().position(|t| t.id == id) else {
            debug!(id, "delete skipped, trade not found");
            return None;
        };
        let removed = self.trades.remove(index);
        debug!(id, "trade deleted");
        self.recompute();
        Some(removed)
    }

    fn recompute(&mut self) {
        self.stats = Statistics::compute(&self.trades);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trade::Direction;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    fn btc(direction: Direction, exit_price: Option<f64>) -> NewTrade {
        NewTrade {
            symbol: "BTCUSD".into(),
            direction,
            entry_price: 100.0,
            exit_price,
            quantity: 2.0,
            date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            fees: 5.0,
            notes: None,
            setup: None,
        }
    }

    #[test]
    fn add_assigns_unique_ids_and_prepends() {
        let mut journal = Journal::new();
        let first = journal.add(btc(Direction::Long, Some(110.0))).id.clone();
        let second = journal.add(btc(Direction::Short, None)).id.clone();

        assert_ne!(first, second);
        assert_eq!(journal.trades()[0].id, second);
        assert_eq!(journal.trades()[1].id, first);
    }

    #[test]
    fn add_updates_stats() {
        let mut journal = Journal::new();
        journal.add(btc(Direction::Long, Some(110.0)));
        assert_eq!(journal.stats().total_trades, 1);
        assert_relative_eq!(journal.stats().net_pnl, 15.0);

        journal.add(btc(Direction::Long, None));
        assert_eq!(journal.stats().total_trades, 1);
    }

    #[test]
    fn update_closes_open_trade_in_place() {
        let mut journal = Journal::new();
        let id = journal.add(btc(Direction::Short, None)).id.clone();
        journal.add(btc(Direction::Long, Some(110.0)));

        let updated = journal
            .update(
                &id,
                TradeUpdate {
                    exit_price: Some(Some(110.0)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.status(), TradeStatus::Closed);
        assert_relative_eq!(updated.pnl(), -25.0);
        assert_eq!(journal.trades()[1].id, id);
        assert_relative_eq!(journal.stats().net_pnl, -10.0);
    }

    #[test]
    fn update_unknown_id_is_noop() {
        let mut journal = Journal::new();
        journal.add(btc(Direction::Long, Some(110.0)));
        let before = journal.clone();

        let result = journal.update(
            "missing",
            TradeUpdate {
                fees: Some(0.0),
                ..Default::default()
            },
        );
        assert!(result.is_none());
        assert_eq!(journal, before);
    }

    #[test]
    fn update_twice_is_idempotent() {
        let mut journal = Journal::new();
        let id = journal.add(btc(Direction::Long, None)).id.clone();
        let update = TradeUpdate {
            exit_price: Some(Some(120.0)),
            notes: Some(Some("scaled out".into())),
            ..Default::default()
        };

        journal.update(&id, update.clone());
        let once = journal.clone();
        journal.update(&id, update);
        assert_eq!(journal, once);
    }

    #[test]
    fn delete_removes_and_recomputes() {
        let mut journal = Journal::new();
        let id = journal.add(btc(Direction::Long, Some(110.0))).id.clone();
        let removed = journal.delete(&id).unwrap();
        assert_eq!(removed.id, id);
        assert!(journal.is_empty());
        assert_eq!(*journal.stats(), Statistics::default());
    }

    #[test]
    fn delete_unknown_id_is_noop() {
        let mut journal = Journal::new();
        journal.add(btc(Direction::Long, Some(110.0)));
        assert!(journal.delete("nope").is_none());
        assert_eq!(journal.len(), 1);
    }

    #[test]
    fn recent_is_bounded() {
        let mut journal = Journal::new();
        journal.add(btc(Direction::Long, None));
        journal.add(btc(Direction::Long, None));
        assert_eq!(journal.recent(5).len(), 2);
        assert_eq!(journal.recent(1).len(), 1);
    }

    #[test]
    fn with_status_filters() {
        let mut journal = Journal::new();
        journal.add(btc(Direction::Long, None));
        journal.add(btc(Direction::Long, Some(101.0)));
        assert_eq!(journal.with_status(TradeStatus::Open).count(), 1);
        assert_eq!(journal.with_status(TradeStatus::Closed).count(), 1);
    }
}
