//! Trade records and realized P&L.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LONG" | "BUY" => Ok(Direction::Long),
            "SHORT" | "SELL" => Ok(Direction::Short),
            other => Err(format!("unknown direction '{other}' (expected LONG or SHORT)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeStatus {
    Open,
    Closed,
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeStatus::Open => write!(f, "OPEN"),
            TradeStatus::Closed => write!(f, "CLOSED"),
        }
    }
}

/// Realized profit or loss. Zero while the trade has no exit price.
pub fn compute_pnl(
    direction: Direction,
    entry_price: f64,
    exit_price: Option<f64>,
    quantity: f64,
    fees: f64,
) -> f64 {
    let Some(exit_price) = exit_price else {
        return 0.0;
    };
    let diff = match direction {
        Direction::Long => exit_price - entry_price,
        Direction::Short => entry_price - exit_price,
    };
    diff * quantity - fees
}

/// A logged position. `status` and `pnl` are derived from the other fields
/// and only change through [`Trade::refresh_derived`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: String,
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_price: Option<f64>,
    pub quantity: f64,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub fees: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup: Option<String>,
    #[serde(default = "default_status")]
    status: TradeStatus,
    #[serde(default, deserialize_with = "null_as_zero")]
    pnl: f64,
}

fn default_status() -> TradeStatus {
    TradeStatus::Open
}

// serde_json writes non-finite floats as null; pnl is re-derived on load.
fn null_as_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

impl Trade {
    pub fn new(id: String, input: NewTrade) -> Self {
        let mut trade = Trade {
            id,
            symbol: input.symbol.trim().to_uppercase(),
            direction: input.direction,
            entry_price: input.entry_price,
            exit_price: input.exit_price,
            quantity: input.quantity,
            date: input.date,
            fees: input.fees,
            notes: input.notes,
            setup: input.setup,
            status: TradeStatus::Open,
            pnl: 0.0,
        };
        trade.refresh_derived();
        trade
    }

    pub fn status(&self) -> TradeStatus {
        self.status
    }

    pub fn pnl(&self) -> f64 {
        self.pnl
    }

    pub fn is_closed(&self) -> bool {
        self.status == TradeStatus::Closed
    }

    /// Recompute `status` and `pnl` from the exit price and trade terms.
    pub fn refresh_derived(&mut self) {
        self.status = if self.exit_price.is_some() {
            TradeStatus::Closed
        } else {
            TradeStatus::Open
        };
        self.pnl = compute_pnl(
            self.direction,
            self.entry_price,
            self.exit_price,
            self.quantity,
            self.fees,
        );
    }

    /// Overlay the fields present in `update`, then re-derive.
    pub fn apply(&mut self, update: TradeUpdate) {
        if let Some(symbol) = update.symbol {
            self.symbol = symbol.trim().to_uppercase();
        }
        if let Some(direction) = update.direction {
            self.direction = direction;
        }
        if let Some(entry_price) = update.entry_price {
            self.entry_price = entry_price;
        }
        if let Some(exit_price) = update.exit_price {
            self.exit_price = exit_price;
        }
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(fees) = update.fees {
            self.fees = fees;
        }
        if let Some(notes) = update.notes {
            self.notes = notes;
        }
        if let Some(setup) = update.setup {
            self.setup = setup;
        }
        self.refresh_derived();
    }
}

/// Everything needed to log a trade; the id and derived fields are assigned
/// by the journal.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTrade {
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: f64,
    pub exit_price: Option<f64>,
    pub quantity: f64,
    pub date: DateTime<Utc>,
    pub fees: f64,
    pub notes: Option<String>,
    pub setup: Option<String>,
}

/// Partial field set for an update. The outer `Option` means "leave as is";
/// for optional fields, `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeUpdate {
    pub symbol: Option<String>,
    pub direction: Option<Direction>,
    pub entry_price: Option<f64>,
    pub exit_price: Option<Option<f64>>,
    pub quantity: Option<f64>,
    pub date: Option<DateTime<Utc>>,
    pub fees: Option<f64>,
    pub notes: Option<Option<String>>,
    pub setup: Option<Option<String>>,
}

impl TradeUpdate {
    pub fn is_empty(&self) -> bool {
        *self == TradeUpdate::default()
    }
}
