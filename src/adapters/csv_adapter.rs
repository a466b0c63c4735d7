//! CSV export and import of trades.
//!
//! Exported files carry every stored field. Import reads rows by header name
//! into [`TradeForm`]s, so an exported file can be imported again (ids,
//! status and pnl columns are ignored and re-derived).

use serde::Serialize;
use std::fs::File;
use std::path::PathBuf;

use crate::domain::error::JournalError;
use crate::domain::trade::Trade;
use crate::domain::validation::TradeForm;

#[derive(Debug, Serialize)]
struct TradeRow<'a> {
    id: &'a str,
    date: String,
    symbol: &'a str,
    direction: String,
    entry_price: f64,
    exit_price: Option<f64>,
    quantity: f64,
    fees: f64,
    status: String,
    pnl: f64,
    notes: Option<&'a str>,
    setup: Option<&'a str>,
}

impl<'a> From<&'a Trade> for TradeRow<'a> {
    fn from(trade: &'a Trade) -> Self {
        TradeRow {
            id: &trade.id,
            date: trade.date.to_rfc3339(),
            symbol: &trade.symbol,
            direction: trade.direction.to_string(),
            entry_price: trade.entry_price,
            exit_price: trade.exit_price,
            quantity: trade.quantity,
            fees: trade.fees,
            status: trade.status().to_string(),
            pnl: trade.pnl(),
            notes: trade.notes.as_deref(),
            setup: trade.setup.as_deref(),
        }
    }
}

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Write `trades` in the given order. Returns the number of rows written.
    pub fn export(&self, trades: &[Trade]) -> Result<usize, JournalError> {
        let file = File::create(&self.path).map_err(|e| JournalError::Csv {
            reason: format!("failed to create {}: {}", self.path.display(), e),
        })?;
        let mut wtr = csv::Writer::from_writer(file);
        for trade in trades {
            wtr.serialize(TradeRow::from(trade))?;
        }
        wtr.flush().map_err(|e| JournalError::Csv {
            reason: format!("failed to write {}: {}", self.path.display(), e),
        })?;
        Ok(trades.len())
    }

    /// Read every row as an unvalidated form.
    pub fn read_forms(&self) -> Result<Vec<TradeForm>, JournalError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| JournalError::Csv {
                reason: format!("failed to read {}: {}", self.path.display(), e),
            })?;

        let mut forms = Vec::new();
        for (index, result) in rdr.deserialize::<TradeForm>().enumerate() {
            let form = result.map_err(|e| JournalError::Csv {
                reason: format!("row {}: {}", index + 1, e),
            })?;
            forms.push(form);
        }
        Ok(forms)
    }
}
