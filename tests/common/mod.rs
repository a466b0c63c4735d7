#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use std::io::Write;
use tradejournal::domain::trade::{Direction, NewTrade};
use tradejournal::domain::validation::TradeForm;

pub fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

pub fn make_input(
    symbol: &str,
    direction: Direction,
    entry_price: f64,
    exit_price: Option<f64>,
    quantity: f64,
    fees: f64,
) -> NewTrade {
    NewTrade {
        symbol: symbol.to_string(),
        direction,
        entry_price,
        exit_price,
        quantity,
        date: date(2024, 1, 1),
        fees,
        notes: None,
        setup: None,
    }
}

/// BTCUSD, entry 100, quantity 2, fees 5.
pub fn btc_input(direction: Direction, exit_price: Option<f64>) -> NewTrade {
    make_input("BTCUSD", direction, 100.0, exit_price, 2.0, 5.0)
}

pub fn dated(mut input: NewTrade, y: i32, m: u32, d: u32) -> NewTrade {
    input.date = date(y, m, d);
    input
}

pub fn sample_form() -> TradeForm {
    TradeForm {
        symbol: Some("aapl".into()),
        direction: Some("LONG".into()),
        entry_price: Some("150".into()),
        exit_price: Some("160".into()),
        quantity: Some("10".into()),
        date: Some("2024-03-15".into()),
        fees: Some("2".into()),
        notes: Some("breakout".into()),
        setup: Some("flag".into()),
    }
}

pub fn write_temp_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
