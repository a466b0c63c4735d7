//! Submission checks applied before a trade reaches the journal.
//!
//! A [`TradeForm`] carries raw text exactly as typed (or as read from a CSV
//! row). Required fields must be non-blank and numeric fields must parse to
//! finite numbers; anything else is rejected with
//! [`JournalError::Validation`] and the journal is never touched.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::error::JournalError;
use super::trade::{Direction, NewTrade, TradeUpdate, compute_pnl};

/// Optional fields an update should erase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearFields {
    pub exit_price: bool,
    pub notes: bool,
    pub setup: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeForm {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub entry_price: Option<String>,
    #[serde(default)]
    pub exit_price: Option<String>,
    #[serde(default)]
    pub quantity: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub fees: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub setup: Option<String>,
}

impl TradeForm {
    /// Validate a full submission for a new trade.
    pub fn into_new_trade(self) -> Result<NewTrade, JournalError> {
        let symbol = required(self.symbol.as_deref(), "symbol")?.to_uppercase();
        let entry_price = parse_number(
            required(self.entry_price.as_deref(), "entry_price")?,
            "entry_price",
        )?;
        let quantity = parse_number(required(self.quantity.as_deref(), "quantity")?, "quantity")?;
        let date = parse_date(required(self.date.as_deref(), "date")?)?;

        let direction = match non_blank(self.direction.as_deref()) {
            Some(raw) => parse_direction(raw)?,
            None => Direction::Long,
        };
        let exit_price = non_blank(self.exit_price.as_deref())
            .map(|raw| parse_number(raw, "exit_price"))
            .transpose()?;
        let fees = non_blank(self.fees.as_deref())
            .map(|raw| parse_number(raw, "fees"))
            .transpose()?
            .unwrap_or(0.0);

        ensure_finite_pnl(compute_pnl(
            direction,
            entry_price,
            exit_price,
            quantity,
            fees,
        ))?;

        Ok(NewTrade {
            symbol,
            direction,
            entry_price,
            exit_price,
            quantity,
            date,
            fees,
            notes: non_blank(self.notes.as_deref()).map(str::to_string),
            setup: non_blank(self.setup.as_deref()).map(str::to_string),
        })
    }

    /// Validate a partial submission. Absent fields are left unchanged; a
    /// present but blank required field is an error. Blank optional fields
    /// are left unchanged too, clearing is explicit via `clear`.
    ///
    /// The merged trade's P&L is not known here; callers check it with
    /// [`ensure_finite_pnl`] after applying the update.
    pub fn into_update(self, clear: ClearFields) -> Result<TradeUpdate, JournalError> {
        let symbol = self
            .symbol
            .as_deref()
            .map(|raw| required(Some(raw), "symbol").map(str::to_uppercase))
            .transpose()?;
        let direction = self
            .direction
            .as_deref()
            .map(|raw| parse_direction(required(Some(raw), "direction")?))
            .transpose()?;
        let entry_price = self
            .entry_price
            .as_deref()
            .map(|raw| parse_number(required(Some(raw), "entry_price")?, "entry_price"))
            .transpose()?;
        let quantity = self
            .quantity
            .as_deref()
            .map(|raw| parse_number(required(Some(raw), "quantity")?, "quantity"))
            .transpose()?;
        let date = self
            .date
            .as_deref()
            .map(|raw| parse_date(required(Some(raw), "date")?))
            .transpose()?;
        let fees = non_blank(self.fees.as_deref())
            .map(|raw| parse_number(raw, "fees"))
            .transpose()?;

        let exit_price = if clear.exit_price {
            if non_blank(self.exit_price.as_deref()).is_some() {
                return Err(JournalError::validation(
                    "exit_price",
                    "cannot set and clear the exit price at once",
                ));
            }
            Some(None)
        } else {
            non_blank(self.exit_price.as_deref())
                .map(|raw| parse_number(raw, "exit_price").map(Some))
                .transpose()?
        };

        Ok(TradeUpdate {
            symbol,
            direction,
            entry_price,
            exit_price,
            quantity,
            date,
            fees,
            notes: clearable(self.notes.as_deref(), clear.notes, "notes")?,
            setup: clearable(self.setup.as_deref(), clear.setup, "setup")?,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn clearable(
    value: Option<&str>,
    clear: bool,
    field: &str,
) -> Result<Option<Option<String>>, JournalError> {
    match (non_blank(value), clear) {
        (Some(_), true) => Err(JournalError::validation(
            field,
            "cannot set and clear at once",
        )),
        (None, true) => Ok(Some(None)),
        (value, false) => Ok(value.map(|s| Some(s.to_string()))),
    }
}

/// Prices and quantities can each be finite while their product overflows;
/// such a trade could not be stored.
pub fn ensure_finite_pnl(pnl: f64) -> Result<(), JournalError> {
    if pnl.is_finite() {
        Ok(())
    } else {
        Err(JournalError::validation(
            "pnl",
            "profit or loss is too large to record",
        ))
    }
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, JournalError> {
    non_blank(value).ok_or_else(|| JournalError::validation(field, "is required"))
}

pub fn parse_number(raw: &str, field: &str) -> Result<f64, JournalError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| JournalError::validation(field, format!("'{raw}' is not a number")))?;
    if !value.is_finite() {
        return Err(JournalError::validation(
            field,
            format!("'{raw}' is not a finite number"),
        ));
    }
    Ok(value)
}

fn parse_direction(raw: &str) -> Result<Direction, JournalError> {
    raw.parse::<Direction>()
        .map_err(|reason| JournalError::validation("direction", reason))
}

/// Accepts a plain calendar date (taken as midnight UTC) or a full RFC 3339
/// date-time.
pub fn parse_date(raw: &str) -> Result<DateTime<Utc>, JournalError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            JournalError::validation(
                "date",
                format!("'{raw}' is not a date (expected YYYY-MM-DD or RFC 3339)"),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn full_form() -> TradeForm {
        TradeForm {
            symbol: Some("btcusd".into()),
            direction: Some("LONG".into()),
            entry_price: Some("100".into()),
            exit_price: Some("110".into()),
            quantity: Some("2".into()),
            date: Some("2024-01-01".into()),
            fees: Some("5".into()),
            notes: Some("  breakout ".into()),
            setup: Some("".into()),
        }
    }

    fn field_of(err: JournalError) -> String {
        match err {
            JournalError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn full_form_validates() {
        let input = full_form().into_new_trade().unwrap();
        assert_eq!(input.symbol, "BTCUSD");
        assert_eq!(input.direction, Direction::Long);
        assert_eq!(input.entry_price, 100.0);
        assert_eq!(input.exit_price, Some(110.0));
        assert_eq!(input.quantity, 2.0);
        assert_eq!(input.fees, 5.0);
        assert_eq!(input.date, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(input.notes.as_deref(), Some("breakout"));
        assert_eq!(input.setup, None);
    }

    #[test]
    fn defaults_for_optional_fields() {
        let form = TradeForm {
            direction: None,
            exit_price: Some(" ".into()),
            fees: None,
            ..full_form()
        };
        let input = form.into_new_trade().unwrap();
        assert_eq!(input.direction, Direction::Long);
        assert_eq!(input.exit_price, None);
        assert_eq!(input.fees, 0.0);
    }

    #[test]
    fn missing_required_fields_are_rejected() {
        for field in ["symbol", "entry_price", "quantity", "date"] {
            let mut form = full_form();
            match field {
                "symbol" => form.symbol = Some("   ".into()),
                "entry_price" => form.entry_price = None,
                "quantity" => form.quantity = Some("".into()),
                _ => form.date = None,
            }
            assert_eq!(field_of(form.into_new_trade().unwrap_err()), field);
        }
    }

    #[test]
    fn unparseable_numbers_are_rejected() {
        let form = TradeForm {
            fees: Some("five".into()),
            ..full_form()
        };
        assert_eq!(field_of(form.into_new_trade().unwrap_err()), "fees");

        let form = TradeForm {
            exit_price: Some("NaN".into()),
            ..full_form()
        };
        assert_eq!(field_of(form.into_new_trade().unwrap_err()), "exit_price");
    }

    #[test]
    fn zero_values_count_as_present() {
        let form = TradeForm {
            entry_price: Some("0".into()),
            exit_price: Some("0".into()),
            ..full_form()
        };
        let input = form.into_new_trade().unwrap();
        assert_eq!(input.entry_price, 0.0);
        assert_eq!(input.exit_price, Some(0.0));
    }

    #[test]
    fn bad_direction_is_rejected() {
        let form = TradeForm {
            direction: Some("flat".into()),
            ..full_form()
        };
        assert_eq!(field_of(form.into_new_trade().unwrap_err()), "direction");
    }

    #[test]
    fn parse_date_accepts_rfc3339() {
        let dt = parse_date("2024-03-05T14:30:00+02:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 5, 12, 30, 0).unwrap());
        assert!(parse_date("05/03/2024").is_err());
    }

    #[test]
    fn update_only_carries_present_fields() {
        let form = TradeForm {
            exit_price: Some("120.5".into()),
            ..Default::default()
        };
        let update = form.into_update(ClearFields::default()).unwrap();
        assert_eq!(update.exit_price, Some(Some(120.5)));
        assert_eq!(update.symbol, None);
        assert_eq!(update.fees, None);
    }

    #[test]
    fn update_rejects_blank_required_field() {
        let form = TradeForm {
            quantity: Some(" ".into()),
            ..Default::default()
        };
        let err = form.into_update(ClearFields::default()).unwrap_err();
        assert_eq!(field_of(err), "quantity");
    }

    #[test]
    fn update_clear_exit() {
        let clear = ClearFields {
            exit_price: true,
            ..ClearFields::default()
        };
        let update = TradeForm::default().into_update(clear).unwrap();
        assert_eq!(update.exit_price, Some(None));

        let form = TradeForm {
            exit_price: Some("1".into()),
            ..Default::default()
        };
        assert_eq!(field_of(form.into_update(clear).unwrap_err()), "exit_price");
    }

    #[test]
    fn update_clear_notes_and_setup() {
        let clear = ClearFields {
            notes: true,
            setup: true,
            ..ClearFields::default()
        };
        let update = TradeForm::default().into_update(clear).unwrap();
        assert_eq!(update.notes, Some(None));
        assert_eq!(update.setup, Some(None));
        assert_eq!(update.exit_price, None);

        let form = TradeForm {
            setup: Some("flag".into()),
            ..Default::default()
        };
        assert_eq!(field_of(form.into_update(clear).unwrap_err()), "setup");
    }

    #[test]
    fn overflowing_pnl_is_rejected() {
        let form = TradeForm {
            entry_price: Some("0".into()),
            exit_price: Some("1e300".into()),
            quantity: Some("1e10".into()),
            ..full_form()
        };
        assert_eq!(field_of(form.into_new_trade().unwrap_err()), "pnl");
        assert!(ensure_finite_pnl(-1e300).is_ok());
    }
}
