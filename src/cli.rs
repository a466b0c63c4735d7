//! CLI definition and dispatch.

use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::file_store_adapter::FileStoreAdapter;
use crate::adapters::memory_store_adapter::MemoryStoreAdapter;
use crate::domain::config_validation::validate_journal_config;
use crate::domain::equity::EquityCurve;
use crate::domain::error::JournalError;
use crate::domain::format::{format_money, format_pct};
use crate::domain::journal::Journal;
use crate::domain::metrics::{Statistics, SymbolResult, WinLossDistribution};
use crate::domain::persistence::{load_journal, read_journal, save_journal, DEFAULT_STORAGE_KEY};
use crate::domain::trade::{Trade, TradeStatus};
use crate::domain::validation::{ClearFields, TradeForm, ensure_finite_pnl};
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::KeyValueStore;

#[derive(Parser, Debug)]
#[command(name = "tradejournal", about = "Personal trading journal")]
pub struct Cli {
    /// INI configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Emit debug logs on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

/// Trade fields as typed on the command line. Validation happens later, on
/// the whole submission.
#[derive(Args, Debug, Clone, Default)]
pub struct TradeFields {
    #[arg(long)]
    pub symbol: Option<String>,
    /// LONG or SHORT
    #[arg(long)]
    pub direction: Option<String>,
    #[arg(long = "entry")]
    pub entry_price: Option<String>,
    #[arg(long = "exit")]
    pub exit_price: Option<String>,
    #[arg(long)]
    pub quantity: Option<String>,
    /// YYYY-MM-DD or RFC 3339 date-time
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub fees: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub setup: Option<String>,
}

impl From<TradeFields> for TradeForm {
    fn from(fields: TradeFields) -> Self {
        TradeForm {
            symbol: fields.symbol,
            direction: fields.direction,
            entry_price: fields.entry_price,
            exit_price: fields.exit_price,
            quantity: fields.quantity,
            date: fields.date,
            fees: fields.fees,
            notes: fields.notes,
            setup: fields.setup,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StatusFilter {
    Open,
    Closed,
}

impl From<StatusFilter> for TradeStatus {
    fn from(filter: StatusFilter) -> Self {
        match filter {
            StatusFilter::Open => TradeStatus::Open,
            StatusFilter::Closed => TradeStatus::Closed,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log a new trade
    Add {
        #[command(flatten)]
        fields: TradeFields,
    },
    /// Change fields of an existing trade
    Update {
        id: String,
        #[command(flatten)]
        fields: TradeFields,
        /// Remove the exit price, reopening the trade
        #[arg(long)]
        clear_exit: bool,
        #[arg(long)]
        clear_notes: bool,
        #[arg(long)]
        clear_setup: bool,
    },
    /// Remove a trade
    Delete { id: String },
    /// List trades, newest first
    List {
        #[arg(long, value_enum)]
        status: Option<StatusFilter>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show performance statistics
    Stats,
    /// Statistics, win/loss split, per-symbol results and recent trades
    Summary,
    /// Show the cumulative P&L curve
    Equity,
    /// Write all trades to a CSV file
    Export { path: PathBuf },
    /// Add trades from a CSV file
    Import { path: PathBuf },
}

impl Command {
    /// Whether the command saves the journal after running.
    pub fn mutates_journal(&self) -> bool {
        matches!(
            self,
            Command::Add { .. }
                | Command::Update { .. }
                | Command::Delete { .. }
                | Command::Import { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    File,
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JournalSettings {
    pub backend: StorageBackend,
    pub path: PathBuf,
    pub key: String,
    pub currency: String,
    pub recent: usize,
}

pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::prelude::*;

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(
            tracing_subscriber::filter::Targets::new()
                .with_target("r2d2", tracing::Level::WARN)
                .with_default(level),
        );
    // a second init (tests) keeps the first subscriber
    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    let config = match load_config(cli.config.as_ref()) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if let Err(e) = validate_journal_config(&config) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let settings = build_settings(&config);
    if settings.backend == StorageBackend::Memory && cli.command.mutates_journal() {
        eprintln!("warning: memory backend, changes are discarded when this command exits");
    }
    let mut store = match open_store(&settings, &config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match dispatch(cli.command, store.as_mut(), &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, ExitCode> {
    let Some(path) = path else {
        return Ok(FileConfigAdapter::empty());
    };
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = JournalError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Resolve settings, filling defaults for anything the config leaves out.
/// Expects a config that already passed `validate_journal_config`.
pub fn build_settings(config: &dyn ConfigPort) -> JournalSettings {
    let backend = match config
        .get_trimmed("storage", "backend")
        .map(|b| b.to_lowercase())
        .as_deref()
    {
        Some("sqlite") => StorageBackend::Sqlite,
        Some("memory") => StorageBackend::Memory,
        _ => StorageBackend::File,
    };

    let default_path = match backend {
        StorageBackend::Sqlite => "journal.db",
        _ => "journal",
    };
    let path = config
        .get_trimmed("storage", "path")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default_path));

    let key = config
        .get_trimmed("storage", "key")
        .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());

    let currency = config
        .get_trimmed("display", "currency")
        .map(|c| c.to_uppercase())
        .unwrap_or_else(|| "USD".to_string());

    JournalSettings {
        backend,
        path,
        key,
        currency,
        recent: config.get_int("display", "recent", 5).max(1) as usize,
    }
}

pub fn open_store(
    settings: &JournalSettings,
    config: &dyn ConfigPort,
) -> Result<Box<dyn KeyValueStore>, JournalError> {
    match settings.backend {
        StorageBackend::File => Ok(Box::new(FileStoreAdapter::new(settings.path.clone()))),
        StorageBackend::Memory => Ok(Box::new(MemoryStoreAdapter::new())),
        #[cfg(feature = "sqlite")]
        StorageBackend::Sqlite => {
            use crate::adapters::sqlite_adapter::SqliteAdapter;
            let adapter = SqliteAdapter::open(
                &settings.path,
                config.get_int("storage", "pool_size", 4) as u32,
            )?;
            Ok(Box::new(adapter))
        }
        #[cfg(not(feature = "sqlite"))]
        StorageBackend::Sqlite => {
            let _ = config;
            Err(JournalError::ConfigInvalid {
                section: "storage".into(),
                key: "backend".into(),
                reason: "sqlite backend requires the sqlite feature".into(),
            })
        }
    }
}

pub fn dispatch(
    command: Command,
    store: &mut dyn KeyValueStore,
    settings: &JournalSettings,
) -> Result<(), JournalError> {
    match command {
        Command::Add { mut fields } => {
            if fields.date.is_none() {
                fields.date = Some(Utc::now().format("%Y-%m-%d").to_string());
            }
            let trade = add_trade(store, &settings.key, fields.into())?;
            eprintln!(
                "Added {} {} {} ({})",
                trade.direction,
                trade.symbol,
                trade.status(),
                format_money(trade.pnl(), &settings.currency)
            );
            println!("{}", trade.id);
        }
        Command::Update {
            id,
            fields,
            clear_exit,
            clear_notes,
            clear_setup,
        } => {
            let clear = ClearFields {
                exit_price: clear_exit,
                notes: clear_notes,
                setup: clear_setup,
            };
            let trade = update_trade(store, &settings.key, &id, fields.into(), clear)?;
            eprintln!(
                "Updated {} {} {} ({})",
                trade.id,
                trade.symbol,
                trade.status(),
                format_money(trade.pnl(), &settings.currency)
            );
        }
        Command::Delete { id } => {
            let trade = delete_trade(store, &settings.key, &id)?;
            eprintln!("Deleted {} {}", trade.id, trade.symbol);
        }
        Command::List { status, limit } => {
            let journal = load_journal(store, &settings.key);
            let limit = limit.unwrap_or(usize::MAX);
            let trades: Vec<&Trade> = match status {
                Some(s) => journal.with_status(s.into()).take(limit).collect(),
                None => journal.trades().iter().take(limit).collect(),
            };
            if trades.is_empty() {
                eprintln!("No trades logged");
            } else {
                print!("{}", render_trades(&trades, &settings.currency));
            }
        }
        Command::Stats => {
            let journal = load_journal(store, &settings.key);
            print!("{}", render_stats(journal.stats(), &settings.currency));
        }
        Command::Summary => {
            let journal = load_journal(store, &settings.key);
            print!("{}", render_summary(&journal, settings));
        }
        Command::Equity => {
            let journal = load_journal(store, &settings.key);
            let curve = EquityCurve::from_trades(journal.trades());
            if curve.is_empty() {
                eprintln!("No trades logged");
            } else {
                print!("{}", render_equity(&curve, &settings.currency));
            }
        }
        Command::Export { path } => {
            let journal = load_journal(store, &settings.key);
            let written = CsvAdapter::new(path.clone()).export(journal.trades())?;
            eprintln!("Exported {} trades to {}", written, path.display());
        }
        Command::Import { path } => {
            eprintln!("Importing trades from {}", path.display());
            let forms = CsvAdapter::new(path).read_forms()?;
            let added = import_forms(store, &settings.key, forms)?;
            eprintln!("Imported {added} trades");
        }
    }
    Ok(())
}

pub fn add_trade(
    store: &mut dyn KeyValueStore,
    key: &str,
    form: TradeForm,
) -> Result<Trade, JournalError> {
    let input = form.into_new_trade()?;
    let mut journal = read_journal(store, key)?;
    let trade = journal.add(input).clone();
    save_journal(store, key, &journal)?;
    Ok(trade)
}

pub fn update_trade(
    store: &mut dyn KeyValueStore,
    key: &str,
    id: &str,
    form: TradeForm,
    clear: ClearFields,
) -> Result<Trade, JournalError> {
    let update = form.into_update(clear)?;
    if update.is_empty() {
        return Err(JournalError::validation("update", "no fields given"));
    }
    let mut journal = read_journal(store, key)?;
    let not_found = || JournalError::TradeNotFound { id: id.to_string() };

    let mut merged = journal.get(id).cloned().ok_or_else(not_found)?;
    merged.apply(update.clone());
    ensure_finite_pnl(merged.pnl())?;

    let trade = journal
        .update(id, update)
        .cloned()
        .ok_or_else(not_found)?;
    save_journal(store, key, &journal)?;
    Ok(trade)
}

pub fn delete_trade(
    store: &mut dyn KeyValueStore,
    key: &str,
    id: &str,
) -> Result<Trade, JournalError> {
    let mut journal = read_journal(store, key)?;
    let trade = journal
        .delete(id)
        .ok_or_else(|| JournalError::TradeNotFound { id: id.to_string() })?;
    save_journal(store, key, &journal)?;
    Ok(trade)
}

/// Validate every row first; nothing is added unless all rows pass.
pub fn import_forms(
    store: &mut dyn KeyValueStore,
    key: &str,
    forms: Vec<TradeForm>,
) -> Result<usize, JournalError> {
    let inputs = forms
        .into_iter()
        .enumerate()
        .map(|(index, form)| {
            form.into_new_trade().map_err(|e| match e {
                JournalError::Validation { field, reason } => JournalError::Validation {
                    field: format!("{field} (row {})", index + 1),
                    reason,
                },
                other => other,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut journal = read_journal(store, key)?;
    let count = inputs.len();
    for input in inputs {
        journal.add(input);
    }
    save_journal(store, key, &journal)?;
    Ok(count)
}

pub fn render_trades(trades: &[&Trade], currency: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<36}  {:<10}  {:<10}  {:<5}  {:>12}  {:>12}  {:>10}  {:<6}  {:>14}",
        "ID", "DATE", "SYMBOL", "DIR", "ENTRY", "EXIT", "QTY", "STATUS", "P&L"
    );
    for trade in trades {
        let exit = trade
            .exit_price
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        let pnl = if trade.is_closed() {
            format_money(trade.pnl(), currency)
        } else {
            "-".to_string()
        };
        let _ = writeln!(
            out,
            "{:<36}  {:<10}  {:<10}  {:<5}  {:>12}  {:>12}  {:>10}  {:<6}  {:>14}",
            trade.id,
            trade.date.format("%Y-%m-%d"),
            trade.symbol,
            trade.direction,
            trade.entry_price,
            exit,
            trade.quantity,
            trade.status(),
            pnl
        );
    }
    out
}

pub fn render_stats(stats: &Statistics, currency: &str) -> String {
    let profit_factor = match stats.profit_factor_ratio() {
        Some(ratio) => format!("{ratio:.2}"),
        None => format!("{:.2} (no losses)", stats.profit_factor),
    };
    let mut out = String::new();
    let _ = writeln!(out, "Net P&L:          {}", format_money(stats.net_pnl, currency));
    let _ = writeln!(out, "Closed Trades:    {}", stats.total_trades);
    let _ = writeln!(out, "Win Rate:         {}", format_pct(stats.win_rate));
    let _ = writeln!(out, "Profit Factor:    {profit_factor}");
    let _ = writeln!(out, "Gross Profit:     {}", format_money(stats.gross_profit, currency));
    let _ = writeln!(out, "Gross Loss:       {}", format_money(stats.gross_loss, currency));
    let _ = writeln!(out, "Best Trade:       {}", format_money(stats.best_trade, currency));
    let _ = writeln!(out, "Worst Trade:      {}", format_money(stats.worst_trade, currency));
    out
}

pub fn render_summary(journal: &Journal, settings: &JournalSettings) -> String {
    let currency = settings.currency.as_str();
    let mut out = String::from("=== Statistics ===\n");
    out.push_str(&render_stats(journal.stats(), currency));

    let dist = WinLossDistribution::compute(journal.trades());
    let _ = writeln!(out, "\n=== Win/Loss Distribution ===");
    let _ = writeln!(out, "Wins:             {}", format_pct(dist.wins_pct));
    let _ = writeln!(out, "Losses:           {}", format_pct(dist.losses_pct));

    let per_symbol = SymbolResult::compute_per_symbol(journal.trades());
    if !per_symbol.is_empty() {
        let _ = writeln!(out, "\n=== Per-Symbol Summary ===");
        for sr in &per_symbol {
            let _ = writeln!(
                out,
                "  {}:  {} trades, {} win rate, {}",
                sr.symbol,
                sr.total_trades,
                format_pct(sr.win_rate),
                format_money(sr.net_pnl, currency)
            );
        }
    }

    let recent: Vec<&Trade> = journal.recent(settings.recent).iter().collect();
    if !recent.is_empty() {
        let _ = writeln!(out, "\n=== Recent Trades ===");
        out.push_str(&render_trades(&recent, currency));
    }
    out
}

pub fn render_equity(curve: &EquityCurve, currency: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10}  {:<10}  {:>14}  {:>14}",
        "DATE", "SYMBOL", "TRADE P&L", "CUMULATIVE"
    );
    for point in &curve.points {
        let _ = writeln!(
            out,
            "{:<10}  {:<10}  {:>14}  {:>14}",
            point.date.format("%Y-%m-%d"),
            point.symbol,
            format_money(point.trade_pnl, currency),
            format_money(point.cumulative_pnl, currency)
        );
    }
    let _ = writeln!(
        out,
        "\nFinal P&L:        {}",
        format_money(curve.final_pnl(), currency)
    );
    let _ = writeln!(
        out,
        "Max Drawdown:     {}",
        format_money(curve.max_drawdown(), currency)
    );
    out
}
