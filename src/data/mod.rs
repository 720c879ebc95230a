//! Table sources and the memoizing data loader
//!
//! The loader reads four tables (actuals, budget, FX, cash) through a
//! `TableSource`. A table the source does not have is replaced by a
//! built-in sample so the user is never blocked on missing data.

use crate::error::DataError;
use crate::models::{CashTable, FxTable, LedgerTable};
use once_cell::sync::OnceCell;
use tracing::{debug, info};

pub mod csv_source;
pub mod sample;

pub use csv_source::CsvSource;

/// Which ledger a source is asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerKind {
    Actuals,
    Budget,
}

impl LedgerKind {
    pub fn table_name(&self) -> &'static str {
        match self {
            LedgerKind::Actuals => "actuals",
            LedgerKind::Budget => "budget",
        }
    }
}

/// Anything that can deliver the four tables.
///
/// `Ok(None)` means the table is absent; `Err` means it exists but could
/// not be read.
pub trait TableSource: Send + Sync {
    fn name(&self) -> &str;
    fn read_ledger(&self, kind: LedgerKind) -> Result<Option<LedgerTable>, DataError>;
    fn read_fx(&self) -> Result<Option<FxTable>, DataError>;
    fn read_cash(&self) -> Result<Option<CashTable>, DataError>;
}

/// In-memory source for fixtures and tests
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub actuals: Option<LedgerTable>,
    pub budget: Option<LedgerTable>,
    pub fx: Option<FxTable>,
    pub cash: Option<CashTable>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_actuals(mut self, table: LedgerTable) -> Self {
        self.actuals = Some(table);
        self
    }

    pub fn with_budget(mut self, table: LedgerTable) -> Self {
        self.budget = Some(table);
        self
    }

    pub fn with_fx(mut self, table: FxTable) -> Self {
        self.fx = Some(table);
        self
    }

    pub fn with_cash(mut self, table: CashTable) -> Self {
        self.cash = Some(table);
        self
    }
}

impl TableSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    fn read_ledger(&self, kind: LedgerKind) -> Result<Option<LedgerTable>, DataError> {
        Ok(match kind {
            LedgerKind::Actuals => self.actuals.clone(),
            LedgerKind::Budget => self.budget.clone(),
        })
    }

    fn read_fx(&self) -> Result<Option<FxTable>, DataError> {
        Ok(self.fx.clone())
    }

    fn read_cash(&self) -> Result<Option<CashTable>, DataError> {
        Ok(self.cash.clone())
    }
}

/// Loads each table once and serves it read-only afterwards.
///
/// Failed loads are not cached, so a malformed source is retried on the
/// next call.
pub struct DataLoader {
    source: Box<dyn TableSource>,
    actuals: OnceCell<LedgerTable>,
    budget: OnceCell<LedgerTable>,
    fx: OnceCell<FxTable>,
    cash: OnceCell<CashTable>,
}

impl DataLoader {
    pub fn new(source: Box<dyn TableSource>) -> Self {
        Self {
            source,
            actuals: OnceCell::new(),
            budget: OnceCell::new(),
            fx: OnceCell::new(),
            cash: OnceCell::new(),
        }
    }

    /// Loader with no backing data: every table is the built-in sample.
    pub fn sample() -> Self {
        Self::new(Box::new(MemorySource::new()))
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub fn load_actuals(&self) -> Result<&LedgerTable, DataError> {
        self.actuals.get_or_try_init(|| {
            let table = self.source.read_ledger(LedgerKind::Actuals)?;
            Ok(self.or_sample("actuals", table, sample::actuals))
        })
    }

    pub fn load_budget(&self) -> Result<&LedgerTable, DataError> {
        self.budget.get_or_try_init(|| {
            let table = self.source.read_ledger(LedgerKind::Budget)?;
            Ok(self.or_sample("budget", table, sample::budget))
        })
    }

    pub fn load_fx(&self) -> Result<&FxTable, DataError> {
        self.fx.get_or_try_init(|| {
            let table = self.source.read_fx()?;
            Ok(self.or_sample("fx", table, sample::fx))
        })
    }

    pub fn load_cash(&self) -> Result<&CashTable, DataError> {
        self.cash.get_or_try_init(|| {
            let table = self.source.read_cash()?;
            Ok(self.or_sample("cash", table, sample::cash))
        })
    }

    fn or_sample<T>(&self, table: &str, loaded: Option<T>, sample: fn() -> T) -> T {
        match loaded {
            Some(t) => {
                debug!(source = %self.source.name(), table, "Loaded table");
                t
            }
            None => {
                info!(
                    source = %self.source.name(),
                    table,
                    "Table not found, using built-in sample"
                );
                sample()
            }
        }
    }
}
