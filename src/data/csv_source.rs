//! CSV-backed table source
//!
//! Reads `actuals.csv`, `budget.csv`, `fx.csv` and `cash.csv` from one
//! directory. Ledger and cash files carry `Entity`, `Currency` (and
//! `Account` for ledgers); every other header is treated as a month column.

use super::{LedgerKind, TableSource};
use crate::error::DataError;
use crate::models::{CashRow, CashTable, FxRate, FxTable, LedgerRow, LedgerTable};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

const ENTITY: &str = "Entity";
const ACCOUNT: &str = "Account";
const CURRENCY: &str = "Currency";

pub struct CsvSource {
    dir: PathBuf,
    label: String,
}

impl CsvSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let label = format!("csv:{}", dir.display());
        Self { dir, label }
    }

    fn path_for(&self, table: &str) -> Option<PathBuf> {
        let path = self.dir.join(format!("{}.csv", table));
        if path.is_file() {
            Some(path)
        } else {
            debug!(path = %path.display(), "CSV table not present");
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct FxRecord {
    #[serde(rename = "Month")]
    month: String,
    #[serde(rename = "EUR_USD")]
    eur_usd: f64,
    #[serde(rename = "USD_EUR")]
    usd_eur: f64,
}

/// One parsed row of a month-columned file, before it is typed
struct MonthlyRecord {
    entity: String,
    account: Option<String>,
    currency: String,
    values: BTreeMap<String, f64>,
}

/// Parse a month-columned file into its month headers and records.
fn read_monthly(
    path: &Path,
    table: &'static str,
    with_account: bool,
) -> Result<(Vec<String>, Vec<MonthlyRecord>), DataError> {
    let read_err = |source| DataError::Read { table, source };

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(read_err)?;

    let headers = rdr.headers().map_err(read_err)?.clone();
    let position = |column: &'static str| {
        headers
            .iter()
            .position(|h| h == column)
            .ok_or(DataError::MissingColumn { table, column })
    };

    let entity_idx = position(ENTITY)?;
    let currency_idx = position(CURRENCY)?;
    let account_idx = if with_account {
        Some(position(ACCOUNT)?)
    } else {
        None
    };

    let month_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != entity_idx && *i != currency_idx && Some(*i) != account_idx)
        .filter(|(_, h)| !h.is_empty())
        .map(|(i, h)| (i, h.to_string()))
        .collect();

    let mut records = Vec::new();

    for (line, result) in rdr.records().enumerate() {
        let record = result.map_err(read_err)?;
        let field = |idx: usize| record.get(idx).unwrap_or("").to_string();

        let mut values = BTreeMap::new();
        for (idx, month) in &month_columns {
            let raw = record.get(*idx).unwrap_or("");
            if raw.is_empty() {
                continue;
            }
            let value = raw
                .replace(',', "")
                .parse::<f64>()
                .map_err(|_| DataError::InvalidNumber {
                    table,
                    row: line + 1,
                    column: month.clone(),
                    value: raw.to_string(),
                })?;
            values.insert(month.clone(), value);
        }

        records.push(MonthlyRecord {
            entity: field(entity_idx),
            account: account_idx.map(field),
            currency: field(currency_idx),
            values,
        });
    }

    let months = month_columns.into_iter().map(|(_, m)| m).collect();
    Ok((months, records))
}

impl TableSource for CsvSource {
    fn name(&self) -> &str {
        &self.label
    }

    fn read_ledger(&self, kind: LedgerKind) -> Result<Option<LedgerTable>, DataError> {
        let table = kind.table_name();
        let Some(path) = self.path_for(table) else {
            return Ok(None);
        };

        let (months, records) = read_monthly(&path, table, true)?;
        let rows = records
            .into_iter()
            .map(|r| LedgerRow {
                entity: r.entity,
                account: r.account.unwrap_or_default(),
                currency: r.currency,
                values: r.values,
            })
            .collect();

        Ok(Some(LedgerTable { months, rows }))
    }

    fn read_fx(&self) -> Result<Option<FxTable>, DataError> {
        let Some(path) = self.path_for("fx") else {
            return Ok(None);
        };

        let read_err = |source| DataError::Read { table: "fx", source };
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&path)
            .map_err(read_err)?;

        let mut rows = Vec::new();
        for result in rdr.deserialize::<FxRecord>() {
            let record = result.map_err(read_err)?;
            rows.push(FxRate {
                month: record.month,
                eur_usd: record.eur_usd,
                usd_eur: record.usd_eur,
            });
        }

        Ok(Some(FxTable::new(rows)))
    }

    fn read_cash(&self) -> Result<Option<CashTable>, DataError> {
        let Some(path) = self.path_for("cash") else {
            return Ok(None);
        };

        let (months, records) = read_monthly(&path, "cash", false)?;
        let rows = records
            .into_iter()
            .map(|r| CashRow {
                entity: r.entity,
                currency: r.currency,
                values: r.values,
            })
            .collect();

        Ok(Some(CashTable { months, rows }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, body: &str) {
        fs::write(dir.path().join(name), body).unwrap();
    }

    #[test]
    fn test_reads_ledger_with_sparse_cells() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "actuals.csv",
            "Entity,Account,May 2025,Jun 2025,Currency\n\
             US,Revenue,\"1,400,000\",1450000,USD\n\
             EU,Revenue,,900000,EUR\n",
        );

        let source = CsvSource::new(dir.path());
        let table = source.read_ledger(LedgerKind::Actuals).unwrap().unwrap();

        assert_eq!(table.months, vec!["May 2025", "Jun 2025"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].values["May 2025"], 1_400_000.0);
        assert_eq!(table.rows[1].currency, "EUR");
        assert!(table.rows[1].values.get("May 2025").is_none());
        assert_eq!(table.sum_account("Jun 2025", "Revenue"), 2_350_000.0);
    }

    #[test]
    fn test_missing_file_is_absent_not_error() {
        let dir = TempDir::new().unwrap();
        let source = CsvSource::new(dir.path());

        assert!(source.read_ledger(LedgerKind::Budget).unwrap().is_none());
        assert!(source.read_fx().unwrap().is_none());
        assert!(source.read_cash().unwrap().is_none());
    }

    #[test]
    fn test_reads_fx_and_cash() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "fx.csv",
            "Month,EUR_USD,USD_EUR\nMay 2025,1.12,0.89\nJun 2025,1.11,0.90\n",
        );
        write(
            &dir,
            "cash.csv",
            "Entity,Jun 2025,Currency\nUS,2400000,USD\nEU,1400000,EUR\n",
        );

        let source = CsvSource::new(dir.path());

        let fx = source.read_fx().unwrap().unwrap();
        assert_eq!(fx.rows.len(), 2);
        assert_eq!(fx.rate_for("Jun 2025").map(|r| r.usd_eur), Some(0.90));

        let cash = source.read_cash().unwrap().unwrap();
        assert_eq!(cash.months, vec!["Jun 2025"]);
        assert_eq!(cash.sum_month("Jun 2025"), 3_800_000.0);
    }

    #[test]
    fn test_non_numeric_cell_is_error() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "actuals.csv",
            "Entity,Account,Jun 2025,Currency\nUS,Revenue,lots,USD\n",
        );

        let source = CsvSource::new(dir.path());
        let err = source.read_ledger(LedgerKind::Actuals).unwrap_err();

        match err {
            DataError::InvalidNumber { row, column, value, .. } => {
                assert_eq!(row, 1);
                assert_eq!(column, "Jun 2025");
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_missing_account_column_is_error() {
        let dir = TempDir::new().unwrap();
        write(&dir, "budget.csv", "Entity,Jun 2025,Currency\nUS,1,USD\n");

        let source = CsvSource::new(dir.path());
        let err = source.read_ledger(LedgerKind::Budget).unwrap_err();

        assert!(matches!(
            err,
            DataError::MissingColumn { column: "Account", .. }
        ));
    }
}
