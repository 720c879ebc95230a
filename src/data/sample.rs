//! Built-in tables used when a source has no data

use crate::models::{CashRow, CashTable, FxRate, FxTable, LedgerRow, LedgerTable};

pub fn actuals() -> LedgerTable {
    let months = ["Apr 2025", "May 2025", "Jun 2025"];
    let row = |entity, account, currency, values: [f64; 3]| {
        LedgerRow::new(
            entity,
            account,
            currency,
            &[
                (months[0], values[0]),
                (months[1], values[1]),
                (months[2], values[2]),
            ],
        )
    };

    LedgerTable::new(
        &months,
        vec![
            row("US", "Revenue", "USD", [1_350_000.0, 1_400_000.0, 1_450_000.0]),
            row("US", "COGS", "USD", [540_000.0, 560_000.0, 580_000.0]),
            row("US", "Opex:Sales", "USD", [135_000.0, 140_000.0, 145_000.0]),
            row("US", "Opex:Marketing", "USD", [95_000.0, 98_000.0, 100_000.0]),
            row("EU", "Revenue", "EUR", [860_000.0, 880_000.0, 900_000.0]),
            row("EU", "COGS", "EUR", [344_000.0, 352_000.0, 360_000.0]),
        ],
    )
}

pub fn budget() -> LedgerTable {
    LedgerTable::new(
        &["Jun 2025"],
        vec![
            LedgerRow::new("US", "Revenue", "USD", &[("Jun 2025", 1_350_000.0)]),
            LedgerRow::new("US", "COGS", "USD", &[("Jun 2025", 540_000.0)]),
            LedgerRow::new("EU", "Revenue", "EUR", &[("Jun 2025", 850_000.0)]),
        ],
    )
}

pub fn fx() -> FxTable {
    let rate = |month: &str, eur_usd, usd_eur| FxRate {
        month: month.to_string(),
        eur_usd,
        usd_eur,
    };

    FxTable::new(vec![
        rate("Apr 2025", 1.14, 0.88),
        rate("May 2025", 1.12, 0.89),
        rate("Jun 2025", 1.11, 0.90),
    ])
}

pub fn cash() -> CashTable {
    CashTable::new(
        &["Jun 2025"],
        vec![
            CashRow::new("US", "USD", &[("Jun 2025", 2_400_000.0)]),
            CashRow::new("EU", "EUR", &[("Jun 2025", 1_400_000.0)]),
        ],
    )
}
