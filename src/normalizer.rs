//! Currency normalization into the reporting currency

use crate::models::{FxTable, MonthlyRow, Table, REPORTING_CURRENCY, SECONDARY_CURRENCY};
use tracing::debug;

/// Return a copy of `table` with `month` expressed in the reporting currency.
///
/// Every row not already in the reporting currency has its `month` value
/// multiplied by the secondary→reporting rate and is relabelled. Only that
/// month is converted. When no FX row resolves for `month` the copy is
/// returned unconverted.
pub fn convert_to_usd<R: MonthlyRow>(table: &Table<R>, fx: &FxTable, month: &str) -> Table<R> {
    let mut converted = table.clone();

    if converted.is_empty() {
        return converted;
    }

    let Some(rate) = fx.rate_for(month) else {
        debug!(month, "No FX rate for month, leaving table unconverted");
        return converted;
    };

    for row in converted
        .rows
        .iter_mut()
        .filter(|r| r.currency() != REPORTING_CURRENCY)
    {
        if row.currency() != SECONDARY_CURRENCY {
            debug!(
                currency = row.currency(),
                month, "Converting with the {} rate", SECONDARY_CURRENCY
            );
        }
        row.rebase(month, rate.eur_usd, REPORTING_CURRENCY);
    }

    converted
}
