use crate::errors::AppError;
use crate::models::RateTable;
use bigdecimal::{BigDecimal, Zero};
use std::str::FromStr;

impl RateTable {
    /// Net value as a decimal; missing or non-numeric values count as zero.
    pub fn net_value(&self) -> BigDecimal {
        let Some(raw) = self.valor_liquido.as_deref() else {
            return BigDecimal::zero();
        };

        BigDecimal::from_str(raw.trim()).unwrap_or_else(|_| {
            tracing::warn!(
                "Rate table {:?} has non-numeric net value '{}'; ranking it as zero",
                self.codigo_tabela,
                raw
            );
            BigDecimal::zero()
        })
    }
}

/// Picks the candidate with the highest net value.
///
/// Among equal net values the first-listed candidate wins. No other
/// criterion (term, installment, coefficient) is considered.
pub fn select_best_table(candidates: &[RateTable]) -> Result<&RateTable, AppError> {
    let mut ranked = candidates.iter().map(|table| (table.net_value(), table));

    let first = ranked.next().ok_or_else(|| {
        AppError::NoEligibleTable("no rate table available for the given parameters".to_string())
    })?;

    let (_, best) = ranked.fold(first, |best, candidate| {
        if candidate.0 > best.0 {
            candidate
        } else {
            best
        }
    });

    Ok(best)
}
