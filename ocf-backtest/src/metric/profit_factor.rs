use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Gross winning returns divided by gross losing returns (both absolute).
/// `> 1` means the strategy's wins outweighed its losses over the window.
///
/// Special cases:
/// - `None` when both are zero (no trades produced a nonzero return).
/// - `Decimal::MAX` when there were wins and no losses.
/// - `Decimal::MIN` when there were losses and no wins.
///
/// Reference: <https://www.investopedia.com/articles/fundamental-analysis/10/strategy-performance-reports.asp#toc-profit-factor>
#[derive(Debug, Clone, PartialEq, PartialOrd, Default, Deserialize, Serialize)]
pub struct ProfitFactor {
    pub value: Decimal,
}

impl ProfitFactor {
    pub fn calculate(gross_wins_abs: Decimal, gross_losses_abs: Decimal) -> Option<Self> {
        if gross_wins_abs.is_zero() && gross_losses_abs.is_zero() {
            return None;
        }

        let value = if gross_losses_abs.is_zero() {
            Decimal::MAX
        } else if gross_wins_abs.is_zero() {
            Decimal::MIN
        } else {
            gross_wins_abs.abs().checked_div(gross_losses_abs.abs())?
        };

        Some(Self { value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn both_zero_is_none() {
        assert_eq!(ProfitFactor::calculate(dec!(0), dec!(0)), None);
    }

    #[test]
    fn no_losses_is_max() {
        assert_eq!(ProfitFactor::calculate(dec!(10), dec!(0)).unwrap().value, Decimal::MAX);
    }

    #[test]
    fn no_wins_is_min() {
        assert_eq!(ProfitFactor::calculate(dec!(0), dec!(10)).unwrap().value, Decimal::MIN);
    }

    #[test]
    fn ordinary_ratio() {
        assert_eq!(ProfitFactor::calculate(dec!(10), dec!(5)).unwrap().value, dec!(2));
    }
}
