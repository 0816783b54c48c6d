use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fraction of backtest days whose action's direction matched the realised
/// price move, between 0 and 1.
///
/// Reference: <https://www.investopedia.com/terms/w/win-loss-ratio.asp>
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize, Serialize)]
pub struct WinRate {
    pub value: Decimal,
}

impl WinRate {
    /// `None` if there were no days to evaluate (`total = 0`).
    pub fn calculate(wins: Decimal, total: Decimal) -> Option<Self> {
        if total.is_zero() {
            None
        } else {
            let value = wins.abs().checked_div(total.abs())?;
            Some(Self { value })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn no_days_returns_none() {
        assert_eq!(WinRate::calculate(Decimal::ZERO, Decimal::ZERO), None);
    }

    #[test]
    fn all_wins_is_one() {
        assert_eq!(WinRate::calculate(Decimal::TEN, Decimal::TEN).unwrap().value, Decimal::ONE);
    }

    #[test]
    fn mixed_wins_and_losses() {
        assert_eq!(WinRate::calculate(dec!(7), Decimal::TEN).unwrap().value, dec!(0.7));
    }
}
