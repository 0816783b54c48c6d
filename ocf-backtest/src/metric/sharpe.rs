use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Mean daily return over its standard deviation, at the backtest's native
/// (one-day) granularity. No interval-scaling generic: every walk-forward
/// step is a single day, so there is no second interval to be generic over.
///
/// Reference: <https://www.investopedia.com/articles/07/sharpe_ratio.asp>
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize, Serialize)]
pub struct SharpeRatio {
    pub value: Decimal,
}

impl SharpeRatio {
    pub fn calculate(risk_free_return: Decimal, mean_return: Decimal, std_dev_returns: Decimal) -> Self {
        if std_dev_returns.is_zero() {
            return Self { value: Decimal::MAX };
        }
        let excess_returns = mean_return - risk_free_return;
        let value = excess_returns.checked_div(std_dev_returns).unwrap_or(Decimal::MAX);
        Self { value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn zero_std_dev_is_max() {
        let result = SharpeRatio::calculate(dec!(0.001), dec!(0.002), dec!(0));
        assert_eq!(result.value, Decimal::MAX);
    }

    #[test]
    fn ordinary_ratio() {
        let result = SharpeRatio::calculate(dec!(0.0015), dec!(0.0025), dec!(0.02));
        assert_eq!(result.value, dec!(0.05));
    }
}
