use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Largest peak-to-trough relative decline observed in an equity curve, as a
/// positive fraction (`0.2` = a 20% drawdown from the running peak).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize, Serialize)]
pub struct MaxDrawdown {
    pub value: Decimal,
}

impl MaxDrawdown {
    /// `None` for an empty curve; a single point has zero drawdown.
    pub fn calculate(equity_curve: &[Decimal]) -> Option<Self> {
        if equity_curve.is_empty() {
            return None;
        }

        let mut peak = equity_curve[0];
        let mut worst = Decimal::ZERO;
        for &point in equity_curve {
            if point > peak {
                peak = point;
            }
            if peak > Decimal::ZERO {
                let drawdown = (peak - point) / peak;
                if drawdown > worst {
                    worst = drawdown;
                }
            }
        }
        Some(Self { value: worst })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn empty_curve_is_none() {
        assert_eq!(MaxDrawdown::calculate(&[]), None);
    }

    #[test]
    fn flat_curve_has_no_drawdown() {
        let curve = vec![dec!(100), dec!(100), dec!(100)];
        assert_eq!(MaxDrawdown::calculate(&curve).unwrap().value, Decimal::ZERO);
    }

    #[test]
    fn tracks_deepest_decline_from_running_peak() {
        let curve = vec![dec!(100), dec!(120), dec!(90), dec!(110), dec!(60)];
        let result = MaxDrawdown::calculate(&curve).unwrap();
        assert_eq!(result.value, dec!(0.5));
    }
}
