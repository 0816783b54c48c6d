//! Coin-Days Destroyed / Value-Days Destroyed (§4.4.6).

use chrono::{DateTime, Utc};
use ocf_store::SpentRow;

const VDD_MA_WINDOW_DAYS: usize = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum VddZone {
    LowActivity,
    Normal,
    Elevated,
    Spike,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CddVddResult {
    pub total_cdd: f64,
    pub mean_daily_cdd: f64,
    pub daily_vdd: f64,
    pub vdd_multiple: Option<f64>,
    pub zone: Option<VddZone>,
    pub window_days: u32,
    pub block_height: u64,
    pub computed_at: DateTime<Utc>,
}

impl CddVddResult {
    /// `spent_in_window` drives `total_cdd`/`daily_vdd`; `vdd_history`
    /// (daily VDD series, oldest first) is used for the trailing 365-day
    /// moving average — `None` when fewer than 365 days are available
    /// (§4.4.6). `blocks_per_day` comes from
    /// [`ocf_core::config::Config::blocks_per_day`].
    pub fn calculate(
        spent_in_window: &[SpentRow],
        vdd_history: &[f64],
        blocks_per_day: f64,
        window_days: u32,
        block_height: u64,
        computed_at: DateTime<Utc>,
    ) -> Self {
        let mut total_cdd = 0.0;
        let mut total_vdd = 0.0;
        for row in spent_in_window {
            let cdd = row.btc_value * (row.spent_block.saturating_sub(row.creation_block)) as f64 / blocks_per_day;
            total_cdd += cdd;
            total_vdd += cdd * row.spent_price_usd;
        }

        let window = window_days.max(1) as f64;
        let mean_daily_cdd = total_cdd / window;
        let daily_vdd = total_vdd / window;

        let (vdd_multiple, zone) = if vdd_history.len() >= VDD_MA_WINDOW_DAYS {
            let ma = vdd_history[vdd_history.len() - VDD_MA_WINDOW_DAYS..].iter().sum::<f64>() / VDD_MA_WINDOW_DAYS as f64;
            let multiple = if ma > 0.0 { daily_vdd / ma } else { 0.0 };
            let zone = if multiple < 0.5 {
                VddZone::LowActivity
            } else if multiple < 1.5 {
                VddZone::Normal
            } else if multiple < 2.0 {
                VddZone::Elevated
            } else {
                VddZone::Spike
            };
            (Some(multiple), Some(zone))
        } else {
            (None, None)
        };

        Self {
            total_cdd,
            mean_daily_cdd,
            daily_vdd,
            vdd_multiple,
            zone,
            window_days,
            block_height,
            computed_at,
        }
    }
}
