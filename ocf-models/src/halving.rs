//! Bitcoin's deterministic issuance schedule, used by the Stock-to-Flow
//! model (§4.7) to derive supply and annual issuance purely from block
//! height.

const GENESIS_REWARD: f64 = 50.0;
const HALVING_INTERVAL_BLOCKS: u64 = 210_000;
const BLOCKS_PER_DAY: f64 = 144.0;
const BLOCKS_PER_YEAR: f64 = BLOCKS_PER_DAY * 365.0;

/// Block subsidy in effect at `height`.
pub fn block_reward(height: u64) -> f64 {
    let epoch = (height / HALVING_INTERVAL_BLOCKS) as i32;
    GENESIS_REWARD / 2f64.powi(epoch)
}

/// Cumulative issued supply at `height`: full halving epochs plus the
/// partial epoch in progress.
pub fn cumulative_supply(height: u64) -> f64 {
    let epoch = height / HALVING_INTERVAL_BLOCKS;
    let mut supply = 0.0;
    for e in 0..epoch {
        supply += HALVING_INTERVAL_BLOCKS as f64 * (GENESIS_REWARD / 2f64.powi(e as i32));
    }
    let remainder = height % HALVING_INTERVAL_BLOCKS;
    supply + remainder as f64 * block_reward(height)
}

/// Annualised issuance rate at `height`, used as Stock-to-Flow's "flow".
pub fn annual_issuance(height: u64) -> f64 {
    block_reward(height) * BLOCKS_PER_YEAR
}

/// Stock-to-Flow ratio at `height`. `None` once issuance hits zero (post
/// final halving, beyond this model's useful horizon).
pub fn stock_to_flow(height: u64) -> Option<f64> {
    let flow = annual_issuance(height);
    if flow <= 0.0 {
        None
    } else {
        Some(cumulative_supply(height) / flow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reward_halves_on_schedule() {
        assert_eq!(block_reward(0), 50.0);
        assert_eq!(block_reward(210_000), 25.0);
        assert_eq!(block_reward(420_000), 12.5);
    }

    #[test]
    fn supply_accumulates_across_epoch_boundary() {
        let at_first_halving = cumulative_supply(210_000);
        assert!((at_first_halving - 210_000.0 * 50.0).abs() < 1e-6);
    }

    #[test]
    fn stock_to_flow_increases_as_issuance_drops() {
        let s2f_early = stock_to_flow(100_000).unwrap();
        let s2f_late = stock_to_flow(650_000).unwrap();
        assert!(s2f_late > s2f_early);
    }
}
