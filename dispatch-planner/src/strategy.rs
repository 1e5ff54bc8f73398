use dispatch_structs::config::{OptimizerConfig, Strategy, StrategyThresholds};
use tracing::debug;

/// First matching row of the threshold table wins.
pub fn select_strategy(n: usize, capacity: u64, t: &StrategyThresholds) -> Strategy {
    if n <= t.greedy_max_items || capacity <= t.greedy_max_capacity {
        Strategy::Greedy
    } else if n <= t.core_max_items && capacity <= t.core_max_capacity {
        Strategy::CoreSet
    } else if n > t.fptas_items_above || capacity > t.fptas_capacity_above {
        Strategy::Fptas
    } else {
        Strategy::Exact
    }
}

/// The forced strategy if any, else the threshold table. A weight-indexed
/// tier whose table would span more than `table_capacity_limit` cells is
/// replaced by the FPTAS tier.
pub fn choose_strategy(
    config: &OptimizerConfig,
    n: usize,
    capacity: u64,
    total_weight: u64,
) -> Strategy {
    let strategy = config
        .forced_strategy
        .unwrap_or_else(|| select_strategy(n, capacity, &config.thresholds));
    let table_len = capacity.min(total_weight);
    match strategy {
        Strategy::CoreSet | Strategy::Exact
            if table_len > config.thresholds.table_capacity_limit =>
        {
            debug!(
                %strategy,
                table_len,
                limit = config.thresholds.table_capacity_limit,
                "table too large, using fptas"
            );
            Strategy::Fptas
        }
        _ => strategy,
    }
}
