use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// The four solver tiers the planner can dispatch to.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Greedy,
    CoreSet,
    Fptas,
    Exact,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Greedy => "greedy",
            Strategy::CoreSet => "core_set",
            Strategy::Fptas => "fptas",
            Strategy::Exact => "exact",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "greedy" => Some(Strategy::Greedy),
            "core_set" => Some(Strategy::CoreSet),
            "fptas" => Some(Strategy::Fptas),
            "exact" => Some(Strategy::Exact),
            _ => None,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tier boundaries, evaluated top to bottom:
///
/// | condition                                              | tier     |
/// |--------------------------------------------------------|----------|
/// | `n <= greedy_max_items` or `C <= greedy_max_capacity`  | greedy   |
/// | `n <= core_max_items` and `C <= core_max_capacity`     | core set |
/// | `n > fptas_items_above` or `C > fptas_capacity_above`  | fptas    |
/// | otherwise                                              | exact    |
///
/// Weight-indexed tiers (core set, exact) size their tables by capacity, so a
/// problem whose table would exceed `table_capacity_limit` cells is sent to
/// the value-indexed FPTAS tier instead, even when a tier is forced.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct StrategyThresholds {
    pub greedy_max_items: usize,
    pub greedy_max_capacity: u64,
    pub core_max_items: usize,
    pub core_max_capacity: u64,
    pub fptas_items_above: usize,
    pub fptas_capacity_above: u64,
    pub table_capacity_limit: u64,
}

impl Default for StrategyThresholds {
    fn default() -> Self {
        Self {
            greedy_max_items: 5,
            greedy_max_capacity: 20,
            core_max_items: 50,
            core_max_capacity: 200,
            fptas_items_above: 100,
            fptas_capacity_above: 500,
            table_capacity_limit: 1 << 22,
        }
    }
}

/// Core size is `n / divisor` clamped to `[min_size, max_size]`, capped at `n`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct CoreSetConfig {
    pub divisor: usize,
    pub min_size: usize,
    pub max_size: usize,
}

impl Default for CoreSetConfig {
    fn default() -> Self {
        Self {
            divisor: 3,
            min_size: 5,
            max_size: 20,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct FptasConfig {
    /// Accepted relative loss; the tier returns at least `(1 - epsilon) * OPT`.
    pub epsilon: f64,
}

impl Default for FptasConfig {
    fn default() -> Self {
        Self { epsilon: 0.1 }
    }
}

/// Heuristic pruning for the exact tier. Off by default: with pruning enabled
/// the tier is no longer guaranteed to return the optimum.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ExactConfig {
    pub pruning: bool,
    pub lookahead: usize,
    pub cutoff_divisor: u64,
}

impl Default for ExactConfig {
    fn default() -> Self {
        Self {
            pruning: false,
            lookahead: 5,
            cutoff_divisor: 10,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PoolConfig {
    pub enabled: bool,
    /// Buffers kept per category once returned.
    pub max_retained: usize,
    /// Buffers that grew beyond this many elements are dropped on return.
    pub max_buffer_len: usize,
    pub table_capacity: usize,
    pub node_capacity: usize,
    pub order_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retained: 16,
            max_buffer_len: 1 << 22,
            table_capacity: 1024,
            node_capacity: 512,
            order_capacity: 128,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct OptimizerConfig {
    pub thresholds: StrategyThresholds,
    pub core_set: CoreSetConfig,
    pub fptas: FptasConfig,
    pub exact: ExactConfig,
    pub pool: PoolConfig,
    /// Cancellation is polled every this many inner-loop steps.
    pub poll_interval: usize,
    /// Bypasses the threshold table when set.
    pub forced_strategy: Option<Strategy>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            thresholds: StrategyThresholds::default(),
            core_set: CoreSetConfig::default(),
            fptas: FptasConfig::default(),
            exact: ExactConfig::default(),
            pool: PoolConfig::default(),
            poll_interval: 4096,
            forced_strategy: None,
        }
    }
}

impl OptimizerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval == 0 {
            return Err(anyhow!("poll_interval must be greater than 0"));
        }
        if !(self.fptas.epsilon > 0.0 && self.fptas.epsilon < 1.0) {
            return Err(anyhow!(
                "fptas.epsilon ({}) must lie strictly between 0 and 1",
                self.fptas.epsilon
            ));
        }
        let core = &self.core_set;
        if core.divisor == 0 || core.min_size == 0 {
            return Err(anyhow!("core_set.divisor and core_set.min_size must be positive"));
        }
        if core.min_size > core.max_size {
            return Err(anyhow!(
                "core_set.min_size ({}) exceeds core_set.max_size ({})",
                core.min_size,
                core.max_size
            ));
        }
        if self.exact.cutoff_divisor == 0 {
            return Err(anyhow!("exact.cutoff_divisor must be greater than 0"));
        }
        if self.exact.pruning && self.exact.lookahead == 0 {
            return Err(anyhow!("exact.lookahead must be greater than 0 when pruning"));
        }
        let t = &self.thresholds;
        if t.table_capacity_limit == 0 {
            return Err(anyhow!("thresholds.table_capacity_limit must be greater than 0"));
        }
        for (name, capacity) in [
            ("core_max_capacity", t.core_max_capacity),
            ("fptas_capacity_above", t.fptas_capacity_above),
        ] {
            if capacity > t.table_capacity_limit {
                return Err(anyhow!(
                    "thresholds.{} ({}) exceeds thresholds.table_capacity_limit ({})",
                    name,
                    capacity,
                    t.table_capacity_limit
                ));
            }
        }
        Ok(())
    }

    /// Defaults overridden by a flat hyperparameter map, e.g.
    /// `{"exact_pruning": true, "fptas_epsilon": 0.05}`. Unknown keys are ignored.
    pub fn from_hyperparameters(hyperparameters: &Option<Map<String, Value>>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(hp) = hyperparameters {
            config.apply_hyperparameters(hp)?;
        }
        Ok(config)
    }

    pub fn apply_hyperparameters(&mut self, hp: &Map<String, Value>) -> Result<()> {
        let as_usize = |key: &str| hp.get(key).and_then(|v| v.as_u64()).map(|v| v as usize);
        let as_u64 = |key: &str| hp.get(key).and_then(|v| v.as_u64());

        let t = &mut self.thresholds;
        if let Some(val) = as_usize("greedy_max_items") {
            t.greedy_max_items = val;
        }
        if let Some(val) = as_u64("greedy_max_capacity") {
            t.greedy_max_capacity = val;
        }
        if let Some(val) = as_usize("core_max_items") {
            t.core_max_items = val;
        }
        if let Some(val) = as_u64("core_max_capacity") {
            t.core_max_capacity = val;
        }
        if let Some(val) = as_usize("fptas_items_above") {
            t.fptas_items_above = val;
        }
        if let Some(val) = as_u64("fptas_capacity_above") {
            t.fptas_capacity_above = val;
        }
        if let Some(val) = as_u64("table_capacity_limit") {
            t.table_capacity_limit = val;
        }
        if let Some(val) = as_usize("core_divisor") {
            self.core_set.divisor = val;
        }
        if let Some(val) = as_usize("core_min_size") {
            self.core_set.min_size = val;
        }
        if let Some(val) = as_usize("core_max_size") {
            self.core_set.max_size = val;
        }
        if let Some(val) = hp.get("fptas_epsilon").and_then(|v| v.as_f64()) {
            self.fptas.epsilon = val;
        }
        if let Some(val) = hp.get("exact_pruning").and_then(|v| v.as_bool()) {
            self.exact.pruning = val;
        }
        if let Some(val) = as_usize("exact_lookahead") {
            self.exact.lookahead = val;
        }
        if let Some(val) = as_u64("exact_cutoff_divisor") {
            self.exact.cutoff_divisor = val;
        }
        if let Some(val) = hp.get("pool_enabled").and_then(|v| v.as_bool()) {
            self.pool.enabled = val;
        }
        if let Some(val) = as_usize("pool_max_retained") {
            self.pool.max_retained = val;
        }
        if let Some(val) = as_usize("poll_interval") {
            self.poll_interval = val;
        }
        if let Some(val) = hp.get("forced_strategy") {
            self.forced_strategy = match val {
                Value::Null => None,
                Value::String(name) => Some(
                    Strategy::from_name(name)
                        .ok_or_else(|| anyhow!("Unknown strategy '{}'", name))?,
                ),
                other => return Err(anyhow!("forced_strategy must be a string, got {}", other)),
            };
        }
        self.validate()
    }
}
