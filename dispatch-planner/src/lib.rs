//! Order selection for capacity-constrained delivery robots.
//!
//! A planning call partitions the candidate orders, picks one of four solver
//! tiers from the problem size ([`strategy::select_strategy`]), runs it, and
//! assembles a [`DeliveryPlan`]. Every tier polls a [`CancelSignal`] at item
//! boundaries and every `poll_interval` inner steps; an interrupted call
//! returns [`PlanError`] and no plan.

pub mod assemble;
pub mod core_set;
pub mod error;
pub mod exact;
pub mod fptas;
pub mod greedy;
pub mod partition;
pub mod pool;
pub mod ratio;
pub mod strategy;

pub use dispatch_structs::{
    config::{OptimizerConfig, Strategy},
    core::{DeliveryPlan, Order, OrderId, PlanRequest},
};
pub use dispatch_utils::{CancelSignal, CancelToken, Interrupt, Never};
pub use error::{PlanError, PlanResult};
pub use pool::ArenaPool;

use error::{poll, Poller};
use std::sync::Arc;
use tracing::debug;

/// Inputs shared by every solver tier. `orders` holds only positive-weight
/// candidates that individually fit; solvers push indices into it.
pub struct SolveContext<'a> {
    pub orders: &'a [Order],
    pub capacity: u64,
    pub total_weight: u64,
    pub config: &'a OptimizerConfig,
    pub pool: &'a ArenaPool,
    pub signal: &'a dyn CancelSignal,
}

impl<'a> SolveContext<'a> {
    pub(crate) fn poller(&self) -> Poller<'a> {
        Poller::new(self.signal, self.config.poll_interval)
    }
}

/// Runs one tier. Indices pushed into `selected` refer to `ctx.orders`.
pub fn solve(
    strategy: Strategy,
    ctx: &SolveContext<'_>,
    selected: &mut Vec<usize>,
) -> PlanResult<()> {
    match strategy {
        Strategy::Greedy => greedy::solve(ctx, selected),
        Strategy::CoreSet => core_set::solve(ctx, selected),
        Strategy::Fptas => fptas::solve(ctx, selected),
        Strategy::Exact => exact::solve(ctx, selected),
    }
}

#[derive(Debug, Clone)]
pub struct Planner {
    config: OptimizerConfig,
    pool: Arc<ArenaPool>,
}

impl Planner {
    pub fn new(config: OptimizerConfig) -> Self {
        let pool = Arc::new(ArenaPool::new(&config.pool));
        Self { config, pool }
    }

    /// Shares `pool` with other planners, e.g. one per worker thread.
    pub fn with_pool(config: OptimizerConfig, pool: Arc<ArenaPool>) -> Self {
        Self { config, pool }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn pool(&self) -> &Arc<ArenaPool> {
        &self.pool
    }

    pub fn plan(
        &self,
        orders: &[Order],
        robot_id: &str,
        capacity: i64,
        signal: &dyn CancelSignal,
    ) -> PlanResult<DeliveryPlan> {
        let Some(partition) = partition::partition(orders, capacity, &self.pool) else {
            debug!(robot_id, capacity, candidates = orders.len(), "nothing to plan");
            return Ok(DeliveryPlan::empty(robot_id));
        };
        let mut selected = self.pool.indices();

        if partition.positive.is_empty() {
            return Ok(assemble::assemble(
                robot_id,
                &partition.weightless,
                &[],
                &mut selected,
                partition.capacity,
            ));
        }
        poll(signal)?;

        let n = partition.positive.len();
        let strategy = strategy::choose_strategy(
            &self.config,
            n,
            partition.capacity,
            partition.total_positive_weight,
        );
        debug!(
            robot_id,
            n,
            capacity = partition.capacity,
            weightless = partition.weightless.len(),
            %strategy,
            "selected strategy"
        );

        let ctx = SolveContext {
            orders: &partition.positive,
            capacity: partition.capacity,
            total_weight: partition.total_positive_weight,
            config: &self.config,
            pool: &self.pool,
            signal,
        };
        solve(strategy, &ctx, &mut selected)?;

        let plan = assemble::assemble(
            robot_id,
            &partition.weightless,
            &partition.positive,
            &mut selected,
            partition.capacity,
        );
        debug!(
            robot_id,
            %strategy,
            orders = plan.orders.len(),
            total_weight = plan.total_weight,
            total_value = plan.total_value,
            "plan assembled"
        );
        Ok(plan)
    }

    pub fn plan_request(
        &self,
        request: &PlanRequest,
        signal: &dyn CancelSignal,
    ) -> PlanResult<DeliveryPlan> {
        self.plan(&request.orders, &request.robot_id, request.capacity, signal)
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self::new(OptimizerConfig::default())
    }
}

/// One-off planning with the default configuration and no buffer reuse.
pub fn plan_delivery(
    orders: &[Order],
    robot_id: &str,
    capacity: i64,
    signal: &dyn CancelSignal,
) -> PlanResult<DeliveryPlan> {
    Planner::with_pool(OptimizerConfig::default(), Arc::new(ArenaPool::disabled()))
        .plan(orders, robot_id, capacity, signal)
}
