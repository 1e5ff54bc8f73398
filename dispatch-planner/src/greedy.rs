//! Density-ordered fill. Feasible but not optimal; only picked for problems
//! small enough that the absolute loss stays small.

use crate::{error::PlanResult, ratio::sort_by_density, SolveContext};
use tracing::trace;

pub fn solve(ctx: &SolveContext<'_>, selected: &mut Vec<usize>) -> PlanResult<()> {
    let mut poller = ctx.poller();
    poller.check()?;

    let mut ranked = ctx.pool.indices();
    sort_by_density(ctx.orders, &mut ranked);

    let mut remaining = ctx.capacity;
    for &idx in ranked.iter() {
        if remaining == 0 {
            break;
        }
        poller.step()?;
        let weight = ctx.orders[idx].weight as u64;
        if weight <= remaining {
            selected.push(idx);
            remaining -= weight;
        }
    }

    trace!(
        picked = selected.len(),
        used = ctx.capacity - remaining,
        "greedy fill done"
    );
    Ok(())
}
