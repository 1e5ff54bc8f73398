//! Core decomposition: the densest few orders are solved exactly with a
//! capacity-indexed table, everything after them is appended greedily.
//! Table cost is bounded by the core size, not by `n`.

use crate::{
    error::PlanResult,
    pool::BitTable,
    ratio::sort_by_density,
    SolveContext,
};
use dispatch_structs::config::CoreSetConfig;
use tracing::trace;

/// `n / divisor` clamped to `[min_size, max_size]`, never more than `n`.
pub fn core_size(n: usize, config: &CoreSetConfig) -> usize {
    let min = config.min_size;
    let max = config.max_size.max(min);
    (n / config.divisor.max(1)).clamp(min, max).min(n)
}

pub fn solve(ctx: &SolveContext<'_>, selected: &mut Vec<usize>) -> PlanResult<()> {
    let mut poller = ctx.poller();
    poller.check()?;
    let orders = ctx.orders;

    let mut ranked = ctx.pool.indices();
    sort_by_density(orders, &mut ranked);
    let core_len = core_size(ranked.len(), &ctx.config.core_set);
    let (core, tail) = ranked.split_at(core_len);

    let core_weight: u64 = core.iter().map(|&i| orders[i].weight as u64).sum();
    let table_cap = ctx.capacity.min(core_weight) as usize;

    let mut best = ctx.pool.value_table(table_cap + 1, 0);
    let mut taken = BitTable::new(ctx.pool, core_len, table_cap + 1);

    for (row, &idx) in core.iter().enumerate() {
        poller.check()?;
        let weight = orders[idx].weight as usize;
        let value = orders[idx].value as u64;
        if weight > table_cap {
            continue;
        }
        for cap in (weight..=table_cap).rev() {
            let candidate = best[cap - weight] + value;
            if candidate > best[cap] {
                best[cap] = candidate;
                taken.set(row, cap);
            }
            poller.step()?;
        }
    }

    let mut best_cap = 0;
    for cap in 1..=table_cap {
        if best[cap] > best[best_cap] {
            best_cap = cap;
        }
    }

    let start = selected.len();
    let mut cap = best_cap;
    let mut used = 0u64;
    for row in (0..core_len).rev() {
        if cap == 0 {
            break;
        }
        if taken.get(row, cap) {
            let idx = core[row];
            selected.push(idx);
            cap -= orders[idx].weight as usize;
            used += orders[idx].weight as u64;
        }
    }
    let core_picked = selected.len() - start;

    let mut remaining = ctx.capacity - used;
    for &idx in tail {
        if remaining == 0 {
            break;
        }
        poller.step()?;
        let weight = orders[idx].weight as u64;
        if weight <= remaining {
            selected.push(idx);
            remaining -= weight;
        }
    }

    trace!(
        core_len,
        core_picked,
        tail_picked = selected.len() - start - core_picked,
        core_value = best[best_cap],
        "core set solved"
    );
    Ok(())
}
