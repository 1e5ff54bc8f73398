//! Weight-indexed 0/1 knapsack, the default tier.
//!
//! `best[c]` is the best value reachable with weight at most `c`. Every
//! improvement appends a [`PathNode`] to a flat arena and records it as the
//! new chain head for that cell, so the winning selection is read back by
//! following `prev` links from a single cell instead of storing a list per
//! cell. Items are visited in density order and improvements must be strictly
//! better, so the earliest-found tie wins and the output is reproducible.

use crate::{
    error::PlanResult,
    pool::{PathNode, NIL},
    ratio::sort_by_density,
    SolveContext,
};
use tracing::trace;

pub fn solve(ctx: &SolveContext<'_>, selected: &mut Vec<usize>) -> PlanResult<()> {
    let mut poller = ctx.poller();
    poller.check()?;
    let orders = ctx.orders;

    // No point sizing the table beyond the weight actually on offer.
    let effective_cap = ctx.capacity.min(ctx.total_weight) as usize;
    if effective_cap == 0 {
        return Ok(());
    }

    let mut ranked = ctx.pool.indices();
    sort_by_density(orders, &mut ranked);

    let mut best = ctx.pool.value_table(effective_cap + 1, 0);
    let mut heads = ctx.pool.index_table(effective_cap + 1, NIL);
    let mut nodes = ctx.pool.nodes();

    let pruning = &ctx.config.exact;
    let mut visited = 0usize;
    for (pos, &idx) in ranked.iter().enumerate() {
        poller.check()?;
        let weight = orders[idx].weight as usize;
        let value = orders[idx].value as u64;
        if weight > effective_cap {
            continue;
        }

        if pruning.pruning {
            let current = best[effective_cap];
            if current > 0 {
                let threshold = current / pruning.cutoff_divisor.max(1);
                let horizon: u64 = ranked[pos..]
                    .iter()
                    .take(pruning.lookahead)
                    .map(|&j| orders[j].value as u64)
                    .sum();
                if horizon < threshold {
                    trace!(pos, current, horizon, "exact scan halted by lookahead bound");
                    break;
                }
                if value < threshold {
                    continue;
                }
            }
        }

        visited += 1;
        for cap in (weight..=effective_cap).rev() {
            let candidate = best[cap - weight] + value;
            if candidate > best[cap] {
                best[cap] = candidate;
                nodes.push(PathNode {
                    item: idx,
                    prev: heads[cap - weight],
                });
                heads[cap] = nodes.len() - 1;
            }
            poller.step()?;
        }
    }

    let mut best_cap = 0;
    for cap in 1..=effective_cap {
        if best[cap] > best[best_cap] {
            best_cap = cap;
        }
    }

    let mut link = heads[best_cap];
    while link != NIL {
        let node = nodes[link];
        selected.push(node.item);
        link = node.prev;
    }

    trace!(
        effective_cap,
        visited,
        nodes = nodes.len(),
        best_value = best[best_cap],
        "exact table solved"
    );
    Ok(())
}
