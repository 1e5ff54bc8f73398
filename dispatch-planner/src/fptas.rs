//! Value-scaled dynamic program with a `(1 - epsilon)` guarantee.
//!
//! Values are divided by `K = max(1, floor(max_value * epsilon / n))` and the
//! table is indexed by scaled value: `min_weight[v]` is the least weight that
//! reaches scaled value exactly `v`. The table size depends on values rather
//! than on capacity, which is what makes this tier usable for large inputs.

use crate::{error::PlanResult, pool::BitTable, SolveContext};
use tracing::trace;

pub fn scaling_factor(max_value: u64, n: usize, epsilon: f64) -> u64 {
    if n == 0 {
        return 1;
    }
    ((max_value as f64 * epsilon / n as f64).floor() as u64).max(1)
}

pub fn solve(ctx: &SolveContext<'_>, selected: &mut Vec<usize>) -> PlanResult<()> {
    let mut poller = ctx.poller();
    poller.check()?;
    let orders = ctx.orders;
    let n = orders.len();

    let max_value = orders.iter().map(|o| o.value as u64).max().unwrap_or(0);
    if max_value == 0 {
        return Ok(());
    }
    let scale = scaling_factor(max_value, n, ctx.config.fptas.epsilon);

    let mut scaled = ctx.pool.indices();
    scaled.extend(orders.iter().map(|o| (o.value as u64 / scale) as usize));
    let max_scaled: usize = scaled.iter().sum();

    let infeasible = ctx.capacity + 1;
    let mut min_weight = ctx.pool.value_table(max_scaled + 1, infeasible);
    min_weight[0] = 0;
    let mut parent = BitTable::new(ctx.pool, n, max_scaled + 1);

    let mut reach = 0usize;
    for (i, order) in orders.iter().enumerate() {
        poller.check()?;
        let step = scaled[i];
        if step == 0 {
            continue;
        }
        let weight = order.weight as u64;
        reach += step;
        for v in (step..=reach).rev() {
            let base = min_weight[v - step];
            if base < infeasible && base + weight < min_weight[v] {
                min_weight[v] = base + weight;
                parent.set(i, v);
            }
            poller.step()?;
        }
    }

    let Some(best) = (0..=reach).rev().find(|&v| min_weight[v] <= ctx.capacity) else {
        return Ok(());
    };

    let mut v = best;
    for i in (0..n).rev() {
        if v == 0 {
            break;
        }
        if parent.get(i, v) {
            selected.push(i);
            v -= scaled[i];
        }
    }

    trace!(
        scale,
        max_scaled,
        best_scaled = best,
        weight = min_weight[best],
        "fptas table solved"
    );
    Ok(())
}
