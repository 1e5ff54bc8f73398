use dispatch_structs::core::{DeliveryPlan, Order};

/// Weightless orders first, then the selected positive orders in input order.
/// Totals are summed from the final list rather than taken from a solver.
///
/// When the solver picked nothing, the single most valuable positive order
/// that fits is used instead (see [`fallback_index`]).
pub fn assemble(
    robot_id: &str,
    weightless: &[Order],
    positive: &[Order],
    selected: &mut Vec<usize>,
    capacity: u64,
) -> DeliveryPlan {
    selected.sort_unstable();
    selected.dedup();
    if selected.is_empty() {
        if let Some(idx) = fallback_index(positive, capacity) {
            selected.push(idx);
        }
    }

    let mut orders = Vec::with_capacity(weightless.len() + selected.len());
    orders.extend_from_slice(weightless);
    orders.extend(selected.iter().map(|&idx| positive[idx]));

    let plan = DeliveryPlan::from_orders(robot_id, orders);
    debug_assert!(plan.total_weight <= capacity);
    plan
}

/// Highest value among orders that fit, then lighter, then earlier.
pub fn fallback_index(positive: &[Order], capacity: u64) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, order) in positive.iter().enumerate() {
        if order.weight as u64 > capacity {
            continue;
        }
        best = match best {
            Some(current) => {
                let incumbent = &positive[current];
                if order.value > incumbent.value
                    || (order.value == incumbent.value && order.weight < incumbent.weight)
                {
                    Some(idx)
                } else {
                    Some(current)
                }
            }
            None => Some(idx),
        };
    }
    best
}
