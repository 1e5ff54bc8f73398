use crate::pool::{ArenaPool, Pooled};
use dispatch_structs::core::Order;

/// Candidate orders that can fit at all, split by whether they weigh anything.
/// Both groups keep the input order.
#[derive(Debug)]
pub struct Partition<'p> {
    pub capacity: u64,
    pub weightless: Pooled<'p, Order>,
    pub positive: Pooled<'p, Order>,
    pub total_positive_weight: u64,
}

impl<'p> Partition<'p> {
    pub fn is_empty(&self) -> bool {
        self.weightless.is_empty() && self.positive.is_empty()
    }
}

/// Drops orders heavier than `capacity` and splits the rest. Returns `None`
/// when nothing can be planned: a non-positive capacity or no survivors.
pub fn partition<'p>(
    orders: &[Order],
    capacity: i64,
    pool: &'p ArenaPool,
) -> Option<Partition<'p>> {
    if capacity <= 0 || orders.is_empty() {
        return None;
    }
    let capacity = capacity as u64;

    let mut weightless = pool.orders();
    let mut positive = pool.orders();
    let mut total_positive_weight = 0u64;
    for order in orders {
        let weight = order.weight as u64;
        if weight > capacity {
            continue;
        }
        if weight == 0 {
            weightless.push(*order);
        } else {
            positive.push(*order);
            total_positive_weight += weight;
        }
    }

    let partition = Partition {
        capacity,
        weightless,
        positive,
        total_positive_weight,
    };
    if partition.is_empty() {
        None
    } else {
        Some(partition)
    }
}
