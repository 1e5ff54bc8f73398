use ahash::RandomState;
use anyhow::{anyhow, Result};
use dispatch_structs::core::{DeliveryPlan, Order, OrderId};
use rand::{
    rngs::{SmallRng, StdRng},
    Rng, SeedableRng,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct InstanceParams {
    pub num_orders: usize,
    /// Capacity as a percentage of the summed order weight.
    pub capacity_percent: u32,
    pub max_weight: u32,
    pub max_value: u32,
    /// Probability that an order carries a non-zero value.
    pub value_density: f64,
    /// Probability that an order weighs nothing.
    pub zero_weight_density: f64,
}

impl Default for InstanceParams {
    fn default() -> Self {
        Self {
            num_orders: 100,
            capacity_percent: 50,
            max_weight: 50,
            max_value: 100,
            value_density: 1.0,
            zero_weight_density: 0.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Instance {
    pub seed: [u8; 32],
    pub params: InstanceParams,
    pub orders: Vec<Order>,
    pub capacity: i64,
}

pub fn seed_from_u64(n: u64) -> [u8; 32] {
    StdRng::seed_from_u64(n).gen()
}

impl Instance {
    pub fn generate_instance(seed: &[u8; 32], params: &InstanceParams) -> Result<Instance> {
        if params.max_weight == 0 || params.max_value == 0 {
            return Err(anyhow!("max_weight and max_value must be at least 1"));
        }
        for (name, p) in [
            ("value_density", params.value_density),
            ("zero_weight_density", params.zero_weight_density),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(anyhow!("{} ({}) must lie within [0, 1]", name, p));
            }
        }

        let mut rng = SmallRng::from_seed(*seed);
        let orders: Vec<Order> = (0..params.num_orders)
            .map(|i| {
                let weight = if rng.gen_bool(params.zero_weight_density) {
                    0
                } else {
                    rng.gen_range(1..=params.max_weight)
                };
                let value = if rng.gen_bool(params.value_density) {
                    rng.gen_range(1..=params.max_value)
                } else {
                    0
                };
                Order::new(i as OrderId + 1, weight, value)
            })
            .collect();

        let total_weight: u64 = orders.iter().map(|o| o.weight as u64).sum();
        let capacity = (total_weight * params.capacity_percent as u64 / 100) as i64;

        Ok(Instance {
            seed: *seed,
            params: params.clone(),
            orders,
            capacity,
        })
    }

    pub fn verify_plan(&self, plan: &DeliveryPlan) -> Result<u64> {
        verify_plan(&self.orders, self.capacity, plan)
    }

    pub fn optimal_value(&self) -> u64 {
        optimal_value(&self.orders, self.capacity)
    }
}

/// Checks `plan` against the orders it was built from and returns its total
/// value.
pub fn verify_plan(orders: &[Order], capacity: i64, plan: &DeliveryPlan) -> Result<u64> {
    if capacity <= 0 {
        if !plan.orders.is_empty() || plan.total_weight != 0 || plan.total_value != 0 {
            return Err(anyhow!(
                "Capacity ({}) admits no orders but plan holds {}",
                capacity,
                plan.orders.len()
            ));
        }
        return Ok(0);
    }
    let capacity = capacity as u64;

    let mut by_id: HashMap<OrderId, &Order, RandomState> =
        HashMap::with_capacity_and_hasher(orders.len(), RandomState::new());
    for order in orders {
        by_id.entry(order.id).or_insert(order);
    }

    let mut seen: HashSet<OrderId, RandomState> =
        HashSet::with_capacity_and_hasher(plan.orders.len(), RandomState::new());
    let mut total_weight = 0u64;
    let mut total_value = 0u64;
    for order in &plan.orders {
        if !seen.insert(order.id) {
            return Err(anyhow!("Order ({}) selected more than once", order.id));
        }
        let original = by_id
            .get(&order.id)
            .ok_or_else(|| anyhow!("Order ({}) is not a candidate", order.id))?;
        if *original != order {
            return Err(anyhow!(
                "Order ({}) does not match its candidate: {:?} != {:?}",
                order.id,
                order,
                original
            ));
        }
        if order.weight as u64 > capacity {
            return Err(anyhow!(
                "Order ({}) weight ({}) exceeds capacity ({})",
                order.id,
                order.weight,
                capacity
            ));
        }
        total_weight += order.weight as u64;
        total_value += order.value as u64;
    }

    if total_weight != plan.total_weight {
        return Err(anyhow!(
            "Reported total weight ({}) differs from summed weight ({})",
            plan.total_weight,
            total_weight
        ));
    }
    if total_value != plan.total_value {
        return Err(anyhow!(
            "Reported total value ({}) differs from summed value ({})",
            plan.total_value,
            total_value
        ));
    }
    if total_weight > capacity {
        return Err(anyhow!(
            "Total weight ({}) exceeded capacity ({})",
            total_weight,
            capacity
        ));
    }

    let weightless: Vec<OrderId> = orders
        .iter()
        .filter(|o| o.is_weightless())
        .map(|o| o.id)
        .collect();
    let prefix: Vec<OrderId> = plan
        .orders
        .iter()
        .take(weightless.len())
        .map(|o| o.id)
        .collect();
    if prefix != weightless {
        return Err(anyhow!(
            "Plan must start with every zero-weight order in input order: expected {:?}, got {:?}",
            weightless,
            prefix
        ));
    }
    if let Some(order) = plan.orders[weightless.len()..]
        .iter()
        .find(|o| o.is_weightless())
    {
        return Err(anyhow!(
            "Zero-weight order ({}) placed after weighted orders",
            order.id
        ));
    }

    Ok(total_value)
}

/// Reference optimum from an unpruned weight-indexed table.
pub fn optimal_value(orders: &[Order], capacity: i64) -> u64 {
    if capacity <= 0 {
        return 0;
    }
    let capacity = capacity as u64;
    let mut free_value = 0u64;
    let mut weighted = Vec::with_capacity(orders.len());
    for order in orders {
        if order.weight == 0 {
            free_value += order.value as u64;
        } else if order.weight as u64 <= capacity {
            weighted.push(order);
        }
    }
    let total_weight: u64 = weighted.iter().map(|o| o.weight as u64).sum();
    let max_weight = capacity.min(total_weight) as usize;

    let mut dp = vec![0u64; max_weight + 1];
    for order in weighted {
        let weight = order.weight as usize;
        let value = order.value as u64;
        for w in (weight..=max_weight).rev() {
            dp[w] = dp[w].max(dp[w - weight] + value);
        }
    }
    free_value + dp[max_weight]
}
