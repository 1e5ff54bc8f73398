use crate::serializable_struct_with_getters;
use serde::{Deserialize, Serialize};

pub type OrderId = u64;

/// A shipping order waiting for a robot. Weight and value are plain
/// non-negative integers; the id only has to be unique within one request.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Order {
    pub id: OrderId,
    pub weight: u32,
    pub value: u32,
}

impl Order {
    pub fn new(id: OrderId, weight: u32, value: u32) -> Self {
        Self { id, weight, value }
    }

    #[inline]
    pub fn is_weightless(&self) -> bool {
        self.weight == 0
    }
}

serializable_struct_with_getters! {
    DeliveryPlan {
        robot_id: String,
        total_weight: u64,
        total_value: u64,
        orders: Vec<Order>,
    }
}

impl DeliveryPlan {
    pub fn empty(robot_id: &str) -> Self {
        Self {
            robot_id: robot_id.to_string(),
            total_weight: 0,
            total_value: 0,
            orders: Vec::new(),
        }
    }

    /// Builds a plan whose totals are summed from `orders`.
    pub fn from_orders(robot_id: &str, orders: Vec<Order>) -> Self {
        let (total_weight, total_value) = orders.iter().fold((0u64, 0u64), |(w, v), o| {
            (w + o.weight as u64, v + o.value as u64)
        });
        Self {
            robot_id: robot_id.to_string(),
            total_weight,
            total_value,
            orders,
        }
    }

    pub fn order_ids(&self) -> Vec<OrderId> {
        self.orders.iter().map(|o| o.id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

serializable_struct_with_getters! {
    PlanRequest {
        robot_id: String,
        capacity: i64,
        orders: Vec<Order>,
        timeout_ms: Option<u64>,
    }
}
