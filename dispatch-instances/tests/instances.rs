use dispatch_instances::*;
use dispatch_structs::core::{DeliveryPlan, Order};

fn basic_orders() -> Vec<Order> {
    vec![
        Order::new(1, 5, 10),
        Order::new(2, 4, 40),
        Order::new(3, 6, 30),
    ]
}

#[test]
fn test_generation_is_deterministic_per_seed() {
    let params = InstanceParams::default();
    let a = Instance::generate_instance(&seed_from_u64(7), &params).unwrap();
    let b = Instance::generate_instance(&seed_from_u64(7), &params).unwrap();
    let c = Instance::generate_instance(&seed_from_u64(8), &params).unwrap();
    assert_eq!(a.orders, b.orders);
    assert_eq!(a.capacity, b.capacity);
    assert_ne!(a.orders, c.orders);
}

#[test]
fn test_generated_orders_respect_params() {
    let params = InstanceParams {
        num_orders: 400,
        capacity_percent: 25,
        max_weight: 12,
        max_value: 30,
        value_density: 0.5,
        zero_weight_density: 0.1,
    };
    let instance = Instance::generate_instance(&seed_from_u64(1), &params).unwrap();
    assert_eq!(instance.orders.len(), 400);
    assert!(instance.orders.iter().all(|o| o.weight <= 12 && o.value <= 30));
    assert!(instance.orders.iter().any(|o| o.weight == 0));
    assert!(instance.orders.iter().any(|o| o.value == 0));
    let total: u64 = instance.orders.iter().map(|o| o.weight as u64).sum();
    assert_eq!(instance.capacity, (total * 25 / 100) as i64);
    for (i, order) in instance.orders.iter().enumerate() {
        assert_eq!(order.id, i as u64 + 1);
    }
}

#[test]
fn test_generation_rejects_bad_params() {
    let params = InstanceParams {
        value_density: 1.5,
        ..Default::default()
    };
    assert!(Instance::generate_instance(&seed_from_u64(0), &params).is_err());
    let params = InstanceParams {
        max_weight: 0,
        ..Default::default()
    };
    assert!(Instance::generate_instance(&seed_from_u64(0), &params).is_err());
}

#[test]
fn test_optimal_value_on_known_instance() {
    assert_eq!(optimal_value(&basic_orders(), 9), 50);
    assert_eq!(optimal_value(&basic_orders(), 15), 80);
    assert_eq!(optimal_value(&basic_orders(), 0), 0);
    let mut orders = basic_orders();
    orders.push(Order::new(4, 0, 7));
    orders.push(Order::new(5, 100, 1000));
    assert_eq!(optimal_value(&orders, 9), 57);
}

#[test]
fn test_verify_accepts_valid_plan() {
    let orders = vec![
        Order::new(1, 0, 5),
        Order::new(2, 4, 40),
        Order::new(3, 0, 1),
        Order::new(4, 5, 10),
    ];
    let plan = DeliveryPlan::from_orders(
        "robot",
        vec![orders[0], orders[2], orders[1], orders[3]],
    );
    assert_eq!(verify_plan(&orders, 9, &plan).unwrap(), 56);
}

#[test]
fn test_verify_rejects_broken_plans() {
    let orders = basic_orders();

    let overweight = DeliveryPlan::from_orders("robot", vec![orders[1], orders[2]]);
    assert!(verify_plan(&orders, 9, &overweight).is_err());

    let duplicate = DeliveryPlan::from_orders("robot", vec![orders[1], orders[1]]);
    assert!(verify_plan(&orders, 9, &duplicate).is_err());

    let mut wrong_total = DeliveryPlan::from_orders("robot", vec![orders[1]]);
    wrong_total.total_value += 1;
    assert!(verify_plan(&orders, 9, &wrong_total).is_err());

    let unknown = DeliveryPlan::from_orders("robot", vec![Order::new(99, 1, 1)]);
    assert!(verify_plan(&orders, 9, &unknown).is_err());

    let tampered = DeliveryPlan::from_orders("robot", vec![Order::new(2, 1, 40)]);
    assert!(verify_plan(&orders, 9, &tampered).is_err());

    let non_empty = DeliveryPlan::from_orders("robot", vec![orders[1]]);
    assert!(verify_plan(&orders, 0, &non_empty).is_err());
    assert_eq!(verify_plan(&orders, 0, &DeliveryPlan::empty("robot")).unwrap(), 0);
}

#[test]
fn test_verify_requires_zero_weight_prefix() {
    let orders = vec![Order::new(1, 0, 5), Order::new(2, 3, 8), Order::new(3, 0, 2)];

    let missing = DeliveryPlan::from_orders("robot", vec![orders[0], orders[1]]);
    assert!(verify_plan(&orders, 5, &missing).is_err());

    let reordered = DeliveryPlan::from_orders("robot", vec![orders[2], orders[0], orders[1]]);
    assert!(verify_plan(&orders, 5, &reordered).is_err());

    let late = DeliveryPlan::from_orders("robot", vec![orders[0], orders[1], orders[2]]);
    assert!(verify_plan(&orders, 5, &late).is_err());

    let good = DeliveryPlan::from_orders("robot", vec![orders[0], orders[2], orders[1]]);
    assert_eq!(verify_plan(&orders, 5, &good).unwrap(), 15);
}
