use dispatch_instances::{seed_from_u64, Instance, InstanceParams};
use dispatch_planner::{
    pool::{ArenaPool, BitTable, PoolStats, Pooled},
    CancelToken, Never, OptimizerConfig, Planner, Strategy,
};
use dispatch_structs::config::PoolConfig;
use std::{sync::Arc, thread};

fn instance(seed: u64, num_orders: usize) -> Instance {
    let params = InstanceParams {
        num_orders,
        capacity_percent: 40,
        max_weight: 20,
        ..Default::default()
    };
    Instance::generate_instance(&seed_from_u64(seed), &params).unwrap()
}

fn exact_planner() -> Planner {
    Planner::new(OptimizerConfig {
        forced_strategy: Some(Strategy::Exact),
        ..Default::default()
    })
}

#[test]
fn test_checkout_is_cleared() {
    let pool = ArenaPool::default();
    {
        let mut values = pool.values();
        values.extend([1, 2, 3]);
    }
    assert_eq!(pool.stats().values, 1);
    let values = pool.values();
    assert!(values.is_empty());
    assert!(values.capacity() >= 3);
    assert_eq!(pool.stats().values, 0);
}

#[test]
fn test_tables_are_filled() {
    let pool = ArenaPool::default();
    {
        let mut table = pool.value_table(8, 7);
        table[3] = 1;
    }
    let table = pool.value_table(4, 9);
    assert_eq!(*table, vec![9; 4]);
    let index = pool.index_table(3, usize::MAX);
    assert_eq!(*index, vec![usize::MAX; 3]);
}

#[test]
fn test_plans_reuse_buffers() {
    let planner = exact_planner();
    let inst = instance(1, 80);
    planner
        .plan(&inst.orders, "robot-1", inst.capacity, &Never)
        .unwrap();
    let first = planner.pool().stats();
    assert!(first.values >= 1);
    assert!(first.indices >= 1);
    assert!(first.nodes >= 1);
    assert!(first.orders >= 2);

    for seed in 2..6 {
        let instance = instance(seed, 80);
        planner
            .plan(&instance.orders, "robot-1", instance.capacity, &Never)
            .unwrap();
    }
    assert_eq!(planner.pool().stats(), first);
}

#[test]
fn test_buffers_return_after_cancellation() {
    let planner = exact_planner();
    let instance = instance(9, 80);
    planner
        .plan(&instance.orders, "robot-1", instance.capacity, &Never)
        .unwrap();
    let settled = planner.pool().stats();

    let token = CancelToken::new();
    token.cancel();
    assert!(planner
        .plan(&instance.orders, "robot-1", instance.capacity, &token)
        .is_err());
    assert_eq!(planner.pool().stats(), settled);
}

#[test]
fn test_disabled_pool_retains_nothing() {
    let planner = Planner::new(OptimizerConfig {
        pool: PoolConfig {
            enabled: false,
            ..Default::default()
        },
        ..Default::default()
    });
    let instance = instance(3, 60);
    planner
        .plan(&instance.orders, "robot-1", instance.capacity, &Never)
        .unwrap();
    assert_eq!(planner.pool().stats(), PoolStats::default());
    assert_eq!(ArenaPool::disabled().stats(), PoolStats::default());
}

#[test]
fn test_retention_is_bounded() {
    let pool = ArenaPool::new(&PoolConfig {
        max_retained: 2,
        max_buffer_len: 64,
        table_capacity: 16,
        ..Default::default()
    });
    {
        let _a = pool.indices();
        let _b = pool.indices();
        let _c = pool.indices();
    }
    assert_eq!(pool.stats().indices, 2);

    {
        let mut big = pool.values();
        big.reserve(1024);
    }
    assert_eq!(pool.stats().values, 0);
}

#[test]
fn test_detached_and_into_inner() {
    let mut detached: Pooled<'static, u64> = Pooled::detached(4);
    detached.push(5);
    assert_eq!(detached.len(), 1);

    let pool = ArenaPool::default();
    let mut orders = pool.indices();
    orders.push(3);
    let owned = orders.into_inner();
    assert_eq!(owned, vec![3]);
    assert_eq!(pool.stats().indices, 0);
}

#[test]
fn test_bit_table() {
    let pool = ArenaPool::default();
    let mut bits = BitTable::new(&pool, 3, 130);
    bits.set(0, 0);
    bits.set(1, 64);
    bits.set(2, 129);
    assert!(bits.get(0, 0));
    assert!(bits.get(1, 64));
    assert!(bits.get(2, 129));
    assert!(!bits.get(0, 1));
    assert!(!bits.get(1, 63));
    assert!(!bits.get(2, 128));
    drop(bits);

    // A recycled buffer must come back zeroed.
    let bits = BitTable::new(&pool, 3, 130);
    assert!(!bits.get(2, 129));
}

#[test]
fn test_shared_pool_across_threads() {
    let pool = Arc::new(ArenaPool::default());
    let instances: Vec<Instance> = (0..8).map(|seed| instance(seed, 70)).collect();
    let expected: Vec<_> = instances
        .iter()
        .map(|i| {
            exact_planner()
                .plan(&i.orders, "robot-1", i.capacity, &Never)
                .unwrap()
        })
        .collect();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let planner = Planner::with_pool(
                OptimizerConfig {
                    forced_strategy: Some(Strategy::Exact),
                    ..Default::default()
                },
                Arc::clone(&pool),
            );
            let instances = instances.clone();
            thread::spawn(move || {
                instances
                    .iter()
                    .map(|i| {
                        planner
                            .plan(&i.orders, "robot-1", i.capacity, &Never)
                            .unwrap()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
    assert!(pool.stats().values <= PoolConfig::default().max_retained);
}
