use anyhow::{anyhow, Result};
use clap::{arg, ArgAction, Command};
use dispatch_instances::{seed_from_u64, Instance, InstanceParams};
use dispatch_planner::{ArenaPool, CancelSignal, Never, Planner};
use dispatch_structs::{
    config::OptimizerConfig,
    core::{DeliveryPlan, Order, PlanRequest},
};
use dispatch_utils::{
    compress_obj, dejsonify, jsonify, jsonify_pretty, run_bounded, run_with_deadline,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{fs, io::Read, path::PathBuf, sync::Arc, time::Duration};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn cli() -> Command {
    Command::new("dispatch-runtime")
        .about("Plans robot deliveries")
        .arg_required_else_help(true)
        .arg(
            arg!(--"log-level" [LEVEL] "Default log level, overridden by RUST_LOG")
                .global(true)
                .default_value("warn")
                .value_parser(clap::value_parser!(String)),
        )
        .subcommand(
            Command::new("compute_plan")
                .about("Computes a delivery plan for one robot")
                .allow_negative_numbers(true)
                .arg(
                    arg!(<ORDERS> "Orders json string, path to json file, or '-' for stdin")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(arg!(<CAPACITY> "Robot capacity").value_parser(clap::value_parser!(i64)))
                .arg(
                    arg!(--robot [ROBOT] "Robot id recorded in the plan")
                        .default_value("robot")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--config [CONFIG] "Optimizer config json string or path to json file")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--timeout [TIMEOUT_MS] "Abandon planning after this many milliseconds")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--output [OUTPUT_FILE] "If set, the plan will be saved to this file path (default json)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--compress [COMPRESS] "If output file is set, the plan will be compressed as zlib")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("batch_plan")
                .about("Computes plans for many robots concurrently")
                .arg(
                    arg!(<REQUESTS> "Plan requests json string, path to json file, or '-' for stdin")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--config [CONFIG] "Optimizer config json string or path to json file")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--workers [WORKERS] "Maximum number of plans computed at once")
                        .default_value("4")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--output [OUTPUT_FILE] "If set, the plans will be saved to this file path (default json)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--compress [COMPRESS] "If output file is set, the plans will be compressed as zlib")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("generate_orders")
                .about("Generates a synthetic order set")
                .arg(
                    arg!(<PARAMS> "Instance params json string or path to json file")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(arg!(<SEED> "Seed value").value_parser(clap::value_parser!(u64))),
        )
}

fn main() {
    let matches = cli().get_matches();
    setup_tracing(matches.get_one::<String>("log-level").unwrap());

    if let Err(e) = match matches.subcommand() {
        Some(("compute_plan", sub_m)) => compute_plan(
            sub_m.get_one::<String>("ORDERS").unwrap().clone(),
            *sub_m.get_one::<i64>("CAPACITY").unwrap(),
            sub_m.get_one::<String>("robot").unwrap().clone(),
            sub_m.get_one::<String>("config").cloned(),
            sub_m.get_one::<u64>("timeout").cloned(),
            sub_m.get_one::<PathBuf>("output").cloned(),
            *sub_m.get_one::<bool>("compress").unwrap(),
        ),
        Some(("batch_plan", sub_m)) => batch_plan(
            sub_m.get_one::<String>("REQUESTS").unwrap().clone(),
            sub_m.get_one::<String>("config").cloned(),
            *sub_m.get_one::<usize>("workers").unwrap(),
            sub_m.get_one::<PathBuf>("output").cloned(),
            *sub_m.get_one::<bool>("compress").unwrap(),
        ),
        Some(("generate_orders", sub_m)) => generate_orders(
            sub_m.get_one::<String>("PARAMS").unwrap().clone(),
            *sub_m.get_one::<u64>("SEED").unwrap(),
        ),
        _ => Err(anyhow!("Invalid subcommand")),
    } {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn setup_tracing(log_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

pub fn compute_plan(
    orders: String,
    capacity: i64,
    robot_id: String,
    config: Option<String>,
    timeout_ms: Option<u64>,
    output_file: Option<PathBuf>,
    compress: bool,
) -> Result<()> {
    let orders = load_orders(&orders)?;
    let planner = Planner::new(load_config(config.as_deref())?);
    info!(robot_id, capacity, orders = orders.len(), "computing plan");

    let plan = match timeout_ms {
        Some(ms) => run_with_deadline(Duration::from_millis(ms), |token| {
            planner.plan(&orders, &robot_id, capacity, token)
        }),
        None => planner.plan(&orders, &robot_id, capacity, &Never),
    }?;

    info!(
        robot_id,
        total_weight = plan.total_weight,
        total_value = plan.total_value,
        "plan computed"
    );
    write_output(&plan, output_file, compress)
}

pub fn batch_plan(
    requests: String,
    config: Option<String>,
    max_workers: usize,
    output_file: Option<PathBuf>,
    compress: bool,
) -> Result<()> {
    let requests = load_json::<Vec<PlanRequest>>(&requests, "requests")?;
    let config = load_config(config.as_deref())?;
    let pool = Arc::new(ArenaPool::new(&config.pool));
    let planner = Planner::with_pool(config, pool.clone());
    info!(requests = requests.len(), max_workers, "computing plans");

    let plans = run_bounded(&requests, max_workers, |request| -> Result<DeliveryPlan> {
        let plan = match request.timeout_ms {
            Some(ms) => run_with_deadline(Duration::from_millis(ms), |token| {
                plan_one(&planner, request, token)
            }),
            None => plan_one(&planner, request, &Never),
        }?;
        Ok(plan)
    })?;

    info!(plans = plans.len(), pool = ?pool.stats(), "plans computed");
    write_output(&plans, output_file, compress)
}

fn plan_one(
    planner: &Planner,
    request: &PlanRequest,
    signal: &dyn CancelSignal,
) -> Result<DeliveryPlan> {
    planner
        .plan_request(request, signal)
        .map_err(|e| anyhow!("Robot {}: {}", request.robot_id, e))
}

pub fn generate_orders(params: String, seed: u64) -> Result<()> {
    let params = load_json::<InstanceParams>(&params, "params")?;
    let instance = Instance::generate_instance(&seed_from_u64(seed), &params)?;
    info!(
        seed,
        orders = instance.orders.len(),
        capacity = instance.capacity,
        "instance generated"
    );
    println!("{}", jsonify_pretty(&instance)?);
    Ok(())
}

fn write_output<T: Serialize>(
    output: &T,
    output_file: Option<PathBuf>,
    compress: bool,
) -> Result<()> {
    match output_file {
        Some(path) => {
            if compress {
                fs::write(&path, compress_obj(output)?)?;
            } else {
                fs::write(&path, jsonify(output)?)?;
            }
            println!("output written to: {:?}", path);
        }
        None => {
            if compress {
                warn!("--compress has no effect without --output");
            }
            println!("{}", jsonify(output)?);
        }
    }
    Ok(())
}

/// Either a bare list of orders or any object carrying an `orders` field,
/// such as the output of `generate_orders`.
#[derive(Deserialize)]
#[serde(untagged)]
enum OrdersInput {
    List(Vec<Order>),
    Wrapped { orders: Vec<Order> },
}

fn load_orders(orders: &str) -> Result<Vec<Order>> {
    Ok(match load_json::<OrdersInput>(orders, "orders")? {
        OrdersInput::List(orders) => orders,
        OrdersInput::Wrapped { orders } => orders,
    })
}

fn load_config(config: Option<&str>) -> Result<OptimizerConfig> {
    let config = match config {
        Some(config) => load_json::<OptimizerConfig>(config, "config")?,
        None => OptimizerConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn load_json<T: DeserializeOwned>(input: &str, what: &str) -> Result<T> {
    let input = if input == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| anyhow!("Failed to read {} from stdin: {}", what, e))?;
        buffer
    } else if input.ends_with(".json") {
        fs::read_to_string(input)
            .map_err(|e| anyhow!("Failed to read {} file {}: {}", what, input, e))?
    } else {
        input.to_string()
    };

    dejsonify::<T>(&input).map_err(|e| anyhow!("Failed to parse {}: {}", what, e))
}
