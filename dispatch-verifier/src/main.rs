use anyhow::{anyhow, Result};
use clap::{arg, Command};
use dispatch_instances::verify_plan;
use dispatch_structs::core::{DeliveryPlan, Order};
use dispatch_utils::{decompress_obj, dejsonify};
use serde::{de::DeserializeOwned, Deserialize};
use std::{fs, io::Read};

fn cli() -> Command {
    Command::new("dispatch-verifier")
        .about("Verifies a delivery plan")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("verify_plan")
                .about("Verifies a plan against the orders it was computed from")
                .allow_negative_numbers(true)
                .arg(
                    arg!(<ORDERS> "Orders json string, path to json file, or '-' for stdin")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(arg!(<CAPACITY> "Robot capacity").value_parser(clap::value_parser!(i64)))
                .arg(
                    arg!(<PLAN> "Plan json string, path to json or zlib file, or '-' for stdin")
                        .value_parser(clap::value_parser!(String)),
                ),
        )
}

fn main() {
    let matches = cli().get_matches();

    if let Err(e) = match matches.subcommand() {
        Some(("verify_plan", sub_m)) => verify(
            sub_m.get_one::<String>("ORDERS").unwrap().clone(),
            *sub_m.get_one::<i64>("CAPACITY").unwrap(),
            sub_m.get_one::<String>("PLAN").unwrap().clone(),
        ),
        _ => Err(anyhow!("Invalid subcommand")),
    } {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

pub fn verify(orders: String, capacity: i64, plan: String) -> Result<()> {
    if orders == "-" && plan == "-" {
        return Err(anyhow!("Only one of ORDERS and PLAN can be read from stdin"));
    }
    let orders = load_orders(&orders)?;
    let plan = load_plan(&plan)?;

    match verify_plan(&orders, capacity, &plan) {
        Ok(total_value) => {
            println!("Plan is valid (total_value: {})", total_value);
            Ok(())
        }
        Err(e) => {
            eprintln!("Verification error: Invalid plan: {}", e);
            std::process::exit(1);
        }
    }
}

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

fn load_plan(plan: &str) -> Result<DeliveryPlan> {
    if plan.ends_with(".zlib") {
        let bytes =
            fs::read(plan).map_err(|e| anyhow!("Failed to read plan file {}: {}", plan, e))?;
        return decompress_obj::<DeliveryPlan>(&bytes)
            .map_err(|e| anyhow!("Failed to decompress plan: {}", e));
    }
    load_json::<DeliveryPlan>(plan, "plan")
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
