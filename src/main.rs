use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use freight_planner::models::{ProductId, Quantity};
use freight_planner::planner::{solve_instance, SolveOutcome};
use freight_planner::utils::loader::load_instance;

#[derive(Parser, Debug)]
#[command(about = "Solve the freight routing and knapsack task")]
struct Cli {
    /// Path to the JSON instance configuration
    #[arg(long, default_value = "data/problem_instance.json")]
    config: PathBuf,
}

fn summarise_goods(counts: &HashMap<ProductId, Quantity>) -> String {
    let mut entries: Vec<(&ProductId, &Quantity)> = counts.iter().collect();
    entries.sort();
    entries
        .iter()
        .map(|(product, amount)| format!("{}: {}", product, amount))
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_plan(outcome: &SolveOutcome) {
    let mix = &outcome.mix;
    let plan = &outcome.plan;

    println!("=== Knapsack Target (Profit Maximisation) ===");
    println!("Target mix: {}", summarise_goods(&mix.counts));
    println!("Total profit (without travel costs): {:.2}", mix.profit);
    println!();

    println!("=== Route Planning (Cost Minimisation) ===");
    println!(
        "Base path: {} (cost {:.2})",
        plan.backbone.join(" -> "),
        plan.backbone_cost
    );
    if plan.detours.is_empty() {
        println!("No detours required.");
    } else {
        println!("Detours:");
        for detour in &plan.detours {
            let candidate = &detour.candidate;
            println!(
                "  - {} detour to {} (path {}, cost {:.2}) goods [{}]",
                candidate.anchor,
                candidate.node,
                candidate.path_to_node.join(" -> "),
                candidate.detour_cost,
                summarise_goods(&detour.goods_picked)
            );
        }
    }

    println!(
        "Verification: brute-force search confirmed detour cost {:.2} (best possible {:.2}).",
        plan.detour_cost, outcome.verification.best_cost
    );

    println!();
    println!("Final route: {}", plan.final_route.join(" -> "));
    println!("Total travel cost: {:.2}", plan.total_cost());
    println!(
        "Net profit (profit - travel cost): {:.2}",
        outcome.net_profit()
    );
    println!();
    println!("Goods picked per location:");
    let mut locations: Vec<_> = plan.goods_picked.iter().collect();
    locations.sort_by(|a, b| a.0.cmp(b.0));
    for (node, goods) in locations {
        println!("  {}: {}", node, summarise_goods(goods));
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Cli::parse();

    let instance = load_instance(&args.config)
        .with_context(|| format!("failed to load instance from {}", args.config.display()))?;

    let outcome = solve_instance(&instance).context("solve failed")?;
    print_plan(&outcome);
    Ok(())
}
