//! Fabsheet CLI - order snapshot inspection and recalculation

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fabsheet::prelude::*;
use rust_decimal::Decimal;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "fab")]
#[command(author, version, about = "Order sheet inspection and recalculation tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show an order snapshot: header, instance states, entry totals
    Show {
        /// Order snapshot JSON file
        input: PathBuf,
    },

    /// Recalculate formula cells, TOTAL rows and summaries
    Recalc {
        /// Order snapshot JSON file
        input: PathBuf,

        /// Write the updated snapshot here (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the order-level final calculation
    Totals {
        /// Order snapshot JSON file
        input: PathBuf,
    },

    /// Validate entry values and formula configuration
    Check {
        /// Order snapshot JSON file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Show { input } => show(&input),
        Commands::Recalc { input, output } => recalc(&input, output.as_deref()),
        Commands::Totals { input } => totals(&input),
        Commands::Check { input } => check(&input),
    }
}

fn load_snapshot(input: &PathBuf) -> Result<OrderSnapshot> {
    let body = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read '{}'", input.display()))?;
    serde_json::from_str(&body).with_context(|| format!("Failed to parse '{}'", input.display()))
}

fn show(input: &PathBuf) -> Result<()> {
    let snapshot = load_snapshot(input)?;
    let order = snapshot.order();

    println!("Order: {} ({})", order.name, order.id);
    println!("Company: {}", order.company_id);
    if let Some(status) = &order.status {
        println!("Status: {}", status);
    }
    println!("Templates: {}", snapshot.templates().len());

    for template in snapshot.templates() {
        let state = snapshot.instance_state(&template.id);
        println!();
        println!("  {} ({}): {}", template.name, template.id, state);
        for entry in snapshot
            .entries()
            .iter()
            .filter(|e| e.template_id == template.id)
        {
            print_entry_line(entry);
        }
    }

    // Entries whose template definition is missing from the snapshot still
    // carry money.
    for entry in snapshot.entries() {
        if snapshot.template(&entry.template_id).is_none() {
            println!();
            println!("  {} (no template definition)", entry.template_id);
            print_entry_line(entry);
        }
    }

    Ok(())
}

fn print_entry_line(entry: &OrderTemplateEntry) {
    let role = if entry.is_child { "child" } else { "parent" };
    let saved = if entry.is_persisted { "" } else { ", unsaved" };
    println!(
        "    {:<6} {}  total {}  payable {}{}",
        role,
        entry.order_template_id,
        entry.summary.total,
        entry.summary.final_payable_amount,
        saved
    );
}

fn recalc(input: &PathBuf, output: Option<&Path>) -> Result<()> {
    let mut snapshot = load_snapshot(input)?;

    let stats = snapshot.recalculate();
    eprintln!(
        "Evaluated {} cells across {} formula columns ({} parse failures)",
        stats.cells_evaluated, stats.formula_columns, stats.parse_failures
    );
    eprintln!(
        "Filled {} TOTAL cells, refreshed {} summaries",
        stats.totals_filled, stats.summaries_refreshed
    );

    let mut json =
        serde_json::to_string_pretty(&snapshot).context("Failed to serialize the snapshot")?;
    json.push('\n');

    if let Some(output_path) = output {
        std::fs::write(output_path, &json)
            .with_context(|| format!("Failed to write '{}'", output_path.display()))?;
        eprintln!("Wrote '{}'", output_path.display());
    } else {
        io::stdout()
            .write_all(json.as_bytes())
            .context("Failed to write to stdout")?;
    }

    Ok(())
}

fn totals(input: &PathBuf) -> Result<()> {
    let snapshot = load_snapshot(input)?;
    let calc = FinalCalculation::compute(&snapshot);

    for row in &calc.rows {
        let child = row
            .child_total
            .map(|c| format!("  (children {c})"))
            .unwrap_or_default();
        println!("{:<24} {:>10}{}", row.template_name, row.total.to_string(), child);
    }
    println!();
    println!("{:<24} {:>10}", "Subtotal", calc.total.to_string());
    println!(
        "{:<24} {:>10}",
        format!("Discount {}", describe(calc.discount, calc.discount_type)),
        format!("-{}", calc.discount_amount)
    );
    println!(
        "{:<24} {:>10}",
        format!("Margin {}", describe(calc.margin_discount, calc.margin_type)),
        format!("-{}", calc.margin_amount)
    );
    println!("{:<24} {:>10}", "Payable", calc.final_payable_amount.to_string());

    if let Some(notes) = &calc.notes {
        println!();
        println!("Notes: {}", notes);
    }

    Ok(())
}

/// Render a discount input the way it was entered: `10%` or a flat amount.
fn describe(value: Decimal, discount_type: DiscountType) -> String {
    match discount_type {
        DiscountType::Percent => format!("{}%", value),
        DiscountType::Amount => value.to_string(),
    }
}

fn check(input: &PathBuf) -> Result<()> {
    let snapshot = load_snapshot(input)?;
    let mut issues = 0usize;

    // Template configuration: every FORMULA column must parse strictly.
    for template in snapshot.templates() {
        for column in template.formula_columns() {
            let text = column.formula.as_deref().unwrap_or("");
            if let Err(err) = check_formula(text) {
                issues += 1;
                println!("{} / {}: {}", template.name, column.label, err);
            }
        }
    }

    // Entry values: required and numeric checks.
    for entry in snapshot.entries() {
        let Some(template) = snapshot.template(&entry.template_id) else {
            issues += 1;
            println!(
                "{}: no definition for template {}",
                entry.order_template_id, entry.template_id
            );
            continue;
        };
        for issue in validate_entry(template, entry) {
            issues += 1;
            println!("{}: {}", entry.order_template_id, issue);
        }
    }

    if issues > 0 {
        eprintln!("{} issue(s) found", issues);
        std::process::exit(1);
    }
    println!("No issues found");
    Ok(())
}
