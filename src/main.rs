//! PersonaForge: customer persona segmentation CLI
//!
//! This is the main entrypoint that orchestrates data loading, catalog
//! construction, export, visualization and prediction.

use anyhow::Result;
use clap::Parser;
use personaforge::{
    exploratory_overview, load_transactions, viz, write_catalog, Args, PersonaCatalog,
    PersonaQuery,
};
use std::time::Instant;

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Some(query) = args.parse_query()? {
        run_prediction_mode(&args, query)?;
    } else {
        run_full_pipeline(&args)?;
    }

    Ok(())
}

/// Build the catalog from the input batch and look up a single customer
fn run_prediction_mode(args: &Args, query: PersonaQuery) -> Result<()> {
    println!("=== Prediction Mode ===");
    println!(
        "Customer: country={} platform={} sex={} age={}",
        query.country, query.platform, query.sex, query.age
    );

    let records = load_transactions(&args.input)?;
    let catalog = PersonaCatalog::build(&records)?;

    let key = catalog.key_for(query.country, query.platform, query.sex, query.age)?;
    println!("Persona Code: {}", key);

    match catalog.lookup(&key) {
        Some(persona) => {
            println!("Expected Revenue: ${:.2}", persona.mean_price);
            println!("Segment: {}", persona.segment);
            println!("\nMarketing Recommendation:");
            println!("  {}", persona.segment.recommendation());
        }
        None => println!("Persona not found in catalog"),
    }

    Ok(())
}

/// Run the full segmentation pipeline and export the catalog
fn run_full_pipeline(args: &Args) -> Result<()> {
    println!("=== Persona Segmentation Pipeline ===\n");

    let start_time = Instant::now();

    let records = load_transactions(&args.input)?;
    println!("✓ Data loaded: {} transactions", records.len());

    if args.eda {
        let overview = exploratory_overview(&records)?;
        viz::print_exploratory_overview(&overview);
    }

    let catalog_start = Instant::now();
    let catalog = PersonaCatalog::build(&records)?;
    log::debug!(
        "Catalog built in {:.3}s",
        catalog_start.elapsed().as_secs_f64()
    );
    println!("✓ Catalog built: {} personas", catalog.len());

    viz::print_segment_statistics(&catalog);

    write_catalog(&catalog, &args.output)?;
    println!("\n✓ Results saved to: {}", args.output);

    if let Some(chart_path) = &args.chart {
        viz::create_segment_chart(&catalog, chart_path, None)?;
        println!("✓ Segment chart saved to: {}", chart_path);
    }

    println!("\n=== Pipeline Complete ===");
    println!(
        "Total processing time: {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}
