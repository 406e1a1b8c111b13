//! Console reports and an SVG chart of the persona catalog using Plotters

use crate::catalog::PersonaCatalog;
use crate::data::ExploratoryOverview;
use crate::segment::Segment;
use plotters::prelude::*;

/// Bar color per revenue tier
fn segment_color(segment: Segment) -> RGBColor {
    match segment {
        Segment::A => GREEN,
        Segment::B => BLUE,
        Segment::C => MAGENTA,
        Segment::D => RED,
    }
}

/// Persona prices in ascending order, tagged with their tier
pub fn price_profile(catalog: &PersonaCatalog) -> Vec<(Segment, f64)> {
    let mut bars: Vec<(Segment, f64)> = catalog
        .personas()
        .map(|p| (p.segment, p.mean_price))
        .collect();
    bars.sort_by(|a, b| a.1.total_cmp(&b.1));
    bars
}

/// Draw every persona's mean price as a bar colored by tier, with the quartile cuts
///
/// # Arguments
/// * `catalog` - Finished persona catalog
/// * `output_path` - Path to save the SVG chart
/// * `plot_title` - Title for the chart
pub fn create_segment_chart(
    catalog: &PersonaCatalog,
    output_path: &str,
    plot_title: Option<&str>,
) -> crate::Result<()> {
    let title = plot_title.unwrap_or("Customer Personas: Mean Price by Segment");
    let bars = price_profile(catalog);
    let width = bars.len() as f64;
    let max_price = bars.iter().map(|bar| bar.1).fold(0.0, f64::max);

    let root = SVGBackend::new(output_path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..width, 0f64..(max_price * 1.1))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Persona (ranked by mean price)")
        .y_desc("Mean price")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for segment in Segment::DESCENDING {
        let color = segment_color(segment);
        chart
            .draw_series(
                bars.iter()
                    .enumerate()
                    .filter(|(_, bar)| bar.0 == segment)
                    .map(|(i, bar)| {
                        Rectangle::new(
                            [(i as f64 + 0.1, 0.0), (i as f64 + 0.9, bar.1)],
                            color.filled(),
                        )
                    }),
            )?
            .label(format!("Segment {}", segment))
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    let cuts = catalog.cuts();
    for cut in [cuts.q25, cuts.q50, cuts.q75] {
        chart.draw_series(LineSeries::new(
            vec![(0.0, cut), (width, cut)],
            BLACK.stroke_width(1),
        ))?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    log::info!("Segment chart saved to: {}", output_path);

    Ok(())
}

/// Print tier boundaries, per-tier statistics and sample personas
pub fn print_segment_statistics(catalog: &PersonaCatalog) {
    let cuts = catalog.cuts();
    println!("\n=== Segment Statistics ===");
    println!("Unique personas: {}", catalog.len());
    println!(
        "Age bands: {}",
        catalog
            .bands()
            .labels()
            .iter()
            .map(|band| band.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "Quartile cuts: min={:.2} q25={:.2} q50={:.2} q75={:.2} max={:.2}",
        cuts.min, cuts.q25, cuts.q50, cuts.q75, cuts.max
    );

    println!("\n  Segment | Count |  Mean |   Min |   Max |  Std");
    println!("  --------|-------|-------|-------|-------|------");
    for summary in catalog.segment_summaries() {
        println!(
            "  {:7} | {:5} | {:5.2} | {:5.2} | {:5.2} | {:4.2}",
            summary.segment, summary.count, summary.mean, summary.min, summary.max, summary.std
        );
    }

    for segment in Segment::DESCENDING {
        println!("\n{} Segment (Top 3):", segment);
        for persona in catalog.in_segment(segment).take(3) {
            println!("  {:<28} {:>6.2}", persona.key, persona.mean_price);
        }
    }
}

/// Print the descriptive tables over raw transactions
pub fn print_exploratory_overview(overview: &ExploratoryOverview) {
    println!("\n=== Exploratory Overview ===");
    println!("Total transactions: {}", overview.records);
    println!(
        "Price points ({}): {:?}",
        overview.price_points.len(),
        overview.price_points
    );
    println!("\nBy country:\n{}", overview.by_country);
    println!("\nBy platform:\n{}", overview.by_platform);
    println!("\nBy country and platform:\n{}", overview.by_country_platform);
    println!("\nBy age band:\n{}", overview.by_age_band);
}
