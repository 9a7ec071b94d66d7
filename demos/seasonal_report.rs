use call_seasonality::*;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    println!("📈 Call Seasonality Demo\n");

    // Two years of calls for a company with a spring rise and an autumn rise
    let shape = [620, 540, 410, 600, 880, 1120, 930, 700, 480, 590, 820, 760];
    let mut records = Vec::new();
    for (year, scale) in [(2023, 1.0), (2024, 1.15)] {
        for (i, calls) in shape.iter().enumerate() {
            records.push(CallRecord {
                entity_id: 42,
                entity_name: Some("Harbor Heating & Air".to_string()),
                state: Some("OR".to_string()),
                year,
                month: i as u32 + 1,
                calls: (*calls as f64 * scale).round() as u64,
            });
        }
    }

    let directory = entity_directory(&records);
    for (id, name) in &directory {
        println!("Company {}: {}", id, name);
    }

    for strategy in [
        DetectionStrategy::Hybrid,
        DetectionStrategy::Sensitive,
        DetectionStrategy::QuartileStrict,
    ] {
        let analyzer = SeasonalityAnalyzer::new(AnalysisConfig {
            strategy,
            ..AnalysisConfig::default()
        })?;

        let Some(report) = analyzer.report(&records, 42)? else {
            println!("No data for company 42");
            continue;
        };

        println!("\n🔍 {} → {}", strategy.label(), report.pattern.label);
        for peak in &report.analysis.peaks {
            let month = utils::index_to_month(*peak);
            println!(
                "  🔺 {} ({:.2}% of total)",
                utils::month_name(month).unwrap_or("?"),
                report.analysis.percentages[*peak]
            );
        }
        for valley in &report.analysis.valleys {
            let month = utils::index_to_month(*valley);
            println!(
                "  🔻 {} ({:.2}% of total)",
                utils::month_name(month).unwrap_or("?"),
                report.analysis.percentages[*valley]
            );
        }
        for issue in &report.pattern.issues {
            println!("  ⚠️  {}", issue);
        }
        for mark in &report.optimized_marks {
            match mark {
                OptimizedMark::Transition(t) => println!(
                    "  • Month {:.1}: {} ({})",
                    t.month,
                    t.transition_label(),
                    t.direction.color()
                ),
                OptimizedMark::Cluster(c) => println!(
                    "  • Month {:.1}: cluster {} (from {} nearby points)",
                    c.month, c.kind, c.original_points
                ),
            }
        }
    }

    let analyzer = SeasonalityAnalyzer::new(AnalysisConfig::default())?;
    if let Some(report) = analyzer.report(&records, 42)? {
        println!("\n📋 Annual breakdown");
        for (label, row) in report.annual_table.labelled_rows() {
            let cells: Vec<String> = row.iter().map(|v| format!("{:6.2}", v)).collect();
            println!("  {:>16} {}", label, cells.join(" "));
        }
        println!("\n{}", serde_json::to_string_pretty(&report.series_statistics)?);
    }

    Ok(())
}
