//! Projection pass: cost per parcel under each volume growth scenario.

use super::{ensure_dir, PassContext};
use crate::analysis::project_all;
use crate::report::{render_table, write_csv};
use anyhow::{anyhow, Result};
use tracing::info;

pub const PROJECTION_FILE: &str = "new_cost_per_parcel_analysis.csv";

pub fn run(ctx: &PassContext<'_>) -> Result<()> {
    let projection_dir = &ctx.config.output.projection_dir;
    ensure_dir(projection_dir)?;

    let table = ctx.load()?;
    let spinner = ctx.spinner("Projecting cost per parcel...");

    let projections = project_all(
        &table,
        &ctx.config.projection.scenarios,
        ctx.config.cost_model(),
    )
    .ok_or_else(|| anyhow!("Cannot project costs: no shipments loaded"))?;

    for p in &projections {
        info!(
            "Scenario {}: new cost per parcel {:.4} (volume +{:.2}%)",
            p.scenario, p.new_cost_per_parcel, p.volume_increase_percentage
        );
    }

    let path = projection_dir.join(PROJECTION_FILE);
    write_csv(&projections, &path)?;
    info!("Projection saved to {}", path.display());

    spinner.finish();

    ctx.emit(
        || {
            format!(
                "📈 Cost projection\n\n{}",
                render_table("New Cost per Parcel by Scenario", &projections)
            )
        },
        &projections,
    )
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_writes_one_row_per_scenario() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir, &sample_rows());

        run(&quiet(&config)).unwrap();

        let csv = read(dir.path().join(PROJECTION_FILE));
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "average_volume_increase_per_day,original_avg_delivery_time,improved_avg_delivery_time,original_total_volume,new_total_volume,original_total_cost,new_cost_per_parcel,volume_increase_percentage,delivery_time_reduction,scenario"
        );
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("0.01,5.0,4.5,4,"));
        assert!(lines[1].ends_with(",pessimistic"));
        assert!(lines[2].ends_with(",neutral"));
        assert!(lines[3].ends_with(",optimistic"));
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir, &[]);

        let err = run(&quiet(&config)).unwrap_err();
        assert!(err.to_string().contains("no shipments"));
        assert!(!dir.path().join(PROJECTION_FILE).exists());
    }
}
