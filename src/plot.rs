use crate::model::{GroupRecord, ResultTable};
use anyhow::{Result, anyhow};
use plotters::prelude::*;
use std::{ops::Range, path::Path};

const COLORS: [RGBColor; 6] = [BLUE, RED, GREEN, MAGENTA, CYAN, BLACK];
const IMAGE_SIZE: (u32, u32) = (1024, 768);

/// Render the comparison figure: one marker per configuration at
/// (mean service loss, mean energy) with whisker error bars at one standard
/// deviation on each axis.
pub fn render_comparison(table: &ResultTable, out_path: &Path) -> Result<()> {
    let (x_range, y_range) = axis_ranges(&table.records);

    let root = SVGBackend::new(out_path, IMAGE_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Service loss vs energy consumption", ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.clone(), y_range.clone())
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .x_desc(format!("{} ({})", table.meta.x_label, table.meta.x_unit))
        .y_desc(format!("{} ({})", table.meta.y_label, table.meta.y_unit))
        .draw()
        .map_err(draw_err)?;

    let x_cap = 0.01 * (x_range.end - x_range.start);
    let y_cap = 0.01 * (y_range.end - y_range.start);

    for (idx, record) in table.records.iter().enumerate() {
        let color = COLORS[idx % COLORS.len()];
        let (x, y) = (record.service_loss.mean, record.energy.mean);
        // A NaN deviation (single-run group) draws as a bare marker.
        let sx = record.service_loss.std_dev.max(0.0);
        let sy = record.energy.std_dev.max(0.0);

        let whiskers = [
            vec![(x - sx, y), (x + sx, y)],
            vec![(x - sx, y - y_cap), (x - sx, y + y_cap)],
            vec![(x + sx, y - y_cap), (x + sx, y + y_cap)],
            vec![(x, y - sy), (x, y + sy)],
            vec![(x - x_cap, y - sy), (x + x_cap, y - sy)],
            vec![(x - x_cap, y + sy), (x + x_cap, y + sy)],
        ];
        for whisker in whiskers {
            chart
                .draw_series(std::iter::once(PathElement::new(whisker, color.mix(0.8))))
                .map_err(draw_err)?;
        }

        chart
            .draw_series(std::iter::once(Circle::new((x, y), 4, color.filled())))
            .map_err(draw_err)?
            .label(record.group.clone())
            .legend(move |(lx, ly)| Circle::new((lx + 10, ly), 4, color.filled()));
    }

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.85))
        .draw()
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    Ok(())
}

fn axis_ranges(records: &[GroupRecord]) -> (Range<f64>, Range<f64>) {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;

    for record in records {
        let sx = record.service_loss.std_dev.max(0.0);
        let sy = record.energy.std_dev.max(0.0);
        x_min = x_min.min(record.service_loss.mean - sx);
        x_max = x_max.max(record.service_loss.mean + sx);
        y_min = y_min.min(record.energy.mean - sy);
        y_max = y_max.max(record.energy.mean + sy);
    }

    (padded(x_min, x_max), padded(y_min, y_max))
}

fn padded(min: f64, max: f64) -> Range<f64> {
    if !min.is_finite() || !max.is_finite() {
        return -1.0..1.0;
    }
    let span = max - min;
    if span < 1e-9 {
        return (min - 1.0)..(max + 1.0);
    }
    (min - 0.1 * span)..(max + 0.1 * span)
}

fn draw_err<E: std::fmt::Display>(error: E) -> anyhow::Error {
    anyhow!("failed to render plot: {error}")
}
