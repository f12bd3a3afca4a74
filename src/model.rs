//! Measurement and result data types.

use crate::stats::Aggregate;
use crate::store::{Attr, Store};
use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Measurement series of a single experimental run.
///
/// All series share the non-uniform `time` axis; `onset_index` marks the
/// sample at which the disruption scenario begins.
#[derive(Debug, Clone)]
pub struct RunSeries {
    pub time: Vec<f64>,
    pub tank_pressure: Vec<f64>,
    pub pump_1_power: Vec<f64>,
    pub pump_2_power: Vec<f64>,
    pub onset_index: usize,
}

/// Derived metrics of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub service_loss_pct: f64,
    pub energy_wh: f64,
}

/// Aggregated metrics of one configuration group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub group: String,
    pub service_loss: Aggregate,
    pub energy: Aggregate,
    /// Number of runs that contributed to the aggregates.
    pub n_runs: usize,
}

/// Plot and provenance metadata attached to a result table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotMeta {
    pub legend_title: String,
    pub x_label: String,
    pub x_unit: String,
    pub y_label: String,
    pub y_unit: String,
    pub generated_at: String,
    pub tool_version: String,
}

impl PlotMeta {
    /// Metadata for the service-loss vs energy-consumption comparison.
    pub fn comparison() -> Self {
        Self {
            legend_title: "Configuration".to_string(),
            x_label: "Service loss".to_string(),
            x_unit: "%".to_string(),
            y_label: "Energy consumption".to_string(),
            y_unit: "Wh".to_string(),
            generated_at: Utc::now().to_rfc3339(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Ordered per-configuration results plus metadata, sufficient to regenerate
/// the comparison plot without recomputation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    pub meta: PlotMeta,
    pub records: Vec<GroupRecord>,
}

impl ResultTable {
    /// Archive the table and its metadata to a store file.
    pub fn archive<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let mut store = Store::new();

        store.put_attr("results", "legend_title", Attr::Text(self.meta.legend_title.clone()));
        store.put_attr("results", "x_label", Attr::Text(self.meta.x_label.clone()));
        store.put_attr("results", "x_unit", Attr::Text(self.meta.x_unit.clone()));
        store.put_attr("results", "y_label", Attr::Text(self.meta.y_label.clone()));
        store.put_attr("results", "y_unit", Attr::Text(self.meta.y_unit.clone()));
        store.put_attr("results", "generated_at", Attr::Text(self.meta.generated_at.clone()));
        store.put_attr("results", "tool_version", Attr::Text(self.meta.tool_version.clone()));

        for (order, record) in self.records.iter().enumerate() {
            let path = format!("results/{}", record.group);
            store.put_attr(&path, "order", Attr::Int(order as i64));
            store.put_attr(&path, "service_loss_mean", Attr::Float(record.service_loss.mean));
            store.put_attr(&path, "service_loss_std", Attr::Float(record.service_loss.std_dev));
            store.put_attr(&path, "energy_mean", Attr::Float(record.energy.mean));
            store.put_attr(&path, "energy_std", Attr::Float(record.energy.std_dev));
            store.put_attr(&path, "n_runs", Attr::Int(record.n_runs as i64));
        }

        store.save(file).context("failed to save result table")?;
        Ok(())
    }

    /// Retrieve an archived table; the exact inverse of [`ResultTable::archive`].
    pub fn retrieve<P: AsRef<Path>>(file: P) -> Result<Self> {
        let store = Store::load(file).context("failed to load result table")?;

        let text = |key: &str| -> Result<String> {
            Ok(store.attr("results", key)?.as_text()?.to_string())
        };
        let meta = PlotMeta {
            legend_title: text("legend_title")?,
            x_label: text("x_label")?,
            x_unit: text("x_unit")?,
            y_label: text("y_label")?,
            y_unit: text("y_unit")?,
            generated_at: text("generated_at")?,
            tool_version: text("tool_version")?,
        };

        let mut ordered = Vec::new();
        for group in store.child_names("results")? {
            let path = format!("results/{group}");
            let float = |key: &str| -> Result<f64> { store.attr(&path, key)?.as_f64() };

            let order = store.attr(&path, "order")?.as_index()?;
            let record = GroupRecord {
                group: group.clone(),
                service_loss: Aggregate {
                    mean: float("service_loss_mean")?,
                    std_dev: float("service_loss_std")?,
                },
                energy: Aggregate {
                    mean: float("energy_mean")?,
                    std_dev: float("energy_std")?,
                },
                n_runs: store.attr(&path, "n_runs")?.as_index()?,
            };
            ordered.push((order, record));
        }
        ordered.sort_by_key(|(order, _)| *order);

        Ok(Self {
            meta,
            records: ordered.into_iter().map(|(_, record)| record).collect(),
        })
    }
}
