use crate::config::Config;
use crate::metrics;
use crate::model::{GroupRecord, PlotMeta, ResultTable, RunSeries};
use crate::stats::Accumulator;
use crate::store::Store;
use anyhow::{Context, Result, bail};

/// Name of a run node inside a group (`run_01` .. `run_NN`, 1-based).
pub fn run_name(run_idx: usize) -> String {
    format!("run_{run_idx:02}")
}

/// Computes the result table from a loaded measurement store.
///
/// Fault policy: a missing run or dataset is skipped with a warning, a
/// data-quality fault (negative power, broken time axis) discards the run
/// with an error report, and a group where no run survives fails the whole
/// analysis. Nothing is ever replaced by a placeholder value.
pub struct Analyzer<'a> {
    cfg: &'a Config,
    store: &'a Store,
}

impl<'a> Analyzer<'a> {
    pub fn new(cfg: &'a Config, store: &'a Store) -> Self {
        Self { cfg, store }
    }

    pub fn analyze(&self) -> Result<ResultTable> {
        let mut records = Vec::new();

        for group in self.cfg.group_names() {
            if !self.cfg.considered_groups.contains(&group) {
                continue;
            }

            let record = self
                .analyze_group(&group)
                .with_context(|| format!("failed to analyze group {group:?}"))?;
            if let Some(record) = record {
                records.push(record);
            }
        }

        if records.is_empty() {
            bail!("no considered group produced results");
        }

        Ok(ResultTable {
            meta: PlotMeta::comparison(),
            records,
        })
    }

    fn analyze_group(&self, group: &str) -> Result<Option<GroupRecord>> {
        let setpoint = match self.store.attr(group, "setpoint") {
            Ok(attr) => attr.as_f64().context("invalid setpoint attribute")?,
            Err(_) => {
                log::warn!("no setpoint found for group {group:?}, skipping group");
                return Ok(None);
            }
        };

        let mut service_loss = Accumulator::new();
        let mut energy = Accumulator::new();

        for run_idx in 1..=self.cfg.runs_per_group {
            let run = run_name(run_idx);
            let Some(series) = self.load_run(group, &run) else {
                continue;
            };

            match metrics::evaluate_run(&series, setpoint, self.cfg.pressure_floor) {
                Ok(run_metrics) => {
                    service_loss.add(run_metrics.service_loss_pct);
                    energy.add(run_metrics.energy_wh);
                }
                Err(error) => {
                    log::error!("data-quality fault in {group}/{run}, run discarded: {error:#}");
                }
            }
        }

        if service_loss.count() == 0 {
            bail!("no usable runs");
        }
        log::info!(
            "analyzed {group}: {}/{} usable runs",
            service_loss.count(),
            self.cfg.runs_per_group
        );

        Ok(Some(GroupRecord {
            group: group.to_string(),
            service_loss: service_loss.report(),
            energy: energy.report(),
            n_runs: service_loss.count(),
        }))
    }

    fn load_run(&self, group: &str, run: &str) -> Option<RunSeries> {
        let base = format!("{group}/{run}");

        if !self.store.contains(&base) {
            log::warn!("missing run {base}, skipping run");
            return None;
        }

        let onset_index = match self.store.attr(&base, "analyse_start_time_index") {
            Ok(attr) => match attr.as_index() {
                Ok(index) => index,
                Err(error) => {
                    log::warn!("invalid onset index in {base}: {error:#}, skipping run");
                    return None;
                }
            },
            Err(_) => {
                log::warn!("missing onset index in {base}, skipping run");
                return None;
            }
        };

        let read = |name: &str| -> Option<Vec<f64>> {
            match self.store.dataset(&format!("{base}/{name}")) {
                Ok(data) => Some(data.to_vec()),
                Err(_) => {
                    log::warn!("missing data in {base}: no {name} dataset, skipping run");
                    None
                }
            }
        };

        Some(RunSeries {
            time: read("time")?,
            tank_pressure: read("tank_1_pressure")?,
            pump_1_power: read("pump_1_power")?,
            pump_2_power: read("pump_2_power")?,
            onset_index,
        })
    }
}
