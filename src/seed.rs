use crate::analysis::run_name;
use crate::config::Config;
use crate::store::{Attr, Store};
use anyhow::Result;
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::{LogNormal, Normal, Uniform};

const SAMPLES_PER_RUN: usize = 600;
const RUN_DURATION_S: f64 = 120.0;
const SETPOINT_BAR: f64 = 1.8;
const PUMP_1_BASE_W: f64 = 42.0;
const PUMP_2_BASE_W: f64 = 38.0;

/// Generate a synthetic measurement store covering every considered group.
///
/// Each run gets a jittered non-uniform time axis, a pressure trace that
/// rises towards the setpoint and dips after a sampled disruption onset, and
/// two non-negative pump power traces.
pub fn generate(cfg: &Config) -> Result<Store> {
    let mut rng = ChaCha12Rng::try_from_os_rng()?;
    let mut store = Store::new();

    let dt_mean = RUN_DURATION_S / SAMPLES_PER_RUN as f64;
    let dt_dist = LogNormal::new(dt_mean.ln(), 0.2)?;
    let onset_dist = Uniform::new(SAMPLES_PER_RUN / 3, SAMPLES_PER_RUN / 2)?;
    let pressure_noise = Normal::new(0.0, 0.005 * SETPOINT_BAR)?;
    let power_noise = Normal::new(0.0, 1.5)?;

    for group in cfg.group_names() {
        if !cfg.considered_groups.contains(&group) {
            continue;
        }

        store.put_attr(&group, "setpoint", Attr::Float(SETPOINT_BAR));
        store.put_attr(&group, "pressure_unit", Attr::Text("bar".to_string()));
        store.put_attr(&group, "power_unit", Attr::Text("W".to_string()));
        store.put_attr(&group, "time_unit", Attr::Text("s".to_string()));

        for run_idx in 1..=cfg.runs_per_group {
            let base = format!("{group}/{}", run_name(run_idx));
            let onset = onset_dist.sample(&mut rng);

            let mut time = Vec::with_capacity(SAMPLES_PER_RUN);
            let mut now = 0.0;
            for _ in 0..SAMPLES_PER_RUN {
                time.push(now);
                now += dt_dist.sample(&mut rng);
            }

            // First-order rise towards the setpoint, then a disruption dip
            // decaying back after the onset sample.
            let mut pressure = Vec::with_capacity(SAMPLES_PER_RUN);
            for idx in 0..SAMPLES_PER_RUN {
                let mut val = SETPOINT_BAR * (1.0 - (-(idx as f64) / 40.0).exp());
                if idx >= onset {
                    val -= 0.2 * SETPOINT_BAR * (-((idx - onset) as f64) / 80.0).exp();
                }
                pressure.push(val + pressure_noise.sample(&mut rng));
            }

            let mut pump_power = |base_w: f64| -> Vec<f64> {
                (0..SAMPLES_PER_RUN)
                    .map(|_| (base_w + power_noise.sample(&mut rng)).max(0.0))
                    .collect()
            };
            let pump_1 = pump_power(PUMP_1_BASE_W);
            let pump_2 = pump_power(PUMP_2_BASE_W);

            store.put_attr(&base, "analyse_start_time_index", Attr::Int(onset as i64));
            store.put_dataset(&format!("{base}/time"), time)?;
            store.put_dataset(&format!("{base}/tank_1_pressure"), pressure)?;
            store.put_dataset(&format!("{base}/pump_1_power"), pump_1)?;
            store.put_dataset(&format!("{base}/pump_2_power"), pump_2)?;
        }
    }

    Ok(store)
}
