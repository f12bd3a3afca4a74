use crate::clean::{clip_pressure, ensure_non_negative};
use crate::integrate::{trapezoid, trapezoid_from};
use crate::model::{RunMetrics, RunSeries};
use anyhow::{Context, Result, bail};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Convert an energy value from watt-seconds to watt-hours.
pub fn ws_to_wh(energy_ws: f64) -> f64 {
    energy_ws / SECONDS_PER_HOUR
}

/// Convert an energy value from watt-hours to watt-seconds.
pub fn wh_to_ws(energy_wh: f64) -> f64 {
    energy_wh * SECONDS_PER_HOUR
}

/// Service loss in percent: how far the delivered pressure integral falls
/// short of the target integral over the same span.
pub fn service_loss_percent(fill_integral: f64, target_integral: f64) -> Result<f64> {
    if !(target_integral > 0.0) {
        bail!("target integral must be positive, but is {target_integral}");
    }
    Ok(100.0 * (1.0 - fill_integral / target_integral))
}

/// Derive the metrics of a single run.
///
/// The pressure series is clipped to `[floor, setpoint]` and integrated from
/// the disruption onset against the constant setpoint over the same span;
/// both pump power channels are verified non-negative and integrated over the
/// full series. Any fault aborts the run with an error.
pub fn evaluate_run(run: &RunSeries, setpoint: f64, floor: f64) -> Result<RunMetrics> {
    if !setpoint.is_finite() || setpoint <= floor {
        bail!("setpoint {setpoint} is not above the pressure floor {floor}");
    }

    ensure_non_negative("pump_1_power", &run.pump_1_power)?;
    ensure_non_negative("pump_2_power", &run.pump_2_power)?;

    let fill = clip_pressure(&run.tank_pressure, floor, setpoint);
    let fill_integral = trapezoid_from(&fill, &run.time, run.onset_index)
        .context("failed to integrate tank pressure")?;

    let target = vec![setpoint; run.tank_pressure.len()];
    let target_integral = trapezoid_from(&target, &run.time, run.onset_index)
        .context("failed to integrate target pressure")?;

    let service_loss_pct = service_loss_percent(fill_integral, target_integral)
        .context("failed to calculate service loss")?;

    let energy_ws = trapezoid(&run.pump_1_power, &run.time)
        .context("failed to integrate pump 1 power")?
        + trapezoid(&run.pump_2_power, &run.time)
            .context("failed to integrate pump 2 power")?;
    let energy_wh = ws_to_wh(energy_ws);

    Ok(RunMetrics {
        service_loss_pct,
        energy_wh,
    })
}
