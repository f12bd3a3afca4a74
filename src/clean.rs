use anyhow::{Result, bail};

/// Clip pressure readings to the physically valid range `[floor, setpoint]`.
///
/// Out-of-range values are set to the nearest bound; in-range values pass
/// through unchanged, so clipping is idempotent.
pub fn clip_pressure(series: &[f64], floor: f64, setpoint: f64) -> Vec<f64> {
    series
        .iter()
        .map(|&val| val.min(setpoint).max(floor))
        .collect()
}

/// Verify that every reading in a power series is non-negative.
///
/// A negative reading is a data-quality fault and must surface as an error,
/// never be corrected silently.
pub fn ensure_non_negative(name: &str, series: &[f64]) -> Result<()> {
    for (idx, &val) in series.iter().enumerate() {
        if val < 0.0 {
            bail!("negative reading in {name}: {val} at sample {idx}");
        }
    }
    Ok(())
}
