use anyhow::{Result, bail};

/// Definite integral of irregularly sampled values via the trapezoidal rule.
///
/// `values` and `times` must have equal length and the time axis must be
/// strictly increasing. Fewer than two samples integrate to zero.
pub fn trapezoid(values: &[f64], times: &[f64]) -> Result<f64> {
    if values.len() != times.len() {
        bail!(
            "values and times have different lengths ({} vs {})",
            values.len(),
            times.len()
        );
    }
    sum_trapezoids(values, times, 0)
}

/// Integrate the tail of a series starting at sample `start`.
///
/// A start index at or past the end of the series integrates to zero.
pub fn trapezoid_from(values: &[f64], times: &[f64], start: usize) -> Result<f64> {
    if values.len() != times.len() {
        bail!(
            "values and times have different lengths ({} vs {})",
            values.len(),
            times.len()
        );
    }
    if start >= values.len() {
        return Ok(0.0);
    }
    sum_trapezoids(&values[start..], &times[start..], start)
}

// `offset` keeps reported sample indices relative to the original series.
fn sum_trapezoids(values: &[f64], times: &[f64], offset: usize) -> Result<f64> {
    let mut integral = 0.0;
    for idx in 0..values.len().saturating_sub(1) {
        let dt = times[idx + 1] - times[idx];
        if dt <= 0.0 {
            bail!(
                "time axis is not strictly increasing at sample {}",
                offset + idx
            );
        }
        integral += 0.5 * (values[idx] + values[idx + 1]) * dt;
    }
    Ok(integral)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_integrates_to_value_times_span() {
        let times = [0.0, 0.3, 1.1, 1.2, 4.7];
        let values = [2.5; 5];
        let integral = trapezoid(&values, &times).unwrap();
        assert!((integral - 2.5 * (4.7 - 0.0)).abs() < 1e-12);
    }

    #[test]
    fn two_point_ramp() {
        let integral = trapezoid(&[0.0, 2.0], &[0.0, 1.0]).unwrap();
        assert_eq!(integral, 1.0);
    }

    #[test]
    fn short_series_integrates_to_zero() {
        assert_eq!(trapezoid(&[], &[]).unwrap(), 0.0);
        assert_eq!(trapezoid(&[3.0], &[0.0]).unwrap(), 0.0);
    }

    #[test]
    fn start_past_end_integrates_to_zero() {
        let times = [0.0, 1.0, 2.0];
        let values = [1.0, 1.0, 1.0];
        assert_eq!(trapezoid_from(&values, &times, 3).unwrap(), 0.0);
        assert_eq!(trapezoid_from(&values, &times, 99).unwrap(), 0.0);
    }

    #[test]
    fn tail_matches_manual_sum() {
        let times = [0.0, 0.5, 1.5, 2.0];
        let values = [1.0, 3.0, 2.0, 4.0];
        let tail = trapezoid_from(&values, &times, 1).unwrap();
        let expected = 0.5 * (3.0 + 2.0) * 1.0 + 0.5 * (2.0 + 4.0) * 0.5;
        assert!((tail - expected).abs() < 1e-12);
    }

    #[test]
    fn length_mismatch_is_an_error() {
        assert!(trapezoid(&[1.0, 2.0], &[0.0]).is_err());
        assert!(trapezoid_from(&[1.0, 2.0], &[0.0], 0).is_err());
    }

    #[test]
    fn non_increasing_time_axis_is_an_error() {
        assert!(trapezoid(&[1.0, 1.0], &[0.0, 0.0]).is_err());
        assert!(trapezoid(&[1.0, 1.0, 1.0], &[0.0, 1.0, 0.5]).is_err());
    }

    #[test]
    fn tail_fault_reports_the_original_sample_index() {
        let times = [0.0, 1.0, 2.0, 1.5];
        let values = [1.0; 4];
        let err = trapezoid_from(&values, &times, 1).unwrap_err();
        assert!(format!("{err}").contains("sample 2"));
    }
}
