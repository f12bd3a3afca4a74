use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Analysis configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Control strategy names.
    pub controllers: Vec<String>,
    /// Rig topology names.
    pub topologies: Vec<String>,
    /// Disruption scenario names.
    pub disruptions: Vec<String>,

    /// Subset of enumerated group names to analyze.
    pub considered_groups: Vec<String>,

    /// Number of repeated trials per group.
    pub runs_per_group: usize,

    /// Lower physical bound for tank pressure; the upper bound is the
    /// per-group setpoint read from the measurement store.
    pub pressure_floor: f64,

    /// Prefix for published artifact directories.
    pub publish_prefix: String,
}

impl Config {
    /// Load a [`Config`] from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        let config: Config = toml::from_str(&contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    /// Enumerate every group name as `{controller}_{topology}_{disruption}`,
    /// controller-major.
    pub fn group_names(&self) -> Vec<String> {
        let mut names =
            Vec::with_capacity(self.controllers.len() * self.topologies.len() * self.disruptions.len());
        for controller in &self.controllers {
            for topology in &self.topologies {
                for disruption in &self.disruptions {
                    names.push(format!("{controller}_{topology}_{disruption}"));
                }
            }
        }
        names
    }

    fn validate(&self) -> Result<()> {
        check_names(&self.controllers).context("invalid controllers")?;
        check_names(&self.topologies).context("invalid topologies")?;
        check_names(&self.disruptions).context("invalid disruptions")?;

        let names = self.group_names();
        if self.considered_groups.is_empty() {
            bail!("considered groups must not be empty");
        }
        for group in &self.considered_groups {
            if !names.contains(group) {
                bail!("considered group {group:?} is not an enumerated group name");
            }
        }

        check_num(self.runs_per_group, 1..1000).context("invalid number of runs per group")?;

        if !self.pressure_floor.is_finite() || self.pressure_floor < 0.0 {
            bail!(
                "pressure floor must be finite and non-negative, but is {}",
                self.pressure_floor
            );
        }

        if self.publish_prefix.is_empty() || self.publish_prefix.contains('/') {
            bail!("publish prefix must be non-empty and must not contain '/'");
        }

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

fn check_names(names: &[String]) -> Result<()> {
    if names.is_empty() {
        bail!("name list must not be empty");
    }
    // Group names are joined with '_' and addressed with '/' in the store,
    // so neither may appear in a component name.
    for name in names {
        if name.is_empty() {
            bail!("name must not be empty");
        }
        if name.contains(['_', '/']) {
            bail!("name {name:?} must not contain '_' or '/'");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            controllers: vec!["ARIMA".to_string(), "PID".to_string()],
            topologies: vec!["Central".to_string(), "Decentral".to_string()],
            disruptions: vec!["PumpOutage".to_string(), "NoDisruption".to_string()],
            considered_groups: vec!["PID_Central_PumpOutage".to_string()],
            runs_per_group: 10,
            pressure_floor: 0.0,
            publish_prefix: "testrig".to_string(),
        }
    }

    #[test]
    fn group_names_are_the_full_cartesian_product() {
        let cfg = valid_config();
        let names = cfg.group_names();
        assert_eq!(names.len(), 8);
        assert_eq!(names[0], "ARIMA_Central_PumpOutage");
        assert_eq!(names[7], "PID_Decentral_NoDisruption");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn unknown_considered_group_is_rejected() {
        let mut cfg = valid_config();
        cfg.considered_groups = vec!["DTW_Central_PumpOutage".to_string()];
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn component_names_must_not_break_group_naming() {
        let mut cfg = valid_config();
        cfg.topologies = vec!["Semi_Central".to_string()];
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn negative_pressure_floor_is_rejected() {
        let mut cfg = valid_config();
        cfg.pressure_floor = -0.1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn config_parses_from_toml() {
        let contents = r#"
controllers = ["PID"]
topologies = ["Central"]
disruptions = ["PumpOutage"]
considered_groups = ["PID_Central_PumpOutage"]
runs_per_group = 10
pressure_floor = 0.0
publish_prefix = "testrig"
"#;
        let cfg: Config = toml::from_str(contents).unwrap();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.group_names(), vec!["PID_Central_PumpOutage"]);
    }
}
