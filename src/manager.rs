use crate::analysis::Analyzer;
use crate::config::Config;
use crate::model::ResultTable;
use crate::plot;
use crate::seed;
use crate::store::Store;
use anyhow::{Context, Result};
use chrono::Local;
use glob::glob;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Orchestrates the commands over a data directory holding `config.toml`,
/// the measurement store, and the derived outputs.
pub struct Manager {
    data_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();

        let cfg =
            Config::from_file(data_dir.join("config.toml")).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self { data_dir, cfg })
    }

    /// Generate a synthetic measurement store for the considered groups.
    pub fn seed_measurements(&self) -> Result<()> {
        let store = seed::generate(&self.cfg).context("failed to generate measurements")?;

        let file = self.measurements_file();
        store
            .save(&file)
            .with_context(|| format!("failed to save {file:?}"))?;
        log::info!(
            "seeded {} groups into {file:?}",
            self.cfg.considered_groups.len()
        );

        Ok(())
    }

    /// Compute the per-group aggregates and archive the result table.
    pub fn analyze_measurements(&self) -> Result<()> {
        let file = self.measurements_file();
        let store = Store::load(&file).with_context(|| format!("failed to load {file:?}"))?;

        let table = Analyzer::new(&self.cfg, &store)
            .analyze()
            .context("failed to analyze measurements")?;

        let archive = self.archive_file();
        table
            .archive(&archive)
            .with_context(|| format!("failed to archive {archive:?}"))?;
        log::info!("archived {} group records to {archive:?}", table.records.len());

        Ok(())
    }

    /// Render the comparison plot from the archive and publish it together
    /// with the artifacts needed to regenerate it.
    pub fn plot_results(&self) -> Result<()> {
        let archive = self.archive_file();
        let table = ResultTable::retrieve(&archive)
            .with_context(|| format!("failed to retrieve {archive:?}"))?;

        let publish_dir = self.publish_dir();
        fs::create_dir_all(&publish_dir)
            .with_context(|| format!("failed to create {publish_dir:?}"))?;

        let image = publish_dir.join("comparison.svg");
        plot::render_comparison(&table, &image).context("failed to render comparison plot")?;

        for source in [archive, self.config_file()] {
            let name = source.file_name().context("source file has no name")?;
            fs::copy(&source, publish_dir.join(name))
                .with_context(|| format!("failed to copy {source:?}"))?;
        }

        log::info!("published plot and sources to {publish_dir:?}");

        Ok(())
    }

    /// Remove the archive and every published directory.
    pub fn clean_outputs(&self) -> Result<()> {
        let archive = self.archive_file();
        if archive.exists() {
            fs::remove_file(&archive).with_context(|| format!("failed to remove {archive:?}"))?;
            log::info!("removed {archive:?}");
        }

        let pattern = self
            .data_dir
            .join("publish")
            .join(format!("{}_*", self.cfg.publish_prefix));
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        for entry in glob(pattern)
            .context("failed to glob published dirs")?
            .filter_map(Result::ok)
        {
            if entry.is_dir() {
                fs::remove_dir_all(&entry)
                    .with_context(|| format!("failed to remove {entry:?}"))?;
                log::info!("removed {entry:?}");
            }
        }

        Ok(())
    }

    fn measurements_file(&self) -> PathBuf {
        self.data_dir.join("measurements.msgpack")
    }

    fn archive_file(&self) -> PathBuf {
        self.data_dir.join("results.msgpack")
    }

    fn config_file(&self) -> PathBuf {
        self.data_dir.join("config.toml")
    }

    fn publish_dir(&self) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        self.data_dir
            .join("publish")
            .join(format!("{}_{stamp}", self.cfg.publish_prefix))
    }
}
