use anyhow::{Context, Result, bail};
use rmp_serde::{decode, encode};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

/// Scalar attribute attached to a store node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Attr {
    Float(f64),
    Int(i64),
    Text(String),
}

impl Attr {
    pub fn as_f64(&self) -> Result<f64> {
        match self {
            Attr::Float(val) => Ok(*val),
            Attr::Int(val) => Ok(*val as f64),
            Attr::Text(text) => bail!("attribute is text ({text:?}), not numeric"),
        }
    }

    pub fn as_index(&self) -> Result<usize> {
        match self {
            Attr::Int(val) if *val >= 0 => Ok(*val as usize),
            other => bail!("attribute {other:?} is not a valid index"),
        }
    }

    pub fn as_text(&self) -> Result<&str> {
        match self {
            Attr::Text(text) => Ok(text),
            other => bail!("attribute {other:?} is not text"),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct Node {
    attrs: BTreeMap<String, Attr>,
    datasets: BTreeMap<String, Vec<f64>>,
    children: BTreeMap<String, Node>,
}

/// Hierarchical keyed container for named numeric arrays and scalar metadata.
///
/// Nodes are addressed with `/`-separated paths
/// (e.g. `"PID_Central_BlockageConstant/run_03"`); a dataset path ends in the
/// dataset name within its node. The whole tree is persisted as a single
/// MessagePack file, so a save is all-or-nothing from the caller's view.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Store {
    root: Node,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a MessagePack file.
    pub fn load<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
        let mut reader = BufReader::new(file);
        let store = decode::from_read(&mut reader).context("failed to deserialize store")?;
        Ok(store)
    }

    /// Save the store to a MessagePack file.
    pub fn save<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let mut writer = BufWriter::new(file);
        encode::write(&mut writer, self).context("failed to serialize store")?;
        writer.flush().context("failed to flush writer stream")?;
        Ok(())
    }

    /// Get the dataset at `path` (last path segment is the dataset name).
    pub fn dataset(&self, path: &str) -> Result<&[f64]> {
        let (parent, name) = split_leaf(path)?;
        let node = self.node(parent)?;
        node.datasets
            .get(name)
            .map(Vec::as_slice)
            .with_context(|| format!("no dataset {path:?} in store"))
    }

    /// Get the attribute `key` of the node at `path`.
    pub fn attr(&self, path: &str, key: &str) -> Result<&Attr> {
        let node = self.node(path)?;
        node.attrs
            .get(key)
            .with_context(|| format!("no attribute {key:?} at {path:?}"))
    }

    /// Names of the child groups of the node at `path`.
    pub fn child_names(&self, path: &str) -> Result<Vec<String>> {
        Ok(self.node(path)?.children.keys().cloned().collect())
    }

    /// Whether a node exists at `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.node(path).is_ok()
    }

    /// Insert a dataset, creating intermediate groups as needed.
    pub fn put_dataset(&mut self, path: &str, values: Vec<f64>) -> Result<()> {
        let (parent, name) = split_leaf(path)?;
        self.node_mut(parent).datasets.insert(name.to_string(), values);
        Ok(())
    }

    /// Set an attribute on the node at `path`, creating groups as needed.
    pub fn put_attr(&mut self, path: &str, key: &str, attr: Attr) {
        self.node_mut(path).attrs.insert(key.to_string(), attr);
    }

    fn node(&self, path: &str) -> Result<&Node> {
        let mut node = &self.root;
        for part in path.split('/').filter(|part| !part.is_empty()) {
            node = node
                .children
                .get(part)
                .with_context(|| format!("no group {part:?} in store path {path:?}"))?;
        }
        Ok(node)
    }

    fn node_mut(&mut self, path: &str) -> &mut Node {
        let mut node = &mut self.root;
        for part in path.split('/').filter(|part| !part.is_empty()) {
            node = node.children.entry(part.to_string()).or_default();
        }
        node
    }
}

fn split_leaf(path: &str) -> Result<(&str, &str)> {
    let path = path.trim_matches('/');
    match path.rsplit_once('/') {
        Some((parent, name)) if !name.is_empty() => Ok((parent, name)),
        None if !path.is_empty() => Ok(("", path)),
        _ => bail!("invalid store path {path:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs, path::PathBuf};

    fn temp_file(name: &str) -> PathBuf {
        env::temp_dir().join(format!("aquarig-store-{}-{name}", std::process::id()))
    }

    #[test]
    fn round_trip_is_bit_identical() {
        let mut store = Store::new();
        store.put_attr("grp", "setpoint", Attr::Float(1.8));
        store.put_attr("grp", "pressure_unit", Attr::Text("bar".to_string()));
        store.put_attr("grp/run_01", "analyse_start_time_index", Attr::Int(3));
        store
            .put_dataset("grp/run_01/time", vec![0.0, 0.1 + f64::EPSILON, 0.25])
            .unwrap();
        store
            .put_dataset("grp/run_01/tank_1_pressure", vec![1.75, 1.81, 1.79])
            .unwrap();

        let file = temp_file("round-trip.msgpack");
        store.save(&file).unwrap();
        let loaded = Store::load(&file).unwrap();
        fs::remove_file(&file).ok();

        assert_eq!(store, loaded);
        assert_eq!(
            loaded.dataset("grp/run_01/time").unwrap()[1].to_bits(),
            (0.1 + f64::EPSILON).to_bits()
        );
        assert_eq!(loaded.child_names("grp").unwrap(), vec!["run_01"]);
    }

    #[test]
    fn missing_paths_are_errors() {
        let store = Store::new();
        assert!(store.dataset("nope/time").is_err());
        assert!(store.attr("nope", "setpoint").is_err());
        assert!(store.child_names("nope").is_err());
    }

    #[test]
    fn contains_reports_node_existence() {
        let mut store = Store::new();
        store.put_attr("grp/run_01", "analyse_start_time_index", Attr::Int(0));

        assert!(store.contains("grp"));
        assert!(store.contains("grp/run_01"));
        assert!(store.contains(""));
        assert!(!store.contains("grp/run_02"));
        assert!(!store.contains("other"));
    }

    #[test]
    fn empty_path_is_rejected() {
        let mut store = Store::new();
        assert!(store.put_dataset("", vec![1.0]).is_err());
        assert!(store.dataset("/").is_err());
    }
}
