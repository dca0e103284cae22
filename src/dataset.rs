//! Player dataset loading and re-export
//!
//! Reads the Cookie Cats player table from CSV. A missing file is not an
//! error: [`DatasetLoader::load`] returns `Ok(None)` so callers can show a
//! "no data" message instead of failing.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

use crate::{Error, Result};

/// One row of the player table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    #[serde(alias = "userid")]
    pub player_id: u64,
    pub version: String,
    pub sum_gamerounds: u32,
    #[serde(
        deserialize_with = "deserialize_flag",
        serialize_with = "serialize_flag"
    )]
    pub retention_1: bool,
    #[serde(
        deserialize_with = "deserialize_flag",
        serialize_with = "serialize_flag"
    )]
    pub retention_7: bool,
}

impl PlayerRecord {
    pub fn new(
        player_id: u64,
        version: impl Into<String>,
        sum_gamerounds: u32,
        retention_1: bool,
        retention_7: bool,
    ) -> Self {
        Self {
            player_id,
            version: version.into(),
            sum_gamerounds,
            retention_1,
            retention_7,
        }
    }
}

/// Accepts pandas-style `True`/`False` as well as `true`/`false` and `1`/`0`.
fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let raw = String::deserialize(deserializer)?;
    match raw.trim() {
        "True" | "true" | "TRUE" | "1" => Ok(true),
        "False" | "false" | "FALSE" | "0" => Ok(false),
        other => Err(D::Error::custom(format!(
            "expected boolean flag, got {:?}",
            other
        ))),
    }
}

fn serialize_flag<S>(value: &bool, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(if *value { "True" } else { "False" })
}

/// In-memory player table. Never mutated after load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerTable {
    records: Vec<PlayerRecord>,
}

impl PlayerTable {
    pub fn from_records(records: Vec<PlayerRecord>) -> Self {
        Self { records }
    }

    /// Parse a table from any CSV reader with a header row.
    pub fn read_csv<R: io::Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let records = reader
            .deserialize::<PlayerRecord>()
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { records })
    }

    /// Write all columns in source order so the table round-trips.
    ///
    /// The id column is always written as `player_id`, also for tables read
    /// from a file with the Kaggle `userid` header.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Export to a file path. Header naming follows [`PlayerTable::write_csv`].
    pub fn export<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        self.write_csv(file)?;
        info!(
            path = %path.as_ref().display(),
            rows = self.records.len(),
            "Exported player table"
        );
        Ok(())
    }

    pub fn records(&self) -> &[PlayerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct `version` labels, sorted.
    pub fn variants(&self) -> BTreeSet<&str> {
        self.records.iter().map(|r| r.version.as_str()).collect()
    }
}

/// Reads the player table once and serves the cached outcome afterwards.
///
/// Both outcomes are cached: a missing file stays missing for the lifetime
/// of the loader, matching a process-wide data cache.
pub struct DatasetLoader {
    path: PathBuf,
    cache: OnceLock<Option<Arc<PlayerTable>>>,
}

impl DatasetLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the table, or `Ok(None)` when the source file does not exist.
    pub fn load(&self) -> Result<Option<Arc<PlayerTable>>> {
        if let Some(cached) = self.cache.get() {
            return Ok(cached.clone());
        }

        let loaded = read_source(&self.path)?;
        Ok(self.cache.get_or_init(|| loaded).clone())
    }

    pub fn is_cached(&self) -> bool {
        self.cache.get().is_some()
    }
}

fn read_source(path: &Path) -> Result<Option<Arc<PlayerTable>>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "Dataset file not found");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let table = PlayerTable::read_csv(file)
        .map_err(|e| Error::Dataset(format!("{}: {}", path.display(), e)))?;

    info!(
        path = %path.display(),
        rows = table.len(),
        variants = table.variants().len(),
        "Loaded player table"
    );

    Ok(Some(Arc::new(table)))
}
