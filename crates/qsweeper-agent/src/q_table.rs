use std::{
    collections::{BTreeMap, HashMap},
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::StateKey;

/// Error returned when a Q-table file cannot be written or read back.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum QTableError {
    #[display("failed to access Q-table file {}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("malformed Q-table file {}", path.display())]
    Format {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl QTableError {
    /// Whether the error means the file does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// Expected reward per state key.
///
/// Keys that were never updated read as `0.0`. On disk the table is a flat
/// JSON object mapping key strings to numbers, sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QTable {
    values: HashMap<StateKey, f64>,
}

impl QTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the Q-value of `key`, or `0.0` if it was never stored.
    #[must_use]
    pub fn get(&self, key: &StateKey) -> f64 {
        self.values.get(key).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, key: StateKey, value: f64) {
        self.values.insert(key, value);
    }

    #[must_use]
    pub fn contains(&self, key: &StateKey) -> bool {
        self.values.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, f64)> + '_ {
        self.values.iter().map(|(key, value)| (key, *value))
    }

    /// Writes the table to `path` as JSON.
    ///
    /// The table is first written to a sibling temporary file which then
    /// replaces `path`, so a crash never leaves a truncated table behind. On
    /// failure the temporary file is removed and `path` is left as it was.
    pub fn save(&self, path: &Path) -> Result<(), QTableError> {
        let tmp_path = path.with_extension("json.tmp");
        let result = self.write_json(&tmp_path).and_then(|()| {
            fs::rename(&tmp_path, path).map_err(|source| QTableError::Io {
                path: path.to_owned(),
                source,
            })
        });
        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        result
    }

    fn write_json(&self, path: &Path) -> Result<(), QTableError> {
        let io_err = |source: io::Error| QTableError::Io {
            path: path.to_owned(),
            source,
        };

        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        let sorted = self.values.iter().collect::<BTreeMap<_, _>>();
        serde_json::to_writer_pretty(&mut writer, &sorted).map_err(|source| {
            QTableError::Format {
                path: path.to_owned(),
                source,
            }
        })?;
        writer.write_all(b"\n").map_err(io_err)?;
        writer.flush().map_err(io_err)
    }

    /// Reads a table previously written by [`QTable::save`].
    pub fn open(path: &Path) -> Result<Self, QTableError> {
        let file = File::open(path).map_err(|source| QTableError::Io {
            path: path.to_owned(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| QTableError::Format {
            path: path.to_owned(),
            source,
        })
    }
}
