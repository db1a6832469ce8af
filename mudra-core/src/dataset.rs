//! Dataset index: which recorded video carries which label
//!
//! Two on-disk shapes are accepted:
//! - a CSV with (at least) `video_name` and `label` columns
//! - the filtered WLASL JSON, `[{"gloss": .., "instances": [{"video_id": ..}]}]`

use crate::error::Error;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// One row of the dataset index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetEntry {
    pub video_name: String,
    pub label: String,
}

/// Rows in file order
#[derive(Debug, Clone, Default)]
pub struct DatasetIndex {
    entries: Vec<DatasetEntry>,
}

#[derive(Deserialize)]
struct FilteredGloss {
    gloss: String,
    #[serde(default)]
    instances: Vec<FilteredInstance>,
}

#[derive(Deserialize)]
struct FilteredInstance {
    video_id: String,
}

impl DatasetIndex {
    pub fn new(entries: Vec<DatasetEntry>) -> Self {
        Self { entries }
    }

    /// Load by extension: `.json` is the filtered WLASL index, anything else CSV
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            Self::from_filtered_wlasl_json(path)
        } else {
            Self::from_csv_path(path)
        }
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::MappingIo {
            path: path.to_path_buf(),
            source: e,
        })?;
        let index = Self::from_csv_reader(file).map_err(|e| match e {
            Error::MappingParse { message, .. } => Error::MappingParse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        debug!("Loaded {} dataset rows from {}", index.len(), path.display());
        Ok(index)
    }

    pub fn from_csv_reader<R: std::io::Read>(reader: R) -> Result<Self, Error> {
        let parse_err = |message: String| Error::MappingParse {
            path: "<csv>".into(),
            message,
        };

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = rdr
            .headers()
            .map_err(|e| parse_err(e.to_string()))?
            .clone();

        let column = |name: &str| headers.iter().position(|h| h == name);
        let (video_col, label_col) = match (column("video_name"), column("label")) {
            (Some(v), Some(l)) => (v, l),
            _ => {
                let found: Vec<&str> = headers.iter().collect();
                return Err(parse_err(format!(
                    "expected columns 'video_name' and 'label', found: {:?}",
                    found
                )));
            }
        };

        let mut entries = Vec::new();
        for (line, record) in rdr.records().enumerate() {
            let record = record.map_err(|e| parse_err(format!("row {}: {}", line + 1, e)))?;
            let (Some(video_name), Some(label)) = (record.get(video_col), record.get(label_col))
            else {
                return Err(parse_err(format!("row {}: missing fields", line + 1)));
            };
            if video_name.is_empty() || label.is_empty() {
                continue;
            }
            entries.push(DatasetEntry {
                video_name: video_name.to_string(),
                label: label.to_string(),
            });
        }

        Ok(Self { entries })
    }

    pub fn from_filtered_wlasl_json(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::MappingIo {
            path: path.to_path_buf(),
            source: e,
        })?;
        let glosses: Vec<FilteredGloss> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::MappingParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let entries = glosses
            .into_iter()
            .flat_map(|g| {
                let label = g.gloss;
                g.instances.into_iter().map(move |i| DatasetEntry {
                    video_name: i.video_id,
                    label: label.clone(),
                })
            })
            .collect::<Vec<_>>();

        debug!("Loaded {} dataset rows from {}", entries.len(), path.display());
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[DatasetEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &DatasetEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
