//! Static lookup tables between gloss namespaces
//!
//! English is the pivot: every PSL gloss maps to one English gloss, and every
//! English gloss maps to the WLASL recordings labelled with it. The tables are
//! built once and only read afterwards, so a mapper can be shared across
//! threads behind an `Arc` without locking.

use crate::error::SynthesisError;
use mudra_core::{DatasetIndex, Gloss, GlossSpace};
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

/// Ordered result of a composite mapping
pub type GlossSet = Vec<Gloss>;

#[derive(Debug, Clone, Default)]
pub struct GlossMapper {
    psl_to_english: HashMap<Gloss, Gloss>,
    english_to_psl: HashMap<Gloss, BTreeSet<Gloss>>,
    english_to_videos: HashMap<Gloss, Vec<String>>,
    video_to_english: HashMap<String, Gloss>,
}

fn pivot(gloss: &str) -> Gloss {
    Gloss::new(gloss.trim().to_lowercase())
}

impl GlossMapper {
    /// Load the PSL→English JSON object and the dataset index
    pub fn load(
        mapping_json: impl AsRef<Path>,
        dataset_index: impl AsRef<Path>,
    ) -> Result<Self, SynthesisError> {
        let mapping_json = mapping_json.as_ref();
        let file = File::open(mapping_json).map_err(|e| SynthesisError::MappingIo {
            path: mapping_json.to_path_buf(),
            source: e,
        })?;
        let psl_map: HashMap<String, String> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| SynthesisError::MappingParse {
                path: mapping_json.to_path_buf(),
                message: e.to_string(),
            })?;

        let index = DatasetIndex::load(dataset_index)?;
        let mapper = Self::from_parts(psl_map, &index);
        info!(
            "Loaded gloss mapping: {} PSL glosses, {} English glosses, {} videos",
            mapper.psl_to_english.len(),
            mapper.gloss_count(),
            mapper.video_to_english.len()
        );
        Ok(mapper)
    }

    /// Build from an in-memory PSL→English table and a dataset index
    pub fn from_parts<I, P, E>(psl_map: I, index: &DatasetIndex) -> Self
    where
        I: IntoIterator<Item = (P, E)>,
        P: Into<String>,
        E: AsRef<str>,
    {
        let mut mapper = Self::default();

        for (psl, english) in psl_map {
            let psl = Gloss::new(psl);
            let english = pivot(english.as_ref());
            mapper
                .english_to_psl
                .entry(english.clone())
                .or_default()
                .insert(psl.clone());
            mapper.psl_to_english.insert(psl, english);
        }

        for entry in index.iter() {
            let english = pivot(&entry.label);
            mapper
                .english_to_videos
                .entry(english.clone())
                .or_default()
                .push(entry.video_name.clone());
            mapper
                .video_to_english
                .insert(entry.video_name.clone(), english);
        }

        debug!(
            "Gloss mapper built with {} pivot glosses",
            mapper.gloss_count()
        );
        mapper
    }

    pub fn psl_to_english(&self, gloss: &str) -> Option<&Gloss> {
        self.psl_to_english.get(gloss)
    }

    /// PSL glosses sharing the English gloss; more than one means the word
    /// needs disambiguation
    pub fn english_to_psl(&self, gloss: &str) -> BTreeSet<Gloss> {
        self.english_to_psl
            .get(pivot(gloss).as_str())
            .cloned()
            .unwrap_or_default()
    }

    /// Recordings labelled with `gloss`, in dataset order
    pub fn english_to_wlasl_videos(&self, gloss: &str) -> &[String] {
        self.english_to_videos
            .get(pivot(gloss).as_str())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn wlasl_video_to_english(&self, video_id: &str) -> Option<&Gloss> {
        self.video_to_english.get(video_id)
    }

    /// Map `gloss` from one namespace to another through the English pivot.
    /// An unresolved hop yields an empty set; unknown glosses are not errors.
    pub fn map(&self, source: GlossSpace, target: GlossSpace, gloss: &str) -> GlossSet {
        use GlossSpace::*;

        let english: Option<Gloss> = match source {
            English => Some(pivot(gloss)),
            Psl => self.psl_to_english(gloss).cloned(),
            WlaslVideo => self.wlasl_video_to_english(gloss).cloned(),
        };

        if source == target {
            return match source {
                English => vec![pivot(gloss)],
                _ if english.is_some() => vec![Gloss::new(gloss)],
                _ => Vec::new(),
            };
        }

        let Some(english) = english else {
            return Vec::new();
        };

        match target {
            English => vec![english],
            Psl => self.english_to_psl(english.as_str()).into_iter().collect(),
            WlaslVideo => self
                .english_to_wlasl_videos(english.as_str())
                .iter()
                .map(|v| Gloss::new(v.as_str()))
                .collect(),
        }
    }

    /// Every English gloss known from either table, sorted
    pub fn english_glosses(&self) -> BTreeSet<&Gloss> {
        self.english_to_psl
            .keys()
            .chain(self.english_to_videos.keys())
            .collect()
    }

    pub fn psl_glosses(&self) -> BTreeSet<&Gloss> {
        self.psl_to_english.keys().collect()
    }

    /// Number of distinct English pivot glosses
    pub fn gloss_count(&self) -> usize {
        self.english_glosses().len()
    }

    pub fn is_psl_gloss(&self, gloss: &str) -> bool {
        self.psl_to_english.contains_key(gloss)
    }
}
