//! Report configuration (`report.yaml`)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Top-level shape of `report.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportFile {
    #[serde(default)]
    pub report: ReportConfig,
}

/// A weighted group of sections for the overall compliance score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreGroup {
    pub key: String,
    pub label: String,
    pub weight: f64,
    #[serde(default)]
    pub sections: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    #[serde(alias = "order")]
    pub section_order: Vec<String>,
    #[serde(alias = "section_titles")]
    pub section_labels: BTreeMap<String, String>,
    pub table_columns: Vec<String>,
    pub title_lines: Vec<String>,
    pub show_metadata: bool,
    pub groups: Vec<ScoreGroup>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            section_order: Vec::new(),
            section_labels: BTreeMap::new(),
            table_columns: vec![
                "No".to_string(),
                "Kural".to_string(),
                "Evet".to_string(),
                "Hayır".to_string(),
            ],
            title_lines: vec!["TEZ YAZIM KURALLARI UYUM RAPORU".to_string()],
            show_metadata: true,
            groups: vec![
                ScoreGroup {
                    key: "front_matter".to_string(),
                    label: "Ön Kısım".to_string(),
                    weight: 0.15,
                    sections: Vec::new(),
                },
                ScoreGroup {
                    key: "body".to_string(),
                    label: "Ana Metin".to_string(),
                    weight: 0.80,
                    sections: Vec::new(),
                },
                ScoreGroup {
                    key: "back_matter".to_string(),
                    label: "Son Kısım".to_string(),
                    weight: 0.05,
                    sections: Vec::new(),
                },
            ],
        }
    }
}

/// Column names accepted as the "passed" column
pub const YES_COLUMNS: &[&str] = &["Evet", "E", "Yes"];
/// Column names accepted as the "failed" column
pub const NO_COLUMNS: &[&str] = &["Hayır", "Hayir", "H", "No"];

impl ReportConfig {
    pub fn from_yaml_str(yaml: &str, path: &str) -> Result<Self, ConfigError> {
        let file: ReportFile = serde_yaml::from_str(yaml).map_err(|source| ConfigError::Yaml {
            path: path.to_string(),
            source,
        })?;
        Ok(file.report)
    }

    pub fn from_path(path: &std::path::Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        Self::from_yaml_str(&yaml, &display)
    }

    /// Display label of a section, falling back to the upper-cased key
    pub fn label_for(&self, key: &str) -> String {
        self.section_labels
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_uppercase())
    }

    /// Index of the first column whose name matches one of `candidates`
    /// (case-insensitive, trimmed)
    pub fn find_column(&self, candidates: &[&str]) -> Option<usize> {
        let columns: Vec<String> = self
            .table_columns
            .iter()
            .map(|c| c.trim().to_lowercase())
            .collect();
        candidates.iter().find_map(|cand| {
            let cand = cand.to_lowercase();
            columns.iter().position(|c| *c == cand)
        })
    }

    /// Group a section belongs to, if any
    pub fn group_of(&self, section: &str) -> Option<&ScoreGroup> {
        self.groups
            .iter()
            .find(|g| g.sections.iter().any(|s| s == section))
    }
}
