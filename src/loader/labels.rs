//! Label file loading
//!
//! Supported layouts:
//! - `labels.json`: `["cat", "dog"]` or `{"labels": ["cat", "dog"]}`
//! - `labels.txt`: one label per line, blank lines skipped

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::LoadError;

/// Ordered class names, index-aligned with the model output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSet {
    names: Vec<String>,
}

impl LabelSet {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Name for an output index, synthesized as `class{index+1}` when absent
    pub fn name(&self, index: usize) -> String {
        self.names
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("class{}", index + 1))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LabelDocument {
    List(Vec<String>),
    Metadata { labels: Vec<String> },
}

/// Load the first existing label file among `candidates`.
///
/// Returns `Ok(None)` when none exist; a present but malformed file is an error.
pub fn load_labels(candidates: &[PathBuf]) -> Result<Option<(PathBuf, LabelSet)>, LoadError> {
    for path in candidates {
        if path.is_file() {
            let labels = parse_label_file(path)?;
            return Ok(Some((path.clone(), labels)));
        }
    }
    Ok(None)
}

fn parse_label_file(path: &Path) -> Result<LabelSet, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|e| LoadError::Labels {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => {
            let doc: LabelDocument =
                serde_json::from_str(&content).map_err(|e| LoadError::Labels {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
            let names = match doc {
                LabelDocument::List(names) => names,
                LabelDocument::Metadata { labels } => labels,
            };
            Ok(LabelSet::new(names))
        }
        _ => Ok(LabelSet::new(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesized_names() {
        let labels = LabelSet::new(vec!["cat".into()]);
        assert_eq!(labels.name(0), "cat");
        assert_eq!(labels.name(1), "class2");
        assert_eq!(LabelSet::default().name(2), "class3");
    }

    #[test]
    fn test_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.json");
        std::fs::write(&path, r#"["cat", "dog", "bird"]"#).unwrap();
        let (found, labels) = load_labels(&[path.clone()]).unwrap().unwrap();
        assert_eq!(found, path);
        assert_eq!(labels.len(), 3);
        assert_eq!(labels.name(2), "bird");
    }

    #[test]
    fn test_json_metadata_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.json");
        std::fs::write(&path, r#"{"labels": ["a", "b"], "version": 2}"#).unwrap();
        let (_, labels) = load_labels(&[path]).unwrap().unwrap();
        assert_eq!(labels, LabelSet::new(vec!["a".into(), "b".into()]));
    }

    #[test]
    fn test_text_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.txt");
        std::fs::write(&path, "cat\n\n dog \nbird\n").unwrap();
        let (_, labels) = load_labels(&[path]).unwrap().unwrap();
        assert_eq!(labels.len(), 3);
        assert_eq!(labels.name(1), "dog");
    }

    #[test]
    fn test_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_labels(&[dir.path().join("labels.json")]).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_first_existing_candidate_wins() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("labels.txt");
        std::fs::write(&txt, "x\n").unwrap();
        let (found, _) = load_labels(&[dir.path().join("labels.json"), txt.clone()])
            .unwrap()
            .unwrap();
        assert_eq!(found, txt);
    }

    #[test]
    fn test_malformed_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            load_labels(&[path]),
            Err(LoadError::Labels { .. })
        ));
    }
}
