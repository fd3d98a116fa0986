// src/tokenizer/io.rs

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::error::Category;

use crate::tokenizer::{Error, Result};

/// Where a model and its training metrics live. Nothing in the crate assumes a
/// default location; callers pass one of these in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPaths {
    pub model: PathBuf,
    pub stats: Option<PathBuf>,
}

impl ModelPaths {
    pub fn new<P: Into<PathBuf>>(model: P) -> Self {
        Self { model: model.into(), stats: None }
    }

    #[must_use]
    pub fn with_stats<P: Into<PathBuf>>(mut self, stats: P) -> Self {
        self.stats = Some(stats.into());
        self
    }

    /// `<root>/models/hindi_bpe/model.json` and `<root>/stats/hindi_bpe/metrics.json`.
    pub fn in_dir<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref();
        Self::new(root.join("models").join("hindi_bpe").join("model.json"))
            .with_stats(root.join("stats").join("hindi_bpe").join("metrics.json"))
    }
}

/// Writes `value` as pretty JSON, creating parent directories as needed.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// Reads a JSON document. A missing file is `ModelNotFound`, text that is not
/// JSON is `Json`, and JSON of the wrong shape is `MalformedModel`.
///
/// Deserializes straight from the reader, so map entries reach the target
/// type in document order.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(Error::ModelNotFound(path.to_path_buf()));
    }
    let reader = BufReader::new(File::open(path)?);
    serde_json::from_reader(reader).map_err(|e| match e.classify() {
        Category::Data => Error::malformed(format!("{}: {}", path.display(), e)),
        _ => Error::Json(e),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::tokenizer::MergeTable;

    #[test]
    fn in_dir_uses_conventional_layout() {
        let paths = ModelPaths::in_dir("/data");
        assert_eq!(paths.model, PathBuf::from("/data/models/hindi_bpe/model.json"));
        assert_eq!(paths.stats, Some(PathBuf::from("/data/stats/hindi_bpe/metrics.json")));
    }

    #[test]
    fn missing_file_is_model_not_found() {
        let err = read_json::<Value>(Path::new("definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, Error::ModelNotFound(_)));
    }

    #[test]
    fn merge_map_is_read_in_document_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merges.json");
        fs::write(&path, r#"{"z y": "zy", "a b": "ab", "m n": "mn"}"#).unwrap();

        let table: MergeTable = read_json(&path).unwrap();
        assert_eq!(table.symbols().collect::<Vec<_>>(), vec!["zy", "ab", "mn"]);
    }

    #[test]
    fn syntax_error_is_json_and_shape_error_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{\"z y\": ").unwrap();
        assert!(matches!(read_json::<MergeTable>(&broken).unwrap_err(), Error::Json(_)));

        let wrong = dir.path().join("wrong.json");
        fs::write(&wrong, "[1, 2, 3]").unwrap();
        assert!(matches!(
            read_json::<MergeTable>(&wrong).unwrap_err(),
            Error::MalformedModel(_)
        ));
    }
}
