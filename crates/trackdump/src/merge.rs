//! Merging of converted event files.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

/// Indentation of merged output.
pub const MERGE_INDENT: &str = "    ";

/// Default output file of `trackdump merge`.
pub const DEFAULT_MERGE_OUTPUT: &str = "combined_data.json";

#[derive(Debug)]
pub enum MergeError {
    Io { path: PathBuf, source: io::Error },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// The document root is not a JSON object.
    NotAnObject { path: PathBuf },
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeError::Io { path, source } => write!(f, "{}: {source}", path.display()),
            MergeError::Json { path, source } => write!(f, "{}: {source}", path.display()),
            MergeError::NotAnObject { path } => {
                write!(f, "{}: expected a JSON object of events", path.display())
            }
        }
    }
}

impl std::error::Error for MergeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MergeError::Io { source, .. } => Some(source),
            MergeError::Json { source, .. } => Some(source),
            MergeError::NotAnObject { .. } => None,
        }
    }
}

/// Union of event documents.
///
/// On a name collision the later document wins, and the name keeps the
/// position where it was first seen.
pub fn merge_documents<I>(documents: I) -> Map<String, Value>
where
    I: IntoIterator<Item = Map<String, Value>>,
{
    let mut merged = Map::new();
    for document in documents {
        for (name, event) in document {
            merged.insert(name, event);
        }
    }
    merged
}

/// Read a converted event file.
pub fn read_document(path: &Path) -> Result<Map<String, Value>, MergeError> {
    let text = std::fs::read_to_string(path).map_err(|source| MergeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match serde_json::from_str(&text) {
        Ok(Value::Object(map)) => {
            debug!(path = %path.display(), events = map.len(), "read event file");
            Ok(map)
        }
        Ok(_) => Err(MergeError::NotAnObject {
            path: path.to_path_buf(),
        }),
        Err(source) => Err(MergeError::Json {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Read and merge event files, in order.
pub fn merge_files<P: AsRef<Path>>(paths: &[P]) -> Result<Map<String, Value>, MergeError> {
    let documents = paths
        .iter()
        .map(|p| read_document(p.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(merge_documents(documents))
}
