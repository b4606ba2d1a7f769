//! Categories file loader.
//!
//! Reads the JSON file and classifies it into a [`RawTree`]. Nothing below the
//! top level is rejected here; malformed subjects are the transformer's call.

use serde_json::Value;
use std::path::Path;

use crate::error::{LoadError, LoadResult};
use crate::models::{json_type_name, RawTree};

/// Load and parse the categories file at `path`.
///
/// # Example
/// ```ignore
/// let tree = quizdb_init::load("/init-data/db.json")?;
/// println!("{} categories", tree.category_count());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> LoadResult<RawTree> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_tree(&content, path)
}

/// Parse already-read content. `origin` is only used in error messages.
pub fn parse_tree(content: &str, origin: &Path) -> LoadResult<RawTree> {
    let value: Value = serde_json::from_str(content).map_err(|source| LoadError::Parse {
        path: origin.to_path_buf(),
        source,
    })?;

    tree_from_value(value, origin)
}

/// Classify a parsed document. The top level must be an object.
pub fn tree_from_value(value: Value, origin: &Path) -> LoadResult<RawTree> {
    match value {
        Value::Object(map) => Ok(RawTree::from_map(map)),
        other => Err(LoadError::NotAnObject {
            path: origin.to_path_buf(),
            found: json_type_name(&other).to_string(),
        }),
    }
}
