//! Generator inputs: the per-output-tree configuration and the branch
//! schema of the input file.

pub mod schema;
pub mod spec;

#[cfg(test)]
mod tests;

pub use schema::{BranchSchema, TreeSchema};
pub use spec::{GeneratorConfig, OutputSpec, RawOutputSpec};

use std::path::Path;

use crate::error::ConfigError;

/// Read a whole file, mapping failures to a config error naming the path.
pub(crate) fn read_source(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
