//! Error taxonomy for configuration resolution and code generation.

use std::path::PathBuf;

use thiserror::Error;

use crate::diagnostic::Diagnostic;
use crate::span::Span;

/// A problem with the user's configuration or schema.
///
/// Every variant names the output tree, input tree, branch or instruction
/// involved so the message stands on its own.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("output tree '{output_tree}': invalid {field} pattern '{pattern}': {source}")]
    InvalidPattern {
        output_tree: String,
        field: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(
        "output tree '{output_tree}', branch '{branch}': malformed calculation '{instruction}'"
    )]
    MalformedInstruction {
        output_tree: String,
        branch: String,
        instruction: String,
    },

    #[error(
        "output tree '{output_tree}', input tree '{input_tree}': calculation '{instruction}' \
         takes its type from unknown branch '{branch}'"
    )]
    UnknownFirstArgument {
        output_tree: String,
        input_tree: String,
        branch: String,
        instruction: String,
    },

    #[error(
        "output tree '{output_tree}', input tree '{input_tree}': calculation '{instruction}' \
         references unknown branch '{branch}'"
    )]
    UnknownArgument {
        output_tree: String,
        input_tree: String,
        branch: String,
        instruction: String,
    },

    #[error(
        "output tree '{output_tree}', input tree '{input_tree}': output branch '{branch}' \
         is produced more than once"
    )]
    DuplicateOutputBranch {
        output_tree: String,
        input_tree: String,
        branch: String,
    },
}

impl ConfigError {
    /// Convert into a renderable diagnostic, pinning the span to the
    /// offending text in `source` where it can be found.
    pub fn to_diagnostic(&self, source: &str) -> Diagnostic {
        let message = self.to_string();
        match self {
            ConfigError::Io { .. } => Diagnostic::error(message, Span::dummy()),
            ConfigError::Yaml(e) => {
                let span = e
                    .location()
                    .map(|loc| Span::new(loc.index() as u32, loc.index() as u32 + 1))
                    .unwrap_or_else(Span::dummy);
                Diagnostic::error(message, span)
            }
            ConfigError::InvalidPattern {
                output_tree,
                field,
                pattern,
                ..
            } => Diagnostic::error(
                message,
                Span::locate(source, &[output_tree.as_str(), *field], pattern),
            ),
            ConfigError::MalformedInstruction {
                output_tree,
                instruction,
                ..
            } => Diagnostic::error(
                message,
                Span::locate(source, &[output_tree.as_str(), "calculation"], instruction),
            )
            .with_help("expected a call of the form `functor(branch, ...)`".to_string()),
            ConfigError::UnknownFirstArgument {
                output_tree,
                input_tree,
                instruction,
                ..
            } => Diagnostic::error(
                message,
                Span::locate(source, &[output_tree.as_str(), "calculation"], instruction),
            )
            .with_note(format!(
                "the result type is copied from the first argument's type in '{}'",
                input_tree
            )),
            ConfigError::UnknownArgument {
                output_tree,
                instruction,
                ..
            } => Diagnostic::error(
                message,
                Span::locate(source, &[output_tree.as_str(), "calculation"], instruction),
            ),
            ConfigError::DuplicateOutputBranch {
                output_tree,
                branch,
                ..
            } => Diagnostic::error(
                message,
                Span::locate(source, &[output_tree.as_str()], branch),
            )
            .with_help("rename one of the branches".to_string()),
        }
    }
}

/// Failure of a full generation run.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The configuration must be fixed; every error found is reported.
    #[error("{} configuration error(s)", .0.len())]
    Config(Vec<ConfigError>),

    #[error("cannot write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The emitter found an IR invariant broken. This is a bug in the
    /// builder, never a user mistake.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ConfigError> for GenerateError {
    fn from(e: ConfigError) -> Self {
        GenerateError::Config(vec![e])
    }
}
