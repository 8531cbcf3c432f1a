//! Public entry points: resolve a configuration, generate the C++ artifact,
//! write it to disk.

pub mod pipeline;


use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::codegen::{CppLowering, EmitOp, Lowering, Routine, RoutineBuilder};
use crate::config::{BranchSchema, GeneratorConfig};
use crate::diagnostic::Diagnostic;
use crate::error::GenerateError;
use crate::ident::{IdentAllocator, INPUT_FILE, OUTPUT_FILE};
use crate::ir::GenerationUnit;

pub use pipeline::Resolved;

/// Headers every artifact includes, in this order.
pub const BASE_HEADERS: &[&str] = &[
    "TFile.h",
    "TTree.h",
    "TTreeReader.h",
    "TTreeReaderValue.h",
    "TBranch.h",
    "iostream",
];

/// Text of the digest comment, before the hex digest.
pub const DIGEST_LABEL: &str = "babymaker digest: ";

/// Options controlling generation.
#[derive(Clone, Debug, Default)]
pub struct GenerateOptions {
    /// Recorded in the header comment. `None` omits the line, which makes
    /// the artifact depend only on the schema and configuration.
    pub timestamp: Option<DateTime<Utc>>,
}

impl GenerateOptions {
    pub fn with_timestamp(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp: Some(timestamp),
        }
    }
}

/// A generated artifact plus what went into it.
#[derive(Clone, Debug)]
pub struct Generated {
    /// Complete C++ source, header comments included.
    pub source: String,
    /// BLAKE3 hex digest of everything after the header comments.
    pub digest: String,
    pub units: Vec<GenerationUnit>,
    /// Warnings raised while resolving the configuration.
    pub diagnostics: Vec<Diagnostic>,
}

/// Generate the C++ reduction program for `config` against `schema`.
pub fn generate(
    schema: &BranchSchema,
    config: &GeneratorConfig,
    options: &GenerateOptions,
) -> Result<Generated, GenerateError> {
    let resolved = Resolved::build(schema, config)?;
    let units: Vec<GenerationUnit> = resolved.units().cloned().collect();

    // Routine names must be unique across the whole translation unit.
    let mut names = IdentAllocator::new();
    let mut routines = Vec::with_capacity(units.len());
    for unit in &units {
        let name = names.alloc(
            &format!("{}_{}", unit.output_tree, unit.input_tree),
            "generator_",
            "",
        );
        routines.push(RoutineBuilder::with_name(unit, name).build()?);
    }

    let mut ops = include_ops(config, &units);
    for routine in &routines {
        ops.extend(routine.ops.iter().cloned());
        ops.push(EmitOp::BlankLine);
    }
    ops.extend(driver_ops(&routines));

    let lowering = CppLowering::new();
    let mut body = lowering.lower(&ops).join("\n");
    body.push('\n');
    let digest = blake3::hash(body.as_bytes()).to_hex().to_string();

    let mut source = lowering.lower(&header_ops(&digest, options)).join("\n");
    source.push('\n');
    source.push_str(&body);

    log::debug!(
        "generated {} routine(s), {} bytes, digest {}",
        routines.len(),
        source.len(),
        digest
    );

    Ok(Generated {
        source,
        digest,
        units,
        diagnostics: resolved.diagnostics().cloned().collect(),
    })
}

/// Write `generated` to `path`.
///
/// Returns `Ok(false)` without touching the file when it already carries
/// the same digest, unless `force` is set.
pub fn write_artifact(path: &Path, generated: &Generated, force: bool) -> Result<bool, GenerateError> {
    if !force {
        if let Ok(existing) = std::fs::read_to_string(path) {
            if read_digest(&existing) == Some(generated.digest.as_str()) {
                log::info!("{} is up to date", path.display());
                return Ok(false);
            }
        }
    }
    std::fs::write(path, &generated.source).map_err(|source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("wrote {}", path.display());
    Ok(true)
}

/// The digest recorded in an artifact's header comments, if any.
pub fn read_digest(source: &str) -> Option<&str> {
    source
        .lines()
        .take_while(|line| line.starts_with("//"))
        .find_map(|line| line.strip_prefix("//")?.trim_start().strip_prefix(DIGEST_LABEL))
        .map(str::trim)
}

/// Header comments, closed by a blank line. Not covered by the digest.
fn header_ops(digest: &str, options: &GenerateOptions) -> Vec<EmitOp> {
    let mut ops = vec![EmitOp::Comment(
        "Generated by babymaker. Do not edit.".to_string(),
    )];
    if let Some(ts) = &options.timestamp {
        ops.push(EmitOp::Comment(format!(
            "Generated at: {}",
            ts.to_rfc3339_opts(SecondsFormat::Secs, true)
        )));
    }
    ops.push(EmitOp::Comment(format!("{}{}", DIGEST_LABEL, digest)));
    ops.push(EmitOp::BlankLine);
    ops
}

/// Base headers, then configured system headers, then quoted user headers.
fn include_ops(config: &GeneratorConfig, units: &[GenerationUnit]) -> Vec<EmitOp> {
    let mut extra: BTreeSet<&str> = BTreeSet::new();
    let mut user: BTreeSet<&str> = BTreeSet::new();
    for (_, spec) in config.iter() {
        extra.extend(spec.headers.iter().map(String::as_str));
        user.extend(spec.user_headers.iter().map(String::as_str));
    }
    if units
        .iter()
        .flat_map(|u| u.datatypes())
        .any(|ty| ty.contains("vector<"))
    {
        extra.insert("vector");
    }

    let mut ops: Vec<EmitOp> = BASE_HEADERS
        .iter()
        .map(|h| EmitOp::SystemInclude(h.to_string()))
        .collect();
    ops.extend(
        extra
            .into_iter()
            .filter(|h| !BASE_HEADERS.contains(h))
            .map(|h| EmitOp::SystemInclude(h.to_string())),
    );
    ops.extend(user.into_iter().map(|h| EmitOp::UserInclude(h.to_string())));
    ops.push(EmitOp::BlankLine);
    ops
}

/// `main`: open both files, run every routine once, release the files.
fn driver_ops(routines: &[Routine]) -> Vec<EmitOp> {
    let mut ops = vec![
        EmitOp::MainStart,
        EmitOp::ArgCountGuard { expected: 2 },
        EmitOp::BlankLine,
        EmitOp::OpenFile {
            var: INPUT_FILE.to_string(),
            argv_index: 1,
            mode: "read".to_string(),
        },
        EmitOp::OpenFile {
            var: OUTPUT_FILE.to_string(),
            argv_index: 2,
            mode: "recreate".to_string(),
        },
        EmitOp::BlankLine,
    ];
    for routine in routines {
        ops.push(EmitOp::Call {
            name: routine.name.clone(),
            args: vec![INPUT_FILE.to_string(), OUTPUT_FILE.to_string()],
        });
    }
    ops.push(EmitOp::BlankLine);
    ops.push(EmitOp::CloseFile {
        var: OUTPUT_FILE.to_string(),
    });
    ops.push(EmitOp::BlankLine);
    ops.push(EmitOp::DeleteFile {
        var: INPUT_FILE.to_string(),
    });
    ops.push(EmitOp::DeleteFile {
        var: OUTPUT_FILE.to_string(),
    });
    ops.push(EmitOp::Return(0));
    ops.push(EmitOp::FnEnd);
    ops
}
