//! File and directory processing
//!
//!     Source text is tokenized once, every selected block's tags attribute is transformed on
//!     its own slice of tokens, and the results are spliced back from the last block to the
//!     first so earlier indices stay valid. Bytes outside the rewritten values are untouched.
//!
//!     Directory runs keep going when a file fails; failures are collected in the [Report].

use crate::boxing::{BoxError, Boxer, TemplateError, TokenRange};
use crate::config::BoxConfig;
use crate::hcl::{blocks, detokenize, tokenize, LexError, StructuralError, Token};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("{}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("{}: {source}", path.display())]
    Lex { path: PathBuf, source: LexError },
    #[error("{}: {source}", path.display())]
    Structural {
        path: PathBuf,
        source: StructuralError,
    },
    #[error("{}: {block}: {source}", path.display())]
    Box {
        path: PathBuf,
        block: String,
        source: BoxError,
    },
    #[error("{}: {source}", path.display())]
    Template {
        path: PathBuf,
        source: TemplateError,
    },
}

/// What to do with each marked group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Wrap unboxed groups with the current template.
    #[default]
    Box,
    /// Remove the current template's wrappers.
    Unbox,
}

#[derive(Debug, Clone, Default)]
pub struct Options {
    pub action: Action,
    /// Report what would change without writing.
    pub check: bool,
    /// Descend into subdirectories (hidden ones such as `.terraform` are skipped).
    pub recursive: bool,
}

/// Result of transforming one source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub output: String,
    /// Addresses of the blocks whose tags changed.
    pub changed: Vec<String>,
}

impl FileOutcome {
    pub fn is_changed(&self) -> bool {
        !self.changed.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Unchanged,
    Changed,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub action: Action,
    pub check: bool,
    pub files: Vec<FileReport>,
}

impl Report {
    fn new(options: &Options) -> Self {
        Self {
            action: options.action,
            check: options.check,
            files: Vec::new(),
        }
    }

    pub fn changed(&self) -> impl Iterator<Item = &FileReport> {
        self.with_status(FileStatus::Changed)
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileReport> {
        self.with_status(FileStatus::Failed)
    }

    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }

    fn with_status(&self, status: FileStatus) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(move |file| file.status == status)
    }
}

/// Box every selected block in `source`.
pub fn box_source(source: &str, boxer: &Boxer) -> Result<String, ProcessError> {
    Ok(process_source(Path::new("-"), source, boxer, Action::Box)?.output)
}

/// Remove the current template's wrappers from every selected block in `source`.
pub fn unbox_source(source: &str, boxer: &Boxer) -> Result<String, ProcessError> {
    Ok(process_source(Path::new("-"), source, boxer, Action::Unbox)?.output)
}

/// Transform `source`; `path` is only used in errors.
pub fn process_source(
    path: &Path,
    source: &str,
    boxer: &Boxer,
    action: Action,
) -> Result<FileOutcome, ProcessError> {
    let tokens = tokenize(source).map_err(|source| ProcessError::Lex {
        path: path.to_path_buf(),
        source,
    })?;
    let structural = |source| ProcessError::Structural {
        path: path.to_path_buf(),
        source,
    };

    let attribute = &boxer.selector().attribute;
    let mut edits: Vec<(TokenRange, Vec<Token>)> = Vec::new();
    let mut changed = Vec::new();
    for block in blocks(&tokens).map_err(structural)? {
        if !boxer.selector().selects(&block) {
            continue;
        }
        let Some(range) = block.attribute(&tokens, attribute).map_err(structural)? else {
            continue;
        };

        let value = &tokens[range.start..=range.end];
        let result = match action {
            Action::Box => boxer.box_tokens(value),
            Action::Unbox => boxer.unbox_tokens(value),
        };
        let rewritten = result.map_err(|source| ProcessError::Box {
            path: path.to_path_buf(),
            block: block.address(),
            source,
        })?;

        if detokenize(&rewritten) == detokenize(value) {
            continue;
        }
        debug!(block = %block.address(), ?action, "rewrote {attribute}");
        changed.push(block.address());
        edits.push((range, rewritten));
    }

    if edits.is_empty() {
        return Ok(FileOutcome {
            output: source.to_string(),
            changed,
        });
    }

    let mut output = tokens;
    for (range, rewritten) in edits.into_iter().rev() {
        output.splice(range.start..=range.end, rewritten);
    }
    Ok(FileOutcome {
        output: detokenize(&output),
        changed,
    })
}

/// Process one file, writing it back when it changed and `options.check` is off.
pub fn process_file(path: &Path, boxer: &Boxer, options: &Options) -> FileReport {
    match rewrite_file(path, boxer, options) {
        Ok(blocks) => FileReport {
            path: path.to_path_buf(),
            status: if blocks.is_empty() {
                FileStatus::Unchanged
            } else {
                FileStatus::Changed
            },
            blocks,
            error: None,
        },
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to process file");
            FileReport {
                path: path.to_path_buf(),
                status: FileStatus::Failed,
                blocks: Vec::new(),
                error: Some(err.to_string()),
            }
        }
    }
}

fn rewrite_file(path: &Path, boxer: &Boxer, options: &Options) -> Result<Vec<String>, ProcessError> {
    let source = fs::read_to_string(path).map_err(|source| ProcessError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let outcome = process_source(path, &source, boxer, options.action)?;
    if outcome.is_changed() && !options.check {
        fs::write(path, &outcome.output).map_err(|source| ProcessError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), blocks = outcome.changed.len(), "rewrote file");
    }
    Ok(outcome.changed)
}

/// Process every `.tf` file in `dir`.
///
/// Templates are rendered per directory, since they may refer to `dirPath`. Errors reading a
/// directory or compiling its templates abort the run; errors in single files do not.
pub fn process_directory(
    dir: &Path,
    config: &BoxConfig,
    options: &Options,
) -> Result<Report, ProcessError> {
    let mut report = Report::new(options);
    visit(dir, config, options, &mut report)?;
    Ok(report)
}

fn visit(
    dir: &Path,
    config: &BoxConfig,
    options: &Options,
    report: &mut Report,
) -> Result<(), ProcessError> {
    let boxer = Boxer::new(config, dir).map_err(|source| ProcessError::Template {
        path: dir.to_path_buf(),
        source,
    })?;

    let io_error = |source| ProcessError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = fs::read_dir(dir)
        .map_err(io_error)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_error)?;
    entries.sort();

    let mut subdirs = Vec::new();
    for path in entries {
        if path.is_dir() {
            if options.recursive && !is_hidden(&path) {
                subdirs.push(path);
            }
            continue;
        }
        if path.extension().is_some_and(|ext| ext == "tf") {
            report.files.push(process_file(&path, &boxer, options));
        }
    }

    for subdir in subdirs {
        visit(&subdir, config, options, report)?;
    }
    Ok(())
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}
