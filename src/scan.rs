//! Example loading: numbered step directories → segmented sub-examples.
//!
//! ## Directory Structure
//!
//! ```text
//! examples/                  # paths.examples
//! └── closures/              # CatalogEntry::dir
//!     ├── 1/
//!     │   ├── closures.js    # code file  (code.extensions)
//!     │   └── closures.sh    # script file (script.extensions)
//!     ├── 2/
//!     │   └── counter.js     # script missing → empty script sections
//!     ├── 3/                 # neither file → step skipped, logged
//!     └── 10/                # numeric order: 1, 2, 3, 10
//! ```
//!
//! ## Rules
//!
//! - Steps are immediate subdirectories named by a decimal number and are
//!   loaded in ascending numeric order. Other subdirectories are skipped.
//! - A step contributes at most one code file and one script file; when
//!   several files match, the first by file name wins.
//! - A missing example directory or an empty step is logged and skipped.
//! - A file that exists but cannot be read is an error: it means the tree
//!   changed or broke underneath the build, not that the author left it out.

use crate::catalog::CatalogEntry;
use crate::config::{LanguageConfig, SiteConfig};
use crate::highlight::Highlighter;
use crate::naming::parse_step_number;
use crate::segment::segment;
use crate::types::{Section, SubExample};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Cannot list directory {path}: {source}")]
    List {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A numbered step directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDir {
    pub number: u32,
    pub path: PathBuf,
}

/// The files found in one step directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepFiles {
    pub code: Option<PathBuf>,
    pub script: Option<PathBuf>,
}

impl StepFiles {
    pub fn is_empty(&self) -> bool {
        self.code.is_none() && self.script.is_none()
    }
}

/// Load every step of an example, in numeric step order.
///
/// Returns an empty list (and logs) when the example directory is missing.
pub fn load_example(
    entry: &CatalogEntry,
    config: &SiteConfig,
    highlighter: &dyn Highlighter,
) -> Result<Vec<SubExample>, ScanError> {
    let dir = entry.path(&config.examples_dir());
    if !dir.is_dir() {
        tracing::warn!(slug = %entry.slug, dir = %dir.display(), "Example directory not found, skipping");
        return Ok(Vec::new());
    }

    let mut contents = Vec::new();
    for step in step_dirs(&dir)? {
        let files = find_step_files(&step.path, config)?;
        if files.is_empty() {
            tracing::info!(
                slug = %entry.slug,
                step = step.number,
                "Step has no code or script file, skipping"
            );
            continue;
        }
        contents.push(SubExample {
            code: read_sections(files.code.as_deref(), &config.code, highlighter)?,
            script: read_sections(files.script.as_deref(), &config.script, highlighter)?,
        });
    }
    Ok(contents)
}

/// Numbered subdirectories of `dir`, sorted by step number.
///
/// Equal numbers (`1` and `01`) fall back to name order so the result is
/// deterministic.
pub fn step_dirs(dir: &Path) -> Result<Vec<StepDir>, ScanError> {
    let mut steps = Vec::new();
    for path in list_dir(dir)? {
        if !path.is_dir() {
            continue;
        }
        let name = file_name(&path);
        match parse_step_number(&name) {
            Some(number) => steps.push(StepDir { number, path }),
            None => {
                tracing::warn!(dir = %path.display(), "Step directory name is not a number, skipping")
            }
        }
    }
    steps.sort_by(|a, b| a.number.cmp(&b.number).then_with(|| a.path.cmp(&b.path)));
    Ok(steps)
}

/// Locate the code and script file of one step.
pub fn find_step_files(step: &Path, config: &SiteConfig) -> Result<StepFiles, ScanError> {
    let mut files = StepFiles::default();
    for path in list_dir(step)? {
        if !path.is_file() || file_name(&path).starts_with('.') {
            continue;
        }
        let slot = if config.code.matches(&path) {
            &mut files.code
        } else if config.script.matches(&path) {
            &mut files.script
        } else {
            continue;
        };
        match slot {
            None => *slot = Some(path),
            Some(kept) => tracing::warn!(
                kept = %kept.display(),
                ignored = %path.display(),
                "More than one file of the same kind in step, ignoring extra"
            ),
        }
    }
    Ok(files)
}

fn read_sections(
    path: Option<&Path>,
    language: &LanguageConfig,
    highlighter: &dyn Highlighter,
) -> Result<Vec<Section>, ScanError> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let source = fs::read_to_string(path).map_err(|source| ScanError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(segment(&source, language.syntax(), highlighter))
}

/// Entries of `dir`, sorted by path. Any listing error is fatal.
fn list_dir(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let list_err = |source| ScanError::List {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(list_err)? {
        entries.push(entry.map_err(list_err)?.path());
    }
    entries.sort();
    Ok(entries)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
