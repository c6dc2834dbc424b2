//! CLI output formatting for builds and checks.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every example is its semantic identity (positional index and title)
//! with output files and source directories shown as secondary context.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Home → index.html
//! Basics
//!     001 Hello World → hello-world.html
//!     002 Values → values.html
//! Functions
//!     001 Closures → closures.html
//!
//! Skipped
//!     Ghost
//!         Source: examples/ghost (not found)
//!
//! Generated 3 pages, skipped 1
//! ```
//!
//! ## Check
//!
//! ```text
//! Basics
//!     001 Hello World (1 step, 2 sections)
//!     002 Values (1 step, 3 sections)
//! Functions
//!     001 Closures (3 steps, 4 sections)
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::site::{BuildReport, PageSummary};
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Group pages under category headers, numbering within each category.
fn category_lines(pages: &[PageSummary], line: impl Fn(usize, &PageSummary) -> String) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Option<&str> = None;
    let mut position = 0;
    for page in pages {
        if current != Some(page.category.as_str()) {
            lines.push(page.category.clone());
            current = Some(page.category.as_str());
            position = 0;
        }
        position += 1;
        lines.push(format!("{}{}", indent(1), line(position, page)));
    }
    lines
}

fn skipped_lines(report: &BuildReport, examples_root: &Path) -> Vec<String> {
    if report.skipped.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![String::new(), "Skipped".to_string()];
    for entry in &report.skipped {
        lines.push(format!("{}{}", indent(1), entry.title));
        lines.push(format!(
            "{}Source: {} (not found)",
            indent(2),
            entry.path(examples_root).display()
        ));
    }
    lines
}

// ============================================================================
// Build output
// ============================================================================

/// Format build output: each page with its output file, then skipped entries.
pub fn format_build_report(report: &BuildReport, examples_root: &Path) -> Vec<String> {
    let mut lines = vec!["Home → index.html".to_string()];
    lines.extend(category_lines(&report.pages, |pos, page| {
        format!("{} {} → {}.html", format_index(pos), page.title, page.slug)
    }));
    lines.extend(skipped_lines(report, examples_root));
    lines.push(String::new());
    lines.push(format!(
        "Generated {}, skipped {}",
        plural(report.pages.len(), "page"),
        report.skipped.len()
    ));
    lines
}

pub fn print_build_report(report: &BuildReport, examples_root: &Path) {
    for line in format_build_report(report, examples_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format check output: each example with its step and section counts.
pub fn format_check_report(report: &BuildReport, examples_root: &Path) -> Vec<String> {
    let mut lines = category_lines(&report.pages, |pos, page| {
        format!(
            "{} {} ({}, {})",
            format_index(pos),
            page.title,
            plural(page.steps, "step"),
            plural(page.sections, "section")
        )
    });
    lines.extend(skipped_lines(report, examples_root));
    lines
}

pub fn print_check_report(report: &BuildReport, examples_root: &Path) {
    for line in format_check_report(report, examples_root) {
        println!("{}", line);
    }
}
