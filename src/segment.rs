//! Comment/code segmentation of example source files.
//!
//! Authors write examples as ordinary source files and separate teaching
//! sections with two blank lines. Inside a section, lines starting with the
//! language's comment marker are prose; everything else is code:
//!
//! ```text
//! // Variables are declared with `let`.      ┐
//! let x = 1;                                 │ section 1
//!                                            ┘
//!                                            ← two blank lines
//! // Constants can't be reassigned.          ┐
//! const y = 2;                               ┘ section 2
//! ```
//!
//! Prose and code lines may interleave within a section; each bucket keeps its
//! own line order. The code bucket goes through a [`Highlighter`].

use crate::highlight::Highlighter;
use crate::types::Section;

/// Separator between sections: a line break followed by two blank lines.
pub const SECTION_DELIMITER: &str = "\n\n\n";

/// What the segmenter needs to know about a file's language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Syntax<'a> {
    /// Tag passed to the highlighter.
    pub language: &'a str,
    /// Single-line comment marker, e.g. `//` or `#`.
    pub comment: &'a str,
}

/// A block split into prose and raw (unhighlighted) code.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawSection {
    pub comment: String,
    pub code: String,
}

/// Split `source` into sections and highlight each section's code.
///
/// Always returns at least one section; empty input yields a single section
/// with an empty comment and highlighted-empty code.
pub fn segment(source: &str, syntax: Syntax<'_>, highlighter: &dyn Highlighter) -> Vec<Section> {
    split_sections(source, syntax.comment)
        .into_iter()
        .map(|raw| Section {
            comment: raw.comment,
            code: highlighter.highlight(&raw.code, syntax.language),
        })
        .collect()
}

/// Split `source` into raw sections without highlighting.
pub fn split_sections(source: &str, marker: &str) -> Vec<RawSection> {
    let normalized = source.replace("\r\n", "\n");
    normalized
        .split(SECTION_DELIMITER)
        .map(|block| split_block(block, marker))
        .collect()
}

fn split_block(block: &str, marker: &str) -> RawSection {
    let mut section = RawSection::default();
    for line in block.lines() {
        match strip_comment(line, marker) {
            Some(prose) => {
                section.comment.push_str(prose);
                section.comment.push('\n');
            }
            None => {
                section.code.push_str(line);
                section.code.push('\n');
            }
        }
    }
    section
}

/// Prose text of a comment line, or `None` for a code line.
///
/// The line must start with `marker` in its first column. The marker, any
/// markers repeated right after it (`////`, `// //`), and one separating space
/// are removed. A shebang (`#!`) is always code.
fn strip_comment<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    if line.starts_with("#!") {
        return None;
    }
    let mut rest = line.strip_prefix(marker)?;
    loop {
        let text = rest.strip_prefix(' ').unwrap_or(rest);
        match text.strip_prefix(marker) {
            Some(after) => rest = after,
            None => return Some(text),
        }
    }
}
