//! Payload types shared between the loader, the site builder and renderers.
//!
//! Everything here serializes to JSON so `codewalk manifest` can print exactly
//! what a renderer receives.

use crate::catalog::Category;
use crate::navigation::NavTarget;
use serde::Serialize;

/// One comment + code unit extracted from a blank-line-delimited block.
///
/// `comment` holds the prose lines with their markers stripped, each followed
/// by `\n`. `code` is highlighter output (markup, not raw source).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Section {
    pub comment: String,
    pub code: String,
}

/// Segmented contents of one numbered step directory.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SubExample {
    /// Sections of the step's code file; empty when it has none.
    pub code: Vec<Section>,
    /// Sections of the step's script file; empty when it has none.
    pub script: Vec<Section>,
}

/// Render payload for one example page.
#[derive(Debug, Clone, Serialize)]
pub struct PageContent {
    /// Every step of the example, in numeric step order.
    pub contents: Vec<SubExample>,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub next: NavTarget,
    pub previous: NavTarget,
}

/// Render payload for the root/index page.
#[derive(Debug, Clone, Serialize)]
pub struct IndexPage {
    /// Always empty: the index page has no example title of its own.
    pub title: String,
    pub description: String,
    /// Categories with at least one example present on disk.
    pub categories: Vec<Category>,
    pub next: NavTarget,
    pub previous: NavTarget,
}
