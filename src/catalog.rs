//! Catalog loading, validation and filtering.
//!
//! The catalog is the ordered, categorized list of examples. It is a JSON
//! document validated into typed structs at the load boundary, so nothing
//! downstream ever sees a missing title or slug:
//!
//! ```json
//! {
//!   "categories": [
//!     {
//!       "name": "Basics",
//!       "items": [
//!         { "dir": "hello-world", "slug": "hello-world", "title": "Hello World",
//!           "description": "The classic first program." }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Category and top-level keys are strict. Item keys beyond the four known ones
//! are kept verbatim in [`CatalogEntry::extra`] and passed through to
//! renderers.
//!
//! ## Order
//!
//! The flat order of examples (used for previous/next links) is category order
//! first, then item order within the category.

use crate::naming::check_slug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog not found: {0}")]
    Missing(PathBuf),
    #[error("Cannot read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid catalog entry {slug:?} in category {category:?}: {reason}")]
    InvalidEntry {
        category: String,
        slug: String,
        reason: String,
    },
    #[error("Catalog category #{0} has an empty name")]
    UnnamedCategory(usize),
    #[error("Duplicate slug {0:?} in catalog")]
    DuplicateSlug(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Catalog {
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Category {
    pub name: String,
    pub items: Vec<CatalogEntry>,
}

/// Display metadata for one example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Directory under the examples root holding the numbered steps.
    pub dir: String,
    /// Output page name (`<slug>.html`).
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Any other fields, passed through untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl CatalogEntry {
    /// Directory of this example under `examples_root`.
    pub fn path(&self, examples_root: &Path) -> PathBuf {
        examples_root.join(&self.dir)
    }
}

/// A catalog reduced to the examples whose directories exist.
#[derive(Debug, Clone)]
pub struct PresentCatalog {
    /// Categories with their missing items removed; empty categories dropped.
    pub categories: Vec<Category>,
    /// Flat list in category-then-item order.
    pub entries: Vec<CatalogEntry>,
    /// Entries dropped because their directory is absent, in catalog order.
    pub skipped: Vec<CatalogEntry>,
}

/// Load and validate the catalog at `path`.
pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    if !path.is_file() {
        return Err(CatalogError::Missing(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_catalog(&text, path)
}

/// Parse and validate catalog JSON. `path` is only used in error messages.
pub fn parse_catalog(text: &str, path: &Path) -> Result<Catalog, CatalogError> {
    let catalog: Catalog = serde_json::from_str(text).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    catalog.validate()?;
    Ok(catalog)
}

impl Catalog {
    /// Check required fields, slug shape, example dirs, and slug uniqueness.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for (idx, category) in self.categories.iter().enumerate() {
            if category.name.trim().is_empty() {
                return Err(CatalogError::UnnamedCategory(idx + 1));
            }
            for item in &category.items {
                let invalid = |reason: String| CatalogError::InvalidEntry {
                    category: category.name.clone(),
                    slug: item.slug.clone(),
                    reason,
                };
                check_slug(&item.slug).map_err(|p| invalid(p.to_string()))?;
                if item.title.trim().is_empty() {
                    return Err(invalid("title is empty".into()));
                }
                check_dir(&item.dir).map_err(invalid)?;
                if !seen.insert(item.slug.as_str()) {
                    return Err(CatalogError::DuplicateSlug(item.slug.clone()));
                }
            }
        }
        Ok(())
    }

    /// All entries in category order, then item order.
    pub fn flatten(&self) -> Vec<CatalogEntry> {
        self.categories
            .iter()
            .flat_map(|c| c.items.iter().cloned())
            .collect()
    }

    /// Drop entries whose directory under `examples_root` does not exist.
    ///
    /// Missing examples are not an error; each one is logged and reported in
    /// [`PresentCatalog::skipped`].
    pub fn retain_present(self, examples_root: &Path) -> PresentCatalog {
        let mut categories = Vec::new();
        let mut skipped = Vec::new();

        for category in self.categories {
            let (items, missing): (Vec<_>, Vec<_>) = category
                .items
                .into_iter()
                .partition(|item| item.path(examples_root).is_dir());
            for item in &missing {
                tracing::warn!(
                    slug = %item.slug,
                    dir = %item.path(examples_root).display(),
                    "Example directory not found, skipping"
                );
            }
            skipped.extend(missing);
            if items.is_empty() {
                tracing::info!(category = %category.name, "Category has no examples on disk, dropping");
            } else {
                categories.push(Category {
                    name: category.name,
                    items,
                });
            }
        }

        let present = Catalog { categories };
        PresentCatalog {
            entries: present.flatten(),
            categories: present.categories,
            skipped,
        }
    }
}

/// An example dir must be a non-empty relative path that stays inside the
/// examples root.
fn check_dir(dir: &str) -> Result<(), String> {
    if dir.trim().is_empty() {
        return Err("dir is empty".into());
    }
    let path = Path::new(dir);
    if path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Err(format!("dir {dir:?} must be a relative path inside the examples root"));
    }
    Ok(())
}
