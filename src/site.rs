//! Site assembly: catalog → filtered entries → navigation → rendered pages.
//!
//! ```text
//! catalog.json ──load/validate──▶ Catalog
//!                                   │ retain_present(examples/)
//!                                   ▼
//!                             PresentCatalog ──link──▶ Navigation per entry
//!                                   │
//!         ┌─────────────────────────┼──────────────────────────┐
//!         ▼                         ▼                          ▼
//!   render_index(IndexPage)   render_sitemap(Sitemap)   render_example(PageContent)
//!                                                        (one per entry, in order)
//! ```
//!
//! All rendering goes through a [`PageRenderer`], so the same pipeline writes
//! HTML, collects a manifest, or only validates the inputs (`codewalk check`).

use crate::catalog::{self, CatalogEntry, CatalogError};
use crate::config::{ConfigError, SiteConfig};
use crate::highlight::{Highlighter, TokenHighlighter};
use crate::navigation::{link_entries, link_root};
use crate::render::{HtmlRenderer, ManifestRenderer, PageRenderer, RenderError, SiteManifest};
use crate::scan::{ScanError, load_example};
use crate::sitemap::Sitemap;
use crate::types::{IndexPage, PageContent};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("Example error: {0}")]
    Scan(#[from] ScanError),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// What one rendered example page contained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSummary {
    pub category: String,
    pub slug: String,
    pub title: String,
    pub steps: usize,
    pub sections: usize,
}

/// Outcome of a build, for CLI output.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Rendered example pages, in tour order.
    pub pages: Vec<PageSummary>,
    /// Catalog entries whose directory was missing.
    pub skipped: Vec<CatalogEntry>,
}

/// Build the whole site through `renderer`.
pub fn build(
    config: &SiteConfig,
    renderer: &mut dyn PageRenderer,
    highlighter: &dyn Highlighter,
) -> Result<BuildReport, BuildError> {
    let catalog = catalog::load_catalog(&config.catalog_path())?;
    let present = catalog.retain_present(&config.examples_dir());
    tracing::info!(
        examples = present.entries.len(),
        skipped = present.skipped.len(),
        "Catalog loaded"
    );

    let links = link_entries(&present.entries);
    let root = link_root(&present.entries);

    renderer.render_index(&IndexPage {
        title: String::new(),
        description: config.site.description.clone(),
        categories: present.categories.clone(),
        next: root.next,
        previous: root.previous,
    })?;
    renderer.render_sitemap(&Sitemap::new(config, &present.entries))?;

    let mut pages = Vec::with_capacity(present.entries.len());
    for (entry, nav) in present.entries.iter().zip(links) {
        let contents = load_example(entry, config, highlighter)?;
        let summary = PageSummary {
            category: category_of(&present.categories, &entry.slug),
            slug: entry.slug.clone(),
            title: entry.title.clone(),
            steps: contents.len(),
            sections: contents
                .iter()
                .map(|s| s.code.len() + s.script.len())
                .sum(),
        };
        renderer.render_example(&PageContent {
            contents,
            title: entry.title.clone(),
            slug: entry.slug.clone(),
            description: entry.description.clone(),
            next: nav.next,
            previous: nav.previous,
        })?;
        pages.push(summary);
    }
    renderer.finish()?;

    Ok(BuildReport {
        pages,
        skipped: present.skipped,
    })
}

/// Write the HTML site into the output directory with the default highlighter.
pub fn build_html(config: &SiteConfig) -> Result<BuildReport, BuildError> {
    let mut renderer = HtmlRenderer::new(config)?;
    build(config, &mut renderer, &TokenHighlighter)
}

/// Assemble the site in memory without writing anything.
pub fn collect(
    config: &SiteConfig,
    highlighter: &dyn Highlighter,
) -> Result<(SiteManifest, BuildReport), BuildError> {
    let mut renderer = ManifestRenderer::new();
    let report = build(config, &mut renderer, highlighter)?;
    Ok((renderer.into_manifest(), report))
}

fn category_of(categories: &[catalog::Category], slug: &str) -> String {
    categories
        .iter()
        .find(|c| c.items.iter().any(|i| i.slug == slug))
        .map(|c| c.name.clone())
        .unwrap_or_default()
}
