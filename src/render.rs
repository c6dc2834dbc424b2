//! Page rendering.
//!
//! The site builder assembles payloads ([`IndexPage`], [`PageContent`],
//! [`Sitemap`]) and hands them to a [`PageRenderer`]. Two renderers ship:
//!
//! - [`HtmlRenderer`] writes the static site with [maud](https://maud.lambda.xyz/)
//!   templates compiled into the binary.
//! - [`ManifestRenderer`] keeps the payloads in memory; `codewalk manifest`
//!   prints them as JSON and tests assert on them.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html          # Categories with links to every example
//! ├── hello-world.html    # One page per example: <slug>.html
//! ├── closures.html
//! ├── sitemap.xml
//! └── ...                 # Contents of assets/, copied verbatim
//! ```
//!
//! ## Example Page Layout
//!
//! Each step becomes a table of rows, prose on the left and code on the right.
//! The step's script sections follow its code sections in a second table. Comment
//! prose is Markdown; code is already highlighter markup and is inserted as is.
//!
//! Pages left over from earlier builds (an example removed from the catalog or
//! deleted from disk) are removed when the build finishes, so the output only
//! ever reflects the current inputs.
//!
//! Every page carries `data-prev`/`data-next` links; `static/nav.js` binds them
//! to the left/right arrow keys.

use crate::config::{self, SiteConfig};
use crate::navigation::NavTarget;
use crate::sitemap::{SITEMAP_FILE, Sitemap};
use crate::types::{IndexPage, PageContent, Section};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use serde::Serialize;
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cannot copy assets from {path}: {source}")]
    Assets {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error("Cannot remove stale page {path}: {source}")]
    Clean {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Receives assembled payloads and turns them into output.
pub trait PageRenderer {
    fn render_index(&mut self, page: &IndexPage) -> Result<(), RenderError>;

    /// Render one example; `page.slug` is the output page identifier.
    fn render_example(&mut self, page: &PageContent) -> Result<(), RenderError>;

    fn render_sitemap(&mut self, sitemap: &Sitemap) -> Result<(), RenderError>;

    /// Called once after every page of a successful build was rendered.
    fn finish(&mut self) -> Result<(), RenderError> {
        Ok(())
    }
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const NAV_JS: &str = include_str!("../static/nav.js");

/// Label used for links pointing at the index page.
const INDEX_LABEL: &str = "Index";

// ============================================================================
// HTML renderer
// ============================================================================

/// Writes the static HTML site into the configured output directory.
pub struct HtmlRenderer {
    output_dir: PathBuf,
    site_title: String,
    css: String,
    /// Top-level output file names produced by this build, assets included.
    written: HashSet<OsString>,
}

impl HtmlRenderer {
    /// Create the output directory and copy `assets/` into it, if present.
    pub fn new(config: &SiteConfig) -> Result<Self, RenderError> {
        let output_dir = config.output_dir();
        fs::create_dir_all(&output_dir).map_err(|source| RenderError::Write {
            path: output_dir.clone(),
            source,
        })?;

        let assets = config.assets_dir();
        let written = if assets.is_dir() {
            copy_assets(&assets, &output_dir)?
        } else {
            HashSet::new()
        };

        let color_css = config::generate_color_css(&config.colors);
        Ok(Self {
            output_dir,
            site_title: config.site.title.clone(),
            css: format!("{color_css}\n\n{CSS_STATIC}"),
            written,
        })
    }

    fn write(&mut self, file_name: &str, contents: &str) -> Result<(), RenderError> {
        let path = self.output_dir.join(file_name);
        fs::write(&path, contents).map_err(|source| RenderError::Write { path, source })?;
        self.written.insert(file_name.into());
        Ok(())
    }

    /// Remove top-level `.html` files this build did not produce.
    fn remove_stale_pages(&self) -> Result<(), RenderError> {
        let clean_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| RenderError::Clean { path, source }
        };
        for entry in fs::read_dir(&self.output_dir).map_err(clean_err(&self.output_dir))? {
            let path = entry.map_err(clean_err(&self.output_dir))?.path();
            let is_page = path.is_file() && path.extension().is_some_and(|e| e == "html");
            let current = path
                .file_name()
                .is_some_and(|name| self.written.contains(name));
            if is_page && !current {
                fs::remove_file(&path).map_err(clean_err(&path))?;
                tracing::info!(file = %path.display(), "Removed stale page");
            }
        }
        Ok(())
    }
}

impl PageRenderer for HtmlRenderer {
    fn render_index(&mut self, page: &IndexPage) -> Result<(), RenderError> {
        let markup = render_index_page(page, &self.site_title, &self.css);
        self.write("index.html", &markup.into_string())?;
        tracing::debug!("Rendered index.html");
        Ok(())
    }

    fn render_example(&mut self, page: &PageContent) -> Result<(), RenderError> {
        let markup = render_example_page(page, &self.site_title, &self.css);
        let file_name = format!("{}.html", page.slug);
        self.write(&file_name, &markup.into_string())?;
        tracing::debug!(file = %file_name, "Rendered example page");
        Ok(())
    }

    fn render_sitemap(&mut self, sitemap: &Sitemap) -> Result<(), RenderError> {
        self.write(SITEMAP_FILE, &sitemap.to_xml())
    }

    fn finish(&mut self) -> Result<(), RenderError> {
        self.remove_stale_pages()
    }
}

/// Copy every file under `src` into `dst`, preserving relative paths.
///
/// Returns the names of the top-level entries it created in `dst`.
fn copy_assets(src: &Path, dst: &Path) -> Result<HashSet<OsString>, RenderError> {
    let mut top_level = HashSet::new();
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.map_err(|source| RenderError::Assets {
            path: src.to_path_buf(),
            source,
        })?;
        let Ok(rel) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(rel);
        let result = if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
        } else {
            fs::copy(entry.path(), &target).map(|_| ())
        };
        result.map_err(|source| RenderError::Write {
            path: target.clone(),
            source,
        })?;
        if entry.depth() == 1 {
            top_level.insert(entry.file_name().to_os_string());
        }
    }
    Ok(top_level)
}

// ============================================================================
// Manifest renderer
// ============================================================================

/// Everything a build produced, as data.
#[derive(Debug, Default, Serialize)]
pub struct SiteManifest {
    pub index: Option<IndexPage>,
    pub pages: Vec<PageContent>,
    pub sitemap: Vec<String>,
}

/// Collects payloads instead of writing files.
#[derive(Debug, Default)]
pub struct ManifestRenderer {
    pub manifest: SiteManifest,
}

impl ManifestRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_manifest(self) -> SiteManifest {
        self.manifest
    }
}

impl PageRenderer for ManifestRenderer {
    fn render_index(&mut self, page: &IndexPage) -> Result<(), RenderError> {
        self.manifest.index = Some(page.clone());
        Ok(())
    }

    fn render_example(&mut self, page: &PageContent) -> Result<(), RenderError> {
        self.manifest.pages.push(page.clone());
        Ok(())
    }

    fn render_sitemap(&mut self, sitemap: &Sitemap) -> Result<(), RenderError> {
        self.manifest.sitemap = sitemap.urls.clone();
        Ok(())
    }
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, css: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body {
                (content)
            }
        }
    }
}

/// Previous/next links plus the keyboard hook.
fn pager(previous: &NavTarget, next: &NavTarget) -> Markup {
    html! {
        nav.pager data-prev=(previous.href()) data-next=(next.href()) {
            a.prev href=(previous.href()) rel="prev" {
                "← " (previous.label(INDEX_LABEL))
            }
            a.next href=(next.href()) rel="next" {
                (next.label(INDEX_LABEL)) " →"
            }
        }
        script { (PreEscaped(NAV_JS)) }
    }
}

/// Comment prose is Markdown.
fn markdown_to_html(markdown: &str) -> String {
    let mut out = String::new();
    md_html::push_html(&mut out, Parser::new(markdown));
    out
}

/// One row per section: prose cell, code cell.
fn sections_table(sections: &[Section], kind: &str) -> Markup {
    html! {
        table class={ "sections " (kind) } {
            tbody {
                @for section in sections {
                    tr {
                        td.docs {
                            (PreEscaped(markdown_to_html(&section.comment)))
                        }
                        td.code.empty[section.code.trim().is_empty()] {
                            pre { code { (PreEscaped(&section.code)) } }
                        }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the index page: categories with their examples.
fn render_index_page(page: &IndexPage, site_title: &str, css: &str) -> Markup {
    let content = html! {
        main.index-page {
            h1 { (site_title) }
            @if !page.description.is_empty() {
                p.site-description { (page.description) }
            }
            @for category in &page.categories {
                section.category {
                    h2 { (category.name) }
                    ul {
                        @for item in &category.items {
                            li {
                                a href={ (item.slug) ".html" } { (item.title) }
                                @if !item.description.is_empty() {
                                    span.item-description { (item.description) }
                                }
                            }
                        }
                    }
                }
            }
        }
        (pager(&page.previous, &page.next))
    };

    let title = if page.title.is_empty() {
        site_title.to_string()
    } else {
        format!("{} | {}", page.title, site_title)
    };
    base_document(&title, css, content)
}

/// Renders one example page: every step's code and script sections.
fn render_example_page(page: &PageContent, site_title: &str, css: &str) -> Markup {
    let content = html! {
        header.site-header {
            a href="./" { (site_title) }
        }
        main.example-page {
            h1 { (page.title) }
            @if !page.description.is_empty() {
                p.example-description { (page.description) }
            }
            @for step in &page.contents {
                section.step {
                    @if !step.code.is_empty() {
                        (sections_table(&step.code, "code-file"))
                    }
                    @if !step.script.is_empty() {
                        (sections_table(&step.script, "script-file"))
                    }
                }
            }
        }
        (pager(&page.previous, &page.next))
    };

    base_document(&format!("{} | {}", page.title, site_title), css, content)
}

// ============================================================================
// Tests
// ============================================================================
