//! # Codewalk
//!
//! A static site generator for annotated, step-by-step code tutorials. Authors
//! write ordinary source files; comment lines become prose and the code next
//! to them is shown alongside, one section per blank-line-separated block.
//!
//! # Project Layout
//!
//! ```text
//! project/
//! ├── codewalk.toml              # Optional config (sparse, merged over defaults)
//! ├── catalog.json               # Categories → ordered examples
//! ├── assets/                    # Copied verbatim into the output root
//! └── examples/
//!     └── closures/              # One directory per example
//!         ├── 1/closures.js      # Numbered steps, in numeric order
//!         ├── 2/counter.js
//!         └── 2/counter.sh       # Optional script file per step
//! ```
//!
//! # Pipeline
//!
//! ```text
//! catalog ─▶ filter present ─▶ link prev/next ─▶ load steps ─▶ segment ─▶ render
//! ```
//!
//! Every stage takes an explicit [`config::SiteConfig`]; there is no global
//! state, so tests build sites in temp directories side by side.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`site`] | Orchestrates a build: catalog → navigation → pages → sitemap |
//! | [`catalog`] | Loads, validates and filters the JSON catalog |
//! | [`scan`] | Loads an example's numbered step directories |
//! | [`segment`] | Splits a source file into comment/code sections |
//! | [`highlight`] | Syntax highlighting behind the `Highlighter` trait |
//! | [`navigation`] | Previous/next links with the index as the loop point |
//! | [`render`] | `PageRenderer` trait, Maud HTML output and in-memory manifest |
//! | [`sitemap`] | `sitemap.xml` generation |
//! | [`config`] | `codewalk.toml` loading, validation, merging and CSS generation |
//! | [`types`] | Render payloads shared between stages |
//! | [`naming`] | Step directory names and slug rules |
//! | [`output`] | CLI output formatting |
//! | [`watch`] | File watching and the rebuild state machine |
//! | [`serve`] | Development server with live reload |
//!
//! # Design Decisions
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), so templates are
//! checked at compile time, interpolation is escaped by default, and there is
//! no template directory to ship or get out of sync.
//!
//! ## Renderers Are Pluggable, Templates Are Not
//!
//! The builder only talks to a [`render::PageRenderer`]. HTML output, the
//! JSON manifest and `codewalk check` are all renderers over the same build.
//!
//! ## Missing Examples Are Not Errors
//!
//! A catalog may list examples that are not written yet. They are left out of
//! the site and out of navigation, and the build reports them. A file that is
//! present but unreadable is an error.

pub mod catalog;
pub mod config;
pub mod highlight;
pub mod naming;
pub mod navigation;
pub mod output;
pub mod render;
pub mod scan;
pub mod segment;
pub mod serve;
pub mod site;
pub mod sitemap;
pub mod types;
pub mod watch;

#[cfg(test)]
pub(crate) mod test_helpers;
