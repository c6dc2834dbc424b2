//! Site configuration module.
//!
//! Handles loading, validating, and merging `codewalk.toml`. The file is
//! optional and sparse: whatever it sets is merged over the stock defaults, and
//! the resolved [`SiteConfig`] is passed explicitly to every pipeline stage.
//! There is no process-wide configuration state.
//!
//! ## Config File Location
//!
//! ```text
//! project/
//! ├── codewalk.toml          # Optional; all paths below are relative to it
//! ├── catalog.json           # Ordered, categorized example list
//! ├── assets/                # Copied verbatim into the output root (optional)
//! └── examples/
//!     └── hello-world/
//!         ├── 1/
//!         │   ├── hello.js   # "code" file
//!         │   └── run.sh     # "script" file
//!         └── 2/
//!             └── hello.js
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! [site]
//! title = "Code Walk"
//! description = "Annotated example programs."
//! base_url = ""             # Used for sitemap URLs, e.g. "https://example.org"
//!
//! [paths]
//! examples = "examples"
//! catalog = "catalog.json"
//! output = "dist"
//! assets = "assets"
//!
//! [code]
//! extensions = ["js", "mjs", "cjs"]
//! language = "javascript"
//! comment = "//"
//!
//! [script]
//! extensions = ["sh"]
//! language = "bash"
//! comment = "#"
//!
//! [serve]
//! interface = "127.0.0.1"
//! port = 8080
//! debounce_ms = 300
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::segment::Syntax;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file looked up in the project root.
pub const CONFIG_FILE: &str = "codewalk.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `codewalk.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Project root every relative path is resolved against. Not read from
    /// the file; set by [`load_config`].
    #[serde(skip)]
    pub root: PathBuf,
    /// Site identity shown on the index page and used for sitemap URLs.
    pub site: SiteInfo,
    /// Input and output locations, relative to `root`.
    pub paths: PathsConfig,
    /// Conventions for the "code" file of each step.
    pub code: LanguageConfig,
    /// Conventions for the "script" file of each step.
    pub script: LanguageConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
    /// Development server settings.
    pub serve: ServeConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            site: SiteInfo::default(),
            paths: PathsConfig::default(),
            code: LanguageConfig {
                extensions: vec!["js".into(), "mjs".into(), "cjs".into()],
                language: "javascript".into(),
                comment: "//".into(),
            },
            script: LanguageConfig {
                extensions: vec!["sh".into()],
                language: "bash".into(),
                comment: "#".into(),
            },
            colors: ColorConfig::default(),
            serve: ServeConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, lang) in [("code", &self.code), ("script", &self.script)] {
            if lang.extensions.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{name}.extensions must not be empty"
                )));
            }
            if let Some(ext) = lang.extensions.iter().find(|e| e.is_empty() || e.starts_with('.')) {
                return Err(ConfigError::Validation(format!(
                    "{name}.extensions entries must be bare extensions, got {ext:?}"
                )));
            }
            if lang.comment.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{name}.comment must not be empty"
                )));
            }
        }
        if let Some(ext) = self
            .code
            .extensions
            .iter()
            .find(|e| self.script.matches_extension(e))
        {
            return Err(ConfigError::Validation(format!(
                "extension {ext:?} is listed for both code and script files"
            )));
        }
        if self.serve.debounce_ms == 0 {
            return Err(ConfigError::Validation(
                "serve.debounce_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn examples_dir(&self) -> PathBuf {
        self.root.join(&self.paths.examples)
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.root.join(&self.paths.catalog)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.paths.output)
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.root.join(&self.paths.assets)
    }

    /// Absolute URL of a site-relative path, e.g. `hello.html`.
    ///
    /// With an empty `base_url` the result is root-relative (`/hello.html`).
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.site.base_url.trim_end_matches('/'), path)
    }
}

/// Site identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    /// Site name, shown in page titles and the index heading.
    pub title: String,
    /// Static description rendered on the index page.
    pub description: String,
    /// Public origin of the site. Empty means root-relative sitemap URLs.
    pub base_url: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            title: "Code Walk".into(),
            description: "Annotated example programs, one step at a time.".into(),
            base_url: String::new(),
        }
    }
}

/// Input and output locations relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub examples: PathBuf,
    pub catalog: PathBuf,
    pub output: PathBuf,
    pub assets: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            examples: "examples".into(),
            catalog: "catalog.json".into(),
            output: "dist".into(),
            assets: "assets".into(),
        }
    }
}

/// How one kind of step file is recognized and segmented.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LanguageConfig {
    /// File extensions (without the dot) that identify this kind of file.
    pub extensions: Vec<String>,
    /// Language tag handed to the highlighter.
    pub language: String,
    /// Single-line comment marker that introduces prose lines.
    pub comment: String,
}

impl LanguageConfig {
    pub fn matches_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }

    /// Whether `path` is a file of this kind, judged by its extension.
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .map(|e| self.matches_extension(&e.to_string_lossy()))
            .unwrap_or(false)
    }

    pub fn syntax(&self) -> Syntax<'_> {
        Syntax {
            language: &self.language,
            comment: &self.comment,
        }
    }
}

/// Development server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServeConfig {
    pub interface: String,
    pub port: u16,
    /// Quiet period after the last file change before a rebuild starts.
    pub debounce_ms: u64,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: "127.0.0.1".into(),
            port: 8080,
            debounce_ms: 300,
        }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Muted text (navigation, captions).
    pub text_muted: String,
    pub border: String,
    pub link: String,
    /// Background of the code column.
    pub code_background: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#252519".to_string(),
            text_muted: "#808080".to_string(),
            border: "#e5e5ee".to_string(),
            link: "#0366d6".to_string(),
            code_background: "#f8f8ff".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#101014".to_string(),
            text: "#e8e8e8".to_string(),
            text_muted: "#8a8a8a".to_string(),
            border: "#2a2a33".to_string(),
            link: "#79b8ff".to_string(),
            code_background: "#17171d".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config does not serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, so an
///   `extensions` array is replaced, not appended to.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `codewalk.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load the site config rooted at `root`.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// validates the result, and records `root` for path resolution.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match load_raw_config(root)? {
        Some(overlay) => merge_toml(base, overlay),
        None => base,
    };
    let mut config: SiteConfig = merged.try_into()?;
    config.root = root.to_path_buf();
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `codewalk.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# codewalk configuration
# ======================
# All settings are optional. Values shown below are the defaults.
# Paths are relative to the directory containing this file.
# Unknown keys will cause an error.

[site]
title = "Code Walk"
# Shown on the index page.
description = "Annotated example programs, one step at a time."
# Public origin used for sitemap URLs, e.g. "https://example.org".
# Empty means root-relative URLs.
base_url = ""

[paths]
# One directory per example, each holding numbered steps: 1/, 2/, 10/ ...
examples = "examples"
# {"categories": [{"name": ..., "items": [{"dir", "slug", "title", "description"}]}]}
catalog = "catalog.json"
output = "dist"
# Copied verbatim into the output root when present.
assets = "assets"

# ---------------------------------------------------------------------------
# Step files. Each numbered step holds at most one code file and at most one
# script file. Sections are separated by two blank lines; lines starting with
# the comment marker become prose.
# ---------------------------------------------------------------------------
[code]
extensions = ["js", "mjs", "cjs"]
language = "javascript"
comment = "//"

[script]
extensions = ["sh"]
language = "bash"
comment = "#"

# ---------------------------------------------------------------------------
# Colors
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
text = "#252519"
text_muted = "#808080"
border = "#e5e5ee"
link = "#0366d6"
code_background = "#f8f8ff"

[colors.dark]
background = "#101014"
text = "#e8e8e8"
text_muted = "#8a8a8a"
border = "#2a2a33"
link = "#79b8ff"
code_background = "#17171d"

# ---------------------------------------------------------------------------
# Development server (codewalk serve)
# ---------------------------------------------------------------------------
[serve]
interface = "127.0.0.1"
port = 8080
# Quiet period after the last change before rebuilding.
debounce_ms = 300
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-border: {light_border};
    --color-link: {light_link};
    --color-code-bg: {light_code_bg};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-border: {dark_border};
        --color-link: {dark_link};
        --color-code-bg: {dark_code_bg};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_border = colors.light.border,
        light_link = colors.light.link,
        light_code_bg = colors.light.code_background,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_border = colors.dark.border,
        dark_link = colors.dark.link,
        dark_code_bg = colors.dark.code_background,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_is_valid() {
        SiteConfig::default().validate().unwrap();
    }

    #[test]
    fn default_languages() {
        let config = SiteConfig::default();
        assert_eq!(config.code.language, "javascript");
        assert_eq!(config.code.comment, "//");
        assert_eq!(config.script.language, "bash");
        assert_eq!(config.script.comment, "#");
    }

    #[test]
    fn stock_config_toml_parses_to_defaults() {
        let value: toml::Value = toml::from_str(stock_config_toml()).unwrap();
        let config: SiteConfig = value.try_into().unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.site.title, defaults.site.title);
        assert_eq!(config.code.extensions, defaults.code.extensions);
        assert_eq!(config.script.extensions, defaults.script.extensions);
        assert_eq!(config.colors.dark.background, defaults.colors.dark.background);
        assert_eq!(config.serve.port, defaults.serve.port);
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();

        assert_eq!(config.root, tmp.path());
        assert_eq!(config.paths.output, PathBuf::from("dist"));
        assert_eq!(config.examples_dir(), tmp.path().join("examples"));
    }

    #[test]
    fn partial_script_table_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "[script]\nextensions = [\"bash\", \"sh\"]\n",
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.script.extensions, vec!["bash", "sh"]);
        // Merged over stock defaults, not LanguageConfig::default()
        assert_eq!(config.script.language, "bash");
        assert_eq!(config.script.comment, "#");
        assert_eq!(config.code.comment, "//");
    }

    #[test]
    fn load_config_reads_paths() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "[paths]\nexamples = \"topics\"\noutput = \"public\"\n",
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.examples_dir(), tmp.path().join("topics"));
        assert_eq!(config.output_dir(), tmp.path().join("public"));
        assert_eq!(config.catalog_path(), tmp.path().join("catalog.json"));
    }

    #[test]
    fn unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[site]\ntitel = \"typo\"\n").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn invalid_toml_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[site\n").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn overlapping_extensions_rejected() {
        let mut config = SiteConfig::default();
        config.script.extensions.push("JS".into());
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn dotted_extension_rejected() {
        let mut config = SiteConfig::default();
        config.code.extensions = vec![".js".into()];
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn empty_comment_marker_rejected() {
        let mut config = SiteConfig::default();
        config.code.comment = " ".into();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn zero_debounce_rejected() {
        let mut config = SiteConfig::default();
        config.serve.debounce_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn language_matches_by_extension() {
        let config = SiteConfig::default();
        assert!(config.code.matches(Path::new("a/hello.js")));
        assert!(config.code.matches(Path::new("hello.MJS")));
        assert!(!config.code.matches(Path::new("run.sh")));
        assert!(!config.code.matches(Path::new("Makefile")));
        assert!(config.script.matches(Path::new("run.sh")));
    }

    #[test]
    fn url_for_with_and_without_base() {
        let mut config = SiteConfig::default();
        assert_eq!(config.url_for("hello.html"), "/hello.html");
        config.site.base_url = "https://example.org/".into();
        assert_eq!(config.url_for(""), "https://example.org/");
        assert_eq!(config.url_for("hello.html"), "https://example.org/hello.html");
    }

    #[test]
    fn merge_replaces_arrays() {
        let base: toml::Value = toml::from_str("a = [1, 2]\n[t]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("a = [3]\n[t]\ny = 5\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"].as_array().unwrap().len(), 1);
        assert_eq!(merged["t"]["x"].as_integer(), Some(1));
        assert_eq!(merged["t"]["y"].as_integer(), Some(5));
    }

    #[test]
    fn generate_css_uses_config_colors() {
        let mut colors = ColorConfig::default();
        colors.light.code_background = "#fafafa".to_string();
        colors.dark.background = "#1a1a1a".to_string();

        let css = generate_color_css(&colors);
        assert!(css.contains("--color-code-bg: #fafafa"));
        assert!(css.contains("--color-bg: #1a1a1a"));
    }
}
