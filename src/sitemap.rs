//! Sitemap generation.
//!
//! One `<url>` for the site root plus one per rendered example page:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.org/</loc>
//!   </url>
//!   <url>
//!     <loc>https://example.org/hello-world.html</loc>
//!   </url>
//! </urlset>
//! ```

use crate::catalog::CatalogEntry;
use crate::config::SiteConfig;
use serde::Serialize;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// File name of the sitemap inside the output directory.
pub const SITEMAP_FILE: &str = "sitemap.xml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sitemap {
    pub urls: Vec<String>,
}

impl Sitemap {
    /// Root URL first, then every entry in tour order.
    pub fn new(config: &SiteConfig, entries: &[CatalogEntry]) -> Self {
        let urls = std::iter::once(config.url_for(""))
            .chain(
                entries
                    .iter()
                    .map(|e| config.url_for(&format!("{}.html", e.slug))),
            )
            .collect();
        Self { urls }
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(64 + self.urls.len() * 64);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<urlset xmlns="{SITEMAP_NS}">"#));
        xml.push('\n');
        for url in &self.urls {
            xml.push_str("  <url>\n");
            xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(url)));
            xml.push_str("  </url>\n");
        }
        xml.push_str("</urlset>\n");
        xml
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::entry;

    #[test]
    fn root_then_entries() {
        let mut config = SiteConfig::default();
        config.site.base_url = "https://example.org".into();
        let sitemap = Sitemap::new(&config, &[entry("a"), entry("b")]);
        assert_eq!(
            sitemap.urls,
            vec![
                "https://example.org/",
                "https://example.org/a.html",
                "https://example.org/b.html"
            ]
        );
    }

    #[test]
    fn empty_catalog_still_lists_root() {
        let sitemap = Sitemap::new(&SiteConfig::default(), &[]);
        assert_eq!(sitemap.urls, vec!["/"]);
    }

    #[test]
    fn xml_has_one_url_element_per_url() {
        let sitemap = Sitemap::new(&SiteConfig::default(), &[entry("a"), entry("b")]);
        let xml = sitemap.to_xml();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains(SITEMAP_NS));
        assert_eq!(xml.matches("<url>").count(), 3);
        assert!(xml.contains("<loc>/a.html</loc>"));
    }

    #[test]
    fn urls_are_escaped() {
        let sitemap = Sitemap {
            urls: vec!["https://example.org/?a=1&b=<2>".into()],
        };
        assert!(
            sitemap
                .to_xml()
                .contains("<loc>https://example.org/?a=1&amp;b=&lt;2&gt;</loc>")
        );
    }
}
