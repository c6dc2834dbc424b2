//! Previous/next links for the linear tour through all examples.
//!
//! Examples form a line; the index page sits outside it and closes the loop:
//!
//! ```text
//!   index ──next──▶ A ◀──▶ B ◀──▶ C ──next──▶ index
//!   index ◀─prev── A                C ◀──prev── index
//! ```
//!
//! - entry `i` links to `i - 1` / `i + 1`, or to [`NavTarget::Root`] at the ends;
//! - the index page links forward to the first entry and back to the last.
//!
//! So the ends of the list never wrap to each other directly; they always pass
//! through the index.

use crate::catalog::CatalogEntry;
use serde::Serialize;

/// Where a previous/next link points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NavTarget {
    /// The site index.
    Root,
    Example { slug: String, title: String },
}

impl NavTarget {
    fn from_entry(entry: &CatalogEntry) -> Self {
        NavTarget::Example {
            slug: entry.slug.clone(),
            title: entry.title.clone(),
        }
    }

    /// Site-relative link to the target page.
    pub fn href(&self) -> String {
        match self {
            NavTarget::Root => "./".to_string(),
            NavTarget::Example { slug, .. } => format!("{slug}.html"),
        }
    }

    /// Link label; the index has no title of its own.
    pub fn label<'a>(&'a self, root_label: &'a str) -> &'a str {
        match self {
            NavTarget::Root => root_label,
            NavTarget::Example { title, .. } => title,
        }
    }

    pub fn slug(&self) -> Option<&str> {
        match self {
            NavTarget::Root => None,
            NavTarget::Example { slug, .. } => Some(slug),
        }
    }
}

/// The pair of links attached to one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub previous: NavTarget,
    pub next: NavTarget,
}

/// Links for every entry of the flat, existence-filtered list, in order.
pub fn link_entries(entries: &[CatalogEntry]) -> Vec<Navigation> {
    (0..entries.len())
        .map(|i| Navigation {
            previous: i
                .checked_sub(1)
                .map(|p| NavTarget::from_entry(&entries[p]))
                .unwrap_or(NavTarget::Root),
            next: entries
                .get(i + 1)
                .map(NavTarget::from_entry)
                .unwrap_or(NavTarget::Root),
        })
        .collect()
}

/// Links for the index page: forward to the first entry, back to the last.
pub fn link_root(entries: &[CatalogEntry]) -> Navigation {
    Navigation {
        previous: entries
            .last()
            .map(NavTarget::from_entry)
            .unwrap_or(NavTarget::Root),
        next: entries
            .first()
            .map(NavTarget::from_entry)
            .unwrap_or(NavTarget::Root),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::entry;

    fn to(slug: &str) -> NavTarget {
        NavTarget::Example {
            slug: slug.to_string(),
            title: slug.to_uppercase(),
        }
    }

    #[test]
    fn three_entries_link_through_root_at_ends() {
        let entries = vec![entry("a"), entry("b"), entry("c")];
        let nav = link_entries(&entries);

        assert_eq!(nav[0], Navigation { previous: NavTarget::Root, next: to("b") });
        assert_eq!(nav[1], Navigation { previous: to("a"), next: to("c") });
        assert_eq!(nav[2], Navigation { previous: to("b"), next: NavTarget::Root });
    }

    #[test]
    fn single_entry_points_to_root_both_ways() {
        let nav = link_entries(&[entry("only")]);
        assert_eq!(
            nav,
            vec![Navigation { previous: NavTarget::Root, next: NavTarget::Root }]
        );
    }

    #[test]
    fn no_entries_no_links() {
        assert!(link_entries(&[]).is_empty());
    }

    #[test]
    fn root_wraps_around() {
        let entries = vec![entry("a"), entry("b"), entry("c")];
        let root = link_root(&entries);
        assert_eq!(root.next, to("a"));
        assert_eq!(root.previous, to("c"));
    }

    #[test]
    fn root_of_single_entry() {
        let root = link_root(&[entry("a")]);
        assert_eq!(root.next, to("a"));
        assert_eq!(root.previous, to("a"));
    }

    #[test]
    fn root_of_empty_list_points_to_itself() {
        let root = link_root(&[]);
        assert_eq!(root.next, NavTarget::Root);
        assert_eq!(root.previous, NavTarget::Root);
    }

    #[test]
    fn every_link_resolves_for_longer_lists() {
        let entries: Vec<_> = (0..7).map(|i| entry(&format!("e{i}"))).collect();
        let nav = link_entries(&entries);

        for (i, links) in nav.iter().enumerate() {
            let expected_next = entries.get(i + 1).map(|e| e.slug.as_str());
            let expected_prev = i.checked_sub(1).map(|p| entries[p].slug.as_str());
            assert_eq!(links.next.slug(), expected_next);
            assert_eq!(links.previous.slug(), expected_prev);
        }
    }

    #[test]
    fn deterministic() {
        let entries = vec![entry("a"), entry("b")];
        assert_eq!(link_entries(&entries), link_entries(&entries));
    }

    #[test]
    fn hrefs() {
        assert_eq!(NavTarget::Root.href(), "./");
        assert_eq!(to("closures").href(), "closures.html");
    }

    #[test]
    fn labels() {
        assert_eq!(NavTarget::Root.label("Index"), "Index");
        assert_eq!(to("closures").label("Index"), "CLOSURES");
    }
}
