use super::CatalogEntry;

/// Catalog entries reordered by a search query.
#[derive(Debug, Default)]
pub struct SearchResults<'a> {
    pub matched: Vec<&'a CatalogEntry>,
    pub unmatched: Vec<&'a CatalogEntry>,
}

impl<'a> SearchResults<'a> {
    /// Matched entries first, then the rest, each group in catalog order.
    pub fn ordered(&self) -> impl Iterator<Item = &'a CatalogEntry> + '_ {
        self.matched.iter().chain(self.unmatched.iter()).copied()
    }

    pub fn is_match(&self, entry: &CatalogEntry) -> bool {
        self.matched.iter().any(|m| m.name == entry.name)
    }
}

/// Splits `entries` by whether any word of the entry name starts with `query`.
///
/// The query is trimmed and lowercased; an empty query matches nothing.
pub(super) fn search<'a>(
    entries: impl IntoIterator<Item = &'a CatalogEntry>,
    query: &str,
) -> SearchResults<'a> {
    let query = query.trim().to_lowercase();
    let mut results = SearchResults::default();

    for entry in entries {
        if !query.is_empty() && name_matches(&entry.name, &query) {
            results.matched.push(entry);
        } else {
            results.unmatched.push(entry);
        }
    }

    results
}

fn name_matches(name: &str, query: &str) -> bool {
    name.to_lowercase()
        .split_whitespace()
        .any(|word| word.starts_with(query))
}
