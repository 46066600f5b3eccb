//! Read-only product catalog.
//!
//! Entries are loaded once and never mutated. The cart copies what it needs out
//! of an entry at add time, so nothing here is referenced after that.

mod category;
mod entry;
mod search;

use std::{collections::HashSet, path::Path};

use serde::Deserialize;
use thiserror::Error;

pub use category::*;
pub use entry::*;
pub use search::SearchResults;

const BAKERY_CATALOG: &str = include_str!("../../data/catalog.toml");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("duplicate catalog entry: {0}")]
    DuplicateEntry(String),
    #[error("negative price on catalog entry: {0}")]
    NegativePrice(String),
    #[error("failed to read catalog at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Outcome of picking a size variant on an entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VariantResolution<'a> {
    /// Same product, price follows the variant.
    Selected {
        index: usize,
        variant: &'a SizeVariant,
    },
    /// The variant is another named product; the caller switches to it and
    /// starts over at quantity 1.
    Navigate { target: &'a CatalogEntry },
    /// Broken link or out-of-range index. Not selectable.
    Inert,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    entries: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.name.as_str()) {
                return Err(CatalogError::DuplicateEntry(entry.name.clone()));
            }
            if entry.base_price.is_negative() || entry.sizes.iter().any(|s| s.price.is_negative())
            {
                return Err(CatalogError::NegativePrice(entry.name.clone()));
            }
        }

        Ok(Self { entries })
    }

    /// The storefront's built-in product list.
    pub fn bakery() -> Result<Self, CatalogError> {
        Self::from_toml_str(BAKERY_CATALOG)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(raw)?;
        Self::new(file.entries)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact, case-sensitive lookup.
    pub fn find_by_name(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn resolve_variant<'a>(
        &'a self,
        entry: &'a CatalogEntry,
        size_index: usize,
    ) -> VariantResolution<'a> {
        let Some(variant) = entry.sizes.get(size_index) else {
            return VariantResolution::Inert;
        };

        if variant.belongs_to(&entry.name) {
            return VariantResolution::Selected {
                index: size_index,
                variant,
            };
        }

        match variant
            .linked_entry
            .as_deref()
            .and_then(|linked| self.find_by_name(linked))
        {
            Some(target) => VariantResolution::Navigate { target },
            None => VariantResolution::Inert,
        }
    }

    /// Whether the variant at `size_index` can be picked at all.
    pub fn is_selectable(&self, entry: &CatalogEntry, size_index: usize) -> bool {
        !matches!(
            self.resolve_variant(entry, size_index),
            VariantResolution::Inert
        )
    }

    pub fn filter_by_category(&self, category: Category) -> Vec<&CatalogEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.in_category(category))
            .collect()
    }

    pub fn search(&self, query: &str) -> SearchResults<'_> {
        search::search(&self.entries, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Money;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            CatalogEntry::new("Signature Mille Crêpes - 9 inches", Money::from_major(115))
                .with_categories(&[Category::Best, Category::Birthday])
                .with_size(
                    SizeVariant::new("9 Inch", Money::from_major(115))
                        .linked_to("Signature Mille Crêpes - 9 inches"),
                )
                .with_size(
                    SizeVariant::new("6 Inch", Money::from_major(70))
                        .linked_to("Signature Mille Crêpes - 6 inches"),
                ),
            CatalogEntry::new("Signature Mille Crêpes - 6 inches", Money::from_major(70))
                .with_categories(&[Category::Graduation])
                .with_size(
                    SizeVariant::new("9 Inch", Money::from_major(115))
                        .linked_to("Signature Mille Crêpes - 9 inches"),
                )
                .with_size(
                    SizeVariant::new("6 Inch", Money::from_major(70))
                        .linked_to("Signature Mille Crêpes - 6 inches"),
                ),
            CatalogEntry::new("Checkers - 9 inches", Money::from_major(115))
                .with_categories(&[Category::Birthday])
                .with_size(SizeVariant::new("9 Inch", Money::from_major(115)))
                .with_size(
                    SizeVariant::new("6 Inch", Money::from_major(70))
                        .linked_to("Checkers - 6 inches"),
                ),
        ])
        .unwrap()
    }

    #[test]
    fn find_by_name_is_exact() {
        let catalog = catalog();
        assert!(catalog.find_by_name("Checkers - 9 inches").is_some());
        assert!(catalog.find_by_name("checkers - 9 inches").is_none());
        assert!(catalog.find_by_name("Checkers").is_none());
    }

    #[test]
    fn self_linked_variant_is_selected() {
        let catalog = catalog();
        let entry = catalog.find_by_name("Signature Mille Crêpes - 9 inches").unwrap();
        match catalog.resolve_variant(entry, 0) {
            VariantResolution::Selected { index, variant } => {
                assert_eq!(index, 0);
                assert_eq!(variant.price, Money::from_major(115));
            }
            other => panic!("expected selection, got {other:?}"),
        }
    }

    #[test]
    fn unlinked_variant_is_selected() {
        let catalog = catalog();
        let entry = catalog.find_by_name("Checkers - 9 inches").unwrap();
        assert!(matches!(
            catalog.resolve_variant(entry, 0),
            VariantResolution::Selected { index: 0, .. }
        ));
    }

    #[test]
    fn linked_variant_navigates_to_other_entry() {
        let catalog = catalog();
        let entry = catalog.find_by_name("Signature Mille Crêpes - 9 inches").unwrap();
        match catalog.resolve_variant(entry, 1) {
            VariantResolution::Navigate { target } => {
                assert_eq!(target.name, "Signature Mille Crêpes - 6 inches");
                assert_eq!(target.base_price, Money::from_major(70));
            }
            other => panic!("expected navigation, got {other:?}"),
        }
    }

    #[test]
    fn dangling_link_is_inert() {
        let catalog = catalog();
        let entry = catalog.find_by_name("Checkers - 9 inches").unwrap();
        assert_eq!(catalog.resolve_variant(entry, 1), VariantResolution::Inert);
        assert!(!catalog.is_selectable(entry, 1));
        assert!(catalog.is_selectable(entry, 0));
    }

    #[test]
    fn out_of_range_index_is_inert() {
        let catalog = catalog();
        let entry = catalog.find_by_name("Checkers - 9 inches").unwrap();
        assert_eq!(catalog.resolve_variant(entry, 7), VariantResolution::Inert);
    }

    #[test]
    fn filter_keeps_catalog_order() {
        let catalog = catalog();
        let birthday: Vec<_> = catalog
            .filter_by_category(Category::Birthday)
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(
            birthday,
            vec!["Signature Mille Crêpes - 9 inches", "Checkers - 9 inches"]
        );
        assert_eq!(catalog.filter_by_category(Category::All).len(), 3);
        assert!(catalog.filter_by_category(Category::Gluten).is_empty());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = Catalog::new(vec![
            CatalogEntry::new("Checkers - 9 inches", Money::from_major(115)),
            CatalogEntry::new("Checkers - 9 inches", Money::from_major(100)),
        ])
        .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateEntry(name) if name == "Checkers - 9 inches"));
    }

    #[test]
    fn parses_toml_catalog() {
        let catalog = Catalog::from_toml_str(
            r#"
            [[entries]]
            name = "Couronne du Chocolat - 9 inches"
            base_price = 102
            short_description = "Chocolate sponge with dark chocolate mousse"
            categories = ["birthday", "graduation"]
            images = ["cake11-overlay-img1.png"]

            [[entries.sizes]]
            label = "9 Inch"
            price = 102

            [[entries.sizes]]
            label = "6 Inch"
            price = 60
            linked_entry = "Couronne du Chocolat - 6 inches"
            "#,
        )
        .unwrap();

        let entry = catalog.find_by_name("Couronne du Chocolat - 9 inches").unwrap();
        assert_eq!(entry.sizes.len(), 2);
        assert_eq!(entry.sizes[1].price, Money::from_major(60));
        assert!(entry.in_category(Category::Graduation));
        assert!(!catalog.is_selectable(entry, 1));
    }

    #[test]
    fn built_in_catalog_loads() {
        let catalog = Catalog::bakery().unwrap();
        assert!(!catalog.is_empty());

        let signature = catalog.find_by_name("Signature Mille Crêpes - 9 inches").unwrap();
        assert_eq!(signature.base_price, Money::from_major(115));
        assert_eq!(signature.sizes[0].label, "9 Inch");
        assert!(matches!(
            catalog.resolve_variant(signature, 1),
            VariantResolution::Navigate { .. }
        ));
        assert!(!catalog.filter_by_category(Category::Gluten).is_empty());
    }
}
