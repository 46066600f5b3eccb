use serde::{Deserialize, Serialize};

use super::Category;
use crate::Money;

/// A size/price option of a catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeVariant {
    pub label: String,
    /// Longer label shown next to the price, e.g. "9 Inch (Serves 10–14)".
    #[serde(default)]
    pub description: Option<String>,
    pub price: Money,
    /// Another entry holding the same recipe at this size.
    #[serde(default)]
    pub linked_entry: Option<String>,
}

impl SizeVariant {
    pub fn new(label: impl Into<String>, price: Money) -> Self {
        Self {
            label: label.into(),
            description: None,
            price,
            linked_entry: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn linked_to(mut self, entry_name: impl Into<String>) -> Self {
        self.linked_entry = Some(entry_name.into());
        self
    }

    /// Whether this variant sells `entry_name` itself, i.e. it is unlinked or
    /// linked back to that entry.
    pub fn belongs_to(&self, entry_name: &str) -> bool {
        match self.linked_entry.as_deref() {
            Some(linked) => linked == entry_name,
            None => true,
        }
    }

    pub fn display_description(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.label)
    }
}

/// A named, priced, purchasable product.
///
/// A 9-inch and a 6-inch version of one recipe are two entries, tied together
/// through their size variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub base_price: Money,
    pub short_description: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub disclaimer: Option<String>,
    #[serde(default)]
    pub categories: Vec<Category>,
    /// Gallery images; the first one is the thumbnail.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<SizeVariant>,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, base_price: Money) -> Self {
        Self {
            name: name.into(),
            base_price,
            short_description: String::new(),
            description: None,
            disclaimer: None,
            categories: Vec::new(),
            images: Vec::new(),
            sizes: Vec::new(),
        }
    }

    pub fn with_short_description(mut self, text: impl Into<String>) -> Self {
        self.short_description = text.into();
        self
    }

    pub fn with_categories(mut self, categories: &[Category]) -> Self {
        self.categories = categories.to_vec();
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.images.push(image.into());
        self
    }

    pub fn with_size(mut self, size: SizeVariant) -> Self {
        self.sizes.push(size);
        self
    }

    pub fn thumbnail(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    pub fn in_category(&self, category: Category) -> bool {
        category == Category::All || self.categories.contains(&category)
    }

    /// The variant at `index` if it can be bought as this entry. Variants
    /// linked to another entry are only a way to get to that entry.
    pub fn own_size(&self, index: usize) -> Option<&SizeVariant> {
        self.sizes
            .get(index)
            .filter(|size| size.belongs_to(&self.name))
    }

    /// The variant that represents this entry itself, or the first one.
    ///
    /// Entries without variants still report index 0; callers treat a missing
    /// variant as "no size, base price".
    pub fn default_size_index(&self) -> usize {
        self.sizes
            .iter()
            .position(|size| size.linked_entry.as_deref() == Some(self.name.as_str()))
            .unwrap_or(0)
    }
}
