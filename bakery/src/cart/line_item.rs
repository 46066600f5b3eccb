use serde::{Deserialize, Serialize};

use super::IdentityKey;
use crate::Money;

/// Display fields copied out of the catalog when the line was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySnapshot {
    pub name: String,
    pub short_description: String,
    pub image: String,
}

/// One cart row. Quantity is always at least 1.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    key: IdentityKey,
    quantity: u32,
    unit_price: Money,
    snapshot: DisplaySnapshot,
}

impl LineItem {
    pub(crate) fn new(
        key: IdentityKey,
        quantity: u32,
        unit_price: Money,
        snapshot: DisplaySnapshot,
    ) -> Self {
        debug_assert!(quantity >= 1);
        Self {
            key,
            quantity,
            unit_price,
            snapshot,
        }
    }

    pub fn key(&self) -> &IdentityKey {
        &self.key
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn snapshot(&self) -> &DisplaySnapshot {
        &self.snapshot
    }

    /// Unrounded `quantity × unit price`.
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }

    pub(crate) fn add_quantity(&mut self, quantity: u32) {
        self.quantity = self.quantity.saturating_add(quantity);
    }

    /// Returns false when the line should be removed instead.
    pub(crate) fn decrement(&mut self) -> bool {
        if self.quantity > 1 {
            self.quantity -= 1;
            true
        } else {
            false
        }
    }
}

/// Persisted shape of a line item.
///
/// The identity key is rebuilt from `identity_name` and `size_label`; nothing
/// else is stored for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedLineItem {
    pub identity_name: String,
    #[serde(default)]
    pub size_label: String,
    #[serde(default)]
    pub image_ref: String,
    pub display_name: String,
    #[serde(default)]
    pub short_desc: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl From<&LineItem> for PersistedLineItem {
    fn from(item: &LineItem) -> Self {
        Self {
            identity_name: item.key.entry_name.clone(),
            size_label: item.key.size_label.clone(),
            image_ref: item.snapshot.image.clone(),
            display_name: item.snapshot.name.clone(),
            short_desc: item.snapshot.short_description.clone(),
            unit_price: item.unit_price,
            quantity: item.quantity,
        }
    }
}

impl PersistedLineItem {
    /// A row a cart could have written: non-negative price and a line total
    /// that fits in [`Money`].
    pub fn is_well_formed(&self) -> bool {
        !self.unit_price.is_negative() && self.unit_price.checked_times(self.quantity).is_some()
    }

    /// `None` for rows that cannot be a line item (zero quantity).
    pub(crate) fn into_line_item(self) -> Option<LineItem> {
        if self.quantity == 0 {
            return None;
        }

        Some(LineItem::new(
            IdentityKey::new(&self.identity_name, &self.size_label),
            self.quantity,
            self.unit_price,
            DisplaySnapshot {
                name: self.display_name,
                short_description: self.short_desc,
                image: self.image_ref,
            },
        ))
    }
}
