//! The cart engine.
//!
//! All mutation goes through [`Cart`]. Lines are keyed by [`IdentityKey`];
//! adding an existing key bumps its quantity in place, a new key goes to the
//! front. Persistence happens only when the caller asks for it.

mod identity;
mod line_item;

use tracing::{debug, warn};

pub use identity::*;
pub use line_item::*;

use crate::{
    store::{CartStore, StoreError},
    Catalog, CatalogEntry, PricingPolicy, Totals,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Newest first.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&LineItem> {
        self.items.get(index)
    }

    pub fn find(&self, key: &IdentityKey) -> Option<&LineItem> {
        self.items.iter().find(|item| item.key() == key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities, as shown on the cart badge.
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |count, item| count.saturating_add(item.quantity()))
    }

    /// Adds `quantity` of `entry` at the size at `size_index`.
    ///
    /// An entry without sizes is added under an empty size label at its base
    /// price. A zero quantity, a size index past the end, or a size linked to
    /// another entry is ignored; such a size is bought from the entry it links
    /// to, never under this one.
    pub fn add_item(&mut self, entry: &CatalogEntry, size_index: usize, quantity: u32) {
        let (label, price) = if entry.sizes.is_empty() {
            ("", entry.base_price)
        } else {
            match entry.own_size(size_index) {
                Some(size) => (size.label.as_str(), size.price),
                None => {
                    warn!(entry = %entry.name, size_index, "size not sold by this entry, skipping add");
                    return;
                }
            }
        };

        self.insert(entry, IdentityKey::new(&entry.name, label), price, quantity);
    }

    /// Looks `name` up in `catalog` and adds it; unknown names are skipped.
    pub fn add_by_name(&mut self, catalog: &Catalog, name: &str, size_index: usize, quantity: u32) {
        match catalog.find_by_name(name) {
            Some(entry) => self.add_item(entry, size_index, quantity),
            None => debug!(name, "not in catalog, skipping add"),
        }
    }

    /// One unit at the entry's default size and base price, like the order
    /// button on a catalog card.
    pub fn quick_add(&mut self, catalog: &Catalog, name: &str) {
        let Some(entry) = catalog.find_by_name(name) else {
            debug!(name, "not in catalog, skipping quick add");
            return;
        };

        let label = if entry.sizes.is_empty() {
            ""
        } else {
            match entry.own_size(entry.default_size_index()) {
                Some(size) => size.label.as_str(),
                None => {
                    warn!(entry = %entry.name, "default size not sold by this entry, skipping quick add");
                    return;
                }
            }
        };

        self.insert(entry, IdentityKey::new(&entry.name, label), entry.base_price, 1);
    }

    fn insert(
        &mut self,
        entry: &CatalogEntry,
        key: IdentityKey,
        unit_price: crate::Money,
        quantity: u32,
    ) {
        if quantity == 0 {
            debug!(%key, "zero quantity, skipping add");
            return;
        }

        if let Some(existing) = self.items.iter_mut().find(|item| item.key() == &key) {
            existing.add_quantity(quantity);
            debug!(%key, quantity = existing.quantity(), "merged into existing line");
            return;
        }

        let snapshot = DisplaySnapshot {
            name: entry.name.clone(),
            short_description: entry.short_description.clone(),
            image: entry.thumbnail().unwrap_or_default().to_string(),
        };
        debug!(%key, quantity, %unit_price, "new line");
        self.items
            .insert(0, LineItem::new(key, quantity, unit_price, snapshot));
    }

    pub fn increment_item(&mut self, index: usize) {
        if let Some(item) = self.items.get_mut(index) {
            item.add_quantity(1);
        }
    }

    /// Removes the line when its quantity would drop below 1.
    pub fn decrement_item(&mut self, index: usize) {
        let Some(item) = self.items.get_mut(index) else {
            return;
        };

        if !item.decrement() {
            let removed = self.items.remove(index);
            debug!(key = %removed.key(), "line removed");
        }
    }

    /// Empties the cart. Confirmation is the caller's job.
    pub fn remove_all(&mut self) {
        debug!(lines = self.items.len(), "cart cleared");
        self.items.clear();
    }

    pub fn compute_totals(&self, pricing: &PricingPolicy) -> Totals {
        pricing.totals(&self.items)
    }

    pub fn to_persisted(&self) -> Vec<PersistedLineItem> {
        self.items.iter().map(PersistedLineItem::from).collect()
    }

    /// Rebuilds a cart from persisted rows. Zero-quantity rows are dropped and
    /// repeated keys merge into their first occurrence.
    pub fn from_persisted(rows: Vec<PersistedLineItem>) -> Self {
        let mut items: Vec<LineItem> = Vec::with_capacity(rows.len());
        for item in rows.into_iter().filter_map(PersistedLineItem::into_line_item) {
            match items.iter_mut().find(|existing| existing.key() == item.key()) {
                Some(existing) => existing.add_quantity(item.quantity()),
                None => items.push(item),
            }
        }
        Self { items }
    }

    pub fn serialize(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(&self.to_persisted())?)
    }

    /// Never fails: a malformed blob gives an empty cart. A blob holding a
    /// negative price or a line total too large to represent counts as malformed.
    pub fn deserialize(blob: &str) -> Self {
        match serde_json::from_str::<Vec<PersistedLineItem>>(blob) {
            Ok(rows) if rows.iter().all(PersistedLineItem::is_well_formed) => {
                Self::from_persisted(rows)
            }
            Ok(_) => {
                warn!("cart blob has out-of-range rows, starting empty");
                Self::new()
            }
            Err(e) => {
                warn!(error = %e, "malformed cart blob, starting empty");
                Self::new()
            }
        }
    }

    /// Saves the whole cart, replacing whatever the store held.
    pub fn persist(&self, store: &dyn CartStore) -> Result<(), StoreError> {
        store.write(&self.serialize()?)
    }

    /// Loads the saved cart; an absent blob or an unusable store gives an empty cart.
    pub fn restore(store: &dyn CartStore) -> Self {
        match store.read() {
            Ok(Some(blob)) => Self::deserialize(&blob),
            Ok(None) => Self::new(),
            Err(e) => {
                warn!(error = %e, "cart store unavailable, starting empty");
                Self::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{store::MemoryCartStore, Category, Money, SizeVariant};

    const SIGNATURE_9: &str = "Signature Mille Crêpes - 9 inches";
    const SIGNATURE_6: &str = "Signature Mille Crêpes - 6 inches";
    const CHECKERS_9: &str = "Checkers - 9 inches";

    fn catalog() -> Catalog {
        Catalog::new(vec![
            CatalogEntry::new(SIGNATURE_9, Money::from_major(115))
                .with_short_description("Classic crêpes with light pastry cream")
                .with_categories(&[Category::Best])
                .with_image("cake3-overlay-img1.png")
                .with_image("cake3-overlay-img2.png")
                .with_size(SizeVariant::new("9 Inch", Money::from_major(115)).linked_to(SIGNATURE_9))
                .with_size(SizeVariant::new("6 Inch", Money::from_major(70)).linked_to(SIGNATURE_6)),
            CatalogEntry::new(SIGNATURE_6, Money::from_major(70))
                .with_short_description("Classic crêpes with light pastry cream")
                .with_image("cake4-overlay-img1.png")
                .with_size(SizeVariant::new("9 Inch", Money::from_major(115)).linked_to(SIGNATURE_9))
                .with_size(SizeVariant::new("6 Inch", Money::from_major(70)).linked_to(SIGNATURE_6)),
            CatalogEntry::new(CHECKERS_9, Money::from_major(115))
                .with_short_description("Checkerboard sponge with chocolate ganache")
                .with_size(SizeVariant::new("9 Inch", Money::from_major(115)))
                .with_size(SizeVariant::new("6 Inch", Money::from_major(70))),
            CatalogEntry::new("Gift Card", Money::from_major(50)),
        ])
        .unwrap()
    }

    fn entry<'a>(catalog: &'a Catalog, name: &str) -> &'a CatalogEntry {
        catalog.find_by_name(name).unwrap()
    }

    fn names(cart: &Cart) -> Vec<String> {
        cart.items().iter().map(|i| i.key().to_string()).collect()
    }

    #[test]
    fn repeated_adds_merge_into_one_line() {
        let catalog = catalog();
        let mut cart = Cart::new();
        for qty in [1, 4, 2, 3] {
            cart.add_item(entry(&catalog, CHECKERS_9), 0, qty);
        }
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity(), 10);
    }

    #[test]
    fn signature_scenario_totals() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_item(entry(&catalog, SIGNATURE_9), 0, 1);
        cart.add_item(entry(&catalog, SIGNATURE_9), 0, 2);

        assert_eq!(cart.len(), 1);
        let line = &cart.items()[0];
        assert_eq!(line.quantity(), 3);
        assert_eq!(line.key(), &IdentityKey::new(SIGNATURE_9, "9 Inch"));

        let totals = cart.compute_totals(&PricingPolicy::default());
        assert_eq!(totals.subtotal.to_string(), "$345.00");
        assert_eq!(totals.tax.to_string(), "$27.60");
        assert_eq!(totals.delivery_fee.to_string(), "$10.00");
        assert_eq!(totals.total.to_string(), "$382.60");
    }

    #[test]
    fn new_lines_go_to_front_and_increments_stay_put() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_item(entry(&catalog, SIGNATURE_9), 0, 1);
        cart.add_item(entry(&catalog, CHECKERS_9), 0, 1);
        cart.add_item(entry(&catalog, CHECKERS_9), 1, 1);
        assert_eq!(
            names(&cart),
            vec![
                "Checkers - 9 inches (6 Inch)",
                "Checkers - 9 inches (9 Inch)",
                "Signature Mille Crêpes - 9 inches (9 Inch)",
            ]
        );

        cart.add_item(entry(&catalog, SIGNATURE_9), 0, 1);
        cart.increment_item(1);
        assert_eq!(
            names(&cart),
            vec![
                "Checkers - 9 inches (6 Inch)",
                "Checkers - 9 inches (9 Inch)",
                "Signature Mille Crêpes - 9 inches (9 Inch)",
            ]
        );
        assert_eq!(cart.items()[1].quantity(), 2);
        assert_eq!(cart.items()[2].quantity(), 2);
    }

    #[test]
    fn different_sizes_are_different_lines() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_item(entry(&catalog, CHECKERS_9), 0, 1);
        cart.add_item(entry(&catalog, CHECKERS_9), 1, 1);
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.items()[0].unit_price(), Money::from_major(70));
        assert_eq!(cart.items()[1].unit_price(), Money::from_major(115));
    }

    #[test]
    fn snapshot_is_taken_at_add_time() {
        let mut catalog_entry = entry(&catalog(), SIGNATURE_9).clone();
        let mut cart = Cart::new();
        cart.add_item(&catalog_entry, 0, 1);

        catalog_entry.sizes[0].price = Money::from_major(999);
        catalog_entry.short_description = "changed".to_string();
        cart.add_item(&catalog_entry, 0, 1);

        let line = &cart.items()[0];
        assert_eq!(line.quantity(), 2);
        assert_eq!(line.unit_price(), Money::from_major(115));
        assert_eq!(line.snapshot().short_description, "Classic crêpes with light pastry cream");
        assert_eq!(line.snapshot().image, "cake3-overlay-img1.png");
    }

    #[test]
    fn entry_without_sizes_uses_base_price() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_item(entry(&catalog, "Gift Card"), 0, 2);
        let line = &cart.items()[0];
        assert_eq!(line.key().size_label, "");
        assert_eq!(line.unit_price(), Money::from_major(50));
        assert_eq!(line.snapshot().image, "");
    }

    #[test]
    fn invalid_adds_are_ignored() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_item(entry(&catalog, CHECKERS_9), 0, 0);
        cart.add_item(entry(&catalog, CHECKERS_9), 5, 1);
        cart.add_by_name(&catalog, "Opera Cake", 0, 1);
        cart.quick_add(&catalog, "checkers - 9 inches");
        assert!(cart.is_empty());
    }

    #[test]
    fn size_linked_to_other_entry_is_not_added_here() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_item(entry(&catalog, SIGNATURE_9), 1, 1);
        cart.add_by_name(&catalog, SIGNATURE_6, 0, 2);
        assert!(cart.is_empty());
    }

    #[test]
    fn size_with_dangling_link_is_not_added() {
        let catalog = Catalog::bakery().unwrap();
        let checkers = entry(&catalog, CHECKERS_9);
        assert!(!catalog.is_selectable(checkers, 1));

        let mut cart = Cart::new();
        cart.add_item(checkers, 1, 1);
        assert!(cart.is_empty());

        cart.add_item(checkers, 0, 1);
        assert_eq!(names(&cart), vec!["Checkers - 9 inches (9 Inch)"]);
    }

    #[test]
    fn quick_add_skips_entry_whose_default_size_belongs_elsewhere() {
        let catalog = Catalog::new(vec![CatalogEntry::new("Opera - 9 inches", Money::from_major(90))
            .with_size(
                SizeVariant::new("6 Inch", Money::from_major(55)).linked_to("Opera - 6 inches"),
            )])
        .unwrap();
        let mut cart = Cart::new();
        cart.quick_add(&catalog, "Opera - 9 inches");
        assert!(cart.is_empty());
    }

    #[test]
    fn add_by_name_resolves_through_catalog() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_by_name(&catalog, SIGNATURE_6, 1, 2);
        assert_eq!(cart.items()[0].key(), &IdentityKey::new(SIGNATURE_6, "6 Inch"));
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn quick_add_uses_default_size_and_base_price() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.quick_add(&catalog, SIGNATURE_6);
        cart.quick_add(&catalog, CHECKERS_9);
        cart.quick_add(&catalog, SIGNATURE_6);

        assert_eq!(
            names(&cart),
            vec![
                "Checkers - 9 inches (9 Inch)",
                "Signature Mille Crêpes - 6 inches (6 Inch)",
            ]
        );
        assert_eq!(cart.items()[1].quantity(), 2);
        assert_eq!(cart.items()[1].unit_price(), Money::from_major(70));
    }

    #[test]
    fn quick_add_merges_with_modal_add_of_same_size() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.quick_add(&catalog, SIGNATURE_9);
        cart.add_by_name(&catalog, SIGNATURE_9, 0, 2);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity(), 3);
    }

    #[test]
    fn decrement_from_one_removes_only_that_line() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_item(entry(&catalog, SIGNATURE_9), 0, 3);
        cart.add_item(entry(&catalog, CHECKERS_9), 0, 1);
        cart.add_item(entry(&catalog, SIGNATURE_6), 1, 2);

        cart.decrement_item(1);

        assert_eq!(cart.len(), 2);
        assert_eq!(
            names(&cart),
            vec![
                "Signature Mille Crêpes - 6 inches (6 Inch)",
                "Signature Mille Crêpes - 9 inches (9 Inch)",
            ]
        );
        assert_eq!(cart.items()[0].quantity(), 2);
        assert_eq!(cart.items()[1].quantity(), 3);
    }

    #[test]
    fn decrement_above_one_keeps_line() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_item(entry(&catalog, CHECKERS_9), 0, 2);
        cart.decrement_item(0);
        assert_eq!(cart.items()[0].quantity(), 1);
    }

    #[test]
    fn out_of_range_index_is_noop() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_item(entry(&catalog, CHECKERS_9), 0, 1);
        cart.increment_item(3);
        cart.decrement_item(3);
        assert_eq!(cart.items()[0].quantity(), 1);
    }

    #[test]
    fn seventy_dollar_item_decremented_away() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_item(entry(&catalog, SIGNATURE_6), 1, 1);
        assert_eq!(cart.items()[0].unit_price().amount(), dec!(70.00));

        cart.decrement_item(0);

        assert!(cart.is_empty());
        let totals = cart.compute_totals(&PricingPolicy::default());
        assert_eq!(totals, Totals::default());
        assert_eq!(cart.serialize().unwrap(), "[]");
    }

    #[test]
    fn remove_all_empties() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_item(entry(&catalog, CHECKERS_9), 0, 1);
        cart.add_item(entry(&catalog, SIGNATURE_9), 0, 1);
        cart.remove_all();
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn round_trip_preserves_lines_and_order() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_item(entry(&catalog, SIGNATURE_9), 0, 3);
        cart.add_item(entry(&catalog, CHECKERS_9), 1, 1);
        cart.add_item(entry(&catalog, "Gift Card"), 0, 2);

        let restored = Cart::deserialize(&cart.serialize().unwrap());
        assert_eq!(restored, cart);
    }

    #[test]
    fn blob_uses_storefront_field_names() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_item(entry(&catalog, SIGNATURE_9), 0, 1);

        let value: serde_json::Value = serde_json::from_str(&cart.serialize().unwrap()).unwrap();
        let row = &value[0];
        assert_eq!(row["identityName"], SIGNATURE_9);
        assert_eq!(row["sizeLabel"], "9 Inch");
        assert_eq!(row["imageRef"], "cake3-overlay-img1.png");
        assert_eq!(row["displayName"], SIGNATURE_9);
        assert_eq!(row["unitPrice"], 115.0);
        assert_eq!(row["quantity"], 1);
    }

    #[test]
    fn malformed_blob_yields_empty_cart() {
        assert!(Cart::deserialize("not json").is_empty());
        assert!(Cart::deserialize(r#"{"items": []}"#).is_empty());
        assert!(Cart::deserialize(r#"[{"quantity": "three"}]"#).is_empty());
    }

    #[test]
    fn out_of_range_rows_make_blob_malformed() {
        let overflowing = r#"[
            {"identityName": "A", "displayName": "A", "unitPrice": 7e28, "quantity": 2}
        ]"#;
        let negative = r#"[
            {"identityName": "A", "displayName": "A", "unitPrice": 10, "quantity": 1},
            {"identityName": "B", "displayName": "B", "unitPrice": -5, "quantity": 1}
        ]"#;
        assert!(Cart::deserialize(overflowing).is_empty());
        assert!(Cart::deserialize(negative).is_empty());
    }

    #[test]
    fn huge_quantities_saturate_the_item_count() {
        let blob = r#"[
            {"identityName": "A", "displayName": "A", "unitPrice": 1, "quantity": 4294967295},
            {"identityName": "B", "displayName": "B", "unitPrice": 1, "quantity": 1}
        ]"#;
        let mut cart = Cart::deserialize(blob);
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.item_count(), u32::MAX);

        cart.increment_item(0);
        assert_eq!(cart.items()[0].quantity(), u32::MAX);
        let totals = cart.compute_totals(&PricingPolicy::default());
        assert_eq!(totals.subtotal.amount(), dec!(4294967296));
    }

    #[test]
    fn deserialize_drops_zero_rows_and_merges_duplicates() {
        let blob = r#"[
            {"identityName": "A", "sizeLabel": "9 Inch", "displayName": "A", "unitPrice": 10, "quantity": 2},
            {"identityName": "B", "displayName": "B", "unitPrice": 5, "quantity": 0},
            {"identityName": "A", "sizeLabel": "9 Inch", "displayName": "A", "unitPrice": 10, "quantity": 1}
        ]"#;
        let cart = Cart::deserialize(blob);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity(), 3);
        assert_eq!(cart.items()[0].key().size_label, "9 Inch");
    }

    #[test]
    fn persist_then_restore_through_store() {
        let catalog = catalog();
        let store = MemoryCartStore::new();
        let mut cart = Cart::new();
        cart.add_item(entry(&catalog, CHECKERS_9), 0, 2);

        assert!(Cart::restore(&store).is_empty());
        cart.persist(&store).unwrap();
        assert_eq!(Cart::restore(&store), cart);
    }

    #[test]
    fn restore_from_garbage_store_is_empty() {
        let store = MemoryCartStore::with_blob("{broken");
        assert!(Cart::restore(&store).is_empty());
    }
}
