use std::io::{self, Write};

use bakery::{Catalog, CatalogEntry, LineItem, SearchResults, Totals, VariantResolution};

pub fn catalog_listing<'a>(
    out: &mut impl Write,
    entries: impl IntoIterator<Item = &'a CatalogEntry>,
    search: Option<&SearchResults<'_>>,
) -> io::Result<()> {
    let mut any = false;
    for (i, entry) in entries.into_iter().enumerate() {
        any = true;
        let marker = match search {
            Some(results) if results.is_match(entry) => "*",
            _ => " ",
        };
        writeln!(
            out,
            "{marker}{:>3}. {:<45} {:>9}",
            i + 1,
            entry.name,
            entry.base_price.to_string()
        )?;
        if !entry.short_description.is_empty() {
            writeln!(out, "      {}", entry.short_description)?;
        }
    }

    if !any {
        writeln!(out, "No cakes here yet.")?;
    }
    Ok(())
}

/// The product modal: description, sizes with the selected one marked, quantity.
pub fn entry_detail(
    out: &mut impl Write,
    catalog: &Catalog,
    entry: &CatalogEntry,
    size_index: usize,
    quantity: u32,
) -> io::Result<()> {
    writeln!(out, "{}", entry.name)?;
    if let Some(description) = &entry.description {
        writeln!(out, "{description}")?;
    }
    if let Some(disclaimer) = &entry.disclaimer {
        writeln!(out, "Note: {disclaimer}")?;
    }

    if entry.sizes.is_empty() {
        writeln!(out, "  {}", entry.base_price)?;
    }
    for (i, size) in entry.sizes.iter().enumerate() {
        let state = match catalog.resolve_variant(entry, i) {
            VariantResolution::Selected { .. } if i == size_index => "[x]",
            VariantResolution::Selected { .. } => "[ ]",
            VariantResolution::Navigate { .. } => "[>]",
            VariantResolution::Inert => "[-]",
        };
        writeln!(
            out,
            "  {state} {}. {:<28} {}",
            i + 1,
            size.display_description(),
            size.price
        )?;
    }
    writeln!(out, "Quantity: {quantity}")?;
    Ok(())
}

pub fn cart_items(out: &mut impl Write, items: &[LineItem]) -> io::Result<()> {
    if items.is_empty() {
        return writeln!(out, "Your cart is empty.");
    }

    for (i, item) in items.iter().enumerate() {
        writeln!(
            out,
            "{:>3}. {:<45} {:>3} x {:>9} = {:>9}",
            i + 1,
            item.key().to_string(),
            item.quantity(),
            item.unit_price().to_string(),
            item.line_total().to_string()
        )?;
    }
    Ok(())
}

pub fn totals(out: &mut impl Write, totals: &Totals) -> io::Result<()> {
    for (label, amount) in totals.summary_lines() {
        writeln!(out, "{label:>10}: {:>9}", amount.to_string())?;
    }
    Ok(())
}
