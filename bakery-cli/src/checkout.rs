use std::{io::Write, path::Path};

use anyhow::{bail, Context, Result};
use bakery::{
    format_card_number, format_cvv, format_expiry_date, format_phone_number, CartStore,
    CheckoutError, CheckoutForm, CheckoutView,
};
use time::{Date, OffsetDateTime};

use crate::render;

/// Reads a filled-in form and runs it through the same masks typing would.
pub fn read_form(path: &Path) -> Result<CheckoutForm> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read checkout form at {}", path.display()))?;
    let mut form: CheckoutForm = toml::from_str(&raw)
        .with_context(|| format!("Failed to parse checkout form at {}", path.display()))?;

    form.card_number = format_card_number(&form.card_number);
    form.expiry_date = format_expiry_date(&form.expiry_date);
    form.phone = format_phone_number(&form.phone);
    form.cvv = format_cvv(&form.cvv);
    Ok(form)
}

pub fn blank_form() -> Result<String> {
    Ok(toml::to_string_pretty(&CheckoutForm::default())?)
}

pub fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}

pub fn summary(out: &mut impl Write, view: &CheckoutView) -> Result<()> {
    writeln!(out, "Order summary")?;
    render::cart_items(out, view.items())?;
    if !view.is_empty() {
        render::totals(out, &view.totals())?;
    }
    Ok(())
}

/// Shows the saved cart and, given a form, places the order.
pub async fn run(
    out: &mut impl Write,
    mut view: CheckoutView,
    store: &dyn CartStore,
    form: Option<CheckoutForm>,
    today: Date,
) -> Result<()> {
    summary(out, &view)?;

    let Some(form) = form else {
        if !view.is_empty() {
            writeln!(out, "Pass --form <file> to place the order.")?;
        }
        return Ok(());
    };
    if view.is_empty() {
        return Ok(());
    }

    writeln!(out, "Processing...")?;
    out.flush()?;

    match view.submit(&form, today, store).await {
        Ok(confirmation) => {
            writeln!(out, "Order placed! Your order number is {}.", confirmation.number)?;
            Ok(())
        }
        Err(CheckoutError::Invalid(errors)) => {
            for (field, error) in errors.fields() {
                writeln!(out, "  {field}: {error}")?;
            }
            bail!("{} field(s) need fixing", errors.fields().len())
        }
        Err(e) => Err(e.into()),
    }
}
