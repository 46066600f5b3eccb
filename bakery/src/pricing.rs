use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{LineItem, Money};

/// Tax rate and delivery fee applied at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingPolicy {
    pub tax_rate: Decimal,
    /// Flat fee, charged once per non-empty order.
    pub delivery_fee: Money,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(8, 2),
            delivery_fee: Money::from_major(10),
        }
    }
}

/// Order totals. Every figure is unrounded; `Display` on each rounds to cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub subtotal: Money,
    pub tax: Money,
    pub delivery_fee: Money,
    pub total: Money,
}

impl PricingPolicy {
    pub fn totals<'a>(&self, items: impl IntoIterator<Item = &'a LineItem>) -> Totals {
        let mut subtotal = Money::ZERO;
        let mut any = false;
        for item in items {
            subtotal += item.line_total();
            any = true;
        }

        if !any {
            return Totals::default();
        }

        let tax = subtotal.scaled(self.tax_rate);
        let delivery_fee = self.delivery_fee;

        Totals {
            subtotal,
            tax,
            delivery_fee,
            total: subtotal + tax + delivery_fee,
        }
    }
}

impl Totals {
    /// Label/amount pairs in the order the order summary shows them.
    pub fn summary_lines(&self) -> [(&'static str, Money); 4] {
        [
            ("Subtotal", self.subtotal),
            ("Tax", self.tax),
            ("Delivery", self.delivery_fee),
            ("Total", self.total),
        ]
    }
}
