use std::{fmt, time::Duration};

use rand::Rng;
use thiserror::Error;
use time::{Date, OffsetDateTime};
use tracing::{info, warn};

use super::{CheckoutForm, ValidationErrors};
use crate::{store::CartStore, Cart, LineItem, PricingPolicy, Totals};

pub const DEFAULT_SUBMIT_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("invalid checkout form: {0}")]
    Invalid(#[from] ValidationErrors),
}

/// Decorative order number shown after submission. Not unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderNumber(u32);

impl OrderNumber {
    pub fn random() -> Self {
        Self(rand::rng().random_range(10_000..100_000))
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct OrderConfirmation {
    pub number: OrderNumber,
    pub items: Vec<LineItem>,
    pub totals: Totals,
    pub placed_at: OffsetDateTime,
}

/// The checkout page: the cart loaded once from the store, shown read-only,
/// and submitted as an order.
#[derive(Debug)]
pub struct CheckoutView {
    cart: Cart,
    pricing: PricingPolicy,
    submit_delay: Duration,
}

impl CheckoutView {
    pub fn new(cart: Cart, pricing: PricingPolicy) -> Self {
        Self {
            cart,
            pricing,
            submit_delay: DEFAULT_SUBMIT_DELAY,
        }
    }

    pub fn load(store: &dyn CartStore, pricing: PricingPolicy) -> Self {
        Self::new(Cart::restore(store), pricing)
    }

    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = delay;
        self
    }

    pub fn items(&self) -> &[LineItem] {
        self.cart.items()
    }

    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    pub fn item_count(&self) -> u32 {
        self.cart.item_count()
    }

    pub fn totals(&self) -> Totals {
        self.cart.compute_totals(&self.pricing)
    }

    /// Validates the form, waits out the processing delay, then clears the
    /// saved cart and returns the confirmation.
    ///
    /// A store that cannot be cleared is logged and otherwise ignored; the
    /// order still goes through.
    pub async fn submit(
        &mut self,
        form: &CheckoutForm,
        today: Date,
        store: &dyn CartStore,
    ) -> Result<OrderConfirmation, CheckoutError> {
        if self.cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        form.validate(today)?;

        tokio::time::sleep(self.submit_delay).await;

        let totals = self.totals();
        let items = self.cart.items().to_vec();
        let number = OrderNumber::random();

        if let Err(e) = store.clear() {
            warn!(error = %e, "failed to clear saved cart after order");
        }
        self.cart.remove_all();

        info!(%number, total = %totals.total, lines = items.len(), "order placed");

        Ok(OrderConfirmation {
            number,
            items,
            totals,
            placed_at: OffsetDateTime::now_utc(),
        })
    }
}
