//! Cart, pricing and checkout core of the bakery storefront.
//!
//! The [`Catalog`] is read-only; the [`Cart`] copies what it needs from an
//! entry when a line is created and is carried to checkout through a
//! [`CartStore`].

mod cart;
mod catalog;
mod checkout;
mod money;
mod pricing;
mod store;

pub use cart::*;
pub use catalog::*;
pub use checkout::*;
pub use money::*;
pub use pricing::*;
pub use store::*;
