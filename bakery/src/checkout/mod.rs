mod email;
mod form;
mod masks;
mod order;

pub use email::*;
pub use form::*;
pub use masks::*;
pub use order::*;
