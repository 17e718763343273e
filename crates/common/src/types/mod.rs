mod address_like;
mod big_number;
mod identifiers;

pub use address_like::*;
pub use big_number::*;
pub use identifiers::*;
