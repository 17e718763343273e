mod define_wrapper_type;

pub use define_wrapper_type::*;
