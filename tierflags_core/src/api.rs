mod core;
mod field;

pub use self::core::*;
pub use field::*;
