//! Utility modules for kview.

mod age;
mod quantity;

pub use age::{UNKNOWN_AGE, human_duration, parse_age, to_age};
pub use quantity::parse_quantity;
