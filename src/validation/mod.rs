//! Validation module for normalized sections.

mod validate;

pub use validate::*;
