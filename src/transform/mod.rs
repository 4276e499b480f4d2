//! Transformations applied between parsing and validation.

mod normalize;

pub use normalize::*;
