//! Context switch

pub mod switch;

pub use switch::*;
