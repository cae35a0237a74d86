//! CLI command implementations.

pub mod dataset;
pub mod feed;
pub mod inspect;
pub mod validate;
