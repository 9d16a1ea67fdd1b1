//! Column-level transforms applied between the cache and the store.

pub mod derive;
pub mod normalize;

pub use derive::*;
pub use normalize::*;
