pub mod infer;
pub mod types;

pub use infer::*;
pub use types::*;
