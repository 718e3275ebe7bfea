pub mod error;
pub mod num;
pub mod types;

pub use error::*;
pub use types::*;
