pub mod dynamic;
pub mod error;

pub use dynamic::*;
pub use error::{Error, Result};
