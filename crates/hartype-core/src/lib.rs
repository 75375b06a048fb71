pub mod error;
pub mod har;

pub use error::{Error, Result};
