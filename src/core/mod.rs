pub mod error;

pub use error::{MockError, Result};
