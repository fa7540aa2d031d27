mod types;

pub use self::types::{RegartError, Result};
