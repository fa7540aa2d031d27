//! Section resolution: from an unordered name-keyed map to an ordered list
//! of sections that partitions the register's bit range.

mod core;

pub use self::core::{PLACEHOLDER_NAME, ResolveMode, Section, resolve};
