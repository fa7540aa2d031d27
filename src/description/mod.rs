//! Register descriptions and their normalization into canonical form.
//!
//! Callers build a [`RegisterDescription`] (directly, through the builder
//! helpers, or by deserializing JSON); [`normalize`] turns it into a
//! [`Register`] with defaults filled and every numeric field coerced.

mod core;

pub use self::core::{
    DEFAULT_NAME, DEFAULT_WIDTH, MAX_WIDTH, NumericField, Register, RegisterDescription, SectionPlacement,
    SectionSpec, normalize,
};
