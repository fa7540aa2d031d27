//! Diagram assembly.
//!
//! The render module owns the fixed border templates and joins the rows of a
//! negotiated [`Layout`](crate::layout::Layout) into the final text block.

mod core;

pub use self::core::{Diagram, RegisterRenderer, RendererSettings, render};
