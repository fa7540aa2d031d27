//! Width negotiation for register diagrams.
//!
//! Produces a [`Layout`]: the shared inner width plus the per-bit expansions
//! that keep the title, section, and bit-index rows aligned.

mod core;

pub use self::core::{
    COLUMN_SEPARATOR, Expansions, Layout, baseline_width, bit_label_width, label_span, negotiate,
    shows_section_row,
};
