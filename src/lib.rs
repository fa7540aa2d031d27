//! Responsive ASCII register diagrams.
//!
//! A [`RegisterDescription`] names a register, its address, its width, and
//! the bit-field sections it is split into. [`render`] validates it and draws
//! a bordered text block whose columns widen to fit every label:
//!
//! ```
//! use regart::{RegisterDescription, render};
//!
//! let description = RegisterDescription::new()
//!     .with_name("REGA")
//!     .with_address("0x123")
//!     .with_section("STATUS", 5_u64, 3_u64)
//!     .with_section("CARRY", 4_u64, 1_u64)
//!     .with_section("ENABLE", 3_u64, 1_u64)
//!     .with_section("SUM", 0_u64, 3_u64);
//!
//! let text = render(&description, false)?;
//! assert!(text.contains("| STATUS    | CARRY | ENABLE | SUM       |"));
//! # Ok::<(), regart::RegartError>(())
//! ```
//!
//! Rendering is pure: no I/O, no logging, no shared state. The [`driver`]
//! module wraps it for the `regart` binary.

pub mod description;
pub mod driver;
pub mod error;
pub mod layout;
pub mod logging;
pub mod render;
pub mod sections;
pub mod width;

pub use description::{MAX_WIDTH, NumericField, Register, RegisterDescription, SectionSpec, normalize};
pub use driver::{CliArgs, CliDriver, CliError, DriverConfig, DriverResult};
pub use error::{RegartError, Result};
pub use layout::{Layout, baseline_width, negotiate};
pub use logging::{FileSink, LogEvent, LogLevel, LogSink, Logger, LoggingError, LoggingResult};
pub use render::{Diagram, RegisterRenderer, RendererSettings, render};
pub use sections::{ResolveMode, Section, resolve};
pub use width::{display_width, pad_to_width};
