use thiserror::Error;

/// Unified result type for the regart crate.
pub type Result<T> = std::result::Result<T, RegartError>;

/// Errors surfaced while normalizing, resolving, or laying out a register.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegartError {
    #[error("missing mandatory field `{0}`")]
    MissingField(String),
    #[error("value `{value}` for field `{field}` has to be an integer")]
    InvalidNumericField { field: String, value: String },
    #[error("register width has to be at least one bit")]
    ZeroWidth,
    #[error("register width {width} exceeds the {max} bit limit")]
    WidthTooLarge { width: usize, max: usize },
    #[error("section `{name}` has to be at least one bit wide")]
    EmptySection { name: String },
    #[error("section `{name}` (bits {position}+{size}) exceeds the {width} bit register")]
    SectionOutOfRange {
        name: String,
        position: usize,
        size: usize,
        width: usize,
    },
    #[error("sections `{first}` and `{second}` both claim bit {bit}")]
    OverlappingSections {
        first: String,
        second: String,
        bit: usize,
    },
    #[error("sections do not fill the register width ({covered} of {width} bits)")]
    IncompleteCoverage { covered: usize, width: usize },
    #[error("sections overflow the register width ({covered} of {width} bits)")]
    ExcessCoverage { covered: usize, width: usize },
}

impl RegartError {
    pub(crate) fn invalid_numeric(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidNumericField {
            field: field.into(),
            value: value.into(),
        }
    }
}
