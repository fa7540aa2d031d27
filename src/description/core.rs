use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RegartError, Result};

pub const DEFAULT_NAME: &str = "REG";
pub const DEFAULT_WIDTH: usize = 8;
/// Widest register that will be drawn.
pub const MAX_WIDTH: usize = 4096;

/// Numeric input accepted either as a native integer or as text.
///
/// Text without a `0x` prefix is decimal; text with it is hexadecimal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericField {
    Integer(u64),
    Text(String),
}

impl NumericField {
    /// Parse into an integer, naming `field` on failure.
    pub fn parse(&self, field: &str) -> Result<u64> {
        match self {
            Self::Integer(value) => Ok(*value),
            Self::Text(text) => parse_text(text)
                .ok_or_else(|| RegartError::invalid_numeric(field, text.clone())),
        }
    }
}

fn parse_text(text: &str) -> Option<u64> {
    let trimmed = text.trim();
    match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => trimmed.parse().ok(),
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<u64> for NumericField {
    fn from(value: u64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for NumericField {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for NumericField {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Raw placement of a named section: lowest bit and bit count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<NumericField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<NumericField>,
}

impl SectionSpec {
    pub fn new(position: impl Into<NumericField>, size: impl Into<NumericField>) -> Self {
        Self {
            position: Some(position.into()),
            size: Some(size.into()),
        }
    }
}

/// Register description as supplied by callers. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterDescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<NumericField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<NumericField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<BTreeMap<String, SectionSpec>>,
}

impl RegisterDescription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<NumericField>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_width(mut self, width: impl Into<NumericField>) -> Self {
        self.width = Some(width.into());
        self
    }

    /// Add (or replace) a section spanning `size` bits upwards from `position`.
    pub fn with_section(
        mut self,
        name: impl Into<String>,
        position: impl Into<NumericField>,
        size: impl Into<NumericField>,
    ) -> Self {
        self.sections
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), SectionSpec::new(position, size));
        self
    }
}

/// Canonical register produced by [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    pub name: String,
    /// `0x`-prefixed uppercase hex, or empty when no address was given.
    pub address: String,
    pub width: usize,
    /// Section placements keyed by name, still unordered and unchecked.
    pub sections: BTreeMap<String, SectionPlacement>,
}

/// Section placement after numeric coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionPlacement {
    pub position: usize,
    pub size: usize,
}

/// Fill defaults and coerce every numeric field of `description`.
pub fn normalize(description: &RegisterDescription) -> Result<Register> {
    let name = description
        .name
        .clone()
        .unwrap_or_else(|| DEFAULT_NAME.to_string());

    let width = match &description.width {
        Some(raw) => to_usize(raw, "width")?,
        None => DEFAULT_WIDTH,
    };
    if width == 0 {
        return Err(RegartError::ZeroWidth);
    }
    if width > MAX_WIDTH {
        return Err(RegartError::WidthTooLarge {
            width,
            max: MAX_WIDTH,
        });
    }

    let address = match &description.address {
        Some(raw) => format!("0x{:X}", raw.parse("address")?),
        None => String::new(),
    };

    let sections = match &description.sections {
        Some(specs) => specs
            .iter()
            .map(|(section, spec)| Ok((section.clone(), placement(section, spec)?)))
            .collect::<Result<BTreeMap<_, _>>>()?,
        None => BTreeMap::from([(
            name.clone(),
            SectionPlacement {
                position: 0,
                size: width,
            },
        )]),
    };

    Ok(Register {
        name,
        address,
        width,
        sections,
    })
}

fn placement(section: &str, spec: &SectionSpec) -> Result<SectionPlacement> {
    let field = |key: &str| format!("sections.{section}.{key}");
    let position = spec
        .position
        .as_ref()
        .ok_or_else(|| RegartError::MissingField(field("position")))?;
    let size = spec
        .size
        .as_ref()
        .ok_or_else(|| RegartError::MissingField(field("size")))?;
    Ok(SectionPlacement {
        position: to_usize(position, &field("position"))?,
        size: to_usize(size, &field("size"))?,
    })
}

fn to_usize(raw: &NumericField, field: &str) -> Result<usize> {
    let value = raw.parse(field)?;
    usize::try_from(value).map_err(|_| RegartError::invalid_numeric(field, raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_description_gets_defaults() {
        let register = normalize(&RegisterDescription::new()).unwrap();
        assert_eq!(register.name, "REG");
        assert_eq!(register.width, 8);
        assert_eq!(register.address, "");
        assert_eq!(
            register.sections.get("REG"),
            Some(&SectionPlacement {
                position: 0,
                size: 8
            })
        );
    }

    #[test]
    fn decimal_address_becomes_hex() {
        let register = normalize(&RegisterDescription::new().with_address("15")).unwrap();
        assert_eq!(register.address, "0xF");

        let register = normalize(&RegisterDescription::new().with_address(4_u64)).unwrap();
        assert_eq!(register.address, "0x4");
    }

    #[test]
    fn hex_address_is_canonicalized() {
        let register = normalize(&RegisterDescription::new().with_address("0xabc")).unwrap();
        assert_eq!(register.address, "0xABC");

        let register = normalize(&RegisterDescription::new().with_address("0x123")).unwrap();
        assert_eq!(register.address, "0x123");
    }

    #[test]
    fn undecorated_hex_looking_address_is_decimal() {
        let register = normalize(&RegisterDescription::new().with_address("123")).unwrap();
        assert_eq!(register.address, "0x7B");
    }

    #[test]
    fn width_accepts_text_and_hex() {
        let register = normalize(&RegisterDescription::new().with_width("16")).unwrap();
        assert_eq!(register.width, 16);

        let register = normalize(&RegisterDescription::new().with_width("0x20")).unwrap();
        assert_eq!(register.width, 32);
    }

    #[test]
    fn implicit_section_follows_width_and_name() {
        let register = normalize(
            &RegisterDescription::new()
                .with_name("CTRL")
                .with_width(12_u64),
        )
        .unwrap();
        assert_eq!(register.sections.len(), 1);
        assert_eq!(
            register.sections["CTRL"],
            SectionPlacement {
                position: 0,
                size: 12
            }
        );
    }

    #[test]
    fn textual_section_fields_are_coerced() {
        let register = normalize(
            &RegisterDescription::new()
                .with_name("REGA")
                .with_section("REGA", "0", "8"),
        )
        .unwrap();
        assert_eq!(
            register.sections["REGA"],
            SectionPlacement {
                position: 0,
                size: 8
            }
        );
    }

    #[test]
    fn bad_numbers_name_the_field() {
        let err = normalize(&RegisterDescription::new().with_width("eight")).unwrap_err();
        assert_eq!(err, RegartError::invalid_numeric("width", "eight"));

        let err = normalize(&RegisterDescription::new().with_address("0xZZ")).unwrap_err();
        assert_eq!(err, RegartError::invalid_numeric("address", "0xZZ"));

        let err = normalize(&RegisterDescription::new().with_section("CARRY", 4_u64, "one"))
            .unwrap_err();
        assert_eq!(err, RegartError::invalid_numeric("sections.CARRY.size", "one"));
    }

    #[test]
    fn bare_prefix_and_negative_values_are_rejected() {
        assert!(normalize(&RegisterDescription::new().with_address("0x")).is_err());
        assert!(normalize(&RegisterDescription::new().with_width("-8")).is_err());
    }

    #[test]
    fn zero_width_is_rejected() {
        let err = normalize(&RegisterDescription::new().with_width(0_u64)).unwrap_err();
        assert_eq!(err, RegartError::ZeroWidth);
    }

    #[test]
    fn oversized_width_is_rejected() {
        let err = normalize(&RegisterDescription::new().with_width("0x100000")).unwrap_err();
        assert_eq!(
            err,
            RegartError::WidthTooLarge {
                width: 0x10_0000,
                max: MAX_WIDTH
            }
        );
        assert_eq!(err.to_string(), "register width 1048576 exceeds the 4096 bit limit");
        assert!(normalize(&RegisterDescription::new().with_width(MAX_WIDTH as u64)).is_ok());
    }

    #[test]
    fn section_without_size_is_missing_field() {
        let mut description = RegisterDescription::new();
        description.sections = Some(BTreeMap::from([(
            "LOW".to_string(),
            SectionSpec {
                position: Some(NumericField::Integer(0)),
                size: None,
            },
        )]));
        let err = normalize(&description).unwrap_err();
        assert_eq!(err, RegartError::MissingField("sections.LOW.size".into()));
    }

    #[test]
    fn input_is_left_untouched() {
        let description = RegisterDescription::new().with_address("15").with_width("4");
        let snapshot = description.clone();
        normalize(&description).unwrap();
        assert_eq!(description, snapshot);
    }

    #[test]
    fn deserializes_mixed_numeric_json() {
        let description: RegisterDescription = serde_json::from_str(
            r#"{
                "name": "REGA",
                "address": "0x123",
                "width": 8,
                "sections": {
                    "STATUS": { "position": 5, "size": "3" },
                    "SUM": { "position": "0x0", "size": 5 }
                }
            }"#,
        )
        .unwrap();
        let register = normalize(&description).unwrap();
        assert_eq!(register.address, "0x123");
        assert_eq!(register.sections["STATUS"].size, 3);
        assert_eq!(register.sections["SUM"].position, 0);
    }
}
