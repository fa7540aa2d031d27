use std::collections::BTreeMap;

use crate::description::Register;
use crate::display_width;
use crate::sections::Section;

/// Separator drawn between neighbouring columns of a body row.
pub const COLUMN_SEPARATOR: &str = " | ";

/// Extra padding columns keyed by bit position.
pub type Expansions = BTreeMap<usize, usize>;

/// Negotiated geometry shared by every row of one diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Inner width of every row, excluding the two-column frame on each side.
    pub global_width: usize,
    /// Spaces between the register name and its address on the title row.
    pub title_space: usize,
    /// Trailing spaces appended after the label at each listed bit position.
    pub expansions: Expansions,
    /// Whether the section-label row is drawn.
    pub section_row: bool,
}

impl Layout {
    pub fn expansion_at(&self, bit: usize) -> usize {
        self.expansions.get(&bit).copied().unwrap_or(0)
    }

    /// Width available to a section's label once expansions are applied.
    pub fn cell_width(&self, section: &Section) -> usize {
        let grown: usize = self
            .expansions
            .range(section.position..section.position + section.size)
            .map(|(_, extra)| *extra)
            .sum();
        label_span(section.position, section.size) + grown
    }
}

/// Width of the decimal index label for `bit`.
pub fn bit_label_width(bit: usize) -> usize {
    bit.checked_ilog10().map_or(1, |digits| digits as usize + 1)
}

/// Natural width of the bit-index labels for `size` bits starting at
/// `position`, separators included.
pub fn label_span(position: usize, size: usize) -> usize {
    if size == 0 {
        return 0;
    }
    let labels: usize = (position..position + size).map(bit_label_width).sum();
    labels + COLUMN_SEPARATOR.len() * (size - 1)
}

/// Width of the plain bit-index row `"n-1 | ... | 1 | 0"`.
pub fn baseline_width(bits: usize) -> usize {
    label_span(0, bits)
}

/// A single section named after the register carries no information.
pub fn shows_section_row(register_name: &str, sections: &[Section]) -> bool {
    match sections {
        [only] => only.name != register_name,
        _ => !sections.is_empty(),
    }
}

/// Compute the layout for `register` drawn over the resolved `sections`.
///
/// Section labels are negotiated first: each label wider than its bit span
/// widens the column at the section's lowest bit by exactly the overflow.
/// The title then claims any remaining shortfall at bit 0.
pub fn negotiate(register: &Register, sections: &[Section]) -> Layout {
    let mut global_width = baseline_width(register.width);
    let mut expansions = Expansions::new();

    let section_row = shows_section_row(&register.name, sections);
    if section_row {
        for section in sections {
            let natural = label_span(section.position, section.size);
            let overflow = display_width(&section.name).saturating_sub(natural);
            if overflow == 0 {
                continue;
            }
            let slot = expansions.entry(section.position).or_insert(0);
            if overflow > *slot {
                global_width += overflow - *slot;
                *slot = overflow;
            }
        }
    }

    let name_width = display_width(&register.name);
    let address_width = display_width(&register.address);
    let title_minimum = name_width + address_width + 1;
    if global_width < title_minimum {
        *expansions.entry(0).or_insert(0) += title_minimum - global_width;
        global_width = title_minimum;
    }

    Layout {
        global_width,
        title_space: global_width - name_width - address_width,
        expansions,
        section_row,
    }
}
