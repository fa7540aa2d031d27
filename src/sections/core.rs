use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::description::SectionPlacement;
use crate::display_width;
use crate::error::{RegartError, Result};

/// Name given to the 1-bit sections synthesized over uncovered bits.
pub const PLACEHOLDER_NAME: &str = "-";

/// How the resolver treats overlaps, gaps, and out-of-range sections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResolveMode {
    /// Reject any layout that does not partition the register exactly.
    #[default]
    Strict,
    /// Drop conflicting sections and fill holes with placeholders.
    Forgiving,
}

impl ResolveMode {
    pub fn from_forgiveness(forgiveness: bool) -> Self {
        if forgiveness {
            Self::Forgiving
        } else {
            Self::Strict
        }
    }
}

/// A named, contiguous run of bits within the register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    /// Lowest bit index covered by the section.
    pub position: usize,
    pub size: usize,
}

impl Section {
    pub fn new(name: impl Into<String>, position: usize, size: usize) -> Self {
        Self {
            name: name.into(),
            position,
            size,
        }
    }

    fn placeholder(position: usize) -> Self {
        Self::new(PLACEHOLDER_NAME, position, 1)
    }

    /// One past the highest covered bit, or `None` on overflow.
    pub fn end(&self) -> Option<usize> {
        self.position.checked_add(self.size)
    }

    pub fn contains(&self, bit: usize) -> bool {
        bit >= self.position && self.end().is_none_or(|end| bit < end)
    }

    fn fits(&self, width: usize) -> bool {
        self.end().is_some_and(|end| end <= width)
    }

    /// Lowest bit shared with `other`, if the two ranges intersect.
    fn first_shared_bit(&self, other: &Section) -> Option<usize> {
        let low = self.position.max(other.position);
        (self.contains(low) && other.contains(low)).then_some(low)
    }
}

/// Descending position; ties by ascending size, then by name.
fn draw_order(a: &Section, b: &Section) -> Ordering {
    b.position
        .cmp(&a.position)
        .then(a.size.cmp(&b.size))
        .then_with(|| a.name.cmp(&b.name))
}

/// Turn a name-keyed placement map into sections covering `[0, width)`,
/// ordered from the most significant bit down.
pub fn resolve(
    placements: &BTreeMap<String, SectionPlacement>,
    width: usize,
    mode: ResolveMode,
) -> Result<Vec<Section>> {
    let mut sections: Vec<Section> = placements
        .iter()
        .map(|(name, placement)| Section::new(name.clone(), placement.position, placement.size))
        .collect();
    sections.sort_by(draw_order);

    match mode {
        ResolveMode::Strict => {
            validate_strict(&sections, width)?;
            Ok(sections)
        }
        ResolveMode::Forgiving => Ok(repair(sections, width)),
    }
}

fn validate_strict(sections: &[Section], width: usize) -> Result<()> {
    if let Some(empty) = sections.iter().find(|section| section.size == 0) {
        return Err(RegartError::EmptySection {
            name: empty.name.clone(),
        });
    }

    for (idx, later) in sections.iter().enumerate() {
        for earlier in &sections[..idx] {
            if let Some(bit) = earlier.first_shared_bit(later) {
                return Err(RegartError::OverlappingSections {
                    first: earlier.name.clone(),
                    second: later.name.clone(),
                    bit,
                });
            }
        }
    }

    let covered = sections
        .iter()
        .fold(0usize, |sum, section| sum.saturating_add(section.size));
    match covered.cmp(&width) {
        Ordering::Less => return Err(RegartError::IncompleteCoverage { covered, width }),
        Ordering::Greater => return Err(RegartError::ExcessCoverage { covered, width }),
        Ordering::Equal => {}
    }

    if let Some(outside) = sections.iter().find(|section| !section.fits(width)) {
        return Err(RegartError::SectionOutOfRange {
            name: outside.name.clone(),
            position: outside.position,
            size: outside.size,
            width,
        });
    }

    Ok(())
}

/// Forgiving resolution: `sections` must already be in draw order.
fn repair(sections: Vec<Section>, width: usize) -> Vec<Section> {
    let candidates = shortest_name_per_start(
        sections
            .into_iter()
            .filter(|section| section.size > 0 && section.fits(width))
            .collect(),
    );

    let mut kept: Vec<Section> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if kept
            .iter()
            .all(|owner| owner.first_shared_bit(&candidate).is_none())
        {
            kept.push(candidate);
        }
    }

    fill_gaps(kept, width)
}

fn shortest_name_per_start(sections: Vec<Section>) -> Vec<Section> {
    let mut winners: Vec<Section> = Vec::with_capacity(sections.len());
    for section in sections {
        match winners.last_mut() {
            Some(current) if current.position == section.position => {
                if shorter_name(&section, current) {
                    *current = section;
                }
            }
            _ => winners.push(section),
        }
    }
    winners
}

fn shorter_name(candidate: &Section, current: &Section) -> bool {
    let (a, b) = (display_width(&candidate.name), display_width(&current.name));
    a < b || (a == b && candidate.name < current.name)
}

/// `kept` is non-overlapping and in descending order.
fn fill_gaps(kept: Vec<Section>, width: usize) -> Vec<Section> {
    let mut resolved = Vec::with_capacity(kept.len());
    let mut next_free = width;
    for section in kept {
        // `fits` already guaranteed `end` is in range.
        let end = section.position + section.size;
        resolved.extend((end..next_free).rev().map(Section::placeholder));
        next_free = section.position;
        resolved.push(section);
    }
    resolved.extend((0..next_free).rev().map(Section::placeholder));
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placements(entries: &[(&str, usize, usize)]) -> BTreeMap<String, SectionPlacement> {
        entries
            .iter()
            .map(|(name, position, size)| {
                (
                    name.to_string(),
                    SectionPlacement {
                        position: *position,
                        size: *size,
                    },
                )
            })
            .collect()
    }

    fn names(sections: &[Section]) -> Vec<&str> {
        sections.iter().map(|s| s.name.as_str()).collect()
    }

    fn assert_exact_cover(sections: &[Section], width: usize) {
        let mut owners = vec![0usize; width];
        for section in sections {
            for bit in section.position..section.position + section.size {
                owners[bit] += 1;
            }
        }
        assert!(owners.iter().all(|count| *count == 1), "{owners:?}");
    }

    #[test]
    fn strict_orders_from_msb() {
        let map = placements(&[("SUM", 0, 3), ("STATUS", 5, 3), ("CARRY", 4, 1), ("ENABLE", 3, 1)]);
        let sections = resolve(&map, 8, ResolveMode::Strict).unwrap();
        assert_eq!(names(&sections), vec!["STATUS", "CARRY", "ENABLE", "SUM"]);
    }

    #[test]
    fn strict_rejects_overlap() {
        let map = placements(&[("HIGH", 4, 4), ("MID", 2, 4), ("LOW", 0, 2)]);
        let err = resolve(&map, 8, ResolveMode::Strict).unwrap_err();
        assert_eq!(
            err,
            RegartError::OverlappingSections {
                first: "HIGH".into(),
                second: "MID".into(),
                bit: 4,
            }
        );
    }

    #[test]
    fn strict_overlap_wins_over_coverage() {
        let map = placements(&[("A", 0, 2), ("B", 1, 1)]);
        let err = resolve(&map, 8, ResolveMode::Strict).unwrap_err();
        assert!(matches!(err, RegartError::OverlappingSections { bit: 1, .. }));
    }

    #[test]
    fn strict_rejects_incomplete_coverage() {
        let map = placements(&[("SECTION", 0, 6)]);
        let err = resolve(&map, 8, ResolveMode::Strict).unwrap_err();
        assert_eq!(
            err,
            RegartError::IncompleteCoverage {
                covered: 6,
                width: 8
            }
        );
    }

    #[test]
    fn strict_rejects_excess_coverage() {
        let map = placements(&[("WIDE", 0, 10)]);
        let err = resolve(&map, 8, ResolveMode::Strict).unwrap_err();
        assert_eq!(
            err,
            RegartError::ExcessCoverage {
                covered: 10,
                width: 8
            }
        );
    }

    #[test]
    fn strict_rejects_section_past_msb() {
        let map = placements(&[("LOW", 0, 4), ("FAR", 8, 4)]);
        let err = resolve(&map, 8, ResolveMode::Strict).unwrap_err();
        assert!(matches!(err, RegartError::SectionOutOfRange { ref name, .. } if name == "FAR"));
    }

    #[test]
    fn strict_rejects_empty_section() {
        let map = placements(&[("NONE", 3, 0), ("ALL", 0, 8)]);
        let err = resolve(&map, 8, ResolveMode::Strict).unwrap_err();
        assert_eq!(err, RegartError::EmptySection { name: "NONE".into() });
    }

    #[test]
    fn forgiving_fills_single_gap() {
        let map = placements(&[("A", 0, 1), ("B", 1, 1), ("D", 3, 1)]);
        let sections = resolve(&map, 4, ResolveMode::Forgiving).unwrap();
        assert_eq!(names(&sections), vec!["D", "-", "B", "A"]);
        assert_eq!(sections[1], Section::new("-", 2, 1));
    }

    #[test]
    fn forgiving_fills_every_bit_of_a_wide_gap() {
        let map = placements(&[("LOW", 0, 2)]);
        let sections = resolve(&map, 5, ResolveMode::Forgiving).unwrap();
        assert_eq!(names(&sections), vec!["-", "-", "-", "LOW"]);
        assert_exact_cover(&sections, 5);
    }

    #[test]
    fn forgiving_drops_whole_later_section() {
        let map = placements(&[("HIGH", 4, 4), ("MID", 2, 4), ("LOW", 0, 2)]);
        let sections = resolve(&map, 8, ResolveMode::Forgiving).unwrap();
        assert_eq!(names(&sections), vec!["HIGH", "-", "-", "LOW"]);
        assert_exact_cover(&sections, 8);
    }

    #[test]
    fn forgiving_keeps_shortest_name_on_shared_start() {
        let map = placements(&[("LONGER", 0, 8), ("S", 0, 8), ("MEDIUM", 0, 4)]);
        let sections = resolve(&map, 8, ResolveMode::Forgiving).unwrap();
        assert_eq!(sections, vec![Section::new("S", 0, 8)]);
    }

    #[test]
    fn forgiving_breaks_equal_name_widths_lexically() {
        let map = placements(&[("Y", 2, 6), ("X", 2, 6), ("LOW", 0, 2)]);
        let sections = resolve(&map, 8, ResolveMode::Forgiving).unwrap();
        assert_eq!(names(&sections), vec!["X", "LOW"]);
    }

    #[test]
    fn forgiving_discards_out_of_range_and_empty() {
        let map = placements(&[("OUT", 6, 4), ("ZERO", 2, 0), ("LOW", 0, 2)]);
        let sections = resolve(&map, 8, ResolveMode::Forgiving).unwrap();
        assert_eq!(names(&sections), vec!["-", "-", "-", "-", "-", "-", "LOW"]);
        assert_exact_cover(&sections, 8);
    }

    #[test]
    fn forgiving_always_covers_exactly_once() {
        let cases: &[&[(&str, usize, usize)]] = &[
            &[],
            &[("A", 0, 16)],
            &[("A", 3, 9), ("B", 0, 5), ("C", 10, 6), ("D", 15, 1)],
            &[("X", 7, 1), ("Y", 7, 2), ("Z", 0, 7)],
            &[("A", 1, 30), ("B", 0, 1)],
        ];
        for entries in cases {
            let sections = resolve(&placements(entries), 16, ResolveMode::Forgiving).unwrap();
            assert_exact_cover(&sections, 16);
            assert!(sections.windows(2).all(|w| w[0].position > w[1].position));
        }
    }
}
