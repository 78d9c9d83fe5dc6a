//! Narrow both record sets to a [`Selection`].

use crate::models::{AmenityRecord, RegularityRecord, Selection};

/// Shown instead of any aggregate when no line is selected.
pub const EMPTY_SELECTION_PROMPT: &str = "Please select at least one line in the sidebar.";

/// Records that survived the selection.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredData {
    pub regularity: Vec<RegularityRecord>,
    pub amenities: Vec<AmenityRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filtered {
    /// Empty line selection: nothing was computed.
    NoLines { prompt: &'static str },
    Ready(FilteredData),
}

/// Regularity records on a selected line and inside the date window.
pub fn filter_regularity(
    records: &[RegularityRecord],
    selection: &Selection,
) -> Vec<RegularityRecord> {
    records
        .iter()
        .filter(|r| selection.includes_line(&r.line) && selection.window.contains(r.date))
        .cloned()
        .collect()
}

/// Amenity records on a selected line. The date window does not apply to the static table.
pub fn filter_amenities(records: &[AmenityRecord], selection: &Selection) -> Vec<AmenityRecord> {
    records
        .iter()
        .filter(|a| selection.includes_line(&a.line))
        .cloned()
        .collect()
}

/// Apply the selection to both record sets, short-circuiting on an empty line selection.
pub fn apply(
    selection: &Selection,
    regularity: &[RegularityRecord],
    amenities: &[AmenityRecord],
) -> Filtered {
    if selection.is_empty() {
        return Filtered::NoLines {
            prompt: EMPTY_SELECTION_PROMPT,
        };
    }
    Filtered::Ready(FilteredData {
        regularity: filter_regularity(regularity, selection),
        amenities: filter_amenities(amenities, selection),
    })
}
