//! Ephemeral highlight cursor shared by both selection variants.

use serde::{Deserialize, Serialize};

/// List a highlighted variable sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListSource {
    Available,
    Test,
    Grouping,
    /// First member column of the pair list.
    First,
    /// Second member column of the pair list.
    Second,
}

/// Highlighted variable cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightedVariable {
    pub temp_id: String,
    pub source: ListSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_index: Option<usize>,
}

/// Selecting the current target again clears it.
pub(crate) fn toggle<T: PartialEq>(slot: &mut Option<T>, value: T) {
    if slot.as_ref() == Some(&value) {
        *slot = None;
    } else {
        *slot = Some(value);
    }
}
