//! Variable selection state for the t-test dialogs.
//!
//! Two state machines, both plain structs with explicit mutation methods that
//! leave a consistent snapshot behind after every call:
//!
//! - [`IndependentSelection`]: partitions the roster into available, test and
//!   grouping roles. Every variable sits in exactly one role at all times.
//! - [`PairedSelection`]: the pairing engine. Two parallel slot arrays form
//!   numbered pairs; a slot may be a hole while a pairing is in progress.
//!
//! Rejected pairing operations return a [`PairingRejection`] instead of
//! notifying anyone, so the UI layer decides how to surface them.
//!
//! # Example
//!
//! ```ignore
//! use ttest_select::{PairedSelection, PairSide};
//!
//! let mut selection = PairedSelection::new(&roster);
//! selection.move_to_test_variables(&roster[0], None)?;          // Pair 1: pre, _
//! selection.move_to_test_variables(&roster[1], None)?;          // Pair 1: pre, post
//! assert!(selection.are_all_pairs_valid());
//! ```

mod error;
mod highlight;
mod independent;
mod paired;

pub use error::PairingRejection;
pub use highlight::{HighlightedVariable, ListSource};
pub use independent::{IndependentSelection, VariableList};
pub use paired::{CompletePair, PairSide, PairedSelection, Placement, route_variable};

use ttest_model::Variable;

/// The analyzable subset of a roster: variables with a non-empty name, in
/// roster order.
pub fn analyzable_variables(roster: &[Variable]) -> Vec<Variable> {
    roster.iter().filter(|v| v.is_analyzable()).cloned().collect()
}
