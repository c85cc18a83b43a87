//! Pairing engine for the paired-samples dialog.
//!
//! Pairs live in two parallel slot arrays of equal length. Row `i` is pair
//! number `i + 1`; a slot is `None` while its partner waits for a match (a
//! "hole"). A row never has two holes: it collapses instead.
//!
//! Incoming variables fill holes before new rows are opened, so a half-built
//! pair is always completed first. Variables stay in the available list after
//! being paired; the same variable may appear in several pairs.

use std::fmt;

use ttest_model::Variable;

use crate::analyzable_variables;
use crate::error::PairingRejection;
use crate::highlight::{HighlightedVariable, ListSource, toggle};

/// Which member of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairSide {
    First,
    Second,
}

impl PairSide {
    pub fn other(self) -> Self {
        match self {
            PairSide::First => PairSide::Second,
            PairSide::Second => PairSide::First,
        }
    }

    pub fn list_source(self) -> ListSource {
        match self {
            PairSide::First => ListSource::First,
            PairSide::Second => ListSource::Second,
        }
    }
}

impl fmt::Display for PairSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PairSide::First => f.write_str("Variable1"),
            PairSide::Second => f.write_str("Variable2"),
        }
    }
}

/// Where an incoming variable was placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub side: PairSide,
    pub row: usize,
    /// Set when the caller asked for a side but a hole forced the other one.
    pub redirected_from: Option<PairSide>,
}

impl Placement {
    /// Whether the variable completed an existing row instead of opening one.
    pub fn filled_hole(&self, rows_before: usize) -> bool {
        self.row < rows_before
    }
}

/// A pair with both members present.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletePair {
    pub number: usize,
    pub first: Variable,
    pub second: Variable,
}

impl CompletePair {
    /// `first - second`, the label used in result tables.
    pub fn label(&self) -> String {
        format!("{} - {}", self.first.name, self.second.name)
    }
}

/// Decide where an incoming variable goes.
///
/// Priority:
/// 1. holes on both sides: the earliest row wins, the first side on ties
/// 2. a hole on one side: that hole
/// 3. sides of unequal length: the end of the shorter side
/// 4. otherwise: a new row on the requested side (first by default)
///
/// Returns the side, the row, and whether the choice was forced by existing
/// slots rather than by the request.
pub fn route_variable(
    first: &[Option<Variable>],
    second: &[Option<Variable>],
    requested: Option<PairSide>,
) -> (PairSide, usize, bool) {
    let hole1 = first.iter().position(Option::is_none);
    let hole2 = second.iter().position(Option::is_none);

    match (hole1, hole2) {
        (Some(a), Some(b)) if b < a => (PairSide::Second, b, true),
        (Some(a), _) => (PairSide::First, a, true),
        (None, Some(b)) => (PairSide::Second, b, true),
        (None, None) if first.len() < second.len() => (PairSide::First, first.len(), true),
        (None, None) if second.len() < first.len() => (PairSide::Second, second.len(), true),
        (None, None) => (requested.unwrap_or(PairSide::First), first.len(), false),
    }
}

/// Selection state of the paired-samples dialog.
#[derive(Debug, Clone, Default)]
pub struct PairedSelection {
    roster: Vec<Variable>,
    first: Vec<Option<Variable>>,
    second: Vec<Option<Variable>>,
    pair_numbers: Vec<usize>,
    highlighted_variable: Option<HighlightedVariable>,
    highlighted_pair: Option<usize>,
}

impl PairedSelection {
    pub fn new(roster: &[Variable]) -> Self {
        Self {
            roster: analyzable_variables(roster),
            ..Self::default()
        }
    }

    /// Variables that can be paired. Pairing never removes them from here.
    pub fn available_variables(&self) -> &[Variable] {
        &self.roster
    }

    pub fn test_variables1(&self) -> &[Option<Variable>] {
        &self.first
    }

    pub fn test_variables2(&self) -> &[Option<Variable>] {
        &self.second
    }

    /// Display numbers of the rows, always `1..=len`.
    pub fn pair_numbers(&self) -> &[usize] {
        &self.pair_numbers
    }

    pub fn pair_count(&self) -> usize {
        self.first.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_empty()
    }

    pub fn highlighted_variable(&self) -> Option<&HighlightedVariable> {
        self.highlighted_variable.as_ref()
    }

    pub fn highlighted_pair(&self) -> Option<usize> {
        self.highlighted_pair
    }

    /// Slot contents of one row.
    pub fn pair(&self, index: usize) -> Option<(Option<&Variable>, Option<&Variable>)> {
        Some((
            self.first.get(index)?.as_ref(),
            self.second.get(index)?.as_ref(),
        ))
    }

    /// Place a variable into the pair list.
    ///
    /// Holes are filled before new rows are opened; `requested` only decides
    /// the side of a brand new row. Placing a variable next to a partner with
    /// the same column is rejected and leaves the state unchanged.
    pub fn move_to_test_variables(
        &mut self,
        variable: &Variable,
        requested: Option<PairSide>,
    ) -> Result<Placement, PairingRejection> {
        let record = self
            .roster
            .iter()
            .find(|v| v.same_id(variable))
            .cloned()
            .ok_or_else(|| PairingRejection::UnknownVariable(variable.name.clone()))?;

        let (side, row, forced) = route_variable(&self.first, &self.second, requested);

        if let Some(partner) = self.slots(side.other()).get(row).and_then(Option::as_ref)
            && partner.same_column(&record)
        {
            tracing::warn!(
                variable = %record.name,
                column = record.column_index,
                row,
                "rejected pairing a variable with itself"
            );
            return Err(PairingRejection::SameColumn {
                variable: record.name,
                column_index: record.column_index,
            });
        }

        let redirected_from = requested.filter(|r| forced && *r != side);
        if let Some(from) = redirected_from {
            tracing::warn!(
                variable = %record.name,
                requested = %from,
                placed = %side,
                row,
                "variable redirected to fill an incomplete pair"
            );
        }

        let slots = self.slots_mut(side);
        if row < slots.len() {
            slots[row] = Some(record);
        } else {
            slots.push(Some(record));
        }
        self.normalize();
        self.clear_highlights();

        Ok(Placement {
            side,
            row,
            redirected_from,
        })
    }

    /// Take a variable out of a pair.
    ///
    /// If the partner slot is empty the whole row disappears and later rows
    /// move up; otherwise a hole is left behind.
    pub fn remove_variable(&mut self, side: PairSide, row: usize) -> Result<(), PairingRejection> {
        if row >= self.pair_count() {
            return Err(PairingRejection::NoSuchRow(row));
        }
        if self.slots(side.other())[row].is_none() {
            self.first.remove(row);
            self.second.remove(row);
        } else {
            self.slots_mut(side)[row] = None;
        }
        self.normalize();
        self.clear_highlights();
        Ok(())
    }

    /// Swap the two members of a pair.
    pub fn move_variable_between_lists(&mut self, row: usize) -> Result<(), PairingRejection> {
        let Some((first, second)) = self.pair(row) else {
            return Err(PairingRejection::NoSuchRow(row));
        };
        if let (Some(a), Some(b)) = (first, second)
            && a.same_column(b)
        {
            return Err(PairingRejection::SameColumn {
                variable: a.name.clone(),
                column_index: a.column_index,
            });
        }
        std::mem::swap(&mut self.first[row], &mut self.second[row]);
        self.clear_highlights();
        Ok(())
    }

    /// Move a pair one row up. The pair highlight follows the pair.
    pub fn move_up_pair(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.pair_count() {
            return false;
        }
        self.swap_rows(index, index - 1);
        self.highlighted_pair = Some(index - 1);
        true
    }

    /// Move a pair one row down. The pair highlight follows the pair.
    pub fn move_down_pair(&mut self, index: usize) -> bool {
        if index + 1 >= self.pair_count() {
            return false;
        }
        self.swap_rows(index, index + 1);
        self.highlighted_pair = Some(index + 1);
        true
    }

    pub fn remove_pair(&mut self, index: usize) -> bool {
        if index >= self.pair_count() {
            return false;
        }
        self.first.remove(index);
        self.second.remove(index);
        self.normalize();
        self.clear_highlights();
        true
    }

    /// Replace the whole pair list, e.g. after a drag-and-drop reorder.
    ///
    /// Rows with two holes are discarded and numbering restarts at 1.
    pub fn reorder_pairs(&mut self, pairs: Vec<(Option<Variable>, Option<Variable>)>) {
        let (first, second) = pairs
            .into_iter()
            .filter(|(a, b)| a.is_some() || b.is_some())
            .unzip();
        self.first = first;
        self.second = second;
        self.normalize();
        self.clear_highlights();
    }

    /// A pair is valid when both slots are filled with distinct columns.
    pub fn is_pair_valid(&self, index: usize) -> bool {
        matches!(
            self.pair(index),
            Some((Some(a), Some(b))) if !a.same_column(b)
        )
    }

    /// At least one pair exists and every pair is valid.
    pub fn are_all_pairs_valid(&self) -> bool {
        !self.is_empty() && (0..self.pair_count()).all(|i| self.is_pair_valid(i))
    }

    /// Whether two rows pair the same columns in the same order.
    pub fn has_duplicate_pairs(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.first
            .iter()
            .zip(&self.second)
            .filter_map(|(a, b)| Some((a.as_ref()?.column_index, b.as_ref()?.column_index)))
            .any(|key| !seen.insert(key))
    }

    /// The valid pairs with their display numbers, in row order.
    pub fn valid_pairs(&self) -> Vec<CompletePair> {
        (0..self.pair_count())
            .filter(|&i| self.is_pair_valid(i))
            .filter_map(|i| {
                let (first, second) = self.pair(i)?;
                Some(CompletePair {
                    number: self.pair_numbers[i],
                    first: first?.clone(),
                    second: second?.clone(),
                })
            })
            .collect()
    }

    pub fn reset_variable_selection(&mut self) {
        self.first.clear();
        self.second.clear();
        self.pair_numbers.clear();
        self.clear_highlights();
    }

    /// Reconcile with a changed roster.
    ///
    /// Paired variables that vanished leave holes; rows left with two holes
    /// collapse.
    pub fn sync_roster(&mut self, roster: &[Variable]) {
        self.roster = analyzable_variables(roster);
        let roster = &self.roster;
        let refresh = |slot: &Option<Variable>| {
            slot.as_ref()
                .and_then(|old| roster.iter().find(|v| v.same_id(old)).cloned())
        };
        let (first, second) = self
            .first
            .iter()
            .zip(&self.second)
            .map(|(a, b)| (refresh(a), refresh(b)))
            .filter(|(a, b)| a.is_some() || b.is_some())
            .unzip();
        self.first = first;
        self.second = second;
        self.normalize();
        self.clear_highlights();
    }

    /// Toggle the variable highlight cursor.
    pub fn highlight_variable(
        &mut self,
        temp_id: impl Into<String>,
        source: ListSource,
        row_index: Option<usize>,
    ) {
        toggle(
            &mut self.highlighted_variable,
            HighlightedVariable {
                temp_id: temp_id.into(),
                source,
                row_index,
            },
        );
    }

    /// Toggle the pair highlight cursor.
    pub fn highlight_pair(&mut self, index: usize) {
        if index < self.pair_count() {
            toggle(&mut self.highlighted_pair, index);
        }
    }

    fn slots(&self, side: PairSide) -> &Vec<Option<Variable>> {
        match side {
            PairSide::First => &self.first,
            PairSide::Second => &self.second,
        }
    }

    fn slots_mut(&mut self, side: PairSide) -> &mut Vec<Option<Variable>> {
        match side {
            PairSide::First => &mut self.first,
            PairSide::Second => &mut self.second,
        }
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        self.first.swap(a, b);
        self.second.swap(a, b);
        self.highlighted_variable = None;
    }

    /// Pad both sides to equal length and renumber rows densely.
    fn normalize(&mut self) {
        let len = self.first.len().max(self.second.len());
        self.first.resize(len, None);
        self.second.resize(len, None);
        self.pair_numbers = (1..=len).collect();
    }

    fn clear_highlights(&mut self) {
        self.highlighted_variable = None;
        self.highlighted_pair = None;
    }
}
