//! Role assignment for the independent-samples dialog.
//!
//! Every analyzable roster variable sits in exactly one of three roles:
//! available, test, or grouping. The grouping role holds at most one
//! variable. All moves carry the full [`Variable`] record.

use ttest_model::Variable;

use crate::analyzable_variables;
use crate::highlight::{HighlightedVariable, ListSource, toggle};

/// Ordered list that [`IndependentSelection::reorder_variables`] can rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableList {
    Available,
    Test,
}

/// Selection state of the independent-samples dialog.
#[derive(Debug, Clone, Default)]
pub struct IndependentSelection {
    roster: Vec<Variable>,
    available: Vec<Variable>,
    test: Vec<Variable>,
    grouping: Option<Variable>,
    highlighted: Option<HighlightedVariable>,
}

impl IndependentSelection {
    /// Start with every analyzable roster variable available.
    pub fn new(roster: &[Variable]) -> Self {
        let roster = analyzable_variables(roster);
        Self {
            available: roster.clone(),
            roster,
            test: Vec::new(),
            grouping: None,
            highlighted: None,
        }
    }

    pub fn available_variables(&self) -> &[Variable] {
        &self.available
    }

    pub fn test_variables(&self) -> &[Variable] {
        &self.test
    }

    pub fn grouping_variable(&self) -> Option<&Variable> {
        self.grouping.as_ref()
    }

    pub fn highlighted(&self) -> Option<&HighlightedVariable> {
        self.highlighted.as_ref()
    }

    /// The role a variable currently holds, if it is tracked at all.
    pub fn role_of(&self, variable: &Variable) -> Option<ListSource> {
        if self.available.iter().any(|v| v.same_id(variable)) {
            Some(ListSource::Available)
        } else if self.test.iter().any(|v| v.same_id(variable)) {
            Some(ListSource::Test)
        } else if self.grouping.as_ref().is_some_and(|v| v.same_id(variable)) {
            Some(ListSource::Grouping)
        } else {
            None
        }
    }

    /// Move a variable into the test list.
    ///
    /// The variable leaves whichever role it held. Without `target_index` it
    /// is appended; with one it is inserted at that position (clamped).
    /// A variable already in the test list is left where it is.
    ///
    /// Returns `true` when the state changed.
    pub fn move_to_test_variables(
        &mut self,
        variable: &Variable,
        target_index: Option<usize>,
    ) -> bool {
        let record = match self.role_of(variable) {
            Some(ListSource::Available) => self.take_available(variable),
            Some(ListSource::Grouping) => self.grouping.take(),
            _ => None,
        };
        let Some(record) = record else {
            return false;
        };

        let index = target_index.map_or(self.test.len(), |i| i.min(self.test.len()));
        tracing::debug!(variable = %record.name, index, "moved to test variables");
        self.test.insert(index, record);
        self.highlighted = None;
        true
    }

    /// Make a variable the grouping variable.
    ///
    /// A previous grouping variable returns to the available list at the
    /// position its roster order dictates.
    pub fn move_to_grouping_variable(&mut self, variable: &Variable) -> bool {
        let record = match self.role_of(variable) {
            Some(ListSource::Available) => self.take_available(variable),
            Some(ListSource::Test) => self.take_test(variable),
            _ => None,
        };
        let Some(record) = record else {
            return false;
        };

        if let Some(previous) = self.grouping.take() {
            tracing::debug!(variable = %previous.name, "grouping variable evicted");
            self.insert_in_roster_order(previous);
        }
        tracing::debug!(variable = %record.name, "grouping variable set");
        self.grouping = Some(record);
        self.highlighted = None;
        true
    }

    /// Return a variable to the available list.
    ///
    /// With `target_index` the variable is inserted there (clamped). Without
    /// one it is appended and the list is re-sorted by column index.
    pub fn move_to_available_variables(
        &mut self,
        variable: &Variable,
        target_index: Option<usize>,
    ) -> bool {
        let record = match self.role_of(variable) {
            Some(ListSource::Test) => self.take_test(variable),
            Some(ListSource::Grouping) => self.grouping.take(),
            _ => None,
        };
        let Some(record) = record else {
            return false;
        };

        match target_index {
            Some(index) => {
                let index = index.min(self.available.len());
                self.available.insert(index, record);
            }
            None => {
                self.available.push(record);
                self.available.sort_by_key(|v| v.column_index);
            }
        }
        self.highlighted = None;
        true
    }

    /// Replace the order of one list.
    ///
    /// Applied only when `new_order` is a permutation of the list's current
    /// contents; anything else is ignored.
    pub fn reorder_variables(&mut self, list: VariableList, new_order: Vec<Variable>) -> bool {
        let current = match list {
            VariableList::Available => &mut self.available,
            VariableList::Test => &mut self.test,
        };
        if !is_permutation(current, &new_order) {
            tracing::debug!(?list, "ignored reorder that is not a permutation");
            return false;
        }
        *current = new_order;
        self.highlighted = None;
        true
    }

    /// Put every variable back in the available list, in roster order.
    pub fn reset_variable_selection(&mut self) {
        self.available = self.roster.clone();
        self.test.clear();
        self.grouping = None;
        self.highlighted = None;
    }

    /// Reconcile with a changed roster.
    ///
    /// Assigned variables that still exist keep their role and pick up the
    /// refreshed record; variables that disappeared are dropped; new ones
    /// become available.
    pub fn sync_roster(&mut self, roster: &[Variable]) {
        let roster = analyzable_variables(roster);
        let refreshed = |old: &Variable| roster.iter().find(|v| v.same_id(old)).cloned();

        self.test = self.test.iter().filter_map(refreshed).collect();
        self.grouping = self.grouping.as_ref().and_then(refreshed);

        let test = &self.test;
        let grouping = &self.grouping;
        self.available = roster
            .iter()
            .filter(|v| {
                !test.iter().any(|t| t.same_id(v))
                    && !grouping.as_ref().is_some_and(|g| g.same_id(v))
            })
            .cloned()
            .collect();
        self.roster = roster;
        self.highlighted = None;
    }

    /// Toggle the highlight cursor on a variable in a list.
    pub fn highlight_variable(&mut self, temp_id: impl Into<String>, source: ListSource) {
        toggle(
            &mut self.highlighted,
            HighlightedVariable {
                temp_id: temp_id.into(),
                source,
                row_index: None,
            },
        );
    }

    pub fn clear_highlight(&mut self) {
        self.highlighted = None;
    }

    fn take_available(&mut self, variable: &Variable) -> Option<Variable> {
        let index = self.available.iter().position(|v| v.same_id(variable))?;
        Some(self.available.remove(index))
    }

    fn take_test(&mut self, variable: &Variable) -> Option<Variable> {
        let index = self.test.iter().position(|v| v.same_id(variable))?;
        Some(self.test.remove(index))
    }

    fn roster_rank(&self, variable: &Variable) -> usize {
        self.roster
            .iter()
            .position(|v| v.same_id(variable))
            .unwrap_or(usize::MAX)
    }

    /// Insert before the first available variable that comes later in the
    /// roster.
    fn insert_in_roster_order(&mut self, variable: Variable) {
        let rank = self.roster_rank(&variable);
        let index = self
            .available
            .iter()
            .position(|v| self.roster_rank(v) > rank)
            .unwrap_or(self.available.len());
        self.available.insert(index, variable);
    }
}

fn is_permutation(current: &[Variable], candidate: &[Variable]) -> bool {
    if current.len() != candidate.len() {
        return false;
    }
    let mut ids: Vec<_> = current.iter().map(Variable::id).collect();
    let mut other: Vec<_> = candidate.iter().map(Variable::id).collect();
    ids.sort();
    other.sort();
    ids == other
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<Variable> {
        vec![
            Variable::new("age", 0),
            Variable::new("score", 1),
            Variable::new("group", 2),
            Variable::new("weight", 3),
            Variable::new("", 4),
        ]
    }

    fn names(vars: &[Variable]) -> Vec<&str> {
        vars.iter().map(|v| v.name.as_str()).collect()
    }

    #[test]
    fn new_filters_blank_names() {
        let selection = IndependentSelection::new(&roster());
        assert_eq!(
            names(selection.available_variables()),
            ["age", "score", "group", "weight"]
        );
        assert!(selection.test_variables().is_empty());
        assert!(selection.grouping_variable().is_none());
    }

    #[test]
    fn move_to_test_appends_and_inserts() {
        let vars = roster();
        let mut selection = IndependentSelection::new(&vars);
        assert!(selection.move_to_test_variables(&vars[1], None));
        assert!(selection.move_to_test_variables(&vars[0], Some(0)));
        assert!(selection.move_to_test_variables(&vars[3], Some(99)));
        assert_eq!(names(selection.test_variables()), ["age", "score", "weight"]);
        assert_eq!(names(selection.available_variables()), ["group"]);
    }

    #[test]
    fn move_to_test_twice_is_noop() {
        let vars = roster();
        let mut selection = IndependentSelection::new(&vars);
        selection.move_to_test_variables(&vars[0], None);
        assert!(!selection.move_to_test_variables(&vars[0], Some(0)));
        assert_eq!(names(selection.test_variables()), ["age"]);
    }

    #[test]
    fn untracked_variable_is_ignored() {
        let vars = roster();
        let mut selection = IndependentSelection::new(&vars);
        let stranger = Variable::new("stranger", 42);
        assert!(!selection.move_to_test_variables(&stranger, None));
        assert!(!selection.move_to_grouping_variable(&stranger));
        assert!(!selection.move_to_available_variables(&stranger, None));
        assert_eq!(selection.available_variables().len(), 4);
    }

    #[test]
    fn grouping_replacement_returns_previous_in_roster_order() {
        let vars = roster();
        let mut selection = IndependentSelection::new(&vars);
        selection.move_to_grouping_variable(&vars[1]);
        assert_eq!(names(selection.available_variables()), ["age", "group", "weight"]);

        selection.move_to_grouping_variable(&vars[2]);
        assert_eq!(selection.grouping_variable().map(|v| v.name.as_str()), Some("group"));
        assert_eq!(names(selection.available_variables()), ["age", "score", "weight"]);
    }

    #[test]
    fn grouping_from_test_list() {
        let vars = roster();
        let mut selection = IndependentSelection::new(&vars);
        selection.move_to_test_variables(&vars[0], None);
        assert!(selection.move_to_grouping_variable(&vars[0]));
        assert!(selection.test_variables().is_empty());
        assert_eq!(selection.role_of(&vars[0]), Some(ListSource::Grouping));
    }

    #[test]
    fn move_to_available_without_index_sorts_by_column() {
        let vars = roster();
        let mut selection = IndependentSelection::new(&vars);
        selection.move_to_test_variables(&vars[0], None);
        selection.move_to_test_variables(&vars[3], None);
        selection.move_to_available_variables(&vars[0], None);
        assert_eq!(names(selection.available_variables()), ["age", "score", "group"]);

        selection.move_to_available_variables(&vars[3], Some(0));
        assert_eq!(
            names(selection.available_variables()),
            ["weight", "age", "score", "group"]
        );
    }

    #[test]
    fn reorder_requires_permutation() {
        let vars = roster();
        let mut selection = IndependentSelection::new(&vars);
        selection.move_to_test_variables(&vars[0], None);
        selection.move_to_test_variables(&vars[1], None);

        let reversed = vec![vars[1].clone(), vars[0].clone()];
        assert!(selection.reorder_variables(VariableList::Test, reversed));
        assert_eq!(names(selection.test_variables()), ["score", "age"]);

        let foreign = vec![vars[1].clone(), vars[3].clone()];
        assert!(!selection.reorder_variables(VariableList::Test, foreign));
        assert!(!selection.reorder_variables(VariableList::Test, vec![vars[1].clone()]));
        assert_eq!(names(selection.test_variables()), ["score", "age"]);
    }

    #[test]
    fn reset_restores_roster() {
        let vars = roster();
        let mut selection = IndependentSelection::new(&vars);
        selection.move_to_test_variables(&vars[3], None);
        selection.move_to_grouping_variable(&vars[0]);
        selection.reset_variable_selection();
        assert_eq!(
            names(selection.available_variables()),
            ["age", "score", "group", "weight"]
        );
        assert!(selection.grouping_variable().is_none());
    }

    #[test]
    fn sync_roster_drops_removed_and_refreshes_records() {
        let vars = roster();
        let mut selection = IndependentSelection::new(&vars);
        selection.move_to_test_variables(&vars[1], None);
        selection.move_to_grouping_variable(&vars[2]);

        let updated = vec![
            Variable::new("age", 0),
            Variable::new("score", 1).with_label("Test score"),
            Variable::new("weight", 3),
            Variable::new("height", 5),
        ];
        selection.sync_roster(&updated);

        assert_eq!(
            selection.test_variables()[0].label.as_deref(),
            Some("Test score")
        );
        assert!(selection.grouping_variable().is_none());
        assert_eq!(names(selection.available_variables()), ["age", "weight", "height"]);
    }

    #[test]
    fn highlight_toggles_and_clears_on_move() {
        let vars = roster();
        let mut selection = IndependentSelection::new(&vars);
        selection.highlight_variable("temp_id_0", ListSource::Available);
        assert!(selection.highlighted().is_some());
        selection.highlight_variable("temp_id_0", ListSource::Available);
        assert!(selection.highlighted().is_none());

        selection.highlight_variable("temp_id_0", ListSource::Available);
        selection.move_to_test_variables(&vars[0], None);
        assert!(selection.highlighted().is_none());
    }

    #[test]
    fn reorder_clears_highlight_only_when_applied() {
        let vars = roster();
        let mut selection = IndependentSelection::new(&vars);
        selection.highlight_variable("temp_id_1", ListSource::Available);

        let partial = vec![vars[1].clone()];
        assert!(!selection.reorder_variables(VariableList::Available, partial));
        assert!(selection.highlighted().is_some());

        let reversed: Vec<_> = selection.available_variables().iter().rev().cloned().collect();
        assert!(selection.reorder_variables(VariableList::Available, reversed));
        assert!(selection.highlighted().is_none());
    }
}
