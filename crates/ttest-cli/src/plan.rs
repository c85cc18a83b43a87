//! Building selections from command-line names.
//!
//! Variables are looked up by name in the roster and moved through the same
//! selection operations an interactive dialog would use, so placement rules
//! and rejections apply unchanged.

use anyhow::{Result, anyhow, bail};
use ttest_model::{CellValue, GroupDefinition, Variable};
use ttest_select::{IndependentSelection, PairSide, PairedSelection};

/// Find a roster variable by exact name.
pub fn find_variable<'a>(roster: &'a [Variable], name: &str) -> Result<&'a Variable> {
    roster.iter().find(|v| v.name == name).ok_or_else(|| {
        let known = roster
            .iter()
            .map(|v| v.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        anyhow!("unknown variable '{name}' (available: {known})")
    })
}

/// Test variables in the given order plus the grouping variable.
pub fn independent_selection(
    roster: &[Variable],
    test_names: &[String],
    grouping_name: Option<&str>,
) -> Result<IndependentSelection> {
    let mut selection = IndependentSelection::new(roster);
    if let Some(name) = grouping_name {
        let variable = find_variable(roster, name)?;
        if !selection.move_to_grouping_variable(variable) {
            bail!("'{name}' cannot be used as the grouping variable");
        }
    }
    for name in test_names {
        let variable = find_variable(roster, name)?;
        if !selection.move_to_test_variables(variable, None) {
            bail!("'{name}' cannot be used as a test variable");
        }
    }
    Ok(selection)
}

/// One row per `(first, second)` pair.
pub fn paired_selection(roster: &[Variable], pairs: &[(String, String)]) -> Result<PairedSelection> {
    let mut selection = PairedSelection::new(roster);
    for (first, second) in pairs {
        let first = find_variable(roster, first)?;
        let second = find_variable(roster, second)?;
        selection
            .move_to_test_variables(first, Some(PairSide::First))
            .map_err(|e| anyhow!("cannot pair '{}': {e}", first.name))?;
        selection
            .move_to_test_variables(second, Some(PairSide::Second))
            .map_err(|e| anyhow!("cannot pair '{}' with '{}': {e}", first.name, second.name))?;
    }
    Ok(selection)
}

/// `FIRST:SECOND`
pub fn parse_pair(value: &str) -> Result<(String, String), String> {
    match value.split_once(':') {
        Some((first, second)) if !first.trim().is_empty() && !second.trim().is_empty() => {
            Ok((first.trim().to_string(), second.trim().to_string()))
        }
        _ => Err(format!("expected FIRST:SECOND, got '{value}'")),
    }
}

/// A group code as typed: numeric when it parses as a number.
pub fn parse_group_value(value: &str) -> CellValue {
    match value.trim().parse::<f64>() {
        Ok(number) => CellValue::Number(number),
        Err(_) => CellValue::text(value),
    }
}

/// Group definition from `--groups` or `--cut-point`. Missing values stay
/// missing so validation can report them.
pub fn group_definition(groups: &[String], cut_point: Option<&str>) -> GroupDefinition {
    if let Some(cut) = cut_point {
        return GroupDefinition::CutPoint {
            value: Some(parse_group_value(cut)),
        };
    }
    GroupDefinition::SpecifiedValues {
        group1: groups.first().map(|v| parse_group_value(v)),
        group2: groups.get(1).map(|v| parse_group_value(v)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<Variable> {
        vec![
            Variable::new("group", 0),
            Variable::new("pre", 1),
            Variable::new("post", 2),
        ]
    }

    #[test]
    fn pair_syntax() {
        assert_eq!(
            parse_pair("pre:post"),
            Ok(("pre".to_string(), "post".to_string()))
        );
        assert!(parse_pair("pre").is_err());
        assert!(parse_pair(":post").is_err());
    }

    #[test]
    fn group_values_prefer_numbers() {
        assert_eq!(parse_group_value("2"), CellValue::Number(2.0));
        assert_eq!(parse_group_value("M"), CellValue::Text("M".into()));
        assert_eq!(
            group_definition(&["1".into()], None),
            GroupDefinition::SpecifiedValues {
                group1: Some(CellValue::Number(1.0)),
                group2: None
            }
        );
        assert_eq!(
            group_definition(&[], Some("70")),
            GroupDefinition::cut_point(70.0)
        );
    }

    #[test]
    fn unknown_names_are_reported() {
        let err = find_variable(&roster(), "weight").unwrap_err();
        assert!(err.to_string().contains("available: group, pre, post"));
    }

    #[test]
    fn builds_independent_roles() {
        let selection =
            independent_selection(&roster(), &["post".into(), "pre".into()], Some("group"))
                .unwrap();
        let tests: Vec<_> = selection.test_variables().iter().map(|v| &v.name).collect();
        assert_eq!(tests, ["post", "pre"]);
        assert_eq!(selection.grouping_variable().unwrap().name, "group");
        assert!(selection.available_variables().is_empty());
    }

    #[test]
    fn builds_pairs_in_order() {
        let pairs = [
            ("pre".to_string(), "post".to_string()),
            ("post".to_string(), "pre".to_string()),
        ];
        let selection = paired_selection(&roster(), &pairs).unwrap();
        assert_eq!(selection.pair_count(), 2);
        let valid = selection.valid_pairs();
        assert_eq!(valid[1].label(), "post - pre");
    }

    #[test]
    fn self_pair_is_rejected() {
        let pairs = [("pre".to_string(), "pre".to_string())];
        assert!(paired_selection(&roster(), &pairs).is_err());
    }
}
