//! Variable roster entries.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Storage type of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VariableType {
    #[default]
    Numeric,
    String,
    Date,
    Comma,
    Dot,
    Dollar,
    Scientific,
}

impl VariableType {
    /// Whether values of this type are stored as numbers.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, VariableType::String)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VariableType::Numeric => "NUMERIC",
            VariableType::String => "STRING",
            VariableType::Date => "DATE",
            VariableType::Comma => "COMMA",
            VariableType::Dot => "DOT",
            VariableType::Dollar => "DOLLAR",
            VariableType::Scientific => "SCIENTIFIC",
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Level of measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    Scale,
    Nominal,
    Ordinal,
    #[default]
    Unknown,
}

impl Measure {
    pub fn as_str(&self) -> &'static str {
        match self {
            Measure::Scale => "scale",
            Measure::Nominal => "nominal",
            Measure::Ordinal => "ordinal",
            Measure::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A variable of the active dataset.
///
/// Identity is [`Variable::id`]: the synthetic `temp_id` when present,
/// otherwise `temp_id_<column_index>`. Moving a variable between roles always
/// carries the whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_id: Option<String>,
    pub column_index: usize,
    #[serde(rename = "type", default)]
    pub var_type: VariableType,
    #[serde(default)]
    pub measure: Measure,
    #[serde(default)]
    pub decimals: usize,
    #[serde(default = "default_width")]
    pub width: usize,
}

fn default_width() -> usize {
    8
}

impl Variable {
    pub fn new(name: impl Into<String>, column_index: usize) -> Self {
        Self {
            name: name.into(),
            label: None,
            temp_id: None,
            column_index,
            var_type: VariableType::Numeric,
            measure: Measure::Unknown,
            decimals: 0,
            width: default_width(),
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_temp_id(mut self, temp_id: impl Into<String>) -> Self {
        self.temp_id = Some(temp_id.into());
        self
    }

    #[must_use]
    pub fn with_type(mut self, var_type: VariableType) -> Self {
        self.var_type = var_type;
        self
    }

    #[must_use]
    pub fn with_measure(mut self, measure: Measure) -> Self {
        self.measure = measure;
        self
    }

    #[must_use]
    pub fn with_decimals(mut self, decimals: usize) -> Self {
        self.decimals = decimals;
        self
    }

    /// Stable identity of this variable.
    pub fn id(&self) -> Cow<'_, str> {
        match &self.temp_id {
            Some(id) => Cow::Borrowed(id.as_str()),
            None => Cow::Owned(format!("temp_id_{}", self.column_index)),
        }
    }

    /// Whether two records refer to the same roster entry.
    pub fn same_id(&self, other: &Variable) -> bool {
        self.id() == other.id()
    }

    /// Whether two records reference the same underlying data column.
    pub fn same_column(&self, other: &Variable) -> bool {
        self.column_index == other.column_index
    }

    /// Label when set and non-blank, otherwise the name.
    pub fn display_name(&self) -> &str {
        match self.label.as_deref() {
            Some(label) if !label.trim().is_empty() => label,
            _ => &self.name,
        }
    }

    /// Variables without a name are placeholders and never analyzable.
    pub fn is_analyzable(&self) -> bool {
        !self.name.trim().is_empty()
    }
}
