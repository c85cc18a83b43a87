//! CSV header parsing.

/// Result of CSV header analysis.
#[derive(Debug, Clone)]
pub struct CsvHeaders {
    /// Column names (trimmed).
    pub columns: Vec<String>,
    /// Variable labels when a labels row precedes the names row.
    pub labels: Option<Vec<String>>,
}

impl CsvHeaders {
    pub fn single(columns: Vec<String>) -> Self {
        Self {
            columns,
            labels: None,
        }
    }

    pub fn double(labels: Vec<String>, columns: Vec<String>) -> Self {
        Self {
            columns,
            labels: Some(labels),
        }
    }

    /// Label of the column at `index`, if one was given and is non-blank.
    pub fn label_at(&self, index: usize) -> Option<&str> {
        self.labels
            .as_ref()
            .and_then(|labels| labels.get(index))
            .map(String::as_str)
            .filter(|label| !label.is_empty())
    }
}

/// Parses a CSV line into trimmed fields, handling quoted values.
pub fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if !in_quotes => in_quotes = true,
            '"' => {
                // "" inside quotes is an escaped quote
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }

    fields.push(current.trim().to_string());
    fields
}
