//! Rejection reasons for selection operations.

use thiserror::Error;

/// Why a pairing operation left the state unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PairingRejection {
    /// Both members of the pair would reference the same data column.
    #[error("Cannot pair '{variable}' with itself (column {column_index})")]
    SameColumn {
        /// Name of the incoming or conflicting variable.
        variable: String,
        /// Shared column index.
        column_index: usize,
    },

    /// The variable is not part of the roster.
    #[error("Variable '{0}' is not in the variable list")]
    UnknownVariable(String),

    /// No pair row at the given index.
    #[error("Pair row {0} does not exist")]
    NoSuchRow(usize),
}

impl PairingRejection {
    /// Whether the rejection comes from a self-pairing attempt.
    pub fn is_same_column(&self) -> bool {
        matches!(self, Self::SameColumn { .. })
    }
}
