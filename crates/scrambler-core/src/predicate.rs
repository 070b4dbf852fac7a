use serde::{Deserialize, Serialize};

use crate::target::ColumnName;

/// One independent condition over a column of the target table.
///
/// Values are data. Stores must bind them as parameters, never splice them
/// into query text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fragment {
    /// Column text does not contain `needle`, ignoring case. NULL contains nothing.
    NotContains { column: ColumnName, needle: String },
    /// Column text equals `value`. NULL equals nothing.
    Equals { column: ColumnName, value: String },
}

impl Fragment {
    pub fn column(&self) -> &ColumnName {
        match self {
            Fragment::NotContains { column, .. } | Fragment::Equals { column, .. } => column,
        }
    }

    pub fn matches(&self, cell: Option<&str>) -> bool {
        match self {
            Fragment::NotContains { needle, .. } => {
                let needle = needle.to_lowercase();
                cell.is_none_or(|text| !text.to_lowercase().contains(&needle))
            }
            Fragment::Equals { value, .. } => cell == Some(value.as_str()),
        }
    }
}

/// AND-composition of fragments. Empty selects every row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Predicate {
    fragments: Vec<Fragment>,
}

impl Predicate {
    /// The predicate with no restriction.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn from_fragments(fragments: Vec<Fragment>) -> Self {
        Self { fragments }
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// AND-join with another predicate, keeping fragment order.
    pub fn and(mut self, other: Predicate) -> Self {
        self.fragments.extend(other.fragments);
        self
    }

    /// Evaluate against a row, given a lookup from column to text value.
    pub fn matches<'r>(&self, lookup: impl Fn(&ColumnName) -> Option<&'r str>) -> bool {
        self.fragments
            .iter()
            .all(|fragment| fragment.matches(lookup(fragment.column())))
    }
}
