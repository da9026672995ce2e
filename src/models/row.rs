//! Output rows and tables.

use serde::{Deserialize, Serialize};

/// Output column names, in output order
pub const COLUMNS: [&str; 8] = [
    "snippet",
    "main_headline",
    "pub_date",
    "source",
    "print_headline",
    "sub_headline",
    "type_of_material",
    "word_count",
];

/// One flattened article.
///
/// Field declaration order is the CSV column order and must match [`COLUMNS`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    pub snippet: String,
    pub main_headline: String,
    /// Publication date, `YYYY-MM-DD`
    pub pub_date: String,
    pub source: String,
    pub print_headline: String,
    pub sub_headline: String,
    pub type_of_material: String,
    pub word_count: Option<i64>,
}

/// Rows in retrieval order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultTable {
    rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResultRow> {
        self.rows.iter()
    }
}

impl FromIterator<ResultRow> for ResultTable {
    fn from_iter<I: IntoIterator<Item = ResultRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<ResultRow>> for ResultTable {
    fn from(rows: Vec<ResultRow>) -> Self {
        Self { rows }
    }
}

impl<'a> IntoIterator for &'a ResultTable {
    type Item = &'a ResultRow;
    type IntoIter = std::slice::Iter<'a, ResultRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl IntoIterator for ResultTable {
    type Item = ResultRow;
    type IntoIter = std::vec::IntoIter<ResultRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
