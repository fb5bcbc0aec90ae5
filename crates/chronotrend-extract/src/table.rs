//! Wide feature table: one row per group, one column per (signal, feature).

use crate::domain::GroupId;

/// Extracted features indexed by group.
///
/// Rows follow the sorted order of `group_ids`; columns follow the sorted order
/// of `columns`. A `None` cell means the feature is undefined for that group
/// (degenerate input or a signal the group never measured); it is never
/// stored as `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    group_ids: Vec<GroupId>,
    columns: Vec<String>,
    rows: Vec<Vec<Option<f64>>>,
}

impl FeatureTable {
    pub(crate) fn new(
        group_ids: Vec<GroupId>,
        columns: Vec<String>,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Self {
        debug_assert_eq!(group_ids.len(), rows.len());
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self { group_ids, columns, rows }
    }

    /// Return the group identifiers, one per row.
    #[must_use]
    pub fn group_ids(&self) -> &[GroupId] {
        &self.group_ids
    }

    /// Return the feature column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Return the cell matrix: `rows()[group_index][column_index]`.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.rows
    }

    /// Return the number of groups (rows).
    #[must_use]
    pub fn n_groups(&self) -> usize {
        self.group_ids.len()
    }

    /// Return the number of feature columns.
    #[must_use]
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Return the number of undefined cells.
    #[must_use]
    pub fn n_undefined(&self) -> usize {
        self.rows.iter().flatten().filter(|c| c.is_none()).count()
    }

    /// Look up one cell.
    ///
    /// Returns `None` when the group or column does not exist, and
    /// `Some(None)` when the cell exists but is undefined.
    #[must_use]
    pub fn get(&self, group: &str, column: &str) -> Option<Option<f64>> {
        let row = self.group_ids.iter().position(|g| g.as_str() == group)?;
        let col = self.columns.binary_search_by(|c| c.as_str().cmp(column)).ok()?;
        Some(self.rows[row][col])
    }
}
