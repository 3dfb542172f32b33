//! The row-store side of the provider.

use super::types::{CommitInfo, RowRange};

/// A virtualized table the provider feeds
pub trait HistoryDisplay {
    /// The rows the table currently needs rendered
    fn visible_range(&self) -> RowRange;

    /// Move the window (scrolling, resizing)
    fn set_visible_range(&mut self, range: RowRange);

    /// Replace the total number of rows
    ///
    /// `exact` is false when the count is only an estimate.
    fn set_row_count(&mut self, count: usize, exact: bool);

    /// Write `rows` starting at row `start`
    fn set_row_data(&mut self, start: usize, rows: Vec<CommitInfo>);
}

/// Sparse in-memory row store
///
/// Rows that have not been fetched yet are `None`.
#[derive(Debug, Clone, Default)]
pub struct RowBuffer {
    rows: Vec<Option<CommitInfo>>,
    exact: bool,
    visible: RowRange,
}

impl RowBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer whose window starts at `range`
    pub fn with_visible_range(range: RowRange) -> Self {
        Self {
            visible: range,
            ..Self::default()
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_exact(&self) -> bool {
        self.exact
    }

    pub fn row(&self, index: usize) -> Option<&CommitInfo> {
        self.rows.get(index).and_then(Option::as_ref)
    }

    /// Rows of `range` that are loaded, in row order
    pub fn rows_in(&self, range: RowRange) -> Vec<&CommitInfo> {
        let end = range.end().min(self.rows.len());
        if range.start >= end {
            return Vec::new();
        }
        self.rows[range.start..end]
            .iter()
            .filter_map(Option::as_ref)
            .collect()
    }

    pub fn loaded_rows(&self) -> usize {
        self.rows.iter().filter(|row| row.is_some()).count()
    }
}

impl HistoryDisplay for RowBuffer {
    fn visible_range(&self) -> RowRange {
        self.visible
    }

    fn set_visible_range(&mut self, range: RowRange) {
        self.visible = range;
    }

    fn set_row_count(&mut self, count: usize, exact: bool) {
        self.rows.resize(count, None);
        self.exact = exact;
    }

    fn set_row_data(&mut self, start: usize, rows: Vec<CommitInfo>) {
        let end = start + rows.len();
        if end > self.rows.len() {
            self.rows.resize(end, None);
        }
        for (slot, row) in self.rows[start..end].iter_mut().zip(rows) {
            *slot = Some(row);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::history::test_support::commits;

    #[test]
    fn new_buffer_is_empty() {
        let buffer = RowBuffer::new();
        assert_eq!(buffer.row_count(), 0);
        assert_eq!(buffer.visible_range(), RowRange::default());
        assert!(buffer.row(0).is_none());
    }

    #[test]
    fn row_count_sizes_sparse_rows() {
        let mut buffer = RowBuffer::new();
        buffer.set_row_count(10, true);

        assert_eq!(buffer.row_count(), 10);
        assert!(buffer.is_exact());
        assert_eq!(buffer.loaded_rows(), 0);
    }

    #[test]
    fn row_data_fills_at_offset() {
        let mut buffer = RowBuffer::new();
        buffer.set_row_count(10, true);
        buffer.set_row_data(4, commits(3));

        assert!(buffer.row(3).is_none());
        assert_eq!(buffer.row(4).unwrap().id, "c0");
        assert_eq!(buffer.row(6).unwrap().id, "c2");
        assert!(buffer.row(7).is_none());
        assert_eq!(buffer.loaded_rows(), 3);
    }

    #[test]
    fn row_data_past_count_grows_buffer() {
        let mut buffer = RowBuffer::new();
        buffer.set_row_data(5, commits(2));

        assert_eq!(buffer.row_count(), 7);
        assert_eq!(buffer.row(6).unwrap().id, "c1");
    }

    #[test]
    fn shrinking_count_truncates_rows() {
        let mut buffer = RowBuffer::new();
        buffer.set_row_count(5, true);
        buffer.set_row_data(0, commits(5));
        buffer.set_row_count(2, false);

        assert_eq!(buffer.row_count(), 2);
        assert_eq!(buffer.loaded_rows(), 2);
        assert!(!buffer.is_exact());
    }

    #[test]
    fn rows_in_clamps_to_buffer() {
        let mut buffer = RowBuffer::new();
        buffer.set_row_data(0, commits(3));

        let ids: Vec<&str> = buffer
            .rows_in(RowRange::new(1, 10))
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, vec!["c1", "c2"]);
        assert!(buffer.rows_in(RowRange::new(8, 2)).is_empty());
    }
}
