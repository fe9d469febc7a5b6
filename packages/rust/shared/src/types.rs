//! Core domain types for ContactScout runs.

use crate::error::{ContactScoutError, Result};

/// Column appended to every output table.
pub const EMAIL_COLUMN: &str = "EMAIL";

/// Header names that may hold the company name, in priority order.
///
/// The first entry keeps its trailing space: many exported sheets carry it.
pub const COMPANY_HEADER_CANDIDATES: [&str; 4] =
    ["Company ", "Company", "Company Name", "Organization"];

// ---------------------------------------------------------------------------
// RowWindow
// ---------------------------------------------------------------------------

/// Where a data row sits relative to a [`RowWindow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPosition {
    /// Before `start`: written unchanged, no lookup.
    Before,
    /// Inside the window: eligible for a lookup.
    Active,
    /// After `end`: processing stops here.
    After,
}

/// Inclusive, 1-indexed range of data rows (header excluded) that receive a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowWindow {
    start: usize,
    end: Option<usize>,
}

impl RowWindow {
    /// Build a window. `start` must be at least 1 and `end`, if given, not before it.
    pub fn new(start: usize, end: Option<usize>) -> Result<Self> {
        if start == 0 {
            return Err(ContactScoutError::validation(
                "start_row is 1-indexed and must be at least 1",
            ));
        }
        if let Some(end) = end {
            if end < start {
                return Err(ContactScoutError::validation(format!(
                    "end_row {end} is before start_row {start}"
                )));
            }
        }
        Ok(Self { start, end })
    }

    /// A window covering every row.
    pub fn all() -> Self {
        Self {
            start: 1,
            end: None,
        }
    }

    pub fn end(&self) -> Option<usize> {
        self.end
    }

    /// Classify a 1-indexed data row.
    pub fn position(&self, row: usize) -> WindowPosition {
        if row < self.start {
            WindowPosition::Before
        } else if self.end.is_some_and(|end| row > end) {
            WindowPosition::After
        } else {
            WindowPosition::Active
        }
    }
}

impl Default for RowWindow {
    fn default() -> Self {
        Self::all()
    }
}

impl std::fmt::Display for RowWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.end {
            Some(end) => write!(f, "{}..={end}", self.start),
            None => write!(f, "{}..", self.start),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_positions() {
        let window = RowWindow::new(2, Some(4)).expect("window");
        assert_eq!(window.position(1), WindowPosition::Before);
        assert_eq!(window.position(2), WindowPosition::Active);
        assert_eq!(window.position(4), WindowPosition::Active);
        assert_eq!(window.position(5), WindowPosition::After);
    }

    #[test]
    fn open_window_never_ends() {
        let window = RowWindow::new(3, None).expect("window");
        assert_eq!(window.position(2), WindowPosition::Before);
        assert_eq!(window.position(10_000), WindowPosition::Active);
    }

    #[test]
    fn single_row_window() {
        let window = RowWindow::new(3, Some(3)).expect("window");
        assert_eq!(window.position(3), WindowPosition::Active);
        assert_eq!(window.position(4), WindowPosition::After);
    }

    #[test]
    fn zero_start_rejected() {
        let err = RowWindow::new(0, None).unwrap_err();
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn inverted_window_rejected() {
        let err = RowWindow::new(5, Some(2)).unwrap_err();
        assert!(err.to_string().contains("end_row 2 is before start_row 5"));
    }

    #[test]
    fn window_display() {
        assert_eq!(RowWindow::all().to_string(), "1..");
        assert_eq!(RowWindow::new(2, Some(9)).unwrap().to_string(), "2..=9");
    }

    #[test]
    fn company_headers_keep_priority_order() {
        assert_eq!(COMPANY_HEADER_CANDIDATES[0], "Company ");
        assert_eq!(COMPANY_HEADER_CANDIDATES[3], "Organization");
    }
}
