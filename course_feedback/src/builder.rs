pub use crate::config::*;

use log::debug;
use std::collections::HashSet;

/// A builder for assembling a [`RawTable`] row by row.
///
/// The file readers feed it with decoded cells; tests use the `_simple` variants.
///
/// ```
/// use course_feedback::builder::TableBuilder;
/// # use course_feedback::FeedbackError;
///
/// let mut builder = TableBuilder::new_simple(&["Name of the Student", "SRN", "Comments", "Comments"])?;
/// builder.add_row_simple(&["Alice", "S1", "Good", ""])?;
/// let table = builder.build();
///
/// assert_eq!(table.columns()[3], "Comments.1");
/// assert_eq!(table.labels()[3], "Comments");
///
/// # Ok::<(), FeedbackError>(())
/// ```
pub struct TableBuilder {
    pub(crate) _columns: Vec<String>,
    pub(crate) _labels: Vec<String>,
    pub(crate) _rows: Vec<(usize, Vec<Option<String>>)>,
    pub(crate) _next_line: usize,
}

impl TableBuilder {
    /// Starts a table from the cells of its header row.
    pub fn new(header: &[Option<String>]) -> Result<TableBuilder, FeedbackError> {
        let labels: Vec<String> = header
            .iter()
            .enumerate()
            .map(|(idx, c)| match c.as_deref().map(|s| s.trim()) {
                Some(s) if !s.is_empty() => s.to_string(),
                _ => format!("Unnamed: {}", idx),
            })
            .collect();
        // Trailing blank header cells are common in exports, they carry nothing.
        let width = header
            .iter()
            .rposition(|c| c.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false))
            .map(|idx| idx + 1)
            .ok_or(FeedbackError::EmptyHeader)?;
        let labels: Vec<String> = labels.into_iter().take(width).collect();
        let columns = unique_names(&labels);
        debug!("TableBuilder::new: columns: {:?}", columns);
        Ok(TableBuilder {
            _columns: columns,
            _labels: labels,
            _rows: Vec::new(),
            _next_line: 2,
        })
    }

    pub fn new_simple(header: &[&str]) -> Result<TableBuilder, FeedbackError> {
        let cells: Vec<Option<String>> = header.iter().map(|s| Some(s.to_string())).collect();
        TableBuilder::new(&cells)
    }

    /// Sets the file line of the next row to be added (1-based).
    pub fn first_data_line(mut self, lineno: usize) -> TableBuilder {
        self._next_line = lineno;
        self
    }

    /// Adds a row. Missing trailing cells are treated as absent.
    pub fn add_row(&mut self, cells: &[Option<String>]) -> Result<(), FeedbackError> {
        let lineno = self._next_line;
        self.add_row_at(lineno, cells)
    }

    /// Adds a row found at the given file line. The following rows continue from there.
    pub fn add_row_at(&mut self, lineno: usize, cells: &[Option<String>]) -> Result<(), FeedbackError> {
        self._next_line = lineno + 1;
        let width = self._columns.len();
        if cells.len() > width {
            let overflow = cells[width..]
                .iter()
                .any(|c| c.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false));
            if overflow {
                return Err(FeedbackError::RowTooLong {
                    lineno,
                    width,
                    found: cells.len(),
                });
            }
        }
        let mut row: Vec<Option<String>> = cells.iter().take(width).cloned().collect();
        row.resize(width, None);
        self._rows.push((lineno, row));
        Ok(())
    }

    /// Adds a row of plain strings. Empty strings are absent cells.
    pub fn add_row_simple(&mut self, cells: &[&str]) -> Result<(), FeedbackError> {
        let cells: Vec<Option<String>> = cells
            .iter()
            .map(|s| match s {
                s if s.is_empty() => None,
                s => Some(s.to_string()),
            })
            .collect();
        self.add_row(&cells)
    }

    pub fn build(self) -> RawTable {
        RawTable {
            columns: self._columns,
            labels: self._labels,
            rows: self._rows,
        }
    }
}

// Later repetitions of a label get a `.1`, `.2`... suffix, skipping names already in use.
fn unique_names(labels: &[String]) -> Vec<String> {
    let mut taken: HashSet<String> = labels.iter().cloned().collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut res: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels.iter() {
        if seen.insert(label.as_str()) {
            res.push(label.clone());
            continue;
        }
        let mut suffix = 1;
        let mut candidate = format!("{}.{}", label, suffix);
        while taken.contains(&candidate) {
            suffix += 1;
            candidate = format!("{}.{}", label, suffix);
        }
        taken.insert(candidate.clone());
        res.push(candidate);
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_labels_get_suffixes() {
        let b = TableBuilder::new_simple(&["A", "B", "A", "A.1", "A"]).unwrap();
        let t = b.build();
        assert_eq!(t.columns(), &["A", "B", "A.2", "A.1", "A.3"]);
        assert_eq!(t.labels(), &["A", "B", "A", "A.1", "A"]);
    }

    #[test]
    fn blank_header_cells() {
        let header = vec![
            Some("A".to_string()),
            None,
            Some("B".to_string()),
            Some("  ".to_string()),
        ];
        let t = TableBuilder::new(&header).unwrap().build();
        assert_eq!(t.columns(), &["A", "Unnamed: 1", "B"]);
    }

    #[test]
    fn empty_header() {
        let header = vec![None, Some(" ".to_string())];
        assert_eq!(
            TableBuilder::new(&header).err(),
            Some(FeedbackError::EmptyHeader)
        );
    }

    #[test]
    fn short_and_long_rows() {
        let mut b = TableBuilder::new_simple(&["A", "B", "C"])
            .unwrap()
            .first_data_line(5);
        b.add_row_simple(&["1"]).unwrap();
        b.add_row_simple(&["1", "2", "3", "", " "]).unwrap();
        let err = b.add_row_simple(&["1", "2", "3", "4"]).err();
        assert_eq!(
            err,
            Some(FeedbackError::RowTooLong {
                lineno: 7,
                width: 3,
                found: 4
            })
        );
        let t = b.build();
        assert_eq!(t.num_rows(), 2);
        let rows: Vec<RawRow> = t.rows().collect();
        assert_eq!(rows[0].lineno(), 5);
        assert_eq!(rows[0].get(0), Some("1"));
        assert_eq!(rows[0].get(2), None);
        assert_eq!(rows[1].get_by_name("C"), Some("3"));
    }

    #[test]
    fn explicit_line_numbers() {
        let mut b = TableBuilder::new_simple(&["A"]).unwrap();
        b.add_row_at(4, &[Some("x".to_string())]).unwrap();
        b.add_row_simple(&["y"]).unwrap();
        b.add_row_at(9, &[Some("z".to_string())]).unwrap();
        let t = b.build();
        let lines: Vec<usize> = t.rows().map(|r| r.lineno()).collect();
        assert_eq!(lines, vec![4, 5, 9]);
    }

    #[test]
    fn cells_are_trimmed() {
        let mut b = TableBuilder::new_simple(&["A", "B"]).unwrap();
        b.add_row_simple(&["  x ", "   "]).unwrap();
        let t = b.build();
        let row = t.rows().next().unwrap();
        assert_eq!(row.get(0), Some("x"));
        assert_eq!(row.get(1), None);
        assert_eq!(row.get_by_name("missing"), None);
    }
}
