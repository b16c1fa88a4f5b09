use std::ops::Range;

/// Tabular data read by the trend analyzer. Cells outside the table and NaN cells are invalid.
pub trait DataSource {
    fn columns(&self) -> usize;

    /// number of rows of `column`
    fn rows(&self, column: usize) -> usize;

    /// `(value, is_valid)` of one cell
    fn cell(&self, row: usize, column: usize) -> (f64, bool);

    /// smallest valid value of `column` within `rows`
    fn min(&self, column: usize, rows: Range<usize>) -> Option<f64> {
        rows.filter_map(|row| valid_value(self.cell(row, column)))
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.min(v))))
    }

    /// largest valid value of `column` within `rows`
    fn max(&self, column: usize, rows: Range<usize>) -> Option<f64> {
        rows.filter_map(|row| valid_value(self.cell(row, column)))
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))
    }
}

fn valid_value((value, valid): (f64, bool)) -> Option<f64> {
    if valid { Some(value) } else { None }
}

/// In-memory column store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataTable {
    pub headers: Vec<String>,
    pub data: Vec<Vec<f64>>,
}

impl DataTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table from columns, headed `col_0`, `col_1`, ...
    pub fn from_columns(columns: Vec<Vec<f64>>) -> Self {
        let headers = (0..columns.len()).map(|i| format!("col_{}", i)).collect();
        DataTable {
            headers,
            data: columns,
        }
    }

    pub fn push_column(&mut self, header: &str, values: Vec<f64>) -> usize {
        self.headers.push(header.to_string());
        self.data.push(values);
        self.data.len() - 1
    }

    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }
}

impl DataSource for DataTable {
    fn columns(&self) -> usize {
        self.data.len()
    }

    fn rows(&self, column: usize) -> usize {
        self.data.get(column).map_or(0, |c| c.len())
    }

    fn cell(&self, row: usize, column: usize) -> (f64, bool) {
        match self.data.get(column).and_then(|c| c.get(row)) {
            Some(v) if !v.is_nan() => (*v, true),
            _ => (f64::NAN, false),
        }
    }
}
