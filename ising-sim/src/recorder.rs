//! Per-run table of observables, filled one macro-step at a time.

/// One cell of a run table.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(f64),
    /// Micro-samples taken inside one macro-step.
    Series(Vec<f64>),
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Scalar(v)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::Series(v)
    }
}

impl From<&[f64]> for Value {
    fn from(v: &[f64]) -> Self {
        Value::Series(v.to_vec())
    }
}

/// Sink for observables, keyed by column name.
pub trait Recorder {
    fn append(&mut self, column: &str, value: Value);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Value>,
}

/// Ordered named columns. A column is created the first time it is appended
/// to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunTable {
    columns: Vec<Column>,
}

impl RunTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Length of the longest column.
    pub fn rows(&self) -> usize {
        self.columns.iter().map(|c| c.cells.len()).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows() == 0
    }
}

impl Recorder for RunTable {
    fn append(&mut self, column: &str, value: Value) {
        match self.columns.iter_mut().find(|c| c.name == column) {
            Some(col) => col.cells.push(value),
            None => self.columns.push(Column {
                name: column.to_string(),
                cells: vec![value],
            }),
        }
    }
}
