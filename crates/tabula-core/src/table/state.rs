use tabula_engine::engine::{
    CellRef, Grid, Range, RangeValue, Section, Value, find_header, to_range_text,
};

use crate::error::Result;

/// Header rows assumed when a table is built without an explicit count.
pub const DEFAULT_HEADER_ROWS: usize = 1;

/// A named grid with a leading band of header rows.
///
/// Header-preserving operations never move or change rows
/// `1..=header_rows`; only the rows below them (the body) take part.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    pub(crate) name: String,
    pub(crate) grid: Grid,
    pub(crate) header_rows: usize,
}

impl Default for Table {
    fn default() -> Self {
        Table::new("")
    }
}

impl Table {
    /// Create an empty table.
    pub fn new(name: impl Into<String>) -> Self {
        Table {
            name: name.into(),
            grid: Grid::new(),
            header_rows: DEFAULT_HEADER_ROWS,
        }
    }

    pub fn from_rows<T: Into<Value>>(rows: Vec<Vec<T>>, header_rows: usize) -> Self {
        Table::from_grid(Grid::from_rows(rows), header_rows)
    }

    pub fn from_grid(grid: Grid, header_rows: usize) -> Self {
        Table {
            name: String::new(),
            grid,
            header_rows,
        }
    }

    /// Build from JSON: an array of rows, or a nested object flattened into
    /// rows (see [`Grid::from_mapping`]).
    pub fn from_mapping(input: &serde_json::Value, header_rows: usize) -> Result<Self> {
        Ok(Table::from_grid(Grid::from_mapping(input)?, header_rows))
    }

    /// Builder-style name setter.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replace the content wholesale.
    pub fn load<T: Into<Value>>(&mut self, rows: Vec<Vec<T>>, header_rows: usize) {
        self.grid = Grid::from_rows(rows);
        self.header_rows = header_rows;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn into_grid(self) -> Grid {
        self.grid
    }

    pub fn header_rows(&self) -> usize {
        self.header_rows
    }

    pub fn set_header_rows(&mut self, header_rows: usize) {
        self.header_rows = header_rows;
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn columns(&self) -> usize {
        self.grid.columns()
    }

    /// True when there are no rows below the header band.
    pub fn is_empty(&self) -> bool {
        self.grid.rows() <= self.header_rows
    }

    /// The header rows, top to bottom.
    pub fn header_band(&self) -> impl Iterator<Item = &[Value]> {
        self.grid.iter_rows().take(self.header_rows)
    }

    /// The rows below the header band.
    pub fn body_rows(&self) -> impl Iterator<Item = &[Value]> {
        self.grid.iter_rows().skip(self.header_rows)
    }

    /// Copy of the header rows.
    pub fn headers(&self) -> Vec<Vec<Value>> {
        self.header_band().map(<[Value]>::to_vec).collect()
    }

    /// 1-based column index of the first header cell equal to `label`.
    pub fn header_index(&self, label: &str) -> Result<usize> {
        Ok(find_header(&self.grid, self.header_rows, label)?)
    }

    /// Value at 1-based (row, col).
    pub fn cell(&self, row: usize, col: usize) -> &Value {
        self.grid.read(CellRef::new(row, col))
    }

    /// Read an address or range ("B3", "A1:C2", "A:A", "2:2").
    pub fn read(&self, reference: &str) -> Result<RangeValue> {
        Ok(Range::parse(reference)?.read(&self.grid))
    }

    /// Write to an address or range; see [`Range::write`].
    pub fn write(&mut self, reference: &str, value: impl Into<RangeValue>) -> Result<()> {
        Range::parse(reference)?.write(&mut self.grid, value)?;
        Ok(())
    }

    /// Range handle spanning `first` to `last`, or `first` alone.
    pub fn range(&self, first: &str, last: Option<&str>) -> Result<Range> {
        let text = to_range_text(first, last);
        Ok(Range::parse(&text)?)
    }

    pub fn row(&self, index: usize) -> Section {
        Section::row(index)
    }

    pub fn column(&self, index: usize) -> Section {
        Section::column(index)
    }

    /// Column view under the header `label`.
    pub fn column_by_header(&self, label: &str) -> Result<Section> {
        Ok(Section::column(self.header_index(label)?))
    }

    /// Value in data row `row` (1-based grid row) under `label`.
    pub fn value_by_header(&self, row: usize, label: &str) -> Result<&Value> {
        Ok(Section::row(row).value_by_header(&self.grid, self.header_rows, label)?)
    }

    pub fn set_value_by_header(
        &mut self,
        row: usize,
        label: &str,
        value: impl Into<Value>,
    ) -> Result<()> {
        Section::row(row).set_value_by_header(&mut self.grid, self.header_rows, label, value)?;
        Ok(())
    }

    /// All rows, header band included.
    pub fn to_rows(&self) -> Vec<Vec<Value>> {
        self.grid.to_rows()
    }
}
