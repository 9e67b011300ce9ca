use tabula_engine::engine::{Grid, Value};
use tracing::debug;

use super::Table;
use crate::error::Result;

/// Something that can be added to the bottom (or side) of a table.
#[derive(Clone, Debug)]
pub enum Appendable {
    /// Several rows.
    Rows(Vec<Vec<Value>>),
    /// A single row.
    Row(Vec<Value>),
    /// JSON rows or a nested object, flattened like [`Grid::from_mapping`].
    Mapping(serde_json::Value),
    /// Another table. Its header rows are only taken when this table has
    /// no data rows yet.
    Table(Table),
    /// A new rightmost column, one value per existing row.
    Column(Vec<Value>),
    /// A single value appended to the end of the first row.
    Scalar(Value),
}

impl From<Vec<Vec<Value>>> for Appendable {
    fn from(rows: Vec<Vec<Value>>) -> Self {
        Appendable::Rows(rows)
    }
}

impl From<Vec<Value>> for Appendable {
    fn from(row: Vec<Value>) -> Self {
        Appendable::Row(row)
    }
}

impl From<Table> for Appendable {
    fn from(table: Table) -> Self {
        Appendable::Table(table)
    }
}

impl From<serde_json::Value> for Appendable {
    fn from(json: serde_json::Value) -> Self {
        Appendable::Mapping(json)
    }
}

impl From<Value> for Appendable {
    fn from(value: Value) -> Self {
        Appendable::Scalar(value)
    }
}

impl Table {
    /// Add `item` to the table.
    ///
    /// Rows written into a table whose cells are all blank replace its
    /// content instead of landing below the blank rows.
    pub fn append(&mut self, item: impl Into<Appendable>) -> Result<()> {
        match item.into() {
            Appendable::Rows(rows) => self.push_rows(rows),
            Appendable::Row(row) => self.push_rows(vec![row]),
            Appendable::Mapping(json) => {
                let rows = Grid::from_mapping(&json)?.into_rows();
                self.grid.extend_rows(rows);
            }
            Appendable::Table(other) => {
                if self.is_empty() {
                    self.grid = other.grid;
                } else {
                    let body: Vec<Vec<Value>> = other.body_rows().map(<[Value]>::to_vec).collect();
                    self.grid.extend_rows(body);
                }
            }
            Appendable::Column(values) => {
                self.grid.normalize();
                let rows = self.grid.rows();
                let mut values = values.into_iter();
                for r in 1..=rows {
                    self.grid.push_to_row(r, values.next().unwrap_or_default());
                }
            }
            Appendable::Scalar(value) => self.grid.push_to_row(1, value),
        }
        debug!(rows = self.grid.rows(), columns = self.grid.columns(), "appended");
        Ok(())
    }

    fn push_rows(&mut self, rows: Vec<Vec<Value>>) {
        if self.grid.is_blank() {
            self.grid.replace_rows(rows);
        } else {
            self.grid.extend_rows(rows);
        }
    }

    /// Copy of this table with `item` appended.
    pub fn concat(&self, item: impl Into<Appendable>) -> Result<Table> {
        let mut out = self.clone();
        out.append(item)?;
        Ok(out)
    }

    /// Copy of this table without any row that also appears in the body of
    /// `other`. Trailing empty cells are ignored when comparing rows.
    pub fn difference(&self, other: &Table) -> Table {
        self.difference_rows(&other.body_rows().map(<[Value]>::to_vec).collect::<Vec<_>>())
    }

    /// Copy of this table without any row equal to one of `rows`.
    pub fn difference_rows(&self, rows: &[Vec<Value>]) -> Table {
        let mut out = self.clone();
        out.grid.retain_rows_after(0, |row| {
            !rows.iter().any(|other| trimmed(other) == trimmed(row))
        });
        out
    }
}

fn trimmed(row: &[Value]) -> &[Value] {
    let end = row.iter().rposition(|v| !v.is_empty()).map_or(0, |i| i + 1);
    &row[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::fixtures::parts;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rows_replace_a_blank_table() {
        let mut table = Table::new("t");
        table.append(vec![vec![Value::from("a")], vec![Value::from("b")]]).unwrap();
        assert_eq!(table.rows(), 2);
        table.append(vec![Value::from("c")]).unwrap();
        assert_eq!(table.rows(), 3);
        assert_eq!(table.cell(3, 1), &Value::from("c"));
    }

    #[test]
    fn test_append_table_skips_its_headers() {
        let mut table = parts();
        table.append(parts()).unwrap();
        assert_eq!(table.rows(), 15);
        assert_eq!(table.cell(9, 1), &Value::from("Type1"));

        let mut headers_only = Table::from_rows(vec![vec!["Part"]], 1);
        headers_only.append(parts()).unwrap();
        assert_eq!(headers_only.rows(), 8);
        assert_eq!(headers_only.columns(), 5);
    }

    #[test]
    fn test_append_mapping() {
        let mut table = Table::from_rows(vec![vec!["Key", "Sub", "Value"]], 1);
        table
            .append(serde_json::json!({ "A": { "B": 1, "C": 2 } }))
            .unwrap();
        assert_eq!(
            table.to_rows()[1..].to_vec(),
            vec![
                vec![Value::from("A"), Value::from("B"), Value::from(1)],
                vec![Value::from("A"), Value::from("C"), Value::from(2)],
            ]
        );
        assert!(table.append(serde_json::json!(3)).is_err());
    }

    #[test]
    fn test_append_column_and_scalar() {
        let mut table = Table::from_rows(vec![vec!["a", "b"], vec!["c"]], 1);
        table
            .append(Appendable::Column(vec![Value::from("x"), Value::from("y")]))
            .unwrap();
        assert_eq!(table.cell(2, 3), &Value::from("y"));
        table.append(Value::from("z")).unwrap();
        assert_eq!(table.cell(1, 4), &Value::from("z"));
    }

    #[test]
    fn test_concat_and_difference() {
        let table = parts();
        let extra = vec![Value::from("Type9"), Value::from("ZZ1")];
        let bigger = table.concat(extra.clone()).unwrap();
        assert_eq!(bigger.rows(), 9);
        assert_eq!(table.rows(), 8);

        let back = bigger.difference_rows(&[extra]);
        assert_eq!(back, table);

        let header_only = bigger.difference(&bigger);
        assert_eq!(header_only.rows(), 1);
    }
}
