//! Conditional aggregates and lookups over header-named columns.

use indexmap::IndexMap;
use tabula_engine::engine::Value;
use tracing::debug;

use super::Table;
use crate::error::Result;
use crate::workbook::Workbook;

impl Table {
    /// Data rows paired with the value under `header`.
    fn keyed_rows<'t>(
        &'t self,
        header: &str,
    ) -> Result<impl Iterator<Item = (usize, &'t Value, &'t [Value])> + 't> {
        let col = self.header_index(header)? - 1;
        let first = self.header_rows + 1;
        Ok(self
            .body_rows()
            .enumerate()
            .map(move |(i, row)| (first + i, row.get(col).unwrap_or(&Value::Empty), row)))
    }

    /// Sum the `sum_header` column over data rows whose `find_header` value
    /// satisfies `pred`. Non-numeric cells count as zero.
    pub fn sum_if<F>(&self, find_header: &str, sum_header: &str, mut pred: F) -> Result<f64>
    where
        F: FnMut(&Value) -> bool,
    {
        let sum_col = self.header_index(sum_header)? - 1;
        Ok(self
            .keyed_rows(find_header)?
            .filter(|(_, key, _)| pred(key))
            .filter_map(|(_, _, row)| row.get(sum_col).and_then(Value::as_number))
            .sum())
    }

    /// Mean of the `avg_header` column over matching data rows; `None` when
    /// no row matches.
    pub fn average_if<F>(
        &self,
        find_header: &str,
        avg_header: &str,
        mut pred: F,
    ) -> Result<Option<f64>>
    where
        F: FnMut(&Value) -> bool,
    {
        let avg_col = self.header_index(avg_header)? - 1;
        let (sum, count) = self
            .keyed_rows(find_header)?
            .filter(|(_, key, _)| pred(key))
            .fold((0.0, 0usize), |(sum, count), (_, _, row)| {
                let n = row.get(avg_col).and_then(Value::as_number).unwrap_or(0.0);
                (sum + n, count + 1)
            });
        Ok((count > 0).then(|| sum / count as f64))
    }

    /// Value under `return_header` in the first data row whose
    /// `find_header` value satisfies `pred`.
    pub fn vlookup<F>(
        &self,
        find_header: &str,
        return_header: &str,
        pred: F,
    ) -> Result<Option<&Value>>
    where
        F: FnMut(&Value) -> bool,
    {
        let return_col = self.header_index(return_header)?;
        Ok(self
            .match_row(find_header, pred)?
            .map(|row| self.cell(row, return_col)))
    }

    /// 1-based grid row of the first data row whose value under `header`
    /// satisfies `pred`.
    pub fn match_row<F>(&self, header: &str, mut pred: F) -> Result<Option<usize>>
    where
        F: FnMut(&Value) -> bool,
    {
        Ok(self
            .keyed_rows(header)?
            .find(|(_, key, _)| pred(key))
            .map(|(row, _, _)| row))
    }

    /// Occurrences of each distinct value under `header`, in order of first
    /// appearance.
    pub fn summarise(&self, header: &str) -> Result<IndexMap<Value, usize>> {
        let col = self.column_by_header(header)?;
        Ok(col
            .summarise(&self.grid, self.header_rows)
            .into_iter()
            .collect())
    }

    /// Replace the table with the summary of `header`: a `[header, Count]`
    /// header row, then one row per distinct value.
    pub fn summarise_in_place(&mut self, header: &str) -> Result<()> {
        let summary = self.summarise(header)?;
        let mut rows = vec![vec![Value::from(header), Value::from("Count")]];
        rows.extend(
            summary
                .into_iter()
                .map(|(value, count)| vec![value, Value::from(count)]),
        );
        self.load(rows, 1);
        Ok(())
    }

    /// Break the table into one table per distinct value under `header`.
    /// Each part is named after its value and starts with a copy of the
    /// header rows.
    pub fn split(&self, header: &str) -> Result<Workbook> {
        let mut parts: IndexMap<Value, Table> = IndexMap::new();
        for (_, key, row) in self.keyed_rows(header)? {
            parts
                .entry(key.clone())
                .or_insert_with(|| {
                    Table::from_rows(self.headers(), self.header_rows).with_name(key.to_string())
                })
                .grid
                .extend_rows([row.to_vec()]);
        }

        let mut book = Workbook::new();
        for part in parts.into_values() {
            book.add(part);
        }
        debug!(header, tables = book.len(), "split");
        Ok(book)
    }

    /// Whether the column under `header` holds nothing below the header band.
    pub fn column_is_empty(&self, header: &str) -> Result<bool> {
        let col = self.column_by_header(header)?;
        Ok(col.is_empty(&self.grid, self.header_rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Appendable;
    use crate::table::fixtures::parts;
    use regex::Regex;

    fn is(text: &'static str) -> impl Fn(&Value) -> bool {
        move |v| v == &Value::from(text)
    }

    #[test]
    fn test_sum_if() {
        let total = parts().sum_if("Part", "Cost", is("Type1")).unwrap();
        assert!((total - 169.15).abs() < 1e-9, "got {total}");
    }

    #[test]
    fn test_average_if() {
        let re = Regex::new("Type[13]").unwrap();
        let avg = parts()
            .average_if("Part", "Cost", |v| re.is_match(&v.to_string()))
            .unwrap()
            .unwrap();
        assert_eq!(avg.trunc(), 42.0);

        let between = parts()
            .average_if("Qty", "Cost", |v| v.as_number().is_some_and(|n| (2.0..=3.0).contains(&n)))
            .unwrap()
            .unwrap();
        assert_eq!(between.trunc(), 35.0);

        assert_eq!(parts().average_if("Part", "Cost", is("Type9")).unwrap(), None);
    }

    #[test]
    fn test_vlookup_and_match_row() {
        let table = parts();
        assert_eq!(
            table.vlookup("Part", "Ref2", is("Type1")).unwrap(),
            Some(&Value::from("231"))
        );
        assert_eq!(table.match_row("Part", is("Type2")).unwrap(), Some(3));
        assert_eq!(table.match_row("Part", is("Part")).unwrap(), None);
        assert!(table.vlookup("Part", "Nope", is("Type1")).is_err());
    }

    #[test]
    fn test_summarise() {
        let summary = parts().summarise("Part").unwrap();
        let counts: Vec<(String, usize)> = summary
            .iter()
            .map(|(value, count)| (value.to_string(), *count))
            .collect();
        assert_eq!(
            counts,
            vec![
                ("Type1".to_string(), 3),
                ("Type2".to_string(), 2),
                ("Type3".to_string(), 1),
                ("Type4".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_summarise_in_place() {
        let mut table = parts();
        table.summarise_in_place("Part").unwrap();
        assert_eq!(table.rows(), 5);
        assert_eq!(table.cell(1, 2), &Value::from("Count"));
        assert_eq!(table.cell(2, 2), &Value::from(3));
    }

    #[test]
    fn test_split() {
        let book = parts().split("Part").unwrap();
        assert_eq!(book.names(), vec!["Type1", "Type2", "Type3", "Type4"]);
        let type1 = book.get("Type1").unwrap();
        assert_eq!(type1.rows(), 4);
        assert_eq!(type1.cell(1, 1), &Value::from("Part"));
        assert_eq!(book.get("Type4").map(Table::rows), Some(2));
    }

    #[test]
    fn test_split_keeps_values_with_equal_text_apart() {
        let mut table = Table::from_rows(vec![vec!["Key", "Row"]], 1);
        table
            .append(vec![
                vec![Value::from(1), Value::from("a")],
                vec![Value::from("1"), Value::from("b")],
                vec![Value::from(1), Value::from("c")],
            ])
            .unwrap();

        let book = table.split("Key").unwrap();
        assert_eq!(book.names(), vec!["1", "1"]);
        let sizes: Vec<usize> = book.iter().map(Table::rows).collect();
        assert_eq!(sizes, vec![3, 2]);
        assert_eq!(book.get_index(2).unwrap().cell(2, 2), &Value::from("b"));
    }

    #[test]
    fn test_column_is_empty() {
        let mut table = parts();
        assert!(!table.column_is_empty("Ref1").unwrap());
        table.append(Appendable::Column(vec![Value::from("Notes")])).unwrap();
        assert!(table.column_is_empty("Notes").unwrap());
    }
}
