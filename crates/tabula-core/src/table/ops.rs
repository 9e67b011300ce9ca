//! Header-preserving bulk operations.
//!
//! Each `*_in_place` method mutates the table; the method without the
//! suffix clones, applies the same operation and returns the copy. Header
//! labels and arguments are resolved before any row is touched, so a call
//! that fails leaves the table unchanged.

use std::cmp::Ordering;
use std::collections::HashSet;

use tabula_engine::engine::{DeleteTarget, GridError, Range, Section, Value};
use tracing::{debug, warn};

use super::Table;
use super::filter::{Condition, parse_triples};
use crate::error::{Result, TabulaError};

impl Table {
    /// Keep data rows whose value under `header` satisfies `keep`.
    pub fn filter_in_place<F>(&mut self, header: &str, mut keep: F) -> Result<()>
    where
        F: FnMut(&Value) -> bool,
    {
        let col = self.header_index(header)? - 1;
        let before = self.grid.rows();
        self.grid.retain_rows_after(self.header_rows, |row| {
            keep(row.get(col).unwrap_or(&Value::Empty))
        });
        debug!(header, kept = self.grid.rows(), removed = before - self.grid.rows(), "filter");
        Ok(())
    }

    pub fn filter<F>(&self, header: &str, keep: F) -> Result<Table>
    where
        F: FnMut(&Value) -> bool,
    {
        let mut out = self.clone();
        out.filter_in_place(header, keep)?;
        Ok(out)
    }

    /// Keep data rows for which every condition holds.
    pub fn advanced_filter_in_place(&mut self, conditions: &[Condition]) -> Result<()> {
        let resolved = conditions
            .iter()
            .map(|cond| -> Result<(usize, &Condition)> {
                Ok((self.header_index(&cond.header)? - 1, cond))
            })
            .collect::<Result<Vec<_>>>()?;
        self.grid.retain_rows_after(self.header_rows, |row| {
            resolved
                .iter()
                .all(|(col, cond)| cond.test(row.get(*col).unwrap_or(&Value::Empty)))
        });
        debug!(conditions = conditions.len(), rows = self.grid.rows(), "advanced filter");
        Ok(())
    }

    pub fn advanced_filter(&self, conditions: &[Condition]) -> Result<Table> {
        let mut out = self.clone();
        out.advanced_filter_in_place(conditions)?;
        Ok(out)
    }

    /// [`Table::advanced_filter_in_place`] over a flat
    /// `header, operator, criterion, ...` list.
    pub fn advanced_filter_args_in_place(&mut self, args: &[&str]) -> Result<()> {
        let conditions = parse_triples(args)?;
        self.advanced_filter_in_place(&conditions)
    }

    pub fn advanced_filter_args(&self, args: &[&str]) -> Result<Table> {
        let mut out = self.clone();
        out.advanced_filter_args_in_place(args)?;
        Ok(out)
    }

    /// Stable sort of the data rows.
    pub fn sort_by_in_place<F>(&mut self, mut compare: F)
    where
        F: FnMut(&[Value], &[Value]) -> Ordering,
    {
        self.grid.with_body(self.header_rows, |mut body| {
            body.sort_by(|a, b| compare(a, b));
            body
        });
    }

    pub fn sort_by<F>(&self, compare: F) -> Table
    where
        F: FnMut(&[Value], &[Value]) -> Ordering,
    {
        let mut out = self.clone();
        out.sort_by_in_place(compare);
        out
    }

    /// Stable sort of the data rows by a derived key.
    pub fn sort_by_key_in_place<K, F>(&mut self, mut key: F)
    where
        K: Ord,
        F: FnMut(&[Value]) -> K,
    {
        self.grid.with_body(self.header_rows, |mut body| {
            body.sort_by_key(|row| key(row));
            body
        });
    }

    pub fn sort_by_key<K, F>(&self, key: F) -> Table
    where
        K: Ord,
        F: FnMut(&[Value]) -> K,
    {
        let mut out = self.clone();
        out.sort_by_key_in_place(key);
        out
    }

    /// Sort data rows by the columns under `headers`, earlier headers first.
    /// Values order as [`Value::sort_cmp`] does.
    pub fn sort_by_headers_in_place(&mut self, headers: &[&str]) -> Result<()> {
        let cols = headers
            .iter()
            .map(|h| -> Result<usize> { Ok(self.header_index(h)? - 1) })
            .collect::<Result<Vec<_>>>()?;
        self.sort_by_in_place(|a, b| {
            cols.iter()
                .map(|&c| {
                    let left = a.get(c).unwrap_or(&Value::Empty);
                    left.sort_cmp(b.get(c).unwrap_or(&Value::Empty))
                })
                .find(|ord| ord.is_ne())
                .unwrap_or(Ordering::Equal)
        });
        Ok(())
    }

    pub fn sort_by_headers(&self, headers: &[&str]) -> Result<Table> {
        let mut out = self.clone();
        out.sort_by_headers_in_place(headers)?;
        Ok(out)
    }

    /// Drop data rows repeating a value already seen under `header`.
    pub fn unique_in_place(&mut self, header: &str) -> Result<()> {
        let col = self.header_index(header)? - 1;
        let mut seen = HashSet::new();
        self.grid.retain_rows_after(self.header_rows, |row| {
            seen.insert(row.get(col).cloned().unwrap_or_default())
        });
        debug!(header, rows = self.grid.rows(), "unique");
        Ok(())
    }

    pub fn unique(&self, header: &str) -> Result<Table> {
        let mut out = self.clone();
        out.unique_in_place(header)?;
        Ok(out)
    }

    /// Keep only the columns whose header (in any header row) is one of
    /// `labels`, ordered by the first matching label. Unknown labels are
    /// skipped.
    pub fn select_columns_in_place(&mut self, labels: &[&str]) -> Result<()> {
        if self.header_rows == 0 {
            return Err(GridError::NoHeaders.into());
        }

        let mut picked: Vec<(usize, usize)> = Vec::new();
        for col in 1..=self.grid.columns() {
            let rank = self
                .header_band()
                .filter_map(|row| row.get(col - 1))
                .filter_map(|v| labels.iter().position(|l| v.to_string() == *l))
                .next();
            if let Some(rank) = rank {
                picked.push((rank, col));
            }
        }
        picked.sort_by_key(|(rank, _)| *rank);

        for label in labels {
            if !picked.iter().any(|(rank, _)| labels[*rank] == *label) {
                warn!(label, "select_columns: no column with this header");
            }
        }

        let order: Vec<usize> = picked.into_iter().map(|(_, col)| col).collect();
        self.grid.select_columns(&order);
        debug!(columns = self.grid.columns(), "selected columns");
        Ok(())
    }

    pub fn select_columns(&self, labels: &[&str]) -> Result<Table> {
        let mut out = self.clone();
        out.select_columns_in_place(labels)?;
        Ok(out)
    }

    /// Reverse the data rows; header rows stay on top in their order.
    pub fn reverse_rows_in_place(&mut self) {
        self.grid.with_body(self.header_rows, |mut body| {
            body.reverse();
            body
        });
    }

    pub fn reverse_rows(&self) -> Table {
        let mut out = self.clone();
        out.reverse_rows_in_place();
        out
    }

    /// Reverse column order, header cells included.
    pub fn reverse_columns_in_place(&mut self) {
        self.grid.reverse_columns();
    }

    pub fn reverse_columns(&self) -> Table {
        let mut out = self.clone();
        out.reverse_columns_in_place();
        out
    }

    /// Split data rows by `pred` on the value under `header`. Both halves
    /// carry a copy of the header rows and keep relative row order.
    pub fn partition<F>(&self, header: &str, mut pred: F) -> Result<(Table, Table)>
    where
        F: FnMut(&Value) -> bool,
    {
        let col = self.header_index(header)? - 1;
        let (hit, miss): (Vec<Vec<Value>>, Vec<Vec<Value>>) = self
            .body_rows()
            .map(<[Value]>::to_vec)
            .partition(|row| pred(row.get(col).unwrap_or(&Value::Empty)));

        let build = |rows: Vec<Vec<Value>>| {
            let mut all = self.headers();
            all.extend(rows);
            Table::from_rows(all, self.header_rows).with_name(self.name.clone())
        };
        Ok((build(hit), build(miss)))
    }

    /// Remove blank columns, then blank rows.
    pub fn compact_in_place(&mut self) {
        self.grid.compact();
    }

    pub fn compact(&self) -> Table {
        let mut out = self.clone();
        out.compact_in_place();
        out
    }

    /// Delete every row, header rows included, for which `pred` is true.
    pub fn delete_rows_if<F>(&mut self, mut pred: F)
    where
        F: FnMut(&[Value]) -> bool,
    {
        self.grid.retain_rows_after(0, |row| !pred(row));
    }

    /// Delete every column for which `pred` is true. The predicate sees the
    /// whole column, header cells included.
    pub fn delete_columns_if<F>(&mut self, mut pred: F)
    where
        F: FnMut(&[Value]) -> bool,
    {
        let keep: Vec<usize> = (1..=self.grid.columns())
            .filter(|&c| !pred(&Section::column(c).values(&self.grid)))
            .collect();
        if keep.len() != self.grid.columns() {
            self.grid.select_columns(&keep);
        }
    }

    pub fn insert_rows(&mut self, before: usize, count: usize) -> Result<()> {
        Ok(self.grid.insert_rows(before, count)?)
    }

    pub fn insert_columns(&mut self, before: usize, count: usize) -> Result<()> {
        Ok(self.grid.insert_columns(before, count)?)
    }

    pub fn delete(&mut self, target: DeleteTarget) -> Result<()> {
        Ok(self.grid.delete(target)?)
    }

    /// Delete by range text; see [`tabula_engine::engine::Grid::delete_ref`].
    pub fn delete_ref(&mut self, reference: &str) -> Result<()> {
        Ok(self.grid.delete_ref(reference)?)
    }

    /// Range covering `A1` to the last used cell.
    pub fn used_range(&self) -> Result<Range> {
        let bounds = self.grid.used_bounds().ok_or(TabulaError::EmptyTable)?;
        Ok(Range::between(bounds.top_left(), bounds.bottom_right()))
    }

    /// Convert every cell to text, escaping a leading `=` as `'=` so that
    /// spreadsheet applications do not read it as a formula.
    pub fn to_safe_format_in_place(&mut self) {
        self.grid.normalize();
        let rows = self
            .grid
            .iter_rows()
            .map(|row| {
                row.iter()
                    .map(|v| match v {
                        Value::Text(s) if s.starts_with('=') => Value::Text(format!("'{}", s)),
                        other => Value::Text(other.to_string()),
                    })
                    .collect()
            })
            .collect();
        self.grid.replace_rows(rows);
    }

    pub fn to_safe_format(&self) -> Table {
        let mut out = self.clone();
        out.to_safe_format_in_place();
        out
    }
}
