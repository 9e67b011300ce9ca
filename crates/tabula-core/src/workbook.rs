//! An ordered collection of named tables.

use tracing::debug;

use crate::error::{Result, TabulaError};
use crate::table::Table;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Workbook {
    tables: Vec<Table>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `table` under its current name and return it.
    pub fn add(&mut self, table: Table) -> &mut Table {
        debug!(name = table.name(), "adding table");
        let idx = self.tables.len();
        self.tables.push(table);
        &mut self.tables[idx]
    }

    /// Append an empty table named `SheetN`, with N one past the count.
    pub fn add_new(&mut self) -> &mut Table {
        let mut n = self.tables.len() + 1;
        while self.get(&format!("Sheet{}", n)).is_some() {
            n += 1;
        }
        self.add(Table::new(format!("Sheet{}", n)))
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.iter_mut().find(|t| t.name() == name)
    }

    /// Table by 1-based position.
    pub fn get_index(&self, index: usize) -> Option<&Table> {
        index.checked_sub(1).and_then(|i| self.tables.get(i))
    }

    pub fn remove(&mut self, name: &str) -> Result<Table> {
        let idx = self.position(name)?;
        Ok(self.tables.remove(idx))
    }

    pub fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        let idx = self.position(from)?;
        self.tables[idx].set_name(to);
        Ok(())
    }

    pub fn names(&self) -> Vec<&str> {
        self.tables.iter().map(Table::name).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Table> {
        self.tables.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Table> {
        self.tables.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn clear(&mut self) {
        self.tables.clear();
    }

    fn position(&self, name: &str) -> Result<usize> {
        self.tables
            .iter()
            .position(|t| t.name() == name)
            .ok_or_else(|| TabulaError::TableNotFound(name.to_string()))
    }
}

impl<'a> IntoIterator for &'a Workbook {
    type Item = &'a Table;
    type IntoIter = std::slice::Iter<'a, Table>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.iter()
    }
}

impl IntoIterator for Workbook {
    type Item = Table;
    type IntoIter = std::vec::IntoIter<Table>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.into_iter()
    }
}
