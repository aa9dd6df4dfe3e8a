//! Row addressing on top of the pager.

use log::trace;

use crate::error::{Error, Result};
use crate::pager::Pager;
use crate::row::Row;
use crate::{ROWS_PER_PAGE, TABLE_MAX_ROWS};

/// Where a row lives: which page, and which slot inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLocation {
    pub page_num: usize,
    pub slot: usize,
}

impl RowLocation {
    #[inline]
    pub fn of(row_num: usize) -> Self {
        Self {
            page_num: row_num / ROWS_PER_PAGE,
            slot: row_num % ROWS_PER_PAGE,
        }
    }
}

/// The single table of the store.
///
/// `num_rows` is the only record of how many rows are valid. Pages past
/// it may be cached but hold nothing meaningful.
pub struct Table {
    pub(crate) pager: Pager,
    num_rows: usize,
}

impl Table {
    pub(crate) fn new(pager: Pager, num_rows: usize) -> Self {
        debug_assert!(num_rows <= TABLE_MAX_ROWS);
        Self { pager, num_rows }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    /// The block for `row_num`, loading its page if needed.
    ///
    /// Serves both reads and writes.
    pub fn row_slot(&mut self, row_num: usize) -> Result<&mut [u8]> {
        let RowLocation { page_num, slot } = RowLocation::of(row_num);
        let page = self.pager.get_page(page_num)?;
        Ok(page.row_slot_mut(slot))
    }

    /// Cursor at the first row.
    pub fn start(&mut self) -> Cursor<'_> {
        let end_of_table = self.num_rows == 0;
        Cursor {
            table: self,
            row_num: 0,
            end_of_table,
        }
    }

    /// Cursor one past the last row.
    pub fn end(&mut self) -> Cursor<'_> {
        let row_num = self.num_rows;
        Cursor {
            table: self,
            row_num,
            end_of_table: true,
        }
    }

    /// Store `row` after the last row.
    ///
    /// Fails with [`Error::TableFull`] once `TABLE_MAX_ROWS` rows exist,
    /// leaving the table untouched.
    pub fn append(&mut self, row: &Row) -> Result<()> {
        if self.num_rows >= TABLE_MAX_ROWS {
            return Err(Error::TableFull);
        }

        let mut cursor = self.end();
        row.serialize(cursor.value()?);
        self.num_rows += 1;

        trace!("appended row {} (id {})", self.num_rows - 1, row.id());
        Ok(())
    }

    /// All rows in insertion order.
    pub fn scan(&mut self) -> Cursor<'_> {
        self.start()
    }
}

/// A position in the table, borrowing it for as long as it lives.
///
/// Iterating a cursor decodes each row from its position to the end.
pub struct Cursor<'a> {
    table: &'a mut Table,
    row_num: usize,
    end_of_table: bool,
}

impl Cursor<'_> {
    pub fn row_num(&self) -> usize {
        self.row_num
    }

    pub fn is_end(&self) -> bool {
        self.end_of_table
    }

    /// The block under the cursor.
    pub fn value(&mut self) -> Result<&mut [u8]> {
        self.table.row_slot(self.row_num)
    }

    pub fn advance(&mut self) {
        self.row_num += 1;
        if self.row_num >= self.table.num_rows {
            self.end_of_table = true;
        }
    }
}

impl Iterator for Cursor<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.end_of_table {
            return None;
        }
        match self.value().map(|block| Row::deserialize(block)) {
            Ok(row) => {
                self.advance();
                Some(Ok(row))
            }
            Err(e) => {
                self.end_of_table = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = if self.end_of_table {
            0
        } else {
            self.table.num_rows - self.row_num
        };
        (0, Some(left))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PAGE_SIZE, ROW_SIZE, TABLE_MAX_PAGES};
    use tempfile::{TempDir, tempdir};

    fn empty_table() -> (Table, TempDir) {
        let dir = tempdir().unwrap();
        let pager = Pager::open(dir.path().join("test.db")).unwrap();
        (Table::new(pager, 0), dir)
    }

    fn row(i: u32) -> Row {
        Row::new(i, &format!("user{i}"), &format!("person{i}@example.com")).unwrap()
    }

    #[test]
    fn resolves_rows_to_pages() {
        assert_eq!(RowLocation::of(0), RowLocation { page_num: 0, slot: 0 });
        assert_eq!(
            RowLocation::of(ROWS_PER_PAGE - 1),
            RowLocation {
                page_num: 0,
                slot: ROWS_PER_PAGE - 1
            }
        );
        assert_eq!(
            RowLocation::of(ROWS_PER_PAGE),
            RowLocation { page_num: 1, slot: 0 }
        );
        assert_eq!(
            RowLocation::of(TABLE_MAX_ROWS - 1),
            RowLocation {
                page_num: TABLE_MAX_PAGES - 1,
                slot: ROWS_PER_PAGE - 1
            }
        );
        // rows do not straddle pages
        assert!(ROWS_PER_PAGE * ROW_SIZE <= PAGE_SIZE);
    }

    #[test]
    fn append_then_scan_in_order() {
        let (mut table, _dir) = empty_table();
        for i in 1..=30 {
            table.append(&row(i)).unwrap();
        }
        assert_eq!(table.num_rows(), 30);

        let rows: Vec<Row> = table.scan().collect::<Result<_>>().unwrap();
        let ids: Vec<u32> = rows.iter().map(Row::id).collect();
        assert_eq!(ids, (1..=30).collect::<Vec<_>>());
        assert_eq!(rows[29].username(), "user30");
        assert_eq!(table.pager().cached_pages(), 3);
    }

    #[test]
    fn scan_is_repeatable() {
        let (mut table, _dir) = empty_table();
        for i in 0..20 {
            table.append(&row(i)).unwrap();
        }
        let first: Vec<Row> = table.scan().collect::<Result<_>>().unwrap();
        let second: Vec<Row> = table.scan().collect::<Result<_>>().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_table_scans_nothing() {
        let (mut table, _dir) = empty_table();
        assert!(table.start().is_end());
        assert_eq!(table.scan().count(), 0);
        // scanning an empty table loads no pages
        assert_eq!(table.pager().cached_pages(), 0);
    }

    #[test]
    fn cursor_walks_to_the_end() {
        let (mut table, _dir) = empty_table();
        table.append(&row(1)).unwrap();
        table.append(&row(2)).unwrap();

        let mut cursor = table.start();
        assert!(!cursor.is_end());
        assert_eq!(Row::deserialize(cursor.value().unwrap()).id(), 1);
        cursor.advance();
        assert_eq!(cursor.row_num(), 1);
        assert!(!cursor.is_end());
        cursor.advance();
        assert!(cursor.is_end());

        let end = table.end();
        assert_eq!(end.row_num(), 2);
        assert!(end.is_end());
    }

    #[test]
    fn writing_one_slot_leaves_neighbours_alone() {
        let (mut table, _dir) = empty_table();
        for i in 0..3 {
            table.append(&row(i)).unwrap();
        }
        let before_0 = table.row_slot(0).unwrap().to_vec();
        let before_2 = table.row_slot(2).unwrap().to_vec();

        row(99).serialize(table.row_slot(1).unwrap());

        assert_eq!(table.row_slot(0).unwrap(), &before_0[..]);
        assert_eq!(table.row_slot(2).unwrap(), &before_2[..]);
        assert_eq!(Row::deserialize(table.row_slot(1).unwrap()).id(), 99);
    }

    #[test]
    fn append_stops_at_capacity() {
        let (mut table, _dir) = empty_table();
        for i in 0..TABLE_MAX_ROWS {
            table.append(&row(i as u32)).unwrap();
        }
        assert_eq!(table.num_rows(), TABLE_MAX_ROWS);

        let err = table.append(&row(0)).unwrap_err();
        assert!(matches!(err, Error::TableFull));
        assert!(!err.is_fatal());
        assert_eq!(table.num_rows(), TABLE_MAX_ROWS);

        let last = table.scan().last().unwrap().unwrap();
        assert_eq!(last.id(), (TABLE_MAX_ROWS - 1) as u32);
    }
}
