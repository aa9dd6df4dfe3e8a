//! Opening and closing the store.

use std::path::Path;

use log::{info, warn};

use crate::error::Result;
use crate::pager::Pager;
use crate::table::Table;
use crate::{PAGE_SIZE, ROW_SIZE, ROWS_PER_PAGE, TABLE_MAX_ROWS};

/// Open the table stored at `path`, creating an empty file if needed.
///
/// The row count is derived from the file length. Trailing bytes that do
/// not make up a whole row are not counted.
pub fn open<P: AsRef<Path>>(path: P) -> Result<Table> {
    let pager = Pager::open(path)?;

    let mut num_rows = rows_in_file(pager.file_length());
    if num_rows > TABLE_MAX_ROWS {
        warn!(
            "file holds {} rows, only the first {} are addressable",
            num_rows, TABLE_MAX_ROWS
        );
        num_rows = TABLE_MAX_ROWS;
    }

    info!("table has {} rows", num_rows);
    Ok(Table::new(pager, num_rows))
}

/// Count the rows in a file of `len` bytes.
///
/// Same as `len / ROW_SIZE` until a file spans enough full pages for
/// their unused tails to add up to a row; those tails are skipped.
fn rows_in_file(len: u64) -> usize {
    let full_pages = (len / PAGE_SIZE as u64) as usize;
    let tail = (len % PAGE_SIZE as u64) as usize;
    full_pages * ROWS_PER_PAGE + (tail / ROW_SIZE).min(ROWS_PER_PAGE)
}

/// Flush the table to disk and release it.
///
/// Full pages are written whole. The trailing partial page is written only
/// up to its last row. Pages that were never loaded are left as they are
/// on disk.
pub fn close(table: Table) -> Result<()> {
    let num_rows = table.num_rows();
    let mut pager = table.pager;

    let num_full_pages = num_rows / ROWS_PER_PAGE;
    for page_num in 0..num_full_pages {
        if pager.is_cached(page_num) {
            pager.flush(page_num, PAGE_SIZE)?;
        }
    }

    let num_additional_rows = num_rows % ROWS_PER_PAGE;
    if num_additional_rows > 0 && pager.is_cached(num_full_pages) {
        pager.flush(num_full_pages, num_additional_rows * ROW_SIZE)?;
    }

    pager.close()?;
    info!("closed table with {} rows", num_rows);
    Ok(())
}
