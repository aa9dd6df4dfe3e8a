//! Page cache over the backing file.
//!
//! The [`Pager`] keeps every page it has loaded until it is closed. The
//! page directory has a fixed number of entries ([`TABLE_MAX_PAGES`]), so
//! the cache never has to evict.
//!
//! Page N lives at file offset `N * PAGE_SIZE`:
//!
//! ```text
//! ┌─────────┬─────────┬─────────┬───────────────┐
//! │ Page 0  │ Page 1  │  ...    │ Page N (tail) │
//! │ (4KB)   │ (4KB)   │         │ (<= 4KB)      │
//! └─────────┴─────────┴─────────┴───────────────┘
//! ```

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::{debug, info};

use crate::error::{Error, Result};
use crate::{PAGE_SIZE, ROW_SIZE, ROWS_PER_PAGE, TABLE_MAX_PAGES};

/// A 4KB page buffer.
pub struct Page {
    data: Box<[u8; PAGE_SIZE]>,
}

impl Page {
    /// Create a zeroed page.
    pub(crate) fn new() -> Self {
        Self {
            data: Box::new([0u8; PAGE_SIZE]),
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data[..]
    }

    /// The `ROW_SIZE` block holding row `slot` of this page.
    pub fn row_slot(&self, slot: usize) -> &[u8] {
        debug_assert!(slot < ROWS_PER_PAGE);
        let start = slot * ROW_SIZE;
        &self.data[start..start + ROW_SIZE]
    }

    pub fn row_slot_mut(&mut self, slot: usize) -> &mut [u8] {
        debug_assert!(slot < ROWS_PER_PAGE);
        let start = slot * ROW_SIZE;
        &mut self.data[start..start + ROW_SIZE]
    }
}

/// Owns the backing file and every page loaded from it.
///
/// Loaded pages are kept in an arena in load order. The directory maps a
/// page number to its arena index; an empty entry means the page has not
/// been materialized yet.
pub struct Pager {
    file: File,
    /// Length of the file in bytes, as last observed or written.
    file_length: u64,
    directory: [Option<usize>; TABLE_MAX_PAGES],
    arena: Vec<Page>,
}

impl Pager {
    /// Open the backing file, creating it if it does not exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.as_ref())?;
        let file_length = file.metadata()?.len();

        info!(
            "opened {} ({} bytes)",
            path.as_ref().display(),
            file_length
        );

        Ok(Self {
            file,
            file_length,
            directory: [None; TABLE_MAX_PAGES],
            arena: Vec::new(),
        })
    }

    pub fn file_length(&self) -> u64 {
        self.file_length
    }

    /// Number of pages the file holds, counting a trailing partial page.
    pub fn num_file_pages(&self) -> u64 {
        self.file_length.div_ceil(PAGE_SIZE as u64)
    }

    pub fn is_cached(&self, page_num: usize) -> bool {
        self.directory
            .get(page_num)
            .is_some_and(|frame| frame.is_some())
    }

    /// Number of pages currently held in memory.
    pub fn cached_pages(&self) -> usize {
        self.arena.len()
    }

    /// Return page `page_num`, reading it from disk on first access.
    ///
    /// Pages past the end of the file start out zeroed. A cached page is
    /// returned as is; the file is never re-read.
    pub fn get_page(&mut self, page_num: usize) -> Result<&mut Page> {
        check_bounds(page_num)?;

        let frame = match self.directory[page_num] {
            Some(frame) => frame,
            None => {
                let page = self.load(page_num)?;
                self.arena.push(page);
                let frame = self.arena.len() - 1;
                self.directory[page_num] = Some(frame);
                frame
            }
        };
        Ok(&mut self.arena[frame])
    }

    fn load(&mut self, page_num: usize) -> Result<Page> {
        let mut page = Page::new();
        if (page_num as u64) < self.num_file_pages() {
            self.file.seek(SeekFrom::Start(page_offset(page_num)))?;
            let read = read_up_to(&mut self.file, page.as_mut_slice())?;
            debug!("loaded page {} ({} bytes from disk)", page_num, read);
        } else {
            debug!("materialized empty page {}", page_num);
        }
        Ok(page)
    }

    /// Write the first `len` bytes of page `page_num` to the file.
    ///
    /// The page must already be cached.
    pub fn flush(&mut self, page_num: usize, len: usize) -> Result<()> {
        check_bounds(page_num)?;
        if len > PAGE_SIZE {
            return Err(Error::FlushTooLarge {
                len,
                max: PAGE_SIZE,
            });
        }
        let frame = self.directory[page_num].ok_or(Error::FlushUncachedPage(page_num))?;

        let offset = page_offset(page_num);
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(&self.arena[frame].as_slice()[..len])?;
        self.file_length = self.file_length.max(offset + len as u64);

        debug!("flushed page {} ({} bytes)", page_num, len);
        Ok(())
    }

    /// Sync and release the backing file.
    ///
    /// Cached pages are dropped without being written; flush them first.
    pub fn close(self) -> Result<()> {
        self.file.sync_all()?;
        info!(
            "closed pager ({} bytes, {} pages were cached)",
            self.file_length,
            self.arena.len()
        );
        Ok(())
    }
}

fn check_bounds(page_num: usize) -> Result<()> {
    if page_num >= TABLE_MAX_PAGES {
        return Err(Error::PageOutOfBounds {
            page_num,
            max: TABLE_MAX_PAGES,
        });
    }
    Ok(())
}

#[inline]
fn page_offset(page_num: usize) -> u64 {
    page_num as u64 * PAGE_SIZE as u64
}

// Short reads are fine: whatever is not on disk stays zeroed.
fn read_up_to(file: &mut File, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
