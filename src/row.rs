//! Fixed-width row encoding.
//!
//! A row occupies exactly [`ROW_SIZE`] bytes:
//!
//! ```text
//! ┌────────┬──────────────────┬─────────────────────┐
//! │ id     │ username         │ email               │
//! │ u32 LE │ 32 bytes, padded │ 255 bytes, padded   │
//! └────────┴──────────────────┴─────────────────────┘
//! ```
//!
//! Text fields are zero padded. There is no length prefix and no header.

use std::borrow::Cow;
use std::fmt;

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};
use crate::{
    EMAIL_OFFSET, EMAIL_SIZE, ID_OFFSET, ID_SIZE, ROW_SIZE, USERNAME_OFFSET, USERNAME_SIZE,
};

/// One logical record.
#[derive(Clone, PartialEq, Eq)]
pub struct Row {
    id: u32,
    username: [u8; USERNAME_SIZE],
    email: [u8; EMAIL_SIZE],
}

impl Row {
    /// Build a row, rejecting text fields wider than their column.
    pub fn new(id: u32, username: &str, email: &str) -> Result<Self> {
        let mut row = Self {
            id,
            username: [0; USERNAME_SIZE],
            email: [0; EMAIL_SIZE],
        };
        copy_field("username", &mut row.username, username)?;
        copy_field("email", &mut row.email, email)?;
        Ok(row)
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn username(&self) -> Cow<'_, str> {
        field_str(&self.username)
    }

    pub fn email(&self) -> Cow<'_, str> {
        field_str(&self.email)
    }

    /// Write this row into a `ROW_SIZE` block.
    ///
    /// Every byte of the block is overwritten, padding included.
    pub fn serialize(&self, block: &mut [u8]) {
        debug_assert_eq!(block.len(), ROW_SIZE);
        LittleEndian::write_u32(&mut block[ID_OFFSET..ID_OFFSET + ID_SIZE], self.id);
        block[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE].copy_from_slice(&self.username);
        block[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE].copy_from_slice(&self.email);
    }

    /// Read a row back out of a `ROW_SIZE` block.
    ///
    /// This is a structural copy; a zeroed block decodes to id 0 with
    /// empty text fields.
    pub fn deserialize(block: &[u8]) -> Self {
        debug_assert_eq!(block.len(), ROW_SIZE);
        let mut row = Self {
            id: LittleEndian::read_u32(&block[ID_OFFSET..ID_OFFSET + ID_SIZE]),
            username: [0; USERNAME_SIZE],
            email: [0; EMAIL_SIZE],
        };
        row.username
            .copy_from_slice(&block[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE]);
        row.email
            .copy_from_slice(&block[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE]);
        row
    }
}

fn copy_field(field: &'static str, dst: &mut [u8], value: &str) -> Result<()> {
    let bytes = value.as_bytes();
    if bytes.len() > dst.len() {
        return Err(Error::FieldTooLong {
            field,
            len: bytes.len(),
            max: dst.len(),
        });
    }
    dst[..bytes.len()].copy_from_slice(bytes);
    Ok(())
}

// A field filled to capacity has no terminator.
fn field_str(field: &[u8]) -> Cow<'_, str> {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end])
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.id, self.username(), self.email())
    }
}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Row")
            .field("id", &self.id)
            .field("username", &self.username())
            .field("email", &self.email())
            .finish()
    }
}
