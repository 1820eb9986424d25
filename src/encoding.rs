//! Fixed-width binary encoding shared by locators, assets and split commitments.
//!
//! Every integer is big-endian. Variable-length parts are length prefixed so an
//! encoded value can be embedded in larger structures and decoded without any
//! shared state.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unexpected end of input: needed {needed} bytes, {remaining} left")]
    UnexpectedEof { needed: usize, remaining: usize },
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
    #[error("invalid presence flag {0:#04x}")]
    InvalidFlag(u8),
    #[error("invalid serialized key prefix {0:#04x}")]
    InvalidKey(u8),
    #[error("root asset of a split commitment carries a split commitment itself")]
    NestedSplitCommitment,
    #[error("invalid proof encoding: {0}")]
    InvalidProof(&'static str),
    #[error("length {0} does not fit the length prefix")]
    LengthOverflow(usize),
}

/// Cursor over an encoded byte slice.
pub(crate) struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if self.data.len() < len {
            return Err(DecodeError::UnexpectedEof {
                needed: len,
                remaining: self.data.len(),
            });
        }
        let (head, tail) = self.data.split_at(len);
        self.data = tail;
        Ok(head)
    }

    pub fn array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.array::<1>()?[0])
    }

    pub fn u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_be_bytes(self.array()?))
    }

    pub fn u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_be_bytes(self.array()?))
    }

    pub fn u64(&mut self) -> Result<u64, DecodeError> {
        Ok(u64::from_be_bytes(self.array()?))
    }

    /// Reads a presence flag: `0` is absent, `1` is present.
    pub fn flag(&mut self) -> Result<bool, DecodeError> {
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(DecodeError::InvalidFlag(other)),
        }
    }

    /// Reads a `u32` length prefix followed by that many bytes.
    pub fn var_bytes(&mut self) -> Result<&'a [u8], DecodeError> {
        let len = self.u32()? as usize;
        self.take(len)
    }

    /// Fails if any byte is left unread.
    pub fn finish(self) -> Result<(), DecodeError> {
        if self.data.is_empty() {
            Ok(())
        } else {
            Err(DecodeError::TrailingBytes(self.data.len()))
        }
    }
}

pub(crate) fn put_flag(out: &mut Vec<u8>, present: bool) {
    out.push(present as u8);
}

pub(crate) fn put_u16_len(out: &mut Vec<u8>, len: usize) -> Result<(), DecodeError> {
    let len = u16::try_from(len).map_err(|_| DecodeError::LengthOverflow(len))?;
    out.extend_from_slice(&len.to_be_bytes());
    Ok(())
}

pub(crate) fn put_var_bytes(out: &mut Vec<u8>, bytes: &[u8]) -> Result<(), DecodeError> {
    let len = u32::try_from(bytes.len()).map_err(|_| DecodeError::LengthOverflow(bytes.len()))?;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(bytes);
    Ok(())
}
