//! Fixed-capacity CPU mirror shared by every vertex and index backend

use bytemuck::Pod;

use crate::error::{Error, Result};
use crate::glite_bail;

/// Fixed-capacity element storage with a logical length
///
/// `set` replaces the logical range, `update` patches inside it.
#[derive(Debug, Clone)]
pub(crate) struct HostBuffer<T> {
    data: Vec<T>,
    len: usize,
}

impl<T: Pod> HostBuffer<T> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            data: vec![T::zeroed(); capacity],
            len: 0,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.data.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Logical range
    pub(crate) fn as_slice(&self) -> &[T] {
        &self.data[..self.len]
    }

    /// Logical range as bytes
    pub(crate) fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.as_slice())
    }

    /// Bytes of `count` elements starting at element `offset`
    pub(crate) fn range_bytes(&self, offset: usize, count: usize) -> &[u8] {
        bytemuck::cast_slice(&self.data[offset..offset + count])
    }

    /// Size of the whole storage in bytes
    pub(crate) fn capacity_bytes(&self) -> usize {
        self.data.len() * std::mem::size_of::<T>()
    }

    /// Replace the contents with `source[offset..offset + count]`
    pub(crate) fn set(&mut self, source: &[T], offset: usize, count: usize) -> Result<()> {
        check_source(source.len(), offset, count)?;
        if count > self.data.len() {
            glite_bail!(
                "glite::Buffer",
                Error::OutOfRange,
                "{} elements exceed the buffer capacity of {}",
                count,
                self.data.len()
            );
        }

        self.data[..count].copy_from_slice(&source[offset..offset + count]);
        self.len = count;
        Ok(())
    }

    /// Overwrite `count` elements at `target_offset` inside the logical range
    pub(crate) fn update(&mut self, target_offset: usize, source: &[T], source_offset: usize, count: usize) -> Result<()> {
        check_source(source.len(), source_offset, count)?;
        if target_offset.checked_add(count).map_or(true, |end| end > self.len) {
            glite_bail!(
                "glite::Buffer",
                Error::OutOfRange,
                "Update of {} elements at {} exceeds the {} defined elements",
                count,
                target_offset,
                self.len
            );
        }

        self.data[target_offset..target_offset + count]
            .copy_from_slice(&source[source_offset..source_offset + count]);
        Ok(())
    }
}

fn check_source(source_len: usize, offset: usize, count: usize) -> Result<()> {
    if offset.checked_add(count).map_or(true, |end| end > source_len) {
        glite_bail!(
            "glite::Buffer",
            Error::OutOfRange,
            "Source range {}+{} exceeds the {} provided elements",
            offset,
            count,
            source_len
        );
    }
    Ok(())
}
