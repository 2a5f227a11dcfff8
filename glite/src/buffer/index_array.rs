//! Client-memory index backend

use crate::error::{Error, Result};
use crate::glite_bail;
use super::host_buffer::HostBuffer;
use super::vertex_data::IndexData;

/// 16-bit indices kept in client memory and passed with each draw
#[derive(Debug)]
pub struct IndexArray {
    buffer: HostBuffer<u16>,
    bound: bool,
}

impl IndexArray {
    pub fn new(max_indices: usize) -> Self {
        Self {
            buffer: HostBuffer::new(max_indices),
            bound: false,
        }
    }

    /// Defined indices as bytes, for client-memory draws
    pub fn bytes(&self) -> &[u8] {
        self.buffer.bytes()
    }
}

impl IndexData for IndexArray {
    fn num_indices(&self) -> usize {
        self.buffer.len()
    }

    fn num_max_indices(&self) -> usize {
        self.buffer.capacity()
    }

    fn indices(&self) -> &[u16] {
        self.buffer.as_slice()
    }

    fn set_indices(&mut self, indices: &[u16], offset: usize, count: usize) -> Result<()> {
        self.buffer.set(indices, offset, count)
    }

    /// Always fails: client arrays are replaced whole
    fn update_indices(
        &mut self,
        _target_offset: usize,
        _indices: &[u16],
        _source_offset: usize,
        _count: usize,
    ) -> Result<()> {
        glite_bail!(
            "glite::IndexArray",
            Error::InvalidState,
            "Client index arrays cannot be patched in place, use set_indices"
        );
    }

    fn bind(&mut self) -> Result<()> {
        self.bound = true;
        Ok(())
    }

    fn unbind(&mut self) {
        self.bound = false;
    }

    fn is_bound(&self) -> bool {
        self.bound
    }

    fn is_dirty(&self) -> bool {
        false
    }

    fn invalidate(&mut self) {
        self.bound = false;
    }

    fn dispose(&mut self) {}
}

#[cfg(test)]
#[path = "index_array_tests.rs"]
mod tests;
