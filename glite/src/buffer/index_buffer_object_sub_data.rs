//! Buffer-object index backend with storage allocated once and sub-range
//! uploads

use crate::device::{gl, GlContext, GLenum, Handle, HandleKind};
use crate::error::{Error, Result};
use crate::glite_bail;
use super::host_buffer::HostBuffer;
use super::vertex_data::IndexData;

/// 16-bit indices in an ELEMENT_ARRAY_BUFFER sized to full capacity
#[derive(Debug)]
pub struct IndexBufferObjectSubData {
    ctx: GlContext,
    buffer: HostBuffer<u16>,
    handle: Handle,
    usage: GLenum,
    dirty: bool,
    bound: bool,
}

impl IndexBufferObjectSubData {
    pub fn new(ctx: &GlContext, is_static: bool, max_indices: usize) -> Self {
        let buffer = HostBuffer::new(max_indices);
        let usage = if is_static { gl::STATIC_DRAW } else { gl::DYNAMIC_DRAW };
        let handle = create_buffer_object(ctx, buffer.capacity_bytes(), usage);
        Self {
            ctx: ctx.clone(),
            buffer,
            handle,
            usage,
            dirty: false,
            bound: false,
        }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    fn upload_range(&self, offset: usize, count: usize) {
        let bytes = self.buffer.range_bytes(offset, count);
        self.ctx
            .device()
            .buffer_sub_data(gl::ELEMENT_ARRAY_BUFFER, offset * std::mem::size_of::<u16>(), bytes);
        self.ctx.check_error("IndexBufferObjectSubData upload");
    }

    fn upload_all(&mut self) {
        self.upload_range(0, self.buffer.len());
        self.dirty = false;
    }
}

fn create_buffer_object(ctx: &GlContext, size: usize, usage: GLenum) -> Handle {
    let handle = ctx.allocate(HandleKind::Buffer);
    let mut device = ctx.device();
    device.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, handle);
    device.buffer_data_size(gl::ELEMENT_ARRAY_BUFFER, size, usage);
    device.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, 0);
    handle
}

impl IndexData for IndexBufferObjectSubData {
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
        self.buffer.set(indices, offset, count)?;
        self.dirty = true;
        if self.bound {
            self.upload_all();
        }
        Ok(())
    }

    fn update_indices(
        &mut self,
        target_offset: usize,
        indices: &[u16],
        source_offset: usize,
        count: usize,
    ) -> Result<()> {
        self.buffer.update(target_offset, indices, source_offset, count)?;
        match (self.bound, self.dirty) {
            (true, false) => self.upload_range(target_offset, count),
            (true, true) => self.upload_all(),
            (false, _) => self.dirty = true,
        }
        Ok(())
    }

    fn bind(&mut self) -> Result<()> {
        if self.handle == 0 {
            glite_bail!(
                "glite::IndexBufferObjectSubData",
                Error::InvalidResource,
                "Index buffer used after dispose"
            );
        }

        self.ctx.device().bind_buffer(gl::ELEMENT_ARRAY_BUFFER, self.handle);
        if self.dirty {
            self.upload_all();
        }
        self.bound = true;
        Ok(())
    }

    fn unbind(&mut self) {
        self.ctx.device().bind_buffer(gl::ELEMENT_ARRAY_BUFFER, 0);
        self.bound = false;
    }

    fn is_bound(&self) -> bool {
        self.bound
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn invalidate(&mut self) {
        self.handle = create_buffer_object(&self.ctx, self.buffer.capacity_bytes(), self.usage);
        self.dirty = true;
        self.bound = false;
    }

    fn dispose(&mut self) {
        if self.handle == 0 {
            return;
        }
        self.ctx.device().bind_buffer(gl::ELEMENT_ARRAY_BUFFER, 0);
        self.ctx.release(HandleKind::Buffer, self.handle);
        self.handle = 0;
        self.bound = false;
    }
}

impl Drop for IndexBufferObjectSubData {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
#[path = "index_buffer_object_sub_data_tests.rs"]
mod tests;
