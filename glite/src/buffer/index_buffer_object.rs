//! Buffer-object index backend with whole-range uploads

use crate::device::{gl, GlContext, GLenum, Handle, HandleKind};
use crate::error::{Error, Result};
use crate::glite_bail;
use super::host_buffer::HostBuffer;
use super::vertex_data::IndexData;

/// 16-bit indices in an ELEMENT_ARRAY_BUFFER, re-sent whole when changed
#[derive(Debug)]
pub struct IndexBufferObject {
    ctx: GlContext,
    buffer: HostBuffer<u16>,
    handle: Handle,
    usage: GLenum,
    dirty: bool,
    bound: bool,
}

impl IndexBufferObject {
    pub fn new(ctx: &GlContext, is_static: bool, max_indices: usize) -> Self {
        Self {
            ctx: ctx.clone(),
            buffer: HostBuffer::new(max_indices),
            handle: ctx.allocate(HandleKind::Buffer),
            usage: if is_static { gl::STATIC_DRAW } else { gl::DYNAMIC_DRAW },
            dirty: false,
            bound: false,
        }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    fn upload(&mut self) {
        self.ctx
            .device()
            .buffer_data(gl::ELEMENT_ARRAY_BUFFER, self.buffer.bytes(), self.usage);
        self.ctx.check_error("IndexBufferObject upload");
        self.dirty = false;
    }
}

impl IndexData for IndexBufferObject {
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
            self.upload();
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
        self.dirty = true;
        if self.bound {
            self.upload();
        }
        Ok(())
    }

    fn bind(&mut self) -> Result<()> {
        if self.handle == 0 {
            glite_bail!("glite::IndexBufferObject", Error::InvalidResource, "Index buffer used after dispose");
        }

        self.ctx.device().bind_buffer(gl::ELEMENT_ARRAY_BUFFER, self.handle);
        if self.dirty {
            self.upload();
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
        self.handle = self.ctx.allocate(HandleKind::Buffer);
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

impl Drop for IndexBufferObject {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
#[path = "index_buffer_object_tests.rs"]
mod tests;
