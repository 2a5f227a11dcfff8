/// GlDevice trait - raw GLES driver boundary
///
/// One method per driver entry point glite issues. Implementations forward to
/// the platform GL bindings; `MockGlDevice` implements it for unit tests.
/// All methods run on the thread that owns the GL context.

use super::{GLenum, Handle};

/// Active attribute or uniform reported by program introspection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveVariable {
    /// Variable name as declared in the shader
    pub name: String,
    /// Array size (1 for non-array variables)
    pub size: i32,
    /// GL type enum (FLOAT_VEC4, SAMPLER_2D, ...)
    pub kind: GLenum,
}

/// Raw GLES driver
pub trait GlDevice: Send {
    // ===== OBJECT NAMES =====

    fn gen_texture(&mut self) -> Handle;
    fn delete_texture(&mut self, texture: Handle);
    fn gen_buffer(&mut self) -> Handle;
    fn delete_buffer(&mut self, buffer: Handle);
    fn gen_framebuffer(&mut self) -> Handle;
    fn delete_framebuffer(&mut self, framebuffer: Handle);
    fn gen_renderbuffer(&mut self) -> Handle;
    fn delete_renderbuffer(&mut self, renderbuffer: Handle);
    /// GLES3 only
    fn gen_vertex_array(&mut self) -> Handle;
    /// GLES3 only
    fn delete_vertex_array(&mut self, vertex_array: Handle);

    // ===== TEXTURES =====

    fn active_texture(&mut self, unit: GLenum);
    fn bind_texture(&mut self, target: GLenum, texture: Handle);
    fn tex_parameter_i(&mut self, target: GLenum, pname: GLenum, param: i32);
    fn pixel_store_i(&mut self, pname: GLenum, param: i32);

    /// Specify a 2D image; `pixels == None` allocates storage without data
    #[allow(clippy::too_many_arguments)]
    fn tex_image_2d(
        &mut self,
        target: GLenum,
        level: i32,
        internal_format: i32,
        width: u32,
        height: u32,
        format: GLenum,
        data_type: GLenum,
        pixels: Option<&[u8]>,
    );
    fn generate_mipmap(&mut self, target: GLenum);

    // ===== BUFFERS =====

    fn bind_buffer(&mut self, target: GLenum, buffer: Handle);
    fn buffer_data(&mut self, target: GLenum, data: &[u8], usage: GLenum);
    /// Allocate `size` bytes of uninitialized storage
    fn buffer_data_size(&mut self, target: GLenum, size: usize, usage: GLenum);
    fn buffer_sub_data(&mut self, target: GLenum, offset: usize, data: &[u8]);
    /// GLES3 only
    fn bind_vertex_array(&mut self, vertex_array: Handle);

    // ===== VERTEX ATTRIBUTES =====

    fn enable_vertex_attrib_array(&mut self, location: u32);
    fn disable_vertex_attrib_array(&mut self, location: u32);

    /// Attribute sourced from the bound ARRAY_BUFFER at byte `offset`
    #[allow(clippy::too_many_arguments)]
    fn vertex_attrib_pointer(
        &mut self,
        location: u32,
        size: i32,
        data_type: GLenum,
        normalized: bool,
        stride: i32,
        offset: usize,
    );

    /// Attribute sourced from client memory
    #[allow(clippy::too_many_arguments)]
    fn vertex_attrib_pointer_client(
        &mut self,
        location: u32,
        size: i32,
        data_type: GLenum,
        normalized: bool,
        stride: i32,
        data: &[u8],
    );
    fn vertex_attrib_4f(&mut self, location: u32, x: f32, y: f32, z: f32, w: f32);

    // ===== DRAWING =====

    fn draw_arrays(&mut self, mode: GLenum, first: i32, count: i32);
    /// Indexed draw from the bound ELEMENT_ARRAY_BUFFER at byte `offset`
    fn draw_elements(&mut self, mode: GLenum, count: i32, data_type: GLenum, offset: usize);
    /// Indexed draw from client memory
    fn draw_elements_client(&mut self, mode: GLenum, count: i32, data_type: GLenum, indices: &[u8]);
    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32);

    // ===== SHADERS & PROGRAMS =====

    fn create_shader(&mut self, kind: GLenum) -> Handle;
    fn shader_source(&mut self, shader: Handle, source: &str);
    fn compile_shader(&mut self, shader: Handle);
    fn shader_compile_status(&mut self, shader: Handle) -> bool;
    fn shader_info_log(&mut self, shader: Handle) -> String;
    fn delete_shader(&mut self, shader: Handle);
    fn create_program(&mut self) -> Handle;
    fn attach_shader(&mut self, program: Handle, shader: Handle);
    fn link_program(&mut self, program: Handle);
    fn program_link_status(&mut self, program: Handle) -> bool;
    fn program_info_log(&mut self, program: Handle) -> String;
    fn delete_program(&mut self, program: Handle);
    fn use_program(&mut self, program: Handle);

    fn active_attribute_count(&mut self, program: Handle) -> u32;
    fn active_attribute(&mut self, program: Handle, index: u32) -> ActiveVariable;
    fn active_uniform_count(&mut self, program: Handle) -> u32;
    fn active_uniform(&mut self, program: Handle, index: u32) -> ActiveVariable;
    /// -1 when the attribute is not active
    fn get_attrib_location(&mut self, program: Handle, name: &str) -> i32;
    /// -1 when the uniform is not active
    fn get_uniform_location(&mut self, program: Handle, name: &str) -> i32;

    // ===== UNIFORMS =====

    fn uniform_1i(&mut self, location: i32, x: i32);
    fn uniform_2i(&mut self, location: i32, x: i32, y: i32);
    fn uniform_3i(&mut self, location: i32, x: i32, y: i32, z: i32);
    fn uniform_4i(&mut self, location: i32, x: i32, y: i32, z: i32, w: i32);
    fn uniform_1f(&mut self, location: i32, x: f32);
    fn uniform_2f(&mut self, location: i32, x: f32, y: f32);
    fn uniform_3f(&mut self, location: i32, x: f32, y: f32, z: f32);
    fn uniform_4f(&mut self, location: i32, x: f32, y: f32, z: f32, w: f32);
    fn uniform_1fv(&mut self, location: i32, values: &[f32]);
    fn uniform_2fv(&mut self, location: i32, values: &[f32]);
    fn uniform_3fv(&mut self, location: i32, values: &[f32]);
    fn uniform_4fv(&mut self, location: i32, values: &[f32]);
    fn uniform_matrix3fv(&mut self, location: i32, transpose: bool, values: &[f32]);
    fn uniform_matrix4fv(&mut self, location: i32, transpose: bool, values: &[f32]);

    // ===== FRAMEBUFFERS =====

    fn bind_framebuffer(&mut self, target: GLenum, framebuffer: Handle);
    fn framebuffer_texture_2d(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        texture_target: GLenum,
        texture: Handle,
        level: i32,
    );
    fn bind_renderbuffer(&mut self, target: GLenum, renderbuffer: Handle);
    fn renderbuffer_storage(&mut self, target: GLenum, internal_format: GLenum, width: u32, height: u32);
    fn framebuffer_renderbuffer(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        renderbuffer_target: GLenum,
        renderbuffer: Handle,
    );
    fn check_framebuffer_status(&mut self, target: GLenum) -> GLenum;
    /// GLES3 only
    fn draw_buffers(&mut self, buffers: &[GLenum]);

    // ===== ERRORS =====

    /// Pop the oldest pending error, `gl::NO_ERROR` when none
    fn get_error(&mut self) -> GLenum;
}
