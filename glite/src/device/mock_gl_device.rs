//! Mock GL driver for unit tests (no GPU required)
//!
//! Records every call and keeps enough object state (buffer contents,
//! texture storage, framebuffer attachments, shader programs) for the
//! resource types to be tested end to end.

#[cfg(test)]
use std::sync::{Arc, Mutex};
#[cfg(test)]
use rustc_hash::{FxHashMap, FxHashSet};

#[cfg(test)]
use super::{gl, ActiveVariable, ContextConfig, GlContext, GlDevice, GlesVersion, GLenum, Handle};

/// Marker that makes a shader stage fail to compile
#[cfg(test)]
pub const COMPILE_ERROR: &str = "COMPILE_ERROR";
/// Marker that makes a program fail to link
#[cfg(test)]
pub const LINK_ERROR: &str = "LINK_ERROR";

// ============================================================================
// Object state
// ============================================================================

#[cfg(test)]
#[derive(Debug, Clone)]
pub struct MockShader {
    pub kind: GLenum,
    pub source: String,
    pub compiled: bool,
}

#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MockProgram {
    pub shaders: Vec<Handle>,
    pub linked: bool,
    pub attributes: Vec<(ActiveVariable, i32)>,
    pub uniforms: Vec<(ActiveVariable, i32)>,
    pub log: String,
}

/// Vertex attribute pointer as last declared
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub struct MockAttribPointer {
    pub size: i32,
    pub data_type: GLenum,
    pub normalized: bool,
    pub stride: i32,
    /// Byte offset into `buffer`, or `None` for client memory
    pub offset: Option<usize>,
    /// ARRAY_BUFFER bound when the pointer was declared
    pub buffer: Handle,
    /// Copy of client memory
    pub client_data: Vec<u8>,
}

/// Recorded draw call
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub struct MockDraw {
    pub mode: GLenum,
    pub count: i32,
    pub first: i32,
    pub indexed: bool,
    /// Indices read by a client-memory indexed draw
    pub client_indices: Vec<u8>,
}

// ============================================================================
// Mock device
// ============================================================================

#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockGlDevice {
    /// Call names in issue order
    pub calls: Vec<String>,
    /// Make every gen_* call return 0
    pub fail_allocations: bool,
    /// Status returned by check_framebuffer_status instead of the computed one
    pub framebuffer_status_override: Option<GLenum>,
    /// Errors returned by get_error, oldest first
    pub pending_errors: Vec<GLenum>,
    /// First location handed to active attributes at link time
    pub attribute_location_base: i32,

    next_handle: Handle,
    pub textures: FxHashSet<Handle>,
    pub buffers: FxHashSet<Handle>,
    pub framebuffers: FxHashSet<Handle>,
    pub renderbuffers: FxHashSet<Handle>,
    pub vertex_arrays: FxHashSet<Handle>,
    pub generated: usize,
    pub deleted: usize,

    pub active_unit: GLenum,
    pub bound_textures: FxHashMap<GLenum, Handle>,
    pub bound_buffers: FxHashMap<GLenum, Handle>,
    pub bound_vertex_array: Handle,
    pub bound_framebuffer: Handle,
    pub bound_renderbuffer: Handle,
    pub current_program: Handle,

    pub buffer_contents: FxHashMap<Handle, Vec<u8>>,
    /// (texture, image target, level) -> (width, height, had pixels)
    pub texture_images: FxHashMap<(Handle, GLenum, i32), (u32, u32, bool)>,
    /// (target, pname, value) in issue order
    pub tex_parameters: Vec<(GLenum, GLenum, i32)>,
    pub unpack_alignment: i32,
    pub mipmap_targets: Vec<GLenum>,
    pub renderbuffer_storage: FxHashMap<Handle, (GLenum, u32, u32)>,
    /// framebuffer -> attachment point -> (width, height)
    pub attachments: FxHashMap<Handle, FxHashMap<GLenum, (u32, u32)>>,
    pub draw_buffer_list: Vec<GLenum>,
    pub viewport: Option<(i32, i32, i32, i32)>,

    pub enabled_attributes: FxHashSet<u32>,
    pub attrib_pointers: FxHashMap<u32, MockAttribPointer>,
    pub generic_attributes: FxHashMap<u32, [f32; 4]>,
    pub draws: Vec<MockDraw>,

    pub shaders: FxHashMap<Handle, MockShader>,
    pub programs: FxHashMap<Handle, MockProgram>,
    /// (location, values) for every uniform call, ints widened to f32
    pub uniform_calls: Vec<(i32, Vec<f32>)>,
}

#[cfg(test)]
impl MockGlDevice {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            active_unit: gl::TEXTURE0,
            unpack_alignment: 4,
            ..Default::default()
        }
    }

    /// Handles currently alive across textures, buffers, framebuffers,
    /// renderbuffers and vertex arrays
    pub fn live_handles(&self) -> usize {
        self.textures.len()
            + self.buffers.len()
            + self.framebuffers.len()
            + self.renderbuffers.len()
            + self.vertex_arrays.len()
    }

    /// Number of recorded calls with the given name
    pub fn call_count(&self, name: &str) -> usize {
        self.calls.iter().filter(|call| call.as_str() == name).count()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Forget every object, as a lost context does
    pub fn lose_context(&mut self) {
        self.textures.clear();
        self.buffers.clear();
        self.framebuffers.clear();
        self.renderbuffers.clear();
        self.vertex_arrays.clear();
        self.shaders.clear();
        self.programs.clear();
        self.buffer_contents.clear();
        self.texture_images.clear();
        self.renderbuffer_storage.clear();
        self.attachments.clear();
        self.bound_textures.clear();
        self.bound_buffers.clear();
        self.bound_vertex_array = 0;
        self.bound_framebuffer = 0;
        self.bound_renderbuffer = 0;
        self.current_program = 0;
        self.enabled_attributes.clear();
        self.attrib_pointers.clear();
    }

    /// Contents of the buffer bound to `target`
    pub fn bound_buffer_contents(&self, target: GLenum) -> Option<&Vec<u8>> {
        self.bound_buffers
            .get(&target)
            .and_then(|handle| self.buffer_contents.get(handle))
    }

    fn record(&mut self, call: &str) {
        self.calls.push(call.to_string());
    }

    fn gen(&mut self) -> Handle {
        if self.fail_allocations {
            return 0;
        }
        let handle = self.next_handle;
        self.next_handle += 1;
        self.generated += 1;
        handle
    }

    fn bound_texture(&self, target: GLenum) -> Handle {
        // Cube faces are stored on the cube map binding
        let binding = if (gl::TEXTURE_CUBE_MAP_POSITIVE_X..=gl::TEXTURE_CUBE_MAP_NEGATIVE_Z).contains(&target) {
            gl::TEXTURE_CUBE_MAP
        } else {
            target
        };
        self.bound_textures.get(&binding).copied().unwrap_or(0)
    }

    fn texture_size(&self, texture: Handle) -> Option<(u32, u32)> {
        self.texture_images
            .iter()
            .find(|((handle, _, level), _)| *handle == texture && *level == 0)
            .map(|(_, (w, h, _))| (*w, *h))
    }

    fn uniform(&mut self, call: &str, location: i32, values: Vec<f32>) {
        self.record(call);
        self.uniform_calls.push((location, values));
    }

    fn link(&mut self, program: Handle) {
        let Some(state) = self.programs.get(&program) else {
            return;
        };
        let stages: Vec<MockShader> = state
            .shaders
            .iter()
            .filter_map(|handle| self.shaders.get(handle).cloned())
            .collect();

        let mut result = MockProgram {
            shaders: state.shaders.clone(),
            ..Default::default()
        };
        let attribute_base = self.attribute_location_base;

        if stages.iter().any(|stage| !stage.compiled) {
            result.log = "ERROR: attached shader not compiled".to_string();
        } else if stages.iter().any(|stage| stage.source.contains(LINK_ERROR)) {
            result.log = "ERROR: unresolved varying".to_string();
        } else {
            let mut uniform_location = 0;
            for stage in &stages {
                for (qualifier, variable) in parse_declarations(&stage.source) {
                    let is_attribute = stage.kind == gl::VERTEX_SHADER
                        && (qualifier == "attribute" || qualifier == "in");
                    if is_attribute {
                        let location = attribute_base + result.attributes.len() as i32;
                        result.attributes.push((variable, location));
                    } else if qualifier == "uniform"
                        && !result.uniforms.iter().any(|(u, _)| u.name == variable.name)
                    {
                        let size = variable.size;
                        result.uniforms.push((variable, uniform_location));
                        uniform_location += size;
                    }
                }
            }
            result.linked = true;
        }

        self.programs.insert(program, result);
    }
}

/// Parse `qualifier [precision] type name[N];` declarations
#[cfg(test)]
fn parse_declarations(source: &str) -> Vec<(String, ActiveVariable)> {
    let mut declarations = Vec::new();
    for statement in source.split(';') {
        let tokens: Vec<&str> = statement.split_whitespace().collect();
        if tokens.len() < 3 {
            continue;
        }
        let qualifier = tokens[0];
        if !matches!(qualifier, "attribute" | "in" | "uniform") {
            continue;
        }
        let type_name = tokens[tokens.len() - 2];
        let declarator = tokens[tokens.len() - 1];
        let (name, size) = match declarator.find('[') {
            Some(open) => {
                let count = declarator[open + 1..]
                    .trim_end_matches(']')
                    .parse::<i32>()
                    .unwrap_or(1);
                (&declarator[..open], count)
            }
            None => (declarator, 1),
        };
        let kind = match type_name {
            "float" => gl::FLOAT,
            "vec2" => gl::FLOAT_VEC2,
            "vec3" => gl::FLOAT_VEC3,
            "vec4" => gl::FLOAT_VEC4,
            "int" => gl::INT,
            "ivec2" => gl::INT_VEC2,
            "ivec3" => gl::INT_VEC3,
            "ivec4" => gl::INT_VEC4,
            "bool" => gl::BOOL,
            "mat2" => gl::FLOAT_MAT2,
            "mat3" => gl::FLOAT_MAT3,
            "mat4" => gl::FLOAT_MAT4,
            "sampler2D" => gl::SAMPLER_2D,
            "samplerCube" => gl::SAMPLER_CUBE,
            _ => continue,
        };
        declarations.push((
            qualifier.to_string(),
            ActiveVariable {
                name: name.to_string(),
                size,
                kind,
            },
        ));
    }
    declarations
}

#[cfg(test)]
impl GlDevice for MockGlDevice {
    // ===== OBJECT NAMES =====

    fn gen_texture(&mut self) -> Handle {
        self.record("gen_texture");
        let handle = self.gen();
        if handle != 0 {
            self.textures.insert(handle);
        }
        handle
    }

    fn delete_texture(&mut self, texture: Handle) {
        self.record("delete_texture");
        if self.textures.remove(&texture) {
            self.deleted += 1;
            self.texture_images.retain(|(handle, _, _), _| *handle != texture);
        }
    }

    fn gen_buffer(&mut self) -> Handle {
        self.record("gen_buffer");
        let handle = self.gen();
        if handle != 0 {
            self.buffers.insert(handle);
        }
        handle
    }

    fn delete_buffer(&mut self, buffer: Handle) {
        self.record("delete_buffer");
        if self.buffers.remove(&buffer) {
            self.deleted += 1;
            self.buffer_contents.remove(&buffer);
        }
    }

    fn gen_framebuffer(&mut self) -> Handle {
        self.record("gen_framebuffer");
        let handle = self.gen();
        if handle != 0 {
            self.framebuffers.insert(handle);
        }
        handle
    }

    fn delete_framebuffer(&mut self, framebuffer: Handle) {
        self.record("delete_framebuffer");
        if self.framebuffers.remove(&framebuffer) {
            self.deleted += 1;
            self.attachments.remove(&framebuffer);
        }
    }

    fn gen_renderbuffer(&mut self) -> Handle {
        self.record("gen_renderbuffer");
        let handle = self.gen();
        if handle != 0 {
            self.renderbuffers.insert(handle);
        }
        handle
    }

    fn delete_renderbuffer(&mut self, renderbuffer: Handle) {
        self.record("delete_renderbuffer");
        if self.renderbuffers.remove(&renderbuffer) {
            self.deleted += 1;
            self.renderbuffer_storage.remove(&renderbuffer);
        }
    }

    fn gen_vertex_array(&mut self) -> Handle {
        self.record("gen_vertex_array");
        let handle = self.gen();
        if handle != 0 {
            self.vertex_arrays.insert(handle);
        }
        handle
    }

    fn delete_vertex_array(&mut self, vertex_array: Handle) {
        self.record("delete_vertex_array");
        if self.vertex_arrays.remove(&vertex_array) {
            self.deleted += 1;
        }
    }

    // ===== TEXTURES =====

    fn active_texture(&mut self, unit: GLenum) {
        self.record("active_texture");
        self.active_unit = unit;
    }

    fn bind_texture(&mut self, target: GLenum, texture: Handle) {
        self.record("bind_texture");
        self.bound_textures.insert(target, texture);
    }

    fn tex_parameter_i(&mut self, target: GLenum, pname: GLenum, param: i32) {
        self.record("tex_parameter_i");
        self.tex_parameters.push((target, pname, param));
    }

    fn pixel_store_i(&mut self, pname: GLenum, param: i32) {
        self.record("pixel_store_i");
        if pname == gl::UNPACK_ALIGNMENT {
            self.unpack_alignment = param;
        }
    }

    fn tex_image_2d(
        &mut self,
        target: GLenum,
        level: i32,
        _internal_format: i32,
        width: u32,
        height: u32,
        _format: GLenum,
        _data_type: GLenum,
        pixels: Option<&[u8]>,
    ) {
        self.record("tex_image_2d");
        let texture = self.bound_texture(target);
        self.texture_images
            .insert((texture, target, level), (width, height, pixels.is_some()));
    }

    fn generate_mipmap(&mut self, target: GLenum) {
        self.record("generate_mipmap");
        self.mipmap_targets.push(target);
    }

    // ===== BUFFERS =====

    fn bind_buffer(&mut self, target: GLenum, buffer: Handle) {
        self.record("bind_buffer");
        self.bound_buffers.insert(target, buffer);
    }

    fn buffer_data(&mut self, target: GLenum, data: &[u8], _usage: GLenum) {
        self.record("buffer_data");
        if let Some(&handle) = self.bound_buffers.get(&target) {
            self.buffer_contents.insert(handle, data.to_vec());
        }
    }

    fn buffer_data_size(&mut self, target: GLenum, size: usize, _usage: GLenum) {
        self.record("buffer_data_size");
        if let Some(&handle) = self.bound_buffers.get(&target) {
            self.buffer_contents.insert(handle, vec![0; size]);
        }
    }

    fn buffer_sub_data(&mut self, target: GLenum, offset: usize, data: &[u8]) {
        self.record("buffer_sub_data");
        let Some(&handle) = self.bound_buffers.get(&target) else {
            return;
        };
        match self.buffer_contents.get_mut(&handle) {
            Some(contents) if offset + data.len() <= contents.len() => {
                contents[offset..offset + data.len()].copy_from_slice(data);
            }
            _ => self.pending_errors.push(gl::INVALID_VALUE),
        }
    }

    fn bind_vertex_array(&mut self, vertex_array: Handle) {
        self.record("bind_vertex_array");
        self.bound_vertex_array = vertex_array;
    }

    // ===== VERTEX ATTRIBUTES =====

    fn enable_vertex_attrib_array(&mut self, location: u32) {
        self.record("enable_vertex_attrib_array");
        self.enabled_attributes.insert(location);
    }

    fn disable_vertex_attrib_array(&mut self, location: u32) {
        self.record("disable_vertex_attrib_array");
        self.enabled_attributes.remove(&location);
    }

    fn vertex_attrib_pointer(
        &mut self,
        location: u32,
        size: i32,
        data_type: GLenum,
        normalized: bool,
        stride: i32,
        offset: usize,
    ) {
        self.record("vertex_attrib_pointer");
        let buffer = self.bound_buffers.get(&gl::ARRAY_BUFFER).copied().unwrap_or(0);
        self.attrib_pointers.insert(
            location,
            MockAttribPointer {
                size,
                data_type,
                normalized,
                stride,
                offset: Some(offset),
                buffer,
                client_data: Vec::new(),
            },
        );
    }

    fn vertex_attrib_pointer_client(
        &mut self,
        location: u32,
        size: i32,
        data_type: GLenum,
        normalized: bool,
        stride: i32,
        data: &[u8],
    ) {
        self.record("vertex_attrib_pointer_client");
        self.attrib_pointers.insert(
            location,
            MockAttribPointer {
                size,
                data_type,
                normalized,
                stride,
                offset: None,
                buffer: 0,
                client_data: data.to_vec(),
            },
        );
    }

    fn vertex_attrib_4f(&mut self, location: u32, x: f32, y: f32, z: f32, w: f32) {
        self.record("vertex_attrib_4f");
        self.generic_attributes.insert(location, [x, y, z, w]);
    }

    // ===== DRAWING =====

    fn draw_arrays(&mut self, mode: GLenum, first: i32, count: i32) {
        self.record("draw_arrays");
        self.draws.push(MockDraw {
            mode,
            count,
            first,
            indexed: false,
            client_indices: Vec::new(),
        });
    }

    fn draw_elements(&mut self, mode: GLenum, count: i32, _data_type: GLenum, offset: usize) {
        self.record("draw_elements");
        self.draws.push(MockDraw {
            mode,
            count,
            first: offset as i32,
            indexed: true,
            client_indices: Vec::new(),
        });
    }

    fn draw_elements_client(&mut self, mode: GLenum, count: i32, _data_type: GLenum, indices: &[u8]) {
        self.record("draw_elements_client");
        self.draws.push(MockDraw {
            mode,
            count,
            first: 0,
            indexed: true,
            client_indices: indices.to_vec(),
        });
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.record("viewport");
        self.viewport = Some((x, y, width, height));
    }

    // ===== SHADERS & PROGRAMS =====

    fn create_shader(&mut self, kind: GLenum) -> Handle {
        self.record("create_shader");
        let handle = self.gen();
        if handle != 0 {
            self.shaders.insert(
                handle,
                MockShader {
                    kind,
                    source: String::new(),
                    compiled: false,
                },
            );
        }
        handle
    }

    fn shader_source(&mut self, shader: Handle, source: &str) {
        self.record("shader_source");
        if let Some(state) = self.shaders.get_mut(&shader) {
            state.source = source.to_string();
        }
    }

    fn compile_shader(&mut self, shader: Handle) {
        self.record("compile_shader");
        if let Some(state) = self.shaders.get_mut(&shader) {
            state.compiled = !state.source.contains(COMPILE_ERROR);
        }
    }

    fn shader_compile_status(&mut self, shader: Handle) -> bool {
        self.shaders.get(&shader).map(|s| s.compiled).unwrap_or(false)
    }

    fn shader_info_log(&mut self, shader: Handle) -> String {
        match self.shaders.get(&shader) {
            Some(state) if !state.compiled => "ERROR: 0:1: syntax error".to_string(),
            _ => String::new(),
        }
    }

    fn delete_shader(&mut self, shader: Handle) {
        self.record("delete_shader");
        self.shaders.remove(&shader);
    }

    fn create_program(&mut self) -> Handle {
        self.record("create_program");
        let handle = self.gen();
        if handle != 0 {
            self.programs.insert(handle, MockProgram::default());
        }
        handle
    }

    fn attach_shader(&mut self, program: Handle, shader: Handle) {
        self.record("attach_shader");
        if let Some(state) = self.programs.get_mut(&program) {
            state.shaders.push(shader);
        }
    }

    fn link_program(&mut self, program: Handle) {
        self.record("link_program");
        self.link(program);
    }

    fn program_link_status(&mut self, program: Handle) -> bool {
        self.programs.get(&program).map(|p| p.linked).unwrap_or(false)
    }

    fn program_info_log(&mut self, program: Handle) -> String {
        self.programs.get(&program).map(|p| p.log.clone()).unwrap_or_default()
    }

    fn delete_program(&mut self, program: Handle) {
        self.record("delete_program");
        self.programs.remove(&program);
    }

    fn use_program(&mut self, program: Handle) {
        self.record("use_program");
        self.current_program = program;
    }

    fn active_attribute_count(&mut self, program: Handle) -> u32 {
        self.programs.get(&program).map(|p| p.attributes.len() as u32).unwrap_or(0)
    }

    fn active_attribute(&mut self, program: Handle, index: u32) -> ActiveVariable {
        self.programs
            .get(&program)
            .and_then(|p| p.attributes.get(index as usize))
            .map(|(variable, _)| variable.clone())
            .unwrap_or(ActiveVariable { name: String::new(), size: 0, kind: 0 })
    }

    fn active_uniform_count(&mut self, program: Handle) -> u32 {
        self.programs.get(&program).map(|p| p.uniforms.len() as u32).unwrap_or(0)
    }

    fn active_uniform(&mut self, program: Handle, index: u32) -> ActiveVariable {
        self.programs
            .get(&program)
            .and_then(|p| p.uniforms.get(index as usize))
            .map(|(variable, _)| variable.clone())
            .unwrap_or(ActiveVariable { name: String::new(), size: 0, kind: 0 })
    }

    fn get_attrib_location(&mut self, program: Handle, name: &str) -> i32 {
        self.record("get_attrib_location");
        self.programs
            .get(&program)
            .and_then(|p| p.attributes.iter().find(|(v, _)| v.name == name))
            .map(|(_, location)| *location)
            .unwrap_or(-1)
    }

    fn get_uniform_location(&mut self, program: Handle, name: &str) -> i32 {
        self.record("get_uniform_location");
        self.programs
            .get(&program)
            .and_then(|p| p.uniforms.iter().find(|(v, _)| v.name == name))
            .map(|(_, location)| *location)
            .unwrap_or(-1)
    }

    // ===== UNIFORMS =====

    fn uniform_1i(&mut self, location: i32, x: i32) {
        self.uniform("uniform_1i", location, vec![x as f32]);
    }

    fn uniform_2i(&mut self, location: i32, x: i32, y: i32) {
        self.uniform("uniform_2i", location, vec![x as f32, y as f32]);
    }

    fn uniform_3i(&mut self, location: i32, x: i32, y: i32, z: i32) {
        self.uniform("uniform_3i", location, vec![x as f32, y as f32, z as f32]);
    }

    fn uniform_4i(&mut self, location: i32, x: i32, y: i32, z: i32, w: i32) {
        self.uniform("uniform_4i", location, vec![x as f32, y as f32, z as f32, w as f32]);
    }

    fn uniform_1f(&mut self, location: i32, x: f32) {
        self.uniform("uniform_1f", location, vec![x]);
    }

    fn uniform_2f(&mut self, location: i32, x: f32, y: f32) {
        self.uniform("uniform_2f", location, vec![x, y]);
    }

    fn uniform_3f(&mut self, location: i32, x: f32, y: f32, z: f32) {
        self.uniform("uniform_3f", location, vec![x, y, z]);
    }

    fn uniform_4f(&mut self, location: i32, x: f32, y: f32, z: f32, w: f32) {
        self.uniform("uniform_4f", location, vec![x, y, z, w]);
    }

    fn uniform_1fv(&mut self, location: i32, values: &[f32]) {
        self.uniform("uniform_1fv", location, values.to_vec());
    }

    fn uniform_2fv(&mut self, location: i32, values: &[f32]) {
        self.uniform("uniform_2fv", location, values.to_vec());
    }

    fn uniform_3fv(&mut self, location: i32, values: &[f32]) {
        self.uniform("uniform_3fv", location, values.to_vec());
    }

    fn uniform_4fv(&mut self, location: i32, values: &[f32]) {
        self.uniform("uniform_4fv", location, values.to_vec());
    }

    fn uniform_matrix3fv(&mut self, location: i32, _transpose: bool, values: &[f32]) {
        self.uniform("uniform_matrix3fv", location, values.to_vec());
    }

    fn uniform_matrix4fv(&mut self, location: i32, _transpose: bool, values: &[f32]) {
        self.uniform("uniform_matrix4fv", location, values.to_vec());
    }

    // ===== FRAMEBUFFERS =====

    fn bind_framebuffer(&mut self, _target: GLenum, framebuffer: Handle) {
        self.record("bind_framebuffer");
        self.bound_framebuffer = framebuffer;
    }

    fn framebuffer_texture_2d(
        &mut self,
        _target: GLenum,
        attachment: GLenum,
        _texture_target: GLenum,
        texture: Handle,
        _level: i32,
    ) {
        self.record("framebuffer_texture_2d");
        let size = self.texture_size(texture).unwrap_or((0, 0));
        self.attachments
            .entry(self.bound_framebuffer)
            .or_default()
            .insert(attachment, size);
    }

    fn bind_renderbuffer(&mut self, _target: GLenum, renderbuffer: Handle) {
        self.record("bind_renderbuffer");
        self.bound_renderbuffer = renderbuffer;
    }

    fn renderbuffer_storage(&mut self, _target: GLenum, internal_format: GLenum, width: u32, height: u32) {
        self.record("renderbuffer_storage");
        self.renderbuffer_storage
            .insert(self.bound_renderbuffer, (internal_format, width, height));
    }

    fn framebuffer_renderbuffer(
        &mut self,
        _target: GLenum,
        attachment: GLenum,
        _renderbuffer_target: GLenum,
        renderbuffer: Handle,
    ) {
        self.record("framebuffer_renderbuffer");
        let size = self
            .renderbuffer_storage
            .get(&renderbuffer)
            .map(|(_, w, h)| (*w, *h))
            .unwrap_or((0, 0));
        self.attachments
            .entry(self.bound_framebuffer)
            .or_default()
            .insert(attachment, size);
    }

    fn check_framebuffer_status(&mut self, _target: GLenum) -> GLenum {
        self.record("check_framebuffer_status");
        if let Some(status) = self.framebuffer_status_override {
            return status;
        }
        let Some(points) = self.attachments.get(&self.bound_framebuffer) else {
            return gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT;
        };
        let mut sizes = points.values();
        match sizes.next() {
            None => gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT,
            Some(first) if sizes.all(|size| size == first) => gl::FRAMEBUFFER_COMPLETE,
            Some(_) => gl::FRAMEBUFFER_INCOMPLETE_DIMENSIONS,
        }
    }

    fn draw_buffers(&mut self, buffers: &[GLenum]) {
        self.record("draw_buffers");
        self.draw_buffer_list = buffers.to_vec();
    }

    // ===== ERRORS =====

    fn get_error(&mut self) -> GLenum {
        if self.pending_errors.is_empty() {
            gl::NO_ERROR
        } else {
            self.pending_errors.remove(0)
        }
    }
}

// ============================================================================
// Test context helpers
// ============================================================================

/// Context over a shared mock device, with error checking enabled
#[cfg(test)]
pub fn mock_context(version: GlesVersion) -> (GlContext, Arc<Mutex<MockGlDevice>>) {
    mock_context_with(ContextConfig {
        default_framebuffer: 0,
        version,
        check_errors: true,
    })
}

#[cfg(test)]
pub fn mock_context_with(config: ContextConfig) -> (GlContext, Arc<Mutex<MockGlDevice>>) {
    let mock = Arc::new(Mutex::new(MockGlDevice::new()));
    let ctx = GlContext::from_shared(mock.clone(), config);
    (ctx, mock)
}

#[cfg(test)]
#[path = "mock_gl_device_tests.rs"]
mod tests;
