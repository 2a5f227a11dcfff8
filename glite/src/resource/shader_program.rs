//! Shader program: compile/link state machine and location caches
//!
//! # Lifecycle
//!
//! ```text
//! Uncompiled ──compile ok──► Linked ──invalidate──► Invalidated
//!     │                        ▲                         │
//!     │                        └──── next stateful call ─┘
//!     └──compile/link error──► Failed
//! ```
//!
//! After a successful link every active attribute and uniform is enumerated
//! once (name, location, GL type, array size). That table answers the
//! `*_location` queries until the next recompile.
//!
//! Setters resolve names through a second, lazily filled cache where `-1`
//! records "looked up, not found". Whether a miss is an error depends on
//! [`ShaderConfig::pedantic`].

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
use rustc_hash::FxHashMap;

use crate::asset::{AssetLoader, FileLocation};
use crate::device::{gl, GlContext, GLenum, Handle};
use crate::error::{Error, Result};
use crate::managed::Managed;
use crate::{glite_bail, glite_debug, glite_err, glite_error};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Per-program compilation settings
#[derive(Debug, Clone)]
pub struct ShaderConfig {
    /// Treat a setter on an unknown uniform as an error
    pub pedantic: bool,
    /// Code prepended to the vertex stage source
    pub prepend_vertex: String,
    /// Code prepended to the fragment stage source
    pub prepend_fragment: String,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            pedantic: true,
            prepend_vertex: String::new(),
            prepend_fragment: String::new(),
        }
    }
}

/// Compile/link state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramState {
    Uncompiled,
    Linked,
    /// Context lost; recompiled on the next stateful call
    Invalidated,
    /// Compile or link error; see [`ShaderProgram::log`]
    Failed,
}

/// Active attribute or uniform as reported after link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableInfo {
    pub location: i32,
    pub kind: GLenum,
    pub size: i32,
}

/// Uniform or attribute addressed by name or by location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableRef<'a> {
    Name(&'a str),
    Location(i32),
}

impl<'a> From<&'a str> for VariableRef<'a> {
    fn from(name: &'a str) -> Self {
        VariableRef::Name(name)
    }
}

impl From<i32> for VariableRef<'_> {
    fn from(location: i32) -> Self {
        VariableRef::Location(location)
    }
}

// ============================================================================
// SHADER PROGRAM
// ============================================================================

/// Vertex + fragment program with retained sources
pub struct ShaderProgram {
    ctx: GlContext,
    pedantic: bool,

    vertex_source: String,
    fragment_source: String,

    vertex_shader: Handle,
    fragment_shader: Handle,
    program: Handle,

    state: ProgramState,
    log: String,

    /// Active variables, filled once per link
    uniforms: FxHashMap<String, VariableInfo>,
    uniform_names: Vec<String>,
    attributes: FxHashMap<String, VariableInfo>,
    attribute_names: Vec<String>,

    /// Name lookups made by setters (-1 = not found)
    uniform_lookups: FxHashMap<String, i32>,
    attribute_lookups: FxHashMap<String, i32>,
}

impl ShaderProgram {
    /// Compile and link with the default configuration
    ///
    /// A compile or link error does not fail construction: check
    /// [`is_compiled`](Self::is_compiled) and [`log`](Self::log).
    pub fn new(ctx: &GlContext, vertex_source: &str, fragment_source: &str) -> Self {
        Self::with_config(ctx, vertex_source, fragment_source, ShaderConfig::default())
    }

    /// Compile and link with explicit prefixes and pedantic flag
    pub fn with_config(ctx: &GlContext, vertex_source: &str, fragment_source: &str, config: ShaderConfig) -> Self {
        let mut program = Self {
            ctx: ctx.clone(),
            pedantic: config.pedantic,
            vertex_source: format!("{}{}", config.prepend_vertex, vertex_source),
            fragment_source: format!("{}{}", config.prepend_fragment, fragment_source),
            vertex_shader: 0,
            fragment_shader: 0,
            program: 0,
            state: ProgramState::Uncompiled,
            log: String::new(),
            uniforms: FxHashMap::default(),
            uniform_names: Vec::new(),
            attributes: FxHashMap::default(),
            attribute_names: Vec::new(),
            uniform_lookups: FxHashMap::default(),
            attribute_lookups: FxHashMap::default(),
        };
        program.compile();
        program
    }

    /// Load both stages through the asset loader, then compile
    pub fn from_files(
        ctx: &GlContext,
        loader: &dyn AssetLoader,
        vertex_path: &str,
        fragment_path: &str,
        location: FileLocation,
        config: ShaderConfig,
    ) -> Result<Self> {
        let vertex_source = loader.load_text(vertex_path, location)?;
        let fragment_source = loader.load_text(fragment_path, location)?;
        if vertex_source.trim().is_empty() {
            glite_bail!("glite::ShaderProgram", Error::InvalidResource, "Vertex shader {} is empty", vertex_path);
        }
        if fragment_source.trim().is_empty() {
            glite_bail!("glite::ShaderProgram", Error::InvalidResource, "Fragment shader {} is empty", fragment_path);
        }
        Ok(Self::with_config(ctx, &vertex_source, &fragment_source, config))
    }

    // ===== COMPILATION =====

    fn compile(&mut self) {
        self.state = ProgramState::Uncompiled;
        self.log.clear();
        self.uniforms.clear();
        self.uniform_names.clear();
        self.attributes.clear();
        self.attribute_names.clear();
        self.uniform_lookups.clear();
        self.attribute_lookups.clear();

        self.vertex_shader = self.load_shader(gl::VERTEX_SHADER);
        self.fragment_shader = self.load_shader(gl::FRAGMENT_SHADER);
        if self.vertex_shader == 0 || self.fragment_shader == 0 {
            self.state = ProgramState::Failed;
            glite_error!("glite::ShaderProgram", "Shader compilation failed:\n{}", self.log);
            return;
        }

        self.program = self.link_program();
        if self.program == 0 {
            self.state = ProgramState::Failed;
            glite_error!("glite::ShaderProgram", "Program link failed:\n{}", self.log);
            return;
        }

        self.fetch_attributes();
        self.fetch_uniforms();
        self.state = ProgramState::Linked;
        glite_debug!(
            "glite::ShaderProgram",
            "Linked program {} ({} attributes, {} uniforms)",
            self.program,
            self.attribute_names.len(),
            self.uniform_names.len()
        );
    }

    /// Compile one stage; 0 on failure with the stage log appended
    fn load_shader(&mut self, kind: GLenum) -> Handle {
        let (label, source) = if kind == gl::VERTEX_SHADER {
            ("Vertex shader:\n", &self.vertex_source)
        } else {
            ("Fragment shader:\n", &self.fragment_source)
        };

        let mut device = self.ctx.device();
        let shader = device.create_shader(kind);
        if shader == 0 {
            self.log.push_str(label);
            self.log.push_str("could not create shader object\n");
            return 0;
        }

        device.shader_source(shader, source);
        device.compile_shader(shader);
        if !device.shader_compile_status(shader) {
            let info = device.shader_info_log(shader);
            device.delete_shader(shader);
            self.log.push_str(label);
            self.log.push_str(&info);
            if !info.ends_with('\n') {
                self.log.push('\n');
            }
            return 0;
        }
        shader
    }

    /// Link both stages; 0 on failure with the driver log kept
    fn link_program(&mut self) -> Handle {
        let mut device = self.ctx.device();
        let program = device.create_program();
        if program == 0 {
            self.log = "could not create program object".to_string();
            return 0;
        }

        device.attach_shader(program, self.vertex_shader);
        device.attach_shader(program, self.fragment_shader);
        device.link_program(program);
        if !device.program_link_status(program) {
            self.log = device.program_info_log(program);
            device.delete_program(program);
            return 0;
        }
        program
    }

    fn fetch_attributes(&mut self) {
        let mut device = self.ctx.device();
        let count = device.active_attribute_count(self.program);
        for index in 0..count {
            let variable = device.active_attribute(self.program, index);
            let location = device.get_attrib_location(self.program, &variable.name);
            self.attributes.insert(
                variable.name.clone(),
                VariableInfo {
                    location,
                    kind: variable.kind,
                    size: variable.size,
                },
            );
            self.attribute_names.push(variable.name);
        }
    }

    fn fetch_uniforms(&mut self) {
        let mut device = self.ctx.device();
        let count = device.active_uniform_count(self.program);
        for index in 0..count {
            let variable = device.active_uniform(self.program, index);
            let location = device.get_uniform_location(self.program, &variable.name);
            self.uniforms.insert(
                variable.name.clone(),
                VariableInfo {
                    location,
                    kind: variable.kind,
                    size: variable.size,
                },
            );
            self.uniform_names.push(variable.name);
        }
    }

    /// Recompile from the retained sources if the context was lost
    pub(crate) fn ensure_valid(&mut self) {
        if self.state == ProgramState::Invalidated {
            glite_debug!("glite::ShaderProgram", "Recompiling invalidated program");
            self.compile();
        }
    }

    // ===== STATE =====

    pub fn state(&self) -> ProgramState {
        self.state
    }

    /// Whether compile and link succeeded
    pub fn is_compiled(&self) -> bool {
        matches!(self.state, ProgramState::Linked | ProgramState::Invalidated)
    }

    /// Compile/link diagnostics; refreshed from the driver once linked
    pub fn log(&self) -> String {
        if self.state == ProgramState::Linked {
            self.ctx.device().program_info_log(self.program)
        } else {
            self.log.clone()
        }
    }

    pub fn handle(&self) -> Handle {
        self.program
    }

    pub fn is_pedantic(&self) -> bool {
        self.pedantic
    }

    pub fn set_pedantic(&mut self, pedantic: bool) {
        self.pedantic = pedantic;
    }

    /// Vertex source as compiled (prefix included)
    pub fn vertex_source(&self) -> &str {
        &self.vertex_source
    }

    /// Fragment source as compiled (prefix included)
    pub fn fragment_source(&self) -> &str {
        &self.fragment_source
    }

    // ===== LOCATION LOOKUP =====

    /// Uniform location via the lookup cache, honoring `pedantic`
    pub fn fetch_uniform_location(&mut self, name: &str) -> Result<Option<i32>> {
        self.fetch_uniform_location_with(name, self.pedantic)
    }

    /// Uniform location via the lookup cache
    ///
    /// `Ok(None)` for an unknown uniform, or an error when `pedantic`.
    pub fn fetch_uniform_location_with(&mut self, name: &str, pedantic: bool) -> Result<Option<i32>> {
        let location = match self.uniform_lookups.get(name) {
            Some(&location) => location,
            None => {
                let location = self.ctx.device().get_uniform_location(self.program, name);
                self.uniform_lookups.insert(name.to_string(), location);
                location
            }
        };

        if location >= 0 {
            Ok(Some(location))
        } else if pedantic {
            Err(glite_err!(
                "glite::ShaderProgram",
                Error::InvalidResource,
                "No uniform with name '{}' in shader",
                name
            ))
        } else {
            Ok(None)
        }
    }

    /// Attribute location via the lookup cache; `None` when not active
    pub fn fetch_attribute_location(&mut self, name: &str) -> Option<i32> {
        let location = match self.attribute_lookups.get(name) {
            Some(&location) => location,
            None => {
                let location = self.ctx.device().get_attrib_location(self.program, name);
                self.attribute_lookups.insert(name.to_string(), location);
                location
            }
        };
        (location >= 0).then_some(location)
    }

    fn resolve_uniform(&mut self, uniform: VariableRef<'_>) -> Result<Option<i32>> {
        self.ensure_valid();
        match uniform {
            VariableRef::Location(location) => Ok(Some(location)),
            VariableRef::Name(name) => self.fetch_uniform_location(name),
        }
    }

    fn resolve_attribute(&mut self, attribute: VariableRef<'_>) -> Option<u32> {
        self.ensure_valid();
        let location = match attribute {
            VariableRef::Location(location) => location,
            VariableRef::Name(name) => self.fetch_attribute_location(name)?,
        };
        u32::try_from(location).ok()
    }

    // ===== ACTIVE VARIABLES =====

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// GL type of an active attribute, 0 if unknown
    pub fn attribute_type(&self, name: &str) -> GLenum {
        self.attributes.get(name).map_or(0, |info| info.kind)
    }

    /// Location of an active attribute, -1 if unknown
    pub fn attribute_location(&self, name: &str) -> i32 {
        self.attributes.get(name).map_or(-1, |info| info.location)
    }

    /// Array size of an active attribute, 0 if unknown
    pub fn attribute_size(&self, name: &str) -> i32 {
        self.attributes.get(name).map_or(0, |info| info.size)
    }

    pub fn has_uniform(&self, name: &str) -> bool {
        self.uniforms.contains_key(name)
    }

    /// GL type of an active uniform, 0 if unknown
    pub fn uniform_type(&self, name: &str) -> GLenum {
        self.uniforms.get(name).map_or(0, |info| info.kind)
    }

    /// Location of an active uniform, -1 if unknown
    pub fn uniform_location(&self, name: &str) -> i32 {
        self.uniforms.get(name).map_or(-1, |info| info.location)
    }

    /// Array size of an active uniform, 0 if unknown
    pub fn uniform_size(&self, name: &str) -> i32 {
        self.uniforms.get(name).map_or(0, |info| info.size)
    }

    /// Active attribute names in driver order
    pub fn attribute_names(&self) -> &[String] {
        &self.attribute_names
    }

    /// Active uniform names in driver order
    pub fn uniform_names(&self) -> &[String] {
        &self.uniform_names
    }

    // ===== BINDING =====

    /// Make the program current, recompiling first after a context loss
    pub fn begin(&mut self) {
        self.ensure_valid();
        self.ctx.device().use_program(self.program);
    }

    pub fn end(&mut self) {
        self.ctx.device().use_program(0);
    }

    // ===== UNIFORMS =====

    pub fn set_uniform_i<'a>(&mut self, uniform: impl Into<VariableRef<'a>>, x: i32) -> Result<()> {
        if let Some(location) = self.resolve_uniform(uniform.into())? {
            self.ctx.device().uniform_1i(location, x);
        }
        Ok(())
    }

    pub fn set_uniform_2i<'a>(&mut self, uniform: impl Into<VariableRef<'a>>, x: i32, y: i32) -> Result<()> {
        if let Some(location) = self.resolve_uniform(uniform.into())? {
            self.ctx.device().uniform_2i(location, x, y);
        }
        Ok(())
    }

    pub fn set_uniform_3i<'a>(&mut self, uniform: impl Into<VariableRef<'a>>, x: i32, y: i32, z: i32) -> Result<()> {
        if let Some(location) = self.resolve_uniform(uniform.into())? {
            self.ctx.device().uniform_3i(location, x, y, z);
        }
        Ok(())
    }

    pub fn set_uniform_4i<'a>(
        &mut self,
        uniform: impl Into<VariableRef<'a>>,
        x: i32,
        y: i32,
        z: i32,
        w: i32,
    ) -> Result<()> {
        if let Some(location) = self.resolve_uniform(uniform.into())? {
            self.ctx.device().uniform_4i(location, x, y, z, w);
        }
        Ok(())
    }

    pub fn set_uniform_f<'a>(&mut self, uniform: impl Into<VariableRef<'a>>, x: f32) -> Result<()> {
        if let Some(location) = self.resolve_uniform(uniform.into())? {
            self.ctx.device().uniform_1f(location, x);
        }
        Ok(())
    }

    pub fn set_uniform_2f<'a>(&mut self, uniform: impl Into<VariableRef<'a>>, x: f32, y: f32) -> Result<()> {
        if let Some(location) = self.resolve_uniform(uniform.into())? {
            self.ctx.device().uniform_2f(location, x, y);
        }
        Ok(())
    }

    pub fn set_uniform_3f<'a>(&mut self, uniform: impl Into<VariableRef<'a>>, x: f32, y: f32, z: f32) -> Result<()> {
        if let Some(location) = self.resolve_uniform(uniform.into())? {
            self.ctx.device().uniform_3f(location, x, y, z);
        }
        Ok(())
    }

    pub fn set_uniform_4f<'a>(
        &mut self,
        uniform: impl Into<VariableRef<'a>>,
        x: f32,
        y: f32,
        z: f32,
        w: f32,
    ) -> Result<()> {
        if let Some(location) = self.resolve_uniform(uniform.into())? {
            self.ctx.device().uniform_4f(location, x, y, z, w);
        }
        Ok(())
    }

    pub fn set_uniform_vec2<'a>(&mut self, uniform: impl Into<VariableRef<'a>>, value: Vec2) -> Result<()> {
        self.set_uniform_2f(uniform, value.x, value.y)
    }

    pub fn set_uniform_vec3<'a>(&mut self, uniform: impl Into<VariableRef<'a>>, value: Vec3) -> Result<()> {
        self.set_uniform_3f(uniform, value.x, value.y, value.z)
    }

    /// Also used for RGBA colors
    pub fn set_uniform_vec4<'a>(&mut self, uniform: impl Into<VariableRef<'a>>, value: Vec4) -> Result<()> {
        self.set_uniform_4f(uniform, value.x, value.y, value.z, value.w)
    }

    /// `float[]` uniform
    pub fn set_uniform_1fv<'a>(&mut self, uniform: impl Into<VariableRef<'a>>, values: &[f32]) -> Result<()> {
        if let Some(location) = self.resolve_uniform(uniform.into())? {
            self.ctx.device().uniform_1fv(location, values);
        }
        Ok(())
    }

    /// `vec2[]` uniform, two floats per element
    pub fn set_uniform_2fv<'a>(&mut self, uniform: impl Into<VariableRef<'a>>, values: &[f32]) -> Result<()> {
        if let Some(location) = self.resolve_uniform(uniform.into())? {
            self.ctx.device().uniform_2fv(location, values);
        }
        Ok(())
    }

    /// `vec3[]` uniform, three floats per element
    pub fn set_uniform_3fv<'a>(&mut self, uniform: impl Into<VariableRef<'a>>, values: &[f32]) -> Result<()> {
        if let Some(location) = self.resolve_uniform(uniform.into())? {
            self.ctx.device().uniform_3fv(location, values);
        }
        Ok(())
    }

    /// `vec4[]` uniform, four floats per element
    pub fn set_uniform_4fv<'a>(&mut self, uniform: impl Into<VariableRef<'a>>, values: &[f32]) -> Result<()> {
        if let Some(location) = self.resolve_uniform(uniform.into())? {
            self.ctx.device().uniform_4fv(location, values);
        }
        Ok(())
    }

    pub fn set_uniform_mat3<'a>(
        &mut self,
        uniform: impl Into<VariableRef<'a>>,
        matrix: &Mat3,
        transpose: bool,
    ) -> Result<()> {
        if let Some(location) = self.resolve_uniform(uniform.into())? {
            self.ctx
                .device()
                .uniform_matrix3fv(location, transpose, &matrix.to_cols_array());
        }
        Ok(())
    }

    pub fn set_uniform_mat4<'a>(
        &mut self,
        uniform: impl Into<VariableRef<'a>>,
        matrix: &Mat4,
        transpose: bool,
    ) -> Result<()> {
        if let Some(location) = self.resolve_uniform(uniform.into())? {
            self.ctx
                .device()
                .uniform_matrix4fv(location, transpose, &matrix.to_cols_array());
        }
        Ok(())
    }

    /// `mat4[]` uniform, e.g. a bone palette
    pub fn set_uniform_mat4_array<'a>(
        &mut self,
        uniform: impl Into<VariableRef<'a>>,
        matrices: &[Mat4],
        transpose: bool,
    ) -> Result<()> {
        if let Some(location) = self.resolve_uniform(uniform.into())? {
            let values: &[f32] = bytemuck::cast_slice(matrices);
            self.ctx.device().uniform_matrix4fv(location, transpose, values);
        }
        Ok(())
    }

    // ===== VERTEX ATTRIBUTES =====

    /// Point an attribute into the bound ARRAY_BUFFER; unknown names are skipped
    pub fn set_vertex_attribute<'a>(
        &mut self,
        attribute: impl Into<VariableRef<'a>>,
        size: i32,
        data_type: GLenum,
        normalize: bool,
        stride: i32,
        offset: usize,
    ) {
        if let Some(location) = self.resolve_attribute(attribute.into()) {
            self.ctx
                .device()
                .vertex_attrib_pointer(location, size, data_type, normalize, stride, offset);
        }
    }

    /// Point an attribute into client memory; unknown names are skipped
    pub fn set_vertex_attribute_client<'a>(
        &mut self,
        attribute: impl Into<VariableRef<'a>>,
        size: i32,
        data_type: GLenum,
        normalize: bool,
        stride: i32,
        data: &[u8],
    ) {
        if let Some(location) = self.resolve_attribute(attribute.into()) {
            self.ctx
                .device()
                .vertex_attrib_pointer_client(location, size, data_type, normalize, stride, data);
        }
    }

    pub fn enable_vertex_attribute<'a>(&mut self, attribute: impl Into<VariableRef<'a>>) {
        if let Some(location) = self.resolve_attribute(attribute.into()) {
            self.ctx.device().enable_vertex_attrib_array(location);
        }
    }

    pub fn disable_vertex_attribute<'a>(&mut self, attribute: impl Into<VariableRef<'a>>) {
        if let Some(location) = self.resolve_attribute(attribute.into()) {
            self.ctx.device().disable_vertex_attrib_array(location);
        }
    }

    /// Constant value for an attribute with no array enabled
    pub fn set_attribute_f(&mut self, name: &str, x: f32, y: f32, z: f32, w: f32) {
        if let Some(location) = self.resolve_attribute(VariableRef::Name(name)) {
            self.ctx.device().vertex_attrib_4f(location, x, y, z, w);
        }
    }

    // ===== DISPOSAL =====

    /// Delete the program and both stages; idempotent
    pub fn dispose(&mut self) {
        if self.program == 0 && self.vertex_shader == 0 && self.fragment_shader == 0 {
            return;
        }

        let mut device = self.ctx.device();
        device.use_program(0);
        for shader in [self.vertex_shader, self.fragment_shader] {
            if shader != 0 {
                device.delete_shader(shader);
            }
        }
        if self.program != 0 {
            device.delete_program(self.program);
        }
        self.vertex_shader = 0;
        self.fragment_shader = 0;
        self.program = 0;
    }
}

impl Managed for ShaderProgram {
    /// Handles are stale; the program recompiles on its next stateful call
    ///
    /// A failed program stays failed.
    fn invalidate(&mut self) -> Result<()> {
        if self.is_compiled() {
            self.state = ProgramState::Invalidated;
        }
        Ok(())
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for ShaderProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("program", &self.program)
            .field("state", &self.state)
            .field("attributes", &self.attribute_names)
            .field("uniforms", &self.uniform_names)
            .finish()
    }
}

#[cfg(test)]
#[path = "shader_program_tests.rs"]
mod tests;
