//! A driver that keeps every object in memory.
//!
//! Buffers and textures store their bytes, shaders "compile" by scanning their
//! source for `in` and `uniform` declarations, and draw calls are recorded instead
//! of rasterized. Misuse, like writing to an unbound buffer, raises the error flag
//! that `check` drains, the way a real driver would.

use std::cell::RefCell;
use std::collections::HashMap;

use gl::types::{GLint, GLuint};

use crate::errors::*;
use crate::video::buffer::{BufferHint, BufferTarget};
use crate::video::framebuffer::{Attachment, FramebufferStatus, FramebufferTarget};
use crate::video::shader::ShaderStage;
use crate::video::texture::{
    bytes_per_pixel, row_stride, PixelFormat, PixelLayout, PixelType, TextureDimensions,
    TextureTarget,
};
use crate::video::uniform::UniformVariable;
use crate::video::vertex_array::{AttributeFormat, IndexFormat, Primitive};
use crate::video::Viewport;

use super::{ProgramParameter, ShaderParameter, StringName, TextureParameter, Visitor};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Buffer,
    Shader,
    Program,
    Texture,
    Framebuffer,
    VertexArray,
}

/// A recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub primitive: Primitive,
    pub program: GLuint,
    pub vertex_array: GLuint,
    pub first: usize,
    pub count: usize,
    pub instances: Option<usize>,
    /// The indices read from the bound index buffer. `None` for array draws.
    pub indices: Option<Vec<u32>>,
    /// The uniform values of the program in use, by name.
    pub uniforms: HashMap<String, UniformVariable>,
    pub blend: bool,
}

/// The state of a vertex attribute slot of a vertex array.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct AttributeState {
    pub enabled: bool,
    pub buffer: GLuint,
    pub format: Option<AttributeFormat>,
    pub divisor: u32,
}

#[derive(Debug, Default)]
struct BufferData {
    bytes: Vec<u8>,
    hint: Option<BufferHint>,
    writes: usize,
}

#[derive(Debug)]
struct ShaderData {
    stage: ShaderStage,
    source: String,
    compiled: bool,
    log: String,
    inputs: Vec<String>,
    uniforms: Vec<String>,
}

#[derive(Debug, Default)]
struct ProgramData {
    shaders: Vec<GLuint>,
    linked: bool,
    log: String,
    attributes: Vec<String>,
    uniforms: Vec<String>,
    values: HashMap<GLint, UniformVariable>,
}

#[derive(Debug, Default)]
struct TextureData {
    dimensions: Option<TextureDimensions>,
    layout: PixelLayout,
    bytes: Vec<u8>,
    parameters: Vec<TextureParameter>,
    mipmaps: bool,
}

#[derive(Debug, Default)]
struct FramebufferData {
    attachments: HashMap<Attachment, GLuint>,
}

#[derive(Debug, Default)]
struct VertexArrayData {
    index_buffer: GLuint,
    attributes: HashMap<GLuint, AttributeState>,
}

#[derive(Debug)]
struct State {
    next_id: GLuint,
    buffers: HashMap<GLuint, BufferData>,
    shaders: HashMap<GLuint, ShaderData>,
    programs: HashMap<GLuint, ProgramData>,
    textures: HashMap<GLuint, TextureData>,
    framebuffers: HashMap<GLuint, FramebufferData>,
    vertex_arrays: HashMap<GLuint, VertexArrayData>,
    deleted: HashMap<ObjectKind, usize>,

    bound_buffers: HashMap<BufferTarget, GLuint>,
    bound_textures: HashMap<(u32, TextureTarget), GLuint>,
    active_unit: u32,
    draw_framebuffer: GLuint,
    read_framebuffer: GLuint,
    vertex_array: GLuint,
    program: GLuint,

    viewport: Viewport,
    blend: bool,
    unpack_alignment: i32,
    pack_alignment: i32,
    draws: Vec<DrawCall>,
    error: Option<String>,
}

impl State {
    fn new() -> Self {
        let mut vertex_arrays = HashMap::new();
        // The default vertex array.
        vertex_arrays.insert(0, VertexArrayData::default());

        State {
            next_id: 1,
            buffers: HashMap::new(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
            textures: HashMap::new(),
            framebuffers: HashMap::new(),
            vertex_arrays,
            deleted: HashMap::new(),
            bound_buffers: HashMap::new(),
            bound_textures: HashMap::new(),
            active_unit: 0,
            draw_framebuffer: 0,
            read_framebuffer: 0,
            vertex_array: 0,
            program: 0,
            viewport: Viewport::new(0, 0, 800, 600),
            blend: false,
            unpack_alignment: 4,
            pack_alignment: 4,
            draws: Vec::new(),
            error: None,
        }
    }

    fn generate(&mut self) -> GLuint {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Raises the error flag. Like a driver, only the first error is kept until
    /// it is drained.
    fn raise(&mut self, err: String) {
        debug!("[Headless] {}", err);
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    fn deleted(&mut self, kind: ObjectKind) {
        *self.deleted.entry(kind).or_insert(0) += 1;
    }

    fn bound_buffer(&self, target: BufferTarget) -> GLuint {
        if target == BufferTarget::Index {
            if let Some(vao) = self.vertex_arrays.get(&self.vertex_array) {
                return vao.index_buffer;
            }
        }

        self.bound_buffers.get(&target).cloned().unwrap_or(0)
    }

    fn bound_buffer_data(&mut self, target: BufferTarget) -> Option<&mut BufferData> {
        let id = self.bound_buffer(target);
        if id == 0 {
            self.raise(format!("INVALID_OPERATION: no buffer is bound to {:?}.", target));
            return None;
        }

        self.buffers.get_mut(&id)
    }

    fn bound_texture(&self, target: TextureTarget) -> GLuint {
        self.bound_textures
            .get(&(self.active_unit, target.binding()))
            .cloned()
            .unwrap_or(0)
    }

    fn bound_texture_data(&mut self, target: TextureTarget) -> Option<&mut TextureData> {
        let id = self.bound_texture(target);
        if id == 0 {
            self.raise(format!("INVALID_OPERATION: no texture is bound to {:?}.", target));
            return None;
        }

        self.textures.get_mut(&id)
    }

    fn bound_framebuffer(&self, target: FramebufferTarget) -> GLuint {
        match target {
            FramebufferTarget::Framebuffer | FramebufferTarget::Draw => self.draw_framebuffer,
            FramebufferTarget::Read => self.read_framebuffer,
        }
    }

    fn attribute_mut(&mut self, location: GLuint) -> Option<&mut AttributeState> {
        let vao = self.vertex_arrays.get_mut(&self.vertex_array)?;
        Some(vao.attributes.entry(location).or_insert_with(Default::default))
    }

    fn record(
        &mut self,
        primitive: Primitive,
        first: usize,
        count: usize,
        instances: Option<usize>,
        indices: Option<Vec<u32>>,
    ) {
        if self.program == 0 {
            self.raise("INVALID_OPERATION: no program is in use.".into());
            return;
        }

        let uniforms: HashMap<String, UniformVariable> = match self.programs.get(&self.program) {
            Some(program) => program
                .values
                .iter()
                .filter_map(|(&location, &v)| {
                    program
                        .uniforms
                        .get(location as usize)
                        .map(|name| (name.clone(), v))
                })
                .collect(),
            None => HashMap::new(),
        };

        self.draws.push(DrawCall {
            primitive,
            program: self.program,
            vertex_array: self.vertex_array,
            first,
            count,
            instances,
            indices,
            uniforms,
            blend: self.blend,
        });
    }
}

pub struct HeadlessVisitor {
    state: RefCell<State>,
}

impl Default for HeadlessVisitor {
    fn default() -> Self {
        HeadlessVisitor::new()
    }
}

impl HeadlessVisitor {
    pub fn new() -> Self {
        HeadlessVisitor {
            state: RefCell::new(State::new()),
        }
    }

    /// The number of live objects of `kind`.
    pub fn num_alive(&self, kind: ObjectKind) -> usize {
        let state = self.state.borrow();
        match kind {
            ObjectKind::Buffer => state.buffers.len(),
            ObjectKind::Shader => state.shaders.len(),
            ObjectKind::Program => state.programs.len(),
            ObjectKind::Texture => state.textures.len(),
            ObjectKind::Framebuffer => state.framebuffers.len(),
            // Not counting the default one.
            ObjectKind::VertexArray => state.vertex_arrays.len() - 1,
        }
    }

    /// The number of objects of `kind` that have been deleted so far.
    pub fn num_deleted(&self, kind: ObjectKind) -> usize {
        self.state.borrow().deleted.get(&kind).cloned().unwrap_or(0)
    }

    pub fn buffer_data(&self, id: GLuint) -> Option<Vec<u8>> {
        self.state.borrow().buffers.get(&id).map(|v| v.bytes.clone())
    }

    pub fn buffer_hint(&self, id: GLuint) -> Option<BufferHint> {
        self.state.borrow().buffers.get(&id).and_then(|v| v.hint)
    }

    /// How many times the data store of buffer `id` has been written.
    pub fn buffer_writes(&self, id: GLuint) -> usize {
        self.state
            .borrow()
            .buffers
            .get(&id)
            .map(|v| v.writes)
            .unwrap_or(0)
    }

    pub fn bound_buffer(&self, target: BufferTarget) -> GLuint {
        self.state.borrow().bound_buffer(target)
    }

    pub fn texture_data(&self, id: GLuint) -> Option<Vec<u8>> {
        self.state.borrow().textures.get(&id).map(|v| v.bytes.clone())
    }

    pub fn texture_dimensions(&self, id: GLuint) -> Option<TextureDimensions> {
        self.state.borrow().textures.get(&id).and_then(|v| v.dimensions)
    }

    pub fn texture_layout(&self, id: GLuint) -> Option<PixelLayout> {
        self.state.borrow().textures.get(&id).map(|v| v.layout)
    }

    pub fn texture_parameters(&self, id: GLuint) -> Vec<TextureParameter> {
        self.state
            .borrow()
            .textures
            .get(&id)
            .map(|v| v.parameters.clone())
            .unwrap_or_default()
    }

    pub fn has_mipmaps(&self, id: GLuint) -> bool {
        self.state
            .borrow()
            .textures
            .get(&id)
            .map(|v| v.mipmaps)
            .unwrap_or(false)
    }

    pub fn bound_texture(&self, unit: u32, target: TextureTarget) -> GLuint {
        self.state
            .borrow()
            .bound_textures
            .get(&(unit, target.binding()))
            .cloned()
            .unwrap_or(0)
    }

    pub fn active_unit(&self) -> u32 {
        self.state.borrow().active_unit
    }

    pub fn unpack_alignment_value(&self) -> i32 {
        self.state.borrow().unpack_alignment
    }

    pub fn pack_alignment_value(&self) -> i32 {
        self.state.borrow().pack_alignment
    }

    pub fn attached_shaders(&self, program: GLuint) -> Vec<GLuint> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|v| v.shaders.clone())
            .unwrap_or_default()
    }

    /// The last value pushed to the uniform `name` of `program`.
    pub fn program_uniform(&self, program: GLuint, name: &str) -> Option<UniformVariable> {
        let state = self.state.borrow();
        let program = state.programs.get(&program)?;
        let location = program.uniforms.iter().position(|v| v == name)?;
        program.values.get(&(location as GLint)).cloned()
    }

    pub fn current_program(&self) -> GLuint {
        self.state.borrow().program
    }

    pub fn current_vertex_array(&self) -> GLuint {
        self.state.borrow().vertex_array
    }

    pub fn attribute_state(&self, vao: GLuint, location: GLuint) -> Option<AttributeState> {
        self.state
            .borrow()
            .vertex_arrays
            .get(&vao)
            .and_then(|v| v.attributes.get(&location).cloned())
    }

    pub fn vertex_array_index_buffer(&self, vao: GLuint) -> GLuint {
        self.state
            .borrow()
            .vertex_arrays
            .get(&vao)
            .map(|v| v.index_buffer)
            .unwrap_or(0)
    }

    pub fn framebuffer_attachment(&self, id: GLuint, attachment: Attachment) -> GLuint {
        self.state
            .borrow()
            .framebuffers
            .get(&id)
            .and_then(|v| v.attachments.get(&attachment).cloned())
            .unwrap_or(0)
    }

    pub fn bound_framebuffer(&self, target: FramebufferTarget) -> GLuint {
        self.state.borrow().bound_framebuffer(target)
    }

    pub fn blend_enabled(&self) -> bool {
        self.state.borrow().blend
    }

    pub fn draws(&self) -> Vec<DrawCall> {
        self.state.borrow().draws.clone()
    }

    pub fn clear_draws(&self) {
        self.state.borrow_mut().draws.clear();
    }
}

impl Visitor for HeadlessVisitor {
    fn create_buffer(&self) -> GLuint {
        let mut state = self.state.borrow_mut();
        let id = state.generate();
        state.buffers.insert(id, BufferData::default());
        id
    }

    fn delete_buffer(&self, id: GLuint) {
        let mut state = self.state.borrow_mut();
        if state.buffers.remove(&id).is_some() {
            state.deleted(ObjectKind::Buffer);
            state.bound_buffers.retain(|_, v| *v != id);
            for vao in state.vertex_arrays.values_mut() {
                if vao.index_buffer == id {
                    vao.index_buffer = 0;
                }
            }
        }
    }

    fn is_buffer(&self, id: GLuint) -> bool {
        self.state.borrow().buffers.contains_key(&id)
    }

    fn bind_buffer(&self, target: BufferTarget, id: GLuint) {
        let mut state = self.state.borrow_mut();
        if id != 0 && !state.buffers.contains_key(&id) {
            state.raise(format!("INVALID_VALUE: buffer {} does not exist.", id));
            return;
        }

        if target == BufferTarget::Index {
            let current = state.vertex_array;
            if let Some(vao) = state.vertex_arrays.get_mut(&current) {
                vao.index_buffer = id;
            }
        }

        state.bound_buffers.insert(target, id);
    }

    fn buffer_data(&self, target: BufferTarget, len: usize, data: Option<&[u8]>, hint: BufferHint) {
        let mut state = self.state.borrow_mut();
        if let Some(buffer) = state.bound_buffer_data(target) {
            buffer.bytes = match data {
                Some(bytes) => bytes[..len.min(bytes.len())].to_vec(),
                None => vec![0; len],
            };
            buffer.bytes.resize(len, 0);
            buffer.hint = Some(hint);
            buffer.writes += 1;
        }
    }

    fn buffer_sub_data(&self, target: BufferTarget, offset: usize, data: &[u8]) {
        let mut state = self.state.borrow_mut();
        let overflow = match state.bound_buffer_data(target) {
            Some(buffer) if offset + data.len() <= buffer.bytes.len() => {
                buffer.bytes[offset..offset + data.len()].copy_from_slice(data);
                buffer.writes += 1;
                false
            }
            Some(_) => true,
            None => false,
        };

        if overflow {
            state.raise("INVALID_VALUE: sub data out of the buffer range.".into());
        }
    }

    fn get_buffer_sub_data(&self, target: BufferTarget, offset: usize, data: &mut [u8]) {
        let mut state = self.state.borrow_mut();
        let overflow = match state.bound_buffer_data(target) {
            Some(buffer) if offset + data.len() <= buffer.bytes.len() => {
                data.copy_from_slice(&buffer.bytes[offset..offset + data.len()]);
                false
            }
            Some(_) => true,
            None => false,
        };

        if overflow {
            state.raise("INVALID_VALUE: sub data out of the buffer range.".into());
        }
    }

    fn buffer_size(&self, target: BufferTarget) -> usize {
        let mut state = self.state.borrow_mut();
        state
            .bound_buffer_data(target)
            .map(|v| v.bytes.len())
            .unwrap_or(0)
    }

    fn create_shader(&self, stage: ShaderStage) -> GLuint {
        let mut state = self.state.borrow_mut();
        let id = state.generate();
        state.shaders.insert(
            id,
            ShaderData {
                stage,
                source: String::new(),
                compiled: false,
                log: String::new(),
                inputs: Vec::new(),
                uniforms: Vec::new(),
            },
        );
        id
    }

    fn delete_shader(&self, id: GLuint) {
        let mut state = self.state.borrow_mut();
        if state.shaders.remove(&id).is_some() {
            state.deleted(ObjectKind::Shader);
        }
    }

    fn is_shader(&self, id: GLuint) -> bool {
        self.state.borrow().shaders.contains_key(&id)
    }

    fn shader_source(&self, id: GLuint, src: &str) {
        let mut state = self.state.borrow_mut();
        match state.shaders.get_mut(&id) {
            Some(shader) => shader.source = src.to_owned(),
            None => state.raise(format!("INVALID_VALUE: shader {} does not exist.", id)),
        }
    }

    fn compile_shader(&self, id: GLuint) {
        let mut state = self.state.borrow_mut();
        let shader = match state.shaders.get_mut(&id) {
            Some(shader) => shader,
            None => {
                state.raise(format!("INVALID_VALUE: shader {} does not exist.", id));
                return;
            }
        };

        let src = strip_comments(&shader.source);
        if src.contains("main") {
            shader.compiled = true;
            shader.log.clear();
            shader.inputs = declarations(&src, "in");
            shader.uniforms = declarations(&src, "uniform");
        } else {
            shader.compiled = false;
            shader.log = "0:1(1): error: no function with name 'main'".to_owned();
            shader.inputs.clear();
            shader.uniforms.clear();
        }
    }

    fn shader_parameter(&self, id: GLuint, param: ShaderParameter) -> GLint {
        let mut state = self.state.borrow_mut();
        let value = state.shaders.get(&id).map(|shader| match param {
            ShaderParameter::CompileStatus => shader.compiled as GLint,
            ShaderParameter::DeleteStatus => 0,
            ShaderParameter::InfoLogLength => c_len(&shader.log),
            ShaderParameter::SourceLength => c_len(&shader.source),
        });

        value.unwrap_or_else(|| {
            state.raise(format!("INVALID_VALUE: shader {} does not exist.", id));
            0
        })
    }

    fn shader_info_log(&self, id: GLuint) -> String {
        self.state
            .borrow()
            .shaders
            .get(&id)
            .map(|v| v.log.clone())
            .unwrap_or_default()
    }

    fn get_shader_source(&self, id: GLuint) -> String {
        self.state
            .borrow()
            .shaders
            .get(&id)
            .map(|v| v.source.clone())
            .unwrap_or_default()
    }

    fn create_program(&self) -> GLuint {
        let mut state = self.state.borrow_mut();
        let id = state.generate();
        state.programs.insert(id, ProgramData::default());
        id
    }

    fn delete_program(&self, id: GLuint) {
        let mut state = self.state.borrow_mut();
        if state.programs.remove(&id).is_some() {
            state.deleted(ObjectKind::Program);
            if state.program == id {
                state.program = 0;
            }
        }
    }

    fn is_program(&self, id: GLuint) -> bool {
        self.state.borrow().programs.contains_key(&id)
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        let mut state = self.state.borrow_mut();
        if !state.shaders.contains_key(&shader) {
            state.raise(format!("INVALID_VALUE: shader {} does not exist.", shader));
            return;
        }

        let attached = state
            .programs
            .get(&program)
            .map(|v| v.shaders.contains(&shader));

        match attached {
            Some(true) => {
                state.raise(format!("INVALID_OPERATION: shader {} is already attached.", shader))
            }
            Some(false) => {
                if let Some(v) = state.programs.get_mut(&program) {
                    v.shaders.push(shader);
                }
            }
            None => state.raise(format!("INVALID_VALUE: program {} does not exist.", program)),
        }
    }

    fn detach_shader(&self, program: GLuint, shader: GLuint) {
        let mut state = self.state.borrow_mut();
        if let Some(v) = state.programs.get_mut(&program) {
            v.shaders.retain(|&id| id != shader);
        }
    }

    fn link_program(&self, id: GLuint) {
        let state = &mut *self.state.borrow_mut();
        let program = match state.programs.get_mut(&id) {
            Some(program) => program,
            None => {
                state.raise(format!("INVALID_VALUE: program {} does not exist.", id));
                return;
            }
        };

        let shaders = &state.shaders;
        let stages: Vec<&ShaderData> = program
            .shaders
            .iter()
            .filter_map(|v| shaders.get(v))
            .collect();

        let has = |stage| stages.iter().any(|v| v.stage == stage);
        let log = if stages.iter().any(|v| !v.compiled) {
            Some("error: an attached shader has not been compiled successfully.")
        } else if !(has(ShaderStage::Compute) || (has(ShaderStage::Vertex) && has(ShaderStage::Fragment))) {
            Some("error: linking requires both a vertex and a fragment shader.")
        } else {
            None
        };

        program.values.clear();
        program.attributes.clear();
        program.uniforms.clear();

        if let Some(log) = log {
            program.linked = false;
            program.log = log.to_owned();
            return;
        }

        for stage in &stages {
            if stage.stage == ShaderStage::Vertex {
                program.attributes.extend(stage.inputs.iter().cloned());
            }

            for name in &stage.uniforms {
                if !program.uniforms.contains(name) {
                    program.uniforms.push(name.clone());
                }
            }
        }

        program.linked = true;
        program.log.clear();
    }

    fn use_program(&self, id: GLuint) {
        let mut state = self.state.borrow_mut();
        let linked = state.programs.get(&id).map(|v| v.linked);
        match linked {
            _ if id == 0 => state.program = 0,
            Some(true) => state.program = id,
            Some(false) => state.raise(format!("INVALID_OPERATION: program {} is not linked.", id)),
            None => state.raise(format!("INVALID_VALUE: program {} does not exist.", id)),
        }
    }

    fn program_parameter(&self, id: GLuint, param: ProgramParameter) -> GLint {
        let mut state = self.state.borrow_mut();
        let value = state.programs.get(&id).map(|program| match param {
            ProgramParameter::LinkStatus => program.linked as GLint,
            ProgramParameter::DeleteStatus => 0,
            ProgramParameter::AttachedShaders => program.shaders.len() as GLint,
            ProgramParameter::ActiveAttributes => program.attributes.len() as GLint,
            ProgramParameter::ActiveUniforms => program.uniforms.len() as GLint,
            ProgramParameter::InfoLogLength => c_len(&program.log),
        });

        value.unwrap_or_else(|| {
            state.raise(format!("INVALID_VALUE: program {} does not exist.", id));
            0
        })
    }

    fn program_info_log(&self, id: GLuint) -> String {
        self.state
            .borrow()
            .programs
            .get(&id)
            .map(|v| v.log.clone())
            .unwrap_or_default()
    }

    fn attribute_location(&self, program: GLuint, name: &str) -> GLint {
        self.state
            .borrow()
            .programs
            .get(&program)
            .filter(|v| v.linked)
            .and_then(|v| v.attributes.iter().position(|n| n == name))
            .map(|v| v as GLint)
            .unwrap_or(-1)
    }

    fn uniform_location(&self, program: GLuint, name: &str) -> GLint {
        self.state
            .borrow()
            .programs
            .get(&program)
            .filter(|v| v.linked)
            .and_then(|v| v.uniforms.iter().position(|n| n == name))
            .map(|v| v as GLint)
            .unwrap_or(-1)
    }

    fn uniform(&self, location: GLint, variable: &UniformVariable) {
        let mut state = self.state.borrow_mut();
        if location < 0 {
            return;
        }

        let current = state.program;
        match state.programs.get_mut(&current) {
            Some(program) => {
                program.values.insert(location, *variable);
            }
            None => state.raise("INVALID_OPERATION: no program is in use.".into()),
        }
    }

    fn create_texture(&self) -> GLuint {
        let mut state = self.state.borrow_mut();
        let id = state.generate();
        state.textures.insert(id, TextureData::default());
        id
    }

    fn delete_texture(&self, id: GLuint) {
        let mut state = self.state.borrow_mut();
        if state.textures.remove(&id).is_some() {
            state.deleted(ObjectKind::Texture);
            state.bound_textures.retain(|_, v| *v != id);
            for fb in state.framebuffers.values_mut() {
                fb.attachments.retain(|_, v| *v != id);
            }
        }
    }

    fn is_texture(&self, id: GLuint) -> bool {
        self.state.borrow().textures.contains_key(&id)
    }

    fn active_texture(&self, unit: u32) {
        self.state.borrow_mut().active_unit = unit;
    }

    fn bind_texture(&self, target: TextureTarget, id: GLuint) {
        let mut state = self.state.borrow_mut();
        if id != 0 && !state.textures.contains_key(&id) {
            state.raise(format!("INVALID_VALUE: texture {} does not exist.", id));
            return;
        }

        let unit = state.active_unit;
        state.bound_textures.insert((unit, target.binding()), id);
    }

    fn tex_parameter(&self, target: TextureTarget, param: TextureParameter) {
        let mut state = self.state.borrow_mut();
        if let Some(texture) = state.bound_texture_data(target) {
            texture.parameters.push(param);
        }
    }

    fn tex_image(
        &self,
        target: TextureTarget,
        dimensions: TextureDimensions,
        layout: PixelLayout,
        data: Option<&[u8]>,
    ) {
        let state = &mut *self.state.borrow_mut();
        let alignment = state.unpack_alignment as usize;
        if let Some(texture) = state.bound_texture_data(target) {
            let (w, h, d) = dimensions.extent();
            let row = w as usize * layout.bytes_per_pixel();
            let stride = row_stride(row, alignment).unwrap_or(row);

            // Stored without the row padding of the client-side pixels.
            texture.bytes = vec![0; row * h as usize * d as usize];
            if let Some(bytes) = data {
                for (i, dst) in texture.bytes.chunks_mut(row.max(1)).enumerate() {
                    let start = (i * stride).min(bytes.len());
                    let end = (start + dst.len()).min(bytes.len());
                    dst[..end - start].copy_from_slice(&bytes[start..end]);
                }
            }

            texture.dimensions = Some(dimensions);
            texture.layout = layout;
            texture.mipmaps = false;
        }
    }

    fn get_tex_image(&self, target: TextureTarget, format: PixelFormat, ty: PixelType, data: &mut [u8]) {
        let state = &mut *self.state.borrow_mut();
        let alignment = state.pack_alignment as usize;
        if let Some(texture) = state.bound_texture_data(target) {
            let (w, _, _) = texture.dimensions.map(|v| v.extent()).unwrap_or((0, 0, 0));
            let row = w as usize * bytes_per_pixel(format, ty);
            let stride = row_stride(row, alignment).unwrap_or(row);

            for (i, src) in texture.bytes.chunks(row.max(1)).enumerate() {
                let start = (i * stride).min(data.len());
                let end = (start + src.len()).min(data.len());
                data[start..end].copy_from_slice(&src[..end - start]);
            }
        }
    }

    fn generate_mipmap(&self, target: TextureTarget) {
        let mut state = self.state.borrow_mut();
        if let Some(texture) = state.bound_texture_data(target) {
            texture.mipmaps = true;
        }
    }

    fn unpack_alignment(&self, value: i32) {
        let mut state = self.state.borrow_mut();
        match value {
            1 | 2 | 4 | 8 => state.unpack_alignment = value,
            _ => state.raise(format!("INVALID_VALUE: unpack alignment {}.", value)),
        }
    }

    fn pack_alignment(&self, value: i32) {
        let mut state = self.state.borrow_mut();
        match value {
            1 | 2 | 4 | 8 => state.pack_alignment = value,
            _ => state.raise(format!("INVALID_VALUE: pack alignment {}.", value)),
        }
    }

    fn get_unpack_alignment(&self) -> i32 {
        self.state.borrow().unpack_alignment
    }

    fn get_pack_alignment(&self) -> i32 {
        self.state.borrow().pack_alignment
    }

    fn create_framebuffer(&self) -> GLuint {
        let mut state = self.state.borrow_mut();
        let id = state.generate();
        state.framebuffers.insert(id, FramebufferData::default());
        id
    }

    fn delete_framebuffer(&self, id: GLuint) {
        let mut state = self.state.borrow_mut();
        if state.framebuffers.remove(&id).is_some() {
            state.deleted(ObjectKind::Framebuffer);
            if state.draw_framebuffer == id {
                state.draw_framebuffer = 0;
            }

            if state.read_framebuffer == id {
                state.read_framebuffer = 0;
            }
        }
    }

    fn is_framebuffer(&self, id: GLuint) -> bool {
        self.state.borrow().framebuffers.contains_key(&id)
    }

    fn bind_framebuffer(&self, target: FramebufferTarget, id: GLuint) {
        let mut state = self.state.borrow_mut();
        if id != 0 && !state.framebuffers.contains_key(&id) {
            state.raise(format!("INVALID_VALUE: framebuffer {} does not exist.", id));
            return;
        }

        match target {
            FramebufferTarget::Framebuffer => {
                state.draw_framebuffer = id;
                state.read_framebuffer = id;
            }
            FramebufferTarget::Draw => state.draw_framebuffer = id,
            FramebufferTarget::Read => state.read_framebuffer = id,
        }
    }

    fn framebuffer_texture_2d(
        &self,
        target: FramebufferTarget,
        attachment: Attachment,
        _: TextureTarget,
        texture: GLuint,
    ) {
        let mut state = self.state.borrow_mut();
        let id = state.bound_framebuffer(target);
        if id == 0 {
            state.raise("INVALID_OPERATION: the default framebuffer is bound.".into());
            return;
        }

        if let Some(fb) = state.framebuffers.get_mut(&id) {
            if texture == 0 {
                fb.attachments.remove(&attachment);
            } else {
                fb.attachments.insert(attachment, texture);
            }
        }
    }

    fn check_framebuffer_status(&self, target: FramebufferTarget) -> FramebufferStatus {
        let state = self.state.borrow();
        let id = state.bound_framebuffer(target);
        let fb = match state.framebuffers.get(&id) {
            Some(fb) => fb,
            None => return FramebufferStatus::Complete,
        };

        if fb.attachments.is_empty() {
            return FramebufferStatus::IncompleteMissingAttachment;
        }

        let incomplete = fb.attachments.values().any(|v| {
            match state.textures.get(v).and_then(|t| t.dimensions) {
                Some(dims) => dims.num_pixels() == 0,
                None => true,
            }
        });

        if incomplete {
            FramebufferStatus::IncompleteAttachment
        } else {
            FramebufferStatus::Complete
        }
    }

    fn create_vertex_array(&self) -> GLuint {
        let mut state = self.state.borrow_mut();
        let id = state.generate();
        state.vertex_arrays.insert(id, VertexArrayData::default());
        id
    }

    fn delete_vertex_array(&self, id: GLuint) {
        let mut state = self.state.borrow_mut();
        if id != 0 && state.vertex_arrays.remove(&id).is_some() {
            state.deleted(ObjectKind::VertexArray);
            if state.vertex_array == id {
                state.vertex_array = 0;
            }
        }
    }

    fn is_vertex_array(&self, id: GLuint) -> bool {
        id != 0 && self.state.borrow().vertex_arrays.contains_key(&id)
    }

    fn bind_vertex_array(&self, id: GLuint) {
        let mut state = self.state.borrow_mut();
        if !state.vertex_arrays.contains_key(&id) {
            state.raise(format!("INVALID_OPERATION: vertex array {} does not exist.", id));
            return;
        }

        state.vertex_array = id;
    }

    fn enable_vertex_attribute(&self, location: GLuint) {
        let mut state = self.state.borrow_mut();
        if let Some(attribute) = state.attribute_mut(location) {
            attribute.enabled = true;
        }
    }

    fn disable_vertex_attribute(&self, location: GLuint) {
        let mut state = self.state.borrow_mut();
        if let Some(attribute) = state.attribute_mut(location) {
            attribute.enabled = false;
        }
    }

    fn vertex_attribute_pointer(&self, location: GLuint, format: &AttributeFormat) {
        let mut state = self.state.borrow_mut();
        let buffer = state.bound_buffer(BufferTarget::Vertex);
        if buffer == 0 {
            state.raise("INVALID_OPERATION: no buffer is bound to Vertex.".into());
            return;
        }

        if let Some(attribute) = state.attribute_mut(location) {
            attribute.buffer = buffer;
            attribute.format = Some(*format);
        }
    }

    fn vertex_attribute_divisor(&self, location: GLuint, divisor: u32) {
        let mut state = self.state.borrow_mut();
        if let Some(attribute) = state.attribute_mut(location) {
            attribute.divisor = divisor;
        }
    }

    fn draw_arrays(&self, primitive: Primitive, first: usize, count: usize, instances: Option<usize>) {
        self.state
            .borrow_mut()
            .record(primitive, first, count, instances, None);
    }

    fn draw_elements(
        &self,
        primitive: Primitive,
        format: IndexFormat,
        first: usize,
        count: usize,
        instances: Option<usize>,
    ) {
        let mut state = self.state.borrow_mut();
        let id = state.bound_buffer(BufferTarget::Index);
        let indices = state
            .buffers
            .get(&id)
            .and_then(|v| decode_indices(&v.bytes, format, first, count));

        match indices {
            Some(indices) => state.record(primitive, first, count, instances, Some(indices)),
            None => state.raise("INVALID_OPERATION: indices out of the index buffer.".into()),
        }
    }

    fn viewport(&self) -> Viewport {
        self.state.borrow().viewport
    }

    fn set_viewport(&self, viewport: Viewport) {
        self.state.borrow_mut().viewport = viewport;
    }

    fn set_blend(&self, enabled: bool) {
        self.state.borrow_mut().blend = enabled;
    }

    fn get_string(&self, name: StringName) -> String {
        match name {
            StringName::Version => "3.3 (Core Profile) Headless".to_owned(),
            StringName::ShadingLanguageVersion => "3.30".to_owned(),
        }
    }

    fn check(&self) -> Result<()> {
        match self.state.borrow_mut().error.take() {
            Some(err) => Err(Error::Backend(err)),
            None => Ok(()),
        }
    }
}

/// The length of `s` as reported by the driver, including the terminating null.
fn c_len(s: &str) -> GLint {
    if s.is_empty() {
        0
    } else {
        s.len() as GLint + 1
    }
}

fn strip_comments(src: &str) -> String {
    src.lines()
        .map(|line| line.split("//").next().unwrap_or(""))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collects the names declared with `qualifier`, e.g. `uniform vec2 scale;`.
fn declarations(src: &str, qualifier: &str) -> Vec<String> {
    let mut names = Vec::new();
    for statement in src.split(|c| c == ';' || c == '{' || c == '}') {
        let tokens: Vec<&str> = statement.split_whitespace().collect();
        let name = tokens
            .iter()
            .position(|v| *v == qualifier)
            .and_then(|i| tokens.get(i + 2));

        if let Some(name) = name {
            let name = name.split('[').next().unwrap_or(name).to_owned();
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }

    names
}

fn decode_indices(bytes: &[u8], format: IndexFormat, first: usize, count: usize) -> Option<Vec<u32>> {
    let size = format.size();
    let start = first * size;
    let end = start + count * size;
    if end > bytes.len() {
        return None;
    }

    let indices = bytes[start..end]
        .chunks(size)
        .map(|v| match format {
            IndexFormat::U8 => u32::from(v[0]),
            IndexFormat::U16 => u32::from(u16::from_ne_bytes([v[0], v[1]])),
            IndexFormat::U32 => u32::from_ne_bytes([v[0], v[1], v[2], v[3]]),
        })
        .collect();

    Some(indices)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn declarations_of_source() {
        let src = r#"
            #version 330 core
            // in vec2 commented;
            layout(location = 0) in vec2 position;
            in vec4 color;
            uniform mat4 transform;
            uniform float weights[4];
            out vec4 fragment;
            void main(void) { gl_Position = transform * vec4(position, 0.0, 1.0); }
        "#;

        let src = strip_comments(src);
        assert_eq!(declarations(&src, "in"), vec!["position", "color"]);
        assert_eq!(declarations(&src, "uniform"), vec!["transform", "weights"]);
    }

    #[test]
    fn decode() {
        let bytes: Vec<u8> = [1u16, 2, 3, 4]
            .iter()
            .flat_map(|v| v.to_ne_bytes().to_vec())
            .collect();

        assert_eq!(
            decode_indices(&bytes, IndexFormat::U16, 1, 2),
            Some(vec![2, 3])
        );
        assert_eq!(decode_indices(&bytes, IndexFormat::U16, 3, 2), None);
        assert_eq!(
            decode_indices(&[7, 8], IndexFormat::U8, 0, 2),
            Some(vec![7, 8])
        );
    }

    #[test]
    fn error_flag() {
        let visitor = HeadlessVisitor::new();
        Visitor::buffer_data(&visitor, BufferTarget::Vertex, 4, None, BufferHint::Dynamic);
        assert!(visitor.check().is_err());
        assert!(visitor.check().is_ok());
    }
}
