//! The backend of the toolbox, which should be responsible for only one thing:
//! forwarding object and draw commands to the low-level graphics driver.
//!
//! Every method maps onto one (or a couple of) driver entry points. Object names
//! are plain `GLuint`s, and `0` always means "nothing".

pub mod headless;

#[cfg(not(target_arch = "wasm32"))]
pub mod gl;

use std::os::raw::c_void;

use ::gl::types::{GLint, GLuint};

use crate::errors::*;

use super::buffer::{BufferHint, BufferTarget};
use super::framebuffer::{Attachment, FramebufferStatus, FramebufferTarget};
use super::shader::ShaderStage;
use super::texture::{
    PixelFormat, PixelLayout, PixelType, TextureDimensions, TextureFilter, TextureTarget,
    TextureWrap,
};
use super::uniform::UniformVariable;
use super::vertex_array::{AttributeFormat, IndexFormat, Primitive};
use super::Viewport;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ShaderParameter {
    CompileStatus,
    DeleteStatus,
    InfoLogLength,
    SourceLength,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProgramParameter {
    LinkStatus,
    DeleteStatus,
    AttachedShaders,
    ActiveAttributes,
    ActiveUniforms,
    InfoLogLength,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextureParameter {
    MinFilter(TextureFilter),
    MagFilter(TextureFilter),
    WrapS(TextureWrap),
    WrapT(TextureWrap),
    WrapR(TextureWrap),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StringName {
    Version,
    ShadingLanguageVersion,
}

pub trait Visitor {
    fn create_buffer(&self) -> GLuint;
    fn delete_buffer(&self, id: GLuint);
    fn is_buffer(&self, id: GLuint) -> bool;
    fn bind_buffer(&self, target: BufferTarget, id: GLuint);
    /// (Re)allocates the storage of the buffer bound to `target` with `len` bytes,
    /// optionally initialized from `data`.
    fn buffer_data(&self, target: BufferTarget, len: usize, data: Option<&[u8]>, hint: BufferHint);
    fn buffer_sub_data(&self, target: BufferTarget, offset: usize, data: &[u8]);
    fn get_buffer_sub_data(&self, target: BufferTarget, offset: usize, data: &mut [u8]);
    fn buffer_size(&self, target: BufferTarget) -> usize;

    fn create_shader(&self, stage: ShaderStage) -> GLuint;
    fn delete_shader(&self, id: GLuint);
    fn is_shader(&self, id: GLuint) -> bool;
    fn shader_source(&self, id: GLuint, src: &str);
    fn compile_shader(&self, id: GLuint);
    fn shader_parameter(&self, id: GLuint, param: ShaderParameter) -> GLint;
    fn shader_info_log(&self, id: GLuint) -> String;
    fn get_shader_source(&self, id: GLuint) -> String;

    fn create_program(&self) -> GLuint;
    fn delete_program(&self, id: GLuint);
    fn is_program(&self, id: GLuint) -> bool;
    fn attach_shader(&self, program: GLuint, shader: GLuint);
    fn detach_shader(&self, program: GLuint, shader: GLuint);
    fn link_program(&self, id: GLuint);
    fn use_program(&self, id: GLuint);
    fn program_parameter(&self, id: GLuint, param: ProgramParameter) -> GLint;
    fn program_info_log(&self, id: GLuint) -> String;
    /// Returns -1 if `name` is not an active attribute of the linked program.
    fn attribute_location(&self, program: GLuint, name: &str) -> GLint;
    /// Returns -1 if `name` is not an active uniform of the linked program.
    fn uniform_location(&self, program: GLuint, name: &str) -> GLint;
    /// Sets a uniform value of the program currently in use.
    fn uniform(&self, location: GLint, variable: &UniformVariable);

    fn create_texture(&self) -> GLuint;
    fn delete_texture(&self, id: GLuint);
    fn is_texture(&self, id: GLuint) -> bool;
    fn active_texture(&self, unit: u32);
    fn bind_texture(&self, target: TextureTarget, id: GLuint);
    fn tex_parameter(&self, target: TextureTarget, param: TextureParameter);
    fn tex_image(
        &self,
        target: TextureTarget,
        dimensions: TextureDimensions,
        layout: PixelLayout,
        data: Option<&[u8]>,
    );
    fn get_tex_image(
        &self,
        target: TextureTarget,
        format: PixelFormat,
        ty: PixelType,
        data: &mut [u8],
    );
    fn generate_mipmap(&self, target: TextureTarget);
    fn unpack_alignment(&self, value: i32);
    fn pack_alignment(&self, value: i32);
    fn get_unpack_alignment(&self) -> i32;
    fn get_pack_alignment(&self) -> i32;

    fn create_framebuffer(&self) -> GLuint;
    fn delete_framebuffer(&self, id: GLuint);
    fn is_framebuffer(&self, id: GLuint) -> bool;
    fn bind_framebuffer(&self, target: FramebufferTarget, id: GLuint);
    fn framebuffer_texture_2d(
        &self,
        target: FramebufferTarget,
        attachment: Attachment,
        textarget: TextureTarget,
        texture: GLuint,
    );
    fn check_framebuffer_status(&self, target: FramebufferTarget) -> FramebufferStatus;

    fn create_vertex_array(&self) -> GLuint;
    fn delete_vertex_array(&self, id: GLuint);
    fn is_vertex_array(&self, id: GLuint) -> bool;
    fn bind_vertex_array(&self, id: GLuint);
    fn enable_vertex_attribute(&self, location: GLuint);
    fn disable_vertex_attribute(&self, location: GLuint);
    /// Sources the attribute at `location` from the buffer currently bound to
    /// `BufferTarget::Vertex`.
    fn vertex_attribute_pointer(&self, location: GLuint, format: &AttributeFormat);
    fn vertex_attribute_divisor(&self, location: GLuint, divisor: u32);

    fn draw_arrays(&self, primitive: Primitive, first: usize, count: usize, instances: Option<usize>);
    /// Draws `count` indices starting at index `first` of the bound index buffer.
    fn draw_elements(
        &self,
        primitive: Primitive,
        format: IndexFormat,
        first: usize,
        count: usize,
        instances: Option<usize>,
    );

    fn viewport(&self) -> Viewport;
    fn set_viewport(&self, viewport: Viewport);
    /// Toggles the `src_alpha, 1 - src_alpha` blending used by the text renderer.
    fn set_blend(&self, enabled: bool);
    fn get_string(&self, name: StringName) -> String;

    /// Drains the driver error flag.
    fn check(&self) -> Result<()>;
}

/// Creates a visitor that forwards to the OpenGL functions resolved by `loader`.
///
/// # Safety
///
/// A GL context must be current on the calling thread, and stay current for as long
/// as the returned visitor is in use.
#[cfg(not(target_arch = "wasm32"))]
pub unsafe fn new<F>(loader: F) -> Result<Box<dyn Visitor>>
where
    F: FnMut(&str) -> *const c_void,
{
    ::gl::load_with(loader);
    let visitor = self::gl::visitor::GLVisitor::new()?;
    Ok(Box::new(visitor))
}

pub fn new_headless() -> Box<dyn Visitor> {
    Box::new(self::headless::HeadlessVisitor::new())
}
