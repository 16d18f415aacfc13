use std::ffi::CString;
use std::os::raw::c_void;
use std::ptr;

use gl::types::*;

use crate::errors::*;
use crate::video::backends::{
    ProgramParameter, ShaderParameter, StringName, TextureParameter, Visitor,
};
use crate::video::buffer::{BufferHint, BufferTarget};
use crate::video::framebuffer::{Attachment, FramebufferStatus, FramebufferTarget};
use crate::video::shader::ShaderStage;
use crate::video::texture::{PixelFormat, PixelLayout, PixelType, TextureDimensions, TextureTarget};
use crate::video::uniform::UniformVariable;
use crate::video::vertex_array::{AttributeFormat, IndexFormat, Primitive};
use crate::video::Viewport;

use super::capabilities::{get_string, Capabilities};

/// Forwards every command to the OpenGL functions of the current context.
pub struct GLVisitor {
    capabilities: Capabilities,
}

impl GLVisitor {
    /// # Safety
    ///
    /// The GL functions must have been loaded, and belong to the context that is
    /// current on the calling thread.
    pub unsafe fn new() -> Result<Self> {
        let capabilities = Capabilities::parse()?;
        info!("GLVisitor {:#?}", capabilities);
        capabilities.check()?;

        Ok(GLVisitor { capabilities })
    }

    #[inline]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }
}

impl Visitor for GLVisitor {
    fn create_buffer(&self) -> GLuint {
        let mut id = 0;
        unsafe { gl::GenBuffers(1, &mut id) };
        id
    }

    fn delete_buffer(&self, id: GLuint) {
        unsafe { gl::DeleteBuffers(1, &id) };
    }

    fn is_buffer(&self, id: GLuint) -> bool {
        unsafe { gl::IsBuffer(id) == gl::TRUE }
    }

    fn bind_buffer(&self, target: BufferTarget, id: GLuint) {
        unsafe { gl::BindBuffer(target.into(), id) };
    }

    fn buffer_data(&self, target: BufferTarget, len: usize, data: Option<&[u8]>, hint: BufferHint) {
        let ptr = data.map(|v| v.as_ptr() as *const c_void).unwrap_or(ptr::null());
        unsafe { gl::BufferData(target.into(), len as GLsizeiptr, ptr, hint.into()) };
    }

    fn buffer_sub_data(&self, target: BufferTarget, offset: usize, data: &[u8]) {
        unsafe {
            gl::BufferSubData(
                target.into(),
                offset as GLintptr,
                data.len() as GLsizeiptr,
                data.as_ptr() as *const c_void,
            )
        };
    }

    fn get_buffer_sub_data(&self, target: BufferTarget, offset: usize, data: &mut [u8]) {
        unsafe {
            gl::GetBufferSubData(
                target.into(),
                offset as GLintptr,
                data.len() as GLsizeiptr,
                data.as_mut_ptr() as *mut c_void,
            )
        };
    }

    fn buffer_size(&self, target: BufferTarget) -> usize {
        let mut size = 0;
        unsafe { gl::GetBufferParameteriv(target.into(), gl::BUFFER_SIZE, &mut size) };
        size.max(0) as usize
    }

    fn create_shader(&self, stage: ShaderStage) -> GLuint {
        unsafe { gl::CreateShader(stage.into()) }
    }

    fn delete_shader(&self, id: GLuint) {
        unsafe { gl::DeleteShader(id) };
    }

    fn is_shader(&self, id: GLuint) -> bool {
        unsafe { gl::IsShader(id) == gl::TRUE }
    }

    fn shader_source(&self, id: GLuint, src: &str) {
        let ptr = src.as_ptr() as *const GLchar;
        let len = src.len() as GLint;
        unsafe { gl::ShaderSource(id, 1, &ptr, &len) };
    }

    fn compile_shader(&self, id: GLuint) {
        unsafe { gl::CompileShader(id) };
    }

    fn shader_parameter(&self, id: GLuint, param: ShaderParameter) -> GLint {
        let pname = match param {
            ShaderParameter::CompileStatus => gl::COMPILE_STATUS,
            ShaderParameter::DeleteStatus => gl::DELETE_STATUS,
            ShaderParameter::InfoLogLength => gl::INFO_LOG_LENGTH,
            ShaderParameter::SourceLength => gl::SHADER_SOURCE_LENGTH,
        };

        let mut value = 0;
        unsafe { gl::GetShaderiv(id, pname, &mut value) };
        value
    }

    fn shader_info_log(&self, id: GLuint) -> String {
        let len = self.shader_parameter(id, ShaderParameter::InfoLogLength);
        read_string(len, |capacity, written, buf| unsafe {
            gl::GetShaderInfoLog(id, capacity, written, buf)
        })
    }

    fn get_shader_source(&self, id: GLuint) -> String {
        let len = self.shader_parameter(id, ShaderParameter::SourceLength);
        read_string(len, |capacity, written, buf| unsafe {
            gl::GetShaderSource(id, capacity, written, buf)
        })
    }

    fn create_program(&self) -> GLuint {
        unsafe { gl::CreateProgram() }
    }

    fn delete_program(&self, id: GLuint) {
        unsafe { gl::DeleteProgram(id) };
    }

    fn is_program(&self, id: GLuint) -> bool {
        unsafe { gl::IsProgram(id) == gl::TRUE }
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe { gl::AttachShader(program, shader) };
    }

    fn detach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe { gl::DetachShader(program, shader) };
    }

    fn link_program(&self, id: GLuint) {
        unsafe { gl::LinkProgram(id) };
    }

    fn use_program(&self, id: GLuint) {
        unsafe { gl::UseProgram(id) };
    }

    fn program_parameter(&self, id: GLuint, param: ProgramParameter) -> GLint {
        let pname = match param {
            ProgramParameter::LinkStatus => gl::LINK_STATUS,
            ProgramParameter::DeleteStatus => gl::DELETE_STATUS,
            ProgramParameter::AttachedShaders => gl::ATTACHED_SHADERS,
            ProgramParameter::ActiveAttributes => gl::ACTIVE_ATTRIBUTES,
            ProgramParameter::ActiveUniforms => gl::ACTIVE_UNIFORMS,
            ProgramParameter::InfoLogLength => gl::INFO_LOG_LENGTH,
        };

        let mut value = 0;
        unsafe { gl::GetProgramiv(id, pname, &mut value) };
        value
    }

    fn program_info_log(&self, id: GLuint) -> String {
        let len = self.program_parameter(id, ProgramParameter::InfoLogLength);
        read_string(len, |capacity, written, buf| unsafe {
            gl::GetProgramInfoLog(id, capacity, written, buf)
        })
    }

    fn attribute_location(&self, program: GLuint, name: &str) -> GLint {
        match CString::new(name) {
            Ok(c_name) => unsafe { gl::GetAttribLocation(program, c_name.as_ptr()) },
            Err(_) => -1,
        }
    }

    fn uniform_location(&self, program: GLuint, name: &str) -> GLint {
        match CString::new(name) {
            Ok(c_name) => unsafe { gl::GetUniformLocation(program, c_name.as_ptr()) },
            Err(_) => -1,
        }
    }

    fn uniform(&self, location: GLint, variable: &UniformVariable) {
        unsafe {
            match *variable {
                UniformVariable::I32(v) => gl::Uniform1i(location, v),
                UniformVariable::U32(v) => gl::Uniform1ui(location, v),
                UniformVariable::F32(v) => gl::Uniform1f(location, v),
                UniformVariable::F64(v) => gl::Uniform1d(location, v),
                UniformVariable::Vector2i(v) => gl::Uniform2iv(location, 1, v.as_ptr()),
                UniformVariable::Vector3i(v) => gl::Uniform3iv(location, 1, v.as_ptr()),
                UniformVariable::Vector4i(v) => gl::Uniform4iv(location, 1, v.as_ptr()),
                UniformVariable::Vector2u(v) => gl::Uniform2uiv(location, 1, v.as_ptr()),
                UniformVariable::Vector3u(v) => gl::Uniform3uiv(location, 1, v.as_ptr()),
                UniformVariable::Vector4u(v) => gl::Uniform4uiv(location, 1, v.as_ptr()),
                UniformVariable::Vector2f(v) => gl::Uniform2fv(location, 1, v.as_ptr()),
                UniformVariable::Vector3f(v) => gl::Uniform3fv(location, 1, v.as_ptr()),
                UniformVariable::Vector4f(v) => gl::Uniform4fv(location, 1, v.as_ptr()),
                UniformVariable::Matrix2f(v, transpose) => {
                    let transpose = if transpose { gl::TRUE } else { gl::FALSE };
                    gl::UniformMatrix2fv(location, 1, transpose, v[0].as_ptr())
                }
                UniformVariable::Matrix3f(v, transpose) => {
                    let transpose = if transpose { gl::TRUE } else { gl::FALSE };
                    gl::UniformMatrix3fv(location, 1, transpose, v[0].as_ptr())
                }
                UniformVariable::Matrix4f(v, transpose) => {
                    let transpose = if transpose { gl::TRUE } else { gl::FALSE };
                    gl::UniformMatrix4fv(location, 1, transpose, v[0].as_ptr())
                }
            }
        }
    }

    fn create_texture(&self) -> GLuint {
        let mut id = 0;
        unsafe { gl::GenTextures(1, &mut id) };
        id
    }

    fn delete_texture(&self, id: GLuint) {
        unsafe { gl::DeleteTextures(1, &id) };
    }

    fn is_texture(&self, id: GLuint) -> bool {
        unsafe { gl::IsTexture(id) == gl::TRUE }
    }

    fn active_texture(&self, unit: u32) {
        unsafe { gl::ActiveTexture(gl::TEXTURE0 + unit) };
    }

    fn bind_texture(&self, target: TextureTarget, id: GLuint) {
        unsafe { gl::BindTexture(target.into(), id) };
    }

    fn tex_parameter(&self, target: TextureTarget, param: TextureParameter) {
        let (pname, value): (GLenum, GLenum) = match param {
            TextureParameter::MinFilter(v) => (gl::TEXTURE_MIN_FILTER, v.into()),
            TextureParameter::MagFilter(v) => (gl::TEXTURE_MAG_FILTER, v.into()),
            TextureParameter::WrapS(v) => (gl::TEXTURE_WRAP_S, v.into()),
            TextureParameter::WrapT(v) => (gl::TEXTURE_WRAP_T, v.into()),
            TextureParameter::WrapR(v) => (gl::TEXTURE_WRAP_R, v.into()),
        };

        unsafe { gl::TexParameteri(target.into(), pname, value as GLint) };
    }

    fn tex_image(
        &self,
        target: TextureTarget,
        dimensions: TextureDimensions,
        layout: PixelLayout,
        data: Option<&[u8]>,
    ) {
        let internal: GLenum = layout.internal.into();
        let format: GLenum = layout.format.into();
        let ty: GLenum = layout.ty.into();
        let ptr = data.map(|v| v.as_ptr() as *const c_void).unwrap_or(ptr::null());

        unsafe {
            match dimensions {
                TextureDimensions::D1(w) => gl::TexImage1D(
                    target.into(),
                    0,
                    internal as GLint,
                    w as GLsizei,
                    0,
                    format,
                    ty,
                    ptr,
                ),
                TextureDimensions::D2(w, h) => gl::TexImage2D(
                    target.into(),
                    0,
                    internal as GLint,
                    w as GLsizei,
                    h as GLsizei,
                    0,
                    format,
                    ty,
                    ptr,
                ),
                TextureDimensions::D3(w, h, d) => gl::TexImage3D(
                    target.into(),
                    0,
                    internal as GLint,
                    w as GLsizei,
                    h as GLsizei,
                    d as GLsizei,
                    0,
                    format,
                    ty,
                    ptr,
                ),
            }
        }
    }

    fn get_tex_image(&self, target: TextureTarget, format: PixelFormat, ty: PixelType, data: &mut [u8]) {
        unsafe {
            gl::GetTexImage(
                target.into(),
                0,
                format.into(),
                ty.into(),
                data.as_mut_ptr() as *mut c_void,
            )
        };
    }

    fn generate_mipmap(&self, target: TextureTarget) {
        unsafe { gl::GenerateMipmap(target.into()) };
    }

    fn unpack_alignment(&self, value: i32) {
        unsafe { gl::PixelStorei(gl::UNPACK_ALIGNMENT, value) };
    }

    fn pack_alignment(&self, value: i32) {
        unsafe { gl::PixelStorei(gl::PACK_ALIGNMENT, value) };
    }

    fn get_unpack_alignment(&self) -> i32 {
        let mut value = 4;
        unsafe { gl::GetIntegerv(gl::UNPACK_ALIGNMENT, &mut value) };
        value
    }

    fn get_pack_alignment(&self) -> i32 {
        let mut value = 4;
        unsafe { gl::GetIntegerv(gl::PACK_ALIGNMENT, &mut value) };
        value
    }

    fn create_framebuffer(&self) -> GLuint {
        let mut id = 0;
        unsafe { gl::GenFramebuffers(1, &mut id) };
        id
    }

    fn delete_framebuffer(&self, id: GLuint) {
        unsafe { gl::DeleteFramebuffers(1, &id) };
    }

    fn is_framebuffer(&self, id: GLuint) -> bool {
        unsafe { gl::IsFramebuffer(id) == gl::TRUE }
    }

    fn bind_framebuffer(&self, target: FramebufferTarget, id: GLuint) {
        unsafe { gl::BindFramebuffer(target.into(), id) };
    }

    fn framebuffer_texture_2d(
        &self,
        target: FramebufferTarget,
        attachment: Attachment,
        textarget: TextureTarget,
        texture: GLuint,
    ) {
        unsafe {
            gl::FramebufferTexture2D(target.into(), attachment.into(), textarget.into(), texture, 0)
        };
    }

    fn check_framebuffer_status(&self, target: FramebufferTarget) -> FramebufferStatus {
        unsafe { gl::CheckFramebufferStatus(target.into()).into() }
    }

    fn create_vertex_array(&self) -> GLuint {
        let mut id = 0;
        unsafe { gl::GenVertexArrays(1, &mut id) };
        id
    }

    fn delete_vertex_array(&self, id: GLuint) {
        unsafe { gl::DeleteVertexArrays(1, &id) };
    }

    fn is_vertex_array(&self, id: GLuint) -> bool {
        unsafe { gl::IsVertexArray(id) == gl::TRUE }
    }

    fn bind_vertex_array(&self, id: GLuint) {
        unsafe { gl::BindVertexArray(id) };
    }

    fn enable_vertex_attribute(&self, location: GLuint) {
        unsafe { gl::EnableVertexAttribArray(location) };
    }

    fn disable_vertex_attribute(&self, location: GLuint) {
        unsafe { gl::DisableVertexAttribArray(location) };
    }

    fn vertex_attribute_pointer(&self, location: GLuint, format: &AttributeFormat) {
        let normalized = if format.normalized { gl::TRUE } else { gl::FALSE };
        unsafe {
            gl::VertexAttribPointer(
                location,
                format.size,
                format.format.into(),
                normalized,
                format.stride,
                format.offset as *const c_void,
            )
        };
    }

    fn vertex_attribute_divisor(&self, location: GLuint, divisor: u32) {
        unsafe { gl::VertexAttribDivisor(location, divisor) };
    }

    fn draw_arrays(&self, primitive: Primitive, first: usize, count: usize, instances: Option<usize>) {
        unsafe {
            match instances {
                Some(n) => gl::DrawArraysInstanced(
                    primitive.into(),
                    first as GLint,
                    count as GLsizei,
                    n as GLsizei,
                ),
                None => gl::DrawArrays(primitive.into(), first as GLint, count as GLsizei),
            }
        }
    }

    fn draw_elements(
        &self,
        primitive: Primitive,
        format: IndexFormat,
        first: usize,
        count: usize,
        instances: Option<usize>,
    ) {
        let offset = (first * format.size()) as *const c_void;
        unsafe {
            match instances {
                Some(n) => gl::DrawElementsInstanced(
                    primitive.into(),
                    count as GLsizei,
                    format.into(),
                    offset,
                    n as GLsizei,
                ),
                None => gl::DrawElements(primitive.into(), count as GLsizei, format.into(), offset),
            }
        }
    }

    fn viewport(&self) -> Viewport {
        let mut v: [GLint; 4] = [0; 4];
        unsafe { gl::GetIntegerv(gl::VIEWPORT, v.as_mut_ptr()) };
        v.into()
    }

    fn set_viewport(&self, viewport: Viewport) {
        unsafe { gl::Viewport(viewport.x, viewport.y, viewport.width, viewport.height) };
    }

    fn set_blend(&self, enabled: bool) {
        unsafe {
            if enabled {
                gl::Enable(gl::BLEND);
                gl::BlendFunc(gl::SRC_ALPHA, gl::ONE_MINUS_SRC_ALPHA);
            } else {
                gl::Disable(gl::BLEND);
            }
        }
    }

    fn get_string(&self, name: StringName) -> String {
        let name = match name {
            StringName::Version => gl::VERSION,
            StringName::ShadingLanguageVersion => gl::SHADING_LANGUAGE_VERSION,
        };

        unsafe { get_string(name).unwrap_or_default() }
    }

    fn check(&self) -> Result<()> {
        unsafe { check() }
    }
}

/// Reads a driver string of `len` bytes, including the terminating null.
fn read_string<F>(len: GLint, read: F) -> String
where
    F: FnOnce(GLsizei, *mut GLsizei, *mut GLchar),
{
    if len <= 0 {
        return String::new();
    }

    let mut buf = vec![0u8; len as usize];
    let mut written = 0;
    read(len, &mut written, buf.as_mut_ptr() as *mut GLchar);

    buf.truncate(written.max(0) as usize);
    String::from_utf8_lossy(&buf).into_owned()
}

unsafe fn check() -> Result<()> {
    let err = match gl::GetError() {
        gl::NO_ERROR => return Ok(()),
        gl::INVALID_ENUM => "[GL] An unacceptable value is specified for an enumerated argument.",
        gl::INVALID_VALUE => "[GL] A numeric argument is out of range.",
        gl::INVALID_OPERATION => {
            "[GL] The specified operation is not allowed in the current state."
        }
        gl::INVALID_FRAMEBUFFER_OPERATION => {
            "[GL] The command is trying to render to or read from the framebuffer while the \
             currently bound framebuffer is not framebuffer complete."
        }
        gl::OUT_OF_MEMORY => "[GL] There is not enough memory left to execute the command.",
        _ => "[GL] Oops, Unknown OpenGL error.",
    };

    Err(Error::Backend(err.to_owned()))
}
