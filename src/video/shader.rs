use std::fmt;
use std::fs;
use std::path::Path;

use gl::types::GLuint;

use crate::errors::*;

use super::backends::ShaderParameter;
use super::handle::RawHandle;
use super::Context;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
    TessControl,
    TessEvaluation,
    Compute,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            ShaderStage::Vertex => "vertex shader",
            ShaderStage::Fragment => "fragment shader",
            ShaderStage::Geometry => "geometry shader",
            ShaderStage::TessControl => "tessellation control shader",
            ShaderStage::TessEvaluation => "tessellation evaluation shader",
            ShaderStage::Compute => "compute shader",
        };

        write!(f, "{}", name)
    }
}

/// An owned shader object of a single pipeline stage.
#[derive(Debug)]
pub struct Shader {
    ctx: Context,
    handle: RawHandle,
    stage: ShaderStage,
}

impl Shader {
    pub fn new(ctx: &Context, stage: ShaderStage) -> Self {
        let id = ctx.visitor().create_shader(stage);
        Shader {
            ctx: ctx.clone(),
            handle: RawHandle::owned(id),
            stage,
        }
    }

    /// Creates a shader and compiles `src` into it.
    pub fn with_source(ctx: &Context, stage: ShaderStage, src: &str) -> Result<Self> {
        let shader = Shader::new(ctx, stage);
        shader.set_source(src);
        shader.compile()?;
        Ok(shader)
    }

    /// Creates a shader and compiles the content of the file at `path` into it.
    pub fn from_file<P: AsRef<Path>>(ctx: &Context, stage: ShaderStage, path: P) -> Result<Self> {
        let src = fs::read_to_string(path)?;
        Shader::with_source(ctx, stage, &src)
    }

    /// Wraps an existing shader name without taking the ownership of it.
    pub fn from_raw(ctx: &Context, id: GLuint, stage: ShaderStage) -> Self {
        Shader {
            ctx: ctx.clone(),
            handle: RawHandle::borrowed(id),
            stage,
        }
    }

    #[inline]
    pub fn id(&self) -> GLuint {
        self.handle.id()
    }

    pub fn is_valid(&self) -> bool {
        self.id() != 0 && self.ctx.visitor().is_shader(self.id())
    }

    #[inline]
    pub fn is_owned(&self) -> bool {
        self.handle.is_owned()
    }

    #[inline]
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn set_source(&self, src: &str) {
        self.ctx.visitor().shader_source(self.id(), src);
    }

    pub fn set_source_from_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let src = fs::read_to_string(path)?;
        self.set_source(&src);
        Ok(())
    }

    /// Compiles the attached source. The info log of the driver is returned as
    /// part of the error if the compilation fails.
    pub fn compile(&self) -> Result<()> {
        self.ctx.visitor().compile_shader(self.id());

        if !self.compile_status() {
            let log = self.info_log();
            warn!("Failed to compile {}({}): {}", self.stage, self.id(), log);
            return Err(Error::ShaderCompileFailure(self.stage, log));
        }

        Ok(())
    }

    pub fn compile_status(&self) -> bool {
        self.parameter(ShaderParameter::CompileStatus) != 0
    }

    pub fn delete_status(&self) -> bool {
        self.parameter(ShaderParameter::DeleteStatus) != 0
    }

    pub fn info_log_length(&self) -> usize {
        self.parameter(ShaderParameter::InfoLogLength).max(0) as usize
    }

    pub fn info_log(&self) -> String {
        self.ctx.visitor().shader_info_log(self.id())
    }

    pub fn source_length(&self) -> usize {
        self.parameter(ShaderParameter::SourceLength).max(0) as usize
    }

    pub fn source(&self) -> String {
        self.ctx.visitor().get_shader_source(self.id())
    }

    pub fn take(&mut self) -> Shader {
        Shader {
            ctx: self.ctx.clone(),
            handle: self.handle.take(),
            stage: self.stage,
        }
    }

    pub fn into_raw(mut self) -> GLuint {
        self.handle.disown()
    }

    fn parameter(&self, param: ShaderParameter) -> i32 {
        self.ctx.visitor().shader_parameter(self.id(), param)
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        if let Some(id) = self.handle.release() {
            self.ctx.visitor().delete_shader(id);
        }
    }
}
