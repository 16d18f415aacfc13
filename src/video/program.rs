//! Linked pipelines of shader stages, plus the registries of the attribute,
//! uniform and sampler names a program is used with.
//!
//! Names have to be registered after a successful `link`. Every registered name is
//! resolved again when the program is relinked, and names that are no longer active
//! are dropped from the registries.

use std::collections::HashMap;
use std::rc::Rc;

use gl::types::{GLint, GLuint};

use crate::errors::*;

use super::backends::{ProgramParameter, Visitor};
use super::handle::RawHandle;
use super::shader::{Shader, ShaderStage};
use super::uniform::{Uniform, UniformVariable};
use super::Context;

/// A sampler uniform, and the texture unit it reads from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Sampler {
    location: GLint,
    unit: u32,
}

impl Sampler {
    #[inline]
    pub fn location(&self) -> GLint {
        self.location
    }

    #[inline]
    pub fn unit(&self) -> u32 {
        self.unit
    }
}

#[derive(Debug)]
pub struct Program {
    ctx: Context,
    handle: RawHandle,
    shaders: HashMap<ShaderStage, Rc<Shader>>,
    attributes: HashMap<String, GLint>,
    uniforms: HashMap<String, Uniform>,
    samplers: HashMap<String, Sampler>,
}

impl Program {
    pub fn new(ctx: &Context) -> Self {
        let id = ctx.visitor().create_program();
        Program {
            ctx: ctx.clone(),
            handle: RawHandle::owned(id),
            shaders: HashMap::new(),
            attributes: HashMap::new(),
            uniforms: HashMap::new(),
            samplers: HashMap::new(),
        }
    }

    /// Compiles a vertex and a fragment stage from sources, and links them.
    pub fn with_sources(ctx: &Context, vs: &str, fs: &str) -> Result<Self> {
        let mut program = Program::new(ctx);
        program.attach_shader_source(ShaderStage::Vertex, vs)?;
        program.attach_shader_source(ShaderStage::Fragment, fs)?;
        program.link()?;
        Ok(program)
    }

    /// Wraps an existing program name without taking the ownership of it.
    pub fn from_raw(ctx: &Context, id: GLuint) -> Self {
        Program {
            ctx: ctx.clone(),
            handle: RawHandle::borrowed(id),
            shaders: HashMap::new(),
            attributes: HashMap::new(),
            uniforms: HashMap::new(),
            samplers: HashMap::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> GLuint {
        self.handle.id()
    }

    pub fn is_valid(&self) -> bool {
        self.id() != 0 && self.ctx.visitor().is_program(self.id())
    }

    #[inline]
    pub fn is_owned(&self) -> bool {
        self.handle.is_owned()
    }

    pub fn use_program(&self) {
        self.ctx.visitor().use_program(self.id());
    }

    pub fn unuse(&self) {
        self.ctx.visitor().use_program(0);
    }

    /// Attaches `shader` to its stage. The shader previously attached to the same
    /// stage, if any, is detached first.
    pub fn attach_shader<S: Into<Rc<Shader>>>(&mut self, shader: S) {
        let shader = shader.into();
        let stage = shader.stage();
        self.detach_shader(stage);

        self.ctx.visitor().attach_shader(self.id(), shader.id());
        self.shaders.insert(stage, shader);
    }

    /// Compiles `src` as a new shader of `stage` and attaches it.
    pub fn attach_shader_source(&mut self, stage: ShaderStage, src: &str) -> Result<()> {
        let shader = Shader::with_source(&self.ctx, stage, src)?;
        self.attach_shader(shader);
        Ok(())
    }

    pub fn detach_shader(&mut self, stage: ShaderStage) -> Option<Rc<Shader>> {
        let shader = self.shaders.remove(&stage)?;
        self.ctx.visitor().detach_shader(self.id(), shader.id());
        Some(shader)
    }

    pub fn shader(&self, stage: ShaderStage) -> Option<&Rc<Shader>> {
        self.shaders.get(&stage)
    }

    #[inline]
    pub fn has_shader(&self, stage: ShaderStage) -> bool {
        self.shaders.contains_key(&stage)
    }

    #[inline]
    pub fn num_shaders(&self) -> usize {
        self.shaders.len()
    }

    /// Links the attached stages. On success, every registered name is resolved
    /// against the new executable. On failure, the registries are cleared.
    pub fn link(&mut self) -> Result<()> {
        let id = self.id();
        let visitor = self.ctx.visitor();
        visitor.link_program(id);

        if !self.link_status() {
            let log = self.info_log();
            warn!("Failed to link program({}): {}", id, log);

            self.attributes.clear();
            self.uniforms.clear();
            self.samplers.clear();
            return Err(Error::ProgramLinkFailure(log));
        }

        self.attributes.retain(|name, location| {
            *location = visitor.attribute_location(id, name);
            resolved(id, "attribute", name, *location)
        });

        self.uniforms.retain(|name, uniform| {
            uniform.set_location(visitor.uniform_location(id, name));
            resolved(id, "uniform", name, uniform.location())
        });

        self.samplers.retain(|name, sampler| {
            sampler.location = visitor.uniform_location(id, name);
            resolved(id, "sampler", name, sampler.location)
        });

        info!(
            "Linked program({}) with {} stage(s).",
            id,
            self.shaders.len()
        );

        Ok(())
    }

    pub fn link_status(&self) -> bool {
        self.parameter(ProgramParameter::LinkStatus) != 0
    }

    pub fn delete_status(&self) -> bool {
        self.parameter(ProgramParameter::DeleteStatus) != 0
    }

    pub fn num_attached_shaders(&self) -> usize {
        self.parameter(ProgramParameter::AttachedShaders).max(0) as usize
    }

    pub fn num_active_attributes(&self) -> usize {
        self.parameter(ProgramParameter::ActiveAttributes).max(0) as usize
    }

    pub fn num_active_uniforms(&self) -> usize {
        self.parameter(ProgramParameter::ActiveUniforms).max(0) as usize
    }

    pub fn info_log_length(&self) -> usize {
        self.parameter(ProgramParameter::InfoLogLength).max(0) as usize
    }

    pub fn info_log(&self) -> String {
        self.ctx.visitor().program_info_log(self.id())
    }

    /// Registers the attribute `name` and returns its location.
    pub fn add_attribute(&mut self, name: &str) -> Result<GLint> {
        let location = self.ctx.visitor().attribute_location(self.id(), name);
        if location < 0 {
            return Err(Error::InactiveAttribute(name.to_owned()));
        }

        self.attributes.insert(name.to_owned(), location);
        Ok(location)
    }

    pub fn add_attributes(&mut self, names: &[&str]) -> Result<()> {
        for name in names {
            self.add_attribute(name)?;
        }

        Ok(())
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<GLint> {
        self.attributes.remove(name)
    }

    #[inline]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn attribute_location(&self, name: &str) -> Option<GLint> {
        self.attributes.get(name).cloned()
    }

    /// The registered attributes and their locations, as consumed by
    /// `VertexArray::enable_attributes`.
    #[inline]
    pub fn attributes(&self) -> &HashMap<String, GLint> {
        &self.attributes
    }

    /// Registers the uniform `name` and returns its location.
    pub fn add_uniform(&mut self, name: &str) -> Result<GLint> {
        let location = self.ctx.visitor().uniform_location(self.id(), name);
        if location < 0 {
            return Err(Error::InactiveUniform(name.to_owned()));
        }

        self.uniforms
            .entry(name.to_owned())
            .and_modify(|v| v.set_location(location))
            .or_insert_with(|| Uniform::new(name, location));
        Ok(location)
    }

    /// Registers the uniform `name` with a value attached.
    pub fn add_uniform_with<T>(&mut self, name: &str, value: T) -> Result<GLint>
    where
        T: Into<UniformVariable>,
    {
        let location = self.add_uniform(name)?;
        self.set_uniform(name, value)?;
        Ok(location)
    }

    pub fn add_uniforms(&mut self, names: &[&str]) -> Result<()> {
        for name in names {
            self.add_uniform(name)?;
        }

        Ok(())
    }

    pub fn remove_uniform(&mut self, name: &str) -> Option<Uniform> {
        self.uniforms.remove(name)
    }

    #[inline]
    pub fn has_uniform(&self, name: &str) -> bool {
        self.uniforms.contains_key(name)
    }

    pub fn uniform(&self, name: &str) -> Option<&Uniform> {
        self.uniforms.get(name)
    }

    /// Attaches a value to the registered uniform `name`, without pushing it.
    pub fn set_uniform<T>(&mut self, name: &str, value: T) -> Result<()>
    where
        T: Into<UniformVariable>,
    {
        match self.uniforms.get_mut(name) {
            Some(uniform) => {
                uniform.attach(value);
                Ok(())
            }
            None => Err(Error::UnknownUniform(name.to_owned())),
        }
    }

    /// Pushes the value attached to the uniform `name` to the driver. The program
    /// must be in use. Uniforms without a value are skipped.
    pub fn enable_uniform(&self, name: &str) -> Result<()> {
        let uniform = self
            .uniforms
            .get(name)
            .ok_or_else(|| Error::UnknownUniform(name.to_owned()))?;

        if let Some(ref v) = uniform.value() {
            self.ctx.visitor().uniform(uniform.location(), v);
        }

        Ok(())
    }

    /// Attaches a value to the uniform `name` and pushes it right away.
    pub fn enable_uniform_with<T>(&mut self, name: &str, value: T) -> Result<()>
    where
        T: Into<UniformVariable>,
    {
        self.set_uniform(name, value)?;
        self.enable_uniform(name)
    }

    /// Pushes every uniform that has a value attached.
    pub fn enable_uniforms(&self) {
        let visitor = self.ctx.visitor();
        for uniform in self.uniforms.values() {
            if let Some(ref v) = uniform.value() {
                visitor.uniform(uniform.location(), v);
            }
        }
    }

    /// Registers the sampler `name`, reading from texture `unit`, and returns its
    /// location.
    pub fn add_sampler(&mut self, name: &str, unit: u32) -> Result<GLint> {
        let location = self.ctx.visitor().uniform_location(self.id(), name);
        if location < 0 {
            return Err(Error::InactiveSampler(name.to_owned()));
        }

        self.samplers
            .insert(name.to_owned(), Sampler { location, unit });
        Ok(location)
    }

    pub fn remove_sampler(&mut self, name: &str) -> Option<Sampler> {
        self.samplers.remove(name)
    }

    #[inline]
    pub fn has_sampler(&self, name: &str) -> bool {
        self.samplers.contains_key(name)
    }

    pub fn sampler(&self, name: &str) -> Option<Sampler> {
        self.samplers.get(name).cloned()
    }

    /// Points the sampler `name` at its texture unit. This also makes the unit the
    /// active one. The program must be in use.
    pub fn enable_sampler(&self, name: &str) -> Result<()> {
        let sampler = self
            .samplers
            .get(name)
            .ok_or_else(|| Error::InactiveSampler(name.to_owned()))?;

        enable_sampler(self.ctx.visitor(), sampler);
        Ok(())
    }

    pub fn enable_samplers(&self) {
        let visitor = self.ctx.visitor();
        for sampler in self.samplers.values() {
            enable_sampler(visitor, sampler);
        }
    }

    pub fn take(&mut self) -> Program {
        Program {
            ctx: self.ctx.clone(),
            handle: self.handle.take(),
            shaders: std::mem::replace(&mut self.shaders, HashMap::new()),
            attributes: std::mem::replace(&mut self.attributes, HashMap::new()),
            uniforms: std::mem::replace(&mut self.uniforms, HashMap::new()),
            samplers: std::mem::replace(&mut self.samplers, HashMap::new()),
        }
    }

    pub fn into_raw(mut self) -> GLuint {
        self.handle.disown()
    }

    fn parameter(&self, param: ProgramParameter) -> GLint {
        self.ctx.visitor().program_parameter(self.id(), param)
    }
}

impl Drop for Program {
    fn drop(&mut self) {
        if let Some(id) = self.handle.release() {
            let visitor = self.ctx.visitor();
            for shader in self.shaders.values() {
                visitor.detach_shader(id, shader.id());
            }

            visitor.delete_program(id);
        }
    }
}

fn enable_sampler(visitor: &dyn Visitor, sampler: &Sampler) {
    visitor.active_texture(sampler.unit);
    visitor.uniform(sampler.location, &UniformVariable::I32(sampler.unit as i32));
}

fn resolved(program: GLuint, kind: &str, name: &str, location: GLint) -> bool {
    if location < 0 {
        info!(
            "The {} {:?} is no longer active in program({}), dropped.",
            kind, name, program
        );
        return false;
    }

    true
}
