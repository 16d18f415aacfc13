//! Vertex arrays, and the buffers holding their attributes and indices.

use std::collections::HashMap;
use std::rc::{Rc, Weak};

use bytemuck::Pod;
use gl::types::{GLint, GLuint};

use crate::errors::*;

use super::buffer::{Buffer, BufferHint, BufferTarget};
use super::handle::RawHandle;
use super::Context;

/// Defines how the input vertex data is used to assemble primitives.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Primitive {
    /// Separate points.
    Points,
    /// Separate lines.
    Lines,
    /// Line strips.
    LineStrip,
    /// A closed line strip.
    LineLoop,
    /// Separate triangles.
    Triangles,
    /// Triangle strips.
    TriangleStrip,
    /// Triangles sharing the first vertex.
    TriangleFan,
}

/// Vertex indices can be either 8, 16 or 32 bits.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexFormat {
    U8,
    U16,
    U32,
}

impl IndexFormat {
    pub fn size(self) -> usize {
        match self {
            IndexFormat::U8 => 1,
            IndexFormat::U16 => 2,
            IndexFormat::U32 => 4,
        }
    }
}

/// The integer types that could be used as vertex indices.
pub trait IndexElement: Pod {
    const FORMAT: IndexFormat;
}

impl IndexElement for u8 {
    const FORMAT: IndexFormat = IndexFormat::U8;
}

impl IndexElement for u16 {
    const FORMAT: IndexFormat = IndexFormat::U16;
}

impl IndexElement for u32 {
    const FORMAT: IndexFormat = IndexFormat::U32;
}

/// The data type of the components of a vertex attribute.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VertexFormat {
    Byte,
    UByte,
    Short,
    UShort,
    Int,
    UInt,
    Float,
    Double,
}

impl VertexFormat {
    pub fn size(self) -> usize {
        match self {
            VertexFormat::Byte | VertexFormat::UByte => 1,
            VertexFormat::Short | VertexFormat::UShort => 2,
            VertexFormat::Int | VertexFormat::UInt | VertexFormat::Float => 4,
            VertexFormat::Double => 8,
        }
    }
}

/// How an attribute is laid out in its buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeFormat {
    /// The number of components per vertex, 1 to 4.
    pub size: i32,
    pub format: VertexFormat,
    pub normalized: bool,
    /// The distance in bytes between two vertices, 0 if they are tightly packed.
    pub stride: i32,
    /// The byte offset of the first component in the buffer.
    pub offset: usize,
}

impl AttributeFormat {
    pub fn new(size: i32, format: VertexFormat) -> Self {
        AttributeFormat {
            size,
            format,
            normalized: false,
            stride: 0,
            offset: 0,
        }
    }

    /// Tightly packed `f32` components.
    pub fn floats(size: i32) -> Self {
        AttributeFormat::new(size, VertexFormat::Float)
    }

    pub fn normalized(mut self, normalized: bool) -> Self {
        self.normalized = normalized;
        self
    }

    pub fn with_stride(mut self, stride: i32) -> Self {
        self.stride = stride;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

#[derive(Debug)]
struct IndexBuffer {
    buffer: Rc<Buffer>,
    primitive: Primitive,
    format: IndexFormat,
}

#[derive(Debug)]
struct AttributeBuffer {
    buffer: Rc<Buffer>,
    format: AttributeFormat,
    divisor: u32,
}

/// An owned vertex array, plus the index buffer and the named attribute buffers
/// drawn with it. Buffers are shared, and could be sourced by more than one
/// attribute or vertex array.
///
/// Attribute names are matched against the locations registered in a `Program`
/// when the attributes are enabled.
#[derive(Debug)]
pub struct VertexArray {
    ctx: Context,
    handle: RawHandle,
    indices: Option<IndexBuffer>,
    attributes: HashMap<String, AttributeBuffer>,
}

impl VertexArray {
    pub fn new(ctx: &Context) -> Self {
        let visitor = ctx.visitor();
        let id = visitor.create_vertex_array();
        // The object is only created on its first binding.
        visitor.bind_vertex_array(id);
        visitor.bind_vertex_array(0);

        VertexArray {
            ctx: ctx.clone(),
            handle: RawHandle::owned(id),
            indices: None,
            attributes: HashMap::new(),
        }
    }

    /// Wraps an existing vertex array name without taking the ownership of it.
    pub fn from_raw(ctx: &Context, id: GLuint) -> Self {
        VertexArray {
            ctx: ctx.clone(),
            handle: RawHandle::borrowed(id),
            indices: None,
            attributes: HashMap::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> GLuint {
        self.handle.id()
    }

    pub fn is_valid(&self) -> bool {
        self.id() != 0 && self.ctx.visitor().is_vertex_array(self.id())
    }

    #[inline]
    pub fn is_owned(&self) -> bool {
        self.handle.is_owned()
    }

    pub fn bind(&self) {
        self.ctx.visitor().bind_vertex_array(self.id());
    }

    pub fn unbind(&self) {
        self.ctx.visitor().bind_vertex_array(0);
    }

    /// Draws `count` vertices starting at `first`. The vertex array and the
    /// attributes have to be enabled by the caller.
    pub fn draw_arrays(&self, primitive: Primitive, first: usize, count: usize) {
        self.ctx
            .visitor()
            .draw_arrays(primitive, first, count, None);
    }

    pub fn draw_arrays_instanced(
        &self,
        primitive: Primitive,
        first: usize,
        count: usize,
        instances: usize,
    ) {
        self.ctx
            .visitor()
            .draw_arrays(primitive, first, count, Some(instances));
    }

    /// Draws every index of the index buffer.
    pub fn draw_elements(&self) -> Result<()> {
        let count = self.index_count();
        self.draw_indices(0, count, None)
    }

    pub fn draw_elements_instanced(&self, instances: usize) -> Result<()> {
        let count = self.index_count();
        self.draw_indices(0, count, Some(instances))
    }

    /// Draws `count` indices, starting at the `first`-th index of the index buffer.
    pub fn draw_elements_range(&self, first: usize, count: usize) -> Result<()> {
        self.draw_indices(first, count, None)
    }

    pub fn draw_elements_range_instanced(
        &self,
        first: usize,
        count: usize,
        instances: usize,
    ) -> Result<()> {
        self.draw_indices(first, count, Some(instances))
    }

    /// Returns true if an index buffer is present, and the driver still knows it.
    pub fn has_index_buffer(&self) -> bool {
        self.indices
            .as_ref()
            .map(|v| v.buffer.is_valid())
            .unwrap_or(false)
    }

    /// Creates an index buffer holding `indices`, replacing the previous one.
    pub fn set_index_buffer<T: IndexElement>(
        &mut self,
        primitive: Primitive,
        indices: &[T],
        hint: BufferHint,
    ) {
        let buffer = Buffer::with_data(&self.ctx, BufferTarget::Index, indices, hint);
        self.set_index_buffer_shared(primitive, T::FORMAT, Rc::new(buffer));
    }

    pub fn set_index_buffer_shared(
        &mut self,
        primitive: Primitive,
        format: IndexFormat,
        buffer: Rc<Buffer>,
    ) {
        self.indices = Some(IndexBuffer {
            buffer,
            primitive,
            format,
        });
    }

    pub fn remove_index_buffer(&mut self) -> Option<Rc<Buffer>> {
        self.indices.take().map(|v| v.buffer)
    }

    pub fn index_buffer(&self) -> Option<Weak<Buffer>> {
        self.indices.as_ref().map(|v| Rc::downgrade(&v.buffer))
    }

    pub fn index_format(&self) -> Option<IndexFormat> {
        self.indices.as_ref().map(|v| v.format)
    }

    pub fn primitive(&self) -> Option<Primitive> {
        self.indices.as_ref().map(|v| v.primitive)
    }

    /// The number of indices held by the index buffer.
    pub fn index_count(&self) -> usize {
        match self.indices {
            Some(ref v) => v.buffer.len() * v.buffer.element_size() / v.format.size(),
            None => 0,
        }
    }

    #[inline]
    pub fn num_attributes(&self) -> usize {
        self.attributes.len()
    }

    /// Returns true if the attribute is present, and its buffer still exists.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes
            .get(name)
            .map(|v| v.buffer.is_valid())
            .unwrap_or(false)
    }

    /// Creates a vertex buffer holding `data`, sourced by the attribute `name`.
    pub fn add_attribute<T: Pod>(
        &mut self,
        name: &str,
        data: &[T],
        format: AttributeFormat,
        hint: BufferHint,
        divisor: u32,
    ) -> Result<Rc<Buffer>> {
        if self.attributes.contains_key(name) {
            return Err(Error::DuplicateAttribute(name.to_owned()));
        }

        let buffer = Rc::new(Buffer::with_data(&self.ctx, BufferTarget::Vertex, data, hint));
        self.add_attribute_buffer(name, buffer.clone(), format, divisor)?;
        Ok(buffer)
    }

    /// Makes the attribute `name` source its data from an existing buffer.
    pub fn add_attribute_buffer(
        &mut self,
        name: &str,
        buffer: Rc<Buffer>,
        format: AttributeFormat,
        divisor: u32,
    ) -> Result<()> {
        if self.attributes.contains_key(name) {
            return Err(Error::DuplicateAttribute(name.to_owned()));
        }

        self.attributes.insert(
            name.to_owned(),
            AttributeBuffer {
                buffer,
                format,
                divisor,
            },
        );

        Ok(())
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<Rc<Buffer>> {
        self.attributes.remove(name).map(|v| v.buffer)
    }

    pub fn attribute_buffer(&self, name: &str) -> Option<Weak<Buffer>> {
        self.attributes.get(name).map(|v| Rc::downgrade(&v.buffer))
    }

    pub fn attribute_format(&self, name: &str) -> Option<AttributeFormat> {
        self.attributes.get(name).map(|v| v.format)
    }

    pub fn set_attribute_format(&mut self, name: &str, format: AttributeFormat) -> bool {
        match self.attributes.get_mut(name) {
            Some(v) => {
                v.format = format;
                true
            }
            None => false,
        }
    }

    pub fn attribute_divisor(&self, name: &str) -> Option<u32> {
        self.attributes.get(name).map(|v| v.divisor)
    }

    pub fn set_attribute_divisor(&mut self, name: &str, divisor: u32) -> bool {
        match self.attributes.get_mut(name) {
            Some(v) => {
                v.divisor = divisor;
                true
            }
            None => false,
        }
    }

    /// Enables the attribute `name` at `location`, sourcing its buffer with the
    /// stored format and divisor. The vertex array must be bound. Unknown names and
    /// negative locations are ignored.
    pub fn enable_attribute(&self, name: &str, location: GLint) {
        if location < 0 {
            return;
        }

        if let Some(attribute) = self.attributes.get(name) {
            let visitor = self.ctx.visitor();
            let location = location as GLuint;

            attribute.buffer.bind();
            visitor.enable_vertex_attribute(location);
            visitor.vertex_attribute_pointer(location, &attribute.format);
            visitor.vertex_attribute_divisor(location, attribute.divisor);
        }
    }

    /// Enables every attribute found in `locations`, as returned by
    /// `Program::attributes`.
    pub fn enable_attributes(&self, locations: &HashMap<String, GLint>) {
        for (name, &location) in locations {
            self.enable_attribute(name, location);
        }
    }

    pub fn disable_attribute(&self, name: &str, location: GLint) {
        if location < 0 {
            return;
        }

        if let Some(attribute) = self.attributes.get(name) {
            let visitor = self.ctx.visitor();
            let location = location as GLuint;

            visitor.disable_vertex_attribute(location);
            if attribute.divisor != 0 {
                visitor.vertex_attribute_divisor(location, 0);
            }

            attribute.buffer.unbind();
        }
    }

    pub fn disable_attributes(&self, locations: &HashMap<String, GLint>) {
        for (name, &location) in locations {
            self.disable_attribute(name, location);
        }
    }

    pub fn take(&mut self) -> VertexArray {
        VertexArray {
            ctx: self.ctx.clone(),
            handle: self.handle.take(),
            indices: self.indices.take(),
            attributes: std::mem::replace(&mut self.attributes, HashMap::new()),
        }
    }

    pub fn into_raw(mut self) -> GLuint {
        self.handle.disown()
    }

    fn draw_indices(&self, first: usize, count: usize, instances: Option<usize>) -> Result<()> {
        let indices = self.indices.as_ref().ok_or(Error::MissingIndexBuffer)?;
        match first.checked_add(count) {
            Some(end) if end <= self.index_count() => {}
            _ => return Err(Error::OutOfBounds),
        }

        indices.buffer.bind();
        self.ctx.visitor().draw_elements(
            indices.primitive,
            indices.format,
            first,
            count,
            instances,
        );

        Ok(())
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        if let Some(id) = self.handle.release() {
            self.ctx.visitor().delete_vertex_array(id);
        }
    }
}
