//! Blocks of driver memory holding vertex, index or other data.

use std::cell::Cell;
use std::mem;

use bytemuck::Pod;
use gl::types::GLuint;

use crate::errors::*;

use super::handle::RawHandle;
use super::Context;

/// The binding point a buffer is used with.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Vertex attributes.
    Vertex,
    /// Vertex indices.
    Index,
    Uniform,
    PixelPack,
    PixelUnpack,
    CopyRead,
    CopyWrite,
}

/// Hint abouts the intended update strategy of the data.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BufferHint {
    /// The resource is initialized with data and cannot be changed later, this
    /// is the most common and most efficient usage. Optimal for render targets
    /// and resources that are rarely changed.
    Immutable,
    /// The resource is initialized without data, but will be written by the CPU
    /// before it is used.
    Stream,
    /// The resource will be updated with new data every few frames.
    Dynamic,
}

impl Default for BufferHint {
    fn default() -> Self {
        BufferHint::Immutable
    }
}

/// An owned driver buffer.
///
/// The wrapper remembers the element size and count of its last upload, so
/// sub-range updates and downloads can be bounds-checked. Buffers are commonly
/// shared between vertex arrays through `Rc`, so every method takes `&self`.
#[derive(Debug)]
pub struct Buffer {
    ctx: Context,
    handle: RawHandle,
    target: BufferTarget,
    hint: Cell<BufferHint>,
    element_size: Cell<usize>,
    len: Cell<usize>,
}

impl Buffer {
    /// Creates a new, empty buffer. The buffer is bound to `target` afterwards.
    pub fn new(ctx: &Context, target: BufferTarget) -> Self {
        let visitor = ctx.visitor();
        let id = visitor.create_buffer();
        visitor.bind_buffer(target, id);

        Buffer {
            ctx: ctx.clone(),
            handle: RawHandle::owned(id),
            target,
            hint: Cell::new(BufferHint::default()),
            element_size: Cell::new(1),
            len: Cell::new(0),
        }
    }

    /// Creates a new buffer initialized with `data`.
    pub fn with_data<T: Pod>(ctx: &Context, target: BufferTarget, data: &[T], hint: BufferHint) -> Self {
        let buffer = Buffer::new(ctx, target);
        buffer.upload(data, hint);
        buffer
    }

    /// Wraps an existing buffer name without taking the ownership of it. The size of
    /// the buffer is queried from the driver, and treated as a byte count.
    pub fn from_raw(ctx: &Context, id: GLuint, target: BufferTarget) -> Self {
        let buffer = Buffer {
            ctx: ctx.clone(),
            handle: RawHandle::borrowed(id),
            target,
            hint: Cell::new(BufferHint::default()),
            element_size: Cell::new(1),
            len: Cell::new(0),
        };

        if id != 0 {
            buffer.len.set(buffer.size());
        }

        buffer
    }

    #[inline]
    pub fn id(&self) -> GLuint {
        self.handle.id()
    }

    /// Returns true if this wrapper refers to a live driver buffer.
    pub fn is_valid(&self) -> bool {
        self.id() != 0 && self.ctx.visitor().is_buffer(self.id())
    }

    #[inline]
    pub fn is_owned(&self) -> bool {
        self.handle.is_owned()
    }

    #[inline]
    pub fn target(&self) -> BufferTarget {
        self.target
    }

    #[inline]
    pub fn hint(&self) -> BufferHint {
        self.hint.get()
    }

    /// The size in bytes of one element of the last upload.
    #[inline]
    pub fn element_size(&self) -> usize {
        self.element_size.get()
    }

    /// The number of elements of the last upload.
    #[inline]
    pub fn len(&self) -> usize {
        self.len.get()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len.get() == 0
    }

    /// Queries the size of the data store in bytes. This binds the buffer.
    pub fn size(&self) -> usize {
        self.bind();
        self.ctx.visitor().buffer_size(self.target)
    }

    pub fn bind(&self) {
        self.ctx.visitor().bind_buffer(self.target, self.id());
    }

    pub fn unbind(&self) {
        self.ctx.visitor().bind_buffer(self.target, 0);
    }

    /// Replaces the whole data store with `data`. This binds the buffer.
    pub fn upload<T: Pod>(&self, data: &[T], hint: BufferHint) {
        let bytes: &[u8] = bytemuck::cast_slice(data);

        self.bind();
        self.ctx
            .visitor()
            .buffer_data(self.target, bytes.len(), Some(bytes), hint);

        self.hint.set(hint);
        self.element_size.set(mem::size_of::<T>());
        self.len.set(data.len());
    }

    /// Allocates room for `len` elements of `T` without initializing them. This
    /// binds the buffer.
    pub fn reserve<T: Pod>(&self, len: usize, hint: BufferHint) {
        let size = mem::size_of::<T>();

        self.bind();
        self.ctx
            .visitor()
            .buffer_data(self.target, size.saturating_mul(len), None, hint);

        self.hint.set(hint);
        self.element_size.set(size);
        self.len.set(len);
    }

    /// Overwrites part of the data store, starting at the `offset`-th element of
    /// type `T`. This binds the buffer.
    pub fn upload_sub<T: Pod>(&self, offset: usize, data: &[T]) -> Result<()> {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let start = self.check_range(offset, mem::size_of::<T>(), bytes.len())?;

        if !bytes.is_empty() {
            self.bind();
            self.ctx.visitor().buffer_sub_data(self.target, start, bytes);
        }

        Ok(())
    }

    /// Reads the beginning of the data store into `out`. This binds the buffer.
    pub fn download<T: Pod>(&self, out: &mut [T]) -> Result<()> {
        self.download_sub(0, out)
    }

    /// Reads part of the data store into `out`, starting at the `offset`-th element
    /// of type `T`. This binds the buffer.
    pub fn download_sub<T: Pod>(&self, offset: usize, out: &mut [T]) -> Result<()> {
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(out);
        let start = self.check_range(offset, mem::size_of::<T>(), bytes.len())?;

        if !bytes.is_empty() {
            self.bind();
            self.ctx
                .visitor()
                .get_buffer_sub_data(self.target, start, bytes);
        }

        Ok(())
    }

    /// Moves the driver buffer into a new wrapper. `self` is left empty.
    pub fn take(&mut self) -> Buffer {
        Buffer {
            ctx: self.ctx.clone(),
            handle: self.handle.take(),
            target: self.target,
            hint: Cell::new(self.hint.replace(BufferHint::default())),
            element_size: Cell::new(self.element_size.replace(1)),
            len: Cell::new(self.len.replace(0)),
        }
    }

    /// Gives up the ownership, returning the raw buffer name.
    pub fn into_raw(mut self) -> GLuint {
        self.handle.disown()
    }

    /// Returns the byte offset of the `offset`-th element of `element_size` bytes,
    /// if `len` bytes from there fit in the data store.
    fn check_range(&self, offset: usize, element_size: usize, len: usize) -> Result<usize> {
        let capacity = self.len.get().saturating_mul(self.element_size.get());
        let start = offset.checked_mul(element_size).ok_or(Error::OutOfBounds)?;
        match start.checked_add(len) {
            Some(end) if end <= capacity => Ok(start),
            _ => Err(Error::OutOfBounds),
        }
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if let Some(id) = self.handle.release() {
            self.ctx.visitor().delete_buffer(id);
        }
    }
}
