//! Images stored by the driver.

use std::cell::Cell;

use bytemuck::Pod;
use gl::types::GLuint;

use crate::errors::*;

use super::backends::TextureParameter;
use super::handle::RawHandle;
use super::Context;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureTarget {
    Texture1D,
    Texture2D,
    Texture3D,
    Rectangle,
    Multisample2D,
    CubeMap,
    CubeMapPositiveX,
    CubeMapNegativeX,
    CubeMapPositiveY,
    CubeMapNegativeY,
    CubeMapPositiveZ,
    CubeMapNegativeZ,
}

impl TextureTarget {
    /// The number of dimensions of the images of this target.
    pub fn dimension(self) -> u32 {
        match self {
            TextureTarget::Texture1D => 1,
            TextureTarget::Texture3D => 3,
            _ => 2,
        }
    }

    /// The target objects of this kind are bound to. This is the target itself,
    /// except for the faces of a cube map.
    pub fn binding(self) -> TextureTarget {
        if self.is_cube_face() {
            TextureTarget::CubeMap
        } else {
            self
        }
    }

    pub fn is_cube_face(self) -> bool {
        match self {
            TextureTarget::CubeMapPositiveX
            | TextureTarget::CubeMapNegativeX
            | TextureTarget::CubeMapPositiveY
            | TextureTarget::CubeMapNegativeY
            | TextureTarget::CubeMapPositiveZ
            | TextureTarget::CubeMapNegativeZ => true,
            _ => false,
        }
    }
}

/// The format the driver stores the texels in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InternalFormat {
    R8,
    RG8,
    RGB8,
    RGBA8,
    R16F,
    RGBA16F,
    R32F,
    RG32F,
    RGB32F,
    RGBA32F,
    R32I,
    R32UI,
    Depth16,
    Depth24,
    Depth32F,
    Depth24Stencil8,
}

/// The layout of the components of the client-side pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    Red,
    RG,
    RGB,
    RGBA,
    BGR,
    BGRA,
    RedInteger,
    Depth,
    DepthStencil,
}

impl PixelFormat {
    pub fn components(self) -> usize {
        match self {
            PixelFormat::Red | PixelFormat::RedInteger | PixelFormat::Depth => 1,
            PixelFormat::RG | PixelFormat::DepthStencil => 2,
            PixelFormat::RGB | PixelFormat::BGR => 3,
            PixelFormat::RGBA | PixelFormat::BGRA => 4,
        }
    }
}

/// The data type of the components of the client-side pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelType {
    Byte,
    UByte,
    Short,
    UShort,
    Int,
    UInt,
    HalfFloat,
    Float,
    /// Packed 24-bit depth and 8-bit stencil.
    UInt248,
}

impl PixelType {
    pub fn size(self) -> usize {
        match self {
            PixelType::Byte | PixelType::UByte => 1,
            PixelType::Short | PixelType::UShort | PixelType::HalfFloat => 2,
            PixelType::Int | PixelType::UInt | PixelType::Float | PixelType::UInt248 => 4,
        }
    }
}

/// The size in bytes of a single client-side pixel.
pub fn bytes_per_pixel(format: PixelFormat, ty: PixelType) -> usize {
    match ty {
        PixelType::UInt248 => 4,
        _ => format.components() * ty.size(),
    }
}

/// The texel formats used by uploads, downloads and allocations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelLayout {
    pub internal: InternalFormat,
    pub format: PixelFormat,
    pub ty: PixelType,
}

impl PixelLayout {
    pub fn new(internal: InternalFormat, format: PixelFormat, ty: PixelType) -> Self {
        PixelLayout {
            internal,
            format,
            ty,
        }
    }

    #[inline]
    pub fn bytes_per_pixel(&self) -> usize {
        bytes_per_pixel(self.format, self.ty)
    }
}

impl Default for PixelLayout {
    fn default() -> Self {
        PixelLayout::new(InternalFormat::RGBA8, PixelFormat::RGBA, PixelType::UByte)
    }
}

/// Filter mode for texture sampling. The mipmap variants only apply to
/// minification.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, Serialize, Deserialize)]
pub enum TextureFilter {
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

/// Wrap mode for texture sampling.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, Serialize, Deserialize)]
pub enum TextureWrap {
    Repeat,
    Mirror,
    Clamp,
    MirrorClamp,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureOptions {
    pub min_filter: TextureFilter,
    pub mag_filter: TextureFilter,
    pub wrap_s: TextureWrap,
    pub wrap_t: TextureWrap,
    pub wrap_r: TextureWrap,
}

impl Default for TextureOptions {
    fn default() -> Self {
        TextureOptions {
            min_filter: TextureFilter::Linear,
            mag_filter: TextureFilter::Linear,
            wrap_s: TextureWrap::Repeat,
            wrap_t: TextureWrap::Repeat,
            wrap_r: TextureWrap::Repeat,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureDimensions {
    D1(u32),
    D2(u32, u32),
    D3(u32, u32, u32),
}

impl TextureDimensions {
    pub fn dimension(self) -> u32 {
        match self {
            TextureDimensions::D1(_) => 1,
            TextureDimensions::D2(_, _) => 2,
            TextureDimensions::D3(_, _, _) => 3,
        }
    }

    /// Width, height and depth. Missing dimensions are 1.
    pub fn extent(self) -> (u32, u32, u32) {
        match self {
            TextureDimensions::D1(w) => (w, 1, 1),
            TextureDimensions::D2(w, h) => (w, h, 1),
            TextureDimensions::D3(w, h, d) => (w, h, d),
        }
    }

    pub fn num_pixels(self) -> usize {
        let (w, h, d) = self.extent();
        w as usize * h as usize * d as usize
    }

    /// The number of client-side bytes a transfer of an image of these dimensions
    /// touches, when every row starts on an `alignment` boundary. The last row is
    /// not padded.
    pub fn transfer_size(self, bytes_per_pixel: usize, alignment: usize) -> Option<usize> {
        let (w, h, d) = self.extent();
        let rows = (h as usize).checked_mul(d as usize)?;
        let row = (w as usize).checked_mul(bytes_per_pixel)?;
        if rows == 0 || row == 0 {
            return Some(0);
        }

        row_stride(row, alignment)?
            .checked_mul(rows - 1)?
            .checked_add(row)
    }
}

/// Rounds the length of a row of pixels up to the next multiple of `alignment`.
pub fn row_stride(row: usize, alignment: usize) -> Option<usize> {
    let alignment = alignment.max(1);
    Some(row.checked_add(alignment - 1)? / alignment * alignment)
}

/// An owned driver texture.
///
/// The pixel layout is used by every upload, allocation and download. The
/// texture keeps the extent of its last upload, which is 0x0x0 until then.
#[derive(Debug)]
pub struct Texture {
    ctx: Context,
    handle: RawHandle,
    target: TextureTarget,
    layout: Cell<PixelLayout>,
    extent: Cell<(u32, u32, u32)>,
}

impl Texture {
    /// Creates a texture with the default sampling options.
    pub fn new(ctx: &Context, target: TextureTarget) -> Self {
        Texture::with_options(ctx, target, TextureOptions::default())
    }

    pub fn with_options(ctx: &Context, target: TextureTarget, options: TextureOptions) -> Self {
        let id = ctx.visitor().create_texture();
        let texture = Texture {
            ctx: ctx.clone(),
            handle: RawHandle::owned(id),
            target,
            layout: Cell::new(PixelLayout::default()),
            extent: Cell::new((0, 0, 0)),
        };

        texture.set_options(options);
        texture
    }

    /// Wraps an existing texture name without taking the ownership of it.
    pub fn from_raw(ctx: &Context, id: GLuint, target: TextureTarget) -> Self {
        Texture {
            ctx: ctx.clone(),
            handle: RawHandle::borrowed(id),
            target,
            layout: Cell::new(PixelLayout::default()),
            extent: Cell::new((0, 0, 0)),
        }
    }

    /// Makes texture `unit` the active one.
    pub fn activate(ctx: &Context, unit: u32) {
        ctx.visitor().active_texture(unit);
    }

    /// Sets the row alignment of the client-side pixels read by uploads.
    pub fn unpack_alignment(ctx: &Context, value: i32) {
        ctx.visitor().unpack_alignment(value);
    }

    /// Sets the row alignment of the client-side pixels written by downloads.
    pub fn pack_alignment(ctx: &Context, value: i32) {
        ctx.visitor().pack_alignment(value);
    }

    #[inline]
    pub fn id(&self) -> GLuint {
        self.handle.id()
    }

    pub fn is_valid(&self) -> bool {
        self.id() != 0 && self.ctx.visitor().is_texture(self.id())
    }

    #[inline]
    pub fn is_owned(&self) -> bool {
        self.handle.is_owned()
    }

    #[inline]
    pub fn target(&self) -> TextureTarget {
        self.target
    }

    #[inline]
    pub fn dimension(&self) -> u32 {
        self.target.dimension()
    }

    #[inline]
    pub fn layout(&self) -> PixelLayout {
        self.layout.get()
    }

    #[inline]
    pub fn internal_format(&self) -> InternalFormat {
        self.layout.get().internal
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.layout.get().format
    }

    #[inline]
    pub fn pixel_type(&self) -> PixelType {
        self.layout.get().ty
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.extent.get().0
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.extent.get().1
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.extent.get().2
    }

    pub fn bind(&self) {
        self.ctx
            .visitor()
            .bind_texture(self.target.binding(), self.id());
    }

    pub fn unbind(&self) {
        self.ctx.visitor().bind_texture(self.target.binding(), 0);
    }

    pub fn set_layout(&self, layout: PixelLayout) {
        self.layout.set(layout);
    }

    pub fn set_format(&self, internal: InternalFormat, format: PixelFormat) {
        let mut layout = self.layout.get();
        layout.internal = internal;
        layout.format = format;
        self.layout.set(layout);
    }

    pub fn set_type(&self, ty: PixelType) {
        let mut layout = self.layout.get();
        layout.ty = ty;
        self.layout.set(layout);
    }

    /// Applies sampling options. Wrap modes of dimensions the texture does not
    /// have are ignored.
    pub fn set_options(&self, options: TextureOptions) {
        let visitor = self.ctx.visitor();
        let target = self.target.binding();

        self.bind();
        visitor.tex_parameter(target, TextureParameter::MinFilter(options.min_filter));
        visitor.tex_parameter(target, TextureParameter::MagFilter(options.mag_filter));
        visitor.tex_parameter(target, TextureParameter::WrapS(options.wrap_s));

        if self.dimension() >= 2 {
            visitor.tex_parameter(target, TextureParameter::WrapT(options.wrap_t));
        }

        if self.dimension() >= 3 {
            visitor.tex_parameter(target, TextureParameter::WrapR(options.wrap_r));
        }

        self.unbind();
    }

    pub fn generate_mipmaps(&self) {
        self.bind();
        self.ctx.visitor().generate_mipmap(self.target.binding());
        self.unbind();
    }

    pub fn upload_1d<T: Pod>(&self, data: Option<&[T]>, width: u32) -> Result<()> {
        self.upload(TextureDimensions::D1(width), data)
    }

    pub fn upload_2d<T: Pod>(&self, data: Option<&[T]>, width: u32, height: u32) -> Result<()> {
        self.upload(TextureDimensions::D2(width, height), data)
    }

    pub fn upload_3d<T: Pod>(
        &self,
        data: Option<&[T]>,
        width: u32,
        height: u32,
        depth: u32,
    ) -> Result<()> {
        self.upload(TextureDimensions::D3(width, height, depth), data)
    }

    /// Allocates storage without initializing it.
    pub fn allocate(&self, dimensions: TextureDimensions) -> Result<()> {
        self.upload::<u8>(dimensions, None)
    }

    /// Replaces the image with `data`, laid out with the current pixel layout and
    /// rows aligned to the unpack alignment. With `None`, the storage is allocated
    /// but left uninitialized.
    pub fn upload<T: Pod>(&self, dimensions: TextureDimensions, data: Option<&[T]>) -> Result<()> {
        if dimensions.dimension() != self.dimension() {
            return Err(Error::DimensionMismatch(
                dimensions.dimension(),
                self.dimension(),
            ));
        }

        let visitor = self.ctx.visitor();
        let layout = self.layout.get();
        let bytes: Option<&[u8]> = data.map(bytemuck::cast_slice);

        if let Some(bytes) = bytes {
            let alignment = visitor.get_unpack_alignment().max(1) as usize;
            match dimensions.transfer_size(layout.bytes_per_pixel(), alignment) {
                Some(len) if len <= bytes.len() => {}
                _ => return Err(Error::OutOfBounds),
            }
        }

        self.bind();
        visitor.tex_image(self.target, dimensions, layout, bytes);
        self.unbind();

        self.extent.set(dimensions.extent());
        Ok(())
    }

    /// Reads the image back with the current pixel format and type.
    pub fn download<T: Pod>(&self, out: &mut [T]) -> Result<()> {
        let layout = self.layout.get();
        self.download_as(out, layout.format, layout.ty)
    }

    /// Reads the image back, with rows aligned to the pack alignment.
    pub fn download_as<T: Pod>(&self, out: &mut [T], format: PixelFormat, ty: PixelType) -> Result<()> {
        let visitor = self.ctx.visitor();
        let alignment = visitor.get_pack_alignment().max(1) as usize;
        let (w, h, d) = self.extent.get();
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(out);

        let dimensions = TextureDimensions::D3(w, h, d);
        let len = match dimensions.transfer_size(bytes_per_pixel(format, ty), alignment) {
            Some(len) if len <= bytes.len() => len,
            _ => return Err(Error::OutOfBounds),
        };

        self.bind();
        visitor.get_tex_image(self.target, format, ty, &mut bytes[..len]);
        self.unbind();
        Ok(())
    }

    /// Reads the whole image into a new vector of tightly packed bytes. The pack
    /// alignment is restored afterwards.
    pub fn download_bytes(&self) -> Result<Vec<u8>> {
        let visitor = self.ctx.visitor();
        let (w, h, d) = self.extent.get();
        let len = TextureDimensions::D3(w, h, d)
            .transfer_size(self.layout().bytes_per_pixel(), 1)
            .ok_or(Error::OutOfBounds)?;

        let mut bytes = vec![0u8; len];
        let previous = visitor.get_pack_alignment();
        visitor.pack_alignment(1);
        let result = self.download(&mut bytes);
        visitor.pack_alignment(previous);

        result.map(|_| bytes)
    }

    pub fn take(&mut self) -> Texture {
        Texture {
            ctx: self.ctx.clone(),
            handle: self.handle.take(),
            target: self.target,
            layout: Cell::new(self.layout.get()),
            extent: Cell::new(self.extent.replace((0, 0, 0))),
        }
    }

    pub fn into_raw(mut self) -> GLuint {
        self.handle.disown()
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        if let Some(id) = self.handle.release() {
            self.ctx.visitor().delete_texture(id);
        }
    }
}
