use gl::types::*;

use crate::video::buffer::{BufferHint, BufferTarget};
use crate::video::framebuffer::{Attachment, FramebufferStatus, FramebufferTarget};
use crate::video::shader::ShaderStage;
use crate::video::texture::{InternalFormat, PixelFormat, PixelType, TextureFilter, TextureTarget, TextureWrap};
use crate::video::vertex_array::{IndexFormat, Primitive, VertexFormat};

impl From<BufferTarget> for GLenum {
    fn from(target: BufferTarget) -> Self {
        match target {
            BufferTarget::Vertex => gl::ARRAY_BUFFER,
            BufferTarget::Index => gl::ELEMENT_ARRAY_BUFFER,
            BufferTarget::Uniform => gl::UNIFORM_BUFFER,
            BufferTarget::PixelPack => gl::PIXEL_PACK_BUFFER,
            BufferTarget::PixelUnpack => gl::PIXEL_UNPACK_BUFFER,
            BufferTarget::CopyRead => gl::COPY_READ_BUFFER,
            BufferTarget::CopyWrite => gl::COPY_WRITE_BUFFER,
        }
    }
}

impl From<BufferHint> for GLenum {
    fn from(hint: BufferHint) -> Self {
        match hint {
            BufferHint::Immutable => gl::STATIC_DRAW,
            BufferHint::Stream => gl::STREAM_DRAW,
            BufferHint::Dynamic => gl::DYNAMIC_DRAW,
        }
    }
}

impl From<ShaderStage> for GLenum {
    fn from(stage: ShaderStage) -> Self {
        match stage {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
            ShaderStage::Geometry => gl::GEOMETRY_SHADER,
            ShaderStage::TessControl => gl::TESS_CONTROL_SHADER,
            ShaderStage::TessEvaluation => gl::TESS_EVALUATION_SHADER,
            ShaderStage::Compute => gl::COMPUTE_SHADER,
        }
    }
}

impl From<TextureTarget> for GLenum {
    fn from(target: TextureTarget) -> Self {
        match target {
            TextureTarget::Texture1D => gl::TEXTURE_1D,
            TextureTarget::Texture2D => gl::TEXTURE_2D,
            TextureTarget::Texture3D => gl::TEXTURE_3D,
            TextureTarget::Rectangle => gl::TEXTURE_RECTANGLE,
            TextureTarget::Multisample2D => gl::TEXTURE_2D_MULTISAMPLE,
            TextureTarget::CubeMap => gl::TEXTURE_CUBE_MAP,
            TextureTarget::CubeMapPositiveX => gl::TEXTURE_CUBE_MAP_POSITIVE_X,
            TextureTarget::CubeMapNegativeX => gl::TEXTURE_CUBE_MAP_NEGATIVE_X,
            TextureTarget::CubeMapPositiveY => gl::TEXTURE_CUBE_MAP_POSITIVE_Y,
            TextureTarget::CubeMapNegativeY => gl::TEXTURE_CUBE_MAP_NEGATIVE_Y,
            TextureTarget::CubeMapPositiveZ => gl::TEXTURE_CUBE_MAP_POSITIVE_Z,
            TextureTarget::CubeMapNegativeZ => gl::TEXTURE_CUBE_MAP_NEGATIVE_Z,
        }
    }
}

impl From<InternalFormat> for GLenum {
    fn from(format: InternalFormat) -> Self {
        match format {
            InternalFormat::R8 => gl::R8,
            InternalFormat::RG8 => gl::RG8,
            InternalFormat::RGB8 => gl::RGB8,
            InternalFormat::RGBA8 => gl::RGBA8,
            InternalFormat::R16F => gl::R16F,
            InternalFormat::RGBA16F => gl::RGBA16F,
            InternalFormat::R32F => gl::R32F,
            InternalFormat::RG32F => gl::RG32F,
            InternalFormat::RGB32F => gl::RGB32F,
            InternalFormat::RGBA32F => gl::RGBA32F,
            InternalFormat::R32I => gl::R32I,
            InternalFormat::R32UI => gl::R32UI,
            InternalFormat::Depth16 => gl::DEPTH_COMPONENT16,
            InternalFormat::Depth24 => gl::DEPTH_COMPONENT24,
            InternalFormat::Depth32F => gl::DEPTH_COMPONENT32F,
            InternalFormat::Depth24Stencil8 => gl::DEPTH24_STENCIL8,
        }
    }
}

impl From<PixelFormat> for GLenum {
    fn from(format: PixelFormat) -> Self {
        match format {
            PixelFormat::Red => gl::RED,
            PixelFormat::RG => gl::RG,
            PixelFormat::RGB => gl::RGB,
            PixelFormat::RGBA => gl::RGBA,
            PixelFormat::BGR => gl::BGR,
            PixelFormat::BGRA => gl::BGRA,
            PixelFormat::RedInteger => gl::RED_INTEGER,
            PixelFormat::Depth => gl::DEPTH_COMPONENT,
            PixelFormat::DepthStencil => gl::DEPTH_STENCIL,
        }
    }
}

impl From<PixelType> for GLenum {
    fn from(ty: PixelType) -> Self {
        match ty {
            PixelType::Byte => gl::BYTE,
            PixelType::UByte => gl::UNSIGNED_BYTE,
            PixelType::Short => gl::SHORT,
            PixelType::UShort => gl::UNSIGNED_SHORT,
            PixelType::Int => gl::INT,
            PixelType::UInt => gl::UNSIGNED_INT,
            PixelType::HalfFloat => gl::HALF_FLOAT,
            PixelType::Float => gl::FLOAT,
            PixelType::UInt248 => gl::UNSIGNED_INT_24_8,
        }
    }
}

impl From<TextureFilter> for GLenum {
    fn from(filter: TextureFilter) -> Self {
        match filter {
            TextureFilter::Nearest => gl::NEAREST,
            TextureFilter::Linear => gl::LINEAR,
            TextureFilter::NearestMipmapNearest => gl::NEAREST_MIPMAP_NEAREST,
            TextureFilter::LinearMipmapNearest => gl::LINEAR_MIPMAP_NEAREST,
            TextureFilter::NearestMipmapLinear => gl::NEAREST_MIPMAP_LINEAR,
            TextureFilter::LinearMipmapLinear => gl::LINEAR_MIPMAP_LINEAR,
        }
    }
}

impl From<TextureWrap> for GLenum {
    fn from(wrap: TextureWrap) -> Self {
        match wrap {
            TextureWrap::Repeat => gl::REPEAT,
            TextureWrap::Mirror => gl::MIRRORED_REPEAT,
            TextureWrap::Clamp => gl::CLAMP_TO_EDGE,
            TextureWrap::MirrorClamp => gl::MIRROR_CLAMP_TO_EDGE,
        }
    }
}

impl From<FramebufferTarget> for GLenum {
    fn from(target: FramebufferTarget) -> Self {
        match target {
            FramebufferTarget::Framebuffer => gl::FRAMEBUFFER,
            FramebufferTarget::Draw => gl::DRAW_FRAMEBUFFER,
            FramebufferTarget::Read => gl::READ_FRAMEBUFFER,
        }
    }
}

impl From<Attachment> for GLenum {
    fn from(attachment: Attachment) -> Self {
        match attachment {
            Attachment::Color(i) => gl::COLOR_ATTACHMENT0 + i,
            Attachment::Depth => gl::DEPTH_ATTACHMENT,
            Attachment::Stencil => gl::STENCIL_ATTACHMENT,
            Attachment::DepthStencil => gl::DEPTH_STENCIL_ATTACHMENT,
        }
    }
}

impl From<GLenum> for FramebufferStatus {
    fn from(status: GLenum) -> Self {
        match status {
            gl::FRAMEBUFFER_COMPLETE => FramebufferStatus::Complete,
            gl::FRAMEBUFFER_UNDEFINED => FramebufferStatus::Undefined,
            gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => FramebufferStatus::IncompleteAttachment,
            gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => {
                FramebufferStatus::IncompleteMissingAttachment
            }
            gl::FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER => FramebufferStatus::IncompleteDrawBuffer,
            gl::FRAMEBUFFER_INCOMPLETE_READ_BUFFER => FramebufferStatus::IncompleteReadBuffer,
            gl::FRAMEBUFFER_UNSUPPORTED => FramebufferStatus::Unsupported,
            gl::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE => FramebufferStatus::IncompleteMultisample,
            gl::FRAMEBUFFER_INCOMPLETE_LAYER_TARGETS => FramebufferStatus::IncompleteLayerTargets,
            v => FramebufferStatus::Unknown(v),
        }
    }
}

impl From<Primitive> for GLenum {
    fn from(primitive: Primitive) -> Self {
        match primitive {
            Primitive::Points => gl::POINTS,
            Primitive::Lines => gl::LINES,
            Primitive::LineStrip => gl::LINE_STRIP,
            Primitive::LineLoop => gl::LINE_LOOP,
            Primitive::Triangles => gl::TRIANGLES,
            Primitive::TriangleStrip => gl::TRIANGLE_STRIP,
            Primitive::TriangleFan => gl::TRIANGLE_FAN,
        }
    }
}

impl From<IndexFormat> for GLenum {
    fn from(format: IndexFormat) -> Self {
        match format {
            IndexFormat::U8 => gl::UNSIGNED_BYTE,
            IndexFormat::U16 => gl::UNSIGNED_SHORT,
            IndexFormat::U32 => gl::UNSIGNED_INT,
        }
    }
}

impl From<VertexFormat> for GLenum {
    fn from(format: VertexFormat) -> Self {
        match format {
            VertexFormat::Byte => gl::BYTE,
            VertexFormat::UByte => gl::UNSIGNED_BYTE,
            VertexFormat::Short => gl::SHORT,
            VertexFormat::UShort => gl::UNSIGNED_SHORT,
            VertexFormat::Int => gl::INT,
            VertexFormat::UInt => gl::UNSIGNED_INT,
            VertexFormat::Float => gl::FLOAT,
            VertexFormat::Double => gl::DOUBLE,
        }
    }
}
