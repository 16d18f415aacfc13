pub use crate::math;
pub use crate::math::prelude::{InnerSpace, Matrix, One, SquareMatrix, Zero};
pub use crate::math::Color;

pub use crate::errors::{Error, Result};
pub use crate::settings::{Settings, ShapeSettings, TextSettings};

pub use crate::video;
pub use crate::video::backends::headless::HeadlessVisitor;
pub use crate::video::{
    Attachment, AttributeFormat, Buffer, BufferHint, BufferTarget, Context, FrameBuffer,
    FramebufferStatus, IndexFormat, PixelFormat, PixelLayout, PixelType, Primitive, Program,
    Shader, ShaderStage, Texture, TextureDimensions, TextureOptions, TextureTarget,
    UniformVariable, VertexArray, Viewport,
};

pub use crate::shapes::Shapes;
pub use crate::text::{GlyphSource, RustTypeFont, TextRenderer};
