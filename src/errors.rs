use crate::video::framebuffer::Attachment;
use crate::video::shader::ShaderStage;
use crate::video::texture::TextureTarget;

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "Backend: {}", _0)]
    Backend(String),
    #[fail(display = "OpenGL implementation doesn\'t support {}.", _0)]
    Requirement(String),
    #[fail(display = "Failed to compile {}, errors: \n{}", _0, _1)]
    ShaderCompileFailure(ShaderStage, String),
    #[fail(display = "Failed to link program, errors: \n{}", _0)]
    ProgramLinkFailure(String),
    #[fail(display = "Attribute({:?}) is not active in the linked program.", _0)]
    InactiveAttribute(String),
    #[fail(display = "Uniform({:?}) is not active in the linked program.", _0)]
    InactiveUniform(String),
    #[fail(display = "Sampler({:?}) is not active in the linked program.", _0)]
    InactiveSampler(String),
    #[fail(display = "Uniform({:?}) has not been registered.", _0)]
    UnknownUniform(String),
    #[fail(display = "Attribute({:?}) already has a buffer.", _0)]
    DuplicateAttribute(String),
    #[fail(display = "Attachment point {:?} is already occupied.", _0)]
    AttachmentOccupied(Attachment),
    #[fail(display = "{:?} can not be attached to a framebuffer.", _0)]
    UnsupportedTarget(TextureTarget),
    #[fail(display = "Expects a {}D upload, but the texture is {}D.", _0, _1)]
    DimensionMismatch(u32, u32),
    #[fail(display = "The vertex array has no index buffer.")]
    MissingIndexBuffer,
    #[fail(display = "Font {:?} has not been loaded.", _0)]
    UnknownFont(String),
    #[fail(display = "Failed to load font, errors: {}", _0)]
    FontLoadFailure(String),
    #[fail(display = "Settings: {}", _0)]
    Settings(String),
    #[fail(display = "IO: {}", _0)]
    Io(String),
    #[fail(display = "Out of bounds.")]
    OutOfBounds,
}

pub type Result<T> = ::std::result::Result<T, Error>;

impl From<::std::io::Error> for Error {
    fn from(err: ::std::io::Error) -> Error {
        Error::Io(format!("{}", err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::Settings(format!("{}", err))
    }
}
