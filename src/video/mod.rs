//! RAII wrappers around the OpenGL objects.
//!
//! Every wrapper is created from a `Context`, and deletes the driver object it owns
//! when it goes out of scope. Wrappers created with `from_raw` borrow an existing
//! driver name and never delete it.
//!
//! Nothing here is thread-safe. All the calls must be made on the thread that owns
//! the current GL context.

pub mod backends;
pub mod buffer;
pub mod framebuffer;
pub mod program;
pub mod shader;
pub mod texture;
pub mod uniform;
pub mod vertex_array;

mod handle;

pub use self::buffer::{Buffer, BufferHint, BufferTarget};
pub use self::framebuffer::{Attachment, FrameBuffer, FramebufferStatus, FramebufferTarget};
pub use self::program::{Program, Sampler};
pub use self::shader::{Shader, ShaderStage};
pub use self::texture::{
    InternalFormat, PixelFormat, PixelLayout, PixelType, Texture, TextureDimensions,
    TextureFilter, TextureOptions, TextureTarget, TextureWrap,
};
pub use self::uniform::{Uniform, UniformVariable};
pub use self::vertex_array::{
    AttributeFormat, IndexElement, IndexFormat, Primitive, VertexArray, VertexFormat,
};

use std::fmt;
use std::rc::Rc;

#[cfg(not(target_arch = "wasm32"))]
use std::os::raw::c_void;

use crate::errors::*;

use self::backends::{StringName, Visitor};

/// The drawable area of the current surface, in pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Viewport {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns true if nothing could be drawn into this viewport.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

impl From<[i32; 4]> for Viewport {
    fn from(v: [i32; 4]) -> Self {
        Viewport::new(v[0], v[1], v[2], v[3])
    }
}

/// A cheap, clonable handle to the graphics driver. Every wrapper keeps one of
/// these to issue its commands.
#[derive(Clone)]
pub struct Context {
    visitor: Rc<dyn Visitor>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Context")
    }
}

impl Context {
    /// Loads the OpenGL functions with `loader`, and checks that the current context
    /// fulfills the requirements of this crate.
    ///
    /// # Safety
    ///
    /// A GL context must be current on the calling thread, and stay current for as
    /// long as any object created from this `Context` is alive.
    #[cfg(not(target_arch = "wasm32"))]
    pub unsafe fn load_with<F>(loader: F) -> Result<Self>
    where
        F: FnMut(&str) -> *const c_void,
    {
        let visitor = backends::new(loader)?;
        Ok(Context {
            visitor: Rc::from(visitor),
        })
    }

    /// Creates a context backed by an in-memory driver simulation.
    pub fn headless() -> Self {
        Context {
            visitor: Rc::from(backends::new_headless()),
        }
    }

    /// Wraps a custom driver.
    pub fn new(visitor: Rc<dyn Visitor>) -> Self {
        Context { visitor }
    }

    #[inline]
    pub fn visitor(&self) -> &dyn Visitor {
        self.visitor.as_ref()
    }

    pub fn viewport(&self) -> Viewport {
        self.visitor.viewport()
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        self.visitor.set_viewport(viewport);
    }

    pub fn gl_version(&self) -> String {
        self.visitor.get_string(StringName::Version)
    }

    pub fn glsl_version(&self) -> String {
        self.visitor.get_string(StringName::ShadingLanguageVersion)
    }

    /// Returns the pending driver error, if there is one.
    pub fn check(&self) -> Result<()> {
        self.visitor.check()
    }
}
