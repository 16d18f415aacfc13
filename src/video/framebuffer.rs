use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use gl::types::GLuint;

use crate::errors::*;

use super::handle::RawHandle;
use super::texture::{PixelLayout, Texture, TextureDimensions, TextureOptions, TextureTarget};
use super::Context;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FramebufferTarget {
    /// Both the draw and the read binding.
    Framebuffer,
    Draw,
    Read,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attachment {
    Color(u32),
    Depth,
    Stencil,
    DepthStencil,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FramebufferStatus {
    Complete,
    Undefined,
    IncompleteAttachment,
    IncompleteMissingAttachment,
    IncompleteDrawBuffer,
    IncompleteReadBuffer,
    Unsupported,
    IncompleteMultisample,
    IncompleteLayerTargets,
    Unknown(u32),
}

impl fmt::Display for FramebufferStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            FramebufferStatus::Complete => "GL_FRAMEBUFFER_COMPLETE",
            FramebufferStatus::Undefined => "GL_FRAMEBUFFER_UNDEFINED",
            FramebufferStatus::IncompleteAttachment => "GL_FRAMEBUFFER_INCOMPLETE_ATTACHMENT",
            FramebufferStatus::IncompleteMissingAttachment => {
                "GL_FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT"
            }
            FramebufferStatus::IncompleteDrawBuffer => "GL_FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER",
            FramebufferStatus::IncompleteReadBuffer => "GL_FRAMEBUFFER_INCOMPLETE_READ_BUFFER",
            FramebufferStatus::Unsupported => "GL_FRAMEBUFFER_UNSUPPORTED",
            FramebufferStatus::IncompleteMultisample => "GL_FRAMEBUFFER_INCOMPLETE_MULTISAMPLE",
            FramebufferStatus::IncompleteLayerTargets => {
                "GL_FRAMEBUFFER_INCOMPLETE_LAYER_TARGETS"
            }
            FramebufferStatus::Unknown(_) => "UNKNOWN_ERROR",
        };

        write!(f, "{}", name)
    }
}

/// The texture targets that could be attached to a framebuffer.
pub const ATTACHABLE_TARGETS: [TextureTarget; 9] = [
    TextureTarget::Texture2D,
    TextureTarget::Rectangle,
    TextureTarget::CubeMapPositiveX,
    TextureTarget::CubeMapNegativeX,
    TextureTarget::CubeMapPositiveY,
    TextureTarget::CubeMapNegativeY,
    TextureTarget::CubeMapPositiveZ,
    TextureTarget::CubeMapNegativeZ,
    TextureTarget::Multisample2D,
];

/// An owned framebuffer, and the textures attached to it. Attached textures are
/// shared, and stay alive for as long as either the framebuffer or another owner
/// holds them.
#[derive(Debug)]
pub struct FrameBuffer {
    ctx: Context,
    handle: RawHandle,
    target: FramebufferTarget,
    attachments: HashMap<Attachment, Rc<Texture>>,
}

impl FrameBuffer {
    pub fn new(ctx: &Context, target: FramebufferTarget) -> Self {
        let id = ctx.visitor().create_framebuffer();
        FrameBuffer {
            ctx: ctx.clone(),
            handle: RawHandle::owned(id),
            target,
            attachments: HashMap::new(),
        }
    }

    /// Wraps an existing framebuffer name without taking the ownership of it.
    pub fn from_raw(ctx: &Context, id: GLuint, target: FramebufferTarget) -> Self {
        FrameBuffer {
            ctx: ctx.clone(),
            handle: RawHandle::borrowed(id),
            target,
            attachments: HashMap::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> GLuint {
        self.handle.id()
    }

    pub fn is_valid(&self) -> bool {
        self.id() != 0 && self.ctx.visitor().is_framebuffer(self.id())
    }

    #[inline]
    pub fn is_owned(&self) -> bool {
        self.handle.is_owned()
    }

    #[inline]
    pub fn target(&self) -> FramebufferTarget {
        self.target
    }

    pub fn bind(&self) {
        self.ctx.visitor().bind_framebuffer(self.target, self.id());
    }

    pub fn unbind(&self) {
        self.ctx.visitor().bind_framebuffer(self.target, 0);
    }

    /// Queries the completeness of the framebuffer. This binds and unbinds it.
    pub fn status(&self) -> FramebufferStatus {
        self.bind();
        let status = self.ctx.visitor().check_framebuffer_status(self.target);
        self.unbind();
        status
    }

    pub fn status_as_string(&self) -> String {
        self.status().to_string()
    }

    #[inline]
    pub fn has_attachment(&self, attachment: Attachment) -> bool {
        self.attachments.contains_key(&attachment)
    }

    /// The texture attached to `attachment`.
    pub fn texture(&self, attachment: Attachment) -> Option<Rc<Texture>> {
        self.attachments.get(&attachment).cloned()
    }

    pub fn attachments(&self) -> impl Iterator<Item = (&Attachment, &Rc<Texture>)> {
        self.attachments.iter()
    }

    /// Creates a texture of `textarget` with `width` by `height` uninitialized pixels,
    /// and attaches it to `attachment`.
    pub fn attach(
        &mut self,
        attachment: Attachment,
        textarget: TextureTarget,
        width: u32,
        height: u32,
        layout: PixelLayout,
    ) -> Result<Rc<Texture>> {
        self.check_attachable(attachment, textarget)?;

        let texture = Texture::with_options(&self.ctx, textarget, TextureOptions::default());
        texture.set_layout(layout);
        texture.allocate(TextureDimensions::D2(width, height))?;

        let texture = Rc::new(texture);
        self.attach_texture(attachment, texture.clone())?;
        Ok(texture)
    }

    /// Attaches an existing texture to `attachment`.
    pub fn attach_texture(&mut self, attachment: Attachment, texture: Rc<Texture>) -> Result<()> {
        self.check_attachable(attachment, texture.target())?;

        self.bind();
        self.ctx.visitor().framebuffer_texture_2d(
            self.target,
            attachment,
            texture.target(),
            texture.id(),
        );
        self.unbind();

        self.attachments.insert(attachment, texture);
        Ok(())
    }

    /// Detaches the texture at `attachment`, and returns it.
    pub fn remove_attachment(&mut self, attachment: Attachment) -> Option<Rc<Texture>> {
        let texture = self.attachments.remove(&attachment)?;

        self.bind();
        self.ctx
            .visitor()
            .framebuffer_texture_2d(self.target, attachment, texture.target(), 0);
        self.unbind();

        Some(texture)
    }

    pub fn take(&mut self) -> FrameBuffer {
        FrameBuffer {
            ctx: self.ctx.clone(),
            handle: self.handle.take(),
            target: self.target,
            attachments: std::mem::replace(&mut self.attachments, HashMap::new()),
        }
    }

    pub fn into_raw(mut self) -> GLuint {
        self.handle.disown()
    }

    fn check_attachable(&self, attachment: Attachment, textarget: TextureTarget) -> Result<()> {
        if self.has_attachment(attachment) {
            return Err(Error::AttachmentOccupied(attachment));
        }

        if !ATTACHABLE_TARGETS.contains(&textarget) {
            return Err(Error::UnsupportedTarget(textarget));
        }

        Ok(())
    }
}

impl Drop for FrameBuffer {
    fn drop(&mut self) {
        if let Some(id) = self.handle.release() {
            self.ctx.visitor().delete_framebuffer(id);
        }
    }
}
