extern crate gltoolbox;

use std::rc::Rc;

use gltoolbox::errors::Error;
use gltoolbox::video::backends::headless::{HeadlessVisitor, ObjectKind};
use gltoolbox::video::*;

fn headless() -> (Rc<HeadlessVisitor>, Context) {
    let visitor = Rc::new(HeadlessVisitor::new());
    let ctx = Context::new(visitor.clone());
    (visitor, ctx)
}

#[test]
fn status() {
    let (_, ctx) = headless();

    let mut fb = FrameBuffer::new(&ctx, FramebufferTarget::Framebuffer);
    assert!(fb.is_valid());
    assert_eq!(fb.status(), FramebufferStatus::IncompleteMissingAttachment);
    assert_eq!(
        fb.status_as_string(),
        "GL_FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT"
    );

    // A texture without storage is not a valid attachment.
    let empty = Rc::new(Texture::new(&ctx, TextureTarget::Texture2D));
    fb.attach_texture(Attachment::Color(1), empty).unwrap();
    assert_eq!(fb.status(), FramebufferStatus::IncompleteAttachment);

    fb.remove_attachment(Attachment::Color(1)).unwrap();
    fb.attach(
        Attachment::Color(0),
        TextureTarget::Texture2D,
        64,
        32,
        PixelLayout::default(),
    ).unwrap();

    assert_eq!(fb.status(), FramebufferStatus::Complete);
    assert_eq!(fb.status_as_string(), "GL_FRAMEBUFFER_COMPLETE");
    assert_eq!(format!("{}", FramebufferStatus::Unknown(7)), "UNKNOWN_ERROR");
    assert!(ctx.check().is_ok());
}

#[test]
fn attach() {
    let (visitor, ctx) = headless();

    let mut fb = FrameBuffer::new(&ctx, FramebufferTarget::Framebuffer);
    let depth = PixelLayout::new(InternalFormat::Depth24, PixelFormat::Depth, PixelType::UInt);
    let texture = fb
        .attach(Attachment::Depth, TextureTarget::Texture2D, 16, 16, depth)
        .unwrap();

    assert!(fb.has_attachment(Attachment::Depth));
    assert_eq!((texture.width(), texture.height()), (16, 16));
    assert_eq!(texture.internal_format(), InternalFormat::Depth24);
    assert_eq!(visitor.framebuffer_attachment(fb.id(), Attachment::Depth), texture.id());
    assert!(Rc::ptr_eq(&fb.texture(Attachment::Depth).unwrap(), &texture));
    assert_eq!(fb.attachments().count(), 1);

    // The framebuffer is left unbound.
    assert_eq!(visitor.bound_framebuffer(FramebufferTarget::Draw), 0);
}

#[test]
fn refused_attachments() {
    let (visitor, ctx) = headless();

    let mut fb = FrameBuffer::new(&ctx, FramebufferTarget::Draw);
    let first = fb
        .attach(Attachment::Color(0), TextureTarget::Texture2D, 8, 8, PixelLayout::default())
        .unwrap();

    let second = Rc::new(Texture::new(&ctx, TextureTarget::Texture2D));
    match fb.attach_texture(Attachment::Color(0), second.clone()) {
        Err(Error::AttachmentOccupied(Attachment::Color(0))) => {}
        other => panic!("unexpected {:?}", other),
    }

    assert_eq!(visitor.framebuffer_attachment(fb.id(), Attachment::Color(0)), first.id());

    let volume = Rc::new(Texture::new(&ctx, TextureTarget::Texture3D));
    match fb.attach_texture(Attachment::Color(1), volume) {
        Err(Error::UnsupportedTarget(TextureTarget::Texture3D)) => {}
        other => panic!("unexpected {:?}", other),
    }

    assert!(fb
        .attach(Attachment::Color(2), TextureTarget::CubeMap, 8, 8, PixelLayout::default())
        .is_err());
    assert!(!fb.has_attachment(Attachment::Color(1)));
    assert!(!fb.has_attachment(Attachment::Color(2)));

    // Faces of a cube map are fine.
    fb.attach(
        Attachment::Color(3),
        TextureTarget::CubeMapNegativeZ,
        8,
        8,
        PixelLayout::default(),
    ).unwrap();
}

#[test]
fn shared_textures() {
    let (visitor, ctx) = headless();

    let texture = Rc::new(Texture::new(&ctx, TextureTarget::Texture2D));
    texture.allocate(TextureDimensions::D2(4, 4)).unwrap();

    {
        let mut a = FrameBuffer::new(&ctx, FramebufferTarget::Framebuffer);
        let mut b = FrameBuffer::new(&ctx, FramebufferTarget::Framebuffer);
        a.attach_texture(Attachment::Color(0), texture.clone()).unwrap();
        b.attach_texture(Attachment::Color(0), texture.clone()).unwrap();
        assert_eq!(Rc::strong_count(&texture), 3);

        let removed = a.remove_attachment(Attachment::Color(0)).unwrap();
        assert!(Rc::ptr_eq(&removed, &texture));
        assert_eq!(visitor.framebuffer_attachment(a.id(), Attachment::Color(0)), 0);
        assert!(a.remove_attachment(Attachment::Color(0)).is_none());
    }

    assert_eq!(Rc::strong_count(&texture), 1);
    assert!(texture.is_valid());
    assert_eq!(visitor.num_deleted(ObjectKind::Framebuffer), 2);
    assert_eq!(visitor.num_deleted(ObjectKind::Texture), 0);
}

#[test]
fn ownership() {
    let (visitor, ctx) = headless();

    let mut fb = FrameBuffer::new(&ctx, FramebufferTarget::Framebuffer);
    fb.attach(Attachment::Color(0), TextureTarget::Texture2D, 2, 2, PixelLayout::default())
        .unwrap();

    let moved = fb.take();
    assert_eq!(fb.id(), 0);
    assert!(!fb.is_valid());
    assert!(!fb.has_attachment(Attachment::Color(0)));
    assert!(moved.has_attachment(Attachment::Color(0)));

    drop(fb);
    assert_eq!(visitor.num_deleted(ObjectKind::Framebuffer), 0);

    drop(moved);
    assert_eq!(visitor.num_deleted(ObjectKind::Framebuffer), 1);
    assert_eq!(visitor.num_deleted(ObjectKind::Texture), 1);

    let raw = FrameBuffer::new(&ctx, FramebufferTarget::Read).into_raw();
    drop(FrameBuffer::from_raw(&ctx, raw, FramebufferTarget::Read));
    assert_eq!(visitor.num_alive(ObjectKind::Framebuffer), 1);
}
