extern crate gltoolbox;

use gltoolbox::errors::Error;
use gltoolbox::video::*;

#[test]
fn headless() {
    let ctx = Context::headless();
    assert!(ctx.gl_version().starts_with("3.3"));
    assert_eq!(ctx.glsl_version(), "3.30");

    assert_eq!(ctx.viewport(), Viewport::new(0, 0, 800, 600));
    ctx.set_viewport([0, 0, 320, 240].into());
    assert_eq!(ctx.viewport().width, 320);
    assert!(!ctx.viewport().is_empty());
    assert!(Viewport::new(0, 0, 320, 0).is_empty());
}

#[test]
fn errors_are_reported_once() {
    let ctx = Context::headless();
    assert!(ctx.check().is_ok());

    // Binding a name the driver never issued.
    let vao = VertexArray::from_raw(&ctx, 42);
    vao.bind();

    match ctx.check() {
        Err(Error::Backend(msg)) => assert!(msg.contains("INVALID_OPERATION")),
        other => panic!("unexpected {:?}", other),
    }

    assert!(ctx.check().is_ok());
}

#[test]
fn shared_contexts() {
    let ctx = Context::headless();
    let other = ctx.clone();

    let buffer = Buffer::new(&other, BufferTarget::Vertex);
    assert!(buffer.is_valid());
    drop(other);

    buffer.upload(&[1u8, 2, 3], BufferHint::Immutable);
    assert_eq!(buffer.len(), 3);
    assert!(ctx.check().is_ok());
}
