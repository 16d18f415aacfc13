extern crate gltoolbox;

use std::rc::Rc;

use gltoolbox::errors::Error;
use gltoolbox::video::backends::headless::{HeadlessVisitor, ObjectKind};
use gltoolbox::video::*;

const VS: &str = r#"
#version 330 core
in vec2 position;
in vec2 offset;
void main(void) { gl_Position = vec4(position + offset, 0.0, 1.0); }
"#;

const FS: &str = r#"
#version 330 core
out vec4 colour;
void main(void) { colour = vec4(1.0); }
"#;

fn headless() -> (Rc<HeadlessVisitor>, Context) {
    let visitor = Rc::new(HeadlessVisitor::new());
    let ctx = Context::new(visitor.clone());
    (visitor, ctx)
}

fn program(ctx: &Context) -> Program {
    let mut program = Program::with_sources(ctx, VS, FS).unwrap();
    program.add_attributes(&["position", "offset"]).unwrap();
    program
}

#[test]
fn indexed_draws() {
    let (visitor, ctx) = headless();
    let program = program(&ctx);

    let mut vao = VertexArray::new(&ctx);
    assert!(vao.is_valid());

    let verts = [[0.0f32, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
    vao.add_attribute("position", &verts, AttributeFormat::floats(2), BufferHint::Immutable, 0)
        .unwrap();
    vao.set_index_buffer(Primitive::Triangles, &[0u16, 1, 2, 0, 2, 3], BufferHint::Immutable);

    assert!(vao.has_index_buffer());
    assert_eq!(vao.index_count(), 6);
    assert_eq!(vao.index_format(), Some(IndexFormat::U16));
    assert_eq!(vao.primitive(), Some(Primitive::Triangles));

    program.use_program();
    vao.bind();
    vao.enable_attributes(program.attributes());
    vao.draw_elements().unwrap();
    vao.draw_elements_range(3, 3).unwrap();
    vao.draw_elements_instanced(4).unwrap();
    vao.disable_attributes(program.attributes());
    vao.unbind();

    let draws = visitor.draws();
    assert_eq!(draws.len(), 3);
    assert_eq!(draws[0].indices, Some(vec![0, 1, 2, 0, 2, 3]));
    assert_eq!(draws[0].vertex_array, vao.id());
    assert_eq!(draws[1].first, 3);
    assert_eq!(draws[1].indices, Some(vec![0, 2, 3]));
    assert_eq!(draws[2].instances, Some(4));

    match vao.draw_elements_range(4, 3) {
        Err(Error::OutOfBounds) => {}
        other => panic!("unexpected {:?}", other),
    }

    match vao.draw_elements_range(1, usize::max_value()) {
        Err(Error::OutOfBounds) => {}
        other => panic!("unexpected {:?}", other),
    }

    assert_eq!(visitor.draws().len(), 3);
    assert!(ctx.check().is_ok());
}

#[test]
fn missing_index_buffer() {
    let (visitor, ctx) = headless();

    let mut vao = VertexArray::new(&ctx);
    match vao.draw_elements_range(0, 100) {
        Err(Error::MissingIndexBuffer) => {}
        other => panic!("unexpected {:?}", other),
    }

    vao.set_index_buffer(Primitive::Lines, &[0u8, 1], BufferHint::Immutable);
    let removed = vao.remove_index_buffer().unwrap();
    assert_eq!(removed.len(), 2);
    assert!(!vao.has_index_buffer());
    assert!(vao.draw_elements().is_err());
    assert!(visitor.draws().is_empty());
}

#[test]
fn attribute_state() {
    let (visitor, ctx) = headless();
    let program = program(&ctx);

    let mut vao = VertexArray::new(&ctx);
    let position = vao
        .add_attribute("position", &[[0.0f32; 2]; 3], AttributeFormat::floats(2), BufferHint::Immutable, 0)
        .unwrap();

    let format = AttributeFormat::floats(2).with_stride(16).with_offset(8);
    let offsets = vao
        .add_attribute("offset", &[[0.0f32; 4]; 2], format, BufferHint::Dynamic, 1)
        .unwrap();

    match vao.add_attribute_buffer("offset", position.clone(), AttributeFormat::floats(2), 0) {
        Err(Error::DuplicateAttribute(name)) => assert_eq!(name, "offset"),
        other => panic!("unexpected {:?}", other),
    }

    let loc = program.attribute_location("offset").unwrap() as u32;
    vao.bind();
    vao.enable_attributes(program.attributes());

    let state = visitor.attribute_state(vao.id(), loc).unwrap();
    assert!(state.enabled);
    assert_eq!(state.buffer, offsets.id());
    assert_eq!(state.format, Some(format));
    assert_eq!(state.divisor, 1);

    vao.disable_attributes(program.attributes());
    let state = visitor.attribute_state(vao.id(), loc).unwrap();
    assert!(!state.enabled);
    assert_eq!(state.divisor, 0);
    vao.unbind();

    // Nothing leaked into the default vertex array.
    assert_eq!(visitor.attribute_state(0, loc), None);

    assert!(vao.set_attribute_divisor("offset", 2));
    assert_eq!(vao.attribute_divisor("offset"), Some(2));
    assert!(!vao.set_attribute_divisor("normal", 2));
    assert!(vao.set_attribute_format("position", AttributeFormat::floats(2).normalized(true)));
    assert!(vao.attribute_format("position").unwrap().normalized);
    assert_eq!(vao.num_attributes(), 2);
}

#[test]
fn shared_and_weak_buffers() {
    let (_, ctx) = headless();

    let buffer = Rc::new(Buffer::with_data(&ctx, BufferTarget::Vertex, &[0.0f32; 8], BufferHint::Immutable));

    let mut a = VertexArray::new(&ctx);
    let mut b = VertexArray::new(&ctx);
    a.add_attribute_buffer("position", buffer.clone(), AttributeFormat::floats(2), 0)
        .unwrap();
    b.add_attribute_buffer("position", buffer.clone(), AttributeFormat::floats(2), 0)
        .unwrap();

    let weak = a.attribute_buffer("position").unwrap();
    assert!(weak.upgrade().is_some());
    assert!(a.attribute_buffer("normal").is_none());

    drop(buffer);
    assert!(a.has_attribute("position"));

    a.remove_attribute("position").unwrap();
    assert!(weak.upgrade().is_some());

    drop(b);
    // The last owner is gone.
    assert!(weak.upgrade().is_none());
    assert!(!a.has_attribute("position"));

    a.set_index_buffer(Primitive::Points, &[0u32, 1, 2], BufferHint::Immutable);
    let indices = a.index_buffer().unwrap();
    assert_eq!(a.index_count(), 3);
    a.remove_index_buffer();
    assert!(indices.upgrade().is_none());
}

#[test]
fn array_draws() {
    let (visitor, ctx) = headless();
    let program = program(&ctx);

    let vao = VertexArray::new(&ctx);
    program.use_program();
    vao.bind();
    vao.draw_arrays(Primitive::LineStrip, 1, 3);
    vao.draw_arrays_instanced(Primitive::Points, 0, 1, 10);
    vao.unbind();

    let draws = visitor.draws();
    assert_eq!(draws[0].primitive, Primitive::LineStrip);
    assert_eq!((draws[0].first, draws[0].count), (1, 3));
    assert_eq!(draws[0].indices, None);
    assert_eq!(draws[1].instances, Some(10));
}

#[test]
fn ownership() {
    let (visitor, ctx) = headless();

    let mut vao = VertexArray::new(&ctx);
    vao.set_index_buffer(Primitive::Triangles, &[0u8, 1, 2], BufferHint::Immutable);

    let moved = vao.take();
    assert_eq!(vao.id(), 0);
    assert!(!vao.is_valid());
    assert!(!vao.has_index_buffer());
    assert!(moved.has_index_buffer());

    drop(vao);
    assert_eq!(visitor.num_deleted(ObjectKind::VertexArray), 0);

    drop(moved);
    assert_eq!(visitor.num_deleted(ObjectKind::VertexArray), 1);
    assert_eq!(visitor.num_alive(ObjectKind::Buffer), 0);

    let raw = VertexArray::new(&ctx).into_raw();
    drop(VertexArray::from_raw(&ctx, raw));
    assert_eq!(visitor.num_alive(ObjectKind::VertexArray), 1);
}
