extern crate gltoolbox;

use std::rc::Rc;

use gltoolbox::errors::Error;
use gltoolbox::video::backends::headless::{HeadlessVisitor, ObjectKind};
use gltoolbox::video::backends::TextureParameter;
use gltoolbox::video::*;

fn headless() -> (Rc<HeadlessVisitor>, Context) {
    let visitor = Rc::new(HeadlessVisitor::new());
    let ctx = Context::new(visitor.clone());
    (visitor, ctx)
}

#[test]
fn upload_2d() {
    let (visitor, ctx) = headless();

    let texture = Texture::new(&ctx, TextureTarget::Texture2D);
    assert!(texture.is_valid());
    assert_eq!(texture.dimension(), 2);
    assert_eq!((texture.width(), texture.height(), texture.depth()), (0, 0, 0));

    let pixels: Vec<u8> = (0..2 * 3 * 4).map(|v| v as u8).collect();
    texture.upload_2d(Some(&pixels), 2, 3).unwrap();
    assert_eq!((texture.width(), texture.height(), texture.depth()), (2, 3, 1));
    assert_eq!(visitor.texture_dimensions(texture.id()), Some(TextureDimensions::D2(2, 3)));
    assert_eq!(visitor.texture_data(texture.id()), Some(pixels.clone()));

    assert_eq!(texture.download_bytes().unwrap(), pixels);

    // Uploads leave the texture unbound.
    assert_eq!(visitor.bound_texture(0, TextureTarget::Texture2D), 0);
    assert!(ctx.check().is_ok());
}

#[test]
fn formats() {
    let (visitor, ctx) = headless();

    let texture = Texture::new(&ctx, TextureTarget::Texture1D);
    texture.set_format(InternalFormat::R32F, PixelFormat::Red);
    texture.set_type(PixelType::Float);
    assert_eq!(texture.layout().bytes_per_pixel(), 4);

    texture.upload_1d(Some(&[0.5f32, 1.0, 2.0]), 3).unwrap();
    assert_eq!(
        visitor.texture_layout(texture.id()),
        Some(PixelLayout::new(InternalFormat::R32F, PixelFormat::Red, PixelType::Float))
    );

    let mut out = [0.0f32; 3];
    texture.download(&mut out).unwrap();
    assert_eq!(out, [0.5, 1.0, 2.0]);

    let mut small = [0.0f32; 2];
    match texture.download(&mut small) {
        Err(Error::OutOfBounds) => {}
        other => panic!("unexpected {:?}", other),
    }

    let mut bytes = [0u8; 12];
    texture
        .download_as(&mut bytes, PixelFormat::Red, PixelType::Float)
        .unwrap();
    assert_eq!(&bytes[..4], &0.5f32.to_ne_bytes());
}

#[test]
fn refused_uploads() {
    let (visitor, ctx) = headless();

    let texture = Texture::new(&ctx, TextureTarget::Texture3D);
    match texture.upload_2d::<u8>(None, 4, 4) {
        Err(Error::DimensionMismatch(2, 3)) => {}
        other => panic!("unexpected {:?}", other),
    }

    match texture.upload_3d(Some(&[0u8; 7]), 1, 2, 1) {
        Err(Error::OutOfBounds) => {}
        other => panic!("unexpected {:?}", other),
    }

    assert_eq!(visitor.texture_dimensions(texture.id()), None);
    assert_eq!(texture.depth(), 0);

    texture.allocate(TextureDimensions::D3(2, 2, 2)).unwrap();
    assert_eq!(visitor.texture_data(texture.id()), Some(vec![0; 32]));
    assert_eq!(texture.depth(), 2);
}

#[test]
fn aligned_rows() {
    let (visitor, ctx) = headless();

    let texture = Texture::new(&ctx, TextureTarget::Texture2D);
    texture.set_format(InternalFormat::R8, PixelFormat::Red);
    assert_eq!(visitor.unpack_alignment_value(), 4);
    assert_eq!(visitor.pack_alignment_value(), 4);

    // Rows of 3 bytes start every 4 bytes, so 2 rows need 7 bytes.
    match texture.upload_2d(Some(&[1u8; 6]), 3, 2) {
        Err(Error::OutOfBounds) => {}
        other => panic!("unexpected {:?}", other),
    }

    assert_eq!(visitor.texture_dimensions(texture.id()), None);

    texture.upload_2d(Some(&[1u8, 2, 3, 0, 4, 5, 6]), 3, 2).unwrap();
    assert_eq!(visitor.texture_data(texture.id()), Some(vec![1, 2, 3, 4, 5, 6]));

    let mut tight = [0u8; 6];
    match texture.download(&mut tight) {
        Err(Error::OutOfBounds) => {}
        other => panic!("unexpected {:?}", other),
    }

    let mut padded = [9u8; 8];
    texture.download(&mut padded).unwrap();
    assert_eq!(padded, [1, 2, 3, 9, 4, 5, 6, 9]);

    Texture::pack_alignment(&ctx, 1);
    texture.download(&mut tight).unwrap();
    assert_eq!(tight, [1, 2, 3, 4, 5, 6]);

    Texture::pack_alignment(&ctx, 8);
    assert_eq!(texture.download_bytes().unwrap(), vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(visitor.pack_alignment_value(), 8);

    Texture::unpack_alignment(&ctx, 1);
    texture.upload_2d(Some(&[7u8; 6]), 3, 2).unwrap();
    assert_eq!(visitor.texture_data(texture.id()), Some(vec![7; 6]));

    Texture::pack_alignment(&ctx, 5);
    assert!(ctx.check().is_err());
    assert_eq!(visitor.pack_alignment_value(), 8);
}

#[test]
fn options() {
    let (visitor, ctx) = headless();

    let options = TextureOptions {
        min_filter: TextureFilter::LinearMipmapLinear,
        mag_filter: TextureFilter::Nearest,
        wrap_s: TextureWrap::Clamp,
        wrap_t: TextureWrap::Mirror,
        wrap_r: TextureWrap::MirrorClamp,
    };

    let texture = Texture::with_options(&ctx, TextureTarget::Texture2D, options);
    let params = visitor.texture_parameters(texture.id());
    assert!(params.contains(&TextureParameter::MinFilter(TextureFilter::LinearMipmapLinear)));
    assert!(params.contains(&TextureParameter::MagFilter(TextureFilter::Nearest)));
    assert!(params.contains(&TextureParameter::WrapS(TextureWrap::Clamp)));
    assert!(params.contains(&TextureParameter::WrapT(TextureWrap::Mirror)));
    // A 2D texture has no third coordinate.
    assert!(!params.contains(&TextureParameter::WrapR(TextureWrap::MirrorClamp)));

    let line = Texture::with_options(&ctx, TextureTarget::Texture1D, options);
    assert_eq!(visitor.texture_parameters(line.id()).len(), 3);

    texture.upload_2d::<u8>(None, 8, 8).unwrap();
    assert!(!visitor.has_mipmaps(texture.id()));
    texture.generate_mipmaps();
    assert!(visitor.has_mipmaps(texture.id()));
}

#[test]
fn units_and_alignment() {
    let (visitor, ctx) = headless();

    let texture = Texture::new(&ctx, TextureTarget::CubeMapPositiveY);
    Texture::activate(&ctx, 2);
    texture.bind();
    assert_eq!(visitor.active_unit(), 2);
    assert_eq!(visitor.bound_texture(2, TextureTarget::CubeMap), texture.id());
    assert_eq!(visitor.bound_texture(0, TextureTarget::CubeMap), 0);
    texture.unbind();
    assert_eq!(visitor.bound_texture(2, TextureTarget::CubeMap), 0);

    Texture::unpack_alignment(&ctx, 1);
    assert_eq!(visitor.unpack_alignment_value(), 1);
    Texture::unpack_alignment(&ctx, 3);
    assert!(ctx.check().is_err());
    assert_eq!(visitor.unpack_alignment_value(), 1);
}

#[test]
fn ownership() {
    let (visitor, ctx) = headless();

    let mut texture = Texture::new(&ctx, TextureTarget::Texture2D);
    texture.upload_2d(Some(&[0u8; 16]), 2, 2).unwrap();

    let moved = texture.take();
    assert_eq!(texture.id(), 0);
    assert!(!texture.is_valid());
    assert_eq!(texture.width(), 0);
    assert_eq!(moved.width(), 2);

    drop(texture);
    assert_eq!(visitor.num_deleted(ObjectKind::Texture), 0);

    let raw = moved.into_raw();
    assert_eq!(visitor.num_deleted(ObjectKind::Texture), 0);

    {
        let borrowed = Texture::from_raw(&ctx, raw, TextureTarget::Texture2D);
        assert!(borrowed.is_valid());
        assert!(!borrowed.is_owned());
    }

    assert_eq!(visitor.num_alive(ObjectKind::Texture), 1);

    {
        let _owned = Texture::new(&ctx, TextureTarget::Texture2D);
    }

    assert_eq!(visitor.num_deleted(ObjectKind::Texture), 1);
}
