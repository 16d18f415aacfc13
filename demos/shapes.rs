//! Draws a few polygons, and a line of text if a font file is given.
//!
//! cargo run --example shapes -- [path/to/font.ttf]

extern crate env_logger;
extern crate glutin;
extern crate gltoolbox;

use glutin::GlContext;

use gltoolbox::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    let builder = glutin::WindowBuilder::new()
        .with_title("gltoolbox - shapes")
        .with_dimensions(glutin::dpi::LogicalSize::new(640.0, 480.0));

    let context = glutin::ContextBuilder::new()
        .with_gl_profile(glutin::GlProfile::Core)
        .with_gl(glutin::GlRequest::Specific(glutin::Api::OpenGl, (3, 3)))
        .with_vsync(true);

    let mut events_loop = glutin::EventsLoop::new();
    let window = glutin::GlWindow::new(builder, context, &events_loop)
        .map_err(|err| Error::Backend(format!("{}", err)))?;

    let ctx = unsafe {
        window
            .make_current()
            .map_err(|err| Error::Backend(format!("{}", err)))?;
        Context::load_with(|symbol| window.get_proc_address(symbol) as *const _)?
    };

    println!("OpenGL {}, GLSL {}", ctx.gl_version(), ctx.glsl_version());

    let mut shapes = Shapes::new(&ctx);
    let mut text = TextRenderer::new(&ctx)?;
    if let Some(path) = std::env::args().nth(1) {
        text.load_font_file(path, 48)?;
        text.set_font_size(32.0);
        text.set_font_color([0.9, 0.9, 0.9]);
    }

    let mut theta = 0.0f32;
    let mut running = true;

    while running {
        events_loop.poll_events(|event| {
            if let glutin::Event::WindowEvent { event, .. } = event {
                if let glutin::WindowEvent::CloseRequested = event {
                    running = false;
                }
            }
        });

        if let Some(size) = window.get_inner_size() {
            let size = size.to_physical(window.get_hidpi_factor());
            ctx.set_viewport(Viewport::new(0, 0, size.width as i32, size.height as i32));
        }

        unsafe {
            gltoolbox::gl::ClearColor(0.1, 0.1, 0.12, 1.0);
            gltoolbox::gl::Clear(gltoolbox::gl::COLOR_BUFFER_BIT);
        }

        for sides in 3..9 {
            let x = 20.0 + (sides - 3) as f32 * 100.0;
            shapes.color(Color::new(1.0, sides as f32 / 8.0, 0.2, 1.0));
            shapes.draw_ngon(sides, x, 40.0, 80.0, 80.0, theta)?;
        }

        shapes.color(Color::white());
        shapes.draw_ngon(360, 40.0, 180.0, 120.0, 60.0, 0.0)?;
        shapes.color(Color::blue());
        shapes.draw_quad(220.0, 180.0, 160.0, 60.0, -theta)?;
        shapes.color(Color::green());
        shapes.draw_line(420.0, 180.0, 600.0, 260.0, 3.0)?;

        if text.current_font().is_some() {
            text.draw("Hello, gltoolbox!", 20.0, 340.0)?;
        }

        ctx.check()?;
        window
            .swap_buffers()
            .map_err(|err| Error::Backend(format!("{}", err)))?;

        theta += 0.01;
    }

    Ok(())
}
