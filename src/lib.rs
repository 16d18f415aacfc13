//! # What is This?
//!
//! `gltoolbox` is a thin layer over OpenGL. It wraps the opaque handles issued by the
//! driver (buffers, shaders, programs, textures, framebuffers and vertex arrays) into
//! objects that own their lifetime, and builds a couple of small drawing helpers on top
//! of those wrappers.
//!
//! Every wrapper is created from a [`Context`](video/struct.Context.html), which hides
//! the driver behind the [`Visitor`](video/backends/trait.Visitor.html) trait. The
//! default visitor talks to a live OpenGL context; a headless one simulates the
//! driver in memory so everything can be exercised without a window.
//!
//! ```rust,ignore
//! let ctx = unsafe { Context::load_with(|s| window.get_proc_address(s) as *const _)? };
//!
//! let mut shapes = Shapes::new(&ctx);
//! shapes.color(Color::red());
//! shapes.draw_quad(10.0, 10.0, 200.0, 100.0, 0.0)?;
//! ```
//!
//! All the calls must happen on the thread that owns the current GL context.

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;

pub extern crate cgmath;
pub extern crate gl;

pub mod errors;
pub mod math;
pub mod settings;
pub mod shapes;
pub mod text;
pub mod video;

pub mod prelude;
