//! OpenGL 3.3+ implementation of the `Visitor`.

pub mod capabilities;
pub mod types;
pub mod visitor;
