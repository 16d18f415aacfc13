use cgmath::{Matrix2, Matrix3, Matrix4, Vector2, Vector3, Vector4};
use gl::types::GLint;

use crate::math::Color;

/// Uniform variable for program objects. Each matrix based `UniformVariable` is
/// assumed to be supplied in column major order with a optional transpose.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformVariable {
    I32(i32),
    U32(u32),
    F32(f32),
    F64(f64),
    Vector2i([i32; 2]),
    Vector3i([i32; 3]),
    Vector4i([i32; 4]),
    Vector2u([u32; 2]),
    Vector3u([u32; 3]),
    Vector4u([u32; 4]),
    Vector2f([f32; 2]),
    Vector3f([f32; 3]),
    Vector4f([f32; 4]),
    Matrix2f([[f32; 2]; 2], bool),
    Matrix3f([[f32; 3]; 3], bool),
    Matrix4f([[f32; 4]; 4], bool),
}

macro_rules! impl_from_variable {
    ($ty: ty, $variant: ident) => {
        impl From<$ty> for UniformVariable {
            fn from(v: $ty) -> Self {
                UniformVariable::$variant(v)
            }
        }
    };
}

impl_from_variable!(i32, I32);
impl_from_variable!(u32, U32);
impl_from_variable!(f32, F32);
impl_from_variable!(f64, F64);
impl_from_variable!([i32; 2], Vector2i);
impl_from_variable!([i32; 3], Vector3i);
impl_from_variable!([i32; 4], Vector4i);
impl_from_variable!([u32; 2], Vector2u);
impl_from_variable!([u32; 3], Vector3u);
impl_from_variable!([u32; 4], Vector4u);
impl_from_variable!([f32; 2], Vector2f);
impl_from_variable!([f32; 3], Vector3f);
impl_from_variable!([f32; 4], Vector4f);

impl From<Vector2<f32>> for UniformVariable {
    fn from(v: Vector2<f32>) -> Self {
        UniformVariable::Vector2f(*v.as_ref())
    }
}

impl From<Vector3<f32>> for UniformVariable {
    fn from(v: Vector3<f32>) -> Self {
        UniformVariable::Vector3f(*v.as_ref())
    }
}

impl From<Vector4<f32>> for UniformVariable {
    fn from(v: Vector4<f32>) -> Self {
        UniformVariable::Vector4f(*v.as_ref())
    }
}

impl From<Matrix2<f32>> for UniformVariable {
    fn from(v: Matrix2<f32>) -> Self {
        UniformVariable::Matrix2f(*v.as_ref(), false)
    }
}

impl From<Matrix3<f32>> for UniformVariable {
    fn from(v: Matrix3<f32>) -> Self {
        UniformVariable::Matrix3f(*v.as_ref(), false)
    }
}

impl From<Matrix4<f32>> for UniformVariable {
    fn from(v: Matrix4<f32>) -> Self {
        UniformVariable::Matrix4f(*v.as_ref(), false)
    }
}

impl From<Color> for UniformVariable {
    fn from(v: Color) -> Self {
        UniformVariable::Vector4f(v.into())
    }
}

/// A named uniform of a linked program. The value attached to it is kept on the
/// CPU side until it is pushed to the driver.
#[derive(Debug, Clone, PartialEq)]
pub struct Uniform {
    name: String,
    location: GLint,
    value: Option<UniformVariable>,
}

impl Uniform {
    pub(crate) fn new(name: &str, location: GLint) -> Self {
        Uniform {
            name: name.to_owned(),
            location,
            value: None,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn location(&self) -> GLint {
        self.location
    }

    pub(crate) fn set_location(&mut self, location: GLint) {
        self.location = location;
    }

    #[inline]
    pub fn value(&self) -> Option<UniformVariable> {
        self.value
    }

    #[inline]
    pub fn is_attached(&self) -> bool {
        self.value.is_some()
    }

    pub fn attach<T: Into<UniformVariable>>(&mut self, value: T) {
        self.value = Some(value.into());
    }

    pub fn detach(&mut self) -> Option<UniformVariable> {
        self.value.take()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn conversions() {
        assert_eq!(UniformVariable::from(2), UniformVariable::I32(2));
        assert_eq!(UniformVariable::from(2u32), UniformVariable::U32(2));
        assert_eq!(
            UniformVariable::from(Vector2::new(1.0, 2.0)),
            UniformVariable::Vector2f([1.0, 2.0])
        );
        assert_eq!(
            UniformVariable::from(Color::red()),
            UniformVariable::Vector4f([1.0, 0.0, 0.0, 1.0])
        );

        let m = Matrix2::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(
            UniformVariable::from(m),
            UniformVariable::Matrix2f([[1.0, 2.0], [3.0, 4.0]], false)
        );
    }

    #[test]
    fn attach() {
        let mut uniform = Uniform::new("scale", 3);
        assert!(!uniform.is_attached());

        uniform.attach(0.5f32);
        assert_eq!(uniform.value(), Some(UniformVariable::F32(0.5)));
        assert_eq!(uniform.detach(), Some(UniformVariable::F32(0.5)));
        assert!(!uniform.is_attached());
    }
}
