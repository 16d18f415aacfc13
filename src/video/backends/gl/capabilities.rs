use std::cmp;
use std::ffi;

use gl::types::*;

use crate::errors::*;

/// Describes the OpenGL context profile.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Profile {
    /// The context uses only future-compatible functions and definitions.
    Core,
    /// The context includes all immediate mode functions and definitions.
    Compatibility,
}

/// Describes a version.
///
/// A version can only be compared to another version if they belong to the same
/// API. For example, both `Version::GL(3, 0) >= Version::ES(3, 0)` and
/// `Version::ES(3, 0) >= Version::GL(3, 0)` return `false`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Version {
    /// Regular OpenGL.
    GL(u8, u8),
    /// OpenGL embedded system.
    ES(u8, u8),
}

impl PartialOrd for Version {
    #[inline]
    fn partial_cmp(&self, other: &Version) -> Option<cmp::Ordering> {
        let (es1, major1, minor1) = match *self {
            Version::GL(major, minor) => (false, major, minor),
            Version::ES(major, minor) => (true, major, minor),
        };

        let (es2, major2, minor2) = match *other {
            Version::GL(major, minor) => (false, major, minor),
            Version::ES(major, minor) => (true, major, minor),
        };

        if es1 != es2 {
            None
        } else {
            Some((major1, minor1).cmp(&(major2, minor2)))
        }
    }
}

impl Version {
    /// Parses the string returned by `glGetString(GL_VERSION)`.
    pub fn parse_str(desc: &str) -> Result<Version> {
        let unformaled = || Error::Backend(format!("[GL] Version {:?} is unformaled.", desc));

        let (es, version) = if desc.starts_with("OpenGL ES-") {
            // "OpenGL ES-CM 1.1", the profile name is followed by a space.
            (true, desc[10..].splitn(2, ' ').nth(1).unwrap_or(""))
        } else if desc.starts_with("OpenGL ES ") {
            (true, &desc[10..])
        } else {
            (false, desc)
        };

        let version = version.split(' ').next().ok_or_else(unformaled)?;
        let mut iter = version.split('.');

        let major = iter
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(unformaled)?;

        let minor = iter
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(unformaled)?;

        if es {
            Ok(Version::ES(major, minor))
        } else {
            Ok(Version::GL(major, minor))
        }
    }

    /// Obtains the OpenGL version of the current context using the loaded functions.
    ///
    /// # Safety
    ///
    /// You must ensure that the functions belong to the current context, otherwise you
    /// will get an undefined behavior.
    pub unsafe fn parse() -> Result<Version> {
        Version::parse_str(&get_string(gl::VERSION)?)
    }
}

/// Represents the capabilities of the context.
///
/// Contrary to the state, these values never change.
#[derive(Debug)]
pub struct Capabilities {
    /// Returns a version or release number. Vendor-specific information may follow the
    /// version number.
    pub version: Version,

    /// The company responsible for this GL implementation.
    pub vendor: String,

    /// The name of the renderer. This name is typically specific to a particular
    /// configuration of a hardware platform.
    pub renderer: String,

    /// The version of the shading language, as reported by the driver.
    pub glsl: String,

    /// The OpenGL context profile if available.
    ///
    /// The context profile is available from OpenGL 3.2 onwards. `None` if not supported.
    pub profile: Option<Profile>,

    /// Maximum width and height of `glViewport`.
    pub max_viewport_dims: (u32, u32),

    /// Maximum number of textures that can be bound to a program.
    ///
    /// `glActiveTexture` must be between `GL_TEXTURE0` and `GL_TEXTURE0` + this value - 1.
    pub max_combined_texture_image_units: u32,

    /// Maximum number of color attachment bind points.
    pub max_color_attachments: u32,
}

impl Capabilities {
    /// Refuses contexts older than OpenGL 3.3, the first core version with both
    /// vertex array objects and instanced attributes.
    pub fn check(&self) -> Result<()> {
        check_version(self.version)
    }

    pub unsafe fn parse() -> Result<Capabilities> {
        let version = Version::parse()?;

        Ok(Capabilities {
            version,
            vendor: get_string(gl::VENDOR)?,
            renderer: get_string(gl::RENDERER)?,
            glsl: get_string(gl::SHADING_LANGUAGE_VERSION)?,
            profile: Capabilities::parse_profile(version),
            max_viewport_dims: Capabilities::parse_viewport_dims(),
            max_combined_texture_image_units: get_integer(gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS, 2),
            max_color_attachments: get_integer(gl::MAX_COLOR_ATTACHMENTS, 1),
        })
    }

    #[inline]
    unsafe fn parse_viewport_dims() -> (u32, u32) {
        let mut val: [GLint; 2] = [0, 0];
        gl::GetIntegerv(gl::MAX_VIEWPORT_DIMS, val.as_mut_ptr());
        (val[0] as u32, val[1] as u32)
    }

    #[inline]
    unsafe fn parse_profile(version: Version) -> Option<Profile> {
        if version >= Version::GL(3, 2) {
            let val = get_integer(gl::CONTEXT_PROFILE_MASK, 0) as GLenum;
            if (val & gl::CONTEXT_COMPATIBILITY_PROFILE_BIT) != 0 {
                Some(Profile::Compatibility)
            } else if (val & gl::CONTEXT_CORE_PROFILE_BIT) != 0 {
                Some(Profile::Core)
            } else {
                None
            }
        } else {
            None
        }
    }
}

pub(crate) unsafe fn get_string(name: GLenum) -> Result<String> {
    let s = gl::GetString(name);
    if s.is_null() {
        return Err(Error::Backend(format!("[GL] String of {} is null.", name)));
    }

    String::from_utf8(ffi::CStr::from_ptr(s as *const _).to_bytes().to_vec())
        .map_err(|_| Error::Backend(format!("[GL] String of {} is unformaled.", name)))
}

#[inline]
unsafe fn get_integer(name: GLenum, default: GLint) -> u32 {
    let mut val = default;
    gl::GetIntegerv(name, &mut val);
    val.max(0) as u32
}

fn check_version(version: Version) -> Result<()> {
    if !(version >= Version::GL(3, 3)) {
        let err = format!("OpenGL 3.3 or later (found {:?})", version);
        return Err(Error::Requirement(err));
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_version() {
        assert_eq!(
            Version::parse_str("4.5.0 NVIDIA 390.77").unwrap(),
            Version::GL(4, 5)
        );
        assert_eq!(
            Version::parse_str("3.3 (Core Profile) Mesa 18.0.5").unwrap(),
            Version::GL(3, 3)
        );
        assert_eq!(
            Version::parse_str("OpenGL ES 3.0 Apple A7 GPU").unwrap(),
            Version::ES(3, 0)
        );
        assert_eq!(
            Version::parse_str("OpenGL ES-CM 1.1").unwrap(),
            Version::ES(1, 1)
        );

        assert!(Version::parse_str("").is_err());
        assert!(Version::parse_str("OpenGL").is_err());
    }

    #[test]
    fn compare_versions() {
        assert!(Version::GL(4, 1) >= Version::GL(3, 3));
        assert!(Version::GL(3, 3) >= Version::GL(3, 3));
        assert!(Version::GL(3, 2) < Version::GL(3, 3));
        assert!(!(Version::ES(3, 0) >= Version::GL(3, 0)));
        assert!(!(Version::GL(3, 0) >= Version::ES(3, 0)));
    }

    #[test]
    fn required_versions() {
        assert!(check_version(Version::GL(3, 3)).is_ok());
        assert!(check_version(Version::GL(4, 6)).is_ok());

        match check_version(Version::GL(3, 2)) {
            Err(Error::Requirement(msg)) => assert!(msg.contains("3.3")),
            other => panic!("unexpected {:?}", other),
        }

        assert!(check_version(Version::ES(3, 0)).is_err());
    }
}
