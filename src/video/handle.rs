use std::mem;

use gl::types::GLuint;

/// A driver object name, plus whether the wrapper holding it is responsible for
/// deleting it.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct RawHandle {
    id: GLuint,
    owned: bool,
}

impl RawHandle {
    pub fn owned(id: GLuint) -> Self {
        RawHandle { id, owned: true }
    }

    pub fn borrowed(id: GLuint) -> Self {
        RawHandle { id, owned: false }
    }

    pub fn empty() -> Self {
        RawHandle { id: 0, owned: false }
    }

    #[inline]
    pub fn id(&self) -> GLuint {
        self.id
    }

    #[inline]
    pub fn is_owned(&self) -> bool {
        self.owned
    }

    /// Moves the name out, leaving an empty handle behind.
    pub fn take(&mut self) -> RawHandle {
        mem::replace(self, RawHandle::empty())
    }

    /// Gives up the ownership and returns the name.
    pub fn disown(&mut self) -> GLuint {
        self.owned = false;
        self.id
    }

    /// Empties the handle, returning the name if it has to be deleted.
    pub fn release(&mut self) -> Option<GLuint> {
        let handle = self.take();
        if handle.owned && handle.id != 0 {
            Some(handle.id)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn release() {
        let mut handle = RawHandle::owned(3);
        assert_eq!(handle.release(), Some(3));
        assert_eq!(handle.id(), 0);
        assert_eq!(handle.release(), None);

        let mut handle = RawHandle::borrowed(3);
        assert_eq!(handle.release(), None);

        let mut handle = RawHandle::owned(4);
        assert_eq!(handle.disown(), 4);
        assert_eq!(handle.release(), None);
    }

    #[test]
    fn take() {
        let mut handle = RawHandle::owned(5);
        let moved = handle.take();
        assert_eq!(moved, RawHandle::owned(5));
        assert_eq!(handle, RawHandle::empty());
    }
}
