use crate::errors::ShaderBuildError;
use crate::shader_build::{self, GlCalls, ShaderFailurePolicy};
use gl::types::{GLenum, GLfloat, GLsizei, GLsizeiptr, GLuint, GLushort};
use std::ffi::{c_void, CStr, CString};
use std::fmt::{Debug, Display, Formatter};
use std::marker::PhantomData;
use std::mem::{size_of, MaybeUninit};
use std::os::raw::c_char;
use std::ptr::null;

/// Point the `gl` crate at the platform loader and check that the entry points we need
/// actually resolved.  `loader` is usually `GlDisplay::get_proc_address`.
pub fn initialize_gl_with<F>(mut loader: F) -> Result<(), GLErrorWrapper>
where
    F: FnMut(&CStr) -> *const c_void,
{
    gl::load_with(|name| match CString::new(name) {
        Ok(name) => loader(&name),
        Err(_) => null(),
    });

    let missing: Vec<&str> = [
        ("glCreateShader", gl::CreateShader::is_loaded()),
        ("glCreateProgram", gl::CreateProgram::is_loaded()),
        ("glGenVertexArrays", gl::GenVertexArrays::is_loaded()),
        ("glGenBuffers", gl::GenBuffers::is_loaded()),
        ("glViewport", gl::Viewport::is_loaded()),
        ("glDrawElements", gl::DrawElements::is_loaded()),
    ]
    .into_iter()
    .filter(|(_, loaded)| !loaded)
    .map(|(name, _)| name)
    .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(GLErrorWrapper::with_message2(format!(
            "failed to load GL entry points: {}",
            missing.join(", ")
        )))
    }
}

pub fn explode_if_gl_error() -> Result<(), GLErrorWrapper> {
    let mut last_err = None;
    loop {
        let err = unsafe { gl::GetError() };
        if err == gl::NO_ERROR {
            break;
        } else {
            last_err = Some(err);
        }
    }

    match last_err {
        Some(e) => Err(GLErrorWrapper::new(e)),
        None => Ok(()),
    }
}

/// `glGetString`, for things like `gl::VERSION` and `gl::RENDERER`
pub fn get_string(name: GLenum) -> Option<String> {
    let ptr = unsafe { gl::GetString(name) };
    if ptr.is_null() {
        None
    } else {
        let text = unsafe { CStr::from_ptr(ptr as *const c_char) };
        Some(text.to_string_lossy().into_owned())
    }
}

//

#[derive(Clone)]
pub enum MessageForError {
    None,
    Str(String),
}

#[derive(Clone)]
pub struct GLErrorWrapper {
    pub code: GLenum,
    pub message: MessageForError,
}

impl GLErrorWrapper {
    pub fn with_message2(msg: String) -> Self {
        Self {
            code: 0,
            message: MessageForError::Str(msg),
        }
    }

    pub fn new(code: GLenum) -> Self {
        Self {
            code,
            message: MessageForError::None,
        }
    }
}

impl Debug for GLErrorWrapper {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            MessageForError::Str(msg) => write!(f, "{:?}", msg),
            MessageForError::None => write!(f, "0x{:x}", self.code),
        }
    }
}

impl Display for GLErrorWrapper {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        <Self as Debug>::fmt(self, f)
    }
}

impl std::error::Error for GLErrorWrapper {}

//

pub trait BufferTarget {
    const TARGET: GLenum;
}

pub struct ArrayBufferType {}
impl BufferTarget for ArrayBufferType {
    const TARGET: GLenum = gl::ARRAY_BUFFER;
}

pub struct ElementArrayBufferType {}
impl BufferTarget for ElementArrayBufferType {
    const TARGET: GLenum = gl::ELEMENT_ARRAY_BUFFER;
}

//

pub struct VertexArray(GLuint);

impl VertexArray {
    pub fn new() -> Result<Self, GLErrorWrapper> {
        let mut rval = MaybeUninit::uninit();
        unsafe { gl::GenVertexArrays(1, rval.as_mut_ptr()) };
        explode_if_gl_error()?;
        Ok(Self(unsafe { rval.assume_init() }))
    }

    pub fn bind(&self) -> Result<(), GLErrorWrapper> {
        unsafe { gl::BindVertexArray(self.0) }
        explode_if_gl_error()
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        unsafe { gl::DeleteVertexArrays(1, &self.0) }
    }
}

//

/// A GL buffer object holding `T`s.  The data is uploaded once with `STATIC_DRAW`;
/// we only remember how many elements went in.
pub struct Buffer<B, T> {
    handle: GLuint,
    len: usize,
    phantom_data: PhantomData<(B, T)>,
}

impl<B, T> Buffer<B, T> {
    pub fn new() -> Result<Self, GLErrorWrapper> {
        let mut rval = MaybeUninit::uninit();
        unsafe { gl::GenBuffers(1, rval.as_mut_ptr()) };
        explode_if_gl_error()?;

        Ok(Buffer {
            handle: unsafe { rval.assume_init() },
            len: 0,
            phantom_data: Default::default(),
        })
    }

    /// number of `T`s uploaded by the last `load()`
    pub fn len(&self) -> usize {
        self.len
    }
}

impl<B, T> Drop for Buffer<B, T> {
    fn drop(&mut self) {
        unsafe { gl::DeleteBuffers(1, &self.handle) }
    }
}

impl<B: BufferTarget, T> Buffer<B, T> {
    /// binds the buffer and copies `values` into it
    pub fn load(&mut self, values: &[T]) -> Result<(), GLErrorWrapper> {
        self.bind()?;
        let byte_count: GLsizeiptr = std::mem::size_of_val(values) as GLsizeiptr;
        unsafe {
            gl::BufferData(
                B::TARGET,
                byte_count,
                values.as_ptr() as *const c_void,
                gl::STATIC_DRAW,
            )
        }
        explode_if_gl_error()?;
        self.len = values.len();
        Ok(())
    }

    pub fn bind(&self) -> Result<(), GLErrorWrapper> {
        unsafe { gl::BindBuffer(B::TARGET, self.handle) };
        explode_if_gl_error()
    }
}

//

/// A linked (or, under [ShaderFailurePolicy::LogAndContinue], possibly unlinked) program object.
pub struct Program(GLuint);

impl Program {
    /// Compile both stages and link them.  What happens on failure is up to `policy`;
    /// see [shader_build::compile_and_link].
    pub fn compile(
        vertex_shader: impl AsRef<str>,
        fragment_shader: impl AsRef<str>,
        policy: ShaderFailurePolicy,
    ) -> Result<Self, ShaderBuildError> {
        let mut api = GlCalls;
        let built = shader_build::compile_and_link(
            &mut api,
            vertex_shader.as_ref(),
            fragment_shader.as_ref(),
        );
        policy.resolve(&mut api, built).map(Self)
    }

    pub fn borrow(&self) -> GLuint {
        self.0
    }

    pub fn use_(&self) -> Result<(), GLErrorWrapper> {
        unsafe { gl::UseProgram(self.0) }
        explode_if_gl_error()
    }
}

impl Drop for Program {
    fn drop(&mut self) {
        unsafe { gl::DeleteProgram(self.0) }
    }
}

//

pub trait GLBufferType {
    const TYPE_CODE: GLenum;
}

impl GLBufferType for GLfloat {
    const TYPE_CODE: GLenum = gl::FLOAT;
}

impl GLBufferType for u8 {
    const TYPE_CODE: GLenum = gl::UNSIGNED_BYTE;
}

impl GLBufferType for GLushort {
    const TYPE_CODE: GLenum = gl::UNSIGNED_SHORT;
}

impl GLBufferType for GLuint {
    const TYPE_CODE: GLenum = gl::UNSIGNED_INT;
}

/// # Safety
/// The "pointer" returned by this function is really just a byte offset (delta).
/// The OpenGL API is dumb like that.
/// Do not try to dereference it.
/// It is only good for calls to functions like gl::VertexAttribPointer and gl::DrawElements
pub const unsafe fn gl_offset_for<T>(count: GLsizei) -> *const c_void {
    (count * size_of::<T>() as GLsizei) as *const c_void
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn offsets_are_scaled_by_element_size() {
        let zero = unsafe { gl_offset_for::<GLfloat>(0) };
        assert!(zero.is_null());
        let three_floats = unsafe { gl_offset_for::<GLfloat>(3) };
        assert_eq!(three_floats as usize, 12);
        let two_indices = unsafe { gl_offset_for::<GLuint>(2) };
        assert_eq!(two_indices as usize, 8);
    }

    #[test]
    fn type_codes() {
        assert_eq!(<GLfloat as GLBufferType>::TYPE_CODE, gl::FLOAT);
        assert_eq!(<GLuint as GLBufferType>::TYPE_CODE, gl::UNSIGNED_INT);
        assert_eq!(ArrayBufferType::TARGET, gl::ARRAY_BUFFER);
        assert_eq!(ElementArrayBufferType::TARGET, gl::ELEMENT_ARRAY_BUFFER);
    }

    #[test]
    fn error_wrapper_formatting() {
        assert_eq!(format!("{}", GLErrorWrapper::new(gl::INVALID_OPERATION)), "0x502");
        assert_eq!(
            format!("{}", GLErrorWrapper::with_message2("nope".to_string())),
            "\"nope\""
        );
    }
}
