use gl_thin::errors::ShaderBuildError;
use gl_thin::gl_helper::GLErrorWrapper;
use std::fmt;
use winit::error::EventLoopError;

/// Anything that stops a program before its first frame.
#[derive(Debug)]
pub enum SetupError {
    /// The event loop could not be created or failed while running.
    EventLoop(EventLoopError),
    /// No window (or no raw handle for it).
    Window(String),
    /// Display, config, context or surface creation failed.
    Context(glutin::error::Error),
    /// The display has no framebuffer config to offer.
    NoConfig,
    /// GL function pointers did not resolve.
    Loader(GLErrorWrapper),
    /// A GL call during setup raised an error.
    Gl(GLErrorWrapper),
    /// Only seen with `ShaderFailurePolicy::Abort`.
    Shader(ShaderBuildError),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            SetupError::EventLoop(e) => write!(f, "event loop error: {}", e),
            SetupError::Window(e) => write!(f, "Failed to create window: {}", e),
            SetupError::Context(e) => write!(f, "Failed to create OpenGL context: {}", e),
            SetupError::NoConfig => write!(f, "Failed to create OpenGL context: no usable config"),
            SetupError::Loader(e) => write!(f, "Failed to load OpenGL: {}", e),
            SetupError::Gl(e) => write!(f, "OpenGL error during setup: {}", e),
            SetupError::Shader(e) => write!(f, "shader build aborted: {}", e),
        }
    }
}

impl std::error::Error for SetupError {}

impl From<EventLoopError> for SetupError {
    fn from(e: EventLoopError) -> Self {
        SetupError::EventLoop(e)
    }
}

impl From<glutin::error::Error> for SetupError {
    fn from(e: glutin::error::Error) -> Self {
        SetupError::Context(e)
    }
}

impl From<GLErrorWrapper> for SetupError {
    fn from(e: GLErrorWrapper) -> Self {
        SetupError::Gl(e)
    }
}

impl From<ShaderBuildError> for SetupError {
    fn from(e: ShaderBuildError) -> Self {
        SetupError::Shader(e)
    }
}

//

/// Something went wrong inside one frame.  Logged; the loop keeps going.
#[derive(Debug)]
pub enum FrameError {
    Gl(GLErrorWrapper),
    Swap(glutin::error::Error),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            FrameError::Gl(e) => write!(f, "OpenGL error: {}", e),
            FrameError::Swap(e) => write!(f, "swap_buffers failed: {}", e),
        }
    }
}

impl std::error::Error for FrameError {}

impl From<GLErrorWrapper> for FrameError {
    fn from(e: GLErrorWrapper) -> Self {
        FrameError::Gl(e)
    }
}

impl From<glutin::error::Error> for FrameError {
    fn from(e: glutin::error::Error) -> Self {
        FrameError::Swap(e)
    }
}
