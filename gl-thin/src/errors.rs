use gl::types::{GLenum, GLuint};
use std::fmt::{Debug, Display, Formatter};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    /// not a real stage; failures while linking the program
    Link,
}

impl ShaderStage {
    /// the GL shader type for a compile stage; `Link` has none
    pub fn gl_enum(self) -> Option<GLenum> {
        match self {
            ShaderStage::Vertex => Some(gl::VERTEX_SHADER),
            ShaderStage::Fragment => Some(gl::FRAGMENT_SHADER),
            ShaderStage::Link => None,
        }
    }

    /// the banner printed above the driver log
    pub fn failure_banner(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "ERROR::SHADER::VERTEX::COMPILATION_FAILED",
            ShaderStage::Fragment => "ERROR::SHADER::FRAGMENT::COMPILATION_FAILED",
            ShaderStage::Link => "ERROR::SHADER::PROGRAM::LINKING_FAILED",
        }
    }
}

impl Display for ShaderStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
            ShaderStage::Link => "link",
        })
    }
}

//

#[derive(Clone, PartialEq, Eq)]
pub struct ShaderDiagnostic {
    pub stage: ShaderStage,
    pub message: String,
}

impl ShaderDiagnostic {
    pub fn new(stage: ShaderStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

impl Debug for ShaderDiagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n{}", self.stage.failure_banner(), self.message)
    }
}

impl Display for ShaderDiagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        <Self as Debug>::fmt(self, f)
    }
}

//

/// Everything that went wrong while building one program.
///
/// `program` is the handle that was created anyway.  It was never successfully linked,
/// so using it renders nothing meaningful; whoever ends up holding the error decides
/// whether to delete it or draw with it regardless.
pub struct ShaderBuildError {
    pub diagnostics: Vec<ShaderDiagnostic>,
    pub program: GLuint,
}

impl ShaderBuildError {
    pub fn failed_stages(&self) -> impl Iterator<Item = ShaderStage> + '_ {
        self.diagnostics.iter().map(|d| d.stage)
    }
}

impl Debug for ShaderBuildError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "program {} failed to build", self.program)?;
        for diagnostic in &self.diagnostics {
            write!(f, "\n{:?}", diagnostic)?;
        }
        Ok(())
    }
}

impl Display for ShaderBuildError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        <Self as Debug>::fmt(self, f)
    }
}

impl std::error::Error for ShaderBuildError {}
