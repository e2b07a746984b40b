use gl::types::GLuint;
use gl_thin::errors::ShaderBuildError;
use gl_thin::gl_helper::Program;
use gl_thin::shader_build::ShaderFailurePolicy;

pub const VERTEX_SHADER: &str = "#version 330 core
layout (location = 0) in vec3 aPos;
void main()
{
   gl_Position = vec4(aPos.x, aPos.y, aPos.z, 1.0);
}
";

pub const FRAGMENT_SHADER: &str = "#version 330 core
out vec4 FragColor;
void main()
{
    FragColor = vec4(1.0f, 0.5f, 0.2f, 1.0f);
}
";

/// Position-only vertices, every fragment orange.
pub struct FlatColorShader {
    pub program: Program,
    pub sal_position: GLuint,
}

impl FlatColorShader {
    /// matches the `layout (location = 0)` in [VERTEX_SHADER]
    pub const POSITION_LOCATION: GLuint = 0;

    pub fn new(policy: ShaderFailurePolicy) -> Result<Self, ShaderBuildError> {
        Self::from_sources(VERTEX_SHADER, FRAGMENT_SHADER, policy)
    }

    /// For swapping in other sources that keep the position at location 0.
    pub fn from_sources(
        vertex_shader: &str,
        fragment_shader: &str,
        policy: ShaderFailurePolicy,
    ) -> Result<Self, ShaderBuildError> {
        let program = Program::compile(vertex_shader, fragment_shader, policy)?;
        log::debug!("flat color program {}", program.borrow());
        Ok(Self {
            program,
            sal_position: Self::POSITION_LOCATION,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sources_declare_core_330() {
        assert!(VERTEX_SHADER.starts_with("#version 330 core\n"));
        assert!(FRAGMENT_SHADER.starts_with("#version 330 core\n"));
    }

    #[test]
    fn position_attribute_is_at_location_zero() {
        assert!(VERTEX_SHADER.contains("layout (location = 0) in vec3 aPos;"));
        assert_eq!(FlatColorShader::POSITION_LOCATION, 0);
    }

    #[test]
    fn fragment_is_orange() {
        assert!(FRAGMENT_SHADER.contains("vec4(1.0f, 0.5f, 0.2f, 1.0f)"));
    }
}
