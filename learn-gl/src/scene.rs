use crate::errors::SetupError;
use gl::types::{GLfloat, GLsizei, GLuint};
use gl_thin::gl_fancy::{GPUState, VertexArrayBundle, VertexBufferBundle};
use gl_thin::gl_helper::GLErrorWrapper;
use gl_thin::shader_build::ShaderFailurePolicy;
use tutorial_shaders::flat_color_shader::FlatColorShader;
use tutorial_shaders::geometry::{
    POSITION_WIDTH, QUAD_INDICES, QUAD_VERTICES, TRIANGLE_VERTICES, VERTEX_STRIDE,
};

/// One draw's worth of GL state.  Clearing and presenting happen outside.
pub trait Scene {
    fn draw(&self, gpu_state: &mut GPUState) -> Result<(), GLErrorWrapper>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SceneKind {
    /// just the clear color
    Clear,
    Triangle,
    Quad,
}

impl SceneKind {
    pub fn build(
        self,
        gpu_state: &mut GPUState,
        policy: ShaderFailurePolicy,
    ) -> Result<Box<dyn Scene>, SetupError> {
        Ok(match self {
            SceneKind::Clear => Box::new(ClearScene),
            SceneKind::Triangle => Box::new(TriangleScene::new(gpu_state, policy)?),
            SceneKind::Quad => Box::new(QuadScene::new(gpu_state, policy)?),
        })
    }
}

//

pub struct ClearScene;

impl Scene for ClearScene {
    fn draw(&self, _gpu_state: &mut GPUState) -> Result<(), GLErrorWrapper> {
        Ok(())
    }
}

//

pub struct TriangleScene {
    pub shader: FlatColorShader,
    pub buffers: VertexArrayBundle<GLfloat>,
}

impl TriangleScene {
    pub fn new(gpu_state: &mut GPUState, policy: ShaderFailurePolicy) -> Result<Self, SetupError> {
        let shader = FlatColorShader::new(policy)?;
        let buffers = VertexArrayBundle::<GLfloat>::new(
            gpu_state,
            &TRIANGLE_VERTICES,
            VERTEX_STRIDE,
            &[(shader.sal_position, POSITION_WIDTH, 0)],
        )?;
        Ok(Self { shader, buffers })
    }
}

impl Scene for TriangleScene {
    fn draw(&self, gpu_state: &mut GPUState) -> Result<(), GLErrorWrapper> {
        self.shader.program.use_()?;
        let binding = self.buffers.bind(gpu_state)?;
        binding.draw_arrays(gl::TRIANGLES, 0, self.buffers.vertex_count() as GLsizei)?;
        drop(binding);
        Ok(())
    }
}

//

/// Four vertices, six indices.
pub struct QuadScene {
    pub shader: FlatColorShader,
    pub buffers: VertexBufferBundle<GLfloat, GLuint>,
}

impl QuadScene {
    pub fn new(gpu_state: &mut GPUState, policy: ShaderFailurePolicy) -> Result<Self, SetupError> {
        let shader = FlatColorShader::new(policy)?;
        let buffers = VertexBufferBundle::<GLfloat, GLuint>::new(
            gpu_state,
            &QUAD_VERTICES,
            &QUAD_INDICES,
            VERTEX_STRIDE,
            &[(shader.sal_position, POSITION_WIDTH, 0)],
        )?;
        Ok(Self { shader, buffers })
    }
}

impl Scene for QuadScene {
    fn draw(&self, gpu_state: &mut GPUState) -> Result<(), GLErrorWrapper> {
        self.shader.program.use_()?;
        let binding = self.buffers.bind(gpu_state)?;
        binding.draw_elements(gl::TRIANGLES, self.buffers.index_count() as GLsizei, 0)?;
        drop(binding);
        Ok(())
    }
}
