use gl_thin::shader_build::ShaderFailurePolicy;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowConfig {
    /// logical size; the framebuffer may be bigger on high-dpi displays
    pub width: u32,
    pub height: u32,
    pub title: String,
    /// (major, minor), always a core profile
    pub gl_version: (u8, u8),
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "LearnOpenGL".to_string(),
            gl_version: (3, 3),
        }
    }
}

/// Everything the programs used to keep in globals.
#[derive(Clone, Debug, PartialEq)]
pub struct TutorialConfig {
    pub window: WindowConfig,
    pub clear_color: [f32; 4],
    pub shader_policy: ShaderFailurePolicy,
}

impl Default for TutorialConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            clear_color: [0.2, 0.3, 0.3, 1.0],
            shader_policy: ShaderFailurePolicy::LogAndContinue,
        }
    }
}

impl TutorialConfig {
    pub fn with_shader_policy(mut self, shader_policy: ShaderFailurePolicy) -> Self {
        self.shader_policy = shader_policy;
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let config = TutorialConfig::default();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.window.title, "LearnOpenGL");
        assert_eq!(config.window.gl_version, (3, 3));
        assert_eq!(config.clear_color, [0.2, 0.3, 0.3, 1.0]);
        assert_eq!(config.shader_policy, ShaderFailurePolicy::LogAndContinue);
    }

    #[test]
    fn policy_override() {
        let config = TutorialConfig::default().with_shader_policy(ShaderFailurePolicy::Abort);
        assert_eq!(config.shader_policy, ShaderFailurePolicy::Abort);
        assert_eq!(config.window, WindowConfig::default());
    }
}
