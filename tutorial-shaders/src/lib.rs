pub mod flat_color_shader;
pub mod geometry;
