pub mod config;
pub mod render;
pub mod utils;

// Re-export commonly used types
pub use config::core::AppConfig;
pub use render::context::{GlContext, GraphicsContext};
pub use render::pipeline::RenderPipeline;
pub use render::shaders::{ShaderError, ShaderProgram, ShaderStage};
pub use render::source::ShaderSource;
pub use utils::error::StartupError;
