pub mod context;
pub mod mesh;
pub mod pipeline;
pub mod shaders;
pub mod source;

#[cfg(test)]
pub(crate) mod testing;

pub use context::{GlContext, GraphicsContext};
pub use mesh::Mesh;
pub use pipeline::RenderPipeline;
pub use shaders::{ShaderError, ShaderProgram, ShaderStage};
pub use source::ShaderSource;
