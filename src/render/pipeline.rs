// pipeline.rs - Owns the program and mesh for the render loop

use super::context::GraphicsContext;
use super::mesh::{Mesh, MeshError};
use super::shaders::{ShaderError, ShaderProgram};
use super::source::ShaderSource;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Shader(#[from] ShaderError),
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

pub struct RenderPipeline<C: GraphicsContext> {
    ctx: C,
    program: ShaderProgram<C>,
    mesh: Mesh<C>,
    clear_color: [f32; 4],
}

impl<C: GraphicsContext + Clone> RenderPipeline<C> {
    /// Uploads the triangle and builds its program, leaving the program bound.
    pub fn new(
        ctx: &C,
        source: &ShaderSource,
        clear_color: [f32; 4],
    ) -> Result<Self, PipelineError> {
        let mesh = Mesh::triangle(ctx)?;
        let program = ShaderProgram::from_source(ctx, source)?;

        ctx.clear_color(clear_color);
        program.bind();

        Ok(Self {
            ctx: ctx.clone(),
            program,
            mesh,
            clear_color,
        })
    }
}

impl<C: GraphicsContext> RenderPipeline<C> {
    pub fn program(&self) -> &ShaderProgram<C> {
        &self.program
    }

    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.ctx.viewport(width as i32, height as i32);
    }

    /// Clears the frame and draws the triangle once.
    pub fn render(&self) {
        self.ctx.clear();
        self.mesh.draw();
    }
}
