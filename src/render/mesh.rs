use super::context::GraphicsContext;
use std::mem;
use thiserror::Error;

/// Clip-space positions of the one triangle this program draws.
pub const TRIANGLE_POSITIONS: [[f32; 2]; 3] = [
    [-0.5, -0.5],
    [0.0, 0.5],
    [0.5, -0.5],
];

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("Driver could not create a {0} object")]
    Creation(&'static str),
    #[error("Mesh has no vertices")]
    Empty,
}

/// A static vertex buffer of 2D positions bound to attribute 0.
pub struct Mesh<C: GraphicsContext> {
    ctx: C,
    vao: C::VertexArray,
    vbo: C::Buffer,
    vertex_count: i32,
}

impl<C: GraphicsContext + Clone> Mesh<C> {
    pub fn new(ctx: &C, positions: &[[f32; 2]]) -> Result<Self, MeshError> {
        if positions.is_empty() {
            return Err(MeshError::Empty);
        }

        let vao = ctx
            .create_vertex_array()
            .ok_or(MeshError::Creation("vertex array"))?;
        let Some(vbo) = ctx.create_buffer() else {
            ctx.delete_vertex_array(vao);
            return Err(MeshError::Creation("buffer"));
        };

        ctx.bind_vertex_array(Some(vao));
        ctx.bind_array_buffer(Some(vbo));
        ctx.array_buffer_data(bytemuck::cast_slice(positions));

        // Position attribute
        ctx.float_attribute(0, 2, mem::size_of::<[f32; 2]>() as i32, 0);

        ctx.bind_vertex_array(None);
        ctx.bind_array_buffer(None);

        log::debug!("Uploaded {} vertices", positions.len());

        Ok(Self {
            ctx: ctx.clone(),
            vao,
            vbo,
            vertex_count: positions.len() as i32,
        })
    }

    pub fn triangle(ctx: &C) -> Result<Self, MeshError> {
        Self::new(ctx, &TRIANGLE_POSITIONS)
    }
}

impl<C: GraphicsContext> Mesh<C> {
    pub fn vertex_count(&self) -> i32 {
        self.vertex_count
    }

    pub fn draw(&self) {
        self.ctx.bind_vertex_array(Some(self.vao));
        self.ctx.draw_triangles(0, self.vertex_count);
    }
}

impl<C: GraphicsContext> Drop for Mesh<C> {
    fn drop(&mut self) {
        self.ctx.delete_vertex_array(self.vao);
        self.ctx.delete_buffer(self.vbo);
    }
}
