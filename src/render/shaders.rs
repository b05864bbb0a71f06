// shaders.rs - Shader stage compilation and program linking

use super::context::GraphicsContext;
use super::source::ShaderSource;
use std::ffi::NulError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("Failed to compile {stage} shader: {log}")]
    Compilation { stage: ShaderStage, log: String },
    #[error("Program linking failed: {0}")]
    Linking(String),
    #[error("Driver could not create a {0} object")]
    Creation(&'static str),
    #[error("No {0} shader source was provided")]
    MissingStage(ShaderStage),
    #[error("Failed to read shader file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Null byte error: {0}")]
    Nul(#[from] NulError),
}

/// The two programmable steps of the fixed pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A successfully compiled stage. The driver object is released when the
/// guard goes out of scope.
pub struct CompiledStage<'a, C: GraphicsContext> {
    ctx: &'a C,
    stage: ShaderStage,
    shader: C::Shader,
}

impl<'a, C: GraphicsContext> CompiledStage<'a, C> {
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn handle(&self) -> C::Shader {
        self.shader
    }
}

impl<C: GraphicsContext> Drop for CompiledStage<'_, C> {
    fn drop(&mut self) {
        self.ctx.delete_shader(self.shader);
    }
}

/// Compiles one stage, returning the driver's diagnostic on failure.
pub fn compile_stage<'a, C: GraphicsContext>(
    ctx: &'a C,
    stage: ShaderStage,
    source: &str,
) -> Result<CompiledStage<'a, C>, ShaderError> {
    let shader = ctx
        .create_shader(stage)
        .ok_or(ShaderError::Creation("shader"))?;
    let compiled = CompiledStage { ctx, stage, shader };

    ctx.shader_source(shader, source)?;
    ctx.compile_shader(shader);

    if !ctx.shader_compile_status(shader) {
        let log = ctx.shader_info_log(shader).trim_end().to_owned();
        log::error!("Failed to compile {} shader:\n{}", stage, log);
        return Err(ShaderError::Compilation { stage, log });
    }

    Ok(compiled)
}

/// A linked vertex + fragment program.
pub struct ShaderProgram<C: GraphicsContext> {
    ctx: C,
    id: C::Program,
}

impl<C: GraphicsContext + Clone> ShaderProgram<C> {
    /// Compiles both stages and links them into one program.
    ///
    /// A compile failure short-circuits before anything is attached, and
    /// every object created along the way is released on any error.
    pub fn new(ctx: &C, vertex_source: &str, fragment_source: &str) -> Result<Self, ShaderError> {
        if vertex_source.trim().is_empty() {
            return Err(ShaderError::MissingStage(ShaderStage::Vertex));
        }
        if fragment_source.trim().is_empty() {
            return Err(ShaderError::MissingStage(ShaderStage::Fragment));
        }

        let program = ctx
            .create_program()
            .ok_or(ShaderError::Creation("program"))?;
        let program = ShaderProgram {
            ctx: ctx.clone(),
            id: program,
        };

        let vertex = compile_stage(ctx, ShaderStage::Vertex, vertex_source)?;
        let fragment = compile_stage(ctx, ShaderStage::Fragment, fragment_source)?;

        ctx.attach_shader(program.id, vertex.handle());
        ctx.attach_shader(program.id, fragment.handle());
        ctx.link_program(program.id);

        let linked = ctx.program_link_status(program.id);
        if linked {
            program.validate();
        }

        ctx.detach_shader(program.id, vertex.handle());
        ctx.detach_shader(program.id, fragment.handle());

        if !linked {
            let log = ctx.program_info_log(program.id).trim_end().to_owned();
            log::error!("Failed to link shader program:\n{}", log);
            return Err(ShaderError::Linking(log));
        }

        log::info!("Shader program {:?} linked", program.id);
        Ok(program)
    }

    pub fn from_source(ctx: &C, source: &ShaderSource) -> Result<Self, ShaderError> {
        Self::new(ctx, &source.vertex, &source.fragment)
    }
}

impl<C: GraphicsContext> ShaderProgram<C> {
    pub fn id(&self) -> C::Program {
        self.id
    }

    /// Makes this the active program.
    pub fn bind(&self) {
        self.ctx.use_program(Some(self.id));
    }

    pub fn unbind(&self) {
        self.ctx.use_program(None);
    }

    // Informational only; the result never fails the build.
    fn validate(&self) {
        self.ctx.validate_program(self.id);
        if self.ctx.program_validate_status(self.id) {
            log::debug!("Shader program {:?} validated", self.id);
        } else {
            log::warn!(
                "Shader program {:?} did not validate: {}",
                self.id,
                self.ctx.program_info_log(self.id).trim_end()
            );
        }
    }
}

impl<C: GraphicsContext> Drop for ShaderProgram<C> {
    fn drop(&mut self) {
        self.ctx.delete_program(self.id);
    }
}
