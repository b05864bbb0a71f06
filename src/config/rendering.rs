use crate::render::shaders::ShaderError;
use crate::render::source::ShaderSource;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the shader program's source comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShaderFiles {
    /// One file with `#shader vertex` / `#shader fragment` sections.
    Combined { path: PathBuf },
    /// One file per stage.
    Split { vertex: PathBuf, fragment: PathBuf },
}

impl Default for ShaderFiles {
    fn default() -> Self {
        ShaderFiles::Combined {
            path: PathBuf::from("res/shaders/basic.shader"),
        }
    }
}

impl ShaderFiles {
    pub fn load(&self) -> Result<ShaderSource, ShaderError> {
        match self {
            ShaderFiles::Combined { path } => ShaderSource::load(path),
            ShaderFiles::Split { vertex, fragment } => ShaderSource::load_split(vertex, fragment),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub clear_color: [f32; 4],
    pub shaders: ShaderFiles,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            shaders: ShaderFiles::default(),
        }
    }
}
