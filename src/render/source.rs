// source.rs - Splits "#shader <stage>" files into per-stage sources

use super::shaders::{ShaderError, ShaderStage};
use std::fs;
use std::path::Path;

const MARKER: &str = "#shader";

/// Vertex and fragment source text for one program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderSource {
    pub vertex: String,
    pub fragment: String,
}

/// Which buffer the scanner is currently filling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Stage(ShaderStage),
}

impl Section {
    /// Only the text after `#shader` names the stage; the earliest keyword
    /// there wins.
    fn from_marker(line: &str) -> Self {
        let Some((_, rest)) = line.split_once(MARKER) else {
            return Section::None;
        };

        [ShaderStage::Vertex, ShaderStage::Fragment]
            .into_iter()
            .filter_map(|stage| rest.find(stage.name()).map(|offset| (offset, stage)))
            .min_by_key(|&(offset, _)| offset)
            .map_or(Section::None, |(_, stage)| Section::Stage(stage))
    }
}

impl ShaderSource {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// Splits combined source text on its `#shader` marker lines.
    ///
    /// Marker lines never reach the output. Lines outside any recognised
    /// section are dropped instead of being assigned to a default stage.
    pub fn parse(text: &str) -> Self {
        let mut source = ShaderSource::default();
        let mut section = Section::None;
        let mut dropped = 0usize;

        for line in text.lines() {
            if line.contains(MARKER) {
                section = Section::from_marker(line);
                if section == Section::None {
                    log::warn!("Unrecognised shader marker: {}", line.trim());
                }
                continue;
            }

            match section {
                Section::Stage(stage) => {
                    let buffer = source.stage_mut(stage);
                    buffer.push_str(line);
                    buffer.push('\n');
                }
                Section::None => {
                    if !line.trim().is_empty() {
                        dropped += 1;
                    }
                }
            }
        }

        if dropped > 0 {
            log::warn!("Ignored {} line(s) outside any #shader section", dropped);
        }

        source
    }

    /// Reads and splits a combined shader file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ShaderError> {
        let path = path.as_ref();
        let text = read_source(path)?;
        let source = Self::parse(&text);
        source.log_contents(path);
        Ok(source)
    }

    /// Like [`ShaderSource::load`], but an unreadable file is logged and
    /// yields an empty pair.
    pub fn parse_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(source) => source,
            Err(e) => {
                log::error!("{}", e);
                Self::default()
            }
        }
    }

    /// Reads each stage from its own file.
    ///
    /// A marker line inside either file is stripped; every other line belongs
    /// to the file's stage.
    pub fn load_split(
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, ShaderError> {
        let vertex = strip_markers(&read_source(vertex_path.as_ref())?);
        let fragment = strip_markers(&read_source(fragment_path.as_ref())?);

        let source = Self { vertex, fragment };
        source.log_contents(vertex_path.as_ref());
        Ok(source)
    }

    pub fn stage(&self, stage: ShaderStage) -> &str {
        match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Fragment => &self.fragment,
        }
    }

    fn stage_mut(&mut self, stage: ShaderStage) -> &mut String {
        match stage {
            ShaderStage::Vertex => &mut self.vertex,
            ShaderStage::Fragment => &mut self.fragment,
        }
    }

    /// Both stages carry some non-whitespace text.
    pub fn is_complete(&self) -> bool {
        !self.vertex.trim().is_empty() && !self.fragment.trim().is_empty()
    }

    fn log_contents(&self, origin: &Path) {
        log::debug!(
            "Shader source from {}\nVertex\n{}\nFragment\n{}",
            origin.display(),
            self.vertex,
            self.fragment
        );
    }
}

fn read_source(path: &Path) -> Result<String, ShaderError> {
    fs::read_to_string(path).map_err(|source| ShaderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn strip_markers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.lines().filter(|line| !line.contains(MARKER)) {
        out.push_str(line);
        out.push('\n');
    }
    out
}
