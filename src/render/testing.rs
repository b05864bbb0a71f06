//! A `GraphicsContext` that records calls and simulates the driver, so the
//! builder and renderer can be tested without a window.

use super::context::GraphicsContext;
use super::shaders::{ShaderError, ShaderStage};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Minimal sources that compile on a 3.3 core context.
pub const VERTEX_SRC: &str = r#"#version 330 core

layout(location = 0) in vec4 position;

void main()
{
    gl_Position = position;
}
"#;

pub const FRAGMENT_SRC: &str = r#"#version 330 core

layout(location = 0) out vec4 color;

void main()
{
    color = vec4(1.0, 0.0, 0.0, 1.0);
}
"#;

#[derive(Debug)]
struct MockShader {
    stage: ShaderStage,
    source: String,
    compiled: Option<Result<(), String>>,
}

#[derive(Debug, Default)]
struct MockProgram {
    attached: Vec<u32>,
    linked: bool,
    log: String,
}

#[derive(Debug, Default)]
struct State {
    next_id: u32,
    calls: Vec<String>,
    shaders: HashMap<u32, MockShader>,
    programs: HashMap<u32, MockProgram>,
    buffers: Vec<u32>,
    vertex_arrays: Vec<u32>,
    active_program: Option<u32>,
    uploaded_bytes: usize,
    attributes: Vec<(u32, i32, i32, usize)>,
    draws: Vec<(i32, i32)>,
    clear_color: [f32; 4],
    viewport: Option<(i32, i32)>,
    refuse_shaders: bool,
    fail_link: Option<String>,
}

impl State {
    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingContext {
    state: Rc<RefCell<State>>,
}

/// Rough stand-in for a GLSL front end: requires a version directive and a
/// `;` after every assignment.
fn check_glsl(source: &str) -> Result<(), String> {
    if !source.trim_start().starts_with("#version") {
        return Err("0:1(1): error: #version directive missing".to_owned());
    }
    for (number, line) in source.lines().enumerate() {
        if line.contains('=') && !line.contains(';') {
            return Err(format!("0:{}(1): error: syntax error, unexpected '}}'", number + 1));
        }
    }
    Ok(())
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: impl Into<String>) {
        self.state.borrow_mut().calls.push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    pub fn refuse_shader_objects(&self) {
        self.state.borrow_mut().refuse_shaders = true;
    }

    pub fn fail_next_link(&self, log: &str) {
        self.state.borrow_mut().fail_link = Some(log.to_owned());
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn live_buffers(&self) -> usize {
        let state = self.state.borrow();
        state.buffers.len() + state.vertex_arrays.len()
    }

    pub fn is_linked(&self, program: u32) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map_or(false, |p| p.linked)
    }

    pub fn active_program(&self) -> Option<u32> {
        self.state.borrow().active_program
    }

    pub fn uploaded_bytes(&self) -> usize {
        self.state.borrow().uploaded_bytes
    }

    pub fn attributes(&self) -> Vec<(u32, i32, i32, usize)> {
        self.state.borrow().attributes.clone()
    }

    pub fn draws(&self) -> Vec<(i32, i32)> {
        self.state.borrow().draws.clone()
    }

    pub fn clear_color_value(&self) -> [f32; 4] {
        self.state.borrow().clear_color
    }

    pub fn viewport_size(&self) -> Option<(i32, i32)> {
        self.state.borrow().viewport
    }
}

impl GraphicsContext for RecordingContext {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type VertexArray = u32;

    fn create_shader(&self, stage: ShaderStage) -> Option<u32> {
        self.record(format!("create_shader:{}", stage));
        let mut state = self.state.borrow_mut();
        if state.refuse_shaders {
            return None;
        }
        let id = state.next_id();
        state.shaders.insert(
            id,
            MockShader {
                stage,
                source: String::new(),
                compiled: None,
            },
        );
        Some(id)
    }

    fn shader_source(&self, shader: u32, source: &str) -> Result<(), ShaderError> {
        self.record("shader_source");
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(&shader) {
            s.source = source.to_owned();
        }
        Ok(())
    }

    fn compile_shader(&self, shader: u32) {
        self.record("compile_shader");
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(&shader) {
            s.compiled = Some(check_glsl(&s.source));
        }
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        matches!(
            self.state.borrow().shaders.get(&shader).and_then(|s| s.compiled.as_ref()),
            Some(Ok(()))
        )
    }

    fn shader_info_log(&self, shader: u32) -> String {
        match self.state.borrow().shaders.get(&shader).and_then(|s| s.compiled.as_ref()) {
            Some(Err(log)) => format!("{}\n", log),
            _ => String::new(),
        }
    }

    fn delete_shader(&self, shader: u32) {
        self.record("delete_shader");
        self.state.borrow_mut().shaders.remove(&shader);
    }

    fn create_program(&self) -> Option<u32> {
        self.record("create_program");
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.programs.insert(id, MockProgram::default());
        Some(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        self.record("attach_shader");
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.attached.push(shader);
        }
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        self.record("detach_shader");
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.attached.retain(|&s| s != shader);
        }
    }

    fn link_program(&self, program: u32) {
        self.record("link_program");
        let mut state = self.state.borrow_mut();
        let forced = state.fail_link.take();

        let stages: Vec<ShaderStage> = match state.programs.get(&program) {
            Some(p) => p
                .attached
                .iter()
                .filter_map(|id| state.shaders.get(id))
                .filter(|s| matches!(s.compiled, Some(Ok(()))))
                .map(|s| s.stage)
                .collect(),
            None => return,
        };

        let result = match forced {
            Some(log) => Err(log),
            None if stages.contains(&ShaderStage::Vertex)
                && stages.contains(&ShaderStage::Fragment) =>
            {
                Ok(())
            }
            None => Err("error: program lacks a compiled vertex and fragment stage".to_owned()),
        };

        if let Some(p) = state.programs.get_mut(&program) {
            match result {
                Ok(()) => p.linked = true,
                Err(log) => {
                    p.linked = false;
                    p.log = log;
                }
            }
        }
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.is_linked(program)
    }

    fn validate_program(&self, _program: u32) {
        self.record("validate_program");
    }

    fn program_validate_status(&self, program: u32) -> bool {
        self.is_linked(program)
    }

    fn program_info_log(&self, program: u32) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn use_program(&self, program: Option<u32>) {
        self.record("use_program");
        self.state.borrow_mut().active_program = program;
    }

    fn delete_program(&self, program: u32) {
        self.record("delete_program");
        let mut state = self.state.borrow_mut();
        state.programs.remove(&program);
        if state.active_program == Some(program) {
            state.active_program = None;
        }
    }

    fn create_buffer(&self) -> Option<u32> {
        self.record("create_buffer");
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.buffers.push(id);
        Some(id)
    }

    fn bind_array_buffer(&self, _buffer: Option<u32>) {
        self.record("bind_array_buffer");
    }

    fn array_buffer_data(&self, data: &[u8]) {
        self.record("array_buffer_data");
        self.state.borrow_mut().uploaded_bytes = data.len();
    }

    fn delete_buffer(&self, buffer: u32) {
        self.record("delete_buffer");
        self.state.borrow_mut().buffers.retain(|&b| b != buffer);
    }

    fn create_vertex_array(&self) -> Option<u32> {
        self.record("create_vertex_array");
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.vertex_arrays.push(id);
        Some(id)
    }

    fn bind_vertex_array(&self, _vao: Option<u32>) {
        self.record("bind_vertex_array");
    }

    fn float_attribute(&self, index: u32, components: i32, stride: i32, offset: usize) {
        self.record("float_attribute");
        self.state
            .borrow_mut()
            .attributes
            .push((index, components, stride, offset));
    }

    fn delete_vertex_array(&self, vao: u32) {
        self.record("delete_vertex_array");
        self.state.borrow_mut().vertex_arrays.retain(|&v| v != vao);
    }

    fn viewport(&self, width: i32, height: i32) {
        self.record("viewport");
        self.state.borrow_mut().viewport = Some((width, height));
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        self.record("clear_color");
        self.state.borrow_mut().clear_color = rgba;
    }

    fn clear(&self) {
        self.record("clear");
    }

    fn draw_triangles(&self, first: i32, count: i32) {
        self.record("draw_triangles");
        self.state.borrow_mut().draws.push((first, count));
    }
}
