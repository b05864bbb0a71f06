// context.rs - Explicit handle over the GL state machine

use super::shaders::{ShaderError, ShaderStage};
use gl::types::*;
use std::ffi::{c_void, CString};
use std::fmt::Debug;
use std::marker::PhantomData;
use std::ptr;

/// Every GPU call made by the renderer goes through this trait.
///
/// The underlying API binds objects globally ("currently bound program",
/// "currently bound buffer"), so the calls are order-sensitive. Passing the
/// context explicitly keeps that ordering visible at each call site.
pub trait GraphicsContext {
    type Shader: Copy + Debug;
    type Program: Copy + Debug;
    type Buffer: Copy + Debug;
    type VertexArray: Copy + Debug;

    fn create_shader(&self, stage: ShaderStage) -> Option<Self::Shader>;
    fn shader_source(&self, shader: Self::Shader, source: &str) -> Result<(), ShaderError>;
    fn compile_shader(&self, shader: Self::Shader);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Option<Self::Program>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn validate_program(&self, program: Self::Program);
    fn program_validate_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn use_program(&self, program: Option<Self::Program>);
    fn delete_program(&self, program: Self::Program);

    fn create_buffer(&self) -> Option<Self::Buffer>;
    fn bind_array_buffer(&self, buffer: Option<Self::Buffer>);
    /// Uploads `data` into the bound array buffer with static-draw usage.
    fn array_buffer_data(&self, data: &[u8]);
    fn delete_buffer(&self, buffer: Self::Buffer);

    fn create_vertex_array(&self) -> Option<Self::VertexArray>;
    fn bind_vertex_array(&self, vao: Option<Self::VertexArray>);
    /// Describes float attribute `index` of the bound buffer and enables it.
    fn float_attribute(&self, index: u32, components: i32, stride: i32, offset: usize);
    fn delete_vertex_array(&self, vao: Self::VertexArray);

    fn viewport(&self, width: i32, height: i32);
    fn clear_color(&self, rgba: [f32; 4]);
    fn clear(&self);
    fn draw_triangles(&self, first: i32, count: i32);
}

/// Proof that GL entry points have been loaded for the context that is
/// current on this thread.
#[derive(Debug, Clone, Copy)]
pub struct GlContext {
    // GL contexts are bound to one thread
    _not_send: PhantomData<*const ()>,
}

impl GlContext {
    /// Loads the GL function pointers through `loader`.
    ///
    /// A missing core entry point is logged, not fatal.
    pub fn load<F>(loader: F) -> Self
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(loader);

        let required = [
            ("glCreateShader", gl::CreateShader::is_loaded()),
            ("glCreateProgram", gl::CreateProgram::is_loaded()),
            ("glLinkProgram", gl::LinkProgram::is_loaded()),
            ("glGenVertexArrays", gl::GenVertexArrays::is_loaded()),
            ("glDrawArrays", gl::DrawArrays::is_loaded()),
        ];
        for (name, loaded) in required {
            if !loaded {
                log::error!("OpenGL entry point {} could not be loaded", name);
            }
        }

        Self {
            _not_send: PhantomData,
        }
    }

    fn stage_enum(stage: ShaderStage) -> GLenum {
        match stage {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

/// Reads an info log whose length the driver reports up front.
fn read_info_log(len: GLint, fetch: impl FnOnce(GLint, *mut GLsizei, *mut GLchar)) -> String {
    if len <= 0 {
        return String::new();
    }

    let mut buffer = vec![0u8; len as usize];
    let mut written: GLsizei = 0;
    fetch(len, &mut written, buffer.as_mut_ptr() as *mut GLchar);
    buffer.truncate(written.clamp(0, len) as usize);

    String::from_utf8_lossy(&buffer).into_owned()
}

impl GraphicsContext for GlContext {
    type Shader = GLuint;
    type Program = GLuint;
    type Buffer = GLuint;
    type VertexArray = GLuint;

    fn create_shader(&self, stage: ShaderStage) -> Option<GLuint> {
        let id = unsafe { gl::CreateShader(Self::stage_enum(stage)) };
        (id != 0).then_some(id)
    }

    fn shader_source(&self, shader: GLuint, source: &str) -> Result<(), ShaderError> {
        let c_str = CString::new(source.as_bytes())?;
        unsafe {
            gl::ShaderSource(shader, 1, &c_str.as_ptr(), ptr::null());
        }
        Ok(())
    }

    fn compile_shader(&self, shader: GLuint) {
        unsafe { gl::CompileShader(shader) };
    }

    fn shader_compile_status(&self, shader: GLuint) -> bool {
        let mut success = 0;
        unsafe {
            gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut success);
        }
        success == gl::TRUE as GLint
    }

    fn shader_info_log(&self, shader: GLuint) -> String {
        let mut len = 0;
        unsafe {
            gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len);
        }
        read_info_log(len, |cap, written, buf| unsafe {
            gl::GetShaderInfoLog(shader, cap, written, buf);
        })
    }

    fn delete_shader(&self, shader: GLuint) {
        unsafe { gl::DeleteShader(shader) };
    }

    fn create_program(&self) -> Option<GLuint> {
        let id = unsafe { gl::CreateProgram() };
        (id != 0).then_some(id)
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe { gl::AttachShader(program, shader) };
    }

    fn detach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe { gl::DetachShader(program, shader) };
    }

    fn link_program(&self, program: GLuint) {
        unsafe { gl::LinkProgram(program) };
    }

    fn program_link_status(&self, program: GLuint) -> bool {
        let mut success = 0;
        unsafe {
            gl::GetProgramiv(program, gl::LINK_STATUS, &mut success);
        }
        success == gl::TRUE as GLint
    }

    fn validate_program(&self, program: GLuint) {
        unsafe { gl::ValidateProgram(program) };
    }

    fn program_validate_status(&self, program: GLuint) -> bool {
        let mut success = 0;
        unsafe {
            gl::GetProgramiv(program, gl::VALIDATE_STATUS, &mut success);
        }
        success == gl::TRUE as GLint
    }

    fn program_info_log(&self, program: GLuint) -> String {
        let mut len = 0;
        unsafe {
            gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
        }
        read_info_log(len, |cap, written, buf| unsafe {
            gl::GetProgramInfoLog(program, cap, written, buf);
        })
    }

    fn use_program(&self, program: Option<GLuint>) {
        unsafe { gl::UseProgram(program.unwrap_or(0)) };
    }

    fn delete_program(&self, program: GLuint) {
        unsafe { gl::DeleteProgram(program) };
    }

    fn create_buffer(&self) -> Option<GLuint> {
        let mut buffer = 0;
        unsafe { gl::GenBuffers(1, &mut buffer) };
        (buffer != 0).then_some(buffer)
    }

    fn bind_array_buffer(&self, buffer: Option<GLuint>) {
        unsafe { gl::BindBuffer(gl::ARRAY_BUFFER, buffer.unwrap_or(0)) };
    }

    fn array_buffer_data(&self, data: &[u8]) {
        unsafe {
            gl::BufferData(
                gl::ARRAY_BUFFER,
                data.len() as GLsizeiptr,
                data.as_ptr() as *const c_void,
                gl::STATIC_DRAW,
            );
        }
    }

    fn delete_buffer(&self, buffer: GLuint) {
        unsafe { gl::DeleteBuffers(1, &buffer) };
    }

    fn create_vertex_array(&self) -> Option<GLuint> {
        let mut vao = 0;
        unsafe { gl::GenVertexArrays(1, &mut vao) };
        (vao != 0).then_some(vao)
    }

    fn bind_vertex_array(&self, vao: Option<GLuint>) {
        unsafe { gl::BindVertexArray(vao.unwrap_or(0)) };
    }

    fn float_attribute(&self, index: u32, components: i32, stride: i32, offset: usize) {
        unsafe {
            gl::VertexAttribPointer(
                index,
                components,
                gl::FLOAT,
                gl::FALSE,
                stride,
                offset as *const c_void,
            );
            gl::EnableVertexAttribArray(index);
        }
    }

    fn delete_vertex_array(&self, vao: GLuint) {
        unsafe { gl::DeleteVertexArrays(1, &vao) };
    }

    fn viewport(&self, width: i32, height: i32) {
        unsafe { gl::Viewport(0, 0, width, height) };
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        unsafe { gl::ClearColor(rgba[0], rgba[1], rgba[2], rgba[3]) };
    }

    fn clear(&self) {
        unsafe { gl::Clear(gl::COLOR_BUFFER_BIT) };
    }

    fn draw_triangles(&self, first: i32, count: i32) {
        unsafe { gl::DrawArrays(gl::TRIANGLES, first, count) };
    }
}
