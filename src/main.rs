use anyhow::{Context, Result};
use glutin::{
    config::ConfigTemplateBuilder,
    context::{ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version},
    display::{GetGlDisplay, GlDisplay},
    prelude::*,
    surface::{Surface, SwapInterval, WindowSurface},
};
use glutin_winit::{DisplayBuilder, GlWindow};
use log::info;
use raw_window_handle::HasRawWindowHandle;
use simple_logger::SimpleLogger;
use std::{ffi::CString, num::NonZeroU32, ptr};
use winit::{
    dpi::{LogicalSize, PhysicalSize},
    event::{Event, WindowEvent},
    event_loop::{EventLoop, EventLoopBuilder},
    window::{Window, WindowBuilder},
};

use hello_triangle::{
    config::AppConfig,
    render::{GlContext, RenderPipeline},
    utils::{catch_window_panic, exit_code, StartupError},
};

// Fields drop in order: GL objects go before the context and surface.
struct App {
    pipeline: Option<RenderPipeline<GlContext>>,
    gl_surface: Surface<WindowSurface>,
    gl_context: PossiblyCurrentContext,
    window: Window,
}

impl App {
    fn new(config: &AppConfig) -> Result<(Self, EventLoop<()>)> {
        let event_loop = EventLoopBuilder::new()
            .build()
            .map_err(|e| StartupError::Window(e.to_string()))?;
        let window_builder = WindowBuilder::new()
            .with_title(&config.window.title)
            .with_inner_size(LogicalSize::new(config.window.width, config.window.height));

        let template = ConfigTemplateBuilder::new().with_alpha_size(8);

        let display_builder = DisplayBuilder::new().with_window_builder(Some(window_builder));

        // The picker has no error channel, so an empty config list panics and
        // is caught as a startup failure.
        let (window, gl_config) = catch_window_panic(|| {
            display_builder.build(&event_loop, template, |configs| {
                configs
                    .reduce(|accum, config| {
                        if config.num_samples() > accum.num_samples() {
                            config
                        } else {
                            accum
                        }
                    })
                    .expect("display offered no GL configs")
            })
        })?
        .map_err(|e| StartupError::Window(e.to_string()))?;

        let window = window
            .ok_or_else(|| StartupError::Window("display builder returned no window".into()))?;
        let raw_window_handle = window.raw_window_handle();

        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .with_profile(GlProfile::Core)
            .build(Some(raw_window_handle));

        let gl_display = gl_config.display();

        let not_current = unsafe {
            gl_display
                .create_context(&gl_config, &context_attributes)
                .map_err(|e| StartupError::Context(e.to_string()))?
        };

        let attrs = window.build_surface_attributes(<_>::default());
        let gl_surface = unsafe {
            gl_display
                .create_window_surface(&gl_config, &attrs)
                .map_err(|e| StartupError::Surface(e.to_string()))?
        };

        let gl_context = not_current
            .make_current(&gl_surface)
            .map_err(|e| StartupError::Context(e.to_string()))?;

        if config.window.vsync {
            if let Err(e) =
                gl_surface.set_swap_interval(&gl_context, SwapInterval::Wait(NonZeroU32::MIN))
            {
                log::warn!("Could not enable vsync: {}", e);
            }
        }

        // Load OpenGL functions
        let gl = GlContext::load(|symbol| match CString::new(symbol) {
            Ok(symbol) => gl_display.get_proc_address(symbol.as_c_str()) as *const _,
            Err(_) => ptr::null(),
        });

        let source = config
            .render
            .shaders
            .load()
            .context("Failed to load shader source")?;
        let pipeline = RenderPipeline::new(&gl, &source, config.render.clear_color)
            .context("Failed to build the triangle pipeline")?;

        let size = window.inner_size();
        pipeline.resize(size.width, size.height);

        info!("Renderer ready ({}x{})", size.width, size.height);

        Ok((
            Self {
                pipeline: Some(pipeline),
                gl_surface,
                gl_context,
                window,
            },
            event_loop,
        ))
    }

    fn resize(&self, size: PhysicalSize<u32>) {
        let (Some(width), Some(height)) =
            (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return;
        };
        self.gl_surface.resize(&self.gl_context, width, height);
        if let Some(pipeline) = &self.pipeline {
            pipeline.resize(size.width, size.height);
        }
    }

    fn render(&self) -> Result<()> {
        if let Some(pipeline) = &self.pipeline {
            pipeline.render();
            self.gl_surface
                .swap_buffers(&self.gl_context)
                .context("Failed to swap buffers")?;
        }
        Ok(())
    }

    // GL objects must go while the context is still current.
    fn cleanup(&mut self) {
        if let Some(pipeline) = self.pipeline.take() {
            if let Err(e) = self.gl_context.make_current(&self.gl_surface) {
                log::warn!("Context lost before cleanup: {}", e);
            }
            drop(pipeline);
            info!("Released GPU resources");
        }
    }
}

fn run() -> Result<()> {
    let (config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    SimpleLogger::new().with_level(config.level_filter()).init()?;
    if let Some(e) = config_error {
        log::warn!("Using default configuration: {:#}", e);
    }
    info!("Initializing application...");

    let (mut app, event_loop) = App::new(&config)?;

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested => {
                app.cleanup();
                elwt.exit();
            }
            WindowEvent::Resized(size) => app.resize(size),
            WindowEvent::RedrawRequested => {
                if let Err(e) = app.render() {
                    log::error!("{:#}", e);
                    app.cleanup();
                    elwt.exit();
                }
            }
            _ => (),
        },
        Event::AboutToWait => {
            app.window.request_redraw();
        }
        Event::LoopExiting => app.cleanup(),
        _ => (),
    })?;

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}
