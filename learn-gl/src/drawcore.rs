use crate::config::{TutorialConfig, WindowConfig};
use crate::errors::{FrameError, SetupError};
use crate::frame_loop::{present_frame, DrawFailures, Drawable, FrameSteps};
use crate::scene::{Scene, SceneKind};
use gl::types::GLsizei;
use gl_thin::gl_fancy::GPUState;
use gl_thin::gl_helper::{self, explode_if_gl_error, GLErrorWrapper};
use glutin::config::{Config, ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version,
};
use glutin::display::{Display, DisplayApiPreference, GlDisplay};
use glutin::prelude::{GlSurface, NotCurrentGlContext};
use glutin::surface::{Surface, WindowSurface};
use glutin_winit::GlWindow;
use log::{debug, info};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawWindowHandle};
use std::num::NonZeroU32;
use winit::dpi::LogicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

pub fn set_viewport(width: u32, height: u32) -> Result<(), GLErrorWrapper> {
    let (width, height) = (viewport_extent(width)?, viewport_extent(height)?);
    unsafe { gl::Viewport(0, 0, width, height) };
    explode_if_gl_error()
}

fn viewport_extent(pixels: u32) -> Result<GLsizei, GLErrorWrapper> {
    GLsizei::try_from(pixels).map_err(|_| {
        GLErrorWrapper::with_message2(format!("{} pixels does not fit in a GLsizei", pixels))
    })
}

//

/// A window with a current GL context on this thread.
pub struct WindowContext {
    // dropped in this order: surface and context before the window they draw into
    pub surface: Surface<WindowSurface>,
    pub context: PossiblyCurrentContext,
    pub window: Window,
}

impl WindowContext {
    pub fn new(event_loop: &ActiveEventLoop, config: &WindowConfig) -> Result<Self, SetupError> {
        let window_attributes = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(LogicalSize::new(config.width, config.height))
            .with_resizable(true);

        // WGL only offers modern contexts for a display made from an existing window
        #[cfg(windows)]
        let early_window = Some(
            event_loop
                .create_window(window_attributes.clone())
                .map_err(|e| SetupError::Window(e.to_string()))?,
        );
        #[cfg(not(windows))]
        let early_window: Option<Window> = None;

        let early_handle = match &early_window {
            Some(window) => Some(
                window
                    .window_handle()
                    .map_err(|e| SetupError::Window(e.to_string()))?
                    .as_raw(),
            ),
            None => None,
        };

        let gl_display = open_display(event_loop, early_handle)?;

        let mut template = ConfigTemplateBuilder::new();
        if let Some(handle) = early_handle {
            template = template.compatible_with_native_window(handle);
        }
        let configs = unsafe { gl_display.find_configs(template.build()) }?;
        let gl_config = pick_config(configs).ok_or(SetupError::NoConfig)?;
        debug!("picked a GL config with {} samples", gl_config.num_samples());

        let window = match early_window {
            Some(window) => window,
            None => glutin_winit::finalize_window(event_loop, window_attributes, &gl_config)
                .map_err(|e| SetupError::Window(e.to_string()))?,
        };

        let raw_window_handle = window
            .window_handle()
            .map_err(|e| SetupError::Window(e.to_string()))?
            .as_raw();

        let (major, minor) = config.gl_version;
        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(major, minor))))
            .with_profile(GlProfile::Core)
            .build(Some(raw_window_handle));

        let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes) }?;

        let surface_attributes = window
            .build_surface_attributes(Default::default())
            .map_err(|e| SetupError::Window(e.to_string()))?;
        let surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attributes) }?;

        let context = not_current.make_current(&surface)?;

        gl_helper::initialize_gl_with(|symbol| gl_display.get_proc_address(symbol))
            .map_err(SetupError::Loader)?;

        info!(
            "OpenGL {} on {}",
            gl_helper::get_string(gl::VERSION).unwrap_or_default(),
            gl_helper::get_string(gl::RENDERER).unwrap_or_default()
        );

        Ok(Self {
            surface,
            context,
            window,
        })
    }

    /// in pixels, which is what the viewport wants
    pub fn framebuffer_size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    /// Some platforms (Wayland, macOS) need the surface told about the new size.
    /// A zero dimension (minimized) is skipped.
    pub fn resize_surface(&self, width: u32, height: u32) {
        if let (Some(width), Some(height)) = (NonZeroU32::new(width), NonZeroU32::new(height)) {
            self.surface.resize(&self.context, width, height);
        }
    }

    pub fn swap_buffers(&self) -> Result<(), glutin::error::Error> {
        self.surface.swap_buffers(&self.context)
    }
}

/// EGL everywhere but Windows (WGL) and macOS (CGL).
fn open_display(
    event_loop: &ActiveEventLoop,
    window_handle: Option<RawWindowHandle>,
) -> Result<Display, SetupError> {
    let raw_display = event_loop
        .display_handle()
        .map_err(|e| SetupError::Window(e.to_string()))?
        .as_raw();

    #[cfg(windows)]
    let preference = DisplayApiPreference::Wgl(window_handle);
    #[cfg(target_os = "macos")]
    let preference = DisplayApiPreference::Cgl;
    #[cfg(all(unix, not(target_os = "macos")))]
    let preference = DisplayApiPreference::Egl;
    #[cfg(not(windows))]
    let _ = window_handle;

    Ok(unsafe { Display::new(raw_display, preference) }?)
}

/// Prefer a config without multisampling.  `None` when the display offered nothing.
fn pick_config(configs: impl Iterator<Item = Config>) -> Option<Config> {
    configs.min_by_key(|config| config.num_samples())
}

//

pub struct ActiveRenderer {
    // the scene owns GL objects, so it has to go while the context is still alive
    pub scene: Box<dyn Scene>,
    pub gpu_state: GPUState,
    pub clear_color: [f32; 4],
    pub draw_failures: DrawFailures,
    pub gl_window: WindowContext,
}

impl ActiveRenderer {
    pub fn new(
        event_loop: &ActiveEventLoop,
        config: &TutorialConfig,
        kind: SceneKind,
    ) -> Result<Self, SetupError> {
        let gl_window = WindowContext::new(event_loop, &config.window)?;

        let (width, height) = gl_window.framebuffer_size();
        set_viewport(width, height)?;

        let mut gpu_state = GPUState::new();
        let scene = kind.build(&mut gpu_state, config.shader_policy)?;
        debug!("{:?} scene ready, framebuffer {}x{}", kind, width, height);

        Ok(Self {
            scene,
            gpu_state,
            clear_color: config.clear_color,
            draw_failures: DrawFailures::default(),
            gl_window,
        })
    }
}

impl FrameSteps for ActiveRenderer {
    fn clear(&mut self) -> Result<(), FrameError> {
        let [red, green, blue, alpha] = self.clear_color;
        unsafe { gl::ClearColor(red, green, blue, alpha) };
        explode_if_gl_error()?;
        unsafe { gl::Clear(gl::COLOR_BUFFER_BIT) };
        explode_if_gl_error()?;
        Ok(())
    }

    fn draw_scene(&mut self) -> Result<(), FrameError> {
        self.scene.draw(&mut self.gpu_state)?;
        Ok(())
    }

    fn present(&mut self) -> Result<(), FrameError> {
        self.gl_window.swap_buffers()?;
        Ok(())
    }
}

impl Drawable for ActiveRenderer {
    fn resize(&mut self, width: u32, height: u32) -> Result<(), FrameError> {
        self.gl_window.resize_surface(width, height);
        set_viewport(width, height)?;
        Ok(())
    }

    fn draw_frame(&mut self) -> Result<(), FrameError> {
        let mut failures = std::mem::take(&mut self.draw_failures);
        let rval = present_frame(self, &mut failures);
        self.draw_failures = failures;
        rval
    }

    fn request_redraw(&self) {
        self.gl_window.window.request_redraw()
    }
}
