// This code is loosely based on
// winit's examples/window.rs
// and glutin's examples/window.rs

use crate::config::TutorialConfig;
use crate::drawcore::ActiveRenderer;
use crate::errors::SetupError;
use crate::frame_loop::{Drawable, FrameEvent, FrameLoop, LoopState};
use crate::scene::SceneKind;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::WindowId;

pub mod config;
pub mod drawcore;
pub mod errors;
pub mod frame_loop;
pub mod scene;

//

pub enum AppState<T: Drawable> {
    Paused,
    Active(T),
}

impl<T: Drawable> Default for AppState<T> {
    fn default() -> Self {
        Self::Paused
    }
}

/// Owns the drawable once `factory` has built it, and feeds it window events through a
/// [FrameLoop].
pub struct TutorialApp<T: Drawable, F> {
    state: AppState<T>,
    factory: F,
    frame_loop: FrameLoop,
    setup_error: Option<SetupError>,
}

impl<T: Drawable, F> TutorialApp<T, F> {
    pub fn new(factory: F) -> Self {
        Self {
            state: AppState::default(),
            factory,
            frame_loop: FrameLoop::new(),
            setup_error: None,
        }
    }

    /// Install the result of the factory.  A setup failure closes the loop before any
    /// frame is drawn.
    pub fn activate(&mut self, built: Result<T, SetupError>) -> LoopState {
        match built {
            Ok(drawable) => {
                self.state = AppState::Active(drawable);
            }
            Err(e) => {
                log::error!("{}", e);
                self.setup_error = Some(e);
                self.frame_loop.close();
            }
        }
        self.frame_loop.state()
    }

    pub fn dispatch(&mut self, event: FrameEvent) -> LoopState {
        match &mut self.state {
            AppState::Active(drawable) => self.frame_loop.handle(drawable, event),
            AppState::Paused => self.frame_loop.state(),
        }
    }

    pub fn frame_loop(&self) -> &FrameLoop {
        &self.frame_loop
    }

    /// Tear down and report how the run ended.  The drawable (window, context and every
    /// GL object) is dropped here.
    pub fn finish(mut self) -> Result<u64, SetupError> {
        self.state = AppState::Paused;
        match self.setup_error.take() {
            Some(e) => Err(e),
            None => Ok(self.frame_loop.frames_drawn()),
        }
    }
}

impl<T, F> ApplicationHandler for TutorialApp<T, F>
where
    T: Drawable,
    F: FnMut(&ActiveEventLoop) -> Result<T, SetupError>,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let AppState::Active(_) = self.state {
            return;
        }
        let built = (self.factory)(event_loop);
        if self.activate(built) == LoopState::Closing {
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        log::trace!("Received Winit event: {event:?}");

        let Some(frame_event) = FrameEvent::from_window_event(&event) else {
            return;
        };
        if self.dispatch(frame_event) == LoopState::Closing {
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // no pacing: ask for the next frame as soon as the events are drained
        if let AppState::Active(drawable) = &self.state {
            if self.frame_loop.is_running() {
                drawable.request_redraw();
            }
        }
    }
}

//

/// Run `factory`'s drawable until it is closed.
pub fn run<T, F>(factory: F) -> Result<u64, SetupError>
where
    T: Drawable,
    F: FnMut(&ActiveEventLoop) -> Result<T, SetupError>,
{
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = TutorialApp::new(factory);
    event_loop.run_app(&mut app)?;
    app.finish()
}

/// Open the window described by `config` and draw `kind` every frame.
pub fn run_tutorial(config: TutorialConfig, kind: SceneKind) -> Result<u64, SetupError> {
    let frames = run(|event_loop: &ActiveEventLoop| {
        ActiveRenderer::new(event_loop, &config, kind)
    })?;
    log::debug!("{:?} closed after {} frames", kind, frames);
    Ok(frames)
}

/// 0 for a normal close, -1 when setup failed.
pub fn exit_status<T>(result: &Result<T, SetupError>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(_) => -1,
    }
}

/// Logs go to stdout, `info` unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Stdout)
        .init();
}

/// What each binary's `main` does.
pub fn tutorial_main(kind: SceneKind) -> ! {
    init_logging();
    let result = run_tutorial(TutorialConfig::default(), kind);
    std::process::exit(exit_status(&result))
}
