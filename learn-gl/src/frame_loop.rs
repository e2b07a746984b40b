use crate::errors::FrameError;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopState {
    Running,
    /// terminal; nothing is drawn after this
    Closing,
}

/// The window events the programs care about.  Everything else is ignored.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameEvent {
    EscapePressed,
    CloseRequested,
    /// new framebuffer size, in pixels
    FramebufferResized {
        width: u32,
        height: u32,
    },
    RedrawRequested,
}

impl FrameEvent {
    pub fn from_window_event(event: &WindowEvent) -> Option<Self> {
        match event {
            WindowEvent::CloseRequested => Some(FrameEvent::CloseRequested),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => Some(FrameEvent::EscapePressed),
            WindowEvent::Resized(size) => Some(FrameEvent::FramebufferResized {
                width: size.width,
                height: size.height,
            }),
            WindowEvent::RedrawRequested => Some(FrameEvent::RedrawRequested),
            _ => None,
        }
    }
}

/// Whatever owns the window and the GL objects.
pub trait Drawable {
    /// Match the viewport (and surface) to a new framebuffer size.
    fn resize(&mut self, width: u32, height: u32) -> Result<(), FrameError>;

    /// Clear, bind, draw, present.
    fn draw_frame(&mut self) -> Result<(), FrameError>;

    /// Ask the windowing system for the next `RedrawRequested`.
    fn request_redraw(&self) {}
}

/// One frame, split so that a failed draw still gets presented.
pub trait FrameSteps {
    fn clear(&mut self) -> Result<(), FrameError>;

    /// Bind the program and buffers and issue the draw call.
    fn draw_scene(&mut self) -> Result<(), FrameError>;

    fn present(&mut self) -> Result<(), FrameError>;
}

/// Reports a run of failing draws once, at its start, instead of every frame.
#[derive(Debug, Default)]
pub struct DrawFailures {
    streak: u64,
}

impl DrawFailures {
    pub fn streak(&self) -> u64 {
        self.streak
    }

    pub fn record(&mut self, result: Result<(), FrameError>) {
        match result {
            Ok(()) => {
                if self.streak > 0 {
                    log::info!("drawing recovered after {} failed frames", self.streak);
                }
                self.streak = 0;
            }
            Err(e) => {
                if self.streak == 0 {
                    log::error!("draw failed, frames will show only the clear color: {}", e);
                } else {
                    log::trace!("draw failed again: {}", e);
                }
                self.streak += 1;
            }
        }
    }
}

/// clear, draw, present.  Only clear and present failures fail the frame.
pub fn present_frame<S: FrameSteps + ?Sized>(
    steps: &mut S,
    failures: &mut DrawFailures,
) -> Result<(), FrameError> {
    steps.clear()?;
    failures.record(steps.draw_scene());
    steps.present()
}

/// Running until escape or a close request, then Closing forever.
pub struct FrameLoop {
    state: LoopState,
    frames_drawn: u64,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameLoop {
    pub fn new() -> Self {
        Self {
            state: LoopState::Running,
            frames_drawn: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn close(&mut self) {
        self.state = LoopState::Closing;
    }

    pub fn handle<D: Drawable + ?Sized>(
        &mut self,
        drawable: &mut D,
        event: FrameEvent,
    ) -> LoopState {
        if !self.is_running() {
            return self.state;
        }

        match event {
            FrameEvent::EscapePressed => {
                log::debug!("escape pressed");
                self.close();
            }
            FrameEvent::CloseRequested => {
                log::debug!("close requested");
                self.close();
            }
            FrameEvent::FramebufferResized { width, height } => {
                log::trace!("framebuffer resized to {}x{}", width, height);
                if let Err(e) = drawable.resize(width, height) {
                    log::error!("resize to {}x{} failed: {}", width, height, e);
                }
            }
            FrameEvent::RedrawRequested => match drawable.draw_frame() {
                Ok(()) => self.frames_drawn += 1,
                Err(e) => log::error!("frame {} failed: {}", self.frames_drawn, e),
            },
        }

        self.state
    }
}
