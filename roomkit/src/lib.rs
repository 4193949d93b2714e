//! roomkit
//!
//! A small retained-scene-graph viewer: a builder populates the graph
//! once at startup, then a cancellable render loop redraws it every frame
//! until the window closes or the run handle is stopped.

mod color;
pub use color::Color;
pub mod builder;
pub mod gfx;
pub mod orbit;
pub mod room;
pub mod scene;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    RwLock, RwLockReadGuard,
};

use lazy_static::lazy_static;
use winit::{
    dpi::PhysicalSize,
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    platform::run_return::EventLoopExtRunReturn,
    window::{Fullscreen, Window as WInitWindow, WindowBuilder},
};

use gfx::{GfxError, GraphicsParams, Renderer, RendererCreateInfo, RenderingData};
use scene::Scene;

pub struct Window {
    event_loop: RwLock<EventLoop<()>>,
    pub(crate) raw: WInitWindow,
    minimized: AtomicBool,
}

unsafe impl Sync for Window {}

#[derive(Debug, Clone)]
pub struct WindowParams {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizeable: bool,
    pub fullscreen: bool,
}

impl Default for WindowParams {
    fn default() -> Self {
        WindowParams {
            title: "roomkit viewer".to_string(),
            width: 960,
            height: 540,
            resizeable: false,
            fullscreen: false,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ConfigParams {
    pub window: WindowParams,
    pub graphics: GraphicsParams,
}

/// Explicit lifecycle token for the render loop. The loop stops
/// rescheduling frames once stopped; teardown then releases the surface.
pub struct RunHandle {
    running: AtomicBool,
}

lazy_static! {
    static ref S_PARAMS: RwLock<ConfigParams> = RwLock::new(ConfigParams::default());
    static ref S_WINDOW: Window = {
        let params = &ConfigParams::read().window;
        let event_loop = RwLock::new(EventLoop::new());

        let fullscreen = match params.fullscreen {
            true => Some(Fullscreen::Borderless(None)),
            false => None,
        };

        let window = WindowBuilder::new()
            .with_title(params.title.clone())
            .with_inner_size(PhysicalSize::new(params.width, params.height))
            .with_fullscreen(fullscreen)
            .with_resizable(params.resizeable)
            .build(event_loop.read().as_ref().unwrap())
            .unwrap();

        Window {
            event_loop,
            raw: window,
            minimized: AtomicBool::new(false),
        }
    };
    static ref S_RUN_HANDLE: RunHandle = RunHandle {
        running: AtomicBool::new(true),
    };
}

impl ConfigParams {
    pub fn read() -> RwLockReadGuard<'static, Self> {
        S_PARAMS.read().unwrap()
    }
}

impl Window {
    pub fn get_ref() -> &'static Window {
        &S_WINDOW
    }

    pub fn inner_size(&self) -> (u32, u32) {
        let size = self.raw.inner_size();
        (size.width, size.height)
    }

    pub fn inner_aspect(&self) -> f32 {
        let size = self.raw.inner_size();
        match size.height {
            0 => 1.0,
            _ => (size.width as f32) / (size.height as f32),
        }
    }

    fn mark_minimized(&self, val: bool) {
        self.minimized.store(val, Ordering::Release);
    }

    pub fn is_minimized(&self) -> bool {
        self.minimized.load(Ordering::Acquire)
    }
}

impl RunHandle {
    pub fn get_ref() -> &'static RunHandle {
        &S_RUN_HANDLE
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn request_stop(&self) {
        self.running.store(false, Ordering::Release)
    }
}

/// The application hook driven by the render loop: build once, then get
/// polled every frame and notified of resizes and pointer input.
pub trait SceneScript: Sized {
    fn new(params: &ConfigParams) -> Self;

    fn scene(&self) -> Scene;

    fn update(&mut self);

    fn on_resize(&mut self, _width: u32, _height: u32) {}

    fn on_window_event(&mut self, _event: &WindowEvent<'_>) {}
}

/// Runs the render loop to completion: one `update` + `render` per frame,
/// resize handled synchronously between frames, until the window closes
/// or the `RunHandle` is stopped.
pub fn launch<S: SceneScript>(params: ConfigParams) -> Result<(), GfxError> {
    *S_PARAMS.write().unwrap() = params;

    let window = Window::get_ref();
    let mut script = S::new(&ConfigParams::read());
    let (width, height) = window.inner_size();
    let mut renderer = Renderer::new(&RendererCreateInfo::new(width, height))?;

    let run = RunHandle::get_ref();

    let mut event_loop = window.event_loop.write().unwrap();
    event_loop.run_return(|event, _, ctrl_flow| {
        *ctrl_flow = ControlFlow::Poll;
        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    run.request_stop();
                    *ctrl_flow = ControlFlow::Exit;
                }
                WindowEvent::Resized(size) => {
                    log::debug!("Window resized to {:?}", size);
                    if size.width == 0 && size.height == 0 {
                        window.mark_minimized(true);
                    } else {
                        window.mark_minimized(false);
                        renderer.recreate(&RendererCreateInfo::new(size.width, size.height));
                        script.on_resize(size.width, size.height);
                    }
                }
                other => script.on_window_event(&other),
            },
            Event::MainEventsCleared => {
                if !run.is_running() {
                    *ctrl_flow = ControlFlow::Exit;
                } else if !window.is_minimized() {
                    script.update();
                    let rendering_data = RenderingData::parse_scene(&script.scene());
                    if let Err(e) = renderer.render(&rendering_data) {
                        log::error!("Rendering error: {}", e);
                        run.request_stop();
                        *ctrl_flow = ControlFlow::Exit;
                    }
                }
            }
            _ => (),
        }
    });

    // Dropping the renderer here releases the surface.
    Ok(())
}
