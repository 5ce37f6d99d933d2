//! Window creation and the winit event handler.
//!
//! [`AppState`] owns the window, the GPU context and the renderer. Startup
//! failures inside the event loop are kept and returned from [`run`].

use std::path::PathBuf;
use std::sync::Arc;

use orrery_config::{Config, SceneConfig};
use orrery_input::{KeyboardState, MouseState};
use orrery_render::{Camera, RenderContext, SurfaceError, init_render_context_blocking};
use orrery_scene::{SceneConstants, SolarSystem};
use tracing::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, DeviceId, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::KeyCode;
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use crate::camera_controller::FreeCamera;
use crate::error::AppError;
use crate::game_loop::{FIXED_DT, GameLoop};
use crate::renderer::{RendererSettings, SolarSystemRenderer};
use crate::sim_clock::SimulationClock;

pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    let attributes = WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ));
    if config.window.fullscreen {
        attributes.with_fullscreen(Some(Fullscreen::Borderless(None)))
    } else {
        attributes
    }
}

/// Config overrides layered onto the default scene constants.
pub fn scene_constants(scene: &SceneConfig) -> SceneConstants {
    SceneConstants {
        time_scale: scene.time_scale,
        size_scale: scene.size_scale,
        ..SceneConstants::default()
    }
}

/// What a frame's key presses asked for beyond camera movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyCommands {
    /// Escape.
    pub exit: bool,
    /// Tab: grab or release the cursor.
    pub toggle_capture: bool,
    /// F5: re-read `config.ron`.
    pub reload_config: bool,
}

/// Apply the simulation and camera hotkeys for this frame.
pub fn handle_hotkeys(
    keyboard: &KeyboardState,
    clock: &mut SimulationClock,
    free_camera: &mut FreeCamera,
) -> KeyCommands {
    if keyboard.just_pressed(KeyCode::KeyP) {
        let paused = clock.toggle_pause();
        info!("Simulation {}", if paused { "paused" } else { "resumed" });
    }
    if keyboard.any_just_pressed(&[KeyCode::Equal, KeyCode::NumpadAdd]) {
        info!("Time multiplier {}x", clock.speed_up());
    }
    if keyboard.any_just_pressed(&[KeyCode::Minus, KeyCode::NumpadSubtract]) {
        info!("Time multiplier {}x", clock.slow_down());
    }
    if keyboard.just_pressed(KeyCode::KeyR) {
        free_camera.reset();
    }
    KeyCommands {
        exit: keyboard.just_pressed(KeyCode::Escape),
        toggle_capture: keyboard.just_pressed(KeyCode::Tab),
        reload_config: keyboard.just_pressed(KeyCode::F5),
    }
}

/// Adopt a reloaded config while running.
///
/// Scene constants rebuild the solar system and input settings go to the
/// camera. Window, render and mesh settings only apply on the next start.
/// Nothing changes if `fresh` is invalid.
pub fn apply_reloaded_config(
    current: &Config,
    fresh: &Config,
    free_camera: &mut FreeCamera,
    system: &mut SolarSystem,
) -> Result<(), AppError> {
    fresh.validate()?;
    let constants = scene_constants(&fresh.scene);
    let rebuilt = if constants != *system.constants() {
        Some(SolarSystem::with_constants(constants)?)
    } else {
        None
    };

    if let Some(rebuilt) = rebuilt {
        info!(
            "Scene rebuilt: time scale {}, size scale {}",
            constants.time_scale, constants.size_scale
        );
        *system = rebuilt;
    }
    if fresh.input != current.input {
        free_camera.apply_input_config(&fresh.input);
    }
    if fresh.window != current.window
        || fresh.render != current.render
        || fresh.scene.sphere_segments != current.scene.sphere_segments
        || fresh.scene.asset_dir != current.scene.asset_dir
    {
        info!("Window, render and mesh changes take effect on restart");
    }
    Ok(())
}

pub struct AppState {
    config: Config,
    config_dir: PathBuf,
    system: SolarSystem,
    window: Option<Arc<Window>>,
    gpu: Option<RenderContext>,
    renderer: Option<SolarSystemRenderer>,
    camera: Camera,
    free_camera: FreeCamera,
    keyboard: KeyboardState,
    mouse: MouseState,
    game_loop: GameLoop,
    clock: SimulationClock,
    startup_error: Option<AppError>,
}

impl AppState {
    pub fn new(config: Config, config_dir: PathBuf, system: SolarSystem) -> Self {
        let mut camera = Camera::default();
        camera.set_aspect_ratio(config.window.width as f32, config.window.height as f32);
        let free_camera = FreeCamera::from_config(&config.input);
        free_camera.apply_to(&mut camera);

        Self {
            config,
            config_dir,
            system,
            window: None,
            gpu: None,
            renderer: None,
            camera,
            free_camera,
            keyboard: KeyboardState::new(),
            mouse: MouseState::new(),
            game_loop: GameLoop::new(),
            clock: SimulationClock::new(),
            startup_error: None,
        }
    }

    /// The error that ended the event loop, if any.
    pub fn take_error(&mut self) -> Option<AppError> {
        self.startup_error.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        error!("{err}");
        self.startup_error = Some(err);
        event_loop.exit();
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window = Arc::new(event_loop.create_window(window_attributes_from_config(&self.config))?);
        let gpu = init_render_context_blocking(Arc::clone(&window), self.config.render.vsync)?;
        info!("GPU: {} ({:?})", gpu.adapter_info.name, gpu.adapter_info.backend);

        let size = gpu.size();
        self.camera.set_aspect_ratio(size.0 as f32, size.1 as f32);
        let renderer = SolarSystemRenderer::new(
            &gpu.device,
            &gpu.queue,
            gpu.surface_format,
            size,
            &self.system,
            &RendererSettings::from_config(&self.config),
        )?;

        self.renderer = Some(renderer);
        self.gpu = Some(gpu);
        self.window = Some(window);
        self.game_loop.reset_clock();
        Ok(())
    }

    fn reload_config(&mut self) {
        let fresh = match self.config.reload(&self.config_dir) {
            Ok(Some(fresh)) => fresh,
            Ok(None) => {
                info!("Config unchanged");
                return;
            }
            Err(err) => {
                warn!("Config reload failed: {err}");
                return;
            }
        };
        match apply_reloaded_config(&self.config, &fresh, &mut self.free_camera, &mut self.system) {
            Ok(()) => self.config = fresh,
            Err(err) => warn!("Keeping the current config: {err}"),
        }
    }

    fn set_captured(&mut self, captured: bool) {
        if let Some(window) = &self.window {
            self.mouse.set_captured(window, captured);
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.camera.set_aspect_ratio(width as f32, height as f32);
        if let Some(gpu) = &mut self.gpu {
            gpu.resize(width, height);
            if let Some(renderer) = &mut self.renderer {
                renderer.resize(&gpu.device, width, height);
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let commands = handle_hotkeys(&self.keyboard, &mut self.clock, &mut self.free_camera);
        if commands.exit {
            info!("Escape pressed, shutting down");
            event_loop.exit();
            return;
        }
        if commands.reload_config {
            self.reload_config();
        }
        if commands.toggle_capture || self.mouse.just_pressed(MouseButton::Right) {
            self.set_captured(!self.mouse.is_captured());
        }

        self.free_camera.handle_mouse(&self.mouse);
        for _ in 0..self.game_loop.tick() {
            self.free_camera.move_step(FIXED_DT as f32, &self.keyboard);
            self.clock.advance(FIXED_DT);
        }
        self.free_camera.apply_to(&mut self.camera);

        let items = self.system.evaluate(self.clock.seconds());
        let light = self.system.light();

        if let (Some(gpu), Some(renderer)) = (&mut self.gpu, &mut self.renderer) {
            match renderer.render(gpu, &self.camera, &light, &items) {
                Ok(()) => {}
                Err(SurfaceError::Lost) => {
                    let (w, h) = gpu.size();
                    gpu.resize(w, h);
                }
                Err(SurfaceError::OutOfMemory) => {
                    error!("GPU out of memory");
                    event_loop.exit();
                }
                Err(SurfaceError::Timeout) => {
                    warn!("Surface timeout, skipping frame");
                }
            }
        }

        self.keyboard.end_frame();
        self.mouse.end_frame();
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.initialize(event_loop) {
            self.fail(event_loop, err);
            return;
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => self.resize(size.width, size.height),
            WindowEvent::Focused(false) => {
                self.keyboard.reset();
                self.set_captured(false);
            }
            WindowEvent::KeyboardInput { event, .. } => self.keyboard.process_event(&event),
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse.on_cursor_moved(position.x, position.y);
            }
            WindowEvent::CursorLeft { .. } => self.mouse.on_cursor_left(),
            WindowEvent::MouseInput { state, button, .. } => self.mouse.on_button(button, state),
            WindowEvent::MouseWheel { delta, .. } => self.mouse.on_scroll(delta),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.mouse.on_raw_motion(delta.0, delta.1);
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        info!(
            "Ran {} frames, {} fixed steps",
            self.game_loop.frame_count(),
            self.game_loop.step_count()
        );
        if let Some(renderer) = self.renderer.take() {
            renderer.teardown();
        }
    }
}

/// Build the scene from `config`, open the window and block until it closes.
///
/// F5 re-reads `config.ron` from `config_dir`.
pub fn run(config: Config, config_dir: PathBuf) -> Result<(), AppError> {
    let system = SolarSystem::with_constants(scene_constants(&config.scene))?;
    let event_loop = EventLoop::new()?;
    let mut app = AppState::new(config, config_dir, system);
    event_loop.run_app(&mut app)?;
    match app.take_error() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
