//! Music visualizer - a sphere that bulges with the spectrum of the playing
//! track, a spectrum-deformed stage and a particle fountain bouncing off both.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalPosition,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use music_visualizer::audio::{AudioSystem, Track};
use music_visualizer::camera::Drag;
use music_visualizer::cli::Args;
use music_visualizer::controls::command_for_key;
use music_visualizer::params::{RenderConfig, SpectrumConfig, StageParams};
use music_visualizer::rendering::RenderSystem;
use music_visualizer::scene::{Command, Flow, FrameTimer, Scene};
use music_visualizer::spectrum::{Silence, SpectrumSource};
use music_visualizer::texture::{load_bmp, Texture};

/// Main application state
struct App {
    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,
    texture: Option<Texture>,

    // Simulation
    scene: Scene,
    source: Box<dyn SpectrumSource>,

    // Mouse
    cursor: Option<PhysicalPosition<f64>>,
    drag: Option<Drag>,

    // Time tracking
    start_time: Instant,
    timer: FrameTimer,
}

impl App {
    fn new(args: &Args) -> Self {
        let sphere = args.sphere_params();
        let mut scene = Scene::new(
            &sphere,
            &StageParams::default(),
            args.particle_physics(),
            RenderConfig::default(),
        );
        for command in args.startup_commands() {
            scene.apply(command, &mut Silence);
        }

        let texture = args.texture.as_ref().and_then(|path| match load_bmp(path) {
            Ok(texture) => {
                info!(
                    "Texture: {} ({}x{})",
                    path.display(),
                    texture.width,
                    texture.height
                );
                Some(texture)
            }
            Err(e) => {
                warn!("Texture {} rejected: {}", path.display(), e);
                None
            }
        });

        let spectrum_config = SpectrumConfig {
            resolution: scene.spectrum_resolution(),
            ..SpectrumConfig::default()
        };
        let source = open_audio(args, &spectrum_config);

        Self {
            window: None,
            render_system: None,
            texture,
            scene,
            source,
            cursor: None,
            drag: None,
            start_time: Instant::now(),
            timer: FrameTimer::new(),
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if event.state != ElementState::Pressed {
            return;
        }
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        let Some(command) = command_for_key(code) else {
            return;
        };

        let was_frozen = self.scene.settings.frozen;
        if self.scene.apply(command, self.source.as_mut()) == Flow::Exit {
            event_loop.exit();
            return;
        }
        if command == Command::ToggleFreeze && was_frozen {
            self.timer.reset();
        }
    }

    fn handle_cursor(&mut self, position: PhysicalPosition<f64>) {
        if let (Some(drag), Some(last)) = (self.drag, self.cursor) {
            let dx = (position.x - last.x) as f32;
            let dy = (position.y - last.y) as f32;
            let config = self.scene.render_config().clone();
            self.scene.view.drag(drag, dx, dy, &config);
        }
        self.cursor = Some(position);
    }

    fn handle_button(&mut self, state: ElementState, button: MouseButton) {
        let drag = match button {
            MouseButton::Left => Drag::Rotate,
            MouseButton::Middle => Drag::Scale,
            _ => return,
        };
        self.drag = match state {
            ElementState::Pressed => Some(drag),
            ElementState::Released if self.drag == Some(drag) => None,
            ElementState::Released => self.drag,
        };
    }

    /// Render a single frame
    fn render_frame(&mut self) {
        let dt = self.timer.tick(Instant::now());
        let elapsed = self.start_time.elapsed().as_secs_f32();

        self.scene.update(dt, elapsed, self.source.as_mut());
        self.scene.prepare_frame();

        let Some(render_system) = self.render_system.as_mut() else {
            return;
        };
        match render_system.render(&self.scene) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (width, height) = render_system.size();
                render_system.resize(width, height);
            }
            Err(e) => error!("Render error: {:?}", e),
        }
    }
}

/// Start playback of the requested track, or fall back to silence
fn open_audio(args: &Args, config: &SpectrumConfig) -> Box<dyn SpectrumSource> {
    let Some(path) = args.audio_track() else {
        info!("No track, running silent");
        return Box::new(Silence);
    };

    match Track::load(path).and_then(|track| AudioSystem::new(track, config)) {
        Ok(audio) => Box::new(audio),
        Err(e) => {
            warn!("Audio unavailable ({}), running silent", e);
            Box::new(Silence)
        }
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        let config = self.scene.render_config();
        let window_attributes = Window::default_attributes()
            .with_title("Music Visualizer")
            .with_inner_size(winit::dpi::LogicalSize::new(
                config.window_width,
                config.window_height,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let render_system = match pollster::block_on(RenderSystem::new(
            Arc::clone(&window),
            &self.scene,
            self.texture.as_ref(),
        )) {
            Ok(render_system) => render_system,
            Err(e) => {
                error!("Failed to initialise rendering: {}", e);
                event_loop.exit();
                return;
            }
        };

        info!("Music visualizer is running (q or Esc to quit)");

        self.window = Some(window);
        self.render_system = Some(render_system);
        self.timer.reset();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(event_loop, &event),
            WindowEvent::CursorMoved { position, .. } => self.handle_cursor(position),
            WindowEvent::MouseInput { state, button, .. } => self.handle_button(state, button),
            WindowEvent::Focused(true) => self.timer.reset(),
            WindowEvent::Resized(size) => {
                if let Some(render_system) = self.render_system.as_mut() {
                    render_system.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => self.render_frame(),
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut app = App::new(&args);

    let event_loop = EventLoop::new()?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
