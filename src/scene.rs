//! Scene state: display toggles, the command dispatcher and the per-frame update.
//!
//! The scene owns the particle engine, the spectrum snapshot of the current frame and the
//! mesh buffers the renderer uploads. A driver calls [`Scene::update`] once per frame,
//! then [`Scene::prepare_frame`] before drawing; discrete user input arrives as
//! [`Command`]s through [`Scene::apply`].

use std::time::Instant;

use log::{debug, info, trace};

use crate::camera::{Projection, ViewState};
use crate::mesh::{axes, ColorVertex, SphereMesh, StageMesh, TexCoords};
use crate::params::{
    next_bounce_multiplier, ParticlePhysics, RenderConfig, SphereParams, StageParams,
    BOUNCE_MULTIPLIERS,
};
use crate::particles::ParticleEngine;
use crate::spectrum::{Spectrum, SpectrumSource};

/// Number of switchable lights
pub const LIGHT_COUNT: usize = 3;

/// Globe texture usage on the sphere
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextureMode {
    #[default]
    Off,
    Plain,
    Distorted,
}

impl TextureMode {
    pub fn next(self) -> Self {
        match self {
            TextureMode::Off => TextureMode::Plain,
            TextureMode::Plain => TextureMode::Distorted,
            TextureMode::Distorted => TextureMode::Off,
        }
    }
}

/// Axes colours
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AxesColor {
    Red,
    Yellow,
    Green,
    Cyan,
    Blue,
    Magenta,
    #[default]
    White,
    Black,
}

impl AxesColor {
    pub const ALL: [AxesColor; 8] = [
        AxesColor::Red,
        AxesColor::Yellow,
        AxesColor::Green,
        AxesColor::Cyan,
        AxesColor::Blue,
        AxesColor::Magenta,
        AxesColor::White,
        AxesColor::Black,
    ];

    pub fn rgb(self) -> [f32; 3] {
        match self {
            AxesColor::Red => [1.0, 0.0, 0.0],
            AxesColor::Yellow => [1.0, 1.0, 0.0],
            AxesColor::Green => [0.0, 1.0, 0.0],
            AxesColor::Cyan => [0.0, 1.0, 1.0],
            AxesColor::Blue => [0.0, 0.0, 1.0],
            AxesColor::Magenta => [1.0, 0.0, 1.0],
            AxesColor::White => [1.0, 1.0, 1.0],
            AxesColor::Black => [0.0, 0.0, 0.0],
        }
    }

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|&c| c == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

/// Everything the user can toggle
#[derive(Clone, Debug, PartialEq)]
pub struct SceneSettings {
    pub axes: bool,
    pub axes_color: AxesColor,
    pub texture: TextureMode,
    /// Linear fog with distance from the eye
    pub depth_cue: bool,
    pub lights: [bool; LIGHT_COUNT],
    /// Spectrum-driven sphere
    pub sphere: bool,
    pub particles: bool,
    pub stage: bool,
    /// Spin the sphere once per animation cycle
    pub rotate: bool,
    pub projection: Projection,
    /// Stop advancing animation, spectrum and particles
    pub frozen: bool,
    pub bounce_multiplier: u32,
}

impl SceneSettings {
    /// Reset state with the given bulge amplitude
    pub fn with_bounce(bounce_multiplier: u32) -> Self {
        Self {
            axes: false,
            axes_color: AxesColor::White,
            texture: TextureMode::Off,
            depth_cue: false,
            lights: [true; LIGHT_COUNT],
            sphere: true,
            particles: false,
            stage: false,
            rotate: false,
            projection: Projection::Orthographic,
            frozen: false,
            bounce_multiplier,
        }
    }
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self::with_bounce(SphereParams::default().bounce_multiplier)
    }
}

/// Discrete user input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    ToggleAxes,
    CycleAxesColor,
    SetAxesColor(AxesColor),
    CycleTextureMode,
    SetTextureMode(TextureMode),
    ToggleDepthCue,
    /// Index in `0..LIGHT_COUNT`; others are ignored
    ToggleLight(usize),
    ToggleSphere,
    ToggleParticles,
    ToggleStage,
    ToggleRotation,
    ToggleFreeze,
    ToggleProjection,
    SetProjection(Projection),
    CycleBounce,
    /// One of `BOUNCE_MULTIPLIERS`; others are ignored
    SetBounce(u32),
    IncreaseFlow,
    DecreaseFlow,
    ToggleMusic,
    Reset,
    Quit,
}

/// Whether the driver should keep running after a command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Animation time derived from wall-clock elapsed time
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationClock {
    cycle_s: f32,
    time: f32,
    time_cycle: f32,
}

impl AnimationClock {
    pub fn new(cycle_s: f32) -> Self {
        Self {
            cycle_s: cycle_s.max(f32::EPSILON),
            time: 0.0,
            time_cycle: 0.0,
        }
    }

    pub fn update(&mut self, elapsed_s: f32) {
        self.time = elapsed_s;
        let phase = elapsed_s.rem_euclid(self.cycle_s) / self.cycle_s;
        self.time_cycle = phase.min(1.0 - f32::EPSILON);
    }

    /// Seconds since start
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Position in the current animation cycle, in `[0, 1)`
    pub fn time_cycle(&self) -> f32 {
        self.time_cycle
    }
}

/// Measures real frame deltas
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameTimer {
    last: Option<Instant>,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous tick (zero on the first tick after a reset)
    pub fn tick(&mut self, now: Instant) -> f32 {
        let dt = self
            .last
            .map(|last| now.saturating_duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last = Some(now);
        dt
    }

    /// Forget the previous tick so a long pause is not simulated
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Complete visualizer state
pub struct Scene {
    pub settings: SceneSettings,
    pub view: ViewState,
    engine: ParticleEngine,
    spectrum: Option<Spectrum>,
    sphere: SphereMesh,
    stage: StageMesh,
    points: Vec<ColorVertex>,
    axes: Vec<ColorVertex>,
    clock: AnimationClock,
    default_bounce: u32,
    render: RenderConfig,
}

impl Scene {
    pub fn new(
        sphere: &SphereParams,
        stage: &StageParams,
        physics: ParticlePhysics,
        render: RenderConfig,
    ) -> Self {
        let settings = SceneSettings::with_bounce(sphere.bounce_multiplier);
        let axes = axes(render.axes_length, settings.axes_color.rgb());

        Self {
            settings,
            view: ViewState::default(),
            engine: ParticleEngine::new(physics),
            spectrum: None,
            sphere: SphereMesh::new(sphere),
            stage: StageMesh::new(stage),
            points: Vec::new(),
            axes,
            clock: AnimationClock::new(render.animation_cycle_s()),
            default_bounce: sphere.bounce_multiplier,
            render,
        }
    }

    pub fn engine(&self) -> &ParticleEngine {
        &self.engine
    }

    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    pub fn render_config(&self) -> &RenderConfig {
        &self.render
    }

    /// This frame's spectrum (`None` when unavailable)
    pub fn spectrum(&self) -> Option<&Spectrum> {
        self.spectrum.as_ref()
    }

    /// Resolution the sphere samples the spectrum at
    pub fn spectrum_resolution(&self) -> usize {
        self.sphere.num_lngs()
    }

    pub fn sphere(&self) -> &SphereMesh {
        &self.sphere
    }

    pub fn stage(&self) -> &StageMesh {
        &self.stage
    }

    /// Live particle points (empty when particles are hidden)
    pub fn points(&self) -> &[ColorVertex] {
        &self.points
    }

    pub fn axes(&self) -> &[ColorVertex] {
        &self.axes
    }

    /// Sphere spin about Y (degrees)
    pub fn sphere_rotation_deg(&self) -> f32 {
        if self.settings.rotate {
            self.clock.time_cycle() * 360.0
        } else {
            0.0
        }
    }

    /// Advance animation time, pull the spectrum and step the particles
    pub fn update(&mut self, frame_dt: f32, elapsed_s: f32, source: &mut dyn SpectrumSource) {
        if self.settings.frozen {
            return;
        }

        self.clock.update(elapsed_s);
        self.spectrum = source.spectrum(self.spectrum_resolution());
        let stats = self.engine.advance(frame_dt);
        trace!(
            "particles: {} spawned, {} bounced, {} retired, {} alive",
            stats.spawned,
            stats.bounced,
            stats.retired,
            self.engine.alive_count()
        );
    }

    /// Regenerate meshes and particle points for drawing
    pub fn prepare_frame(&mut self) {
        let spectrum = self.spectrum.as_ref();

        if self.settings.sphere {
            let tex = match self.settings.texture {
                TextureMode::Distorted => TexCoords::Rippled {
                    time_cycle: self.clock.time_cycle(),
                },
                TextureMode::Off | TextureMode::Plain => TexCoords::Plain,
            };
            self.sphere
                .rebuild(spectrum, self.settings.bounce_multiplier as f32, tex);
        }

        if self.settings.stage {
            self.stage.rebuild(spectrum);
        }

        if self.settings.particles {
            self.engine
                .write_points(self.render.particle_alpha, &mut self.points);
        } else {
            self.points.clear();
        }
    }

    /// Single dispatcher for user commands
    pub fn apply(&mut self, command: Command, source: &mut dyn SpectrumSource) -> Flow {
        let s = &mut self.settings;

        match command {
            Command::ToggleAxes => s.axes = !s.axes,
            Command::CycleAxesColor => s.axes_color = s.axes_color.next(),
            Command::SetAxesColor(color) => s.axes_color = color,
            Command::CycleTextureMode => s.texture = s.texture.next(),
            Command::SetTextureMode(mode) => s.texture = mode,
            Command::ToggleDepthCue => s.depth_cue = !s.depth_cue,
            Command::ToggleLight(i) => {
                if let Some(light) = s.lights.get_mut(i) {
                    *light = !*light;
                }
            }
            Command::ToggleSphere => s.sphere = !s.sphere,
            Command::ToggleParticles => s.particles = !s.particles,
            Command::ToggleStage => s.stage = !s.stage,
            Command::ToggleRotation => s.rotate = !s.rotate,
            Command::ToggleFreeze => s.frozen = !s.frozen,
            Command::ToggleProjection => s.projection = s.projection.toggled(),
            Command::SetProjection(projection) => s.projection = projection,
            Command::CycleBounce => s.bounce_multiplier = next_bounce_multiplier(s.bounce_multiplier),
            Command::SetBounce(m) => {
                if BOUNCE_MULTIPLIERS.contains(&m) {
                    s.bounce_multiplier = m;
                }
            }
            Command::IncreaseFlow => {
                let flow = self.engine.increase_flow();
                info!("{} particles/second", flow);
            }
            Command::DecreaseFlow => {
                let flow = self.engine.decrease_flow();
                info!("{} particles/second", flow);
            }
            Command::ToggleMusic => source.toggle_paused(),
            Command::Reset => {
                self.settings = SceneSettings::with_bounce(self.default_bounce);
                self.view = ViewState::default();
            }
            Command::Quit => return Flow::Exit,
        }

        if matches!(command, Command::CycleAxesColor | Command::SetAxesColor(_) | Command::Reset) {
            self.axes = axes(self.render.axes_length, self.settings.axes_color.rgb());
        }

        debug!("{:?} -> {:?}", command, self.settings);
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::{FixedSpectrum, Silence};
    use std::time::Duration;

    fn scene() -> Scene {
        let physics = ParticlePhysics {
            seed: Some(42),
            ..Default::default()
        };
        Scene::new(
            &SphereParams::default(),
            &StageParams::default(),
            physics,
            RenderConfig::default(),
        )
    }

    fn radius(v: &crate::mesh::Vertex) -> f32 {
        v.position.iter().map(|c| c * c).sum::<f32>().sqrt()
    }

    #[test]
    fn test_defaults_match_reset_state() {
        let settings = SceneSettings::default();

        assert!(settings.sphere);
        assert_eq!(settings.lights, [true; 3]);
        assert_eq!(settings.projection, Projection::Orthographic);
        assert_eq!(settings.bounce_multiplier, 8);
        assert_eq!(settings.axes_color, AxesColor::White);
        assert!(!settings.axes && !settings.particles && !settings.stage);
        assert!(!settings.rotate && !settings.frozen && !settings.depth_cue);
        assert_eq!(settings.texture, TextureMode::Off);
    }

    #[test]
    fn test_unavailable_spectrum_gives_plain_sphere() {
        let mut scene = scene();
        scene.settings.stage = true;

        scene.update(0.016, 0.3, &mut Silence);
        scene.prepare_frame();

        assert!(scene.spectrum().is_none());
        assert!(scene
            .sphere()
            .vertices
            .iter()
            .all(|v| (radius(v) - 1.0).abs() < 1e-5));
        assert!(scene.stage().vertices.iter().all(|v| v.position[1] == -2.0));
    }

    #[test]
    fn test_spectrum_bulges_sphere() {
        let mut scene = scene();
        let mut source = FixedSpectrum::flat(1024, 0.02);

        scene.update(0.016, 0.3, &mut source);
        scene.prepare_frame();

        assert_eq!(scene.spectrum().map(|s| s.resolution()), Some(100));
        let max = scene
            .sphere()
            .vertices
            .iter()
            .map(radius)
            .fold(0.0_f32, f32::max);
        assert!(max > 1.2);
    }

    #[test]
    fn test_frozen_scene_does_not_advance() {
        let mut scene = scene();
        scene.apply(Command::ToggleFreeze, &mut Silence);

        let mut source = FixedSpectrum::flat(1024, 0.02);
        scene.update(0.05, 1.5, &mut source);

        assert_eq!(scene.clock().time(), 0.0);
        assert!(scene.spectrum().is_none());
        assert_eq!(scene.engine().alive_count(), 0);

        scene.apply(Command::ToggleFreeze, &mut Silence);
        scene.update(0.05, 1.5, &mut source);
        assert_eq!(scene.clock().time(), 1.5);
        assert!(scene.engine().alive_count() > 0);
    }

    #[test]
    fn test_particle_points_follow_toggle() {
        let mut scene = scene();
        scene.update(0.05, 0.05, &mut Silence);

        scene.prepare_frame();
        assert!(scene.points().is_empty());

        scene.apply(Command::ToggleParticles, &mut Silence);
        scene.prepare_frame();
        assert_eq!(scene.points().len(), scene.engine().alive_count());
        assert!(!scene.points().is_empty());
    }

    #[test]
    fn test_flow_commands_clamp() {
        let mut scene = scene();

        for _ in 0..200 {
            scene.apply(Command::IncreaseFlow, &mut Silence);
        }
        assert_eq!(scene.engine().flow_rate(), 10000.0);

        for _ in 0..200 {
            scene.apply(Command::DecreaseFlow, &mut Silence);
        }
        assert_eq!(scene.engine().flow_rate(), 0.0);
    }

    #[test]
    fn test_bounce_commands() {
        let mut scene = scene();

        scene.apply(Command::CycleBounce, &mut Silence);
        assert_eq!(scene.settings.bounce_multiplier, 2);

        scene.apply(Command::SetBounce(6), &mut Silence);
        assert_eq!(scene.settings.bounce_multiplier, 6);

        scene.apply(Command::SetBounce(5), &mut Silence);
        assert_eq!(scene.settings.bounce_multiplier, 6);
    }

    #[test]
    fn test_set_commands() {
        let mut scene = scene();

        scene.apply(Command::SetTextureMode(TextureMode::Distorted), &mut Silence);
        scene.apply(Command::SetProjection(Projection::Perspective), &mut Silence);
        scene.apply(Command::SetAxesColor(AxesColor::Green), &mut Silence);

        assert_eq!(scene.settings.texture, TextureMode::Distorted);
        assert_eq!(scene.settings.projection, Projection::Perspective);
        assert_eq!(scene.settings.axes_color, AxesColor::Green);
        assert_eq!(scene.axes()[0].color, [0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_lights_toggle_individually() {
        let mut scene = scene();

        scene.apply(Command::ToggleLight(1), &mut Silence);
        scene.apply(Command::ToggleLight(7), &mut Silence);

        assert_eq!(scene.settings.lights, [true, false, true]);
    }

    #[test]
    fn test_music_toggle_reaches_source() {
        let mut scene = scene();
        let mut source = FixedSpectrum::flat(1024, 0.02);

        scene.apply(Command::ToggleMusic, &mut source);
        assert!(source.is_paused());
    }

    #[test]
    fn test_reset_restores_settings_and_view() {
        let mut scene = scene();
        scene.apply(Command::ToggleAxes, &mut Silence);
        scene.apply(Command::CycleAxesColor, &mut Silence);
        scene.apply(Command::ToggleProjection, &mut Silence);
        scene.apply(Command::CycleTextureMode, &mut Silence);
        scene.view.xrot = 30.0;
        scene.view.scale = 0.4;

        assert_eq!(scene.axes()[0].color, [0.0, 0.0, 0.0, 1.0]);

        scene.apply(Command::Reset, &mut Silence);

        assert_eq!(scene.settings, SceneSettings::default());
        assert_eq!(scene.view, ViewState::default());
        assert_eq!(scene.axes()[0].color, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_quit_exits() {
        let mut scene = scene();
        assert_eq!(scene.apply(Command::ToggleAxes, &mut Silence), Flow::Continue);
        assert_eq!(scene.apply(Command::Quit, &mut Silence), Flow::Exit);
    }

    #[test]
    fn test_rotation_follows_cycle() {
        let mut scene = scene();
        scene.update(0.016, 0.5, &mut Silence);
        assert_eq!(scene.sphere_rotation_deg(), 0.0);

        scene.apply(Command::ToggleRotation, &mut Silence);
        assert!((scene.sphere_rotation_deg() - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_texture_mode_cycles() {
        assert_eq!(TextureMode::Off.next(), TextureMode::Plain);
        assert_eq!(TextureMode::Plain.next(), TextureMode::Distorted);
        assert_eq!(TextureMode::Distorted.next(), TextureMode::Off);
    }

    #[test]
    fn test_axes_colour_cycles_through_all() {
        let mut color = AxesColor::Red;
        for _ in 0..AxesColor::ALL.len() {
            color = color.next();
        }
        assert_eq!(color, AxesColor::Red);
        assert_eq!(AxesColor::White.next(), AxesColor::Black);
    }

    #[test]
    fn test_clock_cycle() {
        let mut clock = AnimationClock::new(2.0);

        clock.update(0.5);
        assert!((clock.time_cycle() - 0.25).abs() < 1e-6);

        clock.update(5.0);
        assert_eq!(clock.time(), 5.0);
        assert!((clock.time_cycle() - 0.5).abs() < 1e-6);

        clock.update(4.0);
        assert!(clock.time_cycle() < 1.0);
    }

    #[test]
    fn test_frame_timer() {
        let mut timer = FrameTimer::new();
        let start = Instant::now();

        assert_eq!(timer.tick(start), 0.0);
        let dt = timer.tick(start + Duration::from_millis(20));
        assert!((dt - 0.02).abs() < 1e-6);

        timer.reset();
        assert_eq!(timer.tick(start + Duration::from_secs(30)), 0.0);
    }
}
