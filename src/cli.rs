//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::camera::Projection;
use crate::params::{ParticlePhysics, SphereParams, BOUNCE_MULTIPLIERS};
use crate::scene::{AxesColor, Command, TextureMode};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "music-visualizer")]
#[command(about = "Audio-reactive sphere, stage and particle fountain", long_about = None)]
pub struct Args {
    /// WAV file to play and analyse (runs silent without one)
    #[arg(long, value_name = "WAV")]
    pub track: Option<PathBuf>,

    /// 24-bit BMP wrapped around the sphere
    #[arg(long, value_name = "BMP")]
    pub texture: Option<PathBuf>,

    /// Particle pool size
    #[arg(long, value_name = "N")]
    pub particles: Option<usize>,

    /// Initial flow rate (particles per second)
    #[arg(long, value_name = "RATE")]
    pub flow: Option<f32>,

    /// Sphere bulge multiplier: 2, 4, 6 or 8
    #[arg(long, value_name = "MULT", value_parser = parse_bulge)]
    pub bulge: Option<u32>,

    /// Seed for the particle spawner
    #[arg(long, value_name = "U64")]
    pub seed: Option<u64>,

    /// Do not open an audio device
    #[arg(long)]
    pub mute: bool,

    /// Starting texture mode: off, plain, distorted
    #[arg(long, value_name = "MODE", value_parser = parse_texture_mode)]
    pub texture_mode: Option<TextureMode>,

    /// Starting projection: ortho, perspective
    #[arg(long, value_name = "PROJECTION", value_parser = parse_projection)]
    pub projection: Option<Projection>,

    /// Starting axes colour (shows the axes): red, yellow, green, cyan, blue, magenta, white, black
    #[arg(long, value_name = "COLOR", value_parser = parse_axes_color)]
    pub axes_color: Option<AxesColor>,
}

fn parse_bulge(value: &str) -> Result<u32, String> {
    let bulge: u32 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if BOUNCE_MULTIPLIERS.contains(&bulge) {
        Ok(bulge)
    } else {
        Err(format!("bulge must be one of {:?}", BOUNCE_MULTIPLIERS))
    }
}

fn parse_texture_mode(value: &str) -> Result<TextureMode, String> {
    match value.to_lowercase().as_str() {
        "off" => Ok(TextureMode::Off),
        "plain" => Ok(TextureMode::Plain),
        "distorted" => Ok(TextureMode::Distorted),
        other => Err(format!("unknown texture mode '{}'", other)),
    }
}

fn parse_projection(value: &str) -> Result<Projection, String> {
    match value.to_lowercase().as_str() {
        "ortho" | "orthographic" => Ok(Projection::Orthographic),
        "perspective" => Ok(Projection::Perspective),
        other => Err(format!("unknown projection '{}'", other)),
    }
}

fn parse_axes_color(value: &str) -> Result<AxesColor, String> {
    let value = value.to_lowercase();
    AxesColor::ALL
        .into_iter()
        .find(|c| format!("{:?}", c).to_lowercase() == value)
        .ok_or_else(|| format!("unknown axes colour '{}'", value))
}

impl Args {
    /// Particle physics with the pool size, flow and seed overrides applied
    pub fn particle_physics(&self) -> ParticlePhysics {
        let mut physics = ParticlePhysics::default();
        if let Some(capacity) = self.particles {
            physics.capacity = capacity;
        }
        physics.seed = self.seed.or(physics.seed);
        if let Some(flow) = self.flow {
            physics.flow_rate = physics.clamp_flow(flow);
        }
        physics
    }

    /// Sphere parameters with the bulge override applied
    pub fn sphere_params(&self) -> SphereParams {
        let mut sphere = SphereParams::default();
        if let Some(bulge) = self.bulge {
            sphere.bounce_multiplier = bulge;
        }
        sphere
    }

    /// Track to play, unless muted
    pub fn audio_track(&self) -> Option<&PathBuf> {
        if self.mute {
            None
        } else {
            self.track.as_ref()
        }
    }

    /// Commands that put the scene in the requested starting state
    pub fn startup_commands(&self) -> Vec<Command> {
        let mut commands = Vec::new();
        if let Some(mode) = self.texture_mode {
            commands.push(Command::SetTextureMode(mode));
        }
        if let Some(projection) = self.projection {
            commands.push(Command::SetProjection(projection));
        }
        if let Some(color) = self.axes_color {
            commands.push(Command::SetAxesColor(color));
            commands.push(Command::ToggleAxes);
        }
        commands
    }
}
