//! Music visualizer library - spectrum-driven sphere, stage and particle fountain

pub mod audio;
pub mod camera;
pub mod cli;
pub mod controls;
pub mod mesh;
pub mod params;
pub mod particles;
pub mod rendering;
pub mod scene;
pub mod spectrum;
pub mod texture;
