//! Square floor grid that sags with each channel's low-frequency energy.

use std::f32::consts::PI;

use super::{grid_indices, rerange, Vertex};
use crate::params::StageParams;
use crate::spectrum::Spectrum;

/// Stage grid over `[left, right]^2`, rewritten in place each frame
pub struct StageMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    params: StageParams,
}

impl StageMesh {
    pub fn new(params: &StageParams) -> Self {
        let side = params.resolution.max(1) + 1;

        let mut mesh = Self {
            vertices: Vec::with_capacity(side * side),
            indices: grid_indices(side, side),
            params: params.clone(),
        };
        mesh.rebuild(None);
        mesh
    }

    /// Height of the stage at `(x, z)`
    ///
    /// Channel 1 shapes the sag along x and channel 0 along z; their product gives a
    /// saddle that is deepest in the middle and flat along the edges.
    pub fn height_at(&self, x: f32, z: f32, spectrum: Option<&Spectrum>) -> f32 {
        let p = &self.params;
        let Some(spectrum) = spectrum else {
            return p.height;
        };

        let bin = p.spectrum_bin as isize;
        let x_bulge = (rerange(x, p.left, p.right, -PI, PI).cos() + 1.0) * spectrum.sample(1, bin);
        let z_bulge = (rerange(z, p.left, p.right, -PI, PI).cos() + 1.0) * spectrum.sample(0, bin);

        p.height - x_bulge * z_bulge * p.exaggeration
    }

    /// Regenerate every vertex; `None` yields the flat stage at base height
    pub fn rebuild(&mut self, spectrum: Option<&Spectrum>) {
        let resolution = self.params.resolution.max(1);
        let (left, right) = (self.params.left, self.params.right);
        let step = (right - left) / resolution as f32;

        let mut vertices = std::mem::take(&mut self.vertices);
        vertices.clear();

        for iz in 0..=resolution {
            let z = left + step * iz as f32;
            for ix in 0..=resolution {
                let x = left + step * ix as f32;
                vertices.push(Vertex {
                    position: [x, self.height_at(x, z, spectrum), z],
                    normal: [0.0, 1.0, 0.0],
                    uv: [
                        ix as f32 / resolution as f32,
                        iz as f32 / resolution as f32,
                    ],
                });
            }
        }

        self.vertices = vertices;
    }
}
