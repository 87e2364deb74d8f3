//! Latitude/longitude sphere whose hemispheres bulge with the two audio channels.

use std::f32::consts::PI;

use bytemuck::Zeroable;

use super::{grid_indices, rerange, Vertex};
use crate::params::SphereParams;
use crate::spectrum::Spectrum;

/// How texture coordinates are laid over the sphere
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TexCoords {
    /// Linear in longitude and latitude
    Plain,
    /// Latitude coordinate rippled by a sine travelling around the sphere
    Rippled { time_cycle: f32 },
}

/// Sphere vertex grid, rewritten in place each frame
///
/// Row `ilat` runs from the south pole (0) to the north pole (`num_lats - 1`); the first
/// and last longitude columns coincide so the texture wraps without a gap.
pub struct SphereMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    radius: f32,
    num_lats: usize,
    num_lngs: usize,
}

impl SphereMesh {
    /// Allocate buffers and fill in the undistorted sphere
    pub fn new(params: &SphereParams) -> Self {
        let num_lats = params.num_lats();
        let num_lngs = params.num_lngs();

        let mut mesh = Self {
            vertices: vec![Vertex::zeroed(); num_lats * num_lngs],
            indices: grid_indices(num_lats, num_lngs),
            radius: params.radius,
            num_lats,
            num_lngs,
        };
        mesh.rebuild(None, params.bounce_multiplier as f32, TexCoords::Plain);
        mesh
    }

    pub fn num_lats(&self) -> usize {
        self.num_lats
    }

    pub fn num_lngs(&self) -> usize {
        self.num_lngs
    }

    /// Radius of vertex row `ilat`, column `ilng` for this frame's spectrum
    ///
    /// The upper hemisphere follows channel 0 by longitude. The lower hemisphere follows
    /// channel 1 half a turn around, so the two halves pulse independently. Within a
    /// hemisphere the bulge is `(cos(lat') + 1) * multiplier * magnitude` where `lat'` is
    /// the row index stretched over `[-pi, pi]`, which vanishes at the equator.
    pub fn vertex_radius(
        &self,
        ilat: usize,
        ilng: usize,
        spectrum: Option<&Spectrum>,
        bounce_multiplier: f32,
    ) -> f32 {
        let Some(spectrum) = spectrum else {
            return self.radius;
        };

        let equator = self.num_lats / 2;
        let (channel, index, hemisphere) = if ilat > equator {
            (0, ilng as isize, (equator, self.num_lats))
        } else {
            let offset = ilng + self.num_lngs / 2;
            (1, offset as isize, (0, equator))
        };

        let lat = rerange(
            ilat as f32,
            hemisphere.0 as f32,
            hemisphere.1 as f32,
            -PI,
            PI,
        );
        let magnitude = spectrum.sample(channel, index);

        self.radius + (lat.cos() + 1.0) * bounce_multiplier * magnitude
    }

    /// Regenerate every vertex; `None` yields the plain sphere of base radius
    pub fn rebuild(&mut self, spectrum: Option<&Spectrum>, bounce_multiplier: f32, tex: TexCoords) {
        let lats = self.num_lats;
        let lngs = self.num_lngs;

        for ilat in 0..lats {
            let lat = -PI / 2.0 + PI * ilat as f32 / (lats - 1) as f32;
            let xz = lat.cos();
            let y = lat.sin();

            for ilng in 0..lngs {
                let lng = -PI + 2.0 * PI * ilng as f32 / (lngs - 1) as f32;
                let x = xz * lng.cos();
                let z = -xz * lng.sin();

                let radius = self.vertex_radius(ilat, ilng, spectrum, bounce_multiplier);

                let s = (lng + PI) / (2.0 * PI);
                let t = match tex {
                    TexCoords::Plain => (lat + PI / 2.0) / PI,
                    TexCoords::Rippled { time_cycle } => {
                        let ripple = (2.0 * PI * (time_cycle + ilng as f32 / lngs as f32)).sin();
                        (lat + ripple + PI / 2.0) / PI
                    }
                };

                self.vertices[ilat * lngs + ilng] = Vertex {
                    position: [radius * x, radius * y, radius * z],
                    normal: [x, y, z],
                    uv: [s, t],
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::upsample;

    fn params() -> SphereParams {
        SphereParams {
            radius: 1.0,
            slices: 100,
            stacks: 50,
            bounce_multiplier: 8,
        }
    }

    fn length(v: &Vertex) -> f32 {
        v.position.iter().map(|c| c * c).sum::<f32>().sqrt()
    }

    #[test]
    fn test_buffers_sized_for_grid() {
        let mesh = SphereMesh::new(&params());

        assert_eq!(mesh.vertices.len(), 50 * 100);
        assert_eq!(mesh.indices.len(), 49 * 99 * 6);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn test_tiny_sphere_clamped_to_three() {
        let mesh = SphereMesh::new(&SphereParams {
            slices: 1,
            stacks: 0,
            ..params()
        });

        assert_eq!(mesh.num_lats(), 3);
        assert_eq!(mesh.num_lngs(), 3);
        assert_eq!(mesh.vertices.len(), 9);
    }

    #[test]
    fn test_no_spectrum_gives_plain_sphere() {
        let mut mesh = SphereMesh::new(&params());
        mesh.rebuild(None, 8.0, TexCoords::Plain);

        let lats = mesh.num_lats();
        let lngs = mesh.num_lngs();
        for ilat in 0..lats {
            let lat = -PI / 2.0 + PI * ilat as f32 / (lats - 1) as f32;
            for ilng in 0..lngs {
                let lng = -PI + 2.0 * PI * ilng as f32 / (lngs - 1) as f32;
                let v = &mesh.vertices[ilat * lngs + ilng];

                assert!((length(v) - 1.0).abs() < 1e-5);
                assert!((v.uv[0] - (lng + PI) / (2.0 * PI)).abs() < 1e-6);
                assert!((v.uv[1] - (lat + PI / 2.0) / PI).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_upper_hemisphere_bulges_with_first_channel() {
        let mut mesh = SphereMesh::new(&params());
        let loud = vec![0.01; 1024];
        let quiet = vec![0.0; 1024];
        let spectrum = upsample([&loud, &quiet], 100).unwrap();

        mesh.rebuild(Some(&spectrum), 8.0, TexCoords::Plain);

        let lngs = mesh.num_lngs();
        // Row 37 sits half way up the upper hemisphere [25, 50]
        let lat = rerange(37.0, 25.0, 50.0, -PI, PI);
        let expected = 1.0 + (lat.cos() + 1.0) * 8.0 * 0.01;
        assert!((length(&mesh.vertices[37 * lngs + 10]) - expected).abs() < 1e-5);
        assert!(expected > 1.1);

        // Lower hemisphere follows the silent channel
        for ilat in 0..=25 {
            assert!((length(&mesh.vertices[ilat * lngs + 10]) - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_lower_hemisphere_reads_half_a_turn_around() {
        let mesh = SphereMesh::new(&params());
        let quiet = vec![0.0; 1024];
        let mut ramp = vec![0.0; 1024];
        for (i, v) in ramp.iter_mut().enumerate() {
            *v = i as f32 * 0.001;
        }
        let spectrum = upsample([&quiet, &ramp], 100).unwrap();

        let lat = rerange(12.0, 0.0, 25.0, -PI, PI);
        for ilng in [0, 30, 49, 50, 75, 99] {
            let magnitude = spectrum.sample(1, (ilng + 50) as isize);
            let expected = 1.0 + (lat.cos() + 1.0) * 4.0 * magnitude;
            let radius = mesh.vertex_radius(12, ilng, Some(&spectrum), 4.0);
            assert!((radius - expected).abs() < 1e-6, "lng {}", ilng);
        }
    }

    #[test]
    fn test_equator_never_bulges() {
        let mesh = SphereMesh::new(&params());
        let loud = vec![1.0; 1024];
        let spectrum = upsample([&loud, &loud], 100).unwrap();

        for ilng in 0..mesh.num_lngs() {
            let radius = mesh.vertex_radius(25, ilng, Some(&spectrum), 8.0);
            assert!((radius - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_rippled_texture_moves_only_t() {
        let mut plain = SphereMesh::new(&params());
        let mut rippled = SphereMesh::new(&params());
        plain.rebuild(None, 8.0, TexCoords::Plain);
        rippled.rebuild(None, 8.0, TexCoords::Rippled { time_cycle: 0.25 });

        let mut moved = 0;
        for (a, b) in plain.vertices.iter().zip(&rippled.vertices) {
            assert_eq!(a.uv[0], b.uv[0]);
            assert_eq!(a.position, b.position);
            if (a.uv[1] - b.uv[1]).abs() > 1e-3 {
                moved += 1;
            }
        }
        assert!(moved > 0);

        // Column 0 at a quarter cycle: sin(pi/2) = 1 shifts t by 1/pi
        let shift = rippled.vertices[0].uv[1] - plain.vertices[0].uv[1];
        assert!((shift - 1.0 / PI).abs() < 1e-5);
    }
}
