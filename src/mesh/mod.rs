//! Procedural geometry regenerated every frame from the current spectrum.

mod axes;
mod sphere;
mod stage;

use bytemuck::{Pod, Zeroable};

// Re-export public types
pub use axes::axes;
pub use sphere::{SphereMesh, TexCoords};
pub use stage::StageMesh;

/// Lit, textured mesh vertex (sphere and stage)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Unlit coloured vertex (axes lines, particle points)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// Linearly map `value` from `[old_min, old_max]` onto `[new_min, new_max]`
pub fn rerange(value: f32, old_min: f32, old_max: f32, new_min: f32, new_max: f32) -> f32 {
    (value - old_min) * (new_max - new_min) / (old_max - old_min) + new_min
}

/// Quad-grid triangle indices for a `rows x cols` vertex grid stored row-major
fn grid_indices(rows: usize, cols: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity(rows.saturating_sub(1) * cols.saturating_sub(1) * 6);

    for row in 0..rows.saturating_sub(1) {
        for col in 0..cols.saturating_sub(1) {
            let top_left = (row * cols + col) as u32;
            let top_right = top_left + 1;
            let bottom_left = ((row + 1) * cols + col) as u32;
            let bottom_right = bottom_left + 1;

            indices.extend_from_slice(&[
                top_left,
                bottom_left,
                top_right,
                top_right,
                bottom_left,
                bottom_right,
            ]);
        }
    }

    indices
}
