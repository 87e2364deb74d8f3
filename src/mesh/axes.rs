use super::ColorVertex;

/// Line list for the X, Y and Z axes from the origin, plus a stroked letter at each tip
pub fn axes(length: f32, color: [f32; 3]) -> Vec<ColorVertex> {
    let [r, g, b] = color;
    let vertex = |x: f32, y: f32, z: f32| ColorVertex {
        position: [x, y, z],
        color: [r, g, b, 1.0],
    };

    let tip = length * 1.1;
    let half = length * 0.05;

    let segments = [
        // Axes
        ([0.0, 0.0, 0.0], [length, 0.0, 0.0]),
        ([0.0, 0.0, 0.0], [0.0, length, 0.0]),
        ([0.0, 0.0, 0.0], [0.0, 0.0, length]),
        // X
        ([tip - half, -half, 0.0], [tip + half, half, 0.0]),
        ([tip - half, half, 0.0], [tip + half, -half, 0.0]),
        // Y
        ([-half, tip + half, 0.0], [0.0, tip, 0.0]),
        ([half, tip + half, 0.0], [0.0, tip, 0.0]),
        ([0.0, tip, 0.0], [0.0, tip - half, 0.0]),
        // Z
        ([0.0, half, tip - half], [0.0, half, tip + half]),
        ([0.0, half, tip + half], [0.0, -half, tip - half]),
        ([0.0, -half, tip - half], [0.0, -half, tip + half]),
    ];

    segments
        .iter()
        .flat_map(|([ax, ay, az], [bx, by, bz])| [vertex(*ax, *ay, *az), vertex(*bx, *by, *bz)])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axes_are_line_pairs_of_given_length() {
        let lines = axes(1.5, [1.0, 0.0, 0.0]);

        assert_eq!(lines.len() % 2, 0);
        assert_eq!(lines[1].position, [1.5, 0.0, 0.0]);
        assert_eq!(lines[3].position, [0.0, 1.5, 0.0]);
        assert_eq!(lines[5].position, [0.0, 0.0, 1.5]);
        assert!(lines.iter().all(|v| v.color == [1.0, 0.0, 0.0, 1.0]));
    }
}
