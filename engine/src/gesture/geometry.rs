//! 2-D geometry helpers over normalized landmark coordinates.

/// Euclidean distance between two 2D points.
pub fn dist(a: [f32; 2], b: [f32; 2]) -> f32 {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    (dx * dx + dy * dy).sqrt()
}

/// Map a normalized point to pixel coordinates in a `width` x `height` frame.
pub fn to_px(p: [f32; 2], width: u32, height: u32) -> (i32, i32) {
    ((p[0] * width as f32) as i32, (p[1] * height as f32) as i32)
}

pub fn clamp01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Arithmetic mean of a point set.  Empty input yields the origin.
pub fn centroid(points: &[[f32; 2]]) -> [f32; 2] {
    if points.is_empty() {
        return [0.0, 0.0];
    }
    let n = points.len() as f32;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p[0], sy + p[1]));
    [sx / n, sy / n]
}
