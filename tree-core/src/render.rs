//! Software rasterizer for [`TreeStructure`]s.
//!
//! Branches are drawn first, in arena order, then leaf clusters in list
//! order, so foliage always covers wood. Every primitive clips silently
//! to the buffer; nothing here can fail.

use crate::buffer::RgbaBuffer;
use crate::color::blend_over;
use crate::structure::{LeafCluster, TreeStructure};
use glam::Vec2;
use log::debug;

/// Renders `tree` into a fresh, fully transparent buffer sized to the
/// tree's canvas parameters.
pub fn render(tree: &TreeStructure) -> RgbaBuffer {
    let params = &tree.parameters;
    let mut buffer = RgbaBuffer::new(
        params.canvas_width.get() as usize,
        params.canvas_height.get() as usize,
    );

    for branch in &tree.branches {
        draw_thick_line(
            &mut buffer,
            branch.start,
            branch.end,
            branch.thickness,
            branch.color.to_packed(),
        );
    }

    for cluster in &tree.leaf_clusters {
        draw_leaf_cluster(&mut buffer, cluster);
    }

    debug!(
        "render: {} branches, {} clusters into {}x{}",
        tree.branches.len(),
        tree.leaf_clusters.len(),
        buffer.width(),
        buffer.height()
    );
    buffer
}

/// Writes one pixel, skipping it if it falls outside the buffer.
///
/// Onto a fully transparent pixel the color is stored as is; onto anything
/// else it is composited with [`blend_over`].
#[inline]
pub fn plot(buffer: &mut RgbaBuffer, x: i32, y: i32, color: u32) {
    if !buffer.contains(x, y) {
        return;
    }
    let (x, y) = (x as usize, y as usize);

    // SAFETY: `contains` checked both coordinates above.
    unsafe {
        let background = buffer.get_unchecked(x, y);
        let out = if background & 0xFF == 0 {
            color
        } else {
            blend_over(background, color)
        };
        buffer.set_unchecked(x, y, out);
    }
}

/// Integer line from `(x0, y0)` to `(x1, y1)`, both endpoints included.
///
/// Uses a symmetric error term, so every pixel of the segment is visited
/// exactly once.
pub fn draw_line(buffer: &mut RgbaBuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx - dy;
    let (mut x, mut y) = (x0, y0);

    loop {
        plot(buffer, x, y, color);
        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
}

/// Approximates a line of the given thickness with parallel 1-pixel lines.
///
/// With `h = ceil(thickness / 2)`, the core line is repeated at every
/// offset in `-h..=h`, once shifted along x only and once along y only.
/// Endpoints are rounded to the nearest pixel.
pub fn draw_thick_line(buffer: &mut RgbaBuffer, start: Vec2, end: Vec2, thickness: f32, color: u32) {
    let (x0, y0) = (start.x.round() as i32, start.y.round() as i32);
    let (x1, y1) = (end.x.round() as i32, end.y.round() as i32);
    let half = (thickness * 0.5).ceil() as i32;

    for offset in -half..=half {
        draw_line(buffer, x0 + offset, y0, x1 + offset, y1, color);
        draw_line(buffer, x0, y0 + offset, x1, y1 + offset, color);
    }
}

/// Fills every pixel whose offset `(dx, dy)` from `center` satisfies
/// `dx² + dy² <= radius²`.
pub fn fill_disk(buffer: &mut RgbaBuffer, center_x: i32, center_y: i32, radius: i32, color: u32) {
    let r2 = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= r2 {
                plot(buffer, center_x + dx, center_y + dy, color);
            }
        }
    }
}

/// Draws a cluster as a filled disk of radius `ceil(size)`, then any
/// scattered leaves as single pixels on top.
///
/// The cluster shape only matters through the scattered leaves; the disk
/// is the same for every shape.
pub fn draw_leaf_cluster(buffer: &mut RgbaBuffer, cluster: &LeafCluster) {
    let cx = cluster.position.x.round() as i32;
    let cy = cluster.position.y.round() as i32;
    let color = cluster.color.to_packed();

    fill_disk(buffer, cx, cy, cluster.size.ceil() as i32, color);

    for p in cluster.leaf_points() {
        plot(buffer, p.x.round() as i32, p.y.round() as i32, color);
    }
}
