// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::point::Point2D;

/// Builds a square loop of side length `side` meters with `points_per_side`
/// evenly spaced points on each edge, starting at the origin and running
/// counter-clockwise. The closing edge back to the origin is implicit, as
/// for every track outline.
pub fn square_outline(side: f64, points_per_side: usize) -> Vec<Point2D> {
    let step = side / points_per_side as f64;
    let mut outline = Vec::with_capacity(points_per_side * 4);
    for i in 0..points_per_side {
        outline.push(Point2D {
            x: i as f64 * step,
            y: 0.0,
        });
    }
    for i in 0..points_per_side {
        outline.push(Point2D {
            x: side,
            y: i as f64 * step,
        });
    }
    for i in 0..points_per_side {
        outline.push(Point2D {
            x: side - i as f64 * step,
            y: side,
        });
    }
    for i in 0..points_per_side {
        outline.push(Point2D {
            x: 0.0,
            y: side - i as f64 * step,
        });
    }
    outline
}
