//! SVG shape builders for dots, corner squares and corner dots.
//!
//! Each builder returns a single SVG element positioned in pixel space.
//! Neighbour-aware dot styles pick one of a handful of base figures and
//! rotate it about the module centre.

use std::fmt::Write;

use super::matrix::Neighbors;
use crate::options::{CornerDotType, CornerSquareType, DotType};

// ============================================================================
// Base Figures
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Figure {
    Circle,
    Square,
    /// Square with one side rounded into a half circle.
    SideRounded,
    /// Square with one corner rounded with radius `size / 2`.
    CornerRounded,
    /// Square with one corner rounded with radius `size`.
    CornerExtraRounded,
    /// Square with two opposite corners rounded.
    CornersRounded,
}

fn figure(x: f64, y: f64, size: f64, shape: Figure, rotation: i32) -> String {
    let half = size / 2.0;
    let mut element = match shape {
        Figure::Circle => {
            return format!(
                r#"<circle cx="{}" cy="{}" r="{half}"/>"#,
                x + half,
                y + half
            );
        }
        Figure::Square => {
            return format!(r#"<rect x="{x}" y="{y}" width="{size}" height="{size}"/>"#);
        }
        Figure::SideRounded => format!(
            r#"<path d="M {x} {y} v {size} h {half} a {half} {half} 0 0 0 0 {}""#,
            -size
        ),
        Figure::CornerRounded => format!(
            r#"<path d="M {x} {y} v {size} h {size} v {} a {half} {half} 0 0 0 {} {}""#,
            -half, -half, -size
        ),
        Figure::CornerExtraRounded => format!(
            r#"<path d="M {x} {y} v {size} h {size} a {size} {size} 0 0 0 {} {}""#,
            -size, -size
        ),
        Figure::CornersRounded => format!(
            "<path d=\"M {x} {y} v {half} a {half} {half} 0 0 0 {half} {half} \
             h {half} v {} a {half} {half} 0 0 0 {} {}\"",
            -half,
            -half,
            -half
        ),
    };

    if rotation != 0 {
        let _ = write!(
            element,
            r#" transform="rotate({rotation} {} {})""#,
            x + half,
            y + half
        );
    }
    element.push_str("/>");
    element
}

// ============================================================================
// Dots
// ============================================================================

/// Builds one data module of the given style.
pub fn dot(kind: DotType, x: f64, y: f64, size: f64, neighbors: Neighbors) -> String {
    match kind {
        DotType::Square => figure(x, y, size, Figure::Square, 0),
        DotType::Dots => figure(x, y, size, Figure::Circle, 0),
        DotType::Rounded => rounded(x, y, size, neighbors, Figure::CornerRounded),
        DotType::ExtraRounded => rounded(x, y, size, neighbors, Figure::CornerExtraRounded),
        DotType::Classy => classy(x, y, size, neighbors, Figure::CornerRounded),
        DotType::ClassyRounded => classy(x, y, size, neighbors, Figure::CornerExtraRounded),
    }
}

fn rounded(x: f64, y: f64, size: f64, n: Neighbors, corner: Figure) -> String {
    match n.count() {
        0 => figure(x, y, size, Figure::Circle, 0),
        c if c > 2 || (n.left && n.right) || (n.top && n.bottom) => {
            figure(x, y, size, Figure::Square, 0)
        }
        2 => {
            let rotation = if n.left && n.top {
                90
            } else if n.top && n.right {
                180
            } else if n.right && n.bottom {
                -90
            } else {
                0
            };
            figure(x, y, size, corner, rotation)
        }
        _ => {
            let rotation = if n.top {
                90
            } else if n.right {
                180
            } else if n.bottom {
                -90
            } else {
                0
            };
            figure(x, y, size, Figure::SideRounded, rotation)
        }
    }
}

fn classy(x: f64, y: f64, size: f64, n: Neighbors, corner: Figure) -> String {
    if n.count() == 0 {
        return figure(x, y, size, Figure::CornersRounded, 90);
    }
    if !n.left && !n.top {
        return figure(x, y, size, corner, -90);
    }
    if !n.right && !n.bottom {
        return figure(x, y, size, corner, 90);
    }
    figure(x, y, size, Figure::Square, 0)
}

// ============================================================================
// Corners
// ============================================================================

/// Builds the 7x7 ring of a finder pattern at `(x, y)`; `dot` is the module size.
pub fn corner_square(kind: CornerSquareType, x: f64, y: f64, dot: f64) -> String {
    let size = 7.0 * dot;
    let d = match kind {
        CornerSquareType::Square => {
            let inner = size - 2.0 * dot;
            format!(
                "M {x} {y} v {size} h {size} v {} z M {} {} h {inner} v {inner} h {} z",
                -size,
                x + dot,
                y + dot,
                -inner
            )
        }
        CornerSquareType::Dot => {
            let (cx, cy) = (x + size / 2.0, y + size / 2.0);
            let outer = size / 2.0;
            let inner = outer - dot;
            format!("{} {}", ring(cx, cy, outer), ring(cx, cy, inner))
        }
        CornerSquareType::ExtraRounded => {
            let (r1, r2) = (2.5 * dot, 1.5 * dot);
            let edge = 2.0 * dot;
            format!(
                "M {x} {} v {edge} a {r1} {r1} 0 0 0 {r1} {r1} h {edge} a {r1} {r1} 0 0 0 {r1} {} \
                 v {} a {r1} {r1} 0 0 0 {} {} h {} a {r1} {r1} 0 0 0 {} {r1} z \
                 M {} {} h {edge} a {r2} {r2} 0 0 1 {r2} {r2} v {edge} a {r2} {r2} 0 0 1 {} {r2} \
                 h {} a {r2} {r2} 0 0 1 {} {} v {} a {r2} {r2} 0 0 1 {r2} {} z",
                y + r1,
                -r1,
                -edge,
                -r1,
                -r1,
                -edge,
                -r1,
                x + r1,
                y + dot,
                -r2,
                -edge,
                -r2,
                -r2,
                -edge,
                -r2
            )
        }
    };
    format!(r#"<path fill-rule="evenodd" d="{d}"/>"#)
}

/// A full circle as two half arcs.
fn ring(cx: f64, cy: f64, r: f64) -> String {
    format!(
        "M {} {cy} a {r} {r} 0 1 0 {} 0 a {r} {r} 0 1 0 {} 0 z",
        cx - r,
        2.0 * r,
        -2.0 * r
    )
}

/// Builds the 3x3 centre of a finder pattern at `(x, y)`.
pub fn corner_dot(kind: CornerDotType, x: f64, y: f64, dot: f64) -> String {
    let size = 3.0 * dot;
    match kind {
        CornerDotType::Square => figure(x, y, size, Figure::Square, 0),
        CornerDotType::Dot => figure(x, y, size, Figure::Circle, 0),
    }
}
