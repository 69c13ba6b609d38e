//! Vector icon renderer.
//!
//! Icons are authored on a 24×24 canvas with the y axis pointing down and
//! are drawn by saving the graphics state, mapping the canvas onto the
//! target box with one transformation matrix, stroking the icon's fixed
//! path sequence and restoring the state.

use printpdf::{Color, CurTransMat, Line, LinePoint, Op, Point, Pt, Rgb};
use serde::{Deserialize, Serialize};

use crate::layout_config::IconElement;

/// Side length of the canvas icons are authored on.
pub const ICON_CANVAS: f32 = 24.0;

/// Bezier constant for approximating a quarter circle.
const KAPPA: f32 = 0.552_284_8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconKind {
    IdCard,
    Pin,
    Map,
    Chevron,
}

/// One path-construction command in y-down coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCmd {
    MoveTo(f32, f32),
    LineTo(f32, f32),
    /// Control point 1, control point 2, end point.
    CubicTo(f32, f32, f32, f32, f32, f32),
    Close,
}

use PathCmd::{Close, CubicTo, LineTo, MoveTo};

/// Subpaths of an icon on the 24×24 canvas, in drawing order.
pub fn icon_paths(kind: IconKind) -> Vec<Vec<PathCmd>> {
    match kind {
        IconKind::IdCard => vec![
            rounded_rect(2.0, 5.0, 20.0, 14.0, 2.0),
            circle(9.0, 11.0, 2.0),
            vec![MoveTo(6.17, 15.0), CubicTo(6.6, 13.2, 11.4, 13.2, 11.83, 15.0)],
            vec![MoveTo(16.0, 10.0), LineTo(18.0, 10.0)],
            vec![MoveTo(16.0, 14.0), LineTo(18.0, 14.0)],
        ],
        IconKind::Pin => vec![
            vec![
                MoveTo(12.0, 22.0),
                CubicTo(12.0, 22.0, 4.0, 15.0, 4.0, 10.0),
                CubicTo(4.0, 5.58, 7.58, 2.0, 12.0, 2.0),
                CubicTo(16.42, 2.0, 20.0, 5.58, 20.0, 10.0),
                CubicTo(20.0, 15.0, 12.0, 22.0, 12.0, 22.0),
                Close,
            ],
            circle(12.0, 10.0, 3.0),
        ],
        IconKind::Map => vec![
            vec![
                MoveTo(3.0, 6.0),
                LineTo(9.0, 3.0),
                LineTo(15.0, 6.0),
                LineTo(21.0, 3.0),
                LineTo(21.0, 18.0),
                LineTo(15.0, 21.0),
                LineTo(9.0, 18.0),
                LineTo(3.0, 21.0),
                Close,
            ],
            vec![MoveTo(9.0, 3.0), LineTo(9.0, 18.0)],
            vec![MoveTo(15.0, 6.0), LineTo(15.0, 21.0)],
        ],
        IconKind::Chevron => vec![vec![MoveTo(9.0, 18.0), LineTo(15.0, 12.0), LineTo(9.0, 6.0)]],
    }
}

/// Closed circle made of four cubic quarter arcs.
pub fn circle(cx: f32, cy: f32, r: f32) -> Vec<PathCmd> {
    let k = r * KAPPA;
    vec![
        MoveTo(cx + r, cy),
        CubicTo(cx + r, cy + k, cx + k, cy + r, cx, cy + r),
        CubicTo(cx - k, cy + r, cx - r, cy + k, cx - r, cy),
        CubicTo(cx - r, cy - k, cx - k, cy - r, cx, cy - r),
        CubicTo(cx + k, cy - r, cx + r, cy - k, cx + r, cy),
        Close,
    ]
}

/// Closed rectangle with quarter-circle corners; `r` is clamped to half
/// the shorter side.
pub fn rounded_rect(x: f32, y: f32, w: f32, h: f32, r: f32) -> Vec<PathCmd> {
    let r = r.min(w / 2.0).min(h / 2.0).max(0.0);
    let k = r * KAPPA;
    let (right, bottom) = (x + w, y + h);
    vec![
        MoveTo(x + r, y),
        LineTo(right - r, y),
        CubicTo(right - r + k, y, right, y + r - k, right, y + r),
        LineTo(right, bottom - r),
        CubicTo(right, bottom - r + k, right - r + k, bottom, right - r, bottom),
        LineTo(x + r, bottom),
        CubicTo(x + r - k, bottom, x, bottom - r + k, x, bottom - r),
        LineTo(x, y + r),
        CubicTo(x, y + r - k, x + r - k, y, x + r, y),
        Close,
    ]
}

/// Convert one subpath into a printpdf line, mapping every coordinate
/// through `map`.
///
/// The first control point of each curve carries the bezier flag; printpdf
/// consumes it together with the two points that follow.
pub fn path_to_line(cmds: &[PathCmd], map: impl Fn(f32, f32) -> (f32, f32)) -> Line {
    let point = |x: f32, y: f32, bezier: bool| {
        let (px, py) = map(x, y);
        LinePoint {
            p: Point { x: Pt(px), y: Pt(py) },
            bezier,
        }
    };
    let mut points = Vec::with_capacity(cmds.len() * 3);
    let mut is_closed = false;
    for cmd in cmds {
        match *cmd {
            MoveTo(x, y) | LineTo(x, y) => points.push(point(x, y, false)),
            CubicTo(x1, y1, x2, y2, x, y) => {
                points.push(point(x1, y1, true));
                points.push(point(x2, y2, true));
                points.push(point(x, y, false));
            }
            Close => is_closed = true,
        }
    }
    Line { points, is_closed }
}

/// Scoped graphics-state save: pushes `q` on creation and the matching `Q`
/// when dropped, so a draw can never leak its transform to siblings.
pub struct SavedGraphicsState<'a> {
    ops: &'a mut Vec<Op>,
}

impl<'a> SavedGraphicsState<'a> {
    pub fn save(ops: &'a mut Vec<Op>) -> Self {
        ops.push(Op::SaveGraphicsState);
        Self { ops }
    }

    pub fn push(&mut self, op: Op) {
        self.ops.push(op);
    }
}

impl Drop for SavedGraphicsState<'_> {
    fn drop(&mut self) {
        self.ops.push(Op::RestoreGraphicsState);
    }
}

/// Draw `icon` into `ops` and return the occupied `(width, height)`.
///
/// `page_height` flips the layout's top-left origin into PDF space; the
/// negative y scale keeps the canvas y-down.
pub fn draw_icon(ops: &mut Vec<Op>, page_height: f32, icon: &IconElement) -> (f32, f32) {
    let scale = icon.size / ICON_CANVAS;
    let [r, g, b] = icon.color;

    let mut state = SavedGraphicsState::save(ops);
    state.push(Op::SetTransformationMatrix {
        matrix: CurTransMat::Raw([scale, 0.0, 0.0, -scale, icon.x, page_height - icon.y]),
    });
    state.push(Op::SetOutlineColor {
        col: Color::Rgb(Rgb {
            r,
            g,
            b,
            icc_profile: None,
        }),
    });
    // Line width is in canvas units and scales with the icon.
    state.push(Op::SetOutlineThickness {
        pt: Pt(icon.stroke_width),
    });
    for subpath in icon_paths(icon.kind) {
        state.push(Op::DrawLine {
            line: path_to_line(&subpath, |x, y| (x, y)),
        });
    }

    (icon.size, icon.size)
}
