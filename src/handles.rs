//! Resize handles and the resize constraint solver.
//!
//! [`resize`] turns a pointer delta on one of the eight canonical handles
//! into new bounds, honoring aspect-ratio locks, size constraints and grid
//! snapping. Unknown handle ids resolve to `None`, which callers treat as a
//! no-op.

use std::fmt;
use std::str::FromStr;

use crate::config::Constraints;
use crate::types::Rect;

/// One of the eight resize anchors around a shape's bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleId {
    Nw,
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
}

impl HandleId {
    /// Clockwise from the top-left corner
    pub const ALL: [HandleId; 8] = [
        HandleId::Nw,
        HandleId::N,
        HandleId::Ne,
        HandleId::E,
        HandleId::Se,
        HandleId::S,
        HandleId::Sw,
        HandleId::W,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HandleId::Nw => "nw",
            HandleId::N => "n",
            HandleId::Ne => "ne",
            HandleId::E => "e",
            HandleId::Se => "se",
            HandleId::S => "s",
            HandleId::Sw => "sw",
            HandleId::W => "w",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        HandleId::ALL.into_iter().find(|h| h.as_str() == s)
    }

    /// Drag direction `(x_dir, y_dir)`, each in `{-1, 0, 1}`
    pub fn direction(self) -> (i8, i8) {
        match self {
            HandleId::Nw => (-1, -1),
            HandleId::N => (0, -1),
            HandleId::Ne => (1, -1),
            HandleId::E => (1, 0),
            HandleId::Se => (1, 1),
            HandleId::S => (0, 1),
            HandleId::Sw => (-1, 1),
            HandleId::W => (-1, 0),
        }
    }

    /// The handle diagonally or directly across the bounds
    pub fn opposite(self) -> HandleId {
        match self {
            HandleId::Nw => HandleId::Se,
            HandleId::N => HandleId::S,
            HandleId::Ne => HandleId::Sw,
            HandleId::E => HandleId::W,
            HandleId::Se => HandleId::Nw,
            HandleId::S => HandleId::N,
            HandleId::Sw => HandleId::Ne,
            HandleId::W => HandleId::E,
        }
    }

    pub fn is_corner(self) -> bool {
        let (x, y) = self.direction();
        x != 0 && y != 0
    }

    pub fn is_side(self) -> bool {
        !self.is_corner()
    }

    /// CSS cursor name for hovering this handle
    pub fn cursor(self) -> &'static str {
        match self {
            HandleId::Nw | HandleId::Se => "nwse-resize",
            HandleId::Ne | HandleId::Sw => "nesw-resize",
            HandleId::N | HandleId::S => "ns-resize",
            HandleId::E | HandleId::W => "ew-resize",
        }
    }

    /// Position of this handle on `r` (unit-square coordinate of the anchor)
    pub fn relative_position(self) -> (f64, f64) {
        let (x, y) = self.direction();
        ((f64::from(x) + 1.0) / 2.0, (f64::from(y) + 1.0) / 2.0)
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for strings that are not one of the eight canonical ids
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown handle id: {0}")]
pub struct UnknownHandle(pub String);

impl FromStr for HandleId {
    type Err = UnknownHandle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HandleId::parse(s).ok_or_else(|| UnknownHandle(s.to_string()))
    }
}

/// Knobs for a single resize step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeOptions {
    /// Lock the pre-resize width/height ratio when no explicit ratio constraint exists
    pub maintain_aspect_ratio: bool,
    pub snap_to_grid: bool,
    pub grid_size: f64,
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self {
            maintain_aspect_ratio: false,
            snap_to_grid: false,
            grid_size: crate::defaults::GRID_SIZE,
        }
    }
}

/// Resize `bounds` by dragging `handle` by `(dx, dy)`.
///
/// Returns `None` when `handle` is not a canonical handle id.
///
/// When a ratio is active the axis with the larger absolute size change wins;
/// on a tie width is authoritative. The recomputed axis only moves its
/// leading edge when the grabbed handle drags that edge (negative direction).
/// Clamping recenters by half the clamped delta, and grid snapping runs last,
/// so a snapped size may sit up to one grid unit outside the constraints.
pub fn resize(
    bounds: Rect,
    handle: &str,
    dx: f64,
    dy: f64,
    constraints: &Constraints,
    options: &ResizeOptions,
) -> Option<Rect> {
    let handle = HandleId::parse(handle)?;
    Some(resize_with(bounds, handle, dx, dy, constraints, options))
}

/// [`resize`] for an already-parsed handle
pub fn resize_with(
    bounds: Rect,
    handle: HandleId,
    dx: f64,
    dy: f64,
    constraints: &Constraints,
    options: &ResizeOptions,
) -> Rect {
    let (x_dir, y_dir) = handle.direction();
    let mut r = bounds;

    if x_dir < 0 {
        r.x += dx;
        r.width -= dx;
    } else if x_dir > 0 {
        r.width += dx;
    }
    if y_dir < 0 {
        r.y += dy;
        r.height -= dy;
    } else if y_dir > 0 {
        r.height += dy;
    }

    let ratio = constraints.ratio().or_else(|| {
        (options.maintain_aspect_ratio && bounds.height > 0.0).then(|| bounds.width / bounds.height)
    });
    if let Some(ratio) = ratio {
        let dw = (r.width - bounds.width).abs();
        let dh = (r.height - bounds.height).abs();
        if dw >= dh {
            let height = r.width / ratio;
            if y_dir < 0 {
                r.y = bounds.y + bounds.height - height;
            }
            r.height = height;
        } else {
            let width = r.height * ratio;
            if x_dir < 0 {
                r.x = bounds.x + bounds.width - width;
            }
            r.width = width;
        }
    }

    let width = constraints.clamp_width(r.width);
    if width != r.width {
        r.x += (r.width - width) / 2.0;
        r.width = width;
    }
    let height = constraints.clamp_height(r.height);
    if height != r.height {
        r.y += (r.height - height) / 2.0;
        r.height = height;
    }

    if options.snap_to_grid {
        r = snap_to_grid(r, options.grid_size);
    }
    r
}

/// Round each of x, y, width and height to the nearest multiple of `grid`.
/// A non-positive grid leaves the rectangle untouched.
pub fn snap_to_grid(r: Rect, grid: f64) -> Rect {
    if grid <= 0.0 || !grid.is_finite() {
        return r;
    }
    let snap = |v: f64| (v / grid).round() * grid;
    Rect::new(snap(r.x), snap(r.y), snap(r.width), snap(r.height))
}
