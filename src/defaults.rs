//! Default sizes and settings (screen pixels)

pub const WIDTH: f64 = 100.0;
pub const HEIGHT: f64 = 100.0;
pub const MIN_SIZE: f64 = 10.0;
pub const MAX_SIZE: f64 = 10_000.0;

pub const FILL: &str = "#ffffff";
pub const STROKE: &str = "#000000";
pub const STROKE_WIDTH: f64 = 2.0;
pub const OPACITY: f64 = 1.0;

pub const FONT_FAMILY: &str = "sans-serif";
pub const FONT_SIZE: f64 = 14.0;
pub const FONT_WEIGHT: &str = "normal";
pub const TEXT_COLOR: &str = "#000000";

/// Allowed drift between width/height and a locked aspect ratio
pub const ASPECT_TOLERANCE: f64 = 1e-2;
pub const GRID_SIZE: f64 = 10.0;

/// Pointer distance within which a port is considered hit
pub const PORT_SNAP_DISTANCE: f64 = 10.0;
pub const HANDLE_HIT_TOLERANCE: f64 = 8.0;
pub const PORT_MARKER_RADIUS: f64 = 4.0;
pub const HANDLE_MARKER_SIZE: f64 = 8.0;

/// Bezier control arm length as a fraction of source-target distance
pub const BEZIER_CONTROL_RATIO: f64 = 0.3;

pub const ARROW_HEAD_LENGTH: f64 = 12.0;
pub const ARROW_HEAD_WIDTH: f64 = 8.0;

// Kind-specific outline parameters
pub const CORNER_RADIUS: f64 = 10.0;
pub const POLYGON_SIDES: u32 = 6;
pub const STAR_POINTS: u32 = 5;
pub const STAR_INNER_RATIO: f64 = 0.5;
pub const SKEW: f64 = 0.2;
pub const WAVE_HEIGHT_RATIO: f64 = 0.1;
pub const CYLINDER_ELLIPSE_RATIO: f64 = 0.15;
pub const CLOUD_LOBES: u32 = 8;

/// Upper bound on polygon sides, star points and cloud lobes
pub const MAX_VERTEX_COUNT: u32 = 256;
