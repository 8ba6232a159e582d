//! Pure geometry: path representation, outline generators and hit tests.
//!
//! Nothing here holds state, so every function is reentrant.

pub mod hit;
pub mod outline;
pub mod path;

pub use outline::{ArrowKind, TriangleOrientation};
pub use path::{PathData, Segment};
