//! The behavior contract every shape kind implements.

use std::fmt;
use std::sync::Arc;

use enum_dispatch::enum_dispatch;

use super::drawable::{Drawable, RenderContext};
use super::Shape;
use crate::geometry::{PathData, hit};
use crate::types::Point;
use crate::validator::ValidationReport;

/// Shared handle to a kind's behavior, as stored in definitions and instances
pub type BehaviorRef = Arc<dyn ShapeBehavior>;

/// Kind-specific operations.
///
/// Every method receives the instance it acts on; geometry is always taken
/// from the instance's unrotated bounds; rotation is applied by the caller.
#[enum_dispatch]
pub trait ShapeBehavior: Send + Sync + fmt::Debug {
    /// Type id this behavior was written for
    fn kind(&self) -> &str;

    /// Boundary outline in the unrotated frame
    fn path(&self, shape: &Shape) -> PathData;

    /// Hit test in the unrotated frame; the default is the bounding box
    fn contains_point(&self, shape: &Shape, p: Point) -> bool {
        hit::in_rect(shape.rect(), p)
    }

    /// Backend-agnostic drawing description
    fn render(&self, shape: &Shape, ctx: &RenderContext) -> Drawable {
        Drawable::for_shape(shape, self.path(shape), ctx)
    }

    /// Kind-specific instance checks, merged into [`Shape::validate`]
    fn validate(&self, _shape: &Shape) -> ValidationReport {
        ValidationReport::ok()
    }
}
