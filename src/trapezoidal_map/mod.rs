mod dag;
mod stats;
mod trap_map;
mod trapezoid;

pub use dag::{Node, NodeId, NodeKind};
pub use stats::Stats;
pub use trap_map::{BuildConfig, BuildState, Location, TrapezoidalMap, POLYGON_FACE};
pub use trapezoid::Trapezoid;
