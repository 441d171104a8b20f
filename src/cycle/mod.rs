/// Daily habit cycle
///
/// The evaluator decides whether a record's daily progress and streak have
/// to be cleared for a given day. The rest of this module applies those
/// decisions: to a single record, to the whole store once a day, or to
/// just the records the store reports as changed.

pub mod evaluator;
pub mod apply;
pub mod sweep;
pub mod reactor;

pub use evaluator::*;
pub use apply::*;
pub use sweep::*;
pub use reactor::*;
