pub mod candidate;
pub mod evaluate;
pub mod expression;
pub mod status;
pub mod tokenize;

pub use candidate::{RankedTask, SearchMode, TaskCandidate};
pub use expression::{BooleanOperator, Condition, Expression};
pub use status::CanonicalStatus;
