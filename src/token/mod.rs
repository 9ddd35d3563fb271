//! Token budgeting core: model registry, token counting, budget
//! calculation, and diff truncation.

pub mod budget;
pub mod counter;
pub mod registry;
pub mod truncate;

pub use budget::TokenBudget;
pub use counter::TokenCounter;
pub use registry::{model_registry, ModelSpec};
pub use truncate::{DiffUnit, TruncationKind, TruncationResult};
