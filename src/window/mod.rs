pub mod layer;
pub mod stack;

pub use layer::{ShowOutcome, WindowLayer};
pub use stack::{Advance, NavigationEntry, WindowStack};
