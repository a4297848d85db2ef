mod cycle;
mod issue;
mod window;

pub use cycle::{Cycle, CycleIssue};
pub use issue::Issue;
pub use window::SprintWindow;
