mod analytics;
mod executions;
mod health;
mod tasks;

pub use analytics::*;
pub use executions::*;
pub use health::*;
pub use tasks::*;
