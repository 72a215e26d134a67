pub mod notion;
pub mod task;

pub use notion::*;
pub use task::*;
