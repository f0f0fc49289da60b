pub mod agent;
pub mod classifier;

pub use agent::*;
pub use classifier::*;
