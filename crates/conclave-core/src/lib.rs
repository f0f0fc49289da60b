pub mod config;
pub mod consensus;
pub mod coordinator;
pub mod dispatch;
pub mod protocol;
pub mod registration;
pub mod registry;
pub mod reputation;
pub mod store;

pub use config::*;
pub use consensus::*;
pub use coordinator::*;
pub use dispatch::*;
pub use registry::*;
pub use reputation::*;
pub use store::*;
