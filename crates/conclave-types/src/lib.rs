pub mod error;
pub mod metrics;
pub mod peer;
pub mod wire;

pub use error::*;
pub use metrics::*;
pub use peer::*;
pub use wire::*;
