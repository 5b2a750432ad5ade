pub mod batch;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod issuer;
pub mod limiter;
pub mod outcome;
pub mod progress;
pub mod report;
pub mod request;
pub mod stats;

pub use bytes::Bytes;

pub use batch::*;
pub use config::*;
pub use dispatcher::*;
pub use error::*;
pub use issuer::*;
pub use limiter::*;
pub use outcome::*;
pub use progress::*;
pub use report::*;
pub use request::*;
pub use stats::*;
