pub mod logging;
pub mod request_id;

pub use logging::LoggingLayer;
pub use request_id::{RequestId, RequestIdLayer};
