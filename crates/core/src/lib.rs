#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod plan;
pub mod progress;
pub mod revision;
pub mod syllabus;
pub mod time;

pub use error::Error;
pub use time::Clock;
