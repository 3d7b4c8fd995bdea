//! File I/O, validation, and serialization for the releasepoint pipeline.

mod domain;
mod error;
mod shot_reader;
mod tracking_reader;
mod writer;

pub use domain::RunName;
pub use error::IoError;
pub use shot_reader::ShotReader;
pub use tracking_reader::TrackingReader;
pub use writer::ResultWriter;
