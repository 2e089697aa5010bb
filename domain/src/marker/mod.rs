//! Response marker: decides where one command's output ends.

pub mod matcher;

pub use matcher::{Extraction, MarkerMatch, ResponseMarker, ResponseMatcher};
