pub mod play;

pub use play::{PlaySpeedSortingError, PlaySpeedSortingQuery, PlaySpeedSortingResponse};
