pub mod aggregate;
pub mod error;
pub mod geo;
pub mod loader;
pub mod output;
pub mod record;
pub mod table;

pub use error::TripError;
pub use loader::{LoadOptions, TRIP_TIME_ZONE};
pub use table::TripTable;
