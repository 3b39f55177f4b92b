//! Row types for the taxi trip dataset.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Deserialize;

use crate::geo::Coordinates;

pub const ID: &str = "id";
pub const VENDOR_ID: &str = "vendor_id";
pub const PICKUP_DATETIME: &str = "pickup_datetime";
pub const DROPOFF_DATETIME: &str = "dropoff_datetime";
pub const PASSENGER_COUNT: &str = "passenger_count";
pub const PICKUP_LONGITUDE: &str = "pickup_longitude";
pub const PICKUP_LATITUDE: &str = "pickup_latitude";
pub const DROPOFF_LONGITUDE: &str = "dropoff_longitude";
pub const DROPOFF_LATITUDE: &str = "dropoff_latitude";
pub const STORE_AND_FWD_FLAG: &str = "store_and_fwd_flag";
pub const TRIP_DURATION: &str = "trip_duration";

pub const DISTANCE: &str = "distance";
pub const AVG_SPEED: &str = "avg_speed";

/// Columns that must be loaded for `distance` to be derived.
pub const COORDINATE_COLUMNS: [&str; 4] = [
    PICKUP_LONGITUDE,
    PICKUP_LATITUDE,
    DROPOFF_LONGITUDE,
    DROPOFF_LATITUDE,
];

/// A single CSV row as read from disk, before datetime normalization.
///
/// Every field is optional: a column may be projected away by the loader or
/// the cell may be empty.
#[derive(Debug, Deserialize)]
pub struct RawTripRecord {
    pub(crate) id: Option<String>,
    pub(crate) vendor_id: Option<u32>,
    pub(crate) pickup_datetime: Option<String>,
    pub(crate) dropoff_datetime: Option<String>,
    pub(crate) passenger_count: Option<u32>,
    pub(crate) pickup_longitude: Option<f64>,
    pub(crate) pickup_latitude: Option<f64>,
    pub(crate) dropoff_longitude: Option<f64>,
    pub(crate) dropoff_latitude: Option<f64>,
    pub(crate) store_and_fwd_flag: Option<String>,
    pub(crate) trip_duration: Option<i64>,
}

/// One taxi trip with timestamps in the fixed civil zone.
///
/// `distance` (km) and `avg_speed` (km/h) are filled in once by
/// [`TripTable`](crate::table::TripTable) and are read-only afterwards.
#[derive(Debug, Clone)]
pub struct TripRecord {
    pub id: Option<String>,
    pub vendor_id: Option<u32>,
    pub pickup_datetime: DateTime<Tz>,
    pub dropoff_datetime: DateTime<Tz>,
    pub passenger_count: Option<u32>,
    pub pickup_longitude: Option<f64>,
    pub pickup_latitude: Option<f64>,
    pub dropoff_longitude: Option<f64>,
    pub dropoff_latitude: Option<f64>,
    pub store_and_fwd_flag: Option<String>,
    pub trip_duration: Option<i64>,
    pub(crate) distance: Option<f64>,
    pub(crate) avg_speed: Option<f64>,
}

impl TripRecord {
    pub fn new(pickup_datetime: DateTime<Tz>, dropoff_datetime: DateTime<Tz>) -> Self {
        TripRecord {
            id: None,
            vendor_id: None,
            pickup_datetime,
            dropoff_datetime,
            passenger_count: None,
            pickup_longitude: None,
            pickup_latitude: None,
            dropoff_longitude: None,
            dropoff_latitude: None,
            store_and_fwd_flag: None,
            trip_duration: None,
            distance: None,
            avg_speed: None,
        }
    }

    /// Sets pickup and dropoff `(latitude, longitude)` pairs.
    pub fn with_coordinates(mut self, pickup: Coordinates, dropoff: Coordinates) -> Self {
        self.pickup_latitude = Some(pickup.0);
        self.pickup_longitude = Some(pickup.1);
        self.dropoff_latitude = Some(dropoff.0);
        self.dropoff_longitude = Some(dropoff.1);
        self
    }

    pub fn with_duration(mut self, seconds: i64) -> Self {
        self.trip_duration = Some(seconds);
        self
    }

    /// Pickup `(latitude, longitude)`; empty cells read as NaN.
    pub fn pickup_coordinates(&self) -> Coordinates {
        (
            self.pickup_latitude.unwrap_or(f64::NAN),
            self.pickup_longitude.unwrap_or(f64::NAN),
        )
    }

    /// Dropoff `(latitude, longitude)`; empty cells read as NaN.
    pub fn dropoff_coordinates(&self) -> Coordinates {
        (
            self.dropoff_latitude.unwrap_or(f64::NAN),
            self.dropoff_longitude.unwrap_or(f64::NAN),
        )
    }

    /// Great-circle distance in km, if it was derived for this table.
    pub fn distance(&self) -> Option<f64> {
        self.distance
    }

    /// Average speed in km/h, if it was derived for this table.
    pub fn avg_speed(&self) -> Option<f64> {
        self.avg_speed
    }
}
