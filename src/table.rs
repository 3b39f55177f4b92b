//! The trip table: loaded records plus their derived columns.

use rayon::prelude::*;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::Result;
use crate::geo::{average_speed_kmh, haversine_distance};
use crate::loader::{LoadOptions, LoadedTrips, load_trips};
use crate::record::{AVG_SPEED, COORDINATE_COLUMNS, DISTANCE, TRIP_DURATION, TripRecord};

/// An in-memory batch of taxi trips.
///
/// `distance` and `avg_speed` are derived once during construction and the
/// table is read-only afterwards. Derivation is skipped, never guessed, when
/// the columns it needs were not loaded.
#[derive(Debug)]
pub struct TripTable {
    columns: Vec<String>,
    records: Vec<TripRecord>,
    has_distance: bool,
    has_avg_speed: bool,
}

impl TripTable {
    /// Loads a CSV (or `.csv.gz`) file and derives `distance` and `avg_speed`.
    pub fn load(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Self> {
        let LoadedTrips { columns, records } = load_trips(path.as_ref(), options)?;
        Ok(Self::from_records(columns, records))
    }

    /// Builds a table from already-normalized records.
    ///
    /// `columns` names the source columns that were loaded; it decides which
    /// derived columns can be computed.
    pub fn from_records(columns: Vec<String>, mut records: Vec<TripRecord>) -> Self {
        let loaded = |name: &str| columns.iter().any(|c| c == name);
        let has_distance = COORDINATE_COLUMNS.iter().all(|&c| loaded(c));
        let has_avg_speed = has_distance && loaded(TRIP_DURATION);

        if has_distance {
            records.par_iter_mut().for_each(|trip| {
                let distance =
                    haversine_distance(trip.pickup_coordinates(), trip.dropoff_coordinates());
                trip.distance = Some(distance);
                if has_avg_speed {
                    let duration = trip.trip_duration.map_or(f64::NAN, |d| d as f64);
                    trip.avg_speed = Some(average_speed_kmh(distance, duration));
                }
            });
        } else {
            warn!("Coordinate columns not loaded, skipping distance and avg_speed");
        }

        if has_distance && !has_avg_speed {
            warn!("trip_duration not loaded, skipping avg_speed");
        }

        let non_finite = records
            .iter()
            .filter(|t| t.avg_speed.is_some_and(|s| !s.is_finite()))
            .count();
        debug!(
            rows = records.len(),
            has_distance, has_avg_speed, non_finite, "Derived columns computed"
        );

        let mut columns = columns;
        if has_distance {
            columns.push(DISTANCE.to_string());
        }
        if has_avg_speed {
            columns.push(AVG_SPEED.to_string());
        }

        TripTable {
            columns,
            records,
            has_distance,
            has_avg_speed,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// `(rows, columns)`, counting derived columns.
    pub fn shape(&self) -> (usize, usize) {
        (self.records.len(), self.columns.len())
    }

    /// Loaded column names in file order, followed by derived columns.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn records(&self) -> &[TripRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TripRecord> {
        self.records.iter()
    }

    pub fn has_distance(&self) -> bool {
        self.has_distance
    }

    pub fn has_avg_speed(&self) -> bool {
        self.has_avg_speed
    }

    /// The `distance` column, if it was derived.
    pub fn distances(&self) -> Option<Vec<f64>> {
        self.has_distance
            .then(|| self.records.iter().filter_map(TripRecord::distance).collect())
    }

    /// The `avg_speed` column, if it was derived.
    pub fn avg_speeds(&self) -> Option<Vec<f64>> {
        self.has_avg_speed
            .then(|| self.records.iter().filter_map(TripRecord::avg_speed).collect())
    }
}

impl<'a> IntoIterator for &'a TripTable {
    type Item = &'a TripRecord;
    type IntoIter = std::slice::Iter<'a, TripRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
