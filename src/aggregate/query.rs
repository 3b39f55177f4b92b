//! Aggregation queries on [`TripTable`].

use chrono::{Datelike, Timelike};
use std::collections::BTreeMap;
use std::ops::Add;
use tracing::debug;

use super::series::{BucketKey, Series};
use super::step::HourStep;
use crate::error::{Result, TripError};
use crate::record::{DISTANCE, TripRecord};
use crate::table::TripTable;

/// Day of week of the pickup, `0` for Monday through `6` for Sunday.
pub fn pickup_day_of_week(trip: &TripRecord) -> i64 {
    i64::from(trip.pickup_datetime.weekday().num_days_from_monday())
}

/// Bucket key of the pickup day of week.
fn day_bucket(trip: &TripRecord) -> BucketKey {
    BucketKey::Int(pickup_day_of_week(trip))
}

impl TripTable {
    /// Number of trips per pickup day of week. Named `trip_by_dow`.
    pub fn trips_by_day_of_week(&self) -> Series<usize> {
        let buckets = self.reduce_by_key(day_bucket, |_| 1usize);
        into_series("trip_by_dow", buckets)
    }

    /// Number of trips per pickup hour, in buckets `step` hours wide.
    ///
    /// The bucket key is `step * floor(hour / step)` and the series is named
    /// `trip_by_{step}h`.
    ///
    /// # Errors
    ///
    /// [`TripError::InvalidParameter`] when `step` is outside `]0, 24]`.
    pub fn trips_by_hour_step(&self, step: impl Into<HourStep>) -> Result<Series<usize>> {
        let step = step.into().validate()?;
        Ok(self.count_by_hour(step))
    }

    /// Number of trips in 4-hour pickup buckets. Named `trip_by_4h`.
    pub fn trips_by_4h(&self) -> Series<usize> {
        self.count_by_hour(HourStep::Int(4))
    }

    /// Kilometres travelled per pickup day of week. Named `km_by_dow`.
    ///
    /// NaN distances contribute nothing to their bucket.
    ///
    /// # Errors
    ///
    /// [`TripError::NotDerived`] when the table was loaded without the
    /// coordinate columns.
    pub fn km_by_day_of_week(&self) -> Result<Series<f64>> {
        if !self.has_distance() {
            return Err(TripError::NotDerived { column: DISTANCE });
        }

        let buckets = self.reduce_by_key(day_bucket, |trip| {
            trip.distance().filter(|d| !d.is_nan()).unwrap_or(0.0)
        });
        Ok(into_series("km_by_dow", buckets))
    }

    fn count_by_hour(&self, step: HourStep) -> Series<usize> {
        let buckets =
            self.reduce_by_key(|trip| step.bucket(trip.pickup_datetime.hour()), |_| 1usize);
        into_series(format!("trip_by_{step}h"), buckets)
    }

    fn reduce_by_key<V>(
        &self,
        key: impl Fn(&TripRecord) -> BucketKey,
        value: impl Fn(&TripRecord) -> V,
    ) -> BTreeMap<BucketKey, V>
    where
        V: Copy + Default + Add<Output = V>,
    {
        let mut buckets: BTreeMap<BucketKey, V> = BTreeMap::new();
        for trip in self {
            let slot = buckets.entry(key(trip)).or_default();
            *slot = *slot + value(trip);
        }
        buckets
    }
}

fn into_series<V>(name: impl Into<String>, buckets: BTreeMap<BucketKey, V>) -> Series<V> {
    let series = Series::new(name, buckets.into_iter().collect());
    debug!(name = series.name(), buckets = series.len(), "Aggregate computed");
    series
}
