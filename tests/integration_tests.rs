use chrono::Timelike;
use taxi_trips::aggregate::{BucketKey, HourStep};
use taxi_trips::{LoadOptions, TRIP_TIME_ZONE, TripError, TripTable};

const SAMPLES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/samples.csv");

const EXPECTED_DISTANCES: [f64; 40] = [
    1.498521, 1.805507, 6.385098, 1.485498, 1.188588, 1.098942, 1.326279, 5.714981, 1.310353,
    5.121162, 3.806139, 3.773096, 1.859483, 0.991685, 6.382836, 0.656578, 3.428086, 2.538672,
    4.605201, 1.303271, 2.505926, 1.724550, 2.067085, 4.874792, 20.602575, 4.559525, 6.056109,
    3.738742, 2.524849, 9.939443, 4.564593, 5.423052, 4.499284, 10.238385, 1.433100, 1.492237,
    1.136392, 0.959435, 3.312410, 2.587523,
];

fn load_samples() -> TripTable {
    TripTable::load(SAMPLES, &LoadOptions::default()).expect("Failed to load samples")
}

fn counts(series: &taxi_trips::aggregate::Series<usize>) -> Vec<usize> {
    series.values().copied().collect()
}

#[test]
fn test_load_shape() {
    let table = load_samples();
    assert_eq!(table.shape(), (40, 13));
    assert_eq!(table.columns()[11], "distance");
    assert_eq!(table.columns()[12], "avg_speed");
}

#[test]
fn test_datetimes_are_localized() {
    let table = load_samples();
    let first = &table.records()[0];
    assert_eq!(first.pickup_datetime.timezone(), TRIP_TIME_ZONE);
    assert_eq!(first.pickup_datetime.hour(), 17);
    assert_eq!(first.pickup_datetime.to_rfc3339(), "2016-03-14T17:24:55-04:00");
    assert_eq!(first.dropoff_datetime.to_rfc3339(), "2016-03-14T17:32:30-04:00");
}

#[test]
fn test_distance_values() {
    let table = load_samples();
    let distances = table.distances().unwrap();
    assert_eq!(distances.len(), EXPECTED_DISTANCES.len());
    for (value, target) in distances.iter().zip(EXPECTED_DISTANCES) {
        assert!((value - target).abs() < 1e-4, "{value} != {target}");
    }
}

#[test]
fn test_avg_speed_values() {
    let table = load_samples();
    let speeds = table.avg_speeds().unwrap();
    for ((trip, value), distance) in table.iter().zip(&speeds).zip(EXPECTED_DISTANCES) {
        let hours = trip.trip_duration.unwrap() as f64 / 3600.0;
        assert!((value - distance / hours).abs() < 1e-3, "{value} != {}", distance / hours);
        assert_eq!(*value, trip.distance().unwrap() / hours);
    }
}

#[test]
fn test_trips_by_day_of_week() {
    let s = load_samples().trips_by_day_of_week();
    assert_eq!(s.name(), "trip_by_dow");
    assert_eq!(s.keys().collect::<Vec<_>>(), (0..7).map(BucketKey::Int).collect::<Vec<_>>());
    assert_eq!(counts(&s), vec![6, 6, 3, 3, 8, 8, 6]);
}

#[test]
fn test_trips_by_4h() {
    let table = load_samples();
    let s = table.trips_by_4h();
    assert_eq!(s.name(), "trip_by_4h");
    assert_eq!(counts(&s), vec![4, 2, 8, 11, 5, 10]);
    assert_eq!(s, table.trips_by_hour_step(4).unwrap());
}

#[test]
fn test_trips_by_fractional_step() {
    let s = load_samples().trips_by_hour_step(2.5).unwrap();
    assert_eq!(s.name(), "trip_by_2.5h");
    assert_eq!(counts(&s), vec![3, 1, 2, 2, 9, 4, 6, 3, 9, 1]);
    assert_eq!(s.get(7.5), Some(&2));
}

#[test]
fn test_tiny_step_matches_hourly_buckets() {
    let table = load_samples();
    let hourly = table.trips_by_hour_step(1).unwrap();
    let tiny = table.trips_by_hour_step(1e-300).unwrap();
    assert_eq!(hourly.len(), 19);
    assert_eq!(tiny.len(), hourly.len());
    assert_eq!(tiny.total(), 40);
    assert_eq!(tiny.values().collect::<Vec<_>>(), hourly.values().collect::<Vec<_>>());
}

#[test]
fn test_small_step_name() {
    let s = load_samples().trips_by_hour_step(1e-5).unwrap();
    assert_eq!(s.name(), "trip_by_1e-05h");
    assert_eq!(s.total(), 40);
}

#[test]
fn test_hour_step_totals() {
    let table = load_samples();
    for step in ["1", "2", "2.5", "3", "5", "7.5", "12", "24"] {
        let step: HourStep = step.parse().unwrap();
        assert_eq!(table.trips_by_hour_step(step).unwrap().total(), 40);
    }
}

#[test]
fn test_invalid_steps() {
    let table = load_samples();
    let expected =
        |given: &str| format!("step should int or float, and within ]0, 24]. {given} given.");

    assert_eq!(table.trips_by_hour_step(-1).unwrap_err().to_string(), expected("-1"));
    assert_eq!(table.trips_by_hour_step(25).unwrap_err().to_string(), expected("25"));
    assert_eq!(table.trips_by_hour_step(f64::NAN).unwrap_err().to_string(), expected("nan"));
    assert_eq!("x".parse::<HourStep>().unwrap_err().to_string(), expected("x"));
}

#[test]
fn test_km_by_day_of_week() {
    let table = load_samples();
    let km = table.km_by_day_of_week().unwrap();
    assert_eq!(km.name(), "km_by_dow");

    let expected = [14.659328, 16.973313, 7.192756, 3.528927, 35.493172, 42.31015, 30.362337];
    for (value, target) in km.values().zip(expected) {
        assert!((value - target).abs() < 1e-4, "{value} != {target}");
    }

    let total: f64 = table.distances().unwrap().iter().sum();
    assert!((km.total() - total).abs() < 1e-9);
}

#[test]
fn test_queries_do_not_mutate() {
    let table = load_samples();
    let before = table.distances();
    let _ = table.trips_by_day_of_week();
    let _ = table.km_by_day_of_week();
    assert_eq!(table.distances(), before);
    assert_eq!(table.trips_by_4h(), table.trips_by_4h());
}

#[test]
fn test_load_with_row_limit_and_columns() {
    let columns = [
        "pickup_datetime",
        "dropoff_datetime",
        "pickup_longitude",
        "pickup_latitude",
        "dropoff_longitude",
        "dropoff_latitude",
        "trip_duration",
    ];
    let options = LoadOptions::default().with_row_limit(26).with_columns(columns);
    let table = TripTable::load(SAMPLES, &options).unwrap();

    assert_eq!(table.shape(), (26, 9));
    assert!(table.has_column("distance"));
    let distances = table.distances().unwrap();
    for (value, target) in distances.iter().zip(EXPECTED_DISTANCES) {
        assert!((value - target).abs() < 1e-4);
    }
}

#[test]
fn test_load_without_coordinates_skips_derivation() {
    let options = LoadOptions::default().with_columns([
        "id",
        "pickup_datetime",
        "dropoff_datetime",
        "trip_duration",
    ]);
    let table = TripTable::load(SAMPLES, &options).unwrap();

    assert_eq!(table.shape(), (40, 4));
    assert!(!table.has_column("distance"));
    assert!(table.avg_speeds().is_none());
    assert_eq!(table.trips_by_day_of_week().total(), 40);
    assert!(matches!(table.km_by_day_of_week(), Err(TripError::NotDerived { .. })));
}

#[test]
fn test_load_missing_file_is_parse_error() {
    let err = TripTable::load("tests/fixtures/does_not_exist.csv", &LoadOptions::default())
        .unwrap_err();
    assert!(err.is_parse_error());
}

#[test]
fn test_load_gzip() {
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    let path = std::env::temp_dir().join("taxi_trips_samples_test.csv.gz");
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&std::fs::read(SAMPLES).unwrap()).unwrap();
    std::fs::write(&path, encoder.finish().unwrap()).unwrap();

    let table = TripTable::load(&path, &LoadOptions::default()).unwrap();
    assert_eq!(table.shape(), (40, 13));
    assert_eq!(counts(&table.trips_by_4h()), vec![4, 2, 8, 11, 5, 10]);

    std::fs::remove_file(&path).unwrap();
}
