use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Key of an aggregation bucket.
///
/// Integer steps produce integer keys; fractional steps produce float keys
/// such as `7.5`. Keys are totally ordered, floats by [`f64::total_cmp`].
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum BucketKey {
    Int(i64),
    Float(f64),
}

impl BucketKey {
    pub fn as_f64(self) -> f64 {
        match self {
            BucketKey::Int(k) => k as f64,
            BucketKey::Float(k) => k,
        }
    }
}

impl PartialEq for BucketKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for BucketKey {}

impl PartialOrd for BucketKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BucketKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (BucketKey::Int(a), BucketKey::Int(b)) => a.cmp(b),
            _ => self.as_f64().total_cmp(&other.as_f64()),
        }
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketKey::Int(k) => write!(f, "{k}"),
            BucketKey::Float(k) => f.write_str(&format_float(*k)),
        }
    }
}

/// Shortest round-trip rendering of a float, as `2.5`, `4.0`, `0.0001`, or
/// with a signed two-digit exponent (`1e-05`, `2.5e+16`) outside
/// `[1e-4, 1e16)`. Non-finite values render as `nan`, `inf` and `-inf`.
pub(crate) fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let sci = format!("{x:e}");
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);

    if (-4..16).contains(&exp) {
        let plain = x.to_string();
        if plain.contains('.') { plain } else { format!("{plain}.0") }
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exp.abs())
    }
}

impl From<i64> for BucketKey {
    fn from(k: i64) -> Self {
        BucketKey::Int(k)
    }
}

impl From<i32> for BucketKey {
    fn from(k: i32) -> Self {
        BucketKey::Int(k.into())
    }
}

impl From<u32> for BucketKey {
    fn from(k: u32) -> Self {
        BucketKey::Int(k.into())
    }
}

impl From<f64> for BucketKey {
    fn from(k: f64) -> Self {
        BucketKey::Float(k)
    }
}

/// A named one-dimensional aggregate, ordered by bucket key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series<V> {
    name: String,
    entries: Vec<(BucketKey, V)>,
}

impl<V> Series<V> {
    pub fn new(name: impl Into<String>, entries: Vec<(BucketKey, V)>) -> Self {
        Series {
            name: name.into(),
            entries,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[(BucketKey, V)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value of the bucket equal to `key`, if any trip fell into it.
    pub fn get(&self, key: impl Into<BucketKey>) -> Option<&V> {
        let key = key.into();
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = BucketKey> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (BucketKey, V)> {
        self.entries.iter()
    }
}

impl<V: Copy + std::iter::Sum<V>> Series<V> {
    /// Sum over all buckets.
    pub fn total(&self) -> V {
        self.entries.iter().map(|(_, v)| *v).sum()
    }
}
