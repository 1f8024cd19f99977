use crate::axis::{Axis, Hemisphere, parse_axis};
use crate::coordinate::Coordinate;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Leading signed decimal latitude and longitude of an ISO 6709 string, as
/// written into video `location` atoms (`+38.0150+023.8204+214.199/`).
static ISO_6709: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([+-]?\d+(?:\.\d+)?)([+-]\d+(?:\.\d+)?)").unwrap());

/// A degrees/minutes/seconds triplet as stored in EXIF GPS tags, with the
/// accompanying `GPSLatitudeRef`/`GPSLongitudeRef` letter when present.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dms {
    pub degrees: f64,
    pub minutes: f64,
    pub seconds: f64,
    pub reference: Option<Hemisphere>,
}
impl Dms {
    pub fn new(degrees: f64, minutes: f64, seconds: f64, reference: impl Into<Option<Hemisphere>>) -> Self {
        Self { degrees, minutes, seconds, reference: reference.into() }
    }

    fn to_decimal(self, axis: Axis) -> Option<f64> {
        let sexagesimal = |v: f64| v.is_finite() && (0.0..60.0).contains(&v);
        if !self.degrees.is_finite() || !sexagesimal(self.minutes) || !sexagesimal(self.seconds) {
            return None;
        }
        let magnitude = self.degrees.abs() + self.minutes / 60.0 + self.seconds / 3600.0;
        let value = match self.reference {
            Some(reference) if reference.axis() != axis => return None,
            Some(reference) => reference.apply(magnitude),
            None if self.degrees.is_sign_negative() => -magnitude,
            None => magnitude,
        };
        axis.contains(value).then_some(value)
    }
}

/// A coordinate as handed over by the metadata extraction layer, before
/// normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCoordinate {
    /// Separate textual axes, e.g. XMP `GPSLatitude`/`GPSLongitude`.
    Axes { latitude: String, longitude: String },
    /// EXIF rational triplets.
    Dms { latitude: Dms, longitude: Dms },
    /// Values that are already numeric and only need validating.
    Decimal { latitude: f64, longitude: f64 },
    /// An ISO 6709 location string.
    Iso6709(String),
    /// A single `"latitude, longitude"` string. Halves in degrees-minutes
    /// form need a hemisphere letter on the latitude (`"41,2.2N, 23,49W"`).
    Pair(String),
}
impl RawCoordinate {
    pub fn axes(latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        Self::Axes { latitude: latitude.into(), longitude: longitude.into() }
    }

    /// Converts to a validated [`Coordinate`], or `None` when any part is
    /// unparseable or out of range.
    pub fn normalize(&self) -> Option<Coordinate> {
        let normalized = match self {
            Self::Axes { latitude, longitude } => {
                Coordinate::new(parse_axis(latitude, Axis::Latitude)?, parse_axis(longitude, Axis::Longitude)?)
            },
            Self::Dms { latitude, longitude } => {
                Coordinate::new(latitude.to_decimal(Axis::Latitude)?, longitude.to_decimal(Axis::Longitude)?)
            },
            Self::Decimal { latitude, longitude } => Coordinate::new(*latitude, *longitude),
            Self::Iso6709(raw) => {
                let captures = ISO_6709.captures(raw)?;
                Coordinate::new(captures[1].parse().ok()?, captures[2].parse().ok()?)
            },
            Self::Pair(raw) => raw.parse().ok(),
        };
        if normalized.is_none() {
            debug!(raw = ?self, "Coordinate discarded during normalization");
        }
        normalized
    }
}
