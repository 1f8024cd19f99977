use crate::axis::{Axis, parse_unchecked};
use crate::error::{Error, ErrorKind};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Slack added to proximity comparisons so that values which are exactly
/// `tolerance` apart (after float rounding) still match.
const PROXIMITY_EPSILON: f64 = 1e-10;

/// A validated `(latitude, longitude)` pair in decimal degrees.
///
/// The only way to obtain one is through validation, so holding a
/// `Coordinate` means both axes are finite and in range. An unknown location
/// is `Option::None`, never `(0, 0)`: that is a real point in the Gulf of
/// Guinea.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Unchecked")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}
impl Coordinate {
    /// Returns `None` unless latitude is within `[-90, 90]` and longitude
    /// within `[-180, 180]`.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        (Axis::Latitude.contains(latitude) && Axis::Longitude.contains(longitude))
            .then_some(Self { latitude, longitude })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Whether `other` lies within `tolerance` degrees of `self` on *both* axes.
    ///
    /// Each axis is compared independently; this is a bounding box, not a
    /// geodesic radius. Near the poles a degree of longitude shrinks towards
    /// zero metres, so the box matches points that are much closer together
    /// east-west than it does at the equator.
    pub fn is_within(&self, other: &Coordinate, tolerance: f64) -> bool {
        let limit = tolerance + PROXIMITY_EPSILON;
        (self.latitude - other.latitude).abs() <= limit && (self.longitude - other.longitude).abs() <= limit
    }
}
impl Display for Coordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}
impl FromStr for Coordinate {
    type Err = Error;

    /// Parses a `"latitude, longitude"` pair where each half may use any
    /// single-axis encoding. Halves in degrees-minutes form contain commas of
    /// their own, so the latitude needs its `N`/`S` letter for the pair to be
    /// split correctly (`"41,2.2N, 23,49W"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((latitude, longitude)) = split_pair(s) else {
            exn::bail!(ErrorKind::ParseError { field: "coordinate", value: s.to_string() });
        };
        let latitude = axis(latitude, Axis::Latitude)?;
        let longitude = axis(longitude, Axis::Longitude)?;
        // Both axes were range-checked above.
        Ok(Self { latitude, longitude })
    }
}

/// Splits at the first comma that follows a latitude hemisphere letter,
/// falling back to the first comma.
fn split_pair(s: &str) -> Option<(&str, &str)> {
    let after_hemisphere = s.char_indices().find_map(|(index, c)| {
        if !matches!(c, 'N' | 'n' | 'S' | 's') {
            return None;
        }
        let split = index + c.len_utf8();
        s[split..].trim_start().strip_prefix(',').map(|longitude| (&s[..split], longitude))
    });
    after_hemisphere.or_else(|| s.split_once(','))
}

fn axis(s: &str, axis: Axis) -> Result<f64, Error> {
    let field = match axis {
        Axis::Latitude => "latitude",
        Axis::Longitude => "longitude",
    };
    if let Some(value) = parse_unchecked(s, Some(axis)) {
        return Ok(value);
    }
    match parse_unchecked(s, None) {
        Some(_) => exn::bail!(ErrorKind::OutOfRange { field, value: s.trim().to_string() }),
        None => exn::bail!(ErrorKind::ParseError { field, value: s.trim().to_string() }),
    }
}

/// Deserialization shim: persisted coordinates are re-validated on the way in.
#[derive(Deserialize)]
struct Unchecked {
    latitude: f64,
    longitude: f64,
}
impl TryFrom<Unchecked> for Coordinate {
    type Error = ErrorKind;

    fn try_from(value: Unchecked) -> Result<Self, Self::Error> {
        Coordinate::new(value.latitude, value.longitude).ok_or_else(|| ErrorKind::OutOfRange {
            field: "coordinate",
            value: format!("{}, {}", value.latitude, value.longitude),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 0.0, true)]
    #[case(90.0, 180.0, true)]
    #[case(-90.0, -180.0, true)]
    #[case(90.0001, 0.0, false)]
    #[case(0.0, -180.0001, false)]
    #[case(f64::NAN, 0.0, false)]
    #[case(0.0, f64::INFINITY, false)]
    fn test_new_validates_range(#[case] latitude: f64, #[case] longitude: f64, #[case] valid: bool) {
        assert_eq!(Coordinate::new(latitude, longitude).is_some(), valid);
    }

    #[test]
    fn test_is_within_compares_each_axis() {
        let origin = Coordinate::new(38.015, 23.821).unwrap();
        assert!(origin.is_within(&Coordinate::new(38.0155, 23.8205).unwrap(), 0.001));
        assert!(origin.is_within(&Coordinate::new(38.016, 23.822).unwrap(), 0.001));
        assert!(!origin.is_within(&Coordinate::new(38.0165, 23.821).unwrap(), 0.001));
        assert!(!origin.is_within(&Coordinate::new(38.015, 23.8195).unwrap(), 0.001));
    }

    #[test]
    fn test_is_within_near_pole_is_a_box_not_a_radius() {
        // At 89.9995N these two points are roughly 0.1m apart east-west, yet a
        // longitude difference above the tolerance still counts as a miss.
        let a = Coordinate::new(89.9995, 10.0).unwrap();
        let b = Coordinate::new(89.9995, 10.002).unwrap();
        assert!(!a.is_within(&b, 0.001));
        // Points metres apart on opposite sides of the pole never match.
        let c = Coordinate::new(89.9995, -170.0).unwrap();
        assert!(!a.is_within(&c, 0.001));
    }

    #[rstest]
    #[case("37.9755, -23.7348", 37.9755, -23.7348)]
    #[case("38.015N,23.8204W", 38.015, -23.8204)]
    #[case("38.015,N, 23.8204,W", 38.015, -23.8204)]
    #[case("41,30N, 23,45W", 41.5, -23.75)]
    #[case("41,2.2093320N, 23,49,12E", 41.036_822, 23.82)]
    #[case("10,30S,20.5", -10.5, 20.5)]
    fn test_from_str(#[case] input: &str, #[case] latitude: f64, #[case] longitude: f64) {
        let coordinate: Coordinate = input.parse().unwrap();
        assert!((coordinate.latitude() - latitude).abs() < 1e-6);
        assert!((coordinate.longitude() - longitude).abs() < 1e-6);
    }

    #[test]
    fn test_from_str_errors() {
        let err = "37.9755".parse::<Coordinate>().unwrap_err();
        assert!(matches!(&*err, ErrorKind::ParseError { field: "coordinate", .. }));
        let err = "95.0, 10.0".parse::<Coordinate>().unwrap_err();
        assert!(matches!(&*err, ErrorKind::OutOfRange { field: "latitude", .. }));
        let err = "10.0, east".parse::<Coordinate>().unwrap_err();
        assert!(matches!(&*err, ErrorKind::ParseError { field: "longitude", .. }));
    }

    #[test]
    fn test_display() {
        let coordinate = Coordinate::new(38.015, -23.8204).unwrap();
        assert_eq!(coordinate.to_string(), "38.015000, -23.820400");
    }
}
