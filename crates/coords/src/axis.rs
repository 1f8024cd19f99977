//! Single-axis parsing.
//!
//! Every textual encoding of one latitude or longitude value ends up here:
//!
//! | Encoding                         | Example            |
//! |----------------------------------|--------------------|
//! | Decimal degrees, optional sign   | `-23.5`, `+38.015` |
//! | Decimal degrees + hemisphere     | `38.015N`, `23.8,E`|
//! | Degrees, decimal minutes         | `41,2.2093320N`    |
//! | Degrees, minutes, seconds        | `41,2,13.56S`      |
//!
//! A hemisphere letter decides the sign on its own: `S`/`W` always yield a
//! negative value and `N`/`E` a positive one, whatever sign was embedded in
//! the degree component. Without a letter the degree component's sign is
//! applied to the whole magnitude, so `-41,30` is `-41.5` and not `-40.5`.

use derive_more::Display;
use std::str::FromStr;
use tracing::debug;

/// Which half of a coordinate pair a value belongs to.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    #[display("latitude")]
    Latitude,
    #[display("longitude")]
    Longitude,
}
impl Axis {
    /// Largest absolute value allowed on this axis, in degrees.
    pub fn limit(self) -> f64 {
        match self {
            Self::Latitude => 90.0,
            Self::Longitude => 180.0,
        }
    }

    pub fn contains(self, degrees: f64) -> bool {
        degrees.is_finite() && degrees.abs() <= self.limit()
    }
}

/// Compass reference attached to a value.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hemisphere {
    #[display("N")]
    North,
    #[display("S")]
    South,
    #[display("E")]
    East,
    #[display("W")]
    West,
}
impl Hemisphere {
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'N' => Some(Self::North),
            'S' => Some(Self::South),
            'E' => Some(Self::East),
            'W' => Some(Self::West),
            _ => None,
        }
    }

    pub fn is_negative(self) -> bool {
        matches!(self, Self::South | Self::West)
    }

    /// The axis this reference can legally describe.
    pub fn axis(self) -> Axis {
        match self {
            Self::North | Self::South => Axis::Latitude,
            Self::East | Self::West => Axis::Longitude,
        }
    }

    /// Applies this hemisphere's sign to a value, ignoring the value's own sign.
    pub fn apply(self, degrees: f64) -> f64 {
        if self.is_negative() { -degrees.abs() } else { degrees.abs() }
    }
}
impl FromStr for Hemisphere {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c).ok_or(()),
            _ => Err(()),
        }
    }
}

/// Parses one axis value from any of the supported textual encodings.
///
/// Returns `None` for unparseable input, for hemisphere letters that belong to
/// the other axis (`"38.0E"` as a latitude), for minutes or seconds outside
/// `[0, 60)`, and for results outside the axis range. Never clamps.
pub fn parse_axis(raw: &str, axis: Axis) -> Option<f64> {
    let value = parse_unchecked(raw, Some(axis));
    if value.is_none() {
        debug!(raw, %axis, "Unparseable coordinate component");
    }
    value
}

pub(crate) fn parse_unchecked(raw: &str, axis: Option<Axis>) -> Option<f64> {
    let trimmed = raw.trim();
    let (body, hemisphere) = match trimmed.chars().last() {
        Some(c) if c.is_ascii_alphabetic() => {
            let hemisphere = Hemisphere::from_char(c)?;
            (&trimmed[..trimmed.len() - c.len_utf8()], Some(hemisphere))
        },
        Some(_) => (trimmed, None),
        None => return None,
    };
    if let (Some(axis), Some(hemisphere)) = (axis, hemisphere)
        && hemisphere.axis() != axis
    {
        return None;
    }
    // XMP writes "38.015,N" as well as "38.015N".
    let body = body.trim();
    let body = body.strip_suffix(',').unwrap_or(body).trim();
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    let (negative, magnitude) = match parts.as_slice() {
        [degrees] => component(degrees)?,
        [degrees, minutes] => {
            let (negative, degrees) = component(degrees)?;
            (negative, degrees + sexagesimal(minutes)? / 60.0)
        },
        [degrees, minutes, seconds] => {
            let (negative, degrees) = component(degrees)?;
            (negative, degrees + sexagesimal(minutes)? / 60.0 + sexagesimal(seconds)? / 3600.0)
        },
        _ => return None,
    };
    let value = match hemisphere {
        Some(hemisphere) => hemisphere.apply(magnitude),
        None if negative => -magnitude,
        None => magnitude,
    };
    let limit = axis.map_or(180.0, Axis::limit);
    (value.is_finite() && value.abs() <= limit).then_some(value)
}

/// Parses a signed degree component into `(is_negative, magnitude)`.
fn component(s: &str) -> Option<(bool, f64)> {
    // `f64::from_str` happily accepts "inf" and "NaN", neither of which is a place.
    if s.is_empty() || !s.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '+' || c == '.') {
        return None;
    }
    let value = f64::from_str(s).ok().filter(|v| v.is_finite())?;
    Some((s.starts_with('-'), value.abs()))
}

/// Parses a minutes or seconds component, which must be unsigned and below 60.
fn sexagesimal(s: &str) -> Option<f64> {
    if !s.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }
    f64::from_str(s).ok().filter(|v| v.is_finite() && (0.0..60.0).contains(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn approx(actual: Option<f64>, expected: f64) {
        let actual = actual.unwrap_or_else(|| panic!("expected {expected}, got None"));
        assert!((actual - expected).abs() < 1e-6, "expected {expected}, got {actual}");
    }

    #[rstest]
    #[case("-23.5", -23.5)]
    #[case("+38.015", 38.015)]
    #[case("0", 0.0)]
    #[case("  12.25  ", 12.25)]
    #[case("90", 90.0)]
    fn test_decimal_is_identity(#[case] input: &str, #[case] expected: f64) {
        assert_eq!(parse_axis(input, Axis::Latitude), Some(expected));
    }

    #[rstest]
    #[case("38.015N", Axis::Latitude, 38.015)]
    #[case("38.015S", Axis::Latitude, -38.015)]
    #[case("23.8204,E", Axis::Longitude, 23.8204)]
    #[case("23.8204w", Axis::Longitude, -23.8204)]
    #[case("41,2.2093320N", Axis::Latitude, 41.036_822_2)]
    #[case("41,2,13.56N", Axis::Latitude, 41.0371)]
    #[case("-41,30", Axis::Latitude, -41.5)]
    fn test_parses_hemisphere_encodings(#[case] input: &str, #[case] axis: Axis, #[case] expected: f64) {
        approx(parse_axis(input, axis), expected);
    }

    #[rstest]
    #[case("38.015S")]
    #[case("-38.015S")]
    #[case("41,2.5S")]
    #[case("-41,2.5S")]
    #[case("41,2,13.56S")]
    #[case("-41,2,13.56S")]
    fn test_southern_hemisphere_is_always_negative(#[case] input: &str) {
        let value = parse_axis(input, Axis::Latitude).unwrap();
        assert!(value < 0.0, "{input} parsed to {value}");
    }

    #[test]
    fn test_northern_hemisphere_overrides_embedded_sign() {
        approx(parse_axis("-41,30N", Axis::Latitude), 41.5);
    }

    #[rstest]
    #[case("", Axis::Latitude)]
    #[case("north", Axis::Latitude)]
    #[case("91", Axis::Latitude)]
    #[case("-180.5", Axis::Longitude)]
    #[case("38.0E", Axis::Latitude)]
    #[case("23.0N", Axis::Longitude)]
    #[case("41,60N", Axis::Latitude)]
    #[case("41,-2N", Axis::Latitude)]
    #[case("41,2,3,4N", Axis::Latitude)]
    #[case("41,,N", Axis::Latitude)]
    #[case("NaN", Axis::Latitude)]
    #[case("inf", Axis::Longitude)]
    #[case("12.5X", Axis::Longitude)]
    fn test_rejects_invalid_input(#[case] input: &str, #[case] axis: Axis) {
        assert_eq!(parse_axis(input, axis), None);
    }

    #[test]
    fn test_range_check_happens_after_conversion() {
        // 89 degrees 60+ minutes would spill over the pole.
        assert_eq!(parse_axis("89,59.9999N", Axis::Latitude).map(|v| v < 90.0), Some(true));
        assert_eq!(parse_axis("90,0.5N", Axis::Latitude), None);
    }

    #[test]
    fn test_hemisphere_from_str() {
        assert_eq!("s".parse::<Hemisphere>(), Ok(Hemisphere::South));
        assert_eq!(" W ".parse::<Hemisphere>(), Ok(Hemisphere::West));
        assert!("SW".parse::<Hemisphere>().is_err());
        assert!("".parse::<Hemisphere>().is_err());
    }
}
