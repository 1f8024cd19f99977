//! GPS coordinate normalization.
//!
//! Media files describe their location in a handful of incompatible ways:
//! EXIF rational triplets with a separate hemisphere reference, XMP strings
//! such as `41,2.2093320N`, ISO 6709 strings in video containers, or plain
//! decimal degrees. This crate turns all of them into a single validated
//! [`Coordinate`] type.
//!
//! Normalization never fails loudly. Input that is unparseable or out of
//! range becomes `None`, and the caller carries on without a location.
//!
//! ```
//! use snapname_coords::{RawCoordinate, normalize};
//!
//! let raw = RawCoordinate::axes("41,2.2093320N", "23.8204W");
//! let coordinate = normalize(&raw).unwrap();
//! assert!((coordinate.latitude() - 41.036822).abs() < 1e-6);
//! assert_eq!(coordinate.longitude(), -23.8204);
//!
//! assert_eq!(normalize(&RawCoordinate::axes("91.0", "0.0")), None);
//! ```

mod axis;
mod coordinate;
pub mod error;
mod raw;

pub use crate::axis::{Axis, Hemisphere, parse_axis};
pub use crate::coordinate::Coordinate;
pub use crate::raw::{Dms, RawCoordinate};

/// Converts any supported raw encoding into a validated [`Coordinate`].
pub fn normalize(raw: &RawCoordinate) -> Option<Coordinate> {
    raw.normalize()
}
