//! Filename templating.
//!
//! Turns capture metadata into a candidate filename using a user-configured
//! [upon] template. The syntax follows upon's Mustache-like conventions
//! (`{{ variable }}`, `{{ value|formatter }}`), extended with:
//!
//! - **`slug`**: lowercase, ASCII-only, hyphen-separated.
//! - **`pad`**: left-pads with zeros to a width, as `pad(sequence, 3)` or
//!   `{{ sequence|pad: 3 }}`.
//!
//! # Template Variables
//!
//! All variables are strings; date and time parts are empty when the file has
//! no capture timestamp, `city` is empty when no city was resolved.
//!
//! | Variable   | Example       | Description                                  |
//! |------------|---------------|----------------------------------------------|
//! | `year`     | `"2024"`      | Four-digit capture year                      |
//! | `month`    | `"06"`        | Two-digit capture month                      |
//! | `day`      | `"30"`        | Two-digit capture day                        |
//! | `hour`     | `"14"`        | Two-digit capture hour (24h)                 |
//! | `minute`   | `"32"`        | Two-digit capture minute                     |
//! | `second`   | `"55"`        | Two-digit capture second                     |
//! | `city`     | `"NeoPsihiko"`| Resolved city with whitespace removed        |
//! | `sequence` | `"7"`         | 1-based position of the file in the batch    |
//! | `original` | `"IMG_0042"`  | Original filename without extension          |
//! | `ext`      | `"jpg"`       | Original extension without the dot           |
//!
//! Empty tokens leave doubled separators behind (`2024--7`); these are
//! collapsed, and separators at either end are trimmed.
//!
//! # Example
//!
//! ```
//! use snapname_naming::{Fields, NameGenerator};
//! use time::macros::datetime;
//!
//! let generator: NameGenerator = "{{ year }}{{ month }}{{ day }}_{{ city }}_{{ sequence|pad: 3 }}".parse().unwrap();
//! let fields = Fields {
//!     captured_at: Some(datetime!(2024-06-30 14:32:55)),
//!     city: Some("Neo Psihiko"),
//!     sequence: 7,
//!     original: "IMG_0042",
//! };
//! assert_eq!(generator.generate_with_ext(&fields, "jpg").unwrap(), "20240630_NeoPsihiko_007.jpg");
//!
//! let without_city = Fields { city: None, ..fields };
//! assert_eq!(generator.generate_with_ext(&without_city, "jpg").unwrap(), "20240630_007.jpg");
//! ```

use crate::error::{Error, ErrorKind, Result};
use crate::filename::{collapse_separators, sanitize_token, split_extension, validate};
use exn::ResultExt;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::str::FromStr;
use time::PrimitiveDateTime;
use time::macros::datetime;
use tracing::instrument;
use upon::{Engine, Template};

/// `2024.06.30-14.32.55`
pub const DEFAULT_PATTERN: &str = "{{ year }}.{{ month }}.{{ day }}-{{ hour }}.{{ minute }}.{{ second }}";

/// Per-file values available to a template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fields<'a> {
    pub captured_at: Option<PrimitiveDateTime>,
    pub city: Option<&'a str>,
    pub sequence: usize,
    /// Original filename without its extension.
    pub original: &'a str,
}

/// Renders candidate filenames from [`Fields`] and a user-defined template.
///
/// Constructed via [`FromStr`], which compiles the template eagerly so that
/// syntax errors surface at creation time rather than at render time.
pub struct NameGenerator {
    engine: Engine<'static>,
    template: Template<'static>,
    pattern: String,
}
impl FromStr for NameGenerator {
    type Err = Error;

    /// Compiles the given pattern, returning [`ErrorKind::Template`] if its
    /// syntax is invalid.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut engine = Engine::new();
        addons::configure(&mut engine);
        let template = engine.compile(s.to_string()).or_raise(|| ErrorKind::Template)?;
        Ok(Self { engine, template, pattern: s.to_string() })
    }
}
impl Debug for NameGenerator {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("NameGenerator").field("pattern", &self.pattern).finish_non_exhaustive()
    }
}
impl NameGenerator {
    /// Compiles [`DEFAULT_PATTERN`].
    pub fn default_pattern() -> Result<Self> {
        DEFAULT_PATTERN.parse()
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Renders the template without any extension.
    ///
    /// Fails with [`ErrorKind::InvalidName`] if the result is empty or
    /// contains characters that cannot appear in a filename (the template
    /// text itself may contain a `/`, for instance).
    #[instrument(level = "trace", skip_all, fields(original = fields.original, sequence = fields.sequence))]
    pub fn generate(&self, fields: &Fields<'_>) -> Result<String> {
        self.render(fields, "")
    }

    /// Renders the template and appends `.ext`.
    ///
    /// The extension is trimmed of whitespace and dots, so `"jpg"` and
    /// `".jpg"` behave the same; an empty extension appends nothing.
    pub fn generate_with_ext(&self, fields: &Fields<'_>, ext: impl AsRef<str>) -> Result<String> {
        let ext = ext.as_ref().trim().trim_matches('.');
        let stem = self.render(fields, ext)?;
        let name = if ext.is_empty() { stem } else { format!("{stem}.{ext}") };
        validate(&name)?;
        Ok(name)
    }

    /// Renders the fixed sample used to preview a pattern: 2024-06-30
    /// 14:32:55 in "NeoPsihiko", first file of the batch, a `.jpg`.
    pub fn example(&self) -> Result<String> {
        let fields = Fields {
            captured_at: Some(datetime!(2024-06-30 14:32:55)),
            city: Some("NeoPsihiko"),
            sequence: 1,
            original: "IMG_0001",
        };
        self.generate_with_ext(&fields, "jpg")
    }

    fn render(&self, fields: &Fields<'_>, ext: &str) -> Result<String> {
        let rendered = self
            .template
            .render(&self.engine, Self::parameters(fields, ext))
            .to_string()
            .or_raise(|| ErrorKind::Template)?;
        let name = collapse_separators(&rendered);
        validate(&name)?;
        Ok(name)
    }

    /// Builds the [`upon::Value`] map exposed to the template engine.
    fn parameters(fields: &Fields<'_>, ext: &str) -> upon::Value {
        let part = |f: fn(&PrimitiveDateTime) -> u32, width: usize| {
            fields.captured_at.as_ref().map(|at| format!("{:0width$}", f(at))).unwrap_or_default()
        };
        upon::value! {
            year: part(|at| at.year().unsigned_abs(), 4),
            month: part(|at| u32::from(u8::from(at.month())), 2),
            day: part(|at| u32::from(at.day()), 2),
            hour: part(|at| u32::from(at.hour()), 2),
            minute: part(|at| u32::from(at.minute()), 2),
            second: part(|at| u32::from(at.second()), 2),
            city: fields.city.map(sanitize_token).unwrap_or_default(),
            sequence: fields.sequence.to_string(),
            original: split_extension(fields.original).0,
            ext: ext,
        }
    }
}

/// Custom [`upon`] extensions for filename-safe string manipulation.
mod addons {
    use rslug::slugify;
    use std::fmt::Write;
    use upon::{Engine, Value, fmt as upon_fmt};

    /// Converts strings to lowercase ASCII slugs; other values render as usual.
    fn slug_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
        match value {
            Value::String(s) => write!(f, "{}", slugify!(s))?,
            v => upon_fmt::default(f, v)?,
        };
        Ok(())
    }

    /// Left-pads with zeros up to `width` characters.
    fn pad(s: &str, width: usize) -> String {
        format!("{s:0>width$}")
    }

    /// Registers the `slug` formatter and `pad` function on the given engine.
    pub(crate) fn configure(engine: &mut Engine<'_>) {
        engine.add_formatter("slug", slug_formatter);
        engine.add_function("pad", pad);
    }
}
