//! Filename generation for media batches.
//!
//! Two steps turn metadata into final names:
//!
//! 1. [`NameGenerator`] renders a *candidate* name per file from a template.
//! 2. [`resolve`] makes the batch's candidates unique, both among themselves
//!    and against the names already in the target directory.

mod collision;
pub mod error;
mod filename;
mod template;

pub use crate::collision::{Outcome, Resolved, resolve};
pub use crate::filename::{split_extension, validate as validate_filename};
pub use crate::template::{DEFAULT_PATTERN, Fields, NameGenerator};
