//! Field-level event validation.
//!
//! A [`Schema`] maps field names to [`Rule`]s. Validation checks every
//! declared field and reports all violations at once through
//! [`ValidationError`]. Fields the schema does not mention are left alone.

pub mod error;
pub mod rule;
pub mod schema;
pub mod types;

pub use error::{FieldViolation, ValidationError, Violation};
pub use rule::{AnyRule, BooleanRule, NumberRule, Rule, StringRule};
pub use schema::Schema;
