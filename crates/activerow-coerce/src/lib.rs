//! Coercion and validation engine for ActiveRow.
//!
//! Pure, stateless functions over `activerow-core` values:
//!
//! - [`Coercer::normalize`]: deterministic, total coercion of raw input into
//!   a column type's canonical value. Never fails: junk numerics truncate
//!   toward zero, junk temporals land on the epoch floor.
//! - [`validate_type`]: structural fitness checks reported as symbolic
//!   [`ErrorCode`](activerow_core::ErrorCode)s, independent of normalize;
//!   the `for_condition` flag relaxes checks for query-predicate values.
//! - [`format_value`]: named alternate representations per type
//!   (timestamp -> date/time/unix_ts and friends).
//! - [`MessageResolver`]: the swappable code-to-message lookup that keeps
//!   wording out of the engine.
//!
//! The record layer (`activerow-record`) drives these from its value
//! containers; nothing here holds state beyond the coercer's base instant
//! for relative date expressions.

pub mod datetime;
pub mod format;
pub mod messages;
pub mod normalize;
pub mod validate;

pub use format::format_value;
pub use messages::{DefaultMessages, MessageResolver, describe};
pub use normalize::Coercer;
pub use validate::validate_type;
