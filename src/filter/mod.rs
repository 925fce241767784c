//! Filter expression parsing and matching
//!
//! Queries are narrowed with typed filter expressions. Each expression names
//! the kind of object it tests, a comparison operator, and an operand; all
//! filters of a query must hold for a candidate to be kept.
//!
//! # Syntax
//!
//! ```text
//! <kind><operator><operand>
//! ```
//!
//! # Object kinds
//!
//! - `charm` / `c` - the charm behind an application
//! - `app` / `application` / `a` - application name
//! - `unit` / `u` - unit name
//! - `machine` / `m` - machine id
//! - `ip` / `address` / `i` - a machine IP address
//! - `hostname` / `host` / `h` - machine hostname
//!
//! Singular, plural, and one-letter forms are all accepted.
//!
//! # Operators
//!
//! - `=` - equals
//! - `!=` - not equals
//! - `~` - regex search
//! - `!~` - negated regex search
//!
//! # Examples
//!
//! ```text
//! app=nova-compute                        # Units of one application
//! hostname~ubun                           # Hostname contains "ubun"
//! charm!=ntp machine~^0/                  # Conjunction: both must hold
//! ```

pub mod error;
pub mod matcher;
pub mod parser;

pub use error::FilterParseError;
pub use parser::{Filter, FilterMode, ObjectKind, parse_filters};
