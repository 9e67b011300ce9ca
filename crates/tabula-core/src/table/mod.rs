//! Header-aware tables.

mod append;
pub mod filter;
mod lookup;
mod ops;
mod state;

pub use append::Appendable;
pub use filter::{Condition, Operator, parse_triples};
pub use state::{DEFAULT_HEADER_ROWS, Table};
