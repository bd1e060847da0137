//! Text-format cell decoders.
//!
//! PostgreSQL returns every cell of a text-protocol result as a string.
//! These helpers turn those strings into Rust values with the lenient,
//! never-failing semantics the cursor getters need.
//!
//! | Value kind | Module |
//! |------------|--------|
//! | integers, OIDs, floats, booleans | `number` |
//! | date, timestamp | `date` |

mod date;
mod number;

pub use date::{decode_date, decode_datetime};
pub use number::{decode_bool, decode_f64, decode_i64, decode_oid, decode_u64};
