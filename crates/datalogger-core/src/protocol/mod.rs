//! Protocol modules (ingest body + sink wire format).
//!
//! - Ingest: JSON batch bodies `{ "data": [ {metric, value, timestamp}, ... ] }`.
//!   Items are kept as raw JSON so the document store receives them verbatim.
//! - Plaintext: Graphite carbon lines `<path> <value> <seconds>\n`.
//!
//! Parsers are panic-free: malformed input is reported as `DataLoggerError`.

pub mod item;
pub mod plaintext;
