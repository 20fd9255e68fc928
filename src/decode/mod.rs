//! Response decoding.
//!
//! - [`Decoders`]: ordered content-type keys mapped to a [`DecodeStrategy`]
//! - [`ResponseDecoder`]: applies the mapping, or one of the fixed
//!   text/bytes/stream/empty conversions
//! - [`from_value`]: JSON deserialization with case-insensitive field names

mod decoder;
mod insensitive;
mod strategy;


pub use decoder::{DEFAULT_CONTENT_TYPE, ResponseDecoder};
pub use insensitive::from_value;
pub use strategy::{CustomDecoder, DecodeStrategy, Decoders, UnknownStrategy};
