//! AMF values as seen by codec dispatch
//!
//! Encoding and decoding AMF0/AMF3 belongs to the RTMP layer. This module only
//! carries the value shape that layer passes in for codec identification.

pub mod value;

pub use value::AmfValue;
