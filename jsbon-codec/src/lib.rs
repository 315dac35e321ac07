//! JSBON Codec - Encoder/decoder engine
//!
//! JSBON is a self-describing binary codec for structured values: a compact
//! bit-exact format preserving primitive types, dates, raw byte buffers,
//! nested containers, and shared or cyclic object identity across a round
//! trip.
//!
//! ```
//! use jsbon_codec::{decode, encode, EncodeOpts, Value};
//!
//! let bytes = encode(&Value::from("hello"), &EncodeOpts::default()).unwrap();
//! assert_eq!(decode(&bytes).unwrap(), Value::from("hello"));
//! ```
//!
//! Shared containers keep their identity:
//!
//! ```
//! use jsbon_codec::{decode, encode, ArrayRef, EncodeOpts, ObjectMap, Value};
//!
//! let shared = ArrayRef::from_vec(vec![Value::from(1), Value::from(2)]);
//! let mut map = ObjectMap::new();
//! map.insert("x", Value::Array(shared.clone()));
//! map.insert("y", Value::Array(shared));
//!
//! let bytes = encode(&Value::object(map), &EncodeOpts::default()).unwrap();
//! let decoded = decode(&bytes).unwrap();
//! let obj = decoded.as_object().unwrap();
//! let x = obj.get("x").unwrap();
//! let y = obj.get("y").unwrap();
//! assert!(x.as_array().unwrap().ptr_eq(y.as_array().unwrap()));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod decode;
pub mod encode;
pub mod value;

// Re-export commonly used types
pub use jsbon_format::{Header, JsbonError, Limits, Result, TypeTag};

// Re-export our own types
pub use decode::{decode, decode_with_limits};
pub use encode::{encode, EncodeOpts};
pub use value::{ArrayRef, ObjectMap, ObjectRef, ToPlainObject, Value};
