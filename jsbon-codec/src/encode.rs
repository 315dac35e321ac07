//! JSBON encoder
//!
//! The encoder walks the value graph once, serializing into a payload
//! buffer while interning property names and string values. The header and
//! both interning tables are only assembled afterwards, once the tables are
//! complete, and prepended to the payload.
//!
//! Containers are registered in the identity map at the payload position of
//! their tag byte before the tag is written; a later occurrence of the same
//! container emits a back-edge to that position instead of a second copy.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use jsbon_format::checksum::compute_crc32;
use jsbon_format::constants::{
    EMPTY_STRING_INDEX, TAG_ARRAY, TAG_BYTES, TAG_DATE, TAG_FALSE, TAG_INT16, TAG_INT32, TAG_INT8,
    TAG_NULL, TAG_NUMBER, TAG_OBJECT, TAG_REF, TAG_STRING, TAG_TRUE, TAG_UNDEFINED,
};
use jsbon_format::varint::{to_count, write_count};
use jsbon_format::{ByteWriter, Header, JsbonError, Result};

use crate::value::{ArrayRef, ObjectRef, ToPlainObject, Value};

/// Options accepted by [`encode`]
#[derive(Debug, Clone, Default)]
pub struct EncodeOpts {
    /// Append a CRC32 of the payload to the header
    pub has_crc: bool,
}

/// Encode a value into a fresh byte buffer
pub fn encode(value: &Value, opts: &EncodeOpts) -> Result<Vec<u8>> {
    let mut encoder = Encoder::new();
    encoder.write_value(value)?;
    encoder.finish(opts)
}

/// First-seen-order string interning table
struct InternTable {
    index: HashMap<String, u32>,
    entries: Vec<String>,
}

impl InternTable {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// Intern `s`, assigning the next 0-based index if unseen
    fn intern(&mut self, s: &str) -> Result<u32> {
        if let Some(&index) = self.index.get(s) {
            return Ok(index);
        }
        let index = to_count(self.entries.len())?;
        self.index.insert(s.to_string(), index);
        self.entries.push(s.to_string());
        Ok(index)
    }
}

struct Encoder {
    payload: ByteWriter,
    names: InternTable,
    strings: InternTable,
    /// Container identity -> payload position of its tag byte
    seen: HashMap<usize, u32>,
    /// Containers whose body is still being emitted
    open: HashSet<usize>,
    has_cycle: bool,
}

impl Encoder {
    fn new() -> Self {
        Self {
            payload: ByteWriter::new(),
            names: InternTable::new(),
            strings: InternTable::new(),
            seen: HashMap::new(),
            open: HashSet::new(),
            has_cycle: false,
        }
    }

    fn write_value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Bool(false) => self.payload.put_u8(TAG_FALSE),
            Value::Bool(true) => self.payload.put_u8(TAG_TRUE),
            Value::Null => self.payload.put_u8(TAG_NULL),
            Value::Undefined => self.payload.put_u8(TAG_UNDEFINED),
            Value::Int(i) => self.write_int(*i),
            Value::Float(f) => self.write_float(*f),
            Value::String(s) => {
                self.payload.put_u8(TAG_STRING);
                let index = if s.is_empty() {
                    EMPTY_STRING_INDEX
                } else {
                    // the value table is 1-indexed on the wire
                    let index = self.strings.intern(s)?;
                    index
                        .checked_add(1)
                        .ok_or_else(|| JsbonError::InvalidCount("string table full".to_string()))?
                };
                write_count(&mut self.payload, index);
            }
            Value::Date(ms) => {
                self.payload.put_u8(TAG_DATE);
                self.payload.put_f64(*ms);
            }
            Value::Bytes(bytes) => {
                self.payload.put_u8(TAG_BYTES);
                write_count(&mut self.payload, to_count(bytes.len())?);
                self.payload.put_bytes(bytes);
            }
            Value::Array(arr) => self.write_array(arr)?,
            Value::Object(obj) => self.write_object(obj)?,
            Value::Custom(custom) => self.write_custom(custom)?,
        }
        Ok(())
    }

    /// Emit an integer through the narrowing ladder
    ///
    /// Values outside signed 32-bit range have no integer tag and fall
    /// through to the f64 representation.
    fn write_int(&mut self, value: i64) {
        if (i8::MIN as i64..=i8::MAX as i64).contains(&value) {
            self.payload.put_u8(TAG_INT8);
            self.payload.put_i8(value as i8);
        } else if (i16::MIN as i64..=i16::MAX as i64).contains(&value) {
            self.payload.put_u8(TAG_INT16);
            self.payload.put_i16(value as i16);
        } else if (i32::MIN as i64..=i32::MAX as i64).contains(&value) {
            self.payload.put_u8(TAG_INT32);
            self.payload.put_i32(value as i32);
        } else {
            self.payload.put_u8(TAG_NUMBER);
            self.payload.put_f64(value as f64);
        }
    }

    /// Tag selection is by mathematical value: an integral double in signed
    /// 32-bit range narrows exactly like an integer.
    fn write_float(&mut self, value: f64) {
        let integral = value.is_finite() && value == value.trunc();
        if integral && (i32::MIN as f64..=i32::MAX as f64).contains(&value) {
            self.write_int(value as i64);
        } else {
            self.payload.put_u8(TAG_NUMBER);
            self.payload.put_f64(value);
        }
    }

    fn write_array(&mut self, arr: &ArrayRef) -> Result<()> {
        let identity = arr.as_ptr() as usize;
        if let Some(&position) = self.seen.get(&identity) {
            self.write_ref(identity, position);
            return Ok(());
        }

        self.register(identity)?;
        self.payload.put_u8(TAG_ARRAY);

        let items = arr.borrow();
        write_count(&mut self.payload, to_count(items.len())?);
        for item in items.iter() {
            self.write_value(item)?;
        }
        drop(items);

        self.open.remove(&identity);
        Ok(())
    }

    fn write_object(&mut self, obj: &ObjectRef) -> Result<()> {
        let identity = obj.as_ptr() as usize;
        if let Some(&position) = self.seen.get(&identity) {
            self.write_ref(identity, position);
            return Ok(());
        }

        self.register(identity)?;
        self.payload.put_u8(TAG_OBJECT);
        self.write_object_body(obj)?;

        self.open.remove(&identity);
        Ok(())
    }

    /// A custom value serializes as the object its projection yields,
    /// registered under the custom value's own identity.
    fn write_custom(&mut self, custom: &Rc<dyn ToPlainObject>) -> Result<()> {
        let identity = Rc::as_ptr(custom) as *const () as usize;
        if let Some(&position) = self.seen.get(&identity) {
            self.write_ref(identity, position);
            return Ok(());
        }

        self.register(identity)?;
        self.payload.put_u8(TAG_OBJECT);
        let projected = custom.to_plain_object();
        self.write_object_body(&projected)?;

        self.open.remove(&identity);
        Ok(())
    }

    fn write_object_body(&mut self, obj: &ObjectRef) -> Result<()> {
        let map = obj.borrow();
        write_count(&mut self.payload, to_count(map.len())?);
        for (name, value) in map.iter() {
            let name_index = self.names.intern(name)?;
            write_count(&mut self.payload, name_index);
            self.write_value(value)?;
        }
        Ok(())
    }

    /// Record a container at the payload position its tag byte is about to
    /// occupy, and mark it open for cycle detection.
    fn register(&mut self, identity: usize) -> Result<()> {
        let position = to_count(self.payload.position())?;
        self.seen.insert(identity, position);
        self.open.insert(identity);
        Ok(())
    }

    /// Emit a back-edge. Only a back-edge into a still-open container closes
    /// a cycle; one into a completed container is acyclic sharing.
    fn write_ref(&mut self, identity: usize, position: u32) {
        if self.open.contains(&identity) {
            self.has_cycle = true;
        }
        self.payload.put_u8(TAG_REF);
        write_count(&mut self.payload, position);
    }

    /// Assemble header byte, optional CRC, and both interning tables, then
    /// append the payload.
    fn finish(self, opts: &EncodeOpts) -> Result<Vec<u8>> {
        let header = Header::new(opts.has_crc, !self.has_cycle);

        let mut out = ByteWriter::with_capacity(self.payload.position() + 64);
        out.put_u8(header.to_byte());
        if opts.has_crc {
            out.put_u32(compute_crc32(self.payload.as_slice()));
        }

        write_count(&mut out, to_count(self.names.entries.len())?);
        for name in &self.names.entries {
            out.put_cstr(name)?;
        }

        write_count(&mut out, to_count(self.strings.entries.len())?);
        for string in &self.strings.entries {
            out.put_cstr(string)?;
        }

        out.put_writer(&self.payload);
        Ok(out.into_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ObjectMap;

    fn encode_plain(value: &Value) -> Vec<u8> {
        encode(value, &EncodeOpts::default()).unwrap()
    }

    #[test]
    fn test_narrowest_tag_discipline() {
        let cases: Vec<(i64, u8)> = vec![
            (0, TAG_INT8),
            (127, TAG_INT8),
            (-128, TAG_INT8),
            (128, TAG_INT16),
            (-129, TAG_INT16),
            (32767, TAG_INT16),
            (-32768, TAG_INT16),
            (32768, TAG_INT32),
            (-32769, TAG_INT32),
            (i32::MAX as i64, TAG_INT32),
            (i32::MIN as i64, TAG_INT32),
            (i32::MAX as i64 + 1, TAG_NUMBER),
            (i32::MIN as i64 - 1, TAG_NUMBER),
        ];
        for (value, tag) in cases {
            let bytes = encode_plain(&Value::Int(value));
            // empty tables: payload starts at byte 3
            assert_eq!(bytes[3], tag, "tag for {}", value);
        }
    }

    #[test]
    fn test_integral_float_narrows() {
        let bytes = encode_plain(&Value::Float(12.0));
        assert_eq!(&bytes[3..], &[TAG_INT8, 12]);

        let bytes = encode_plain(&Value::Float(12.5));
        assert_eq!(bytes[3], TAG_NUMBER);

        // unsigned-32-only integers have no signed tag
        let bytes = encode_plain(&Value::Float(3_000_000_000.0));
        assert_eq!(bytes[3], TAG_NUMBER);
    }

    #[test]
    fn test_minus_one_payload() {
        let bytes = encode_plain(&Value::Int(-1));
        assert_eq!(&bytes[3..], &[TAG_INT8, 0xFF]);
    }

    #[test]
    fn test_string_interning_indices() {
        let arr = Value::array(vec![
            Value::from("x"),
            Value::from(""),
            Value::from("y"),
            Value::from("x"),
        ]);
        let bytes = encode_plain(&arr);
        // name table empty; value table holds "x" then "y"
        assert_eq!(bytes[1], 0x00);
        assert_eq!(&bytes[2..8], &[0x02, b'x', 0x00, b'y', 0x00, TAG_ARRAY]);
        // elements: "x"->1, ""->0, "y"->2, "x"->1
        assert_eq!(
            &bytes[8..],
            &[
                0x04, TAG_STRING, 0x01, TAG_STRING, 0x00, TAG_STRING, 0x02, TAG_STRING, 0x01
            ]
        );
    }

    #[test]
    fn test_shared_array_emits_backedge_without_cycle_flag() {
        let shared = ArrayRef::from_vec(vec![Value::from(1)]);
        let mut map = ObjectMap::new();
        map.insert("x", Value::Array(shared.clone()));
        map.insert("y", Value::Array(shared));
        let bytes = encode(&Value::object(map), &EncodeOpts::default()).unwrap();

        let header = Header::from_byte(bytes[0]).unwrap();
        assert!(header.no_cycle);
        assert!(bytes.contains(&TAG_REF));
    }

    #[test]
    fn test_self_referential_array_clears_nocycle() {
        let arr = ArrayRef::new();
        arr.push(Value::Array(arr.clone()));
        let bytes = encode(&Value::Array(arr), &EncodeOpts::default()).unwrap();

        let header = Header::from_byte(bytes[0]).unwrap();
        assert!(!header.no_cycle);
        // payload: tag at position 0, one element referencing position 0
        assert_eq!(&bytes[3..], &[TAG_ARRAY, 0x01, TAG_REF, 0x00]);
    }

    #[test]
    fn test_interior_nul_in_name_rejected() {
        let mut map = ObjectMap::new();
        map.insert("a\0b", Value::Null);
        assert!(matches!(
            encode(&Value::object(map), &EncodeOpts::default()),
            Err(JsbonError::UnsupportedType(_))
        ));
    }
}
