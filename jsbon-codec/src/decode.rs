//! JSBON decoder
//!
//! The decoder reads the header byte, both interning tables, and then
//! recursively materializes the single top-level value. Containers are
//! registered in the reference map at the payload position of their tag
//! byte before their body is read, so a back-edge appearing inside a
//! container's own body resolves to the container being built and
//! reconstructs the cycle.
//!
//! Reference bookkeeping is kept even when the NOCYCLE hint is set:
//! shared-but-acyclic duplicates still travel as back-edges.

use std::collections::HashMap;

use jsbon_format::checksum::verify_crc32;
use jsbon_format::constants::EMPTY_STRING_INDEX;
use jsbon_format::varint::{read_count, to_count};
use jsbon_format::{ByteReader, Header, JsbonError, Limits, Result, TypeTag};

use crate::value::{ArrayRef, ObjectRef, Value};

/// Decode a single value from `bytes` with default limits
pub fn decode(bytes: &[u8]) -> Result<Value> {
    decode_with_limits(bytes, &Limits::default())
}

/// Decode a single value from `bytes`, bounding work by `limits`
pub fn decode_with_limits(bytes: &[u8], limits: &Limits) -> Result<Value> {
    if bytes.is_empty() {
        return Err(JsbonError::InvalidData("empty input".to_string()));
    }
    let mut decoder = Decoder {
        reader: ByteReader::new(bytes),
        limits,
        names: Vec::new(),
        strings: Vec::new(),
        offset: 0,
        refs: HashMap::new(),
    };
    decoder.run()
}

struct Decoder<'a, 'l> {
    reader: ByteReader<'a>,
    limits: &'l Limits,
    names: Vec<String>,
    strings: Vec<String>,
    /// First byte after the tables; the base for reference resolution
    offset: usize,
    /// Payload-coordinate tag position -> materialized container
    refs: HashMap<u32, Value>,
}

impl<'a, 'l> Decoder<'a, 'l> {
    fn run(&mut self) -> Result<Value> {
        let header = Header::from_byte(self.reader.get_u8()?)?;
        let saved_crc = if header.has_crc {
            Some(self.reader.get_u32()?)
        } else {
            None
        };

        self.names = self.read_table(self.limits.max_names, "name")?;
        self.strings = self.read_table(self.limits.max_strings, "string")?;
        self.offset = self.reader.position();

        if let Some(expected) = saved_crc {
            verify_crc32(self.reader.remaining_slice(), expected)?;
        }

        self.read_value(0)
    }

    fn read_table(&mut self, max: usize, what: &str) -> Result<Vec<String>> {
        let count = read_count(&mut self.reader)? as usize;
        if count > max {
            return Err(JsbonError::LimitExceeded(format!(
                "{} table claims {} entries, limit is {}",
                what, count, max
            )));
        }
        // every entry occupies at least its NUL terminator
        if count > self.reader.remaining() {
            return Err(JsbonError::Truncated);
        }

        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let s = self.reader.get_cstr()?;
            if s.len() > self.limits.max_string_len {
                return Err(JsbonError::LimitExceeded(format!(
                    "{} table entry of {} bytes, limit is {}",
                    what,
                    s.len(),
                    self.limits.max_string_len
                )));
            }
            entries.push(s.to_string());
        }
        Ok(entries)
    }

    fn read_value(&mut self, depth: usize) -> Result<Value> {
        if depth >= self.limits.max_depth {
            return Err(JsbonError::LimitExceeded(format!(
                "nesting exceeds {} levels",
                self.limits.max_depth
            )));
        }

        let tag_position = self.reader.position();
        let tag = TypeTag::from_u8(self.reader.get_u8()?)?;

        match tag {
            TypeTag::False => Ok(Value::Bool(false)),
            TypeTag::True => Ok(Value::Bool(true)),
            TypeTag::Null => Ok(Value::Null),
            TypeTag::Undefined => Ok(Value::Undefined),
            TypeTag::Int8 => Ok(Value::Int(self.reader.get_i8()? as i64)),
            TypeTag::Int16 => Ok(Value::Int(self.reader.get_i16()? as i64)),
            TypeTag::Int32 => Ok(Value::Int(self.reader.get_i32()? as i64)),
            TypeTag::Uint8 => Ok(Value::Int(self.reader.get_u8()? as i64)),
            TypeTag::Uint16 => Ok(Value::Int(self.reader.get_u16()? as i64)),
            TypeTag::Uint32 => Ok(Value::Int(self.reader.get_u32()? as i64)),
            TypeTag::Number => Ok(Value::Float(self.reader.get_f64()?)),
            TypeTag::Date => Ok(Value::Date(self.reader.get_f64()?)),
            TypeTag::String => {
                let index = read_count(&mut self.reader)?;
                if index == EMPTY_STRING_INDEX {
                    return Ok(Value::String(String::new()));
                }
                // the value table is 1-indexed on the wire
                let entry = self
                    .strings
                    .get(index as usize - 1)
                    .ok_or(JsbonError::OutOfBoundsReference(index))?;
                Ok(Value::String(entry.clone()))
            }
            TypeTag::Bytes => {
                let len = read_count(&mut self.reader)? as usize;
                if len > self.limits.max_bytes_len {
                    return Err(JsbonError::LimitExceeded(format!(
                        "byte buffer claims {} bytes, limit is {}",
                        len, self.limits.max_bytes_len
                    )));
                }
                Ok(Value::Bytes(self.reader.get_bytes(len)?.to_vec()))
            }
            TypeTag::Object => {
                let obj = ObjectRef::new();
                self.register(tag_position, Value::Object(obj.clone()))?;

                let count = read_count(&mut self.reader)? as usize;
                // a property is at least a name index and a tag byte
                if count > self.reader.remaining() {
                    return Err(JsbonError::Truncated);
                }
                for _ in 0..count {
                    let name_index = read_count(&mut self.reader)?;
                    let name = self
                        .names
                        .get(name_index as usize)
                        .ok_or(JsbonError::OutOfBoundsReference(name_index))?
                        .clone();
                    let value = self.read_value(depth + 1)?;
                    obj.insert(name, value);
                }
                Ok(Value::Object(obj))
            }
            TypeTag::Array => {
                let arr = ArrayRef::new();
                self.register(tag_position, Value::Array(arr.clone()))?;

                let len = read_count(&mut self.reader)? as usize;
                // an element is at least a tag byte
                if len > self.reader.remaining() {
                    return Err(JsbonError::Truncated);
                }
                for _ in 0..len {
                    arr.push(self.read_value(depth + 1)?);
                }
                Ok(Value::Array(arr))
            }
            TypeTag::Ref => {
                let position = read_count(&mut self.reader)?;
                self.refs
                    .get(&position)
                    .cloned()
                    .ok_or(JsbonError::OutOfBoundsReference(position))
            }
        }
    }

    /// Register a freshly allocated container under the payload coordinate
    /// of its tag byte, before its body is read.
    fn register(&mut self, tag_position: usize, value: Value) -> Result<()> {
        let payload_position = to_count(tag_position - self.offset)?;
        self.refs.insert(payload_position, value);
        Ok(())
    }
}
