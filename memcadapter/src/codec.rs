//! Value encoding.
//!
//! A `Payload` is what reaches the server: encoded bytes plus the memcached
//! item flags describing how to read them back. Integers are always stored
//! as ASCII decimal so server side `incr`/`decr` keep working on them.

use crate::config::SerializeFormat;
use crate::error::{AdapterError, Result};
use bincode::Options;
use bytes::Bytes;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::de::{value::StrDeserializer, DeserializeOwned};
use serde::ser::{self, Impossible, Serialize, Serializer};
use std::fmt;
use std::io::{Read, Write};

pub const TYPE_MASK: u32 = 0x0f;
pub const TYPE_RAW: u32 = 0;
pub const TYPE_INTEGER: u32 = 1;
pub const TYPE_NATIVE: u32 = 2;
pub const TYPE_JSON: u32 = 3;
pub const TYPE_COMPACT: u32 = 4;
pub const FLAG_COMPRESSED: u32 = 0x10;

/// Encoded values smaller than this are never compressed
pub const COMPRESSION_THRESHOLD: usize = 2000;

/// Upper bound on an inflated or deserialized value
pub const MAX_DECODED_SIZE: u64 = 16 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub data: Bytes,
    pub flags: u32,
}

impl Payload {
    pub fn new(data: Bytes, flags: u32) -> Payload {
        Payload { data, flags }
    }

    pub fn is_compressed(&self) -> bool {
        self.flags & FLAG_COMPRESSED != 0
    }

    pub fn value_type(&self) -> u32 {
        self.flags & TYPE_MASK
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Codec {
    format: SerializeFormat,
    compress: bool,
}

impl Codec {
    pub fn new(format: SerializeFormat, compress: bool) -> Codec {
        Codec { format, compress }
    }

    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Payload> {
        if let Ok(integer) = value.serialize(IntegerProbe) {
            return Ok(Payload::new(
                Bytes::from(integer.to_string()),
                TYPE_INTEGER,
            ));
        }

        let (data, value_type) = match self.format {
            SerializeFormat::Native => (bincode::serialize(value).map_err(codec_error)?, TYPE_NATIVE),
            SerializeFormat::Json => (serde_json::to_vec(value).map_err(codec_error)?, TYPE_JSON),
            SerializeFormat::Compact => (
                bincode::DefaultOptions::new()
                    .serialize(value)
                    .map_err(codec_error)?,
                TYPE_COMPACT,
            ),
        };

        if self.compress && data.len() >= COMPRESSION_THRESHOLD {
            let compressed = compress(&data)?;
            return Ok(Payload::new(
                Bytes::from(compressed),
                value_type | FLAG_COMPRESSED,
            ));
        }
        Ok(Payload::new(Bytes::from(data), value_type))
    }

    /// Decodes according to the stored flags, whatever the current format is.
    pub fn decode<T: DeserializeOwned>(&self, payload: &Payload) -> Result<T> {
        let inflated;
        let data: &[u8] = if payload.is_compressed() {
            inflated = decompress(&payload.data)?;
            &inflated
        } else {
            &payload.data
        };

        match payload.value_type() {
            TYPE_INTEGER | TYPE_JSON => serde_json::from_slice(data).map_err(codec_error),
            TYPE_NATIVE => bincode::DefaultOptions::new()
                .with_fixint_encoding()
                .allow_trailing_bytes()
                .with_limit(MAX_DECODED_SIZE)
                .deserialize(data)
                .map_err(codec_error),
            TYPE_COMPACT => bincode::DefaultOptions::new()
                .with_limit(MAX_DECODED_SIZE)
                .deserialize(data)
                .map_err(codec_error),
            TYPE_RAW => {
                let text = std::str::from_utf8(data).map_err(codec_error)?;
                T::deserialize(StrDeserializer::<serde::de::value::Error>::new(text))
                    .map_err(codec_error)
            }
            other => Err(AdapterError::Codec(format!("unknown value type {other}"))),
        }
    }
}

fn codec_error<E: fmt::Display>(err: E) -> AdapterError {
    AdapterError::Codec(err.to_string())
}

fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), Compression::default());
    encoder.write_all(data).map_err(codec_error)?;
    encoder.finish().map_err(codec_error)
}

fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data).take(MAX_DECODED_SIZE + 1);
    let mut inflated = Vec::with_capacity(data.len() * 2);
    decoder.read_to_end(&mut inflated).map_err(codec_error)?;
    if inflated.len() as u64 > MAX_DECODED_SIZE {
        return Err(AdapterError::Codec(format!(
            "inflated value exceeds {MAX_DECODED_SIZE} bytes"
        )));
    }
    Ok(inflated)
}

#[derive(Debug)]
struct NotAnInteger;

impl fmt::Display for NotAnInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("not an integer")
    }
}

impl std::error::Error for NotAnInteger {}

impl ser::Error for NotAnInteger {
    fn custom<T: fmt::Display>(_msg: T) -> Self {
        NotAnInteger
    }
}

/// Serializer that only succeeds for integer values, newtypes and `Some` included.
struct IntegerProbe;

impl Serializer for IntegerProbe {
    type Ok = i128;
    type Error = NotAnInteger;
    type SerializeSeq = Impossible<i128, NotAnInteger>;
    type SerializeTuple = Impossible<i128, NotAnInteger>;
    type SerializeTupleStruct = Impossible<i128, NotAnInteger>;
    type SerializeTupleVariant = Impossible<i128, NotAnInteger>;
    type SerializeMap = Impossible<i128, NotAnInteger>;
    type SerializeStruct = Impossible<i128, NotAnInteger>;
    type SerializeStructVariant = Impossible<i128, NotAnInteger>;

    fn serialize_i8(self, v: i8) -> std::result::Result<i128, NotAnInteger> {
        Ok(v.into())
    }
    fn serialize_i16(self, v: i16) -> std::result::Result<i128, NotAnInteger> {
        Ok(v.into())
    }
    fn serialize_i32(self, v: i32) -> std::result::Result<i128, NotAnInteger> {
        Ok(v.into())
    }
    fn serialize_i64(self, v: i64) -> std::result::Result<i128, NotAnInteger> {
        Ok(v.into())
    }
    fn serialize_u8(self, v: u8) -> std::result::Result<i128, NotAnInteger> {
        Ok(v.into())
    }
    fn serialize_u16(self, v: u16) -> std::result::Result<i128, NotAnInteger> {
        Ok(v.into())
    }
    fn serialize_u32(self, v: u32) -> std::result::Result<i128, NotAnInteger> {
        Ok(v.into())
    }
    fn serialize_u64(self, v: u64) -> std::result::Result<i128, NotAnInteger> {
        Ok(v.into())
    }
    fn serialize_bool(self, _v: bool) -> std::result::Result<i128, NotAnInteger> {
        Err(NotAnInteger)
    }
    fn serialize_f32(self, _v: f32) -> std::result::Result<i128, NotAnInteger> {
        Err(NotAnInteger)
    }
    fn serialize_f64(self, _v: f64) -> std::result::Result<i128, NotAnInteger> {
        Err(NotAnInteger)
    }
    fn serialize_char(self, _v: char) -> std::result::Result<i128, NotAnInteger> {
        Err(NotAnInteger)
    }
    fn serialize_str(self, _v: &str) -> std::result::Result<i128, NotAnInteger> {
        Err(NotAnInteger)
    }
    fn serialize_bytes(self, _v: &[u8]) -> std::result::Result<i128, NotAnInteger> {
        Err(NotAnInteger)
    }
    fn serialize_none(self) -> std::result::Result<i128, NotAnInteger> {
        Err(NotAnInteger)
    }
    fn serialize_some<T: Serialize + ?Sized>(
        self,
        value: &T,
    ) -> std::result::Result<i128, NotAnInteger> {
        value.serialize(self)
    }
    fn serialize_unit(self) -> std::result::Result<i128, NotAnInteger> {
        Err(NotAnInteger)
    }
    fn serialize_unit_struct(self, _name: &'static str) -> std::result::Result<i128, NotAnInteger> {
        Err(NotAnInteger)
    }
    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> std::result::Result<i128, NotAnInteger> {
        Err(NotAnInteger)
    }
    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> std::result::Result<i128, NotAnInteger> {
        value.serialize(self)
    }
    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> std::result::Result<i128, NotAnInteger> {
        Err(NotAnInteger)
    }
    fn serialize_seq(
        self,
        _len: Option<usize>,
    ) -> std::result::Result<Self::SerializeSeq, NotAnInteger> {
        Err(NotAnInteger)
    }
    fn serialize_tuple(self, _len: usize) -> std::result::Result<Self::SerializeTuple, NotAnInteger> {
        Err(NotAnInteger)
    }
    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> std::result::Result<Self::SerializeTupleStruct, NotAnInteger> {
        Err(NotAnInteger)
    }
    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> std::result::Result<Self::SerializeTupleVariant, NotAnInteger> {
        Err(NotAnInteger)
    }
    fn serialize_map(
        self,
        _len: Option<usize>,
    ) -> std::result::Result<Self::SerializeMap, NotAnInteger> {
        Err(NotAnInteger)
    }
    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> std::result::Result<Self::SerializeStruct, NotAnInteger> {
        Err(NotAnInteger)
    }
    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> std::result::Result<Self::SerializeStructVariant, NotAnInteger> {
        Err(NotAnInteger)
    }
}
