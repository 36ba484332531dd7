//! Encoding into the External Term Format.
use byteorder::{BigEndian, WriteBytesExt};
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use serde::Serialize;
use std::io::Write;

use crate::bigint;
use crate::compression::{Compression, ZlibCompression, DEFAULT_LEVEL, MAX_LEVEL};
use crate::envelope;
use crate::decode::DEFAULT_MAX_DEPTH;
use crate::parts::{Export, Pid, Port, Reference};
use crate::ser;
use crate::tag::Tag;
use crate::term::Term;
use crate::{Error, Result};

/// How [`Term::Text`] is put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringPolicy {
    /// UTF-8 bytes in a binary.
    Binary,

    /// A list of integers, one per Unicode scalar value.
    CodepointList,

    /// UTF-8 bytes in the compact byte-string form when they fit, otherwise
    /// a list of small integers.
    ByteString,
}

/// Encoder configuration.
///
/// ```
/// use eetf_codec::{EncodeOptions, StringPolicy};
///
/// let options = EncodeOptions::new()
///     .string_policy(StringPolicy::ByteString)
///     .compressed(true);
/// assert_eq!(options.compression_level, 6);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    pub string_policy: StringPolicy,

    /// `0` disables compression; `1..=9` enables it.
    pub compression_level: u8,

    /// Deepest nesting accepted; matches the decoder's default so that
    /// everything encoded can be decoded back.
    pub max_depth: usize,
}
impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn string_policy(mut self, policy: StringPolicy) -> Self {
        self.string_policy = policy;
        self
    }

    /// Sets the compression level; levels above 9 are treated as 9.
    pub fn compression_level(mut self, level: u8) -> Self {
        self.compression_level = level.min(MAX_LEVEL);
        self
    }

    /// Enables compression at the default level, or disables it.
    pub fn compressed(self, enabled: bool) -> Self {
        self.compression_level(if enabled { DEFAULT_LEVEL } else { 0 })
    }
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}
impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            string_policy: StringPolicy::Binary,
            compression_level: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// A term encoder.
#[derive(Debug, Clone)]
pub struct Encoder<C = ZlibCompression> {
    options: EncodeOptions,
    compression: C,
}
impl Encoder {
    pub fn new() -> Self {
        Self::with_options(EncodeOptions::default())
    }
    pub fn with_options(options: EncodeOptions) -> Self {
        Self::with_compression(options, ZlibCompression)
    }
}
impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}
impl<C: Compression> Encoder<C> {
    pub fn with_compression(options: EncodeOptions, compression: C) -> Self {
        Encoder {
            options,
            compression,
        }
    }

    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    /// Encodes `term`, including the version header.
    pub fn encode(&self, term: &Term) -> Result<Vec<u8>> {
        let mut payload = Vec::new();
        self.encode_term(&mut payload, term, 0)?;
        trace!("Encoded {} into {} bytes", term.kind(), payload.len());
        envelope::seal(&self.compression, &payload, self.options.compression_level)
    }

    /// Encodes any serializable value by mapping its shape onto a term.
    ///
    /// See [`to_term`](crate::to_term) for the mapping.
    pub fn encode_value<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        let term = ser::to_term(value)?;
        self.encode(&term)
    }

    pub fn encode_to_writer<W: Write>(&self, term: &Term, mut writer: W) -> Result<()> {
        let buf = self.encode(term)?;
        writer.write_all(&buf)?;
        Ok(())
    }

    fn encode_term(&self, buf: &mut Vec<u8>, term: &Term, depth: usize) -> Result<()> {
        if depth > self.options.max_depth {
            return Err(Error::DepthLimitExceeded {
                limit: self.options.max_depth,
            });
        }
        match *term {
            Term::Tuple(ref elements) => {
                if elements.len() <= usize::from(u8::MAX) {
                    buf.write_u8(Tag::SmallTuple.as_u8())?;
                    buf.write_u8(elements.len() as u8)?;
                } else {
                    buf.write_u8(Tag::LargeTuple.as_u8())?;
                    buf.write_u32::<BigEndian>(len_u32("tuple", elements.len())?)?;
                }
                for e in elements {
                    self.encode_term(buf, e, depth + 1)?;
                }
                Ok(())
            }
            Term::Map(ref map) => {
                buf.write_u8(Tag::Map.as_u8())?;
                buf.write_u32::<BigEndian>(len_u32("map", map.len())?)?;
                for (k, v) in map {
                    self.encode_term(buf, k, depth + 1)?;
                    self.encode_term(buf, v, depth + 1)?;
                }
                Ok(())
            }
            Term::List(ref elements) if !elements.is_empty() => {
                buf.write_u8(Tag::List.as_u8())?;
                buf.write_u32::<BigEndian>(len_u32("list", elements.len())?)?;
                for e in elements {
                    self.encode_term(buf, e, depth + 1)?;
                }
                encode_nil(buf)
            }
            Term::None => encode_atom(buf, "none"),
            Term::Boolean(true) => encode_atom(buf, "true"),
            Term::Boolean(false) => encode_atom(buf, "false"),
            Term::SmallInt(v) => {
                buf.write_u8(Tag::SmallInteger.as_u8())?;
                buf.write_u8(v)?;
                Ok(())
            }
            Term::Int(v) => encode_integer(buf, &BigInt::from(v)),
            Term::BigInt(ref v) => encode_integer(buf, v),
            Term::Float(f) => encode_float(buf, f.0),
            Term::Atom(ref a) => encode_atom(buf, &a.name),
            Term::Nil | Term::List(_) => encode_nil(buf),
            Term::ByteString(ref bytes) => encode_byte_string(buf, bytes),
            Term::Binary(ref bytes) => encode_binary(buf, bytes),
            Term::Text(ref s) => match self.options.string_policy {
                StringPolicy::Binary => encode_binary(buf, s.as_bytes()),
                StringPolicy::CodepointList => encode_codepoints(buf, s),
                StringPolicy::ByteString => encode_byte_string(buf, s.as_bytes()),
            },
            Term::Pid(ref pid) => encode_pid(buf, pid),
            Term::Port(ref port) => encode_port(buf, port),
            Term::Reference(ref reference) => encode_reference(buf, reference),
            Term::Export(ref export) => encode_export(buf, export),
        }
    }
}

// The leaf encoders below are kept out of line so that the recursive
// `encode_term` frames stay small.

#[inline(never)]
fn encode_float(buf: &mut Vec<u8>, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::unsupported_value(format_args!(
            "float {} has no Erlang representation",
            value
        )));
    }
    buf.write_u8(Tag::NewFloat.as_u8())?;
    buf.write_f64::<BigEndian>(value)?;
    Ok(())
}

#[inline(never)]
fn encode_pid(buf: &mut Vec<u8>, pid: &Pid) -> Result<()> {
    buf.write_u8(Tag::Pid.as_u8())?;
    encode_atom(buf, &pid.node.name)?;
    buf.write_u32::<BigEndian>(pid.id)?;
    buf.write_u32::<BigEndian>(pid.serial)?;
    buf.write_u8(pid.creation)?;
    Ok(())
}

#[inline(never)]
fn encode_port(buf: &mut Vec<u8>, port: &Port) -> Result<()> {
    buf.write_u8(Tag::Port.as_u8())?;
    encode_atom(buf, &port.node.name)?;
    buf.write_u32::<BigEndian>(port.id)?;
    buf.write_u8(port.creation)?;
    Ok(())
}

#[inline(never)]
fn encode_reference(buf: &mut Vec<u8>, reference: &Reference) -> Result<()> {
    if reference.ids.len() > Reference::MAX_IDS {
        return Err(Error::unsupported_value(format_args!(
            "reference {} has more than {} ids",
            reference,
            Reference::MAX_IDS
        )));
    }
    buf.write_u8(Tag::NewReference.as_u8())?;
    buf.write_u16::<BigEndian>(reference.ids.len() as u16)?;
    encode_atom(buf, &reference.node.name)?;
    buf.write_u8(reference.creation)?;
    for &id in &reference.ids {
        buf.write_u32::<BigEndian>(id)?;
    }
    Ok(())
}

#[inline(never)]
fn encode_export(buf: &mut Vec<u8>, export: &Export) -> Result<()> {
    buf.write_u8(Tag::Export.as_u8())?;
    encode_atom(buf, &export.module.name)?;
    encode_atom(buf, &export.function.name)?;
    buf.write_u8(Tag::SmallInteger.as_u8())?;
    buf.write_u8(export.arity)?;
    Ok(())
}

fn len_u32(what: &'static str, len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::Overflow { what, len })
}

fn encode_integer(buf: &mut Vec<u8>, value: &BigInt) -> Result<()> {
    if let Some(v) = value.to_u8() {
        buf.write_u8(Tag::SmallInteger.as_u8())?;
        buf.write_u8(v)?;
    } else if let Some(v) = value.to_i32() {
        buf.write_u8(Tag::Integer.as_u8())?;
        buf.write_i32::<BigEndian>(v)?;
    } else {
        let (sign, magnitude) = bigint::encode(value);
        let tag = bigint::tag_for_len(magnitude.len())?;
        buf.write_u8(tag.as_u8())?;
        if tag == Tag::SmallBig {
            buf.write_u8(magnitude.len() as u8)?;
        } else {
            buf.write_u32::<BigEndian>(magnitude.len() as u32)?;
        }
        buf.write_u8(sign)?;
        buf.write_all(&magnitude)?;
    }
    Ok(())
}

fn encode_atom(buf: &mut Vec<u8>, name: &str) -> Result<()> {
    let bytes = name.as_bytes();
    if bytes.len() <= usize::from(u8::MAX) {
        buf.write_u8(Tag::SmallAtomUtf8.as_u8())?;
        buf.write_u8(bytes.len() as u8)?;
    } else if bytes.len() <= usize::from(u16::MAX) {
        buf.write_u8(Tag::AtomUtf8.as_u8())?;
        buf.write_u16::<BigEndian>(bytes.len() as u16)?;
    } else {
        return Err(Error::Overflow {
            what: "atom",
            len: bytes.len(),
        });
    }
    buf.write_all(bytes)?;
    Ok(())
}

fn encode_nil(buf: &mut Vec<u8>) -> Result<()> {
    buf.write_u8(Tag::Nil.as_u8())?;
    Ok(())
}

fn encode_binary(buf: &mut Vec<u8>, bytes: &[u8]) -> Result<()> {
    buf.write_u8(Tag::Binary.as_u8())?;
    buf.write_u32::<BigEndian>(len_u32("binary", bytes.len())?)?;
    buf.write_all(bytes)?;
    Ok(())
}

fn encode_byte_string(buf: &mut Vec<u8>, bytes: &[u8]) -> Result<()> {
    if bytes.is_empty() {
        encode_nil(buf)
    } else if bytes.len() <= usize::from(u16::MAX) {
        buf.write_u8(Tag::String.as_u8())?;
        buf.write_u16::<BigEndian>(bytes.len() as u16)?;
        buf.write_all(bytes)?;
        Ok(())
    } else {
        buf.write_u8(Tag::List.as_u8())?;
        buf.write_u32::<BigEndian>(len_u32("list", bytes.len())?)?;
        for &b in bytes {
            buf.write_u8(Tag::SmallInteger.as_u8())?;
            buf.write_u8(b)?;
        }
        encode_nil(buf)
    }
}

fn encode_codepoints(buf: &mut Vec<u8>, text: &str) -> Result<()> {
    let count = text.chars().count();
    if count == 0 {
        return encode_nil(buf);
    }
    buf.write_u8(Tag::List.as_u8())?;
    buf.write_u32::<BigEndian>(len_u32("list", count)?)?;
    for c in text.chars() {
        buf.write_u8(Tag::Integer.as_u8())?;
        buf.write_u32::<BigEndian>(u32::from(c))?;
    }
    encode_nil(buf)
}
