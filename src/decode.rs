//! Decoding of the External Term Format.
use std::collections::BTreeMap;
use std::io::Read;
use std::str;

use crate::bigint;
use crate::compression::{Compression, ZlibCompression};
use crate::envelope::{self, Header};
use crate::parts::{Atom, Export, Pid, Port, Reference};
use crate::reader::Reader;
use crate::tag::{Tag, TagSet};
use crate::term::Term;
use crate::{Error, Result};

/// The nesting depth allowed by default.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// How atom text, and byte strings decoded as [`ByteStrings::Text`], are
/// interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextCharset {
    /// Latin-1 for the legacy atom tags, UTF-8 for the others and for byte
    /// strings.
    PerTag,
    Latin1,
    Utf8,
}

/// How a compact byte string (`STRING_EXT`) is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteStrings {
    /// As [`Term::ByteString`].
    Raw,

    /// As a list of [`Term::SmallInt`].
    Expand,

    /// As [`Term::Text`] decoded with the configured [`TextCharset`].
    ///
    /// Bytes that are not valid in that charset fall back to the
    /// [`ByteStrings::Expand`] form.
    Text,
}

/// Decoder configuration.
///
/// ```
/// use eetf_codec::{ByteStrings, DecodeOptions, Decoder, TextCharset};
///
/// let options = DecodeOptions::new()
///     .text_charset(TextCharset::Utf8)
///     .byte_strings(ByteStrings::Expand);
/// let decoder = Decoder::with_options(options);
/// assert_eq!(decoder.options().max_depth, 128);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    pub text_charset: TextCharset,
    pub byte_strings: ByteStrings,
    pub tag_set: TagSet,
    pub max_depth: usize,
}
impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn text_charset(mut self, charset: TextCharset) -> Self {
        self.text_charset = charset;
        self
    }
    pub fn byte_strings(mut self, repr: ByteStrings) -> Self {
        self.byte_strings = repr;
        self
    }
    pub fn tag_set(mut self, tag_set: TagSet) -> Self {
        self.tag_set = tag_set;
        self
    }
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}
impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            text_charset: TextCharset::PerTag,
            byte_strings: ByteStrings::Raw,
            tag_set: TagSet::Any,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// A term decoder.
///
/// The decoder holds only configuration; every call works on its own cursor.
#[derive(Debug, Clone)]
pub struct Decoder<C = ZlibCompression> {
    options: DecodeOptions,
    compression: C,
}
impl Decoder {
    pub fn new() -> Self {
        Self::with_options(DecodeOptions::default())
    }
    pub fn with_options(options: DecodeOptions) -> Self {
        Self::with_compression(options, ZlibCompression)
    }
}
impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}
impl<C: Compression> Decoder<C> {
    pub fn with_compression(options: DecodeOptions, compression: C) -> Self {
        Decoder {
            options,
            compression,
        }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decodes one term. Bytes following the term are ignored.
    pub fn decode(&self, bytes: &[u8]) -> Result<Term> {
        self.decode_prefix(bytes).map(|(term, _)| term)
    }

    /// Decodes one term and returns it with the number of bytes it occupied.
    pub fn decode_prefix(&self, bytes: &[u8]) -> Result<(Term, usize)> {
        let mut reader = Reader::new(bytes);
        match Header::decode(&mut reader)? {
            Header::Plain => {
                let term = self.decode_term(&mut reader, 0)?;
                Ok((term, reader.offset()))
            }
            Header::Compressed { uncompressed_size } => {
                let data = reader.read_rest();
                let payload = envelope::open(&self.compression, data, uncompressed_size)?;
                let term = self.decode_term(&mut Reader::new(&payload), 0)?;
                Ok((term, bytes.len()))
            }
        }
    }

    /// Reads `reader` to its end and decodes the term it holds.
    pub fn decode_from_reader<R: Read>(&self, mut reader: R) -> Result<Term> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        self.decode(&buf)
    }

    fn lookup_tag(&self, byte: u8) -> Result<Tag> {
        match Tag::from_u8(byte) {
            Some(tag) if self.options.tag_set.allows(tag) => Ok(tag),
            tag => {
                debug!("Rejecting tag {} ({:?})", byte, tag);
                Err(Error::UnsupportedTag { tag: byte })
            }
        }
    }

    fn decode_term(&self, reader: &mut Reader, depth: usize) -> Result<Term> {
        if depth > self.options.max_depth {
            return Err(Error::DepthLimitExceeded {
                limit: self.options.max_depth,
            });
        }
        let tag = self.lookup_tag(reader.read_u8()?)?;
        match tag {
            Tag::SmallTuple => {
                let arity = usize::from(reader.read_u8()?);
                self.decode_elements(reader, arity, depth).map(Term::Tuple)
            }
            Tag::LargeTuple => {
                let arity = reader.read_u32()? as usize;
                self.decode_elements(reader, arity, depth).map(Term::Tuple)
            }
            Tag::Map => self.decode_map(reader, depth),
            Tag::List => self.decode_list(reader, depth),
            Tag::Reference | Tag::NewReference | Tag::Port | Tag::Pid | Tag::Export => {
                self.decode_handle(tag, reader)
            }
            _ => self.decode_scalar(tag, reader),
        }
    }

    // Kept out of line so that the recursive frames stay small.
    #[inline(never)]
    fn decode_scalar(&self, tag: Tag, reader: &mut Reader) -> Result<Term> {
        match tag {
            Tag::SmallInteger => Ok(Term::SmallInt(reader.read_u8()?)),
            Tag::Integer => Ok(Term::Int(reader.read_i32()?)),
            Tag::Float => decode_legacy_float(reader).map(Term::from),
            Tag::NewFloat => Ok(Term::from(reader.read_f64()?)),
            Tag::Atom | Tag::SmallAtom | Tag::AtomUtf8 | Tag::SmallAtomUtf8 => {
                self.decode_atom_text(tag, reader).map(Term::atom)
            }
            Tag::Nil => Ok(Term::Nil),
            Tag::String => {
                let len = usize::from(reader.read_u16()?);
                let bytes = reader.read_bytes(len)?;
                Ok(self.decode_byte_string(bytes))
            }
            Tag::Binary => {
                let len = reader.read_u32()? as usize;
                Ok(Term::Binary(reader.read_bytes(len)?.to_vec()))
            }
            Tag::SmallBig => {
                let len = usize::from(reader.read_u8()?);
                decode_big(reader, len)
            }
            Tag::LargeBig => {
                let len = reader.read_u32()? as usize;
                decode_big(reader, len)
            }
            _ => Err(Error::UnsupportedTag { tag: tag.as_u8() }),
        }
    }

    #[inline(never)]
    fn decode_handle(&self, tag: Tag, reader: &mut Reader) -> Result<Term> {
        match tag {
            Tag::Reference => {
                let node = self.decode_embedded_atom(reader)?;
                reader.ensure(5)?;
                let id = reader.read_u32()?;
                let creation = reader.read_u8()?;
                Ok(Term::Reference(Reference {
                    node,
                    ids: vec![id],
                    creation,
                }))
            }
            Tag::NewReference => {
                let count = usize::from(reader.read_u16()?);
                let node = self.decode_embedded_atom(reader)?;
                reader.ensure(1 + count * 4)?;
                let creation = reader.read_u8()?;
                let mut ids = Vec::with_capacity(count);
                for _ in 0..count {
                    ids.push(reader.read_u32()?);
                }
                Ok(Term::Reference(Reference {
                    node,
                    ids,
                    creation,
                }))
            }
            Tag::Port => {
                let node = self.decode_embedded_atom(reader)?;
                reader.ensure(5)?;
                Ok(Term::Port(Port {
                    node,
                    id: reader.read_u32()?,
                    creation: reader.read_u8()?,
                }))
            }
            Tag::Pid => {
                let node = self.decode_embedded_atom(reader)?;
                reader.ensure(9)?;
                Ok(Term::Pid(Pid {
                    node,
                    id: reader.read_u32()?,
                    serial: reader.read_u32()?,
                    creation: reader.read_u8()?,
                }))
            }
            Tag::Export => {
                let module = self.decode_embedded_atom(reader)?;
                let function = self.decode_embedded_atom(reader)?;
                let tag = reader.read_u8()?;
                if tag != Tag::SmallInteger.as_u8() {
                    return Err(Error::UnexpectedTag {
                        tag,
                        expected: "small integer",
                    });
                }
                Ok(Term::Export(Export {
                    module,
                    function,
                    arity: reader.read_u8()?,
                }))
            }
            _ => Err(Error::UnsupportedTag { tag: tag.as_u8() }),
        }
    }

    fn decode_map(&self, reader: &mut Reader, depth: usize) -> Result<Term> {
        let count = reader.read_u32()?;
        let mut map = BTreeMap::new();
        for _ in 0..count {
            let key = self.decode_term(reader, depth + 1)?;
            let value = self.decode_term(reader, depth + 1)?;
            map.insert(key, value);
        }
        Ok(Term::Map(map))
    }

    fn decode_list(&self, reader: &mut Reader, depth: usize) -> Result<Term> {
        let count = reader.read_u32()? as usize;
        let elements = self.decode_elements(reader, count, depth)?;
        let tail_tag = reader.peek_u8();
        let tail = self.decode_term(reader, depth + 1)?;
        if tail != Term::Nil {
            return Err(Error::ImproperListUnsupported {
                tail_tag: tail_tag.unwrap_or_default(),
            });
        }
        Ok(Term::list(elements))
    }

    fn decode_byte_string(&self, bytes: &[u8]) -> Term {
        let expand = || Term::list(bytes.iter().map(|&b| Term::SmallInt(b)).collect());
        match self.options.byte_strings {
            ByteStrings::Raw => Term::ByteString(bytes.to_vec()),
            ByteStrings::Expand => expand(),
            ByteStrings::Text => match self.options.text_charset {
                TextCharset::Latin1 => {
                    Term::Text(bytes.iter().map(|&b| char::from(b)).collect())
                }
                TextCharset::PerTag | TextCharset::Utf8 => match str::from_utf8(bytes) {
                    Ok(s) => Term::Text(s.to_owned()),
                    Err(_) => {
                        debug!("Byte string is not valid UTF-8; decoding it as a list");
                        expand()
                    }
                },
            },
        }
    }

    fn decode_elements(
        &self,
        reader: &mut Reader,
        count: usize,
        depth: usize,
    ) -> Result<Vec<Term>> {
        // Every element takes at least one byte.
        let mut elements = Vec::with_capacity(count.min(reader.remaining()));
        for _ in 0..count {
            elements.push(self.decode_term(reader, depth + 1)?);
        }
        Ok(elements)
    }

    /// Decodes the atom naming the node or module of a handle.
    fn decode_embedded_atom(&self, reader: &mut Reader) -> Result<Atom> {
        let byte = reader.read_u8()?;
        match Tag::from_u8(byte) {
            Some(tag) if tag.is_atom() => {
                let tag = self.lookup_tag(byte)?;
                self.decode_atom_text(tag, reader).map(Atom::new)
            }
            _ => Err(Error::UnexpectedTag {
                tag: byte,
                expected: "atom",
            }),
        }
    }

    fn decode_atom_text(&self, tag: Tag, reader: &mut Reader) -> Result<String> {
        let len = match tag {
            Tag::SmallAtom | Tag::SmallAtomUtf8 => usize::from(reader.read_u8()?),
            _ => usize::from(reader.read_u16()?),
        };
        let offset = reader.offset();
        let bytes = reader.read_bytes(len)?;
        let latin1 = match self.options.text_charset {
            TextCharset::PerTag => tag.is_latin1_atom(),
            TextCharset::Latin1 => true,
            TextCharset::Utf8 => false,
        };
        if latin1 {
            Ok(bytes.iter().map(|&b| char::from(b)).collect())
        } else {
            str::from_utf8(bytes)
                .map(str::to_owned)
                .map_err(|_| Error::InvalidText {
                    what: "atom",
                    offset,
                })
        }
    }
}

fn decode_big(reader: &mut Reader, len: usize) -> Result<Term> {
    reader.ensure(len.saturating_add(1))?;
    let sign = reader.read_u8()?;
    let magnitude = reader.read_bytes(len)?;
    Ok(Term::BigInt(bigint::decode_magnitude(sign, magnitude)))
}

/// Parses the 31-byte `%.20e` text of a legacy float.
///
/// The text may be padded with trailing NUL bytes; anything else that is not
/// part of a decimal float literal is rejected.
fn decode_legacy_float(reader: &mut Reader) -> Result<f64> {
    let offset = reader.offset();
    let field = reader.read_bytes(31)?;
    let invalid = || Error::InvalidText {
        what: "float",
        offset,
    };

    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    if field[end..].iter().any(|&b| b != 0) {
        return Err(invalid());
    }
    let text = str::from_utf8(&field[..end]).map_err(|_| invalid())?.trim();
    let numeric = text
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !numeric || !text.bytes().any(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    text.parse::<f64>().map_err(|_| invalid())
}
