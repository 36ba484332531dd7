//! This crate provides an encoder and a decoder for the Erlang External Term Format.
//!
//! # Examples
//!
//! Decodes a term sent by an Erlang node:
//!
//! ```
//! use eetf_codec::Term;
//!
//! // term_to_binary({ok, 42})
//! let bytes = [131, 104, 2, 119, 2, b'o', b'k', 97, 42];
//! let term = eetf_codec::decode(&bytes).unwrap();
//!
//! assert_eq!(term, Term::tuple(vec![Term::atom("ok"), Term::from(42)]));
//! assert_eq!(term.to_string(), "{ok,42}");
//! ```
//!
//! Encodes a term with compression enabled:
//!
//! ```
//! use eetf_codec::{Decoder, EncodeOptions, Encoder, Term};
//!
//! let term = Term::list(vec![Term::atom("hello"); 100]);
//! let encoder = Encoder::with_options(EncodeOptions::new().compressed(true));
//! let bytes = encoder.encode(&term).unwrap();
//!
//! assert_eq!(&bytes[..2], &[131, b'P']);
//! assert_eq!(Decoder::new().decode(&bytes).unwrap(), term);
//! ```
#[macro_use]
extern crate log;

pub mod bigint;
pub mod compression;
pub mod decode;
pub mod encode;
pub mod parts;
pub mod ser;
pub mod tag;
pub mod term;

mod envelope;
mod error;
mod reader;

pub use compression::{Compression, NoCompression, ZlibCompression};
pub use decode::{ByteStrings, DecodeOptions, Decoder, TextCharset, DEFAULT_MAX_DEPTH};
pub use encode::{EncodeOptions, Encoder, StringPolicy};
pub use error::Error;
pub use parts::{Atom, Export, Pid, Port, Reference};
pub use ser::to_term;
pub use tag::{Tag, TagSet};
pub use term::{Float, Term};

pub type Result<T> = std::result::Result<T, Error>;

/// Decodes `bytes` with the default options.
pub fn decode(bytes: &[u8]) -> Result<Term> {
    Decoder::new().decode(bytes)
}

/// Encodes `term` with the default options (no compression, strings as binaries).
pub fn encode(term: &Term) -> Result<Vec<u8>> {
    Encoder::new().encode(term)
}
