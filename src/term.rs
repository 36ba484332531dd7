//! The term data model.
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::parts::{Atom, Export, Pid, Port, Reference};

/// A decoded or to-be-encoded value of the External Term Format.
///
/// Integers have three variants mirroring the three wire tiers. The encoder
/// chooses the tier from the value, so `Term::BigInt(5.into())` encodes
/// exactly like `Term::SmallInt(5)`; the `From` conversions always produce
/// the variant the decoder would produce.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    /// The atom `none`.
    None,

    /// The atoms `true` and `false`.
    Boolean(bool),

    SmallInt(u8),

    /// An integer outside `0..=255` that fits 32 bits.
    ///
    /// `Int` holding a value in `0..=255` is non-canonical: it encodes as a
    /// small integer and decodes as [`Term::SmallInt`].
    Int(i32),

    /// An integer that does not fit 32 bits.
    ///
    /// Smaller values are non-canonical, as with [`Term::Int`]; build
    /// integers with [`Term::integer`] or `From` to get the canonical
    /// variant.
    BigInt(BigInt),
    Float(Float),
    Atom(Atom),
    Tuple(Vec<Term>),
    Map(BTreeMap<Term, Term>),

    /// The empty list.
    Nil,

    /// A proper, non-empty list.
    ///
    /// An empty `List` is encoded as [`Term::Nil`].
    List(Vec<Term>),

    /// A list of bytes in its compact wire form.
    ByteString(Vec<u8>),

    Binary(Vec<u8>),

    /// Host text.
    ///
    /// The encoder renders it according to
    /// [`StringPolicy`](crate::StringPolicy). The decoder produces it only
    /// for byte strings under [`ByteStrings::Text`](crate::ByteStrings::Text).
    Text(String),

    Pid(Pid),
    Port(Port),
    Reference(Reference),
    Export(Export),
}
impl Term {
    /// Makes an atom term, mapping `none`, `true` and `false` to their
    /// sentinel variants.
    pub fn atom<T: Into<String>>(name: T) -> Self {
        let name = name.into();
        match name.as_str() {
            "none" => Term::None,
            "true" => Term::Boolean(true),
            "false" => Term::Boolean(false),
            _ => Term::Atom(Atom { name }),
        }
    }

    pub fn tuple(elements: Vec<Term>) -> Self {
        Term::Tuple(elements)
    }

    /// Makes a list term; an empty vector becomes [`Term::Nil`].
    pub fn list(elements: Vec<Term>) -> Self {
        if elements.is_empty() {
            Term::Nil
        } else {
            Term::List(elements)
        }
    }

    pub fn binary<T: Into<Vec<u8>>>(bytes: T) -> Self {
        Term::Binary(bytes.into())
    }

    pub fn map<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Term, Term)>,
    {
        Term::Map(pairs.into_iter().collect())
    }

    /// Makes an integer term in the narrowest tier that holds `value`.
    pub fn integer<T: Into<BigInt>>(value: T) -> Self {
        let value = value.into();
        if let Some(v) = value.to_u8() {
            Term::SmallInt(v)
        } else if let Some(v) = value.to_i32() {
            Term::Int(v)
        } else {
            Term::BigInt(value)
        }
    }

    /// Returns the value of an integer term, whatever its tier.
    pub fn as_bigint(&self) -> Option<BigInt> {
        match *self {
            Term::SmallInt(v) => Some(BigInt::from(v)),
            Term::Int(v) => Some(BigInt::from(v)),
            Term::BigInt(ref v) => Some(v.clone()),
            _ => None,
        }
    }

    pub fn as_atom(&self) -> Option<&str> {
        match *self {
            Term::None => Some("none"),
            Term::Boolean(true) => Some("true"),
            Term::Boolean(false) => Some("false"),
            Term::Atom(ref a) => Some(&a.name),
            _ => None,
        }
    }

    /// A short name of the shape, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match *self {
            Term::None | Term::Boolean(_) | Term::Atom(_) => "atom",
            Term::SmallInt(_) | Term::Int(_) | Term::BigInt(_) => "integer",
            Term::Float(_) => "float",
            Term::Tuple(_) => "tuple",
            Term::Map(_) => "map",
            Term::Nil | Term::List(_) | Term::ByteString(_) => "list",
            Term::Binary(_) => "binary",
            Term::Text(_) => "text",
            Term::Pid(_) => "pid",
            Term::Port(_) => "port",
            Term::Reference(_) => "reference",
            Term::Export(_) => "export",
        }
    }
}

/// A float with a total order, so that terms can key a map.
///
/// Two floats are equal when their bit patterns are equal; `0.0` and `-0.0`
/// are therefore distinct, which keeps the wire round trip exact.
#[derive(Debug, Clone, Copy)]
pub struct Float(pub f64);
impl Float {
    pub fn value(self) -> f64 {
        self.0
    }
}
impl PartialEq for Float {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}
impl Eq for Float {}
impl PartialOrd for Float {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Float {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}
impl Hash for Float {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}
impl From<f64> for Float {
    fn from(f: f64) -> Self {
        Float(f)
    }
}
impl fmt::Display for Float {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Term {
                fn from(v: $t) -> Self {
                    Term::integer(v)
                }
            }
        )*
    };
}
impl_from_integer!(u8, i8, u16, i16, u32, i32, u64, i64, u128, i128, usize, isize, BigInt);

impl From<f64> for Term {
    fn from(v: f64) -> Self {
        Term::Float(Float(v))
    }
}
impl From<f32> for Term {
    fn from(v: f32) -> Self {
        Term::Float(Float(f64::from(v)))
    }
}
impl From<bool> for Term {
    fn from(v: bool) -> Self {
        Term::Boolean(v)
    }
}
impl<'a> From<&'a str> for Term {
    fn from(v: &'a str) -> Self {
        Term::Text(v.to_owned())
    }
}
impl From<String> for Term {
    fn from(v: String) -> Self {
        Term::Text(v)
    }
}
impl From<Atom> for Term {
    fn from(v: Atom) -> Self {
        Term::atom(v.name)
    }
}
impl From<Pid> for Term {
    fn from(v: Pid) -> Self {
        Term::Pid(v)
    }
}
impl From<Port> for Term {
    fn from(v: Port) -> Self {
        Term::Port(v)
    }
}
impl From<Reference> for Term {
    fn from(v: Reference) -> Self {
        Term::Reference(v)
    }
}
impl From<Export> for Term {
    fn from(v: Export) -> Self {
        Term::Export(v)
    }
}
impl From<Vec<Term>> for Term {
    fn from(v: Vec<Term>) -> Self {
        Term::list(v)
    }
}
impl<T: Into<Term>> From<Option<T>> for Term {
    fn from(v: Option<T>) -> Self {
        v.map_or(Term::None, Into::into)
    }
}

/// Formats the term in Erlang syntax.
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Term::None => write!(f, "none"),
            Term::Boolean(b) => write!(f, "{}", b),
            Term::SmallInt(v) => write!(f, "{}", v),
            Term::Int(v) => write!(f, "{}", v),
            Term::BigInt(ref v) => write!(f, "{}", v),
            Term::Float(v) => write!(f, "{}", v),
            Term::Atom(ref a) => write!(f, "{}", a),
            Term::Tuple(ref elements) => {
                write!(f, "{{")?;
                write_seq(f, elements)?;
                write!(f, "}}")
            }
            Term::Map(ref map) => {
                write!(f, "#{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{} => {}", k, v)?;
                }
                write!(f, "}}")
            }
            Term::Nil => write!(f, "[]"),
            Term::List(ref elements) => {
                write!(f, "[")?;
                write_seq(f, elements)?;
                write!(f, "]")
            }
            Term::ByteString(ref bytes) => {
                if is_printable(bytes) {
                    write!(f, "{:?}", String::from_utf8_lossy(bytes))
                } else {
                    write!(f, "[")?;
                    write_bytes(f, bytes)?;
                    write!(f, "]")
                }
            }
            Term::Binary(ref bytes) => {
                if !bytes.is_empty() && is_printable(bytes) {
                    write!(f, "<<{:?}>>", String::from_utf8_lossy(bytes))
                } else {
                    write!(f, "<<")?;
                    write_bytes(f, bytes)?;
                    write!(f, ">>")
                }
            }
            Term::Text(ref s) => write!(f, "{:?}", s),
            Term::Pid(ref v) => write!(f, "{}", v),
            Term::Port(ref v) => write!(f, "{}", v),
            Term::Reference(ref v) => write!(f, "{}", v),
            Term::Export(ref v) => write!(f, "{}", v),
        }
    }
}

fn write_seq(f: &mut fmt::Formatter, elements: &[Term]) -> fmt::Result {
    for (i, e) in elements.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{}", e)?;
    }
    Ok(())
}

fn write_bytes(f: &mut fmt::Formatter, bytes: &[u8]) -> fmt::Result {
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{}", b)?;
    }
    Ok(())
}

fn is_printable(bytes: &[u8]) -> bool {
    bytes.iter().all(|&b| b == b' ' || b.is_ascii_graphic())
}
