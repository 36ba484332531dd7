//! Mapping of arbitrary host values onto terms.
//!
//! Any type implementing [`serde::Serialize`] can be turned into a [`Term`]
//! by the shape of its data:
//!
//! | Rust shape                    | Term                                 |
//! |-------------------------------|--------------------------------------|
//! | `bool`                        | `true` / `false`                     |
//! | integers                      | integer of the narrowest tier        |
//! | `f32`, `f64` (finite)         | float                                |
//! | `char`, `str`, `String`       | [`Term::Text`]                       |
//! | byte buffers                  | binary                               |
//! | `None`, `()`, unit structs    | `none`                               |
//! | `Some(v)`, newtype structs    | the inner value                      |
//! | sequences                     | list                                 |
//! | tuples, tuple structs         | tuple                                |
//! | maps                          | map                                  |
//! | structs                       | map with atom keys                   |
//! | unit variant `V`              | atom `V`                             |
//! | newtype variant `V(x)`        | `{V, x}`                             |
//! | tuple variant `V(a, b)`       | `{V, a, b}`                          |
//! | struct variant `V { .. }`     | `{V, #{..}}`                         |
//!
//! Values with no Erlang counterpart (non-finite floats, or errors raised by
//! a `Serialize` implementation) fail with [`Error::UnsupportedValue`].
use serde::ser::{self, Serialize};
use std::collections::BTreeMap;

use crate::term::Term;
use crate::{Error, Result};

/// Converts a serializable value into a term.
///
/// ```
/// use eetf_codec::{to_term, Term};
///
/// let term = to_term(&(1, "two", vec![3.0])).unwrap();
/// assert_eq!(
///     term,
///     Term::tuple(vec![Term::from(1), Term::from("two"), Term::list(vec![Term::from(3.0)])])
/// );
/// ```
pub fn to_term<T: Serialize + ?Sized>(value: &T) -> Result<Term> {
    value.serialize(TermSerializer)
}

/// A `serde` serializer whose output is a [`Term`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TermSerializer;

impl ser::Serializer for TermSerializer {
    type Ok = Term;
    type Error = Error;
    type SerializeSeq = SeqSerializer;
    type SerializeTuple = TupleSerializer;
    type SerializeTupleStruct = TupleSerializer;
    type SerializeTupleVariant = TupleSerializer;
    type SerializeMap = MapSerializer;
    type SerializeStruct = StructSerializer;
    type SerializeStructVariant = StructSerializer;

    fn serialize_bool(self, v: bool) -> Result<Term> {
        Ok(Term::Boolean(v))
    }
    fn serialize_i8(self, v: i8) -> Result<Term> {
        Ok(Term::from(v))
    }
    fn serialize_i16(self, v: i16) -> Result<Term> {
        Ok(Term::from(v))
    }
    fn serialize_i32(self, v: i32) -> Result<Term> {
        Ok(Term::from(v))
    }
    fn serialize_i64(self, v: i64) -> Result<Term> {
        Ok(Term::from(v))
    }
    fn serialize_i128(self, v: i128) -> Result<Term> {
        Ok(Term::from(v))
    }
    fn serialize_u8(self, v: u8) -> Result<Term> {
        Ok(Term::from(v))
    }
    fn serialize_u16(self, v: u16) -> Result<Term> {
        Ok(Term::from(v))
    }
    fn serialize_u32(self, v: u32) -> Result<Term> {
        Ok(Term::from(v))
    }
    fn serialize_u64(self, v: u64) -> Result<Term> {
        Ok(Term::from(v))
    }
    fn serialize_u128(self, v: u128) -> Result<Term> {
        Ok(Term::from(v))
    }
    fn serialize_f32(self, v: f32) -> Result<Term> {
        self.serialize_f64(f64::from(v))
    }
    fn serialize_f64(self, v: f64) -> Result<Term> {
        if v.is_finite() {
            Ok(Term::from(v))
        } else {
            Err(Error::unsupported_value(format_args!(
                "float {} has no Erlang representation",
                v
            )))
        }
    }
    fn serialize_char(self, v: char) -> Result<Term> {
        Ok(Term::Text(v.to_string()))
    }
    fn serialize_str(self, v: &str) -> Result<Term> {
        Ok(Term::Text(v.to_owned()))
    }
    fn serialize_bytes(self, v: &[u8]) -> Result<Term> {
        Ok(Term::Binary(v.to_vec()))
    }
    fn serialize_none(self) -> Result<Term> {
        Ok(Term::None)
    }
    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Term> {
        value.serialize(self)
    }
    fn serialize_unit(self) -> Result<Term> {
        Ok(Term::None)
    }
    fn serialize_unit_struct(self, _name: &'static str) -> Result<Term> {
        Ok(Term::None)
    }
    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Term> {
        Ok(Term::atom(variant))
    }
    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Term> {
        value.serialize(self)
    }
    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Term> {
        Ok(Term::Tuple(vec![Term::atom(variant), value.serialize(self)?]))
    }
    fn serialize_seq(self, len: Option<usize>) -> Result<SeqSerializer> {
        Ok(SeqSerializer {
            elements: Vec::with_capacity(len.unwrap_or(0)),
        })
    }
    fn serialize_tuple(self, len: usize) -> Result<TupleSerializer> {
        Ok(TupleSerializer {
            elements: Vec::with_capacity(len),
        })
    }
    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<TupleSerializer> {
        self.serialize_tuple(len)
    }
    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<TupleSerializer> {
        let mut elements = Vec::with_capacity(len + 1);
        elements.push(Term::atom(variant));
        Ok(TupleSerializer { elements })
    }
    fn serialize_map(self, _len: Option<usize>) -> Result<MapSerializer> {
        Ok(MapSerializer {
            map: BTreeMap::new(),
            key: None,
        })
    }
    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<StructSerializer> {
        Ok(StructSerializer {
            variant: None,
            map: BTreeMap::new(),
        })
    }
    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<StructSerializer> {
        Ok(StructSerializer {
            variant: Some(variant),
            map: BTreeMap::new(),
        })
    }
}

#[derive(Debug)]
pub struct SeqSerializer {
    elements: Vec<Term>,
}
impl ser::SerializeSeq for SeqSerializer {
    type Ok = Term;
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.elements.push(value.serialize(TermSerializer)?);
        Ok(())
    }
    fn end(self) -> Result<Term> {
        Ok(Term::list(self.elements))
    }
}

#[derive(Debug)]
pub struct TupleSerializer {
    elements: Vec<Term>,
}
impl ser::SerializeTuple for TupleSerializer {
    type Ok = Term;
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.elements.push(value.serialize(TermSerializer)?);
        Ok(())
    }
    fn end(self) -> Result<Term> {
        Ok(Term::Tuple(self.elements))
    }
}
impl ser::SerializeTupleStruct for TupleSerializer {
    type Ok = Term;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        ser::SerializeTuple::serialize_element(self, value)
    }
    fn end(self) -> Result<Term> {
        ser::SerializeTuple::end(self)
    }
}
impl ser::SerializeTupleVariant for TupleSerializer {
    type Ok = Term;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        ser::SerializeTuple::serialize_element(self, value)
    }
    fn end(self) -> Result<Term> {
        ser::SerializeTuple::end(self)
    }
}

#[derive(Debug)]
pub struct MapSerializer {
    map: BTreeMap<Term, Term>,
    key: Option<Term>,
}
impl ser::SerializeMap for MapSerializer {
    type Ok = Term;
    type Error = Error;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<()> {
        self.key = Some(key.serialize(TermSerializer)?);
        Ok(())
    }
    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let key = self
            .key
            .take()
            .ok_or_else(|| Error::unsupported_value("map value without a key"))?;
        self.map.insert(key, value.serialize(TermSerializer)?);
        Ok(())
    }
    fn end(self) -> Result<Term> {
        Ok(Term::Map(self.map))
    }
}

#[derive(Debug)]
pub struct StructSerializer {
    variant: Option<&'static str>,
    map: BTreeMap<Term, Term>,
}
impl ser::SerializeStruct for StructSerializer {
    type Ok = Term;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        self.map.insert(Term::atom(key), value.serialize(TermSerializer)?);
        Ok(())
    }
    fn end(self) -> Result<Term> {
        let map = Term::Map(self.map);
        Ok(match self.variant {
            Some(variant) => Term::Tuple(vec![Term::atom(variant), map]),
            None => map,
        })
    }
}
impl ser::SerializeStructVariant for StructSerializer {
    type Ok = Term;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        ser::SerializeStruct::serialize_field(self, key, value)
    }
    fn end(self) -> Result<Term> {
        ser::SerializeStruct::end(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::HashMap;

    #[derive(Serialize)]
    struct Job {
        id: u64,
        name: String,
        tags: Vec<&'static str>,
        owner: Option<String>,
    }

    #[derive(Serialize)]
    enum Command {
        Stop,
        Move(i32),
        Jump(i32, i32),
        Rename { to: String },
    }

    #[test]
    fn scalars() {
        assert_eq!(to_term(&true).unwrap(), Term::Boolean(true));
        assert_eq!(to_term(&7u8).unwrap(), Term::SmallInt(7));
        assert_eq!(to_term(&-7i64).unwrap(), Term::Int(-7));
        assert_eq!(to_term(&u64::MAX).unwrap(), Term::from(u64::MAX));
        assert_eq!(to_term(&i128::MIN).unwrap(), Term::from(i128::MIN));
        assert_eq!(to_term(&'x').unwrap(), Term::from("x"));
        assert_eq!(to_term(&()).unwrap(), Term::None);
        assert_eq!(to_term(&Option::<u8>::None).unwrap(), Term::None);
    }

    #[test]
    fn structs_become_maps() {
        let job = Job {
            id: 1,
            name: "build".to_owned(),
            tags: vec![],
            owner: None,
        };
        assert_eq!(
            to_term(&job).unwrap(),
            Term::map(vec![
                (Term::atom("id"), Term::from(1)),
                (Term::atom("name"), Term::from("build")),
                (Term::atom("tags"), Term::Nil),
                (Term::atom("owner"), Term::None),
            ])
        );
    }

    #[test]
    fn enum_variants() {
        assert_eq!(to_term(&Command::Stop).unwrap(), Term::atom("Stop"));
        assert_eq!(
            to_term(&Command::Move(-3)).unwrap(),
            Term::tuple(vec![Term::atom("Move"), Term::from(-3)])
        );
        assert_eq!(
            to_term(&Command::Jump(1, 2)).unwrap(),
            Term::tuple(vec![Term::atom("Jump"), Term::from(1), Term::from(2)])
        );
        assert_eq!(
            to_term(&Command::Rename { to: "x".to_owned() }).unwrap(),
            Term::tuple(vec![
                Term::atom("Rename"),
                Term::map(vec![(Term::atom("to"), Term::from("x"))])
            ])
        );
    }

    #[test]
    fn maps() {
        let mut map = HashMap::new();
        map.insert("a", vec![1, 2]);
        assert_eq!(
            to_term(&map).unwrap(),
            Term::map(vec![(
                Term::from("a"),
                Term::list(vec![Term::from(1), Term::from(2)])
            )])
        );
    }

    #[test]
    fn non_finite_floats_are_unsupported() {
        match to_term(&vec![1.0, f64::NAN]) {
            Err(Error::UnsupportedValue { description }) => {
                assert!(description.contains("NaN"), "{}", description);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
