//! Wire tags of the External Term Format.
//!
//! # Reference
//! - [External Term Format](http://erlang.org/doc/apps/erts/erl_ext_dist.html)

/// The leading byte of every encoded term.
pub const FORMAT_VERSION: u8 = 131;

/// The byte following [`FORMAT_VERSION`] in a compressed payload.
pub const COMPRESSED: u8 = b'P';

/// A one-byte tag identifying the shape of an encoded term.
///
/// The tags the codec refuses to handle are listed too, so that they are
/// rejected by name rather than falling through as unknown bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    SmallInteger = b'a',
    Integer = b'b',
    Float = b'c',
    NewFloat = b'F',
    Atom = b'd',
    SmallAtom = b's',
    AtomUtf8 = b'v',
    SmallAtomUtf8 = b'w',
    Reference = b'e',
    NewReference = b'r',
    Port = b'f',
    Pid = b'g',
    SmallTuple = b'h',
    LargeTuple = b'i',
    Map = b't',
    Nil = b'j',
    String = b'k',
    List = b'l',
    Binary = b'm',
    SmallBig = b'n',
    LargeBig = b'o',
    Export = b'q',

    AtomCacheRef = b'R',
    Fun = b'u',
    NewFun = b'p',
    BitBinary = b'M',
    DistHeader = b'D',
}
impl Tag {
    pub fn from_u8(tag: u8) -> Option<Self> {
        use self::Tag::*;
        let tag = match tag {
            b'a' => SmallInteger,
            b'b' => Integer,
            b'c' => Float,
            b'F' => NewFloat,
            b'd' => Atom,
            b's' => SmallAtom,
            b'v' => AtomUtf8,
            b'w' => SmallAtomUtf8,
            b'e' => Reference,
            b'r' => NewReference,
            b'f' => Port,
            b'g' => Pid,
            b'h' => SmallTuple,
            b'i' => LargeTuple,
            b't' => Map,
            b'j' => Nil,
            b'k' => String,
            b'l' => List,
            b'm' => Binary,
            b'n' => SmallBig,
            b'o' => LargeBig,
            b'q' => Export,
            b'R' => AtomCacheRef,
            b'u' => Fun,
            b'p' => NewFun,
            b'M' => BitBinary,
            b'D' => DistHeader,
            _ => return None,
        };
        Some(tag)
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns `true` if the codec has a representation for this shape.
    pub fn is_supported(self) -> bool {
        !matches!(
            self,
            Tag::AtomCacheRef | Tag::Fun | Tag::NewFun | Tag::BitBinary | Tag::DistHeader
        )
    }

    /// Returns `true` for the atom tags whose text is Latin-1.
    pub fn is_latin1_atom(self) -> bool {
        matches!(self, Tag::Atom | Tag::SmallAtom)
    }

    pub fn is_atom(self) -> bool {
        matches!(
            self,
            Tag::Atom | Tag::SmallAtom | Tag::AtomUtf8 | Tag::SmallAtomUtf8
        )
    }
}

/// Selects which historical generation of tags the decoder accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagSet {
    /// Every supported tag.
    Any,

    /// Only tags produced before UTF-8 atoms and maps existed.
    Legacy,

    /// Excludes the Latin-1 atom tags.
    Modern,
}
impl TagSet {
    pub fn allows(self, tag: Tag) -> bool {
        if !tag.is_supported() {
            return false;
        }
        match self {
            TagSet::Any => true,
            TagSet::Legacy => !matches!(tag, Tag::AtomUtf8 | Tag::SmallAtomUtf8 | Tag::Map),
            TagSet::Modern => !tag.is_latin1_atom(),
        }
    }
}
impl Default for TagSet {
    fn default() -> Self {
        TagSet::Any
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tag_maps_back_to_its_byte() {
        for byte in 0..=255u8 {
            if let Some(tag) = Tag::from_u8(byte) {
                assert_eq!(tag.as_u8(), byte);
            }
        }
        assert_eq!(Tag::from_u8(131), None);
        assert_eq!(Tag::SmallTuple.as_u8(), 104);
        assert_eq!(Tag::NewFloat.as_u8(), 70);
    }

    #[test]
    fn excluded_shapes_are_never_allowed() {
        for tag in [Tag::AtomCacheRef, Tag::Fun, Tag::NewFun, Tag::BitBinary, Tag::DistHeader] {
            assert!(!tag.is_supported());
            assert!(!TagSet::Any.allows(tag));
        }
    }

    #[test]
    fn tag_sets() {
        assert!(TagSet::Legacy.allows(Tag::Atom));
        assert!(!TagSet::Legacy.allows(Tag::SmallAtomUtf8));
        assert!(!TagSet::Legacy.allows(Tag::Map));
        assert!(TagSet::Modern.allows(Tag::Map));
        assert!(!TagSet::Modern.allows(Tag::SmallAtom));
        assert!(TagSet::Any.allows(Tag::SmallAtom));
    }
}
