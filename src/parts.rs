//! Records for atoms and the Erlang-specific handle types.
use std::fmt;

/// An atom.
///
/// The literal atoms `none`, `true` and `false` never appear as `Atom`
/// values after decoding; they become [`Term::None`](crate::Term::None) and
/// [`Term::Boolean`](crate::Term::Boolean) instead.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Atom {
    pub name: String,
}
impl Atom {
    pub fn new<T: Into<String>>(name: T) -> Self {
        Atom { name: name.into() }
    }
}
impl<'a> From<&'a str> for Atom {
    fn from(name: &'a str) -> Self {
        Atom::new(name)
    }
}
impl From<String> for Atom {
    fn from(name: String) -> Self {
        Atom::new(name)
    }
}
impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let plain = self
            .name
            .chars()
            .next()
            .map_or(false, |c| c.is_ascii_lowercase())
            && self
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '@');
        if plain {
            write!(f, "{}", self.name)
        } else {
            write!(f, "'{}'", self.name.replace('\\', "\\\\").replace('\'', "\\'"))
        }
    }
}

/// A process identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pid {
    pub node: Atom,
    pub id: u32,
    pub serial: u32,
    pub creation: u8,
}
impl Pid {
    pub fn new<T: Into<Atom>>(node: T, id: u32, serial: u32, creation: u8) -> Self {
        Pid {
            node: node.into(),
            id,
            serial,
            creation,
        }
    }
}
impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<{}.{}.{}>", self.creation, self.id, self.serial)
    }
}

/// A port identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Port {
    pub node: Atom,
    pub id: u32,
    pub creation: u8,
}
impl Port {
    pub fn new<T: Into<Atom>>(node: T, id: u32, creation: u8) -> Self {
        Port {
            node: node.into(),
            id,
            creation,
        }
    }
}
impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#Port<{}.{}>", self.creation, self.id)
    }
}

/// A reference.
///
/// Both the legacy single-id form and the multi-id form decode into this
/// record. At most three ids can be encoded.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reference {
    pub node: Atom,
    pub ids: Vec<u32>,
    pub creation: u8,
}
impl Reference {
    /// The largest number of ids the encoder accepts.
    pub const MAX_IDS: usize = 3;

    pub fn new<T: Into<Atom>>(node: T, ids: Vec<u32>, creation: u8) -> Self {
        Reference {
            node: node.into(),
            ids,
            creation,
        }
    }
}
impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#Ref<{}", self.creation)?;
        for id in &self.ids {
            write!(f, ".{}", id)?;
        }
        write!(f, ">")
    }
}

/// An external function (`fun Module:Function/Arity`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Export {
    pub module: Atom,
    pub function: Atom,
    pub arity: u8,
}
impl Export {
    pub fn new<M: Into<Atom>, F: Into<Atom>>(module: M, function: F, arity: u8) -> Self {
        Export {
            module: module.into(),
            function: function.into(),
            arity,
        }
    }
}
impl fmt::Display for Export {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "fun {}:{}/{}", self.module, self.function, self.arity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_handles() {
        let pid = Pid::new("nonode@nohost", 38, 0, 1);
        assert_eq!(pid.to_string(), "<1.38.0>");

        let port = Port::new("nonode@nohost", 5, 2);
        assert_eq!(port.to_string(), "#Port<2.5>");

        let reference = Reference::new("nonode@nohost", vec![1, 2, 3], 0);
        assert_eq!(reference.to_string(), "#Ref<0.1.2.3>");

        let export = Export::new("lists", "map", 2);
        assert_eq!(export.to_string(), "fun lists:map/2");
    }

    #[test]
    fn display_quotes_atoms_when_needed() {
        assert_eq!(Atom::new("ok").to_string(), "ok");
        assert_eq!(Atom::new("node@host").to_string(), "node@host");
        assert_eq!(Atom::new("Hello").to_string(), "'Hello'");
        assert_eq!(Atom::new("it's").to_string(), "'it\\'s'");
        assert_eq!(Atom::new("").to_string(), "''");
    }
}
