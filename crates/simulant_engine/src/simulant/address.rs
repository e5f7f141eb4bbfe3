//! Structural addresses for simulants and events

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Wildcard name matching exactly one address segment
pub const WILDCARD: &str = "*";

/// Wildcard name matching any number of trailing address segments
pub const WILDCARD_REST: &str = "**";

/// An immutable, ordered sequence of names
///
/// Equality, ordering and hashing are structural. Clones share the same
/// backing allocation, which [`Address::ptr_eq`] can detect for cheap
/// reference-identity checks.
#[derive(Clone)]
pub struct Address {
    names: Rc<[String]>,
}

impl Address {
    /// The empty address (the game's address)
    pub fn empty() -> Self {
        Self { names: Rc::from(Vec::new()) }
    }

    /// Build an address from a sequence of names
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        Self { names: Rc::from(names) }
    }

    /// Parse a `/`-separated address; the empty string is the empty address
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            Self::empty()
        } else {
            Self::new(text.split('/'))
        }
    }

    /// The names making up this address
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of names
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether this is the empty address
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Last name, if any
    pub fn last(&self) -> Option<&str> {
        self.names.last().map(String::as_str)
    }

    /// Address made of the first `count` names
    pub fn prefix(&self, count: usize) -> Self {
        Self::new(self.names.iter().take(count).cloned())
    }

    /// Append `other` to this address
    pub fn concat(&self, other: &Self) -> Self {
        Self::new(self.names.iter().chain(other.names.iter()).cloned())
    }

    /// Append a single name
    pub fn push(&self, name: impl Into<String>) -> Self {
        let mut names = self.names.to_vec();
        names.push(name.into());
        Self { names: Rc::from(names) }
    }

    /// Reference identity: both addresses share the same allocation
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.names, &b.names)
    }

    /// Whether any name is a wildcard
    pub fn is_pattern(&self) -> bool {
        self.names.iter().any(|name| name == WILDCARD || name == WILDCARD_REST)
    }

    /// Whether this concrete address matches `pattern`
    ///
    /// `*` matches exactly one name; `**` matches zero or more names.
    pub fn matches(&self, pattern: &Self) -> bool {
        fn go(names: &[String], pattern: &[String]) -> bool {
            match pattern.split_first() {
                None => names.is_empty(),
                Some((head, rest)) if head == WILDCARD_REST => {
                    (0..=names.len()).any(|skip| go(&names[skip..], rest))
                }
                Some((head, rest)) => match names.split_first() {
                    Some((name, names_rest)) => {
                        (head == WILDCARD || head == name) && go(names_rest, rest)
                    }
                    None => false,
                },
            }
        }
        go(&self.names, &pattern.names)
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other) || self.names == other.names
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.names.hash(state);
    }
}

impl PartialOrd for Address {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Address {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.names.cmp(&other.names)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names.join("/"))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl From<&str> for Address {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}
