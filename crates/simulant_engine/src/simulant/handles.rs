//! Typed simulant handles
//!
//! Each handle wraps an [`Address`] of a fixed shape: the game lives at the
//! empty address, screens at one name, groups at two and entities at three.

use std::fmt;

use super::Address;

/// The four kinds of simulant, ordered from shallowest to deepest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SimulantKind {
    /// The single root simulant
    Game,
    /// A screen, child of the game
    Screen,
    /// A group, child of a screen
    Group,
    /// An entity, child of a group
    Entity,
}

impl SimulantKind {
    /// Address length of simulants of this kind
    pub const fn depth(self) -> usize {
        match self {
            Self::Game => 0,
            Self::Screen => 1,
            Self::Group => 2,
            Self::Entity => 3,
        }
    }
}

/// Address did not have the shape required by a simulant kind
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Address '{address}' is not a valid {kind:?} address")]
pub struct InvalidAddress {
    /// The offending address
    pub address: Address,
    /// Kind the address was expected to identify
    pub kind: SimulantKind,
}

fn check_shape(address: &Address, kind: SimulantKind) -> Result<(), InvalidAddress> {
    let valid = address.len() == kind.depth()
        && !address.is_pattern()
        && address.names().iter().all(|name| !name.is_empty() && !name.contains('/'));
    if valid {
        Ok(())
    } else {
        Err(InvalidAddress { address: address.clone(), kind })
    }
}

macro_rules! simulant_handle {
    ($(#[$meta:meta])* $handle:ident, $kind:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $handle {
            address: Address,
        }

        impl $handle {
            /// Wrap an address, validating its shape
            pub fn try_from_address(address: Address) -> Result<Self, InvalidAddress> {
                check_shape(&address, SimulantKind::$kind)?;
                Ok(Self { address })
            }

            /// The handle's address
            pub fn address(&self) -> &Address {
                &self.address
            }

            /// The simulant's own name (last address segment)
            pub fn name(&self) -> &str {
                self.address.last().unwrap_or_default()
            }
        }

        impl fmt::Debug for $handle {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($handle), self.address)
            }
        }

        impl fmt::Display for $handle {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.address)
            }
        }

        impl From<$handle> for Simulant {
            fn from(handle: $handle) -> Self {
                Self::$kind(handle)
            }
        }
    };
}

simulant_handle!(
    /// Handle to a screen
    Screen, Screen
);
simulant_handle!(
    /// Handle to a group within a screen
    Group, Group
);
simulant_handle!(
    /// Handle to an entity within a group
    Entity, Entity
);

impl Screen {
    /// Handle to the screen with the given name
    ///
    /// Names must be non-empty and free of `/` and wildcards; use
    /// [`Screen::try_from_address`] when the name is untrusted.
    pub fn new(name: impl Into<String>) -> Self {
        Self { address: Address::new([name.into()]) }
    }

    /// Handle to a child group of this screen
    pub fn group(&self, name: impl Into<String>) -> Group {
        Group { address: self.address.push(name) }
    }
}

impl Group {
    /// Handle to a group from screen and group names
    pub fn new(screen: impl Into<String>, name: impl Into<String>) -> Self {
        Screen::new(screen).group(name)
    }

    /// The owning screen
    pub fn screen(&self) -> Screen {
        Screen { address: self.address.prefix(1) }
    }

    /// Handle to a child entity of this group
    pub fn entity(&self, name: impl Into<String>) -> Entity {
        Entity { address: self.address.push(name) }
    }
}

impl Entity {
    /// Handle to an entity from screen, group and entity names
    pub fn new(screen: impl Into<String>, group: impl Into<String>, name: impl Into<String>) -> Self {
        Group::new(screen, group).entity(name)
    }

    /// The owning group
    pub fn group(&self) -> Group {
        Group { address: self.address.prefix(2) }
    }

    /// The owning screen
    pub fn screen(&self) -> Screen {
        Screen { address: self.address.prefix(1) }
    }
}

/// Any simulant in the Game→Screen→Group→Entity hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Simulant {
    /// The game
    Game,
    /// A screen
    Screen(Screen),
    /// A group
    Group(Group),
    /// An entity
    Entity(Entity),
}

impl Simulant {
    /// Classify an address by its length
    pub fn from_address(address: Address) -> Result<Self, InvalidAddress> {
        match address.len() {
            0 => Ok(Self::Game),
            1 => Screen::try_from_address(address).map(Self::Screen),
            2 => Group::try_from_address(address).map(Self::Group),
            3 => Entity::try_from_address(address).map(Self::Entity),
            _ => Err(InvalidAddress { address, kind: SimulantKind::Entity }),
        }
    }

    /// The simulant's address
    pub fn address(&self) -> Address {
        match self {
            Self::Game => Address::empty(),
            Self::Screen(screen) => screen.address().clone(),
            Self::Group(group) => group.address().clone(),
            Self::Entity(entity) => entity.address().clone(),
        }
    }

    /// The simulant's kind
    pub fn kind(&self) -> SimulantKind {
        match self {
            Self::Game => SimulantKind::Game,
            Self::Screen(_) => SimulantKind::Screen,
            Self::Group(_) => SimulantKind::Group,
            Self::Entity(_) => SimulantKind::Entity,
        }
    }

    /// Depth in the hierarchy (game = 0, entity = 3)
    pub fn depth(&self) -> usize {
        self.kind().depth()
    }
}

impl fmt::Display for Simulant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Game => write!(f, "Game"),
            Self::Screen(screen) => write!(f, "{screen}"),
            Self::Group(group) => write!(f, "{group}"),
            Self::Entity(entity) => write!(f, "{entity}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_navigation() {
        let entity = Entity::new("Title", "Gui", "Play");
        assert_eq!(entity.name(), "Play");
        assert_eq!(entity.group(), Group::new("Title", "Gui"));
        assert_eq!(entity.screen(), Screen::new("Title"));
        assert_eq!(entity.group().screen().name(), "Title");
    }

    #[test]
    fn test_invalid_shapes_rejected() {
        assert!(Entity::try_from_address(Address::parse("Title/Gui")).is_err());
        assert!(Screen::try_from_address(Address::parse("*")).is_err());
        assert!(Group::try_from_address(Address::parse("Title/Gui")).is_ok());
    }

    #[test]
    fn test_simulant_from_address() {
        assert_eq!(Simulant::from_address(Address::empty()), Ok(Simulant::Game));
        let simulant = Simulant::from_address(Address::parse("A/B/C")).expect("entity address");
        assert_eq!(simulant.kind(), SimulantKind::Entity);
        assert_eq!(simulant.depth(), 3);
        assert!(Simulant::from_address(Address::parse("A/B/C/D")).is_err());
    }
}
