//! Well-known event addresses
//!
//! Simulant-scoped events live at `<Name...>/Event/<simulant address...>`, so
//! a subscription to `Change/*/Event/**` observes every property change.

use crate::simulant::Address;

/// Separator between an event's name and its simulant scope
pub const EVENT: &str = "Event";

/// Address of a named event scoped to a simulant
pub fn event_address(name: &[&str], simulant: &Address) -> Address {
    let names = name
        .iter()
        .map(|part| (*part).to_string())
        .chain(std::iter::once(EVENT.to_string()))
        .chain(simulant.names().iter().cloned());
    Address::new(names)
}

/// Published after a property of `simulant` is written
pub fn change_event(property_name: &str, simulant: &Address) -> Address {
    event_address(&["Change", property_name], simulant)
}

/// Published once per tick after update hooks run
pub fn update_event() -> Address {
    event_address(&["Update"], &Address::empty())
}

/// Published after a simulant is added to the world
pub fn register_event(simulant: &Address) -> Address {
    event_address(&["Register"], simulant)
}

/// Published when a simulant is about to be removed
pub fn unregistering_event(simulant: &Address) -> Address {
    event_address(&["Unregistering"], simulant)
}

/// Published when a screen becomes selected
pub fn select_event(screen: &Address) -> Address {
    event_address(&["Select"], screen)
}

/// Published when a screen stops being selected
pub fn deselect_event(screen: &Address) -> Address {
    event_address(&["Deselect"], screen)
}

/// Published when a screen starts transitioning in
pub fn incoming_start_event(screen: &Address) -> Address {
    event_address(&["IncomingStart"], screen)
}

/// Published when a screen finishes transitioning in
pub fn incoming_finish_event(screen: &Address) -> Address {
    event_address(&["IncomingFinish"], screen)
}

/// Published when a screen starts transitioning out
pub fn outgoing_start_event(screen: &Address) -> Address {
    event_address(&["OutgoingStart"], screen)
}

/// Published when a screen finishes transitioning out
pub fn outgoing_finish_event(screen: &Address) -> Address {
    event_address(&["OutgoingFinish"], screen)
}
