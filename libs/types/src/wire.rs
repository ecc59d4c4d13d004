//! Conversion seam for transport adapters
//!
//! Transports (RPC stubs, message buses) live outside this workspace. They
//! plug in by converting a container to and from their own message type.

use crate::container::Container;
use crate::error::Result;

/// Pure conversion between a [`Container`] and an external message type
pub trait WireAdapter {
    type Message;

    fn to_wire(&self, container: &Container) -> Result<Self::Message>;

    fn from_wire(&self, message: Self::Message) -> Result<Container>;
}
