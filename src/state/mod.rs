//! State management module.
//!
//! Contains the coordinator (client and room registries), the per-room
//! actors, and the client handles and events passed between them.

pub mod actor;
pub mod client;
pub mod coordinator;
pub mod event;

pub use actor::{RoomActor, RoomHandle, RoomInfo, RoomMessage};
pub use client::{ClientHandle, ClientId, ClientRef, PLACEHOLDER_NICK, format_parts};
pub use coordinator::{Coordinator, CoordinatorHandle, CoordinatorSettings, Inbound};
pub use event::{Event, EventKind};
