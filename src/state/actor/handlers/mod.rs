//! Per-event handlers for the room actor.

mod join;
mod message;
mod modes;
mod part_quit;
mod topic;
mod who;
