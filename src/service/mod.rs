//! Service layer: event routing and actuator command dispatch.
//!
//! [`EventRouter`] maps each inbound event to its handler and decides
//! which room receives the result. [`CommandDispatcher`] types and commits
//! actuator commands for both the live channel and the REST facade.

pub mod command_dispatcher;
pub mod event_router;
pub mod inbound_event;

pub use command_dispatcher::{ActuatorCommand, CommandDispatcher};
pub use event_router::{EventRouter, HubStatus};
pub use inbound_event::InboundEvent;
