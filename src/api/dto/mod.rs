//! Data Transfer Objects for REST response serialization.

pub mod control_dto;
pub mod status_dto;

pub use control_dto::*;
pub use status_dto::*;
