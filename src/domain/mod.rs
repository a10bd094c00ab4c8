// Domain layer: wire/domain models and ports (interfaces) for the remote API.

pub mod model;
pub mod ports;
