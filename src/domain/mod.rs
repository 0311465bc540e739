// Domain layer: release context, payload models and ports.

pub mod model;
pub mod ports;
