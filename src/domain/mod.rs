// Domain layer: vehicle model, board commands and the ports the core depends on.

pub mod model;
pub mod ports;
