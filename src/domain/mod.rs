// Domain layer: btp data shapes, command values and the ports the orchestration talks to.

pub mod command;
pub mod model;
pub mod ports;
