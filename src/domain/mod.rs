// Domain layer: row and contractor models, run diagnostics, and ports.

pub mod model;
pub mod ports;
pub mod report;
