// Domain layer: models, the region catalog and ports (interfaces). No I/O here.

pub mod catalog;
pub mod model;
pub mod ports;
