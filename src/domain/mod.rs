// Domain layer: records, result collectors and the ports the scrapers and
// generator talk to. Concrete drivers live under `adapters`.

pub mod model;
pub mod ports;
