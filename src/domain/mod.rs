// Domain layer: scenario data, the editable store, and the ports the pipeline talks through.

pub mod model;
pub mod ports;
pub mod store;
