// Domain layer: radius/area values, checker actions and reports, and the ports
// the checker runs scripts through.

pub mod model;
pub mod ports;
