// Domain layer: time-of-day values, events, commands and the ports the core talks through.

pub mod model;
pub mod ports;
pub mod time_of_day;
