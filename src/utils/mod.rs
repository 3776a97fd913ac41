pub mod consts;
pub mod coretypes;
