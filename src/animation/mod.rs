/// Linear intro scale ramp.
pub mod ramp;
