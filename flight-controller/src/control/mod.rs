pub mod arming;
pub mod control_loops;
pub mod flight_controllers;
pub mod pid;
pub mod reference;
