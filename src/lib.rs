pub mod picker;
pub mod remote;
pub mod state;
pub mod tags;
