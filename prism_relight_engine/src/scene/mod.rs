/// Scene module - transformation instances and derived scene bounds

pub mod instance_list;

pub use instance_list::*;
