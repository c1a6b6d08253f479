pub mod agents;
pub mod components;
