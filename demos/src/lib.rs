pub mod defaults;
pub mod nodes;
