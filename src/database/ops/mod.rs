pub mod local;
pub mod reader;
pub mod store;
