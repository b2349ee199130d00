pub mod content;
pub mod filter;
pub mod notice;
