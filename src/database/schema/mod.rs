pub mod meta;
pub mod video;
