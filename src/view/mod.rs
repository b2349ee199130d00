pub mod controller;
pub mod gallery;
pub mod html;
pub mod player;
