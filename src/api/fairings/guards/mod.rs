pub mod readonly;
