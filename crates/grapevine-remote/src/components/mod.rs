pub mod controls;
pub mod header;
