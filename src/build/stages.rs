pub mod cleanup;
pub mod generate;
pub mod link;
pub mod read;
pub mod render;
pub mod write;
