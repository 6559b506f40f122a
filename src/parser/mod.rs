pub mod builder;
pub mod extract;
pub mod splitter;
pub mod time;
