pub mod loader;

pub use loader::read_source;
