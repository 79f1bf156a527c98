// Utilities: the location graph and the instance loader

pub mod graph;
pub mod loader;

pub use self::graph::Graph;
pub use self::loader::load_instance;
