// Command handlers module
pub mod dump;
pub mod probe;

// Re-exports for cleaner imports
pub use dump::execute as dump;
pub use probe::execute as probe;
