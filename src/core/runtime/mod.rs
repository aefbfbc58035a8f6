//! Read-only boundary to the runtime's management interfaces.
//!
//! Every source is optional: a missing capability is modeled as `None`
//! (or an empty list), never as an error. The registry branches on
//! presence once, at registration time.

mod beans;
pub mod stubs;

pub use beans::{
    BufferPoolSource, ClassLoadingSource, CompilationSource, GcCollectorSource, ManagementBeans,
    MemoryPoolSource, MemorySource, MemoryUsage, OsSource, RuntimeSource, ThreadSource,
};
