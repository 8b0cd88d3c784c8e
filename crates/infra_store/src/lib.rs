//! Store Adapters
//!
//! Implementations of the approval domain's store ports. The in-memory
//! adapter backs the API server and tests; a relational adapter would
//! implement the same traits behind the same `PortError` contract.

pub mod memory;

pub use memory::MemoryStore;
