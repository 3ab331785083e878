/*!
 * Lock-Free Synchronization Primitives
 *
 * CAS-based structures that never block; safe reclamation via crossbeam-epoch
 */

mod stack;

// Re-export public API
pub use stack::LockFreeStack;
