//! In-memory caches in front of the store.
//!
//! Both are bounded by entry count and expire entries a fixed time after
//! they were written. Neither holds a lock across a store call.

mod group;
mod membership;

pub use group::GroupCache;
pub use membership::MembershipCache;
