//! typefact core library: type qualification, hierarchy and composition
//! facts, and type change classification.
//!
//! The usual flow builds a [`global_context::GlobalContext`] for one commit,
//! wraps each changed type in a [`type_fact::TypeFact`], and hands pairs of
//! facts to [`classify::semantic`].

pub mod classify;
pub mod composition;
pub mod config;
pub mod context;
pub mod deps;
pub mod error;
pub mod global_context;
pub mod hierarchy;
pub mod jdk;
pub mod qualify;
pub mod type_fact;

pub use classify::{ChangeTag, TypeChange, classify, semantic, syntactic};
pub use config::TypeFactConfig;
pub use context::Context;
pub use error::{Result, TypeFactError};
pub use global_context::{FileStatus, GlobalContext, Information, SourceFile};
pub use hierarchy::HierarchyRelation;
pub use qualify::Qualifier;
pub use type_fact::TypeFact;
