//! Scoped URL-key resolution.
//!
//! ## Summary
//! Turns a candidate value on an entity into a request path that no other
//! entity already owns in any of the store scopes the attribute is visible
//! in. Collaborators (path index, scope registry, config lookup) are traits
//! so the resolver can run against any backing store.

pub mod entity;
pub mod error;
pub mod index;
pub mod path;
pub mod resolver;
pub mod scope;
pub mod token;

pub use error::{ServiceError, ServiceResult};
pub use resolver::{Generated, ScopedSlugResolver};
