//! An assortment of non-owning containers.
//!
//! All of these containers have some option to construct them from one (or more) slices of the
//! underlying types instead of allocating resources dynamically.
mod ordered;
mod slice;

pub use self::ordered::Ordered;
pub use self::slice::Slice;
