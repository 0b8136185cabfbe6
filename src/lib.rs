//! Binary codec framework for schema-described RPC calls.
//!
//! `callweave` is the lowest layer of the workspace. It knows nothing about
//! services or transports; it only provides:
//!
//! - A runtime type model ([`types::TypeRef`]) and value model ([`types::Value`])
//!   used to describe method parameters and return values.
//! - An explicit [`types::MemberRegistry`] that identity-based metadata codecs
//!   resolve against.
//! - The [`codec::Codec`] strategy trait, bounds-checked cursors, and the
//!   [`codec::CodecFactory`] that composes codecs recursively.
//!
//! Every codec upholds the size/encode symmetry invariant: the number of bytes
//! written by `encode` is exactly what `calculate_size` reported.

pub mod codec;
pub mod constants;
pub mod types;
