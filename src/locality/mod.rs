//! Locality (borough / municipality) name resolution.

mod aliases;
mod catalog;
mod mapper;

pub use aliases::AliasTable;
pub use catalog::{BUILTIN_ALIASES, CANONICAL_LOCALITIES};
pub use mapper::{AddressComponentMapper, LocalityMatch, MatchStrategy};
