//! Database operations for the inventory service
//!
//! One module per entity store. Cross-entity consistency rules (name
//! uniqueness, reference existence checks, the item deletion guard, and
//! read-time joins) live inside these operations rather than as a separate
//! addressable component.

pub mod categories;
pub mod items;
pub mod kits;
