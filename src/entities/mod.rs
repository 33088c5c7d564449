//! SeaORM entities for the warehouse data model.
//!
//! Ownership: a depot owns racks, a rack owns slots, a shipment owns its
//! lines. The slot/pallet association is a mutual exclusive reference kept
//! in sync inside every transaction, not an ownership relation.

pub mod client;
pub mod depot;
pub mod movement;
pub mod pallet;
pub mod product;
pub mod rack;
pub mod shipment;
pub mod shipment_line;
pub mod slot;
