// Core engine services
pub mod depots;
pub mod locations;
pub mod movements;
pub mod pallets;
pub mod shipments;

// Derived statistics
pub mod occupancy;

// Master data registries
pub mod clients;
pub mod products;
