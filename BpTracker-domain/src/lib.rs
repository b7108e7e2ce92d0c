// BpTracker Domain
// This crate contains the classification and reporting logic of the tracker

// Services that implement business logic
pub mod services;

// Domain entities
pub mod entities;

// Re-export the data crate's configuration for convenience
pub use bp_tracker_data::config;
