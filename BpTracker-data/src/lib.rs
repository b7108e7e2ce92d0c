// BpTracker Data
// This crate handles the flat-file data store of blood pressure readings

// Data file configuration
pub mod config;

// Repository implementations for data access
pub mod repository;

// Data storage models
pub mod models;
