//! Lead Finder API Library
//!
//! This library provides the core functionality for the lead-generation API:
//! turning a business niche and a city into a ranked list of local business
//! leads from Yelp, Foursquare or SerpApi (Google Maps), and exporting them
//! to CSV.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core business logic.
//! - `integrations`: External service integrations.
//! - `categories`: Niche to provider category resolution.
//! - `category_cache`: Provider category taxonomy cache.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `export`: CSV export.
//! - `handlers`: HTTP request handlers.
//! - `models`: Core data models.
//! - `normalize`: Provider record to lead mapping.
//! - `providers`: Provider capability traits and selection.
//! - `ranking`: Relevance threshold, ranking and sorting.
//! - `relevance`: Relevance scoring.
//! - `search`: Search pipeline.
//! - `services`: Provider clients (Yelp, Foursquare, SerpApi).

pub mod api;
pub mod core;
pub mod integrations;

// Re-export primary modules for shared use in tests and other binaries
pub mod categories;
pub mod category_cache;
pub mod config;
pub mod errors;
pub mod export;
pub mod handlers;
pub mod models;
pub mod normalize;
pub mod providers;
pub mod ranking;
pub mod relevance;
pub mod search;
pub mod services;
