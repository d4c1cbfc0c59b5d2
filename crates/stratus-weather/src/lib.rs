//! Weather data access for Stratus.
//!
//! Provides the provider HTTP client (name search + one-call endpoints),
//! the country/city directory client, icon mapping and the domain model.

pub mod directory;
pub mod provider;
pub mod types;

pub use directory::{CityDirectory, CountryCities};
pub use provider::WeatherProvider;
pub use types::*;
