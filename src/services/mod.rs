pub mod files;
pub mod importers;
pub mod market_data;
pub mod parsers;
pub mod reports;
pub mod shared;
pub mod taxation;
