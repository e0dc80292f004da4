pub mod products;

pub use products::ProductBreakdown;
