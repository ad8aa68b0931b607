//! API endpoint implementations.

mod netze;
mod stadtwerke;

pub use netze::NetzeApi;
pub use stadtwerke::StadtwerkeApi;
