pub mod errors;

pub use errors::{BirksError, BirksErrorCategory, BirksResult};
