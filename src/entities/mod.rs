// Entity Models
// Identity persists, names vary: every registry normalizes many spellings
// onto one stable code.

pub mod country;

pub use country::{Country, CountryRegistry, Lookup};
