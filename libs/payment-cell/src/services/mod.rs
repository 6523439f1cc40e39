pub mod stripe;

pub use stripe::{amount_in_minor_units, StripeClient};
