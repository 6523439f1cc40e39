pub mod availability;
pub mod treatment;

pub use availability::available_slots;
pub use treatment::TreatmentService;
