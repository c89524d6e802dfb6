pub mod lifecycle;
pub mod validator;

pub use lifecycle::AppointmentLifecycleService;
pub use validator::BookingValidator;
