pub mod gate;
pub mod login;

pub use gate::AccessGate;
pub use login::LoginService;
