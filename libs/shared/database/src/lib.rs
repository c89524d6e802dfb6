pub mod locks;
pub mod memory;
pub mod store;
pub mod supabase;

pub use locks::{DoctorGuard, DoctorLocks};
pub use memory::InMemoryStore;
pub use store::{ScheduleStore, StoreError};
pub use supabase::{SupabaseClient, SupabaseStore};
