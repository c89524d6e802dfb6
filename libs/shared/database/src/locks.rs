use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

type LockTable = HashMap<Uuid, Arc<AsyncMutex<()>>>;

/// One async mutex per doctor, serializing validate-then-commit sequences that
/// touch the same schedule. Entries live only while someone holds or waits on
/// them.
#[derive(Default)]
pub struct DoctorLocks {
    locks: Arc<Mutex<LockTable>>,
}

/// Exclusive section for one doctor. Dropping it releases the lock and removes
/// the table entry when no other task is waiting on it.
pub struct DoctorGuard {
    doctor_id: Uuid,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<Mutex<LockTable>>,
}

fn table(locks: &Mutex<LockTable>) -> MutexGuard<'_, LockTable> {
    locks.lock().unwrap_or_else(PoisonError::into_inner)
}

impl DoctorLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, doctor_id: Uuid) -> DoctorGuard {
        let lock = Arc::clone(table(&self.locks).entry(doctor_id).or_default());

        DoctorGuard {
            doctor_id,
            guard: Some(lock.lock_owned().await),
            locks: Arc::clone(&self.locks),
        }
    }

    /// Doctors currently locked or contended.
    pub fn len(&self) -> usize {
        table(&self.locks).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DoctorGuard {
    pub fn doctor_id(&self) -> Uuid {
        self.doctor_id
    }
}

impl Drop for DoctorGuard {
    fn drop(&mut self) {
        self.guard.take();

        // Waiters clone the entry under the table lock, so a count of one
        // means only the table still refers to it.
        let mut locks = table(&self.locks);
        if locks
            .get(&self.doctor_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.doctor_id);
        }
    }
}
