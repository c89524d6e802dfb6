use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_models::clinic::{Admin, Appointment, Doctor, Patient, Prescription};

use crate::store::{ScheduleStore, StoreError};

#[derive(Default)]
struct Tables {
    admins: HashMap<Uuid, Admin>,
    doctors: HashMap<Uuid, Doctor>,
    patients: HashMap<Uuid, Patient>,
    appointments: HashMap<Uuid, Appointment>,
    prescriptions: HashMap<Uuid, Prescription>,
}

/// Process-local store with the same constraints a relational schema would
/// carry: unique doctor email, unique patient email and phone, appointments
/// referencing existing rows, one appointment per doctor per start time and
/// one prescription per appointment.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn by_time(mut appointments: Vec<Appointment>) -> Vec<Appointment> {
    appointments.sort_by(|a, b| a.appointment_time.cmp(&b.appointment_time));
    appointments
}

#[async_trait]
impl ScheduleStore for InMemoryStore {
    async fn find_admin_by_username(&self, username: &str) -> Result<Option<Admin>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.admins.values().find(|a| a.username == username).cloned())
    }

    async fn save_admin(&self, admin: Admin) -> Result<Admin, StoreError> {
        let mut tables = self.tables.write().await;

        if tables.admins.values().any(|a| a.username == admin.username && a.id != admin.id) {
            return Err(StoreError::Conflict(format!("admin username {} already exists", admin.username)));
        }

        tables.admins.insert(admin.id, admin.clone());
        Ok(admin)
    }

    async fn find_doctor_by_id(&self, id: Uuid) -> Result<Option<Doctor>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.doctors.get(&id).cloned())
    }

    async fn find_doctor_by_email(&self, email: &str) -> Result<Option<Doctor>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.doctors.values().find(|d| d.email == email).cloned())
    }

    async fn doctor_exists(&self, id: Uuid) -> Result<bool, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.doctors.contains_key(&id))
    }

    async fn list_doctors(&self) -> Result<Vec<Doctor>, StoreError> {
        let tables = self.tables.read().await;
        let mut doctors: Vec<Doctor> = tables.doctors.values().cloned().collect();
        doctors.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(doctors)
    }

    async fn save_doctor(&self, doctor: Doctor) -> Result<Doctor, StoreError> {
        let mut tables = self.tables.write().await;

        if tables.doctors.values().any(|d| d.email == doctor.email && d.id != doctor.id) {
            return Err(StoreError::Conflict(format!("doctor email {} already exists", doctor.email)));
        }

        tables.doctors.insert(doctor.id, doctor.clone());
        Ok(doctor)
    }

    async fn delete_doctor(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;

        if tables.appointments.values().any(|a| a.doctor_id == id) {
            return Err(StoreError::Conflict(format!("doctor {} still has appointments", id)));
        }

        Ok(tables.doctors.remove(&id).is_some())
    }

    async fn find_patient_by_id(&self, id: Uuid) -> Result<Option<Patient>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.patients.get(&id).cloned())
    }

    async fn find_patient_by_email(&self, email: &str) -> Result<Option<Patient>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.patients.values().find(|p| p.email == email).cloned())
    }

    async fn find_patient_by_email_or_phone(
        &self,
        email: &str,
        phone: &str,
    ) -> Result<Option<Patient>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .patients
            .values()
            .find(|p| p.email == email || p.phone == phone)
            .cloned())
    }

    async fn save_patient(&self, patient: Patient) -> Result<Patient, StoreError> {
        let mut tables = self.tables.write().await;

        let duplicate = tables.patients.values().any(|p| {
            p.id != patient.id && (p.email == patient.email || p.phone == patient.phone)
        });
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "patient with email {} or phone {} already exists",
                patient.email, patient.phone
            )));
        }

        tables.patients.insert(patient.id, patient.clone());
        Ok(patient)
    }

    async fn delete_patient(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;

        if tables.appointments.values().any(|a| a.patient_id == id) {
            return Err(StoreError::Conflict(format!("patient {} still has appointments", id)));
        }

        Ok(tables.patients.remove(&id).is_some())
    }

    async fn find_appointment_by_id(&self, id: Uuid) -> Result<Option<Appointment>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.appointments.get(&id).cloned())
    }

    async fn find_appointments_by_doctor_and_time_range(
        &self,
        doctor_id: Uuid,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Appointment>, StoreError> {
        let tables = self.tables.read().await;
        let appointments = tables
            .appointments
            .values()
            .filter(|a| a.doctor_id == doctor_id)
            .filter(|a| a.appointment_time >= start && a.appointment_time <= end)
            .cloned()
            .collect();

        Ok(by_time(appointments))
    }

    async fn find_appointments_by_patient(&self, patient_id: Uuid) -> Result<Vec<Appointment>, StoreError> {
        let tables = self.tables.read().await;
        let appointments = tables
            .appointments
            .values()
            .filter(|a| a.patient_id == patient_id)
            .cloned()
            .collect();

        Ok(by_time(appointments))
    }

    async fn save_appointment(&self, appointment: Appointment) -> Result<Appointment, StoreError> {
        let mut tables = self.tables.write().await;

        if !tables.doctors.contains_key(&appointment.doctor_id) {
            return Err(StoreError::Conflict(format!("doctor {} does not exist", appointment.doctor_id)));
        }
        if !tables.patients.contains_key(&appointment.patient_id) {
            return Err(StoreError::Conflict(format!("patient {} does not exist", appointment.patient_id)));
        }

        let slot_taken = tables.appointments.values().any(|a| {
            a.id != appointment.id
                && a.doctor_id == appointment.doctor_id
                && a.appointment_time == appointment.appointment_time
        });
        if slot_taken {
            debug!(
                "Rejecting appointment {}: doctor {} already booked at {}",
                appointment.id, appointment.doctor_id, appointment.appointment_time
            );
            return Err(StoreError::Conflict(format!(
                "doctor {} already has an appointment at {}",
                appointment.doctor_id, appointment.appointment_time
            )));
        }

        tables.appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn delete_appointment(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        tables.prescriptions.retain(|_, p| p.appointment_id != id);
        Ok(tables.appointments.remove(&id).is_some())
    }

    async fn delete_appointments_by_doctor(&self, doctor_id: Uuid) -> Result<usize, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.appointments.len();
        tables.appointments.retain(|_, a| a.doctor_id != doctor_id);

        let Tables { appointments, prescriptions, .. } = &mut *tables;
        prescriptions.retain(|_, p| appointments.contains_key(&p.appointment_id));

        Ok(before - appointments.len())
    }

    async fn find_prescription_by_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Option<Prescription>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .prescriptions
            .values()
            .find(|p| p.appointment_id == appointment_id)
            .cloned())
    }

    async fn save_prescription(&self, prescription: Prescription) -> Result<Prescription, StoreError> {
        let mut tables = self.tables.write().await;

        if !tables.appointments.contains_key(&prescription.appointment_id) {
            return Err(StoreError::Conflict(format!(
                "appointment {} does not exist",
                prescription.appointment_id
            )));
        }

        let duplicate = tables
            .prescriptions
            .values()
            .any(|p| p.appointment_id == prescription.appointment_id && p.id != prescription.id);
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "appointment {} already has a prescription",
                prescription.appointment_id
            )));
        }

        tables.prescriptions.insert(prescription.id, prescription.clone());
        Ok(prescription)
    }
}
