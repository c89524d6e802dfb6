use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method, StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, error};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::clinic::{Admin, Appointment, Doctor, Patient, Prescription};

use crate::store::{ScheduleStore, StoreError};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
/// Postgres `timestamp` keeps microseconds and rounds anything finer, which
/// would push `23:59:59.999999999` onto the next day.
const RANGE_BOUND_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Thin PostgREST client authenticated with the service key.
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    service_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_base_url(&config.supabase_url, &config.supabase_service_key)
    }

    pub fn with_base_url(base_url: &str, service_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
        }
    }

    fn get_headers(&self) -> Result<HeaderMap, StoreError> {
        let mut headers = HeaderMap::new();

        let key = HeaderValue::from_str(&self.service_key)
            .map_err(|e| StoreError::Backend(format!("Invalid service key header: {}", e)))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.service_key))
            .map_err(|e| StoreError::Backend(format!("Invalid service key header: {}", e)))?;

        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T, StoreError>
    where T: DeserializeOwned {
        self.request_with_headers(method, path, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T, StoreError>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers()?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("API error ({}): {}", status, error_text);

            return Err(match status {
                StatusCode::CONFLICT => StoreError::Conflict(error_text),
                _ => StoreError::Backend(format!("API error ({}): {}", status, error_text)),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    fn representation_headers(prefer: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static(prefer));
        headers
    }

    async fn fetch_rows<T>(&self, path: &str) -> Result<Vec<T>, StoreError>
    where T: DeserializeOwned {
        let rows: Vec<Value> = self.request(Method::GET, path, None).await?;
        rows.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn fetch_one<T>(&self, path: &str) -> Result<Option<T>, StoreError>
    where T: DeserializeOwned {
        Ok(self.fetch_rows(path).await?.into_iter().next())
    }

    async fn upsert<T>(&self, table: &str, body: Value) -> Result<T, StoreError>
    where T: DeserializeOwned {
        let path = format!("/rest/v1/{}", table);
        let headers = Self::representation_headers("resolution=merge-duplicates,return=representation");

        let result: Vec<Value> = self
            .request_with_headers(Method::POST, &path, Some(body), Some(headers))
            .await?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Backend(format!("Upsert into {} returned no rows", table)))?;

        serde_json::from_value(row).map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn delete_where(&self, table: &str, filter: &str) -> Result<usize, StoreError> {
        let path = format!("/rest/v1/{}?{}", table, filter);
        let headers = Self::representation_headers("return=representation");

        let deleted: Vec<Value> = self
            .request_with_headers(Method::DELETE, &path, None, Some(headers))
            .await?;

        Ok(deleted.len())
    }

}

fn eq(value: &str) -> String {
    format!("eq.{}", urlencoding::encode(value))
}

fn range_bound(value: NaiveDateTime) -> String {
    urlencoding::encode(&value.format(RANGE_BOUND_FORMAT).to_string()).into_owned()
}

/// [`ScheduleStore`] over PostgREST tables `admins`, `doctors`, `patients`,
/// `appointments` and `prescriptions`. The `appointments` table is expected to
/// carry a unique index on `(doctor_id, appointment_time)` and `prescriptions`
/// one on `appointment_id`, with `on delete cascade` to its appointment;
/// PostgREST reports violations as HTTP 409, surfaced here as
/// [`StoreError::Conflict`].
pub struct SupabaseStore {
    client: SupabaseClient,
}

impl SupabaseStore {
    pub fn new(config: &AppConfig) -> Self {
        Self { client: SupabaseClient::new(config) }
    }

    pub fn from_client(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ScheduleStore for SupabaseStore {
    async fn find_admin_by_username(&self, username: &str) -> Result<Option<Admin>, StoreError> {
        let path = format!("/rest/v1/admins?username={}", eq(username));
        self.client.fetch_one(&path).await
    }

    async fn save_admin(&self, admin: Admin) -> Result<Admin, StoreError> {
        let body = json!({
            "id": admin.id,
            "username": admin.username,
            "password": admin.password,
        });
        self.client.upsert("admins", body).await
    }

    async fn find_doctor_by_id(&self, id: Uuid) -> Result<Option<Doctor>, StoreError> {
        let path = format!("/rest/v1/doctors?id=eq.{}", id);
        self.client.fetch_one(&path).await
    }

    async fn find_doctor_by_email(&self, email: &str) -> Result<Option<Doctor>, StoreError> {
        let path = format!("/rest/v1/doctors?email={}", eq(email));
        self.client.fetch_one(&path).await
    }

    async fn doctor_exists(&self, id: Uuid) -> Result<bool, StoreError> {
        let path = format!("/rest/v1/doctors?id=eq.{}&select=id", id);
        let rows: Vec<Value> = self.client.request(Method::GET, &path, None).await?;
        Ok(!rows.is_empty())
    }

    async fn list_doctors(&self) -> Result<Vec<Doctor>, StoreError> {
        self.client.fetch_rows("/rest/v1/doctors?order=name.asc").await
    }

    async fn save_doctor(&self, doctor: Doctor) -> Result<Doctor, StoreError> {
        let body = json!({
            "id": doctor.id,
            "name": doctor.name,
            "email": doctor.email,
            "password": doctor.password,
            "specialty": doctor.specialty,
            "available_times": doctor.available_times,
        });
        self.client.upsert("doctors", body).await
    }

    async fn delete_doctor(&self, id: Uuid) -> Result<bool, StoreError> {
        let deleted = self.client.delete_where("doctors", &format!("id=eq.{}", id)).await?;
        Ok(deleted > 0)
    }

    async fn find_patient_by_id(&self, id: Uuid) -> Result<Option<Patient>, StoreError> {
        let path = format!("/rest/v1/patients?id=eq.{}", id);
        self.client.fetch_one(&path).await
    }

    async fn find_patient_by_email(&self, email: &str) -> Result<Option<Patient>, StoreError> {
        let path = format!("/rest/v1/patients?email={}", eq(email));
        self.client.fetch_one(&path).await
    }

    async fn find_patient_by_email_or_phone(
        &self,
        email: &str,
        phone: &str,
    ) -> Result<Option<Patient>, StoreError> {
        let condition = format!(
            "(email.eq.\"{}\",phone.eq.\"{}\")",
            email.replace('"', "\\\""),
            phone.replace('"', "\\\"")
        );
        let path = format!("/rest/v1/patients?or={}&limit=1", urlencoding::encode(&condition));
        self.client.fetch_one(&path).await
    }

    async fn save_patient(&self, patient: Patient) -> Result<Patient, StoreError> {
        let body = json!({
            "id": patient.id,
            "name": patient.name,
            "email": patient.email,
            "phone": patient.phone,
            "address": patient.address,
            "password": patient.password,
        });
        self.client.upsert("patients", body).await
    }

    async fn delete_patient(&self, id: Uuid) -> Result<bool, StoreError> {
        let deleted = self.client.delete_where("patients", &format!("id=eq.{}", id)).await?;
        Ok(deleted > 0)
    }

    async fn find_appointment_by_id(&self, id: Uuid) -> Result<Option<Appointment>, StoreError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        self.client.fetch_one(&path).await
    }

    async fn find_appointments_by_doctor_and_time_range(
        &self,
        doctor_id: Uuid,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Appointment>, StoreError> {
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&appointment_time=gte.{}&appointment_time=lte.{}&order=appointment_time.asc",
            doctor_id,
            range_bound(start),
            range_bound(end)
        );
        self.client.fetch_rows(&path).await
    }

    async fn find_appointments_by_patient(&self, patient_id: Uuid) -> Result<Vec<Appointment>, StoreError> {
        let path = format!(
            "/rest/v1/appointments?patient_id=eq.{}&order=appointment_time.asc",
            patient_id
        );
        self.client.fetch_rows(&path).await
    }

    async fn save_appointment(&self, appointment: Appointment) -> Result<Appointment, StoreError> {
        let body = json!({
            "id": appointment.id,
            "doctor_id": appointment.doctor_id,
            "patient_id": appointment.patient_id,
            "appointment_time": appointment.appointment_time.format(TIMESTAMP_FORMAT).to_string(),
            "status": appointment.status.as_flag(),
        });
        self.client.upsert("appointments", body).await
    }

    async fn delete_appointment(&self, id: Uuid) -> Result<bool, StoreError> {
        let deleted = self.client.delete_where("appointments", &format!("id=eq.{}", id)).await?;
        Ok(deleted > 0)
    }

    async fn delete_appointments_by_doctor(&self, doctor_id: Uuid) -> Result<usize, StoreError> {
        self.client
            .delete_where("appointments", &format!("doctor_id=eq.{}", doctor_id))
            .await
    }

    async fn find_prescription_by_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Option<Prescription>, StoreError> {
        let path = format!("/rest/v1/prescriptions?appointment_id=eq.{}", appointment_id);
        self.client.fetch_one(&path).await
    }

    async fn save_prescription(&self, prescription: Prescription) -> Result<Prescription, StoreError> {
        let body = json!({
            "id": prescription.id,
            "appointment_id": prescription.appointment_id,
            "patient_name": prescription.patient_name,
            "medication": prescription.medication,
            "dosage": prescription.dosage,
            "doctor_notes": prescription.doctor_notes,
        });
        self.client.upsert("prescriptions", body).await
    }
}
