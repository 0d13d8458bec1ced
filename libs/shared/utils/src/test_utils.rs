use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            supabase_service_role_key: "test-service-role-key".to_string(),
        }
    }
}

impl TestConfig {
    /// Config pointed at a mock PostgREST server.
    pub fn with_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_service_role_key: self.supabase_service_role_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
            ..AppConfig::default()
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self::patient("pasien@example.com")
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "PATIENT")
    }

    pub fn therapist(email: &str) -> Self {
        Self::new(email, "THERAPIST")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "ADMIN")
    }

    pub fn uuid(&self) -> Uuid {
        Uuid::parse_str(&self.id).unwrap_or_default()
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            metadata: None,
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    /// Supabase-shaped token: `role` is always `authenticated`, the application
    /// role travels in `app_metadata`.
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": "authenticated",
            "app_metadata": { "role": user.role },
            "aud": "authenticated",
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature_encoded =
            general_purpose::URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// PostgREST row fixtures.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn therapist_response(therapist_id: &str, price_per_session: i64, is_available: bool) -> Value {
        json!({
            "id": therapist_id,
            "full_name": "Rina Fisioterapis",
            "specializations": ["Musculoskeletal", "Sports Injury"],
            "location": "Jakarta Selatan",
            "bio": "Home-visit physiotherapy",
            "experience_years": 6,
            "price_per_session": price_per_session,
            "rating": 4.8,
            "is_available": is_available,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn availability_response(therapist_id: &str, day_of_week: u8, start: &str, end: &str) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "therapist_id": therapist_id,
            "day_of_week": day_of_week,
            "start_time": start,
            "end_time": end,
            "is_active": true
        })
    }

    pub fn booking_response(booking_id: &str, patient_id: &str, therapist_id: &str, status: &str) -> Value {
        json!({
            "id": booking_id,
            "patient_id": patient_id,
            "therapist_id": therapist_id,
            "appointment_date": "2024-12-25",
            "appointment_time": "10:00",
            "location": "Jl. Melati No. 5, Jakarta",
            "complaint": "Nyeri punggung bawah",
            "medical_history": null,
            "notes": null,
            "status": status,
            "has_consent": false,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn consent_response(consent_id: &str, booking_id: &str, patient_id: &str, is_agreed: bool) -> Value {
        json!({
            "id": consent_id,
            "booking_id": booking_id,
            "patient_id": patient_id,
            "consent_version": "1.0",
            "consent_text": "PERSETUJUAN TINDAKAN FISIOTERAPI",
            "agree_examination": is_agreed,
            "agree_procedure": is_agreed,
            "agree_risks": is_agreed,
            "agree_data_usage": is_agreed,
            "agree_emergency": is_agreed,
            "is_agreed": is_agreed,
            "agreed_at": if is_agreed { json!("2024-01-02T00:00:00Z") } else { Value::Null },
            "ip_address": null,
            "device_info": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn payment_response(payment_id: &str, booking_id: &str, status: &str, amount: i64) -> Value {
        json!({
            "id": payment_id,
            "booking_id": booking_id,
            "amount": amount,
            "method": "BANK_TRANSFER",
            "status": status,
            "payment_proof": null,
            "verified_at": null,
            "verified_by": null,
            "notes": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn notification_response(user_id: &str, title: &str) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "user_id": user_id,
            "title": title,
            "message": title,
            "type": "BOOKING",
            "data": null,
            "is_read": false,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn patient_response(patient_id: &str, full_name: &str) -> Value {
        json!({
            "id": patient_id,
            "full_name": full_name,
            "phone": "081234567890",
            "date_of_birth": "1990-04-17",
            "gender": "female",
            "address": "Jl. Melati No. 5, Jakarta",
            "medical_history": null,
            "emergency_contact": { "name": "Andi", "phone": "081298765432", "relationship": "spouse" },
            "profile_image": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn error_response(message: &str, code: &str) -> Value {
        json!({
            "message": message,
            "code": code
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let app_config = TestConfig::with_url("http://127.0.0.1:9999").to_app_config();

        assert_eq!(app_config.supabase_url, "http://127.0.0.1:9999");
        assert_eq!(app_config.supabase_anon_key, "test-anon-key");
        assert!(app_config.is_configured());
        assert!(app_config.is_notification_worker_configured());
    }

    #[test]
    fn test_user_creation() {
        let user = TestUser::therapist("terapis@example.com");
        assert_eq!(user.role, "THERAPIST");

        let user_model = user.to_user();
        assert_eq!(user_model.role, Some("THERAPIST".to_string()));
        assert_eq!(user_model.id, user.id);
        assert_eq!(user.uuid().to_string(), user.id);
    }
}
