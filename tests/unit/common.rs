use async_trait::async_trait;
use luxmed_checker::application::models::appointment::SearchQuery;
use luxmed_checker::application::services::availability_service::AvailabilityClient;
use luxmed_checker::application::services::notifier::Notifier;
use luxmed_checker::config::Credentials;
use luxmed_checker::error::AppError;
use luxmed_checker::session::manager::SessionManager;
use luxmed_checker::storage::cookie_store::MemoryCookieStore;
use luxmed_checker::transport::http_client::PortalHttpClient;
use chrono::NaiveDate;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
pub struct CollectingNotifier {
    messages: Mutex<Vec<String>>,
}

impl CollectingNotifier {
    pub fn sent(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for CollectingNotifier {
    async fn send(&self, message: &str) -> Result<(), AppError> {
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

pub fn query(service_variant_id: u32) -> SearchQuery {
    SearchQuery {
        service_variant_id,
        language_id: 10,
        city_id: 1,
        city_name: "Warszawa".to_string(),
        date_from: NaiveDate::from_ymd_opt(2024, 12, 10).unwrap(),
        date_to: NaiveDate::from_ymd_opt(2024, 12, 23).unwrap(),
    }
}

pub fn login_body(token: &str) -> String {
    json!({"succeeded": true, "token": token, "errorMessage": null}).to_string()
}

pub fn terms_body() -> String {
    json!({
        "correlationId": "c-1",
        "success": true,
        "termsForService": {
            "serviceVariantId": 4480,
            "termsForDays": [{
                "day": "2024-12-15",
                "terms": [{
                    "dateTimeFrom": "09:00",
                    "dateTimeTo": "09:30",
                    "doctor": {"academicTitle": "", "firstName": "Anna", "lastName": "Kowalska"},
                    "clinicId": 7,
                    "clinic": "Center A",
                    "clinicGroup": "Warszawa",
                    "isTelemedicine": false
                }]
            }]
        }
    })
    .to_string()
}

pub fn client_for(
    base_url: &str,
    store: Arc<MemoryCookieStore>,
) -> Arc<AvailabilityClient<PortalHttpClient>> {
    let transport = Arc::new(PortalHttpClient::new(base_url, Duration::from_secs(5)).unwrap());
    let session = Arc::new(
        SessionManager::new(
            transport.clone(),
            Credentials {
                username: "test_user".to_string(),
                password: "test_password".to_string(),
            },
            store,
        )
        .with_liveness_probe(false),
    );
    Arc::new(AvailabilityClient::new(session, transport))
}
