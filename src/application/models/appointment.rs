/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parameters of a single availability search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub service_variant_id: u32,
    pub language_id: u32,
    pub city_id: u32,
    pub city_name: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}

impl SearchQuery {
    /// Query string pairs in the form the terms endpoint expects.
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        vec![
            ("searchPlace.id".to_string(), self.city_id.to_string()),
            ("searchPlace.name".to_string(), self.city_name.clone()),
            (
                "serviceVariantId".to_string(),
                self.service_variant_id.to_string(),
            ),
            ("languageId".to_string(), self.language_id.to_string()),
            (
                "searchDateFrom".to_string(),
                self.date_from.format(DATE_FORMAT).to_string(),
            ),
            (
                "searchDateTo".to_string(),
                self.date_to.format(DATE_FORMAT).to_string(),
            ),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Doctor {
    #[serde(rename = "academicTitle", default)]
    pub title: String,
    #[serde(rename = "firstName", default)]
    pub first_name: String,
    #[serde(rename = "lastName", default)]
    pub last_name: String,
}

impl Doctor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// A bookable slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    #[serde(rename = "dateTimeFrom")]
    pub start_time: String,
    #[serde(rename = "dateTimeTo")]
    pub end_time: String,
    #[serde(default)]
    pub doctor: Doctor,
    #[serde(rename = "clinicId", default)]
    pub clinic_id: i64,
    #[serde(rename = "clinic", default)]
    pub clinic_name: String,
    #[serde(rename = "clinicGroup", default)]
    pub clinic_group: String,
    #[serde(rename = "isTelemedicine", default)]
    pub is_telemedicine: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentDay {
    #[serde(rename = "day")]
    pub date: String,
    #[serde(default)]
    pub terms: Vec<Term>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub(crate) struct TermsForService {
    #[serde(rename = "serviceVariantId", default)]
    pub(crate) service_variant_id: i64,
    #[serde(rename = "termsForDays", default)]
    pub(crate) terms_for_days: Vec<AppointmentDay>,
}

/// Raw body of the terms endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TermsResponse {
    #[serde(rename = "correlationId", default)]
    pub(crate) correlation_id: Option<String>,
    pub(crate) success: bool,
    #[serde(rename = "termsForService", default)]
    pub(crate) terms_for_service: Option<TermsForService>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchResult {
    pub success: bool,
    pub days: Vec<AppointmentDay>,
    pub correlation_id: Option<String>,
}

impl SearchResult {
    /// Every term of a successful result, paired with its day.
    pub fn available_terms(&self) -> impl Iterator<Item = (&AppointmentDay, &Term)> {
        self.days
            .iter()
            .filter(|_| self.success)
            .flat_map(|day| day.terms.iter().map(move |term| (day, term)))
    }

    pub fn has_available_terms(&self) -> bool {
        self.available_terms().next().is_some()
    }
}

impl From<TermsResponse> for SearchResult {
    fn from(response: TermsResponse) -> Self {
        SearchResult {
            success: response.success,
            days: response
                .terms_for_service
                .map(|service| service.terms_for_days)
                .unwrap_or_default(),
            correlation_id: response.correlation_id,
        }
    }
}
