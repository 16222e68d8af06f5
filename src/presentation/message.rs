use crate::application::models::appointment::{AppointmentDay, SearchResult, Term};

/// Human-readable notification for one available term.
pub fn format_term_message(label: &str, day: &AppointmentDay, term: &Term) -> String {
    let mut message = format!(
        "[{}] {} {}-{}, {}, {}",
        label,
        day.date,
        term.start_time,
        term.end_time,
        doctor_label(term),
        term.clinic_name
    );
    if term.is_telemedicine {
        message.push_str(" (telemedicine)");
    }
    message
}

/// One message per available term of a successful result.
pub fn format_result_messages(label: &str, result: &SearchResult) -> Vec<String> {
    result
        .available_terms()
        .map(|(day, term)| format_term_message(label, day, term))
        .collect()
}

fn doctor_label(term: &Term) -> String {
    let name = term.doctor.full_name();
    match term.doctor.title.trim() {
        "" => name,
        title => format!("{title} {name}"),
    }
}
