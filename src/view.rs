use std::collections::HashMap;

/// Which face of the page a request gets. Resolved once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Questionnaire form; never shows stored leads.
    Client,
    /// Lead listing, export and reports; never shows the form.
    Admin,
}

/// True when the `admin` query parameter is `1`, `true` or `yes` (any case).
pub fn is_admin_request(params: &HashMap<String, String>) -> bool {
    params
        .get("admin")
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

impl ViewMode {
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        if is_admin_request(params) {
            ViewMode::Admin
        } else {
            ViewMode::Client
        }
    }
}
