use newsteps::dto::{
    CreateShoeDto, DashboardStatsDto, DonationQueryDto, LoginDto, MessageDto, SessionDto, ShoeQueryDto,
    TestEmailDto, UpdateDonationStatusDto, UpdateOrderStatusDto, UpdateRoleDto, UpdateSettingDto, UpdateShoeDto,
    UpdateVolunteerStatusDto,
};
use newsteps::models::{
    Donation, DonationStatus, Email, EmailStatus, OrderStatus, OrderWithItems, Role, Setting, Shoe, User, Volunteer,
    VolunteerStatus,
};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;

/// Error type for CLI client operations
#[derive(Debug)]
pub enum ClientError {
    /// Server returned an error status with a message body
    Server { status: reqwest::StatusCode, message: String },
    /// Network/connection/request error
    Request(reqwest::Error),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Server { status, message } => {
                write!(f, "Server error ({}): {}", status.as_u16(), message)
            }
            ClientError::Request(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Request(err) => Some(err),
            ClientError::Server { .. } => None,
        }
    }
}

/// Extension trait for checking HTTP responses and extracting server error messages
trait ResponseExt {
    /// Checks for error status and extracts the server's error message body
    async fn check(self) -> Result<reqwest::Response, ClientError>;
}

impl ResponseExt for reqwest::Response {
    async fn check(self) -> Result<reqwest::Response, ClientError> {
        if self.status().is_success() {
            return Ok(self);
        }
        let status = self.status();
        let message = match self.json::<serde_json::Value>().await {
            Ok(body) => body.get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("Unknown error")
                .to_string(),
            Err(_) => format!("HTTP {}", status),
        };
        Err(ClientError::Server { status, message })
    }
}

/// Builds query parameters for the shoe catalog
fn shoe_query_params(query: &ShoeQueryDto) -> Vec<(&'static str, String)> {
    let mut params: Vec<(&'static str, String)> = Vec::new();

    if let Some(status) = query.status {
        params.push(("status", status.to_string()));
    }
    if let Some(ref gender) = query.gender {
        params.push(("gender", gender.clone()));
    }
    for size in &query.size {
        params.push(("size", size.clone()));
    }
    if let Some(ref sport) = query.sport {
        params.push(("sport", sport.clone()));
    }
    if let Some(ref brand) = query.brand {
        params.push(("brand", brand.clone()));
    }
    if let Some(ref search) = query.search {
        params.push(("search", search.clone()));
    }
    if query.include_hidden {
        params.push(("include_hidden", "true".to_string()));
    }

    params
}

/// Builds query parameters for the donation list
fn donation_query_params(query: &DonationQueryDto) -> Vec<(&'static str, String)> {
    let mut params: Vec<(&'static str, String)> = Vec::new();

    if let Some(status) = query.status {
        params.push(("status", status.to_string()));
    }
    if let Some(kind) = query.kind {
        params.push(("kind", kind.to_string()));
    }
    if let Some(ref search) = query.search {
        params.push(("search", search.clone()));
    }

    params
}

/// HTTP client wrapper for communicating with the New Steps server
pub struct NewStepsClient {
    /// The base URL of the server (e.g. "http://localhost:3000")
    base_url: String,
    /// Session token sent as a bearer credential, if signed in
    token: Option<String>,
    /// The underlying HTTP client
    client: Client,
}

impl NewStepsClient {
    /// Creates a new NewStepsClient
    ///
    /// ### Arguments
    ///
    /// * `base_url` - The base URL of the New Steps server
    /// * `token` - A session token from `login`, for endpoints that need one
    pub fn new(base_url: String, token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client: Client::new(),
        }
    }

    /// Starts a request to `path`, attaching the session token when present
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends a request and decodes the JSON body of a successful response
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await.map_err(ClientError::Request)?.check().await?;
        response.json().await.map_err(ClientError::Request)
    }

    // ── Auth ────────────────────────────────────────────────────────

    /// Signs in and returns the new session
    pub async fn login(&self, email: String, password: String) -> Result<SessionDto, ClientError> {
        let dto = LoginDto { email, password };
        self.send(self.request(Method::POST, "/auth/login").json(&dto)).await
    }

    /// Returns the account the token belongs to
    pub async fn me(&self) -> Result<User, ClientError> {
        self.send(self.request(Method::GET, "/auth/me")).await
    }

    // ── Shoes ───────────────────────────────────────────────────────

    /// Lists shoes matching the filters
    pub async fn list_shoes(&self, query: &ShoeQueryDto) -> Result<Vec<Shoe>, ClientError> {
        let params = shoe_query_params(query);
        self.send(self.request(Method::GET, "/shoes").query(&params)).await
    }

    pub async fn get_shoe(&self, id: &str) -> Result<Shoe, ClientError> {
        self.send(self.request(Method::GET, &format!("/shoes/{}", id))).await
    }

    pub async fn create_shoe(&self, dto: &CreateShoeDto) -> Result<Shoe, ClientError> {
        self.send(self.request(Method::POST, "/shoes").json(dto)).await
    }

    pub async fn update_shoe(&self, id: &str, dto: &UpdateShoeDto) -> Result<Shoe, ClientError> {
        self.send(self.request(Method::PATCH, &format!("/shoes/{}", id)).json(dto)).await
    }

    pub async fn delete_shoe(&self, id: &str) -> Result<MessageDto, ClientError> {
        self.send(self.request(Method::DELETE, &format!("/shoes/{}", id))).await
    }

    // ── Donations ───────────────────────────────────────────────────

    pub async fn list_donations(&self, query: &DonationQueryDto) -> Result<Vec<Donation>, ClientError> {
        let params = donation_query_params(query);
        self.send(self.request(Method::GET, "/donations").query(&params)).await
    }

    /// Gets a donation by ID, or by reference when given one like `DON-...`
    pub async fn get_donation(&self, id_or_reference: &str) -> Result<Donation, ClientError> {
        let path = if id_or_reference.to_ascii_uppercase().starts_with("DON-") {
            format!("/donations/reference/{}", id_or_reference)
        } else {
            format!("/donations/{}", id_or_reference)
        };
        self.send(self.request(Method::GET, &path)).await
    }

    pub async fn update_donation_status(
        &self,
        id: &str,
        status: DonationStatus,
        note: Option<String>,
    ) -> Result<Donation, ClientError> {
        let dto = UpdateDonationStatusDto { status, note };
        self.send(self.request(Method::PATCH, &format!("/donations/{}/status", id)).json(&dto)).await
    }

    // ── Orders ──────────────────────────────────────────────────────

    pub async fn list_orders(&self, status: Option<OrderStatus>) -> Result<Vec<OrderWithItems>, ClientError> {
        let mut builder = self.request(Method::GET, "/orders");
        if let Some(status) = status {
            builder = builder.query(&[("status", status.to_string())]);
        }
        self.send(builder).await
    }

    pub async fn get_order(&self, id: &str) -> Result<OrderWithItems, ClientError> {
        self.send(self.request(Method::GET, &format!("/orders/{}", id))).await
    }

    pub async fn update_order_status(
        &self,
        id: &str,
        status: OrderStatus,
        note: Option<String>,
    ) -> Result<OrderWithItems, ClientError> {
        let dto = UpdateOrderStatusDto { status, note };
        self.send(self.request(Method::PATCH, &format!("/orders/{}/status", id)).json(&dto)).await
    }

    // ── Volunteers ──────────────────────────────────────────────────

    pub async fn list_volunteers(&self, status: Option<VolunteerStatus>) -> Result<Vec<Volunteer>, ClientError> {
        let mut builder = self.request(Method::GET, "/volunteers");
        if let Some(status) = status {
            builder = builder.query(&[("status", status.to_string())]);
        }
        self.send(builder).await
    }

    pub async fn update_volunteer_status(&self, id: &str, status: VolunteerStatus) -> Result<Volunteer, ClientError> {
        let dto = UpdateVolunteerStatusDto { status };
        self.send(self.request(Method::PATCH, &format!("/volunteers/{}/status", id)).json(&dto)).await
    }

    // ── Settings ────────────────────────────────────────────────────

    pub async fn list_settings(&self) -> Result<Vec<Setting>, ClientError> {
        self.send(self.request(Method::GET, "/settings")).await
    }

    pub async fn get_setting(&self, key: &str) -> Result<Setting, ClientError> {
        self.send(self.request(Method::GET, &format!("/settings/{}", key))).await
    }

    pub async fn put_setting(&self, key: &str, value: serde_json::Value) -> Result<Setting, ClientError> {
        let dto = UpdateSettingDto { value };
        self.send(self.request(Method::PUT, &format!("/settings/{}", key)).json(&dto)).await
    }

    pub async fn delete_setting(&self, key: &str) -> Result<MessageDto, ClientError> {
        self.send(self.request(Method::DELETE, &format!("/settings/{}", key))).await
    }

    // ── Admin ───────────────────────────────────────────────────────

    pub async fn stats(&self) -> Result<DashboardStatsDto, ClientError> {
        self.send(self.request(Method::GET, "/admin/stats")).await
    }

    pub async fn list_emails(&self, status: Option<EmailStatus>, limit: Option<i64>) -> Result<Vec<Email>, ClientError> {
        let mut params: Vec<(&'static str, String)> = Vec::new();
        if let Some(status) = status {
            params.push(("status", status.to_string()));
        }
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }
        self.send(self.request(Method::GET, "/admin/emails").query(&params)).await
    }

    pub async fn send_test_email(&self, to: String) -> Result<MessageDto, ClientError> {
        let dto = TestEmailDto { to };
        self.send(self.request(Method::POST, "/admin/emails/test").json(&dto)).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ClientError> {
        self.send(self.request(Method::GET, "/users")).await
    }

    pub async fn update_user_role(&self, id: &str, role: Role) -> Result<User, ClientError> {
        let dto = UpdateRoleDto { role };
        self.send(self.request(Method::PATCH, &format!("/users/{}/role", id)).json(&dto)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsteps::models::{DonationKind, ShoeStatus};

    #[test]
    fn test_shoe_query_params_repeat_sizes() {
        let query = ShoeQueryDto {
            status: Some(ShoeStatus::OutOfStock),
            size: vec!["8".to_string(), "9".to_string()],
            include_hidden: true,
            ..Default::default()
        };

        let params = shoe_query_params(&query);

        assert_eq!(
            params,
            vec![
                ("status", "out_of_stock".to_string()),
                ("size", "8".to_string()),
                ("size", "9".to_string()),
                ("include_hidden", "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_donation_query_params() {
        let query = DonationQueryDto {
            status: None,
            kind: Some(DonationKind::Money),
            search: Some("dana".to_string()),
        };

        assert_eq!(
            donation_query_params(&query),
            vec![("kind", "money".to_string()), ("search", "dana".to_string())]
        );
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = NewStepsClient::new("http://localhost:3000/".to_string(), None);
        assert_eq!(client.base_url, "http://localhost:3000");
    }
}
