//! REST client for the loan service.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use sacco_core::{ApiError, LoanApi};
use sacco_domain::{
    ApplicantType, ApplicationReceipt, Collateral, Guarantor, LineItemSubmission,
    LoanApplicationRequest, LoanProduct, NextOfKin,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const PRODUCTS_PATH: &str = "/loan-products/active";
const APPLICATIONS_PATH: &str = "/loan-applications";
const GUARANTORS_PATH: &str = "/guarantors";
const COLLATERALS_PATH: &str = "/collaterals";
const NEXT_OF_KIN_PATH: &str = "/next-of-kin";
const MAX_ERROR_BODY: usize = 200;

/// Product listings arrive either bare or wrapped in a `data` envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum ProductListing {
    Bare(Vec<LoanProduct>),
    Wrapped { data: Vec<LoanProduct> },
}

impl ProductListing {
    fn into_products(self) -> Vec<LoanProduct> {
        match self {
            ProductListing::Bare(products) | ProductListing::Wrapped { data: products } => products,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(alias = "error")]
    message: String,
}

/// `LoanApi` backed by HTTP. Requests are never retried and carry no
/// client-side timeout.
#[derive(Debug, Clone)]
pub struct HttpLoanApi {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpLoanApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .build()
            .map_err(|err| ApiError::Transport(format!("failed to create HTTP client: {err}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = (!token.trim().is_empty()).then(|| token.trim().to_string());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self
            .http
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute(&self, builder: RequestBuilder, path: &str) -> Result<Response, ApiError> {
        let response = builder.send().await.map_err(|err| {
            warn!(path, error = %err, "request failed");
            ApiError::Transport(err.to_string())
        })?;
        let status = response.status();
        debug!(path, status = status.as_u16(), "response received");
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Rejected {
            status: status.as_u16(),
            message: rejection_message(&body, status.canonical_reason()),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        path: &str,
    ) -> Result<T, ApiError> {
        self.execute(builder, path)
            .await?
            .json()
            .await
            .map_err(|err| ApiError::Decode(format!("{path}: {err}")))
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, ApiError> {
        self.execute(self.request(Method::POST, path).json(body), path)
            .await
    }
}

fn rejection_message(body: &str, reason: Option<&str>) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if !parsed.message.trim().is_empty() {
            return parsed.message;
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        reason.unwrap_or("request rejected").to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_BODY).collect()
    }
}

#[async_trait]
impl LoanApi for HttpLoanApi {
    async fn list_active_loan_products(
        &self,
        applicant_type: ApplicantType,
    ) -> Result<Vec<LoanProduct>, ApiError> {
        let builder = self
            .request(Method::GET, PRODUCTS_PATH)
            .query(&[("applicantType", applicant_type.as_str())]);
        let listing: ProductListing = self.get_json(builder, PRODUCTS_PATH).await?;
        Ok(listing.into_products())
    }

    async fn create_loan_application(
        &self,
        request: &LoanApplicationRequest,
    ) -> Result<ApplicationReceipt, ApiError> {
        let builder = self.request(Method::POST, APPLICATIONS_PATH).json(request);
        self.get_json(builder, APPLICATIONS_PATH).await
    }

    async fn add_guarantor(
        &self,
        submission: &LineItemSubmission<'_, Guarantor>,
    ) -> Result<(), ApiError> {
        self.post(GUARANTORS_PATH, submission).await.map(drop)
    }

    async fn add_collateral(
        &self,
        submission: &LineItemSubmission<'_, Collateral>,
    ) -> Result<(), ApiError> {
        self.post(COLLATERALS_PATH, submission).await.map(drop)
    }

    async fn add_next_of_kin(
        &self,
        submission: &LineItemSubmission<'_, NextOfKin>,
    ) -> Result<(), ApiError> {
        self.post(NEXT_OF_KIN_PATH, submission).await.map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_prefers_structured_message() {
        assert_eq!(
            rejection_message(r#"{"message":"Amount exceeds limit"}"#, Some("Bad Request")),
            "Amount exceeds limit"
        );
        assert_eq!(
            rejection_message(r#"{"error":"Unauthorized"}"#, None),
            "Unauthorized"
        );
    }

    #[test]
    fn rejection_falls_back_to_body_then_reason() {
        assert_eq!(rejection_message("boom", Some("Bad Gateway")), "boom");
        assert_eq!(rejection_message("  ", Some("Bad Gateway")), "Bad Gateway");
        assert_eq!(rejection_message(&"x".repeat(500), None).len(), MAX_ERROR_BODY);
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        let api = HttpLoanApi::new("https://sacco.example/api/").unwrap();
        assert_eq!(api.base_url(), "https://sacco.example/api");
    }
}
