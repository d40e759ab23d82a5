//! SP-API endpoint configuration
//!
//! The reports API is served from one host per region while the LWA token
//! endpoint is global. Everything a component needs to build a URL lives in
//! [`SpApiEndpoints`], so tests and sandbox runs can point the client elsewhere.

/// LWA token endpoint, shared by all regions
pub const LWA_TOKEN_URL: &str = "https://api.amazon.com/auth/o2/token";

/// Reports API collection path (`createReport`, `getReport`)
pub const REPORTS_PATH: &str = "/reports/2021-06-30/reports";

/// Report documents path (`getReportDocument`)
pub const DOCUMENTS_PATH: &str = "/reports/2021-06-30/documents";

/// SP-API regional endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Region {
    /// North America (US, CA, MX, BR)
    #[value(alias = "na")]
    NorthAmerica,
    /// Europe, Middle East and India
    #[value(alias = "eu")]
    Europe,
    /// Far East (JP, AU, SG)
    #[value(alias = "fe")]
    FarEast,
}

impl Region {
    /// Base URL of the regional SP-API host
    pub fn api_base_url(&self) -> &'static str {
        match self {
            Region::NorthAmerica => "https://sellingpartnerapi-na.amazon.com",
            Region::Europe => "https://sellingpartnerapi-eu.amazon.com",
            Region::FarEast => "https://sellingpartnerapi-fe.amazon.com",
        }
    }
}

/// Resolved URLs for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpApiEndpoints {
    token_url: String,
    api_base_url: String,
}

impl SpApiEndpoints {
    /// Endpoints with an explicit token URL and API host
    pub fn new(token_url: impl Into<String>, api_base_url: impl Into<String>) -> Self {
        let api_base_url: String = api_base_url.into();
        Self {
            token_url: token_url.into(),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Production endpoints for a region
    pub fn for_region(region: Region) -> Self {
        Self::new(LWA_TOKEN_URL, region.api_base_url())
    }

    /// LWA token endpoint
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// API host without trailing slash
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// `createReport` URL
    pub fn reports_url(&self) -> String {
        format!("{}{}", self.api_base_url, REPORTS_PATH)
    }

    /// `getReport` URL for a report id
    pub fn report_url(&self, report_id: &str) -> String {
        format!("{}{}/{}", self.api_base_url, REPORTS_PATH, report_id)
    }

    /// `getReportDocument` URL for a document id
    pub fn document_url(&self, document_id: &str) -> String {
        format!("{}{}/{}", self.api_base_url, DOCUMENTS_PATH, document_id)
    }
}

impl Default for SpApiEndpoints {
    fn default() -> Self {
        Self::for_region(Region::NorthAmerica)
    }
}
