use reqwest::Method;
use skyway_core::report::GenerateReportRequest;
use skyway_core::ReportType;
use tracing::info;

use crate::client::ApiClient;
use crate::error::ApiResult;

pub use skyway_core::report::report_filename;

pub struct ReportsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ReportsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Returns the PDF document as raw bytes.
    pub async fn generate(&self, report_types: &[ReportType]) -> ApiResult<Vec<u8>> {
        let request = GenerateReportRequest::new(report_types)?;
        let pdf = self
            .client
            .call_bytes(Method::POST, "reports/flights", &request, "Failed to generate report")
            .await?;
        info!("Generated report ({} bytes)", pdf.len());
        Ok(pdf)
    }
}
