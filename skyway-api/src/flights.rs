use reqwest::Method;
use skyway_core::flight::{
    AvailableSeats, CreateFlightRequest, RemainingTime, StatusChange, UpdateFlightRequest,
};
use skyway_core::search::FlightTab;
use skyway_core::{validation, Flight, FlightQuery, Page};
use tracing::info;

use crate::client::{ApiClient, Auth};
use crate::error::ApiResult;

pub struct FlightsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> FlightsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &FlightQuery) -> ApiResult<Page<Flight>> {
        self.client
            .get_query("flights", query, "Failed to load flights")
            .await
    }

    pub async fn list_by_tab(
        &self,
        tab: FlightTab,
        query: &FlightQuery,
    ) -> ApiResult<Page<Flight>> {
        self.client
            .get_query(&format!("flights/tabs/{}", tab), query, "Failed to load flights")
            .await
    }

    pub async fn get(&self, id: i64) -> ApiResult<Flight> {
        self.client
            .get(&format!("flights/{}", id), "Failed to load flight")
            .await
    }

    pub async fn create(&self, request: &CreateFlightRequest) -> ApiResult<Flight> {
        let flight: Flight = self
            .client
            .call(Method::POST, "flights", Auth::Required, request, "Failed to create flight")
            .await?;
        info!("Created flight {} ({})", flight.flight_id, flight.flight_name);
        Ok(flight)
    }

    pub async fn update(&self, id: i64, request: &UpdateFlightRequest) -> ApiResult<Flight> {
        self.client
            .call(
                Method::PATCH,
                &format!("flights/{}", id),
                Auth::Required,
                request,
                "Failed to update flight",
            )
            .await
    }

    pub async fn approve(&self, id: i64) -> ApiResult<Flight> {
        let flight = self
            .change_status(id, &StatusChange::Approved, "Failed to approve flight")
            .await?;
        info!("Approved flight {}", id);
        Ok(flight)
    }

    /// The reason is checked locally; a short one never reaches the server.
    pub async fn reject(&self, id: i64, reason: &str) -> ApiResult<Flight> {
        let rejection_reason = validation::validate_rejection_reason(reason)?;
        let change = StatusChange::Rejected { rejection_reason };
        let flight = self.change_status(id, &change, "Failed to reject flight").await?;
        info!("Rejected flight {}", id);
        Ok(flight)
    }

    pub async fn cancel(&self, id: i64) -> ApiResult<Flight> {
        let flight = self
            .client
            .call(
                Method::POST,
                &format!("flights/{}/cancel", id),
                Auth::Required,
                &serde_json::json!({}),
                "Failed to cancel flight",
            )
            .await?;
        info!("Cancelled flight {}", id);
        Ok(flight)
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        self.client
            .delete(&format!("flights/{}", id), "Failed to delete flight")
            .await?;
        info!("Deleted flight {}", id);
        Ok(())
    }

    pub async fn available_seats(&self, id: i64) -> ApiResult<AvailableSeats> {
        self.client
            .get(&format!("flights/{}/available-seats", id), "Failed to load available seats")
            .await
    }

    pub async fn remaining_time(&self, id: i64) -> ApiResult<RemainingTime> {
        self.client
            .get(&format!("flights/{}/remaining-time", id), "Failed to load remaining time")
            .await
    }

    async fn change_status(
        &self,
        id: i64,
        change: &StatusChange,
        fallback: &str,
    ) -> ApiResult<Flight> {
        self.client
            .call(
                Method::PATCH,
                &format!("flights/{}/status", id),
                Auth::Required,
                change,
                fallback,
            )
            .await
    }
}
