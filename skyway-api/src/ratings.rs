use reqwest::Method;
use serde::Serialize;
use skyway_core::rating::{CreateRatingRequest, UpdateRatingRequest};
use skyway_core::{validation, FlightStatus, Page, Rating};
use tracing::info;

use crate::client::{ApiClient, Auth};
use crate::error::ApiResult;

#[derive(Serialize)]
struct PageQuery {
    page: u32,
    per_page: u32,
}

pub struct RatingsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> RatingsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Only completed flights can be rated; anything else fails locally.
    pub async fn create(
        &self,
        flight_id: i64,
        flight_status: FlightStatus,
        score: u8,
    ) -> ApiResult<Rating> {
        let rating = validation::validate_rating(score, flight_status)?;
        let created: Rating = self
            .client
            .call(
                Method::POST,
                "ratings",
                Auth::Required,
                &CreateRatingRequest { flight_id, rating },
                "Failed to submit rating",
            )
            .await?;
        info!("Rated flight {} with {}", flight_id, rating);
        Ok(created)
    }

    pub async fn list(&self, page: u32, per_page: u32) -> ApiResult<Page<Rating>> {
        self.client
            .get_query("ratings", &PageQuery { page, per_page }, "Failed to load ratings")
            .await
    }

    pub async fn list_mine(&self, page: u32, per_page: u32) -> ApiResult<Page<Rating>> {
        self.client
            .get_query("users/ratings", &PageQuery { page, per_page }, "Failed to load ratings")
            .await
    }

    /// There is no server-side flight filter: the requested page is fetched
    /// and narrowed here, so pagination metadata describes the unfiltered list.
    pub async fn list_for_flight(
        &self,
        flight_id: i64,
        page: u32,
        per_page: u32,
    ) -> ApiResult<Page<Rating>> {
        let page = self.list(page, per_page).await?;
        Ok(page.retain(|r| r.flight_id == flight_id))
    }

    pub async fn get(&self, id: i64) -> ApiResult<Rating> {
        self.client
            .get(&format!("ratings/{}", id), "Failed to load rating")
            .await
    }

    pub async fn update(&self, id: i64, score: u8) -> ApiResult<Rating> {
        let rating = validation::validate_score(score)?;
        self.client
            .call(
                Method::PUT,
                &format!("ratings/{}", id),
                Auth::Required,
                &UpdateRatingRequest { rating },
                "Failed to update rating",
            )
            .await
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        self.client
            .delete(&format!("ratings/{}", id), "Failed to delete rating")
            .await?;
        info!("Deleted rating {}", id);
        Ok(())
    }
}
