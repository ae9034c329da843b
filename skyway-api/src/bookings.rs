use reqwest::Method;
use skyway_core::booking::{BookingList, CreateBookingRequest};
use skyway_core::Booking;
use tracing::info;

use crate::client::ApiClient;
use crate::error::ApiResult;

pub struct BookingsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> BookingsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Booking charges the account, so the cached user is dropped.
    pub async fn create(&self, flight_id: i64) -> ApiResult<()> {
        self.client
            .call_unit(
                Method::POST,
                "bookings",
                Some(&CreateBookingRequest { flight_id }),
                "Failed to book flight",
            )
            .await?;
        self.client.user_cache().invalidate().await;
        info!("Booked flight {}", flight_id);
        Ok(())
    }

    pub async fn list_mine(&self) -> ApiResult<Vec<Booking>> {
        let list: BookingList = self
            .client
            .get("users/bookings", "Failed to load bookings")
            .await?;
        Ok(list.bookings)
    }

    pub async fn cancel(&self, booking_id: i64) -> ApiResult<()> {
        self.client
            .delete(&format!("bookings/{}", booking_id), "Failed to cancel booking")
            .await?;
        self.client.user_cache().invalidate().await;
        info!("Cancelled booking {}", booking_id);
        Ok(())
    }
}
