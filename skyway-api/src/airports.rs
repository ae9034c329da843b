use skyway_core::reference::AirportList;
use skyway_core::Airport;

use crate::client::ApiClient;
use crate::error::ApiResult;

pub struct AirportsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AirportsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ApiResult<Vec<Airport>> {
        let list: AirportList = self.client.get("airports", "Failed to load airports").await?;
        Ok(list.airports)
    }

    pub async fn get(&self, id: i64) -> ApiResult<Airport> {
        self.client
            .get(&format!("airports/{}", id), "Failed to load airport")
            .await
    }
}
