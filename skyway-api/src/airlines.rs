use skyway_core::reference::AirlineList;
use skyway_core::Airline;

use crate::client::ApiClient;
use crate::error::ApiResult;

pub struct AirlinesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AirlinesApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ApiResult<Vec<Airline>> {
        let list: AirlineList = self.client.get("airlines", "Failed to load airlines").await?;
        Ok(list.airlines)
    }

    pub async fn get(&self, id: i64) -> ApiResult<Airline> {
        self.client
            .get(&format!("airlines/{}", id), "Failed to load airline")
            .await
    }
}
