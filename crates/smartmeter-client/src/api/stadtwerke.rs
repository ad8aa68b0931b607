//! Wiener Stadtwerke smart meter portal gateway.

use crate::client::{Backend, NO_QUERY, SmartMeterClient};
use crate::error::Result;
use crate::types::{BaseInfo, Meter, MeterGroup};

/// Wiener Stadtwerke gateway client.
///
/// Requests carry the bearer token and the gateway API key.
pub struct StadtwerkeApi {
    client: SmartMeterClient,
}

impl StadtwerkeApi {
    pub(crate) fn new(client: SmartMeterClient) -> Self {
        Self { client }
    }

    /// Get base information about the default metering point.
    pub async fn base_info(&self) -> Result<BaseInfo> {
        self.client
            .get_json(Backend::Stadtwerke, "zaehlpunkt/baseInformation", NO_QUERY)
            .await
    }

    /// List all meters of all customer accounts of the user.
    ///
    /// Each meter's `customer_id` is set to the account it was listed under.
    pub async fn meters(&self) -> Result<Vec<Meter>> {
        let groups: Vec<Vec<MeterGroup>> = self
            .client
            .get_json_stream(Backend::Stadtwerke, "zaehlpunkte")
            .await?;

        let meters: Vec<Meter> = groups
            .into_iter()
            .flatten()
            .flat_map(|group| {
                let customer_id = group.customer_id;
                group.meters.into_iter().map(move |mut meter| {
                    meter.customer_id = customer_id.clone();
                    meter
                })
            })
            .collect();

        tracing::debug!(count = meters.len(), "Listed meters");
        Ok(meters)
    }
}
