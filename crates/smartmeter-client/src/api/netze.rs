//! Wiener Netze service API.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::client::{Backend, SmartMeterClient};
use crate::error::{Error, Result};
use crate::types::{Export, Profile};

/// Role parameter the export endpoint expects for consumption data.
const EXPORT_ROLE: &str = "V002";

/// Wiener Netze API client.
pub struct NetzeApi {
    client: SmartMeterClient,
}

impl NetzeApi {
    pub(crate) fn new(client: SmartMeterClient) -> Self {
        Self { client }
    }

    /// Get the user's profile. Exactly one profile is expected.
    pub async fn profile(&self) -> Result<Profile> {
        let mut profiles: Vec<Profile> = self
            .client
            .get_json_stream(Backend::Netze, "rest/smp/1.0/w/user/profile")
            .await?;

        match profiles.len() {
            1 => Ok(profiles.remove(0)),
            n => Err(Error::UnexpectedProfileCount(n)),
        }
    }

    /// Export metered consumption of one meter between `start` and `end`.
    pub async fn export(
        &self,
        customer_id: &str,
        meter_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Export> {
        let start = start.to_rfc3339_opts(SecondsFormat::Secs, true);
        let end = end.to_rfc3339_opts(SecondsFormat::Secs, true);
        let query = [
            ("rolle", EXPORT_ROLE),
            ("geschaeftspartner", customer_id),
            ("zaehlpunktnummer", meter_id),
            ("zeitpunktVon", start.as_str()),
            ("zeitpunktBis", end.as_str()),
        ];

        let export: Export = self
            .client
            .get_json(Backend::Netze, "sm/api/user/messwerte/bewegungsdaten", &query)
            .await?;

        tracing::debug!(meter_id, values = export.values.len(), "Exported consumption");
        Ok(export)
    }
}
