//! Turning consumption exports into line protocol points.

use std::collections::BTreeMap;
use std::io::{self, Write};

use chrono::{DateTime, Utc};
use smartmeter_client::{Export, Meter, SmartMeterClient};

use crate::line_protocol::Point;

/// Exported values are kWh; points carry Wh.
const WH_PER_KWH: f64 = 1000.0;

/// Write one point per export value of `meter`. Returns the number of
/// points written.
pub fn write_export<W: Write + ?Sized>(
    out: &mut W,
    metric: &str,
    meter: &Meter,
    export: &Export,
) -> io::Result<usize> {
    let tags = BTreeMap::from([
        ("customLabel", meter.label.as_str()),
        ("deviceID", meter.device_id.as_str()),
        ("equipmentID", meter.equipment_id.as_str()),
        ("meterID", meter.id.as_str()),
    ]);

    let mut written = 0;
    for value in &export.values {
        let point = Point {
            measurement: metric,
            tags: tags.clone(),
            field: "value",
            value: value.value * WH_PER_KWH,
            timestamp: value.to,
        };
        if point.write_to(out)? {
            written += 1;
        } else {
            tracing::warn!(meter = %meter.id, at = %value.to, "Skipping non-finite value");
        }
    }
    Ok(written)
}

/// Fetch and write the exports of all `meters`.
///
/// `count` is updated as points go out so the caller can report progress
/// even when a later meter fails.
pub async fn export_meters<W: Write + ?Sized>(
    client: &SmartMeterClient,
    meters: &[Meter],
    (start, end): (DateTime<Utc>, DateTime<Utc>),
    metric: &str,
    out: &mut W,
    count: &mut usize,
) -> anyhow::Result<()> {
    use anyhow::Context;

    for meter in meters {
        tracing::debug!(meter = %meter.id, customer = %meter.customer_id, "Fetching export");
        let export = client
            .netze()
            .export(&meter.customer_id, &meter.id, start, end)
            .await
            .with_context(|| format!("failed to export meter {}", meter.id))?;

        *count += write_export(out, metric, meter, &export)
            .with_context(|| format!("failed to write points for meter {}", meter.id))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use smartmeter_auth::{HttpClient, ProviderConfig, Sessions, TokenBundle};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn meter(label: &str) -> Meter {
        serde_json::from_value(serde_json::json!({
            "zaehlpunktnummer": "AT001",
            "customLabel": label,
            "geraetNumber": "D1",
            "equipmentNumber": "E1"
        }))
        .unwrap()
    }

    fn export(values: serde_json::Value) -> Export {
        serde_json::from_value(serde_json::json!({
            "descriptor": {"zaehlpunktnummer": "AT001", "einheit": "KWH"},
            "values": values
        }))
        .unwrap()
    }

    #[test]
    fn test_writes_one_line_per_value() {
        let export = export(serde_json::json!([
            {"wert": 0.125, "zeitpunktVon": "2024-03-01T00:00:00Z", "zeitpunktBis": "2024-03-01T00:15:00Z"},
            {"wert": 0.5, "zeitpunktVon": "2024-03-01T00:15:00Z", "zeitpunktBis": "2024-03-01T00:30:00Z"}
        ]));

        let mut out = Vec::new();
        let n = write_export(&mut out, "smartmeter", &meter("Küche"), &export).unwrap();
        assert_eq!(n, 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "smartmeter,customLabel=Küche,deviceID=D1,equipmentID=E1,meterID=AT001 value=125 1709252100000000000",
                "smartmeter,customLabel=Küche,deviceID=D1,equipmentID=E1,meterID=AT001 value=500 1709253000000000000",
            ]
        );
    }

    #[test]
    fn test_empty_label_is_omitted() {
        let export = export(serde_json::json!([
            {"wert": 1.0, "zeitpunktVon": "2024-03-01T00:00:00Z", "zeitpunktBis": "2024-03-01T00:15:00Z"}
        ]));

        let mut out = Vec::new();
        write_export(&mut out, "power", &meter(""), &export).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("power,deviceID=D1,"));
    }

    #[test]
    fn test_no_values_writes_nothing() {
        let mut out = Vec::new();
        let n = write_export(&mut out, "smartmeter", &meter("x"), &export(serde_json::json!([]))).unwrap();
        assert_eq!(n, 0);
        assert!(out.is_empty());
    }

    // ─────────────────────────────────────────────────────────────────────
    // Export loop against a mock Wiener Netze API
    // ─────────────────────────────────────────────────────────────────────

    const EXPORT_PATH: &str = "/sm/api/user/messwerte/bewegungsdaten";

    fn listed_meter(id: &str, customer_id: &str) -> Meter {
        let mut meter: Meter = serde_json::from_value(serde_json::json!({
            "zaehlpunktnummer": id,
            "customLabel": "Küche",
            "geraetNumber": "D1",
            "equipmentNumber": "E1"
        }))
        .unwrap();
        meter.customer_id = customer_id.to_string();
        meter
    }

    fn client_for(server: &MockServer) -> SmartMeterClient {
        let config = ProviderConfig::wiener_netze()
            .with_stadtwerke_api_url(server.uri())
            .with_netze_api_url(server.uri());
        let token: TokenBundle =
            serde_json::from_value(serde_json::json!({"access_token": "T"})).unwrap();
        let sessions = Sessions::from_token(&HttpClient::new().unwrap(), &config, token);
        SmartMeterClient::from_sessions(&config, sessions).unwrap()
    }

    fn day() -> (DateTime<Utc>, DateTime<Utc>) {
        (
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 59).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_export_meters_writes_every_meter() {
        let server = MockServer::start().await;
        for (meter_id, customer_id, wert) in [("AT001", "C1", 0.25), ("AT002", "C2", 0.5)] {
            Mock::given(method("GET"))
                .and(path(EXPORT_PATH))
                .and(query_param("zaehlpunktnummer", meter_id))
                .and(query_param("geschaeftspartner", customer_id))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "values": [{
                        "wert": wert,
                        "zeitpunktVon": "2024-03-01T00:00:00Z",
                        "zeitpunktBis": "2024-03-01T00:15:00Z"
                    }]
                })))
                .expect(1)
                .mount(&server)
                .await;
        }

        let meters = [listed_meter("AT001", "C1"), listed_meter("AT002", "C2")];
        let mut out = Vec::new();
        let mut count = 0;
        export_meters(&client_for(&server), &meters, day(), "smartmeter", &mut out, &mut count)
            .await
            .unwrap();

        assert_eq!(count, 2);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            vec![
                "smartmeter,customLabel=Küche,deviceID=D1,equipmentID=E1,meterID=AT001 value=250 1709252100000000000",
                "smartmeter,customLabel=Küche,deviceID=D1,equipmentID=E1,meterID=AT002 value=500 1709252100000000000",
            ]
        );
    }

    #[tokio::test]
    async fn test_export_meters_stops_at_failing_meter_and_keeps_count() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(EXPORT_PATH))
            .and(query_param("zaehlpunktnummer", "AT001"))
            .and(query_param("geschaeftspartner", "C1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "values": [
                    {"wert": 0.125, "zeitpunktVon": "2024-03-01T00:00:00Z", "zeitpunktBis": "2024-03-01T00:15:00Z"},
                    {"wert": 0.5, "zeitpunktVon": "2024-03-01T00:15:00Z", "zeitpunktBis": "2024-03-01T00:30:00Z"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(EXPORT_PATH))
            .and(query_param("zaehlpunktnummer", "AT002"))
            .and(query_param("geschaeftspartner", "C2"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(EXPORT_PATH))
            .and(query_param("zaehlpunktnummer", "AT003"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"values": []})))
            .expect(0)
            .mount(&server)
            .await;

        let meters = [
            listed_meter("AT001", "C1"),
            listed_meter("AT002", "C2"),
            listed_meter("AT003", "C3"),
        ];
        let mut out = Vec::new();
        let mut count = 0;
        let err = export_meters(&client_for(&server), &meters, day(), "smartmeter", &mut out, &mut count)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("AT002"));
        assert_eq!(count, 2);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            vec![
                "smartmeter,customLabel=Küche,deviceID=D1,equipmentID=E1,meterID=AT001 value=125 1709252100000000000",
                "smartmeter,customLabel=Küche,deviceID=D1,equipmentID=E1,meterID=AT001 value=500 1709253000000000000",
            ]
        );
    }
}
