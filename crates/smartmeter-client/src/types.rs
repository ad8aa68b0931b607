//! Response types for the smart meter APIs.
//!
//! The APIs are undocumented; field names follow the German JSON keys they
//! are decoded from. Most structs default missing fields.

use chrono::{DateTime, Utc};
use serde::Deserialize;

// ─────────────────────────────────────────────────────────────────────────────
// Wiener Stadtwerke gateway
// ─────────────────────────────────────────────────────────────────────────────

/// Response of `zaehlpunkt/baseInformation`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BaseInfo {
    pub has_smart_meter: bool,
    pub is_deleted: bool,
    #[serde(rename = "dataDeletionTimestampUTC")]
    pub data_deletion_timestamp: Option<String>,
    #[serde(rename = "zaehlpunkt")]
    pub meter: BaseInfoMeter,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BaseInfoMeter {
    #[serde(rename = "zaehlpunktName")]
    pub name: String,
    #[serde(rename = "zaehlpunktnummer")]
    pub id: String,
    #[serde(rename = "zaehlpunktAnlagentyp")]
    pub kind: String,
    #[serde(rename = "adresse")]
    pub address: String,
    #[serde(rename = "postleitzahl")]
    pub zip_code: String,
}

/// One customer account with its meters, as listed by `zaehlpunkte`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct MeterGroup {
    #[serde(rename = "bezeichnung")]
    pub name: String,
    #[serde(rename = "geschaeftspartner")]
    pub customer_id: String,
    #[serde(rename = "zaehlpunkte")]
    pub meters: Vec<Meter>,
}

/// A metering point.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Meter {
    #[serde(rename = "zaehlpunktnummer")]
    pub id: String,
    /// Set from the enclosing customer account when listing meters.
    #[serde(rename = "geschaeftspartner")]
    pub customer_id: String,
    #[serde(rename = "customLabel")]
    pub label: String,
    #[serde(rename = "equipmentNumber")]
    pub equipment_id: String,
    #[serde(rename = "geraetNumber")]
    pub device_id: String,
    pub is_smart_meter: bool,
    pub is_default: bool,
    pub is_active: bool,
    pub is_data_deleted: bool,
    pub is_smart_meter_market_ready: bool,
    #[serde(rename = "dataDeletionTimestampUTC")]
    pub data_deletion_timestamp: Option<String>,
    #[serde(rename = "verbrauchsstelle")]
    pub location: MeterLocation,
    #[serde(rename = "anlage")]
    pub installation: Installation,
    #[serde(rename = "vertraege")]
    pub contracts: Vec<Contract>,
    pub idex_status: IdexStatus,
    pub opt_out_details: OptOutDetails,
    #[serde(rename = "zpSharingInfo")]
    pub sharing_info: SharingInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MeterLocation {
    #[serde(rename = "vstelle")]
    pub consumption_point: String,
    #[serde(rename = "strasse")]
    pub street: String,
    #[serde(rename = "hausnummer")]
    pub street_number: String,
    #[serde(rename = "anlagehausnummer")]
    pub meter_street_number: String,
    #[serde(rename = "postleitzahl")]
    pub zip_code: String,
    #[serde(rename = "ort")]
    pub city: String,
    #[serde(rename = "breitengrad")]
    pub latitude: String,
    #[serde(rename = "laengengrad")]
    pub longitude: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Installation {
    #[serde(rename = "typ")]
    pub kind: String,
}

/// Move-in/move-out dates, `YYYY-MM-DD` or null.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Contract {
    #[serde(rename = "einzugsdatum")]
    pub move_in_date: Option<String>,
    #[serde(rename = "auszugsdatum")]
    pub move_out_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IdexStatus {
    pub granularity: ChangeableStatus,
    pub customer_interface: ChangeableStatus,
    pub display: DisplayStatus,
    pub display_profile: DisplayProfile,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChangeableStatus {
    pub status: String,
    pub can_be_changed: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DisplayStatus {
    pub is_locked: bool,
    pub can_be_changed: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DisplayProfile {
    pub display_profile: String,
    pub can_be_changed: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OptOutDetails {
    pub is_opt_out: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SharingInfo {
    pub is_owner: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Wiener Netze
// ─────────────────────────────────────────────────────────────────────────────

/// The logged-in user's profile.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub id: i64,
    pub salutation: String,
    #[serde(rename = "firstname")]
    pub first_name: String,
    #[serde(rename = "lastname")]
    pub last_name: String,
    pub email: String,
    /// Consent flag; its type is not known, so it is kept as raw JSON.
    #[serde(rename = "zustimmung")]
    pub approval: Option<serde_json::Value>,
    pub registration: Registration,
    #[serde(rename = "defaultGeschaeftspartnerRegistration")]
    pub default_customer_registration: CustomerRegistration,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Registration {
    #[serde(rename = "registrationKey")]
    pub key: String,
    #[serde(rename = "zaehlpunkt")]
    pub meter_id: String,
    pub status: String,
    pub completed_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomerRegistration {
    pub id: i64,
    #[serde(rename = "registrationKey")]
    pub key: String,
    pub status: String,
    #[serde(rename = "geschaeftspartner")]
    pub customer_id: String,
    pub completed_at: String,
}

/// Consumption data for one meter over a time range.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Export {
    pub descriptor: ExportDescriptor,
    pub values: Vec<ExportValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExportDescriptor {
    #[serde(rename = "geschaeftspartnernummer")]
    pub customer_id: String,
    #[serde(rename = "zaehlpunktnummer")]
    pub meter_id: String,
    #[serde(rename = "rolle")]
    pub role: String,
    #[serde(rename = "aggregat")]
    pub aggregation: String,
    #[serde(rename = "granularitaet")]
    pub granularity: String,
    #[serde(rename = "einheit")]
    pub unit: String,
}

/// One interval reading, in kWh.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportValue {
    #[serde(rename = "wert")]
    pub value: f64,
    #[serde(rename = "zeitpunktVon")]
    pub from: DateTime<Utc>,
    #[serde(rename = "zeitpunktBis")]
    pub to: DateTime<Utc>,
    #[serde(rename = "geschaetzt", default)]
    pub estimated: bool,
}
