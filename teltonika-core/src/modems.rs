//! Modem status models (`/modems/status`)
//!
//! The device reports one entry per modem. A modem that is powered, detected
//! and registered reports full telemetry; a modem that is offline, blocked or
//! disabled reports a short record carrying an `offline`, `blocked` or
//! `disabled` key. Entries with any of those keys decode as offline.

use crate::api::{opt_lenient_i64, NumberOrText};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::borrow::Cow;

/// Decode a User Equipment state code (3GPP TS 24.008).
pub fn decode_ue_state(code: i64) -> Cow<'static, str> {
    let description = match code {
        0 => "Detached",
        1 => "Attached",
        2 => "Connecting",
        3 => "Connected",
        4 => "Idle",
        5 => "Disconnecting",
        6 => "Emergency Attached",
        7 => "Limited Service",
        8 => "No Service",
        other => return Cow::Owned(format!("Unknown UE state ({})", other)),
    };
    Cow::Borrowed(description)
}

/// Decode the mobile connection stage reported by the firmware.
pub fn decode_mobile_stage(code: i64) -> Cow<'static, str> {
    let description = match code {
        0 => "Unknown state",
        1 => "Waiting for SIM to be inserted",
        2 => "SIM failure",
        3 => "Idling",
        4 => "Waiting for user action",
        5 => "Waiting for PIN to be entered",
        6 => "Waiting for PUK to be entered",
        7 => "SIM blocked, no PUK attempts left",
        8 => "Initializing mobile connection",
        9 => "Configuring Voice over LTE (VoLTE)",
        10 => "Setting up connection settings",
        11 => "Scanning for available operators",
        12 => "Currently handling SIM PIN event",
        13 => "Currently handling SIM switch event",
        14 => "Initializing modem",
        15 => "Changed default SIM card",
        16 => "Setting up data connection settings",
        17 => "Clearing PDP context",
        18 => "Currently handling config",
        19 => "Mobile connection setup is complete",
        other => return Cow::Owned(format!("Unknown mobile stage ({})", other)),
    };
    Cow::Borrowed(description)
}

/// Serving or neighbour cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellInfo {
    /// Mobile Country Code
    pub mcc: Option<String>,
    /// Mobile Network Code
    pub mnc: Option<String>,
    #[serde(rename = "cellid", alias = "cell_id")]
    pub cell_id: Option<String>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub ue_state: Option<i64>,
    /// Location Area Code
    pub lac: Option<String>,
    /// Tracking Area Code
    pub tac: Option<String>,
    /// Physical Cell ID
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub pcid: Option<i64>,
    pub earfcn: Option<NumberOrText>,
    pub arfcn: Option<NumberOrText>,
    pub uarfcn: Option<NumberOrText>,
    #[serde(rename = "nr-arfcn", alias = "nr_arfcn")]
    pub nr_arfcn: Option<NumberOrText>,
    pub rsrp: Option<NumberOrText>,
    pub rsrq: Option<NumberOrText>,
    pub sinr: Option<NumberOrText>,
    pub bandwidth: Option<String>,
}

impl CellInfo {
    /// Human-readable UE state.
    pub fn ue_state_description(&self) -> Option<Cow<'static, str>> {
        self.ue_state.map(decode_ue_state)
    }
}

/// Service modes available per radio access technology
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceModes {
    #[serde(rename = "2G")]
    pub mode_2g: Option<Vec<String>>,
    #[serde(rename = "3G")]
    pub mode_3g: Option<Vec<String>>,
    #[serde(rename = "4G")]
    pub mode_4g: Option<Vec<String>>,
    #[serde(rename = "NB")]
    pub nb_iot: Option<Vec<String>>,
    #[serde(rename = "5G_NSA")]
    pub mode_5g_nsa: Option<Vec<String>>,
    #[serde(rename = "5G_SA")]
    pub mode_5g_sa: Option<Vec<String>>,
}

/// Carrier aggregation component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarrierAggregationSignal {
    pub band: Option<String>,
    pub bandwidth: Option<String>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub sinr: Option<i64>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub rsrq: Option<i64>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub rsrp: Option<i64>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub pcid: Option<i64>,
    pub frequency: Option<NumberOrText>,
    /// Primary component carrier
    pub primary: Option<bool>,
}

/// Full status of an online modem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnlineModem {
    /// Modem identifier, e.g. "2-1"
    pub id: String,
    pub imei: Option<String>,
    pub model: Option<String>,
    pub cell_info: Option<Vec<CellInfo>>,
    pub dynamic_mtu: Option<bool>,
    pub service_modes: Option<ServiceModes>,
    pub lac: Option<String>,
    pub tac: Option<String>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub index: Option<i64>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub sim_count: Option<i64>,
    pub version: Option<String>,
    pub manufacturer: Option<String>,
    pub builtin: Option<bool>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub mode: Option<i64>,
    pub primary: Option<bool>,
    pub multi_apn: Option<bool>,
    pub ipv6: Option<bool>,
    pub volte_supported: Option<bool>,
    pub auto_3g_bands: Option<bool>,
    pub operators_scan: Option<bool>,
    pub mobile_dfota: Option<bool>,
    pub no_ussd: Option<bool>,
    pub framed_routing: Option<bool>,
    pub low_signal_reconnect: Option<bool>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub active_sim: Option<i64>,
    /// Connection type, e.g. "5G-NSA"
    pub conntype: Option<String>,
    pub simstate: Option<String>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub simstate_id: Option<i64>,
    pub data_conn_state: Option<String>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub data_conn_state_id: Option<i64>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub txbytes: Option<i64>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub rxbytes: Option<i64>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub baudrate: Option<i64>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub is_busy: Option<i64>,
    /// Data turned off with the mobileoff SMS
    pub data_off: Option<bool>,
    pub busy_state: Option<String>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub busy_state_id: Option<i64>,
    /// e.g. "Inserted", "Not inserted", "SIM failure"
    pub pinstate: Option<String>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub pinstate_id: Option<i64>,
    /// e.g. "Registered, home", "Roaming", "Searching"
    pub operator_state: Option<String>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub operator_state_id: Option<i64>,
    /// Received signal strength in dBm
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub rssi: Option<i64>,
    pub operator: Option<String>,
    pub provider: Option<String>,
    /// Network type
    pub ntype: Option<String>,
    pub imsi: Option<String>,
    pub iccid: Option<String>,
    pub cellid: Option<String>,
    pub rscp: Option<String>,
    pub ecio: Option<String>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub rsrp: Option<i64>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub rsrq: Option<i64>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub sinr: Option<i64>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub pinleft: Option<i64>,
    pub volte: Option<bool>,
    /// Carrier aggregation status
    pub sc_band_av: Option<String>,
    pub ca_signal: Option<Vec<CarrierAggregationSignal>>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub temperature: Option<i64>,
    pub esim_profile: Option<String>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub mobile_stage: Option<i64>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub gnss_state: Option<i64>,
    pub nr5g_sa_disabled: Option<bool>,
    pub wwan_gnss_conflict: Option<bool>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub modem_state_id: Option<i64>,
    pub sim_switch_enabled: Option<bool>,
    pub serial: Option<String>,
    pub auto_2g_bands: Option<bool>,
    pub cfg_version: Option<String>,
    pub csd: Option<bool>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub pukleft: Option<i64>,
    pub band: Option<String>,
    pub auto_5g_mode: Option<bool>,

    // Legacy fields still sent by older firmware
    pub state: Option<String>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub state_id: Option<i64>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub signal: Option<i64>,
    pub oper: Option<String>,
    pub netstate: Option<String>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub netstate_id: Option<i64>,
}

impl OnlineModem {
    /// Human-readable mobile connection stage.
    pub fn mobile_stage_description(&self) -> Option<Cow<'static, str>> {
        self.mobile_stage.map(decode_mobile_stage)
    }

    /// Primary component carrier, when carrier aggregation is reported.
    pub fn primary_carrier(&self) -> Option<&CarrierAggregationSignal> {
        self.ca_signal
            .as_deref()?
            .iter()
            .find(|ca| ca.primary == Some(true))
    }
}

/// Short status of an offline, blocked or disabled modem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineModem {
    pub id: String,
    pub name: Option<String>,
    pub offline: Option<String>,
    pub blocked: Option<String>,
    pub disabled: Option<String>,
    pub builtin: Option<bool>,
    pub primary: Option<bool>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub sim_count: Option<i64>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub mode: Option<i64>,
    pub multi_apn: Option<bool>,
    pub operators_scan: Option<bool>,
    pub dynamic_mtu: Option<bool>,
    pub ipv6: Option<bool>,
    pub volte: Option<bool>,
    pub esim_profile: Option<String>,
}

/// Keys only present in the short record of an unavailable modem
const OFFLINE_MARKERS: [&str; 3] = ["offline", "blocked", "disabled"];

/// One modem entry of `/modems/status`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ModemStatus {
    Online(Box<OnlineModem>),
    Offline(OfflineModem),
}

impl<'de> Deserialize<'de> for ModemStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let is_offline = OFFLINE_MARKERS.iter().any(|key| value.get(key).is_some());

        if is_offline {
            serde_json::from_value(value)
                .map(ModemStatus::Offline)
                .map_err(D::Error::custom)
        } else {
            serde_json::from_value(value)
                .map(|m| ModemStatus::Online(Box::new(m)))
                .map_err(D::Error::custom)
        }
    }
}

impl ModemStatus {
    pub fn id(&self) -> &str {
        match self {
            ModemStatus::Online(m) => &m.id,
            ModemStatus::Offline(m) => &m.id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            ModemStatus::Online(m) => m.name.as_deref(),
            ModemStatus::Offline(m) => m.name.as_deref(),
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, ModemStatus::Online(_))
    }

    /// Operator name; offline modems have none.
    pub fn operator(&self) -> Option<&str> {
        self.as_online().and_then(|m| m.operator.as_deref())
    }

    /// Connection type; offline modems have none.
    pub fn conntype(&self) -> Option<&str> {
        self.as_online().and_then(|m| m.conntype.as_deref())
    }

    /// Signal strength in dBm; offline modems have none.
    pub fn rssi(&self) -> Option<i64> {
        self.as_online().and_then(|m| m.rssi)
    }

    pub fn as_online(&self) -> Option<&OnlineModem> {
        match self {
            ModemStatus::Online(m) => Some(m),
            ModemStatus::Offline(_) => None,
        }
    }

    pub fn as_offline(&self) -> Option<&OfflineModem> {
        match self {
            ModemStatus::Online(_) => None,
            ModemStatus::Offline(m) => Some(m),
        }
    }
}

/// Online modems, in device order.
pub fn online_modems(modems: &[ModemStatus]) -> Vec<&OnlineModem> {
    modems.iter().filter_map(ModemStatus::as_online).collect()
}

/// Offline modems, in device order.
pub fn offline_modems(modems: &[ModemStatus]) -> Vec<&OfflineModem> {
    modems.iter().filter_map(ModemStatus::as_offline).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiResponse;
    use serde_json::json;

    /// `/modems/status` payload of a RUTX50 on a 5G NSA connection.
    fn online_modem_json() -> Value {
        json!({
            "id": "2-1",
            "imei": "861234567890123",
            "model": "RM500Q-GL",
            "name": "Internal modem",
            "index": 0,
            "sim_count": 2,
            "manufacturer": "Quectel",
            "builtin": true,
            "primary": true,
            "active_sim": 1,
            "conntype": "5G-NSA",
            "simstate": "Inserted",
            "pinstate": "Inserted",
            "operator_state": "Registered, home",
            "data_conn_state": "Connected",
            "rssi": -61,
            "operator": "Telekom.de",
            "provider": "Telekom.de",
            "ntype": "5G (NSA)",
            "rsrp": -91,
            "rsrq": "-11",
            "sinr": 14,
            "txbytes": 124567,
            "rxbytes": 9876543,
            "baudrate": 115200,
            "temperature": 41,
            "mobile_stage": 19,
            "band": "LTE B1",
            "cell_info": [
                {
                    "mcc": "262", "mnc": "01", "cellid": "1A2B3C4", "ue_state": 3,
                    "lac": "N/A", "tac": "B0A1", "pcid": 248, "earfcn": 300,
                    "rsrp": "N/A", "rsrq": -11, "sinr": 14, "bandwidth": "20"
                },
                {
                    "mcc": "262", "mnc": "01", "tac": "N/A", "pcid": 601,
                    "nr-arfcn": 643296, "rsrp": -103, "bandwidth": "100"
                }
            ],
            "service_modes": {
                "3G": ["wcdma_only"],
                "4G": ["lte_only"],
                "5G_SA": ["nr5g_sa"]
            },
            "ca_signal": [
                { "band": "LTE B1", "bandwidth": "20", "rsrp": -91, "primary": true, "frequency": 2140 },
                { "band": "LTE B3", "bandwidth": "20", "rsrp": -95, "primary": false },
                { "band": "LTE B7", "bandwidth": "15", "rsrp": -99, "primary": false },
                { "band": "5G N78", "bandwidth": "100", "rsrp": -103, "frequency": "3649.44" }
            ]
        })
    }

    #[test]
    fn test_online_modem_decoding() {
        let modem: ModemStatus = serde_json::from_value(online_modem_json()).unwrap();

        assert!(modem.is_online());
        assert_eq!(modem.id(), "2-1");
        assert_eq!(modem.operator(), Some("Telekom.de"));
        assert_eq!(modem.conntype(), Some("5G-NSA"));
        assert_eq!(modem.rssi(), Some(-61));

        let online = modem.as_online().unwrap();
        assert_eq!(online.rsrq, Some(-11));
        assert_eq!(online.baudrate, Some(115200));
        assert_eq!(
            online.mobile_stage_description().as_deref(),
            Some("Mobile connection setup is complete")
        );
    }

    #[test]
    fn test_na_values_in_cell_info() {
        let response: ApiResponse<Vec<ModemStatus>> = ApiResponse::parse(
            &json!({"success": true, "data": [online_modem_json()]}).to_string(),
        )
        .unwrap()
        .decode()
        .unwrap();

        let modems = response.data.unwrap();
        let cells = modems[0].as_online().unwrap().cell_info.as_ref().unwrap();

        assert_eq!(cells[0].lac, None);
        assert_eq!(cells[0].rsrp, None);
        assert_eq!(cells[0].mcc.as_deref(), Some("262"));
        assert_eq!(cells[0].ue_state_description().as_deref(), Some("Connected"));
        assert_eq!(cells[1].tac, None);
        assert_eq!(cells[1].rsrp, Some(NumberOrText::Number(-103)));
        assert_eq!(cells[1].nr_arfcn, Some(NumberOrText::Number(643296)));
    }

    #[test]
    fn test_service_modes_and_carriers() {
        let modem: ModemStatus = serde_json::from_value(online_modem_json()).unwrap();
        let online = modem.as_online().unwrap();

        let modes = online.service_modes.as_ref().unwrap();
        assert!(modes.mode_4g.is_some());
        assert!(modes.mode_3g.is_some());
        assert!(modes.mode_5g_sa.is_some());
        assert!(modes.mode_2g.is_none());

        let carriers = online.ca_signal.as_ref().unwrap();
        assert_eq!(carriers.len(), 4);

        let primary = online.primary_carrier().unwrap();
        assert_eq!(primary.band.as_deref(), Some("LTE B1"));
        assert_eq!(primary.bandwidth.as_deref(), Some("20"));

        let nr = carriers
            .iter()
            .find(|ca| ca.band.as_deref().is_some_and(|b| b.contains("5G")))
            .unwrap();
        assert_eq!(nr.band.as_deref(), Some("5G N78"));
        assert_eq!(nr.frequency, Some(NumberOrText::Text("3649.44".to_string())));
    }

    #[test]
    fn test_offline_modem_discrimination() {
        let modems: Vec<ModemStatus> = serde_json::from_value(json!([
            online_modem_json(),
            {"id": "2-2", "offline": "1", "name": "External modem"}
        ]))
        .unwrap();

        assert_eq!(online_modems(&modems).len(), 1);
        let offline = offline_modems(&modems);
        assert_eq!(offline.len(), 1);
        assert_eq!(offline[0].id, "2-2");
        assert_eq!(modems[1].name(), Some("External modem"));
        assert_eq!(modems[1].rssi(), None);
        assert!(!modems[1].is_online());
    }

    #[test]
    fn test_blocked_modem_is_offline() {
        let modems: Vec<ModemStatus> = serde_json::from_value(json!([
            {"id": "1-1", "name": "External modem", "blocked": "1", "builtin": false}
        ]))
        .unwrap();

        assert!(!modems[0].is_online());
        assert!(online_modems(&modems).is_empty());
        let offline = offline_modems(&modems);
        assert_eq!(offline.len(), 1);
        assert_eq!(offline[0].blocked.as_deref(), Some("1"));
        assert_eq!(offline[0].builtin, Some(false));
    }

    #[test]
    fn test_disabled_modem_is_offline() {
        let modems: Vec<ModemStatus> = serde_json::from_value(json!([
            online_modem_json(),
            {"id": "3-1", "name": "Disabled modem", "disabled": "1"}
        ]))
        .unwrap();

        assert_eq!(online_modems(&modems).len(), 1);
        let offline = offline_modems(&modems);
        assert_eq!(offline.len(), 1);
        assert_eq!(offline[0].id, "3-1");
        assert_eq!(offline[0].disabled.as_deref(), Some("1"));
        assert_eq!(modems[1].operator(), None);
    }

    #[test]
    fn test_modem_without_id_fails() {
        let result = serde_json::from_value::<ModemStatus>(json!({"operator": "Telia"}));
        assert!(result.is_err());

        let result = serde_json::from_value::<ModemStatus>(json!({"offline": "1"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_modem_list() {
        let modems: Vec<ModemStatus> = serde_json::from_value(json!([])).unwrap();
        assert!(modems.is_empty());
        assert!(online_modems(&modems).is_empty());
    }

    #[test]
    fn test_decode_ue_state() {
        assert_eq!(decode_ue_state(0), "Detached");
        assert_eq!(decode_ue_state(1), "Attached");
        assert_eq!(decode_ue_state(3), "Connected");
        assert_eq!(decode_ue_state(999), "Unknown UE state (999)");
    }

    #[test]
    fn test_decode_mobile_stage() {
        assert_eq!(decode_mobile_stage(1), "Waiting for SIM to be inserted");
        assert_eq!(decode_mobile_stage(19), "Mobile connection setup is complete");
        assert_eq!(decode_mobile_stage(42), "Unknown mobile stage (42)");
    }
}
