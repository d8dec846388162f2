//! System status models (`/system/device/status`)

use serde::{Deserialize, Serialize};

/// Manufacturing metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManufacturingInfo {
    /// Ethernet WAN MAC address
    #[serde(rename = "macEth", alias = "mac_eth")]
    pub mac_eth: String,
    /// Product code
    pub name: String,
    /// Hardware revision
    #[serde(rename = "hwver", alias = "hw_ver")]
    pub hw_ver: String,
    pub batch: String,
    pub serial: String,
    /// Ethernet LAN MAC address
    pub mac: String,
    /// Bootloader version
    #[serde(rename = "blver", alias = "bl_ver")]
    pub bl_ver: String,
}

/// Firmware release summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    pub distribution: String,
    pub revision: String,
    pub version: String,
    pub target: String,
    pub description: String,
}

/// Firmware and platform identifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticInfo {
    /// Firmware version, e.g. "RUTX_R_00.07.13.3"
    pub fw_version: String,
    pub kernel: String,
    /// Processor name
    pub system: String,
    pub device_name: String,
    pub hostname: String,
    pub cpu_count: u32,
    pub release: ReleaseInfo,
    pub fw_build_date: String,
    pub model: String,
    pub board_name: String,
}

/// Feature flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    pub ipv6: bool,
}

/// Modem declared by the board description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardModem {
    pub id: String,
    pub num: String,
    pub builtin: bool,
    #[serde(rename = "simcount", alias = "sim_count")]
    pub sim_count: u32,
    pub gps_out: bool,
    pub primary: bool,
    pub revision: String,
    pub modem_func_id: i64,
    pub multi_apn: bool,
    pub operator_scan: bool,
    pub dhcp_filter: bool,
    pub dynamic_mtu: bool,
    pub ipv6: bool,
    pub volte: bool,
    pub csd: bool,
    pub band_list: Vec<String>,
    pub product: String,
    pub vendor: String,
    pub gps: String,
    pub stop_bits: String,
    // The firmware misspells this key.
    #[serde(rename = "boudrate", alias = "baudrate")]
    pub baudrate: String,
    #[serde(rename = "type")]
    pub modem_type: String,
    pub desc: String,
    pub control: String,
}

/// Network interface defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterface {
    pub proto: String,
    pub device: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_ip: Option<String>,
}

/// WAN and LAN interface defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub wan: NetworkInterface,
    pub lan: NetworkInterface,
}

/// Model identifier and marketing name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub platform: String,
    pub name: String,
}

/// Switch limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkOptions {
    pub readonly_vlans: u32,
    pub max_mtu: u32,
    pub vlans: u32,
}

/// Switch port-to-role mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchRole {
    pub ports: String,
    pub role: String,
    pub device: String,
}

/// Switch port definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchPort {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    pub num: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub want_untag: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub need_tag: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

/// Switch profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchConfig {
    pub enable: bool,
    pub roles: Vec<SwitchRole>,
    pub ports: Vec<SwitchPort>,
    pub reset: bool,
}

/// Switch blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Switch {
    pub switch0: SwitchConfig,
}

/// Hardware capability flags. Absent flags are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareInfo {
    pub wps: Option<bool>,
    pub rs232: Option<bool>,
    pub nat_offloading: Option<bool>,
    pub dual_sim: Option<bool>,
    pub bluetooth: Option<bool>,
    pub soft_port_mirror: Option<bool>,
    pub vcert: Option<bool>,
    pub micro_usb: Option<bool>,
    pub wifi: Option<bool>,
    pub sd_card: Option<bool>,
    pub multi_tag: Option<bool>,
    pub dual_modem: Option<bool>,
    pub sfp_switch: Option<bool>,
    pub dsa: Option<bool>,
    pub hw_nat: Option<bool>,
    pub sw_rst_on_init: Option<bool>,
    pub at_sim: Option<bool>,
    pub port_link: Option<bool>,
    pub ios: Option<bool>,
    pub usb: Option<bool>,
    pub console: Option<bool>,
    pub dual_band_ssid: Option<bool>,
    pub gps: Option<bool>,
    pub ethernet: Option<bool>,
    pub sfp_port: Option<bool>,
    pub rs485: Option<bool>,
    pub mobile: Option<bool>,
    pub poe: Option<bool>,
    pub gigabit_port: Option<bool>,
    #[serde(rename = "2_5_gigabit_port")]
    pub gigabit_port_2_5: Option<bool>,
    pub esim: Option<bool>,
    pub modem_reset: Option<bool>,
}

/// Board description: modems, network, model and switch layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardInfo {
    pub modems: Vec<BoardModem>,
    pub network: NetworkConfig,
    pub model: ModelInfo,
    pub usb_jack: String,
    pub network_options: NetworkOptions,
    pub switch: Switch,
    #[serde(rename = "hwinfo", alias = "hw_info")]
    pub hw_info: HardwareInfo,
}

/// Authenticated system snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    #[serde(rename = "mnfinfo", alias = "mnf_info")]
    pub mnf_info: ManufacturingInfo,
    #[serde(rename = "static")]
    pub static_info: StaticInfo,
    pub features: Features,
    pub board: BoardInfo,
}

impl SystemInfo {
    /// Firmware version string.
    pub fn firmware_version(&self) -> &str {
        &self.static_info.fw_version
    }
}
