use serde::{Deserialize, Serialize};
use serde_json::json;
use std::future::Future;

use crate::{
    callback::{call_with, deserialized, PendingCall},
    host::ProxySettingsApi,
    Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyMode {
    Direct,
    AutoDetect,
    PacScript,
    FixedServers,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelOfControl {
    NotControllable,
    ControlledByOtherExtensions,
    ControllableByThisExtension,
    ControlledByThisExtension,
}

/// Which browser windows a setting applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Regular,
    RegularOnly,
    IncognitoPersistent,
    IncognitoSessionOnly,
}

impl Default for Scope {
    fn default() -> Self {
        Scope::Regular
    }
}

/// Without a scheme (`http`, `https`, `quic`, `socks4`, `socks5`) the browser uses `http`;
/// without a port, the scheme's default port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyServer {
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single_proxy: Option<ProxyServer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_for_http: Option<ProxyServer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_for_https: Option<ProxyServer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_for_ftp: Option<ProxyServer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_proxy: Option<ProxyServer>,
    #[serde(default)]
    pub bypass_list: Vec<String>,
}

/// Where a `pac_script` configuration comes from: a URL or the script itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacScript {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Fail requests instead of connecting directly when the script is invalid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mandatory: Option<bool>,
}

/// `rules` is used by `fixed_servers`, `pac_script` by `pac_script`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyConfig {
    pub mode: ProxyMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<ProxyRules>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pac_script: Option<PacScript>,
}

/// What `get` resolves with.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxySettings {
    pub value: ProxyConfig,
    pub level_of_control: LevelOfControl,
    #[serde(default)]
    pub incognito_specific: Option<bool>,
}

pub fn create_proxy_server(host: &str, port: Option<u16>, scheme: Option<&str>) -> ProxyServer {
    ProxyServer {
        host: host.trim().to_owned(),
        port,
        scheme: scheme
            .map(str::trim)
            .filter(|scheme| !scheme.is_empty())
            .map(str::to_owned),
    }
}

/// A `fixed_servers` configuration that sends every request through one proxy.
pub fn create_single_proxy_config(
    host: &str,
    port: Option<u16>,
    bypass_list: Vec<String>,
) -> ProxyConfig {
    ProxyConfig {
        mode: ProxyMode::FixedServers,
        rules: Some(ProxyRules {
            single_proxy: Some(create_proxy_server(host, port, None)),
            bypass_list,
            ..ProxyRules::default()
        }),
        pac_script: None,
    }
}

pub fn get<P>(settings: &P, incognito: bool) -> impl Future<Output = Result<ProxySettings>>
where
    P: ProxySettingsApi + ?Sized,
{
    deserialized(call_with(
        "proxy.settings.get",
        &json!({ "incognito": incognito }),
        |details, done| settings.get(details, done),
    ))
}

pub fn set<P>(settings: &P, config: &ProxyConfig, scope: Scope) -> PendingCall<()>
where
    P: ProxySettingsApi + ?Sized,
{
    call_with(
        "proxy.settings.set",
        &json!({ "value": config, "scope": scope }),
        |details, done| settings.set(details, done),
    )
}

/// Restores the browser's own proxy settings.
pub fn clear<P>(settings: &P, scope: Scope) -> PendingCall<()>
where
    P: ProxySettingsApi + ?Sized,
{
    call_with(
        "proxy.settings.clear",
        &json!({ "scope": scope }),
        |details, done| settings.clear(details, done),
    )
}
