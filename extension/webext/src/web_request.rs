use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    host::{TabId, WebRequestApi},
    observable::{listen_to, Observable},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Which requests the listener sees.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestFilter {
    pub urls: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<TabId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_id: Option<i32>,
}

/// The host that asked for credentials.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Challenger {
    pub host: String,
    pub port: u16,
}

/// A request that hit an authentication challenge.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuthRequest {
    pub request_id: String,
    pub url: String,
    pub method: String,
    pub tab_id: Option<TabId>,
    pub is_proxy: bool,
    pub scheme: Option<String>,
    pub realm: Option<String>,
    pub challenger: Challenger,
}

impl From<Value> for AuthRequest {
    fn from(details: Value) -> Self {
        serde_json::from_value(details).unwrap_or_else(|e| {
            log::warn!("unexpected auth request details: {}", e);
            AuthRequest::default()
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BlockingResponse<'a> {
    auth_credentials: &'a Credentials,
}

/// Answers every authentication challenge matching `filter` with `credentials`.
///
/// The listener is registered when the returned observable is subscribed to. `extra_info_spec`
/// defaults to `["blocking"]`, which is what lets the answer reach the browser. Subscribing fails
/// if the browser refuses the listener, e.g. without the `webRequestBlocking` permission.
pub fn handle_on_auth_required<W>(
    web_request: &W,
    credentials: Credentials,
    filter: &RequestFilter,
    extra_info_spec: Option<Vec<String>>,
) -> Observable<AuthRequest>
where
    W: WebRequestApi + ?Sized,
{
    let extra_info_spec = extra_info_spec.unwrap_or_else(|| vec!["blocking".to_owned()]);
    let filter = serde_json::to_value(filter).unwrap_or(Value::Null);

    let event = web_request.on_auth_required(filter, extra_info_spec);

    listen_to(event, move |_: &Value| {
        serde_json::to_value(BlockingResponse {
            auth_credentials: &credentials,
        })
        .unwrap_or(Value::Null)
    })
    .map(AuthRequest::from)
}
