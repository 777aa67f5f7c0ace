use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;

use crate::{
    callback::{call, call_with, deserialized, PendingCall},
    host::{TabId, TabsApi},
    Error, Result,
};

/// The subset of `tabs.Tab` this crate reads. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tab {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<TabId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incognito: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opener_tab_id: Option<TabId>,
}

/// Every field that is set must match; an empty query matches all tabs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_window: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_focused_window: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_id: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlighted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opener_tab_id: Option<TabId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunAt {
    DocumentStart,
    DocumentEnd,
    DocumentIdle,
}

/// Either `code` or `file` should be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_frames: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_about_blank: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_at: Option<RunAt>,
}

pub fn create<T>(tabs: &T, properties: &CreateProperties) -> impl Future<Output = Result<Tab>>
where
    T: TabsApi + ?Sized,
{
    deserialized(call_with("tabs.create", properties, |properties, done| {
        tabs.create(properties, done)
    }))
}

pub fn get<T>(tabs: &T, tab_id: Option<TabId>) -> impl Future<Output = Result<Tab>>
where
    T: TabsApi + ?Sized,
{
    let pending = match tab_id {
        Some(tab_id) => call("tabs.get", |done| tabs.get(tab_id, done)),
        None => PendingCall::rejected(
            "tabs.get",
            Error::validation("Invalid argument: tabId not specified"),
        ),
    };

    deserialized(pending)
}

pub fn query<T>(tabs: &T, info: &QueryInfo) -> impl Future<Output = Result<Vec<Tab>>>
where
    T: TabsApi + ?Sized,
{
    deserialized(call_with("tabs.query", info, |info, done| {
        tabs.query(info, done)
    }))
}

pub fn update<T>(
    tabs: &T,
    tab_id: Option<TabId>,
    properties: &UpdateProperties,
) -> impl Future<Output = Result<Tab>>
where
    T: TabsApi + ?Sized,
{
    let pending = match tab_id {
        Some(tab_id) => call_with("tabs.update", properties, |properties, done| {
            tabs.update(tab_id, properties, done)
        }),
        None => PendingCall::rejected("tabs.update", Error::validation("Tab not specified")),
    };

    deserialized(pending)
}

pub fn close<T>(tabs: &T, tab_id: Option<TabId>) -> PendingCall<()>
where
    T: TabsApi + ?Sized,
{
    match tab_id {
        Some(tab_id) => call("tabs.remove", |done| tabs.remove(tab_id, done)),
        None => PendingCall::rejected("tabs.remove", Error::validation("Tab not specified")),
    }
}

/// Injects a script; resolves with the result of the script in every frame it ran in.
pub fn execute<T>(
    tabs: &T,
    tab_id: Option<TabId>,
    details: &InjectDetails,
) -> impl Future<Output = Result<Vec<Value>>>
where
    T: TabsApi + ?Sized,
{
    let results = deserialized::<_, Option<Vec<Value>>>(call_with(
        "tabs.executeScript",
        details,
        |details, done| tabs.execute_script(tab_id, details, done),
    ));

    async move { Ok::<_, Error>(results.await?.unwrap_or_default()) }
}
