use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::{
    callback::{call_with, PendingCall},
    host::NotificationsApi,
    Error, Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    Basic,
    Image,
    List,
    Progress,
}

impl Default for NoteType {
    fn default() -> Self {
        NoteType::Basic
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteButton {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// One row of a `list` notification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteItem {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteOptions {
    #[serde(rename = "type")]
    pub kind: NoteType,
    pub icon_url: String,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_message: Option<String>,
    /// From -2 to 2.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i8>,
    /// Milliseconds since the epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<NoteButton>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<NoteItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_interaction: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub silent: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteDetails {
    /// Generated by the browser if not given.
    pub id: Option<String>,
    pub options: NoteOptions,
}

/// A notification that is on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: String,
    pub options: NoteOptions,
}

pub fn create<N>(notifications: &N, details: NoteDetails) -> impl Future<Output = Result<Notification>>
where
    N: NotificationsApi + ?Sized,
{
    let NoteDetails { id, options } = details;

    let pending: PendingCall<String> =
        call_with("notifications.create", &options, |options, done| {
            notifications.create(id, options, done)
        });

    async move {
        let id = pending.await?;

        Ok::<_, Error>(Notification { id, options })
    }
}
