//! The toolbar button: badge, title and icon.

use futures::future::try_join_all;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::future::Future;

use crate::{
    callback::{call_with, PendingCall},
    constants::DEFAULT_BADGE_COLOR,
    host::{BrowserActionApi, TabId},
    Error, Result,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeText {
    /// `None` clears the badge.
    #[serde(serialize_with = "text_or_empty")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<TabId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeColor {
    /// CSS hex color, e.g. `#209CEE`.
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<TabId>,
}

impl Default for BadgeColor {
    fn default() -> Self {
        Self {
            color: DEFAULT_BADGE_COLOR.to_owned(),
            tab_id: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Title {
    /// `None` restores the title from the manifest.
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<TabId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Icon {
    /// Relative to the extension root.
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<TabId>,
}

fn text_or_empty<S>(text: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(text.as_deref().unwrap_or(""))
}

/// One of the settings `set_all` can apply.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Icon(String),
    Title(String),
    BadgeText(Option<String>),
    BadgeColor(String),
}

impl Property {
    /// Reads a `{ icon, title, badgeText, badgeColor }` style entry. `badgeText: false`
    /// clears the badge.
    pub fn from_entry(key: &str, value: Value) -> Result<Self> {
        let property = match key {
            "icon" => Property::Icon(serde_json::from_value(value)?),
            "title" => Property::Title(serde_json::from_value(value)?),
            "badgeText" => match value {
                Value::Bool(false) | Value::Null => Property::BadgeText(None),
                value => Property::BadgeText(Some(serde_json::from_value(value)?)),
            },
            "badgeColor" => Property::BadgeColor(serde_json::from_value(value)?),
            _ => {
                return Err(Error::validation(format!(
                    "Invalid argument: Unrecognized browser action property: {}",
                    key
                )))
            }
        };

        Ok(property)
    }

    fn apply<B>(self, browser_action: &B) -> PendingCall<()>
    where
        B: BrowserActionApi + ?Sized,
    {
        match self {
            Property::Icon(path) => set_icon(browser_action, &Icon { path, tab_id: None }),
            Property::Title(title) => set_title(
                browser_action,
                &Title {
                    title: Some(title),
                    tab_id: None,
                },
            ),
            Property::BadgeText(text) => {
                set_badge_text(browser_action, &BadgeText { text, tab_id: None })
            }
            Property::BadgeColor(color) => {
                set_badge_color(browser_action, &BadgeColor { color, tab_id: None })
            }
        }
    }
}

pub fn set_badge_text<B>(browser_action: &B, details: &BadgeText) -> PendingCall<()>
where
    B: BrowserActionApi + ?Sized,
{
    call_with("browserAction.setBadgeText", details, |details, done| {
        browser_action.set_badge_text(details, done)
    })
}

pub fn set_badge_color<B>(browser_action: &B, details: &BadgeColor) -> PendingCall<()>
where
    B: BrowserActionApi + ?Sized,
{
    call_with(
        "browserAction.setBadgeBackgroundColor",
        details,
        |details, done| browser_action.set_badge_background_color(details, done),
    )
}

pub fn set_title<B>(browser_action: &B, details: &Title) -> PendingCall<()>
where
    B: BrowserActionApi + ?Sized,
{
    call_with("browserAction.setTitle", details, |details, done| {
        browser_action.set_title(details, done)
    })
}

pub fn set_icon<B>(browser_action: &B, details: &Icon) -> PendingCall<()>
where
    B: BrowserActionApi + ?Sized,
{
    call_with("browserAction.setIcon", details, |details, done| {
        browser_action.set_icon(details, done)
    })
}

/// Applies every property at once. Fails with the first failure.
pub fn set_all<B>(browser_action: &B, properties: Vec<Property>) -> impl Future<Output = Result<()>>
where
    B: BrowserActionApi + ?Sized,
{
    let calls = properties
        .into_iter()
        .map(|property| property.apply(browser_action))
        .collect::<Vec<_>>();

    async move {
        try_join_all(calls).await?;

        Ok::<_, Error>(())
    }
}

/// Like [`set_all`] for a plain object. Recognized entries are still applied when another
/// entry is rejected.
pub fn set_entries<B>(
    browser_action: &B,
    entries: Map<String, Value>,
) -> impl Future<Output = Result<()>>
where
    B: BrowserActionApi + ?Sized,
{
    let calls = entries
        .into_iter()
        .map(|(key, value)| match Property::from_entry(&key, value) {
            Ok(property) => property.apply(browser_action),
            Err(e) => PendingCall::rejected("browserAction.set", e),
        })
        .collect::<Vec<_>>();

    async move {
        try_join_all(calls).await?;

        Ok::<_, Error>(())
    }
}
