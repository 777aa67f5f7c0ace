use serde::Serialize;

use crate::{
    callback::{call_with, PendingCall},
    host::ContextMenusApi,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Normal,
    Checkbox,
    Radio,
    Separator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuContext {
    All,
    Page,
    Frame,
    Selection,
    Link,
    Editable,
    Image,
    Video,
    Audio,
    Launcher,
    BrowserAction,
    PageAction,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ItemType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contexts: Vec<MenuContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub document_url_patterns: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub target_url_patterns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

pub fn create<C>(context_menus: &C, item: &MenuItem) -> PendingCall<()>
where
    C: ContextMenusApi + ?Sized,
{
    call_with("contextMenus.create", item, |item, done| {
        context_menus.create(item, done)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Answer, FakeHost};
    use futures::executor::block_on;
    use serde_json::json;

    #[test]
    fn creates_the_item_with_browser_field_names() {
        let host = FakeHost::default();

        block_on(create(
            &host,
            &MenuItem {
                id: Some("copy-link".to_owned()),
                title: Some("Copy link".to_owned()),
                contexts: vec![MenuContext::Link, MenuContext::BrowserAction],
                ..MenuItem::default()
            },
        ))
        .unwrap();

        assert_eq!(
            host.calls_to("contextMenus.create"),
            vec![json!({
                "id": "copy-link",
                "title": "Copy link",
                "contexts": ["link", "browser_action"]
            })]
        );
    }

    #[test]
    fn duplicate_id_is_rejected_once() {
        let host = FakeHost::default();
        host.answer(
            "contextMenus.create",
            Answer::HostError("Cannot create item with duplicate id copy-link".to_owned()),
        );

        let error = block_on(create(&host, &MenuItem::default())).unwrap_err();

        assert!(matches!(error, crate::Error::Host(_)));
    }
}
