use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::future::Future;

use crate::{
    callback::{call, call_with, deserialized, PendingCall},
    host::StorageArea,
    Error, Result,
};

/// A wrapper type around one of the browser's key-value storage areas.
///
/// Values must be JSON-serializable; functions, dates, regular expressions, sets, maps and
/// binary buffers do not survive a round trip through the browser.
pub struct Storage<A> {
    inner: A,
}

impl<A> Storage<A>
where
    A: StorageArea,
{
    pub fn set(&self, items: &Map<String, Value>) -> PendingCall<()> {
        call_with("storage.set", items, |items, done| self.inner.set(items, done))
    }

    /// An empty `keys` returns every item in the area.
    pub fn get(&self, keys: &[&str]) -> impl Future<Output = Result<Map<String, Value>>> {
        let keys = if keys.is_empty() {
            None
        } else {
            Some(keys.iter().map(|key| key.to_string()).collect())
        };

        deserialized(call("storage.get", |done| self.inner.get(keys, done)))
    }

    pub fn remove(&self, keys: &[&str]) -> PendingCall<()> {
        let keys = keys.iter().map(|key| key.to_string()).collect();

        call("storage.remove", |done| self.inner.remove(keys, done))
    }

    pub fn clear(&self) -> PendingCall<()> {
        call("storage.clear", |done| self.inner.clear(done))
    }

    /// return an item parsing it using `serde_json::from_value`
    pub fn get_json_item<T>(&self, name: &str) -> impl Future<Output = Result<Option<T>>>
    where
        T: DeserializeOwned,
    {
        let name = name.to_owned();
        let items = self.get(&[name.as_str()]);

        async move {
            let item = match items.await?.remove(&name) {
                Some(item) => item,
                None => return Ok(None),
            };

            let t = serde_json::from_value::<T>(item)?;

            Ok::<_, Error>(Some(t))
        }
    }

    /// store an item using `serde_json::to_value`
    pub fn set_json_item<V>(&self, name: &str, value: V) -> Result<PendingCall<()>>
    where
        V: Serialize,
    {
        let value = serde_json::to_value(&value)?;

        let mut items = Map::new();
        items.insert(name.to_owned(), value);

        Ok(self.set(&items))
    }

    pub fn remove_item(&self, name: &str) -> PendingCall<()> {
        self.remove(&[name])
    }
}

impl<A> From<A> for Storage<A> {
    fn from(inner: A) -> Self {
        Self { inner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Answer, FakeHost};
    use futures::executor::block_on;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn getting_without_keys_reads_everything() {
        let storage = Storage::from(FakeHost::default());
        storage
            .inner
            .answer("storage.get", Answer::Value(json!({ "a": 1, "b": [2] })));

        let items = block_on(storage.get(&[])).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(storage.inner.calls_to("storage.get"), vec![Value::Null]);
    }

    #[test]
    fn getting_named_keys_passes_them_through() {
        let storage = Storage::from(FakeHost::default());
        storage
            .inner
            .answer("storage.get", Answer::Value(json!({ "email": "a@b.c" })));

        let items = block_on(storage.get(&["email", "name"])).unwrap();

        assert_eq!(items["email"], json!("a@b.c"));
        assert_eq!(
            storage.inner.calls_to("storage.get"),
            vec![json!(["email", "name"])]
        );
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Settings {
        dark_mode: bool,
    }

    #[test]
    fn json_items_are_typed() {
        let storage = Storage::from(FakeHost::default());
        storage.inner.answer(
            "storage.get",
            Answer::Value(json!({ "settings": { "dark_mode": true } })),
        );

        let settings = block_on(storage.get_json_item::<Settings>("settings")).unwrap();

        assert_eq!(settings, Some(Settings { dark_mode: true }));
    }

    #[test]
    fn missing_json_item_is_none() {
        let storage = Storage::from(FakeHost::default());
        storage
            .inner
            .answer("storage.get", Answer::Value(json!({})));

        let settings = block_on(storage.get_json_item::<Settings>("settings")).unwrap();

        assert_eq!(settings, None);
    }

    #[test]
    fn setting_a_json_item_stores_it_under_its_name() {
        let storage = Storage::from(FakeHost::default());

        block_on(
            storage
                .set_json_item("settings", Settings { dark_mode: false })
                .unwrap(),
        )
        .unwrap();

        assert_eq!(
            storage.inner.calls_to("storage.set"),
            vec![json!({ "settings": { "dark_mode": false } })]
        );
    }

    #[test]
    fn remove_and_clear_report_host_errors() {
        let storage = Storage::from(FakeHost::default());
        storage.inner.answer(
            "storage.clear",
            Answer::HostError("QUOTA_BYTES quota exceeded".to_owned()),
        );

        block_on(storage.remove_item("settings")).unwrap();
        let error = block_on(storage.clear()).unwrap_err();

        assert_eq!(
            storage.inner.calls_to("storage.remove"),
            vec![json!(["settings"])]
        );
        assert_eq!(error.to_string(), "QUOTA_BYTES quota exceeded");
    }
}
