//! Which kind of extension document the code is running in.

use serde::Deserialize;

use crate::{
    callback::{call, PendingCall},
    constants::{EXTENSION_PROTOCOL, GENERATED_BACKGROUND_PAGE},
    host::{PageContext, RuntimeApi},
};

/// The parts of `window.location` the classification looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Location {
    pub protocol: String,
    pub pathname: String,
}

/// The parts of `manifest.json` the classification looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub background: Option<Background>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Background {
    #[serde(default)]
    pub page: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionContext {
    Background,
    ContentScript,
    /// A privileged extension page that is not the background page, e.g. a popup.
    ContextPage,
}

impl ExecutionContext {
    pub fn classify(location: &Location, manifest: &Manifest) -> Self {
        if is_background_page(location, manifest) {
            ExecutionContext::Background
        } else if is_content_script(location) {
            ExecutionContext::ContentScript
        } else {
            ExecutionContext::ContextPage
        }
    }

    pub fn current<P>(host: &P) -> Self
    where
        P: PageContext + ?Sized,
    {
        Self::classify(&host.location(), &host.manifest())
    }
}

pub fn is_background_page(location: &Location, manifest: &Manifest) -> bool {
    if location.protocol != EXTENSION_PROTOCOL {
        return false;
    }

    if location.pathname == GENERATED_BACKGROUND_PAGE {
        return true;
    }

    manifest
        .background
        .as_ref()
        .and_then(|background| background.page.as_deref())
        .map(|page| page.trim_start_matches('/') == location.pathname.trim_start_matches('/'))
        .unwrap_or(false)
}

pub fn is_content_script(location: &Location) -> bool {
    location.protocol != EXTENSION_PROTOCOL
}

pub fn is_context_page(location: &Location, manifest: &Manifest) -> bool {
    location.protocol == EXTENSION_PROTOCOL && !is_background_page(location, manifest)
}

/// Opens the options page declared in the manifest.
pub fn open_options_page<R>(runtime: &R) -> PendingCall<()>
where
    R: RuntimeApi + ?Sized,
{
    call("runtime.openOptionsPage", |done| {
        runtime.open_options_page(done)
    })
}

/// Resolves with the background page's window, loading the page first if it was unloaded.
pub fn get_background_page<R>(runtime: &R) -> PendingCall<R::BackgroundPage>
where
    R: RuntimeApi + ?Sized,
{
    call("runtime.getBackgroundPage", |done| {
        runtime.get_background_page(done)
    })
}
