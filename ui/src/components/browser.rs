//! Thin wrappers over the browser APIs the app touches: `localStorage`,
//! `fetch`, the URL fragment, file inputs and downloads.
//!
//! Each has a non-WASM stub so the crate still type-checks natively.

use freightdesk_common::error::TransportError;
use freightdesk_common::export::ExportedFile;
use freightdesk_common::scan::ScanFile;
use freightdesk_common::transport::{HttpResponse, HttpTransport};

pub fn clog(msg: &str) {
    #[cfg(target_family = "wasm")]
    web_sys::console::log_1(&msg.into());
    #[cfg(not(target_family = "wasm"))]
    let _ = msg;
}

// ─── localStorage ────────────────────────────────────────────────────────────

#[cfg(target_family = "wasm")]
pub use wasm::LocalStorage;

/// Off the web there is no `localStorage`; state lives for the process.
#[cfg(not(target_family = "wasm"))]
pub type LocalStorage = freightdesk_common::storage::MemoryStore;

// ─── fetch ───────────────────────────────────────────────────────────────────

/// `window.fetch` as an [`HttpTransport`].
#[derive(Clone, Copy, Debug, Default)]
pub struct FetchTransport;

impl HttpTransport for FetchTransport {
    async fn post_json(&self, url: &str, body: &str) -> Result<HttpResponse, TransportError> {
        #[cfg(target_family = "wasm")]
        {
            wasm::post_json(url, body).await.map_err(TransportError)
        }
        #[cfg(not(target_family = "wasm"))]
        {
            let _ = (url, body);
            Err(TransportError("HTTP client only available in WASM".into()))
        }
    }
}

// ─── URL fragment ────────────────────────────────────────────────────────────

pub fn current_fragment() -> String {
    #[cfg(target_family = "wasm")]
    {
        web_sys::window()
            .and_then(|w| w.location().hash().ok())
            .unwrap_or_default()
    }
    #[cfg(not(target_family = "wasm"))]
    {
        String::new()
    }
}

/// Point the address bar at `fragment` unless it is already there.
pub fn set_fragment(fragment: &str) {
    #[cfg(target_family = "wasm")]
    {
        let Some(location) = web_sys::window().map(|w| w.location()) else {
            return;
        };
        if location.hash().ok().as_deref() == Some(fragment) {
            return;
        }
        if let Err(e) = location.set_hash(fragment) {
            clog(&format!("[NAV] Failed to set fragment {fragment}: {e:?}"));
        }
    }
    #[cfg(not(target_family = "wasm"))]
    let _ = fragment;
}

/// Call `on_change` with the new fragment whenever the user navigates.
pub fn on_fragment_change(on_change: impl FnMut(String) + 'static) {
    #[cfg(target_family = "wasm")]
    wasm::listen_hashchange(on_change);
    #[cfg(not(target_family = "wasm"))]
    let _ = on_change;
}

// ─── Files ───────────────────────────────────────────────────────────────────

/// Read the file currently selected in the `<input type="file">` with
/// `input_id`, then clear the input so the same file can be picked again.
pub async fn read_selected_file(input_id: &str) -> Result<Option<ScanFile>, String> {
    #[cfg(target_family = "wasm")]
    {
        wasm::read_selected_file(input_id).await
    }
    #[cfg(not(target_family = "wasm"))]
    {
        let _ = input_id;
        Err("File access only available in WASM".to_string())
    }
}

/// Offer `file` to the user as a download.
pub fn download(file: &ExportedFile) -> Result<(), String> {
    #[cfg(target_family = "wasm")]
    {
        wasm::download(file)
    }
    #[cfg(not(target_family = "wasm"))]
    {
        let _ = file;
        Err("Downloads only available in WASM".to_string())
    }
}

#[cfg(target_family = "wasm")]
mod wasm {
    use freightdesk_common::export::ExportedFile;
    use freightdesk_common::scan::ScanFile;
    use freightdesk_common::storage::KeyValueStore;
    use freightdesk_common::transport::HttpResponse;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;

    use super::clog;

    const REVOKE_DELAY_MS: u32 = 1_000;

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }

    #[derive(Clone, Copy, Debug, Default)]
    pub struct LocalStorage;

    impl KeyValueStore for LocalStorage {
        fn get(&self, key: &str) -> Option<String> {
            storage()?.get_item(key).ok()?
        }

        fn set(&mut self, key: &str, value: &str) {
            let Some(storage) = storage() else {
                clog("[STORAGE] localStorage unavailable");
                return;
            };
            if let Err(e) = storage.set_item(key, value) {
                clog(&format!("[STORAGE] Failed to write {key}: {e:?}"));
            }
        }

        fn remove(&mut self, key: &str) {
            let Some(storage) = storage() else {
                clog("[STORAGE] localStorage unavailable");
                return;
            };
            if let Err(e) = storage.remove_item(key) {
                clog(&format!("[STORAGE] Failed to remove {key}: {e:?}"));
            }
        }
    }

    pub async fn post_json(url: &str, body: &str) -> Result<HttpResponse, String> {
        let opts = web_sys::RequestInit::new();
        opts.set_method("POST");
        opts.set_mode(web_sys::RequestMode::Cors);
        opts.set_body(&JsValue::from_str(body));

        let request = web_sys::Request::new_with_str_and_init(url, &opts)
            .map_err(|e| format!("Failed to create request: {:?}", e))?;
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(|e| format!("Failed to set header: {:?}", e))?;

        let window = web_sys::window().ok_or("No window")?;
        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| format!("Fetch failed: {:?}", e))?;

        let resp: web_sys::Response = resp_value
            .dyn_into()
            .map_err(|_| "Response is not a Response object".to_string())?;

        let text = JsFuture::from(
            resp.text()
                .map_err(|e| format!("Failed to get text: {:?}", e))?,
        )
        .await
        .map_err(|e| format!("Failed to read body: {:?}", e))?;

        let body = text
            .as_string()
            .ok_or("Response body is not a string".to_string())?;

        Ok(HttpResponse {
            status: resp.status(),
            body,
        })
    }

    pub fn listen_hashchange(mut on_change: impl FnMut(String) + 'static) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            on_change(super::current_fragment());
        });
        if let Err(e) =
            window.add_event_listener_with_callback("hashchange", callback.as_ref().unchecked_ref())
        {
            clog(&format!("[NAV] Failed to listen for hashchange: {e:?}"));
        }
        // Lives as long as the page.
        callback.forget();
    }

    pub async fn read_selected_file(input_id: &str) -> Result<Option<ScanFile>, String> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or("No document")?;
        let input: web_sys::HtmlInputElement = document
            .get_element_by_id(input_id)
            .ok_or_else(|| format!("No element #{input_id}"))?
            .dyn_into()
            .map_err(|_| format!("#{input_id} is not an input"))?;

        let Some(file) = input.files().and_then(|files| files.get(0)) else {
            return Ok(None);
        };
        let name = file.name();
        let mime_type = file.type_();
        let buffer = JsFuture::from(file.array_buffer())
            .await
            .map_err(|e| format!("Failed to read {name}: {:?}", e))?;
        let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
        input.set_value("");

        Ok(Some(ScanFile {
            name,
            mime_type,
            bytes,
        }))
    }

    pub fn download(file: &ExportedFile) -> Result<(), String> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or("No document")?;

        let parts = js_sys::Array::new();
        parts.push(&JsValue::from_str(&file.contents));
        let opts = web_sys::BlobPropertyBag::new();
        opts.set_type(file.mime_type);
        let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &opts)
            .map_err(|e| format!("Failed to create blob: {:?}", e))?;
        let url = web_sys::Url::create_object_url_with_blob(&blob)
            .map_err(|e| format!("Failed to create object URL: {:?}", e))?;

        let anchor: web_sys::HtmlAnchorElement = document
            .create_element("a")
            .map_err(|e| format!("Failed to create anchor: {:?}", e))?
            .dyn_into()
            .map_err(|_| "Element is not an anchor".to_string())?;
        anchor.set_href(&url);
        anchor.set_download(&file.file_name);
        anchor.click();

        // Revoking right after the click can cancel the download.
        wasm_bindgen_futures::spawn_local(async move {
            gloo_timers::future::TimeoutFuture::new(REVOKE_DELAY_MS).await;
            if let Err(e) = web_sys::Url::revoke_object_url(&url) {
                clog(&format!("[DOWNLOAD] Failed to revoke object URL: {e:?}"));
            }
        });
        Ok(())
    }
}
