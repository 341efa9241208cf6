use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::rust_error;
use crate::web_document::web_window;
use crate::web_error_handling::JsResult;


// GETs `url` and returns the body as text. Non-2xx replies are not errors here: the server puts
// a JSON explanation into those too, and the caller decides what it means.
pub async fn fetch_text(url: &str) -> JsResult<String> {
    let response = JsFuture::from(web_window()?.fetch_with_str(url)).await?;
    let response: web_sys::Response = response.dyn_into()?;
    if !response.ok() {
        log::warn!("GET {} returned HTTP {}", url, response.status());
    }
    let body = JsFuture::from(response.text()?).await?;
    body.as_string().ok_or_else(|| rust_error!("Response body of {} is not text", url))
}
