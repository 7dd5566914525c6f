//! File intake: read a picked file as text
//!
//! Wraps `FileReader` in a promise the same way the IndexedDB helpers wrap
//! their requests, so callers can simply await the text.

use kmlview_core::KmlViewError;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, FileReader};

/// Read the whole file as text
pub async fn read_file_text(file: &File) -> Result<String, KmlViewError> {
    let reader = FileReader::new().map_err(read_error)?;
    let promise = file_reader_promise(&reader);

    reader.read_as_text(file).map_err(read_error)?;
    let result = JsFuture::from(promise).await.map_err(read_error)?;

    result
        .as_string()
        .ok_or_else(|| KmlViewError::Read(format!("{} did not produce text", file.name())))
}

/// Promise that resolves with the reader's result on load, rejects on error/abort
fn file_reader_promise(reader: &FileReader) -> js_sys::Promise {
    let reader = reader.clone();

    js_sys::Promise::new(&mut move |resolve, reject| {
        let reader_for_load = reader.clone();
        let reader_for_error = reader.clone();
        let reject_on_abort = reject.clone();

        let onload = Closure::once(Box::new(move |_event: web_sys::Event| {
            if let Ok(result) = reader_for_load.result() {
                let _ = resolve.call1(&JsValue::NULL, &result);
            }
        }) as Box<dyn FnOnce(_)>);

        let onerror = Closure::once(Box::new(move |_event: web_sys::Event| {
            let message = reader_for_error
                .error()
                .map(|e| e.message())
                .unwrap_or_else(|| "File could not be read".to_string());
            let _ = reject.call1(&JsValue::NULL, &JsValue::from_str(&message));
        }) as Box<dyn FnOnce(_)>);

        let onabort = Closure::once(Box::new(move |_event: web_sys::Event| {
            let _ = reject_on_abort.call1(&JsValue::NULL, &JsValue::from_str("File read aborted"));
        }) as Box<dyn FnOnce(_)>);

        reader.set_onload(Some(onload.as_ref().unchecked_ref()));
        reader.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        reader.set_onabort(Some(onabort.as_ref().unchecked_ref()));

        onload.forget();
        onerror.forget();
        onabort.forget();
    })
}

/// Best-effort message out of a thrown JS value
pub fn js_error_message(value: &JsValue) -> String {
    if let Some(message) = value.as_string() {
        return message;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{:?}", value)
}

fn read_error(value: JsValue) -> KmlViewError {
    KmlViewError::Read(js_error_message(&value))
}
