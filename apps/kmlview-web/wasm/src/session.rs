//! Stateful viewer session
//!
//! Holds the uploaded document and everything derived from it in Rust. The
//! session can drive a mounted page (see `mount`) or be used headless from
//! JavaScript through its getters.

use crate::intake::read_file_text;
use crate::render::Page;
use kmlview_core::view::BUTTONS;
use kmlview_core::{KmlViewError, ViewModel, ViewerAction, ViewerConfig, ViewerState};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::File;

/// State shared between the session object and DOM callbacks
pub(crate) struct Viewer {
    state: ViewerState,
    config: ViewerConfig,
    /// Bumped on every successful upload
    generation: u64,
    change_callback: Option<js_sys::Function>,
}

impl Viewer {
    fn new(config: ViewerConfig) -> Self {
        Self {
            state: ViewerState::new(),
            config,
            generation: 0,
            change_callback: None,
        }
    }

    fn load_text(&mut self, file_name: Option<&str>, text: &str) -> Result<(), KmlViewError> {
        self.state
            .load_text(file_name, text, self.config.length_metric)?;
        self.generation += 1;
        Ok(())
    }

    fn view(&self) -> ViewModel<'_> {
        ViewModel::from_state(&self.state, &self.config)
    }
}

/// Re-render the page (if mounted) and notify the change callback
///
/// The callback runs after the borrow is released so it may call back into
/// the session.
fn refresh(viewer: &RefCell<Viewer>, page: Option<&Page>) -> Result<(), JsValue> {
    let callback = {
        let viewer = viewer.borrow();
        if let Some(page) = page {
            page.render(&viewer.view(), viewer.generation)?;
        }
        viewer.change_callback.clone()
    };

    if let Some(callback) = callback {
        callback.call0(&JsValue::NULL)?;
    }
    Ok(())
}

/// Read, process and render one picked file
async fn process_file(
    viewer: Rc<RefCell<Viewer>>,
    page: Option<Rc<Page>>,
    file: File,
) -> Result<(), KmlViewError> {
    let name = file.name();
    let result = match read_file_text(&file).await {
        Ok(text) => viewer.borrow_mut().load_text(Some(&name), &text),
        Err(e) => Err(e),
    };

    if let Some(page) = &page {
        match &result {
            Ok(()) => page.set_status(&format!(
                "Loaded {} ({})",
                name,
                crate::format_bytes(file.size() as usize)
            )),
            Err(e) => page.set_status(&e.to_string()),
        }
    }

    result?;
    if let Err(e) = refresh(&viewer, page.as_deref()) {
        web_sys::console::error_1(&e);
    }
    Ok(())
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn config_from_js(config: JsValue) -> Result<ViewerConfig, JsValue> {
    if config.is_undefined() || config.is_null() {
        return Ok(ViewerConfig::default());
    }
    serde_wasm_bindgen::from_value(config)
        .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))
}

/// Viewer session: one current upload, two summary tables, one map
#[wasm_bindgen]
pub struct KmlViewerSession {
    viewer: Rc<RefCell<Viewer>>,
    page: Option<Rc<Page>>,
}

impl Default for KmlViewerSession {
    fn default() -> Self {
        Self::new()
    }
}

impl KmlViewerSession {
    fn with_viewer_config(config: ViewerConfig) -> Self {
        Self {
            viewer: Rc::new(RefCell::new(Viewer::new(config))),
            page: None,
        }
    }

    /// Internal method to load text (testable without JsValue)
    fn load_text_internal(&self, file_name: Option<&str>, text: &str) -> Result<(), KmlViewError> {
        self.viewer.borrow_mut().load_text(file_name, text)
    }

    fn dispatch(&self, action: ViewerAction) -> Result<(), JsValue> {
        self.viewer.borrow_mut().state.dispatch(action);
        refresh(&self.viewer, self.page.as_deref())
    }

    /// Build the page inside `root_id` and wire its controls to this session
    pub(crate) fn attach(&mut self, root_id: &str) -> Result<(), JsValue> {
        let window =
            web_sys::window().ok_or_else(|| JsValue::from_str("No window object available"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("No document object available"))?;
        let root = document
            .get_element_by_id(root_id)
            .ok_or_else(|| JsValue::from_str(&format!("Element #{} not found", root_id)))?;

        let page = {
            let viewer = self.viewer.borrow();
            Rc::new(Page::build(&root, &viewer.view())?)
        };

        // File picker
        let on_file_change = {
            let viewer = Rc::clone(&self.viewer);
            let page = Rc::clone(&page);
            Closure::wrap(Box::new(move |_event: web_sys::Event| {
                let Some(file) = page.file_input().files().and_then(|files| files.get(0)) else {
                    return;
                };
                let viewer = Rc::clone(&viewer);
                let page = Rc::clone(&page);
                wasm_bindgen_futures::spawn_local(async move {
                    if let Err(e) = process_file(viewer, Some(page), file).await {
                        web_sys::console::error_1(&JsValue::from_str(&e.to_string()));
                    }
                });
            }) as Box<dyn FnMut(_)>)
        };
        page.file_input()
            .add_event_listener_with_callback("change", on_file_change.as_ref().unchecked_ref())?;
        on_file_change.forget();

        // Summary / Detailed buttons
        for (button, model) in page.buttons().iter().zip(BUTTONS.iter()) {
            let action = model.action;
            let viewer = Rc::clone(&self.viewer);
            let page_for_click = Rc::clone(&page);
            let on_click = Closure::wrap(Box::new(move |_event: web_sys::Event| {
                viewer.borrow_mut().state.dispatch(action);
                if let Err(e) = refresh(&viewer, Some(&page_for_click)) {
                    web_sys::console::error_1(&e);
                }
            }) as Box<dyn FnMut(_)>);
            button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
            on_click.forget();
        }

        refresh(&self.viewer, Some(&page))?;
        self.page = Some(page);
        Ok(())
    }
}

#[wasm_bindgen]
impl KmlViewerSession {
    /// Create a session with the default map view and length metric
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::with_viewer_config(ViewerConfig::default())
    }

    /// Create a session from a (partial) config object
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue) -> Result<KmlViewerSession, JsValue> {
        Ok(Self::with_viewer_config(config_from_js(config)?))
    }

    /// Called with no arguments after every state change
    #[wasm_bindgen(js_name = setChangeCallback)]
    pub fn set_change_callback(&mut self, callback: js_sys::Function) {
        self.viewer.borrow_mut().change_callback = Some(callback);
    }

    /// Process KML text as if it had been uploaded
    #[wasm_bindgen(js_name = loadText)]
    pub fn load_text(&mut self, file_name: Option<String>, text: &str) -> Result<(), JsValue> {
        self.load_text_internal(file_name.as_deref(), text)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        refresh(&self.viewer, self.page.as_deref())
    }

    /// Read a picked file and process it; resolves when state is updated
    ///
    /// No cancellation: if two reads overlap, the one finishing last wins.
    #[wasm_bindgen(js_name = submitFile)]
    pub fn submit_file(&self, file: File) -> js_sys::Promise {
        let viewer = Rc::clone(&self.viewer);
        let page = self.page.clone();
        wasm_bindgen_futures::future_to_promise(async move {
            process_file(viewer, page, file)
                .await
                .map(|()| JsValue::UNDEFINED)
                .map_err(|e| JsValue::from_str(&e.to_string()))
        })
    }

    /// "Summary" button: empties the type counts
    #[wasm_bindgen(js_name = clearSummary)]
    pub fn clear_summary(&mut self) -> Result<(), JsValue> {
        self.dispatch(ViewerAction::ClearSummary)
    }

    /// "Detailed" button: empties the length records
    #[wasm_bindgen(js_name = clearDetails)]
    pub fn clear_details(&mut self) -> Result<(), JsValue> {
        self.dispatch(ViewerAction::ClearDetails)
    }

    /// `{ Point, LineString, Polygon, MultiLineString }` counts, or null when empty
    #[wasm_bindgen(js_name = getTypeCounts)]
    pub fn get_type_counts(&self) -> Result<JsValue, JsValue> {
        match self.viewer.borrow().state.type_counts() {
            Some(counts) => to_js(counts),
            None => Ok(JsValue::NULL),
        }
    }

    /// Array of `{ feature_type, length: { unit, value } }`
    #[wasm_bindgen(js_name = getFeatureDetails)]
    pub fn get_feature_details(&self) -> Result<JsValue, JsValue> {
        to_js(self.viewer.borrow().state.details())
    }

    /// Converted GeoJSON FeatureCollection as a JSON string
    #[wasm_bindgen(js_name = getMapDataJson)]
    pub fn get_map_data_json(&self) -> Result<Option<String>, JsValue> {
        self.viewer
            .borrow()
            .state
            .map_data()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Full render model as a JSON string
    #[wasm_bindgen(js_name = getViewModelJson)]
    pub fn get_view_model_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.viewer.borrow().view())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    #[wasm_bindgen(js_name = hasMap)]
    pub fn has_map(&self) -> bool {
        self.viewer.borrow().state.has_map()
    }

    #[wasm_bindgen(js_name = getFileName)]
    pub fn get_file_name(&self) -> Option<String> {
        self.viewer.borrow().state.file_name().map(str::to_string)
    }

    /// Number of Placemark elements in the current document
    #[wasm_bindgen(js_name = getPlacemarkCount)]
    pub fn get_placemark_count(&self) -> usize {
        self.viewer
            .borrow()
            .state
            .document()
            .map(|doc| doc.placemarks().count())
            .unwrap_or(0)
    }
}
