//! DOM rendering of the view model
//!
//! The static controls (heading, file input, buttons) are built once; the
//! table and map slots are rebuilt from the `ViewModel` after each change.

use crate::map_bridge;
use kmlview_core::view::{TableModel, ViewModel};
use std::cell::Cell;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement};

const TABLE_CLASS: &str = "table table-striped table-bordered table-hover";

/// Handles to the mounted page
pub struct Page {
    document: Document,
    file_input: HtmlInputElement,
    buttons: Vec<Element>,
    status: Element,
    summary_slot: Element,
    details_slot: Element,
    map_slot: HtmlElement,
    map_slot_id: String,
    /// Upload generation currently drawn on the map
    map_generation: Cell<Option<u64>>,
}

impl Page {
    /// Build the page skeleton inside `root`, replacing its content
    pub fn build(root: &Element, view: &ViewModel<'_>) -> Result<Self, JsValue> {
        let document = root
            .owner_document()
            .ok_or_else(|| JsValue::from_str("No document object available"))?;
        root.set_inner_html("");

        let app = document.create_element("div")?;
        app.set_class_name("App");
        root.append_child(&app)?;

        let heading = document.create_element("h1")?;
        heading.set_text_content(Some(view.heading));
        app.append_child(&heading)?;

        let file_input: HtmlInputElement = document.create_element("input")?.dyn_into()?;
        file_input.set_type("file");
        file_input.set_accept(view.file_accept);
        app.append_child(&file_input)?;

        let button_row = document.create_element("div")?;
        button_row.set_class_name("buttons");
        let mut buttons = Vec::with_capacity(view.buttons.len());
        for model in view.buttons.iter() {
            let button = document.create_element("button")?;
            button.set_attribute("type", "button")?;
            button.set_class_name(&format!("btn btn-{}", model.variant));
            button.set_text_content(Some(model.label));
            button_row.append_child(&button)?;
            buttons.push(button);
        }
        app.append_child(&button_row)?;

        let status = document.create_element("p")?;
        status.set_class_name("status");
        app.append_child(&status)?;

        let summary_slot = document.create_element("div")?;
        summary_slot.set_class_name("summary");
        app.append_child(&summary_slot)?;

        let details_slot = document.create_element("div")?;
        details_slot.set_class_name("details");
        app.append_child(&details_slot)?;

        let map_slot_id = match root.id().as_str() {
            "" => "kml-map".to_string(),
            id => format!("{}-map", id),
        };
        let map_slot: HtmlElement = document.create_element("div")?.dyn_into()?;
        map_slot.set_id(&map_slot_id);
        map_slot.style().set_property("display", "none")?;
        app.append_child(&map_slot)?;

        Ok(Self {
            document,
            file_input,
            buttons,
            status,
            summary_slot,
            details_slot,
            map_slot,
            map_slot_id,
            map_generation: Cell::new(None),
        })
    }

    pub fn file_input(&self) -> &HtmlInputElement {
        &self.file_input
    }

    /// Buttons in the same order as `ViewModel::buttons`
    pub fn buttons(&self) -> &[Element] {
        &self.buttons
    }

    pub fn set_status(&self, message: &str) {
        self.status.set_text_content(Some(message));
    }

    /// Redraw tables and map; the map is only rebuilt for a new upload
    pub fn render(&self, view: &ViewModel<'_>, generation: u64) -> Result<(), JsValue> {
        self.fill_slot(&self.summary_slot, view.summary.as_ref())?;
        self.fill_slot(&self.details_slot, view.details.as_ref())?;

        match &view.map {
            Some(map) => {
                let style = self.map_slot.style();
                style.set_property("display", "block")?;
                style.set_property("height", map.height)?;
                style.set_property("width", map.width)?;
                if self.map_generation.get() != Some(generation) {
                    map_bridge::show_map(&self.map_slot_id, map)?;
                    self.map_generation.set(Some(generation));
                }
            }
            None => {
                if self.map_generation.take().is_some() {
                    map_bridge::remove_map(&self.map_slot_id);
                }
                self.map_slot.style().set_property("display", "none")?;
            }
        }

        Ok(())
    }

    fn fill_slot(&self, slot: &Element, table: Option<&TableModel>) -> Result<(), JsValue> {
        slot.set_inner_html("");
        if let Some(table) = table {
            slot.append_child(&self.build_table(table)?)?;
        }
        Ok(())
    }

    fn build_table(&self, model: &TableModel) -> Result<Element, JsValue> {
        let table = self.document.create_element("table")?;
        table.set_class_name(TABLE_CLASS);

        let thead = self.document.create_element("thead")?;
        let header_row = self.document.create_element("tr")?;
        for header in model.headers {
            let th = self.document.create_element("th")?;
            th.set_text_content(Some(header));
            header_row.append_child(&th)?;
        }
        thead.append_child(&header_row)?;
        table.append_child(&thead)?;

        let tbody = self.document.create_element("tbody")?;
        for row in &model.rows {
            let tr = self.document.create_element("tr")?;
            for cell in row {
                let td = self.document.create_element("td")?;
                td.set_text_content(Some(cell.as_str()));
                tr.append_child(&td)?;
            }
            tbody.append_child(&tr)?;
        }
        table.append_child(&tbody)?;

        Ok(table)
    }
}
