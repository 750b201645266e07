//! DOM wiring for a standalone page.
//!
//! [`mount`] creates a full-window `<canvas>` inside a container element and
//! connects pointer, wheel, resize, upload and export listeners to one
//! shared [`EaselCanvas`]. Listener closures are leaked on purpose: they
//! live as long as the page.

use crate::EaselCanvas;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::WasmClosure;
use wasm_bindgen::prelude::*;
use web_sys::{
    Blob, BlobPropertyBag, CanvasRenderingContext2d, Document, Event, EventTarget, File, FileReader,
    HtmlAnchorElement, HtmlCanvasElement, HtmlElement, HtmlInputElement, PointerEvent, Url, WheelEvent, Window,
};

struct Mounted {
    editor: EaselCanvas,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl Mounted {
    fn redraw(&mut self) {
        self.editor.render(&self.ctx);
    }

    fn fit_window(&mut self, window: &Window) {
        let (w, h) = window_size(window);
        self.canvas.set_width(w as u32);
        self.canvas.set_height(h as u32);
        self.editor.resize(w, h);
    }
}

type Shared = Rc<RefCell<Mounted>>;

/// Build the editor inside `container_id` and wire the page controls.
#[wasm_bindgen]
pub fn mount(
    container_id: &str,
    file_input_id: &str,
    upload_button_id: &str,
    export_button_id: &str,
) -> Result<(), JsValue> {
    crate::logger::init(log::LevelFilter::Info);
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;

    let container = element(&document, container_id)?;
    let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
    canvas.style().set_property("display", "block")?;
    canvas.style().set_property("touch-action", "none")?;
    container.append_child(&canvas)?;
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;

    let (w, h) = window_size(&window);
    let state: Shared = Rc::new(RefCell::new(Mounted {
        editor: EaselCanvas::new(w, h),
        canvas: canvas.clone(),
        ctx,
    }));
    state.borrow_mut().fit_window(&window);

    wire_pointer(&canvas, &state)?;
    wire_wheel(&canvas, &state)?;
    wire_resize(&window, &state)?;

    let file_input: HtmlInputElement = element(&document, file_input_id)?.dyn_into()?;
    wire_upload_button(&element(&document, upload_button_id)?, &file_input)?;
    wire_file_input(&file_input, &state)?;
    wire_export(&document, &element(&document, export_button_id)?, &state)?;

    state.borrow_mut().redraw();
    log::info!("mounted into #{container_id} ({w}x{h})");
    Ok(())
}

// ─── Stage listeners ─────────────────────────────────────────────────────

fn wire_pointer(canvas: &HtmlCanvasElement, state: &Shared) -> Result<(), JsValue> {
    for kind in ["pointerdown", "pointermove", "pointerup", "pointercancel"] {
        let state = state.clone();
        let target = canvas.clone();
        let cb = Closure::<dyn FnMut(PointerEvent)>::new(move |e: PointerEvent| {
            let (x, y) = (f64::from(e.offset_x()), f64::from(e.offset_y()));
            let (shift, ctrl, alt, meta) = (e.shift_key(), e.ctrl_key(), e.alt_key(), e.meta_key());
            let mut s = state.borrow_mut();
            let changed = match kind {
                "pointerdown" => {
                    let _ = target.set_pointer_capture(e.pointer_id());
                    s.editor.handle_pointer_down(x, y, shift, ctrl, alt, meta)
                }
                "pointermove" => s.editor.handle_pointer_move(x, y, shift, ctrl, alt, meta),
                "pointerup" => s.editor.handle_pointer_up(x, y, shift, ctrl, alt, meta),
                _ => s.editor.handle_pointer_cancel(x, y, shift, ctrl, alt, meta),
            };
            if changed {
                s.redraw();
            }
        });
        listen(canvas, kind, cb)?;
    }
    Ok(())
}

fn wire_wheel(canvas: &HtmlCanvasElement, state: &Shared) -> Result<(), JsValue> {
    let state = state.clone();
    let cb = Closure::<dyn FnMut(WheelEvent)>::new(move |e: WheelEvent| {
        e.prevent_default();
        let mut s = state.borrow_mut();
        let changed = s.editor.handle_wheel(
            f64::from(e.offset_x()),
            f64::from(e.offset_y()),
            e.delta_x(),
            e.delta_y(),
            e.shift_key(),
            e.ctrl_key(),
            e.alt_key(),
            e.meta_key(),
        );
        if changed {
            s.redraw();
        }
    });
    listen(canvas, "wheel", cb)
}

fn wire_resize(window: &Window, state: &Shared) -> Result<(), JsValue> {
    let state = state.clone();
    let win = window.clone();
    let cb = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
        let mut s = state.borrow_mut();
        s.fit_window(&win);
        s.redraw();
    });
    listen(window, "resize", cb)
}

// ─── Upload ──────────────────────────────────────────────────────────────

fn wire_upload_button(button: &HtmlElement, file_input: &HtmlInputElement) -> Result<(), JsValue> {
    let input = file_input.clone();
    let cb = Closure::<dyn FnMut(Event)>::new(move |_: Event| input.click());
    listen(button, "click", cb)
}

/// Each selected file is read on its own; the input is cleared afterwards
/// so picking the same file again still fires `change`.
fn wire_file_input(file_input: &HtmlInputElement, state: &Shared) -> Result<(), JsValue> {
    let state = state.clone();
    let input = file_input.clone();
    let cb = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
        if let Some(files) = input.files() {
            for i in 0..files.length() {
                if let Some(file) = files.get(i)
                    && let Err(err) = read_file(file, state.clone())
                {
                    log::warn!("could not read upload: {err:?}");
                }
            }
        }
        input.set_value("");
    });
    listen(file_input, "change", cb)
}

fn read_file(file: File, state: Shared) -> Result<(), JsValue> {
    let reader = FileReader::new()?;
    let name = file.name();
    let source = reader.clone();
    let onload = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
        let Ok(buffer) = source.result() else {
            return;
        };
        let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
        let mut s = state.borrow_mut();
        match s.editor.add_image(&bytes) {
            Ok(id) => {
                log::info!("{name} → {id}");
                s.redraw();
            }
            Err(err) => log::warn!("{name}: {}", err.as_string().unwrap_or_default()),
        }
    });
    reader.set_onload(Some(onload.as_ref().unchecked_ref()));
    onload.forget();
    reader.read_as_array_buffer(&file)
}

// ─── Export ──────────────────────────────────────────────────────────────

fn wire_export(document: &Document, button: &HtmlElement, state: &Shared) -> Result<(), JsValue> {
    let state = state.clone();
    let document = document.clone();
    let cb = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
        let mut s = state.borrow_mut();
        let result = s.editor.export_png().and_then(|png| {
            let name = s.editor.export_file_name();
            download_png(&document, &png, &name)
        });
        // Selection was cleared by the export.
        s.redraw();
        if let Err(err) = result {
            log::error!("export failed: {}", err.as_string().unwrap_or_default());
        }
    });
    listen(button, "click", cb)
}

fn download_png(document: &Document, png: &[u8], file_name: &str) -> Result<(), JsValue> {
    let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(png));
    let options = BlobPropertyBag::new();
    options.set_type("image/png");
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let link: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    link.set_href(&url);
    link.set_download(file_name);
    let body = document.body().ok_or_else(|| JsValue::from_str("no body"))?;
    body.append_child(&link)?;
    link.click();
    link.remove();
    Url::revoke_object_url(&url)
}

// ─── Helpers ─────────────────────────────────────────────────────────────

fn element(document: &Document, id: &str) -> Result<HtmlElement, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing element #{id}")))?
        .dyn_into()
        .map_err(JsValue::from)
}

fn window_size(window: &Window) -> (f64, f64) {
    let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (w, h)
}

fn listen<T: WasmClosure + ?Sized>(target: &EventTarget, kind: &str, cb: Closure<T>) -> Result<(), JsValue> {
    target.add_event_listener_with_callback(kind, cb.as_ref().unchecked_ref())?;
    cb.forget();
    Ok(())
}
