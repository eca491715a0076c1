use std::{cell::RefCell, rc::Rc};
use tracepad::{
    config::Config,
    coords::Sample,
    event::{Event, Touch},
    i18n, s, Color, ImageLoader, PixelPos, Response, Session, Size,
};
use wasm_bindgen::{convert::FromWasmAbi, prelude::*, JsCast};
use web_sys::{
    AddEventListenerOptions, CanvasRenderingContext2d, Document, HtmlCanvasElement,
    MouseEvent, TouchEvent, Window,
};

pub mod canvas;
pub mod loader;

use canvas::{CanvasSurface, WebImage};
use loader::WebLoader;

pub const CANVAS_ID: &str = "drawingCanvas";

struct State {
    session: Session<WebImage>,
    surface: CanvasSurface,
}

type Shared = Rc<RefCell<State>>;

#[derive(Clone)]
struct App {
    window: Window,
    state: Shared,
    loader: Rc<WebLoader>,
    config: Rc<Config>,
}

fn missing(what: &str) -> JsValue {
    JsValue::from_str(&format!("Missing {what}"))
}

fn viewport(window: &Window) -> Size {
    let dim = |value: Result<JsValue, JsValue>| {
        value
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or_default() as f32
    };
    Size::new(dim(window.inner_width()), dim(window.inner_height()))
}

fn mouse_sample(surface: &CanvasSurface, event: &MouseEvent) -> Sample {
    Sample::new(
        PixelPos {
            x: event.client_x() as f32,
            y: event.client_y() as f32,
        },
        surface.bounds(),
    )
}

fn touch_sample(surface: &CanvasSurface, event: &TouchEvent) -> Option<Sample> {
    let touch = event.touches().get(0)?;
    Some(Sample::new(
        PixelPos {
            x: touch.client_x() as f32,
            y: touch.client_y() as f32,
        },
        surface.bounds(),
    ))
}

impl App {
    fn dispatch(&self, event: Event) {
        let response = {
            let mut state = self.state.borrow_mut();
            let State { session, surface } = &mut *state;
            session.next(surface, event)
        };
        self.respond(response);
    }

    fn respond(&self, response: Response) {
        match response {
            Response::LoadReference(request) => {
                let app = self.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    let result = app.loader.load(request.path()).await;
                    let response = {
                        let mut state = app.state.borrow_mut();
                        let State { session, surface } = &mut *state;
                        session.finish_reference(surface, request, result)
                    };
                    app.respond(response);
                });
            }

            Response::Notice(text) => self.alert(&text),

            Response::Nothing | Response::Painted | Response::Redrawn => {}
        }
    }

    fn alert(&self, text: &str) {
        if self.window.alert_with_message(text).is_err() {
            log::warn!("could not alert: {text}");
        }
    }

    fn is_drawing(&self) -> bool {
        self.state.borrow().session.is_drawing()
    }

    fn resize(&self) {
        let size = self.config.initial_surface_size(viewport(&self.window));
        self.dispatch(Event::Resize(size));
    }
}

fn listen<E, F>(target: &web_sys::EventTarget, name: &str, handler: F) -> Result<(), JsValue>
where
    E: FromWasmAbi + 'static,
    F: FnMut(E) + 'static,
{
    let closure = Closure::<dyn FnMut(E)>::new(handler);
    target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

// touchmove must not be passive or preventDefault is ignored
fn listen_active<F>(target: &web_sys::EventTarget, name: &str, handler: F) -> Result<(), JsValue>
where
    F: FnMut(TouchEvent) + 'static,
{
    let closure = Closure::<dyn FnMut(TouchEvent)>::new(handler);
    let options = AddEventListenerOptions::new();
    options.set_passive(false);
    target.add_event_listener_with_callback_and_add_event_listener_options(
        name,
        closure.as_ref().unchecked_ref(),
        &options,
    )?;
    closure.forget();
    Ok(())
}

fn bind_pointer(app: &App, canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
    {
        let app = app.clone();
        listen(canvas, "mousedown", move |event: MouseEvent| {
            let sample = mouse_sample(&app.state.borrow().surface, &event);
            app.dispatch(Event::PointerDown(sample));
        })?;
    }

    {
        let app = app.clone();
        listen(canvas, "mousemove", move |event: MouseEvent| {
            if !app.is_drawing() {
                return;
            }
            let sample = mouse_sample(&app.state.borrow().surface, &event);
            app.dispatch(Event::PointerMove(sample));
        })?;
    }

    {
        let app = app.clone();
        listen(canvas, "mouseup", move |_: MouseEvent| {
            app.dispatch(Event::PointerUp);
        })?;
    }

    {
        let app = app.clone();
        listen(canvas, "mouseout", move |_: MouseEvent| {
            app.dispatch(Event::PointerLeave);
        })?;
    }

    Ok(())
}

fn bind_touch(app: &App, canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
    {
        let app = app.clone();
        listen_active(canvas, "touchstart", move |event: TouchEvent| {
            let sample = touch_sample(&app.state.borrow().surface, &event);
            if let Some(sample) = sample {
                event.prevent_default();
                app.dispatch(Event::Touch(Touch::start(sample)));
            }
        })?;
    }

    {
        let app = app.clone();
        listen_active(canvas, "touchmove", move |event: TouchEvent| {
            if !app.is_drawing() {
                return;
            }
            event.prevent_default();
            let sample = touch_sample(&app.state.borrow().surface, &event);
            if let Some(sample) = sample {
                app.dispatch(Event::Touch(Touch::moved(sample)));
            }
        })?;
    }

    {
        let app = app.clone();
        listen(canvas, "touchend", move |_: TouchEvent| {
            app.dispatch(Event::Touch(Touch::end()));
        })?;
    }

    {
        let app = app.clone();
        listen(canvas, "touchcancel", move |_: TouchEvent| {
            app.dispatch(Event::Touch(Touch::cancel()));
        })?;
    }

    Ok(())
}

fn bind_button(
    app: &App,
    document: &Document,
    id: &str,
    label: String,
    event: Event,
) -> Result<(), JsValue> {
    let Some(button) = document.get_element_by_id(id) else {
        log::warn!("no #{id} button");
        return Ok(());
    };
    if button.text_content().unwrap_or_default().trim().is_empty() {
        button.set_text_content(Some(&label));
    }

    let app = app.clone();
    listen(&button, "click", move |_: web_sys::Event| {
        app.dispatch(event);
    })
}

/// Attributes of the button that selects `color`.
fn swatch_attributes(color: Color) -> [(&'static str, String); 4] {
    let hex = color.to_hex();
    [
        ("class", String::from("color-button")),
        ("type", String::from("button")),
        ("style", format!("background: {hex}")),
        ("data-color", hex),
    ]
}

/// Fills `#palette` with one button per configured color.
fn bind_palette(app: &App, document: &Document) -> Result<(), JsValue> {
    let Some(container) = document.get_element_by_id("palette") else {
        log::warn!("no #palette container");
        return Ok(());
    };

    let palette = app.state.borrow().session.palette().to_vec();
    for color in palette {
        let button = document.create_element("button")?;
        for (name, value) in swatch_attributes(color) {
            button.set_attribute(name, &value)?;
        }
        container.append_child(&button)?;

        let app = app.clone();
        listen(&button, "click", move |_: web_sys::Event| {
            app.dispatch(Event::SelectColor(color));
        })?;
    }

    Ok(())
}

fn browser_language(window: &Window) {
    if let Some(lang) = window.navigator().language() {
        i18n::set_lang(&lang);
    }
}

#[wasm_bindgen(start)]
pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Debug)
        .map_err(|err| JsValue::from_str(&err.to_string()))?;

    let window = web_sys::window().ok_or_else(|| missing("window"))?;
    let document = window.document().ok_or_else(|| missing("document"))?;

    let config = Config::new();
    match &config.language {
        Some(lang) => i18n::set_lang(lang),
        None => browser_language(&window),
    }

    let canvas = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| missing(CANVAS_ID))?
        .dyn_into::<HtmlCanvasElement>()?;
    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| missing("canvas context"))?
        .dyn_into::<CanvasRenderingContext2d>()?;

    let assets = canvas.get_attribute("data-assets").unwrap_or_default();

    let app = App {
        window: window.clone(),
        state: Rc::new(RefCell::new(State {
            session: Session::new(&config),
            surface: CanvasSurface::new(canvas.clone(), ctx),
        })),
        loader: Rc::new(WebLoader::new(assets)),
        config: Rc::new(config),
    };

    bind_pointer(&app, &canvas)?;
    bind_touch(&app, &canvas)?;
    bind_palette(&app, &document)?;
    bind_button(&app, &document, "clearButton", s!(ClearButton), Event::Clear)?;
    bind_button(&app, &document, "undoButton", s!(UndoButton), Event::Undo)?;
    bind_button(
        &app,
        &document,
        "showAnimalButton",
        s!(ShowReferenceButton),
        Event::ShowReference,
    )?;

    {
        let resized = app.clone();
        listen(&window, "resize", move |_: web_sys::Event| resized.resize())?;
    }

    app.resize();
    log::info!("tracepad ready");
    Ok(())
}
