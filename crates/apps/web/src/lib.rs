//! Browser shell for the globe: canvas wiring, pointer plumbing, and
//! the async world atlas load. All interaction behavior lives in the
//! `controller` crate; this file only translates between the DOM and
//! the pure crates.
//!
//! JS drives the app: it calls `init_canvas` and `load_world` once,
//! `set_canvas_size` on resize, `advance_frame` from
//! requestAnimationFrame, and forwards pointer events to the
//! `pointer_*` exports.
#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::sync::OnceLock;

use gloo_net::http::Request;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use atlas::{AtlasStore, WORLD_ATLAS_URL, WorldGeometry};
use controller::{GlobeController, SearchEvent};
use render::{Palette, RadialGradient, RenderOptions, Rgba, Surface, Viewport};

const CANVAS_ID: &str = "terraview-canvas";

static PANIC_HOOK_SET: OnceLock<()> = OnceLock::new();

struct AppState {
    canvas: Option<HtmlCanvasElement>,
    ctx: Option<CanvasRenderingContext2d>,
    controller: GlobeController,
    store: AtlasStore,
    atlas_loading: bool,
    palette: Palette,
    search_listener: Option<js_sys::Function>,
    /// Wall-clock timestamp of the previous `advance_frame` call.
    last_frame_ms: f64,
}

thread_local! {
    static STATE: RefCell<AppState> = RefCell::new(AppState {
        canvas: None,
        ctx: None,
        controller: GlobeController::default(),
        store: AtlasStore::new(),
        atlas_loading: false,
        palette: Palette::default(),
        search_listener: None,
        last_frame_ms: 0.0,
    });
}

/// Safe TLS access helper that returns a default on teardown instead of
/// panicking. Use this for all STATE accesses to prevent hot-reload
/// crashes.
fn with_state<F, R>(f: F) -> R
where
    F: FnOnce(&RefCell<AppState>) -> R,
    R: Default,
{
    STATE.try_with(f).unwrap_or_default()
}

fn init_panic_hook() {
    PANIC_HOOK_SET.get_or_init(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = info.to_string();
            web_sys::console::error_1(&JsValue::from_str(&msg));
        }));
    });
}

#[wasm_bindgen(start)]
pub fn start() {
    init_panic_hook();
}

/// Locate the canvas and grab its 2d context.
#[wasm_bindgen]
pub fn init_canvas() {
    if let Err(err) = init_canvas_inner() {
        web_sys::console::log_1(&JsValue::from_str(&format!("canvas init error: {err:?}")));
    }
}

fn init_canvas_inner() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| JsValue::from_str("missing terraview-canvas"))?
        .dyn_into::<HtmlCanvasElement>()?;
    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into::<CanvasRenderingContext2d>()?;

    with_state(|state| {
        let mut s = state.borrow_mut();
        s.canvas = Some(canvas);
        s.ctx = Some(ctx);
    });

    render_scene();
    Ok(())
}

/// Resize the drawing buffer. `width` and `height` are CSS pixels; the
/// backing store is scaled by `dpr` and the context transform set so the
/// render pipeline keeps working in CSS pixels.
#[wasm_bindgen]
pub fn set_canvas_size(width: f64, height: f64, dpr: f64) {
    let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
    let changed = with_state(|state| {
        let mut s = state.borrow_mut();
        if !s.controller.set_viewport(Viewport::new(width, height, dpr)) {
            return false;
        }
        if let Some(canvas) = &s.canvas {
            canvas.set_width((width * dpr).round().max(0.0) as u32);
            canvas.set_height((height * dpr).round().max(0.0) as u32);
        }
        if let Some(ctx) = &s.ctx {
            let _ = ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
        }
        true
    });
    if changed {
        render_scene();
    }
}

/// One requestAnimationFrame tick: advance the controller clock, redraw
/// when the frame changed, and deliver any search completion.
#[wasm_bindgen]
pub fn advance_frame() {
    let now_ms = js_sys::Date::now();
    let (tick, arrived_name) = with_state(|state| {
        let mut s = state.borrow_mut();
        let dt_s = if s.last_frame_ms > 0.0 {
            ((now_ms - s.last_frame_ms) / 1000.0).clamp(0.0, 0.1)
        } else {
            1.0 / 60.0
        };
        s.last_frame_ms = now_ms;
        let tick = s.controller.advance(dt_s);
        let name = match &tick.search {
            Some(SearchEvent::Arrived { country }) => s
                .controller
                .world()
                .and_then(|w| w.countries.get(*country))
                .map(|c| c.name.clone()),
            _ => None,
        };
        (tick, name)
    });
    if tick.redraw {
        render_scene();
    }
    if let Some(event) = tick.search {
        notify_search(&event, arrived_name.as_deref());
    }
}

#[wasm_bindgen]
pub fn pointer_down(x: f64, y: f64) {
    if with_state(|state| state.borrow_mut().controller.pointer_down(x, y)) {
        render_scene();
    }
}

#[wasm_bindgen]
pub fn pointer_move(x: f64, y: f64) {
    if with_state(|state| state.borrow_mut().controller.pointer_move(x, y)) {
        render_scene();
    }
}

#[wasm_bindgen]
pub fn pointer_up() {
    with_state(|state| state.borrow_mut().controller.pointer_up());
}

#[wasm_bindgen]
pub fn pointer_leave() {
    if with_state(|state| state.borrow_mut().controller.pointer_leave()) {
        render_scene();
    }
}

/// Fly the globe to a country by name. A miss is reported through the
/// search listener right away; a hit animates and reports on arrival.
#[wasm_bindgen]
pub fn fly_to(name: &str) {
    if let Some(event) = with_state(|state| state.borrow_mut().controller.fly_to(name)) {
        notify_search(&event, None);
    }
}

/// Install the JS callback for search outcomes. It receives one JSON
/// string argument, either `{"status":"not_found"}` or
/// `{"status":"arrived","country":i,"name":...}`.
#[wasm_bindgen]
pub fn set_search_listener(listener: js_sys::Function) {
    with_state(|state| {
        state.borrow_mut().search_listener = Some(listener);
    });
}

/// Current tooltip as JSON (`{"name":...,"x":...,"y":...}`), or `None`
/// when nothing is hovered. JS polls this after pointer events to place
/// the DOM tooltip.
#[wasm_bindgen]
pub fn tooltip_json() -> Option<String> {
    with_state(|state| {
        state.borrow().controller.tooltip().map(|t| {
            serde_json::json!({ "name": t.name, "x": t.x, "y": t.y }).to_string()
        })
    })
}

fn notify_search(event: &SearchEvent, name: Option<&str>) {
    let payload = match event {
        SearchEvent::NotFound => serde_json::json!({ "status": "not_found" }),
        SearchEvent::Arrived { country } => {
            serde_json::json!({ "status": "arrived", "country": country, "name": name })
        }
    };
    let listener = with_state(|state| state.borrow().search_listener.clone());
    if let Some(listener) = listener {
        let _ = listener.call1(&JsValue::NULL, &JsValue::from_str(&payload.to_string()));
    }
}

fn render_scene() {
    with_state(|state| {
        let s = state.borrow();
        let Some(ctx) = &s.ctx else {
            return;
        };
        let options = RenderOptions {
            margin_divisor: s.controller.config().margin_divisor,
            show_graticule: s.controller.config().show_graticule,
        };
        let mut surface = CanvasSurface { ctx };
        render::render(
            &mut surface,
            s.controller.viewport(),
            s.controller.rotation(),
            s.controller.world().map(|w| w.as_ref()),
            s.controller.hover().map(|h| h.country),
            &s.palette,
            &options,
        );
    });
}

/// Fetch and decode the world atlas from the public world-atlas CDN.
#[wasm_bindgen]
pub fn load_world() {
    load_world_from(WORLD_ATLAS_URL.to_string());
}

/// Fetch and decode the world atlas once per session. On failure the
/// globe keeps running with ocean and graticule only.
#[wasm_bindgen]
pub fn load_world_from(url: String) {
    let in_flight = with_state(|state| {
        let mut s = state.borrow_mut();
        if s.atlas_loading || s.store.get().is_some() {
            return true;
        }
        s.atlas_loading = true;
        false
    });
    if in_flight {
        return;
    }

    spawn_local(async move {
        match fetch_world_atlas(&url).await {
            Ok(world) => {
                with_state(|state| {
                    let mut s = state.borrow_mut();
                    s.atlas_loading = false;
                    s.store.publish(world);
                    if let Some(w) = s.store.get().cloned() {
                        s.controller.set_world(w);
                    }
                });
                render_scene();
            }
            Err(err) => {
                with_state(|state| state.borrow_mut().atlas_loading = false);
                web_sys::console::log_1(&JsValue::from_str(&format!(
                    "world atlas load failed: {err:?}"
                )));
            }
        }
    });
}

async fn fetch_world_atlas(url: &str) -> Result<WorldGeometry, JsValue> {
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    if !resp.ok() {
        return Err(JsValue::from_str(&format!("HTTP {}", resp.status())));
    }
    let text = resp
        .text()
        .await
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    atlas::decode_topology(&text).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Canvas 2D backend for the render pipeline. The pipeline works in CSS
/// pixels; device pixel ratio scaling is baked into the context
/// transform by `set_canvas_size`.
struct CanvasSurface<'a> {
    ctx: &'a CanvasRenderingContext2d,
}

impl Surface for CanvasSurface<'_> {
    fn clear(&mut self, width: f64, height: f64) {
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ctx.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ctx.line_to(x, y);
    }

    fn close_path(&mut self) {
        self.ctx.close_path();
    }

    fn circle(&mut self, cx: f64, cy: f64, radius: f64) {
        let _ = self
            .ctx
            .arc(cx, cy, radius.max(0.0), 0.0, std::f64::consts::TAU);
    }

    fn set_fill_color(&mut self, color: Rgba) {
        ctx_set_fill_style(self.ctx, &JsValue::from_str(&color.css()));
    }

    fn set_fill_gradient(&mut self, gradient: &RadialGradient) {
        let g = match self.ctx.create_radial_gradient(
            gradient.cx,
            gradient.cy,
            gradient.r_inner.max(0.0),
            gradient.cx,
            gradient.cy,
            gradient.r_outer.max(0.0),
        ) {
            Ok(g) => g,
            Err(_) => return,
        };
        for (offset, color) in &gradient.stops {
            let _ = g.add_color_stop(*offset as f32, &color.css());
        }
        ctx_set_fill_style(self.ctx, g.as_ref());
    }

    fn set_stroke_color(&mut self, color: Rgba) {
        ctx_set_stroke_style(self.ctx, &JsValue::from_str(&color.css()));
    }

    fn set_line_width(&mut self, width: f64) {
        self.ctx.set_line_width(width);
    }

    fn fill(&mut self) {
        self.ctx.fill();
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ctx.fill_rect(x, y, width, height);
    }
}

fn ctx_set_fill_style(ctx: &CanvasRenderingContext2d, value: &JsValue) {
    let _ = js_sys::Reflect::set(ctx.as_ref(), &JsValue::from_str("fillStyle"), value);
}

fn ctx_set_stroke_style(ctx: &CanvasRenderingContext2d, value: &JsValue) {
    let _ = js_sys::Reflect::set(ctx.as_ref(), &JsValue::from_str("strokeStyle"), value);
}
