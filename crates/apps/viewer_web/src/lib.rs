//! Browser host for the flight map.
//!
//! The page creates the map, hands a [`MapHandle`] to [`mount`] and forwards
//! the map's `load` and `error` events to [`on_map_load`] and
//! [`on_map_error`]. Everything else (route loading, the frame loop, camera
//! and model updates) is driven from here.

use console_error_panic_hook::set_once;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tracing::{error, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use flight::{AnimationConfig, AnimationDirector, AssetUrls, load_route, resolve_access_token};

mod bridge;
mod source;

pub use bridge::{JsScene, MapHandle};
pub use source::HttpRouteSource;

/// Delay between the map's load event and the first animation frame.
pub const START_DELAY_MS: i32 = 1000;

struct MapWidget {
    director: AnimationDirector,
    scene: JsScene,
    assets: AssetUrls,
    started: bool,
    frame_handle: Option<i32>,
    frame_callback: Option<Closure<dyn FnMut(f64)>>,
}

thread_local! {
    static WIDGET: RefCell<Option<Rc<RefCell<MapWidget>>>> = const { RefCell::new(None) };
    // Kept outside the widget so map events never contend with a frame borrow.
    pub(crate) static READY: Cell<bool> = const { Cell::new(false) };
}

pub(crate) fn mark_not_ready() {
    READY.with(|r| r.set(false));
}

fn current_widget() -> Option<Rc<RefCell<MapWidget>>> {
    WIDGET.with(|w| w.borrow().clone())
}

/// Runs `f` against the target if it is still alive. Work that outlives an
/// unmount lands here and is dropped.
fn with_live<T, R>(target: &Weak<RefCell<T>>, f: impl FnOnce(&mut T) -> R) -> Option<R> {
    let target = target.upgrade()?;
    let mut guard = target.borrow_mut();
    Some(f(&mut guard))
}

/// Logs a failed frame cancellation. The dropped callback makes a stray
/// frame a no-op either way.
fn report_cancel<E: std::fmt::Debug>(handle: i32, result: Result<(), E>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            warn!("could not cancel animation frame {handle}: {err:?}");
            false
        }
    }
}

fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))
}

fn request_frame(callback: &Closure<dyn FnMut(f64)>) -> Result<i32, JsValue> {
    window()?.request_animation_frame(callback.as_ref().unchecked_ref())
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    tracing_wasm::set_as_global_default();
    Ok(())
}

/// Token the page should give the map; baked in at build time when
/// `MAPBOX_TOKEN` is set.
#[wasm_bindgen]
pub fn access_token() -> String {
    resolve_access_token(option_env!("MAPBOX_TOKEN"))
}

#[wasm_bindgen]
pub fn is_ready() -> bool {
    READY.with(Cell::get)
}

/// Attaches the animation to a map. Replaces any previous mount.
///
/// `config_json` is an optional partial [`AnimationConfig`]; missing fields
/// take their defaults.
#[wasm_bindgen]
pub fn mount(
    map: MapHandle,
    asset_base: Option<String>,
    config_json: Option<String>,
) -> Result<(), JsValue> {
    unmount();

    let config = match config_json.as_deref() {
        Some(json) => serde_json::from_str::<AnimationConfig>(json)
            .map_err(|e| JsValue::from_str(&format!("bad animation config: {e}")))?,
        None => AnimationConfig::default(),
    };
    let assets = asset_base.map(AssetUrls::new).unwrap_or_default();
    let director = AnimationDirector::new(config, assets.model_uri());

    let widget = MapWidget {
        director,
        scene: JsScene::new(map),
        assets,
        started: false,
        frame_handle: None,
        frame_callback: None,
    };
    WIDGET.with(|w| *w.borrow_mut() = Some(Rc::new(RefCell::new(widget))));
    info!("flight map mounted");
    Ok(())
}

/// Stops the frame loop and drops the widget. A route load still in flight
/// finds nothing to deliver to and is discarded.
#[wasm_bindgen]
pub fn unmount() {
    let Some(widget) = WIDGET.with(|w| w.borrow_mut().take()) else {
        return;
    };
    mark_not_ready();

    let mut w = widget.borrow_mut();
    if let Some(handle) = w.frame_handle.take() {
        let result = window().and_then(|window| window.cancel_animation_frame(handle));
        report_cancel(handle, result);
    }
    w.frame_callback = None;
    info!("flight map unmounted");
}

/// Map `load` event: starts the route fetch and, after a short delay, the
/// frame loop.
#[wasm_bindgen]
pub fn on_map_load() -> Result<(), JsValue> {
    READY.with(|r| r.set(true));
    let Some(widget) = current_widget() else {
        warn!("map loaded with nothing mounted");
        return Ok(());
    };

    let route_url = {
        let mut w = widget.borrow_mut();
        if w.started {
            return Ok(());
        }
        w.started = true;
        w.assets.route_url()
    };

    spawn_route_load(Rc::downgrade(&widget), HttpRouteSource::new(route_url));

    let weak = Rc::downgrade(&widget);
    let start = Closure::once_into_js(move || {
        let Some(widget) = weak.upgrade() else {
            return;
        };
        if let Err(err) = start_frame_loop(&widget) {
            error!("frame loop failed to start: {err:?}");
        }
    });
    window()?.set_timeout_with_callback_and_timeout_and_arguments_0(
        start.unchecked_ref(),
        START_DELAY_MS,
    )?;
    Ok(())
}

/// Map `error` event. The page keeps running; readiness drops.
#[wasm_bindgen]
pub fn on_map_error(message: String) {
    error!("map error: {message}");
    mark_not_ready();
}

fn spawn_route_load(widget: Weak<RefCell<MapWidget>>, source: HttpRouteSource) {
    spawn_local(async move {
        let route = load_route(&source).await;
        if with_live(&widget, |w| w.director.install_route(route)).is_none() {
            info!("route arrived after unmount; dropped");
        }
    });
}

fn start_frame_loop(widget: &Rc<RefCell<MapWidget>>) -> Result<(), JsValue> {
    let weak = Rc::downgrade(widget);
    let callback = Closure::<dyn FnMut(f64)>::new(move |time_ms: f64| {
        let Some(widget) = weak.upgrade() else {
            return;
        };
        if let Err(err) = on_frame(&widget, time_ms) {
            error!("frame failed: {err:?}");
        }
    });
    let handle = request_frame(&callback)?;

    let mut w = widget.borrow_mut();
    w.frame_callback = Some(callback);
    w.frame_handle = Some(handle);
    Ok(())
}

fn on_frame(widget: &Rc<RefCell<MapWidget>>, time_ms: f64) -> Result<(), JsValue> {
    let mut guard = widget.borrow_mut();
    let w = &mut *guard;
    w.director.tick(time_ms, &mut w.scene);

    let Some(callback) = &w.frame_callback else {
        return Ok(());
    };
    w.frame_handle = Some(request_frame(callback)?);
    Ok(())
}
