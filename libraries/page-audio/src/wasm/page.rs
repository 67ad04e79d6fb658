//! Page bootstrap: binds both units to the live document

use super::dom::{DomButton, DomSidebar, FireFn, LocalStorageStore, SettleFn, TimeoutScheduler, WebMedia};
use crate::{
    controller::{AudioController, ControllerParts},
    error::AutoplayError,
    media::MediaElement,
    sidebar::SidebarToggle,
    store::{MemoryStore, PreferenceStore},
    types::{AutoplayConfig, KeyPress, PageConfig, SidebarConfig},
    ui::{PlayButton, SidebarPanel},
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, KeyboardEvent, Window};

/// Controller shared between listeners and async continuations
type Slot = Rc<RefCell<Option<AudioController>>>;

thread_local! {
    static MOUNTED: Cell<bool> = const { Cell::new(false) };
}

/// Mount page audio and the sidebar toggle
///
/// `config` is an optional object matching [`PageConfig`] (camelCase keys,
/// missing fields use defaults). Mounting waits for `DOMContentLoaded` when
/// the document is still loading. Subsequent calls are ignored.
#[wasm_bindgen(js_name = mountPage)]
pub fn mount_page(config: JsValue) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let config: PageConfig = if config.is_undefined() || config.is_null() {
        PageConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config)
            .map_err(|e| AutoplayError::InvalidConfig(e.to_string()))?
    };

    let window = web_sys::window().ok_or_else(|| AutoplayError::Dom("No window".to_string()))?;
    let document = window
        .document()
        .ok_or_else(|| AutoplayError::Dom("No document".to_string()))?;

    if MOUNTED.with(|mounted| mounted.replace(true)) {
        warn!("Page already mounted, ignoring");
        return Ok(());
    }

    if document.ready_state() == "loading" {
        let ready_window = window.clone();
        let ready_document = document.clone();
        let on_ready = Closure::once_into_js(move || {
            if let Err(e) = mount_all(&ready_window, &ready_document, &config) {
                web_sys::console::error_1(&e);
            }
        });
        document.add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())?;
        return Ok(());
    }

    mount_all(&window, &document, &config)
}

fn mount_all(window: &Window, document: &Document, config: &PageConfig) -> Result<(), JsValue> {
    // The units are independent: a failing one must not keep the other unbound
    let audio = mount_audio(window, document, &config.audio);
    let sidebar = mount_sidebar(document, &config.sidebar);
    audio.and(sidebar)
}

fn mount_audio(window: &Window, document: &Document, config: &AutoplayConfig) -> Result<(), JsValue> {
    let source = document
        .body()
        .and_then(|body| body.get_attribute(&config.source_attribute));
    let Some(source) = source else {
        debug!("Page has no {} attribute", config.source_attribute);
        return Ok(());
    };

    let slot: Slot = Rc::new(RefCell::new(None));

    let settle_slot = Rc::clone(&slot);
    let on_settled: SettleFn = Rc::new(move |attempt, result| {
        with_controller(&settle_slot, |controller| controller.play_settled(attempt, result));
    });

    let fire_slot = Rc::clone(&slot);
    let on_fired: FireFn = Rc::new(move |id| {
        with_controller(&fire_slot, |controller| controller.timer_fired(id));
    });

    let store: Box<dyn PreferenceStore> = match LocalStorageStore::open(window) {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!("{}, autoplay consent will not persist", e);
            Box::new(MemoryStore::new())
        }
    };

    let button_element = document.query_selector(&config.play_button_selector)?;
    let parts = ControllerParts {
        store,
        scheduler: Box::new(TimeoutScheduler::new(window.clone(), on_fired)),
        button: button_element
            .clone()
            .map(|element| Box::new(DomButton::new(element)) as Box<dyn PlayButton>),
    };

    let controller = AudioController::mount(Some(source.as_str()), config.clone(), parts, |src| {
        WebMedia::open(src, on_settled).map(|media| Box::new(media) as Box<dyn MediaElement>)
    })?;
    let Some(controller) = controller else {
        return Ok(());
    };
    *slot.borrow_mut() = Some(controller);

    if let Some(button) = button_element {
        let click_slot = Rc::clone(&slot);
        listen(&button, "click", move |_event| {
            with_controller(&click_slot, AudioController::toggle_from_user);
        })?;
    }

    let hide_slot = Rc::clone(&slot);
    listen(window, "pagehide", move |_event| {
        with_controller(&hide_slot, AudioController::page_hidden);
    })?;

    let visibility_slot = Rc::clone(&slot);
    let visibility_document = document.clone();
    listen(document, "visibilitychange", move |_event| {
        let hidden = visibility_document.hidden();
        with_controller(&visibility_slot, |controller| controller.visibility_changed(hidden));
    })?;

    let key_slot = Rc::clone(&slot);
    listen(document, "keydown", move |event| {
        let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        let press = key_press(key);
        let mut prevent = false;
        with_controller(&key_slot, |controller| prevent = controller.key_down(&press));
        if prevent {
            event.prevent_default();
        }
    })?;

    let links = document.query_selector_all(&config.autoplay_link_selector)?;
    for index in 0..links.length() {
        let Some(link) = links.get(index) else {
            continue;
        };
        let link_slot = Rc::clone(&slot);
        listen(&link, "click", move |_event| {
            with_controller(&link_slot, AudioController::autoplay_link_clicked);
        })?;
    }

    Ok(())
}

fn mount_sidebar(document: &Document, config: &SidebarConfig) -> Result<(), JsValue> {
    let toggle = document.get_element_by_id(&config.toggle_id);
    let panel = document
        .query_selector(&config.sidebar_selector)?
        .map(|element| Box::new(DomSidebar::new(element)) as Box<dyn SidebarPanel>);

    let sidebar = SidebarToggle::bind(toggle.is_some(), panel, config);
    if let (Some(toggle), Some(mut sidebar)) = (toggle, sidebar) {
        listen(&toggle, "click", move |_event| {
            sidebar.on_toggle_click();
        })?;
    }
    Ok(())
}

fn key_press(event: &KeyboardEvent) -> KeyPress {
    let target = event.target().and_then(|t| t.dyn_into::<Element>().ok());
    KeyPress {
        code: event.code(),
        target_tag: target.as_ref().map(Element::tag_name),
        editable: target
            .as_ref()
            .and_then(|t| t.dyn_ref::<HtmlElement>())
            .is_some_and(HtmlElement::is_content_editable),
    }
}

/// Run `f` against the mounted controller
///
/// Events arriving while the controller is borrowed are dropped rather than
/// panicking.
fn with_controller(slot: &Slot, f: impl FnOnce(&mut AudioController)) {
    match slot.try_borrow_mut() {
        Ok(mut guard) => {
            if let Some(controller) = guard.as_mut() {
                f(controller);
            }
        }
        Err(_) => warn!("Audio controller busy, dropping event"),
    }
}

/// Attach a listener for the lifetime of the page
fn listen(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}
