// src/ui_common.rs

use std::{cell::RefCell, rc::Rc};

use log::debug;
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{
    AddEventListenerOptions, Document, Element, Event, HtmlCanvasElement, HtmlElement,
    HtmlImageElement, MouseEvent, TouchEvent, TouchList, Window
};

use crate::{
    canvas::CanvasSurface,
    error::FormError,
    input::{InputRouter, PointerInput, SurfaceOrigin, TouchContact, TouchInput},
    signature_core::{PressEvent, SignaturePad},
    style::StrokeStyle,
    surface::Point
};

/// Called with the exported image after each finished stroke, `None` after clear.
pub type StrokeObserver = Rc<dyn Fn(Option<String>)>;

type Pad = Rc<RefCell<SignaturePad<CanvasSurface>>>;
type Listener = Closure<dyn FnMut(Event)>;

fn origin_of(canvas: &HtmlCanvasElement) -> SurfaceOrigin {
    let rect = canvas.get_bounding_client_rect();
    SurfaceOrigin::new(rect.left(), rect.top())
}

fn contacts(list: &TouchList) -> Vec<TouchContact> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .map(|t| {
            TouchContact::new(
                t.identifier(),
                f64::from(t.client_x()),
                f64::from(t.client_y())
            )
        })
        .collect()
}

/// Feed one normalized event to the pad; report a finished stroke.
fn dispatch(pad: &Pad, observer: &RefCell<Option<StrokeObserver>>, event: Option<PressEvent>) {
    let Some(event) = event else {
        return;
    };
    let finished = {
        let mut pad = pad.borrow_mut();
        let was_drawing = pad.is_drawing();
        pad.handle(event);
        was_drawing && !pad.is_drawing()
    };
    if finished {
        debug!("stroke finished");
        notify(pad, observer, false);
    }
}

fn notify(pad: &Pad, observer: &RefCell<Option<StrokeObserver>>, cleared: bool) {
    let Some(cb) = observer.borrow().clone() else {
        return;
    };
    let image = if cleared {
        None
    } else {
        pad.borrow().export_image().ok()
    };
    cb(image);
}

/// RAII handle that owns the SignaturePad and its JS listeners.
/// On drop, listeners are removed.
pub struct SignatureHandle {
    canvas:    HtmlCanvasElement,
    pad:       Pad,
    router:    Rc<RefCell<InputRouter>>,
    observer:  Rc<RefCell<Option<StrokeObserver>>>,
    listeners: Vec<(&'static str, Listener)>
}

impl SignatureHandle {
    /// Initialize on a given canvas element.
    pub fn new(canvas: HtmlCanvasElement, style: StrokeStyle) -> Result<Self, FormError> {
        let surface = CanvasSurface::new(canvas.clone())?;
        let mut handle = Self {
            canvas,
            pad: Rc::new(RefCell::new(SignaturePad::new(surface, style))),
            router: Rc::new(RefCell::new(InputRouter::new())),
            observer: Rc::new(RefCell::new(None)),
            listeners: Vec::new()
        };
        handle.bind_mouse()?;
        handle.bind_touch()?;
        Ok(handle)
    }

    fn listen(
        &mut self,
        event: &'static str,
        passive: bool,
        handler: impl FnMut(Event) + 'static
    ) -> Result<(), FormError> {
        let cb: Listener = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        let opts = AddEventListenerOptions::new();
        opts.set_passive(passive);
        self.canvas
            .add_event_listener_with_callback_and_add_event_listener_options(
                event,
                cb.as_ref().unchecked_ref(),
                &opts
            )
            .map_err(|_| FormError::OpFailed(format!("addEventListener({event})")))?;
        self.listeners.push((event, cb));
        Ok(())
    }

    fn bind_mouse(&mut self) -> Result<(), FormError> {
        let kinds: [(&'static str, fn(Point) -> PointerInput); 2] =
            [("mousedown", PointerInput::Down), ("mousemove", PointerInput::Move)];
        for (name, make) in kinds {
            let (canvas, pad, router, observer) = self.parts();
            self.listen(name, true, move |e: Event| {
                let Some(m) = e.dyn_ref::<MouseEvent>() else {
                    return;
                };
                let client = Point::new(f64::from(m.client_x()), f64::from(m.client_y()));
                let ev = router.borrow().pointer(make(client), origin_of(&canvas));
                dispatch(&pad, &observer, ev);
            })?;
        }
        for (name, input) in [("mouseup", PointerInput::Up), ("mouseout", PointerInput::Leave)] {
            let (canvas, pad, router, observer) = self.parts();
            self.listen(name, true, move |_e: Event| {
                let ev = router.borrow().pointer(input, origin_of(&canvas));
                dispatch(&pad, &observer, ev);
            })?;
        }
        Ok(())
    }

    fn bind_touch(&mut self) -> Result<(), FormError> {
        for name in ["touchstart", "touchmove", "touchend", "touchcancel"] {
            let (canvas, pad, router, observer) = self.parts();
            // non-passive so preventDefault can stop scrolling and zooming
            self.listen(name, false, move |e: Event| {
                let Some(t) = e.dyn_ref::<TouchEvent>() else {
                    return;
                };
                let mut router = router.borrow_mut();
                if router.consumes_touch() {
                    e.prevent_default();
                }
                let origin = origin_of(&canvas);
                let ev = match name {
                    "touchstart" => {
                        router.touch(TouchInput::Start(&contacts(&t.touches())), origin)
                    }
                    "touchmove" => router.touch(TouchInput::Move(&contacts(&t.touches())), origin),
                    "touchend" => {
                        router.touch(TouchInput::End(&contacts(&t.changed_touches())), origin)
                    }
                    _ => router.touch(TouchInput::Cancel, origin)
                };
                drop(router);
                dispatch(&pad, &observer, ev);
            })?;
        }
        Ok(())
    }

    #[allow(clippy::type_complexity)]
    fn parts(
        &self
    ) -> (HtmlCanvasElement, Pad, Rc<RefCell<InputRouter>>, Rc<RefCell<Option<StrokeObserver>>>)
    {
        (
            self.canvas.clone(),
            Rc::clone(&self.pad),
            Rc::clone(&self.router),
            Rc::clone(&self.observer)
        )
    }

    /// Register the callback fired after each stroke and on clear.
    pub fn set_observer(&self, observer: impl Fn(Option<String>) + 'static) {
        let observer: StrokeObserver = Rc::new(observer);
        *self.observer.borrow_mut() = Some(observer);
    }

    pub fn is_empty(&self) -> bool {
        self.pad.borrow().is_empty()
    }

    pub fn export_image(&self) -> Result<String, FormError> {
        self.pad.borrow().export_image()
    }

    pub fn with_pad<R>(&self, f: impl FnOnce(&SignaturePad<CanvasSurface>) -> R) -> R {
        f(&*self.pad.borrow())
    }

    pub fn clear(&self) {
        self.pad.borrow_mut().clear();
        notify(&self.pad, &self.observer, true);
    }
}

impl Drop for SignatureHandle {
    fn drop(&mut self) {
        for (event, cb) in self.listeners.drain(..) {
            let _ = self
                .canvas
                .remove_event_listener_with_callback(event, cb.as_ref().unchecked_ref());
        }
    }
}

/// DOM helpers. Stateless. All state lives in `SignatureHandle`.
pub struct DomBindings;

impl DomBindings {
    pub fn window() -> Result<Window, FormError> {
        web_sys::window().ok_or(FormError::DomUnavailable)
    }

    pub fn document() -> Result<Document, FormError> {
        Self::window()?.document().ok_or(FormError::DomUnavailable)
    }

    /// Look up `id` and cast it to the expected element type.
    pub fn element<T: JsCast>(document: &Document, id: &str) -> Result<T, FormError> {
        document
            .get_element_by_id(id)
            .ok_or_else(|| FormError::ElementNotFound(id.to_string()))?
            .dyn_into::<T>()
            .map_err(|_| FormError::ElementNotFound(id.to_string()))
    }

    /// Initialize by canvas id and return a RAII handle.
    pub fn init_by_canvas_id(
        canvas_id: &str,
        style: StrokeStyle
    ) -> Result<SignatureHandle, FormError> {
        let canvas: HtmlCanvasElement = Self::element(&Self::document()?, canvas_id)?;
        SignatureHandle::new(canvas, style)
    }

    pub fn set_display(el: &HtmlElement, display: &str) -> Result<(), FormError> {
        el.style()
            .set_property("display", display)
            .map_err(|_| FormError::OpFailed("style.display".into()))
    }

    /// Show `data_url` as the only `<img>` inside `container_id`.
    pub fn show_preview(container_id: &str, data_url: &str, alt: &str) -> Result<(), FormError> {
        let document = Self::document()?;
        let container: Element = document
            .get_element_by_id(container_id)
            .ok_or_else(|| FormError::ElementNotFound(container_id.to_string()))?;

        let img: HtmlImageElement = document
            .create_element("img")
            .map_err(|_| FormError::OpFailed("createElement(img)".into()))?
            .dyn_into::<HtmlImageElement>()
            .map_err(|_| FormError::OpFailed("created element is not <img>".into()))?;
        img.set_src(data_url);
        img.set_alt(alt);

        container.set_inner_html("");
        container
            .append_child(&img)
            .map_err(|_| FormError::OpFailed("appendChild(img)".into()))?;
        Ok(())
    }
}
