// src/yew.rs
// feature = "yew"

use log::warn;
use web_sys::HtmlCanvasElement;
use yew::{
    function_component, html, use_effect_with, use_mut_ref, use_node_ref, AttrValue, Callback,
    Html, Properties
};

use crate::{style::StrokeStyle, ui_common::SignatureHandle};

/// Visual customization for the signature canvas area.
#[derive(Clone, PartialEq)]
pub struct SignatureStyle {
    /// Canvas border CSS, e.g. "2px dashed #2b8a3e"
    pub border:     String,
    /// Canvas background CSS color, e.g. "#fff"
    pub background: String,
    /// Canvas width/height in CSS pixels
    pub width:      u32,
    pub height:     u32,
    pub stroke:     StrokeStyle
}

impl Default for SignatureStyle {
    fn default() -> Self {
        Self {
            border:     "1px solid #cbd5e1".into(),
            background: "#fff".into(),
            width:      500,
            height:     200,
            stroke:     StrokeStyle::default()
        }
    }
}

#[derive(Properties, PartialEq, Clone)]
pub struct SignatureProps {
    /// Visual style of the signature canvas.
    #[prop_or_default]
    pub style: Option<SignatureStyle>,

    #[prop_or(AttrValue::Static("Limpiar firma"))]
    pub clear_label: AttrValue,

    /// Receives the PNG data URL after each stroke, `None` after clear.
    #[prop_or_default]
    pub on_change: Option<Callback<Option<String>>>
}

#[function_component(SignaturePadYew)]
pub fn signature_pad_yew(props: &SignatureProps) -> Html {
    let canvas_ref = use_node_ref();
    let handle = use_mut_ref(|| None::<SignatureHandle>);
    let style = props.style.clone().unwrap_or_default();
    let on_change = use_mut_ref(|| None::<Callback<Option<String>>>);
    *on_change.borrow_mut() = props.on_change.clone();

    // Attach listeners once the canvas is in the DOM; detach on unmount.
    // The observer reads the latest `on_change` on every stroke.
    {
        let canvas_ref = canvas_ref.clone();
        let handle = handle.clone();
        let on_change = on_change.clone();
        let stroke = style.stroke.clone();

        use_effect_with((), move |_| {
            if let Some(canvas_el) = canvas_ref.cast::<HtmlCanvasElement>() {
                match SignatureHandle::new(canvas_el, stroke) {
                    Ok(h) => {
                        h.set_observer(move |image| {
                            let cb = on_change.borrow().clone();
                            if let Some(cb) = cb {
                                cb.emit(image);
                            }
                        });
                        *handle.borrow_mut() = Some(h);
                    }
                    Err(e) => warn!("signature pad unavailable: {e}")
                }
            }
            move || {
                handle.borrow_mut().take();
            }
        });
    }

    let on_clear = {
        let handle = handle.clone();
        Callback::from(move |_e: web_sys::MouseEvent| {
            if let Some(h) = handle.borrow().as_ref() {
                h.clear();
            }
        })
    };

    html! {
        <div class="signature-pad">
          <canvas ref={canvas_ref}
                  style={format!(
                    "width:{}px;height:{}px;background:{};border:{};touch-action:none;",
                    style.width, style.height, style.background, style.border
                  )}
          />
          <div class="controls">
            <button type="button" onclick={on_clear}>{ props.clear_label.clone() }</button>
          </div>
        </div>
    }
}
