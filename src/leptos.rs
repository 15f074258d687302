use leptos::{html::Canvas, prelude::*};
use log::warn;

use crate::{style::StrokeStyle, ui_common::SignatureHandle};

/// Signature canvas with a clear button.
///
/// `on_change` receives the PNG data URL after each stroke and `None`
/// after clear.
#[component]
pub fn SignaturePadLeptos(
    #[prop(optional)] stroke: Option<StrokeStyle>,
    #[prop(optional)] on_change: Option<Callback<Option<String>>>,
    #[prop(default = 500)] width: u32,
    #[prop(default = 200)] height: u32
) -> impl IntoView {
    let canvas_ref: NodeRef<Canvas> = NodeRef::new();
    let handle = StoredValue::new_local(None::<SignatureHandle>);
    let stroke = stroke.unwrap_or_default();

    Effect::new(move |_| {
        let Some(canvas) = canvas_ref.get() else {
            return;
        };
        if handle.with_value(Option::is_some) {
            return;
        }
        match SignatureHandle::new(canvas, stroke.clone()) {
            Ok(h) => {
                if let Some(cb) = on_change {
                    h.set_observer(move |image| cb.run(image));
                }
                handle.set_value(Some(h));
            }
            Err(e) => warn!("signature pad unavailable: {e}")
        }
    });

    on_cleanup(move || handle.set_value(None));

    let do_clear = move |_ev: web_sys::MouseEvent| {
        handle.with_value(|h| {
            if let Some(h) = h {
                h.clear();
            }
        });
    };

    view! {
        <div class="signature-pad">
            <canvas
                node_ref=canvas_ref
                style=format!("width:{width}px;height:{height}px;touch-action:none;")
            />
            <div class="controls">
                <button type="button" on:click=do_clear>"Limpiar firma"</button>
            </div>
        </div>
    }
}
