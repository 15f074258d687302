//! Admission form with an embedded freehand signature pad.
//!
//! The core (signature pad, input normalization, form rules, drafts and
//! submission payloads) is plain Rust and draws on an in-memory
//! [`RasterSurface`]. The `web` feature binds it to a real `<canvas>` and
//! the admission page; `yew` and `leptos` add framework components.

mod age;
mod config;
mod draft;
mod error;
mod input;
mod phone;
mod raster;
mod signature_core;
mod style;
mod submit;
mod surface;
mod visibility;

#[cfg(feature = "web")]
mod canvas;
#[cfg(feature = "web")]
mod page;
#[cfg(feature = "web")]
mod ui_common;

#[cfg(feature = "yew")]
mod yew;

#[cfg(feature = "leptos")]
mod leptos;

pub use age::{age_on, parse_birth_date, Age};
pub use config::{ElementIds, FormConfig, Messages};
pub use draft::{
    autosave, restore_action, Draft, DraftStore, FieldKind, MemoryStore, RestoreAction
};
pub use error::FormError;
pub use input::{InputRouter, PointerInput, SurfaceOrigin, TouchContact, TouchInput};
pub use phone::format_phone_number;
pub use raster::RasterSurface;
pub use signature_core::{PressEvent, SignaturePad, StrokeState};
pub use style::{Color, LineCap, LineJoin, StrokeStyle};
pub use submit::{
    Submission, SubmitGuard, SubmitResponse, ACCESS_KEY_FIELD, PHOTO_FIELD, SIGNATURE_FIELD
};
pub use surface::{Point, Surface, SurfaceSize, PNG_DATA_URL_PREFIX};
pub use visibility::{default_rules, rules_for, RuleOutcome, VisibilityRule};

#[cfg(feature = "web")]
pub use crate::{
    canvas::CanvasSurface,
    draft::{AutosaveTimer, LocalStore},
    page::{start_admission_form, AdmissionPage},
    submit::send,
    ui_common::{DomBindings, SignatureHandle, StrokeObserver}
};

#[cfg(feature = "leptos")]
pub use crate::leptos::SignaturePadLeptos;
#[cfg(feature = "yew")]
pub use crate::yew::{SignaturePadYew, SignatureProps, SignatureStyle};
