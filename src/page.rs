//! Whole-page wiring for the admission form.
//!
//! [`AdmissionPage`] is built once at start-up and shared by every
//! handler through `Rc`; handlers never reach for globals.

use std::{collections::BTreeSet, rc::Rc};

use log::{debug, error, info, warn};
use wasm_bindgen::{closure::Closure, prelude::*, JsCast};
use web_sys::{
    Document, Element, Event, EventTarget, FileReader, FormData, HtmlButtonElement,
    HtmlCanvasElement, HtmlElement, HtmlFormElement, HtmlInputElement, ScrollBehavior,
    ScrollToOptions
};

use crate::{
    age::{age_on, parse_birth_date},
    config::FormConfig,
    draft::{
        autosave, restore_action, AutosaveTimer, Draft, DraftStore, FieldKind, LocalStore,
        MemoryStore, RestoreAction
    },
    error::FormError,
    phone::format_phone_number,
    submit::{self, Submission, SubmitGuard},
    ui_common::{DomBindings, SignatureHandle},
    visibility::{rules_for, RuleOutcome}
};

/// Register a listener that lives as long as the document.
fn on<T: AsRef<EventTarget>>(
    target: &T,
    event: &str,
    handler: impl FnMut(Event) + 'static
) -> Result<(), FormError> {
    let cb = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target
        .as_ref()
        .add_event_listener_with_callback(event, cb.as_ref().unchecked_ref())
        .map_err(|_| FormError::OpFailed(format!("addEventListener({event})")))?;
    cb.forget();
    Ok(())
}

fn input_target(e: &Event) -> Option<HtmlInputElement> {
    e.target()?.dyn_into::<HtmlInputElement>().ok()
}

fn today() -> Result<time::Date, FormError> {
    let now = js_sys::Date::new_0();
    let month = time::Month::try_from(now.get_month() as u8 + 1)
        .map_err(|e| FormError::InvalidDate(e.to_string()))?;
    time::Date::from_calendar_date(now.get_full_year() as i32, month, now.get_date() as u8)
        .map_err(|e| FormError::InvalidDate(e.to_string()))
}

pub struct AdmissionPage {
    config:      FormConfig,
    document:    Document,
    form:        HtmlFormElement,
    signature:   SignatureHandle,
    photo_input: Option<HtmlInputElement>,
    store:       Box<dyn DraftStore>,
    autosave:    AutosaveTimer,
    guard:       SubmitGuard
}

impl AdmissionPage {
    pub fn mount(config: FormConfig) -> Result<Rc<Self>, FormError> {
        let document = DomBindings::document()?;
        let form: HtmlFormElement = DomBindings::element(&document, &config.ids.form)?;
        let canvas: HtmlCanvasElement = DomBindings::element(&document, &config.ids.canvas)?;
        let signature = SignatureHandle::new(canvas, config.stroke.clone())?;
        let photo_input = DomBindings::element(&document, &config.ids.photo_input).ok();

        let store: Box<dyn DraftStore> = match LocalStore::open() {
            Ok(s) => Box::new(s),
            Err(e) => {
                warn!("{e}; drafts kept in memory only");
                Box::new(MemoryStore::new())
            }
        };

        let page = Rc::new(Self {
            autosave: AutosaveTimer::new(config.autosave_delay_ms),
            config,
            document,
            form,
            signature,
            photo_input,
            store,
            guard: SubmitGuard::new()
        });

        page.bind_clear()?;
        page.bind_photo_preview()?;
        page.bind_rules()?;
        page.bind_birth_date()?;
        page.bind_phone_inputs()?;
        page.bind_autosave()?;
        page.bind_submit()?;
        page.restore_draft();

        info!("admission form ready");
        Ok(page)
    }

    fn bind_clear(self: &Rc<Self>) -> Result<(), FormError> {
        let button: HtmlElement =
            DomBindings::element(&self.document, &self.config.ids.clear_button)?;
        let page = Rc::clone(self);
        on(&button, "click", move |_e| page.signature.clear())
    }

    fn bind_photo_preview(self: &Rc<Self>) -> Result<(), FormError> {
        let Some(input) = &self.photo_input else {
            debug!("no photo input on page");
            return Ok(());
        };
        let preview_id = self.config.ids.photo_preview.clone();
        let alt = self.config.messages.photo_alt.clone();
        on(input, "change", move |e| {
            let file = input_target(&e)
                .and_then(|i| i.files())
                .and_then(|f| f.get(0));
            let Some(file) = file else {
                return;
            };
            let Ok(reader) = FileReader::new() else {
                return;
            };
            let (preview_id, alt, source) = (preview_id.clone(), alt.clone(), reader.clone());
            let onload = Closure::once_into_js(move |_e: Event| {
                if let Some(url) = source.result().ok().and_then(|r| r.as_string()) {
                    if let Err(err) = DomBindings::show_preview(&preview_id, &url, &alt) {
                        warn!("photo preview: {err}");
                    }
                }
            });
            reader.set_onload(Some(onload.unchecked_ref()));
            if reader.read_as_data_url(&file).is_err() {
                warn!("could not read {}", file.name());
            }
        })
    }

    fn bind_rules(self: &Rc<Self>) -> Result<(), FormError> {
        let groups: BTreeSet<&str> = self.config.rules.iter().map(|r| r.group.as_str()).collect();
        for group in groups {
            let radios = self
                .document
                .query_selector_all(&format!("input[name=\"{group}\"]"))
                .map_err(|_| FormError::OpFailed(format!("querySelectorAll({group})")))?;
            for i in 0..radios.length() {
                let Some(radio) = radios.get(i) else {
                    continue;
                };
                let page = Rc::clone(self);
                let group = group.to_string();
                on(&radio, "change", move |e| {
                    if let Some(input) = input_target(&e) {
                        page.apply_rules(&group, &input.value());
                    }
                })?;
            }
        }
        Ok(())
    }

    fn apply_rules(&self, group: &str, value: &str) {
        for rule in rules_for(&self.config.rules, group) {
            if let Err(e) = self.apply_outcome(&rule.evaluate(value)) {
                warn!("visibility rule for {group}: {e}");
            }
        }
    }

    fn apply_outcome(&self, outcome: &RuleOutcome<'_>) -> Result<(), FormError> {
        let target: HtmlElement = DomBindings::element(&self.document, outcome.target)?;
        DomBindings::set_display(&target, outcome.display())?;
        if let Some((field, required)) = outcome.required {
            let el: Element = DomBindings::element(&self.document, field)?;
            el.toggle_attribute_with_force("required", required)
                .map_err(|_| FormError::OpFailed(format!("required on {field}")))?;
        }
        Ok(())
    }

    fn bind_birth_date(self: &Rc<Self>) -> Result<(), FormError> {
        let input: HtmlInputElement =
            DomBindings::element(&self.document, &self.config.ids.birth_date)?;
        let page = Rc::clone(self);
        on(&input, "change", move |e| {
            let Some(input) = input_target(&e) else {
                return;
            };
            let value = input.value();
            if value.is_empty() {
                return;
            }
            if let Err(err) = page.fill_age(&value) {
                warn!("age: {err}");
            }
        })
    }

    fn fill_age(&self, birth_value: &str) -> Result<(), FormError> {
        let birth = parse_birth_date(birth_value)?;
        let age = age_on(birth, today()?);
        let ids = &self.config.ids;
        let years: HtmlInputElement = DomBindings::element(&self.document, &ids.age_years)?;
        let months: HtmlInputElement = DomBindings::element(&self.document, &ids.age_months)?;
        years.set_value(&age.years.to_string());
        months.set_value(&age.months.to_string());
        Ok(())
    }

    fn bind_phone_inputs(&self) -> Result<(), FormError> {
        let inputs = self
            .document
            .query_selector_all("input[type=\"tel\"]")
            .map_err(|_| FormError::OpFailed("querySelectorAll(tel)".into()))?;
        for i in 0..inputs.length() {
            if let Some(node) = inputs.get(i) {
                on(&node, "input", |e| {
                    if let Some(input) = input_target(&e) {
                        input.set_value(&format_phone_number(&input.value()));
                    }
                })?;
            }
        }
        Ok(())
    }

    /// Text entries of the form, in document order. Files are skipped.
    fn text_entries(&self) -> Result<Vec<(String, String)>, FormError> {
        let data = FormData::new_with_form(&self.form)
            .map_err(|_| FormError::OpFailed("new FormData(form)".into()))?;
        let iter = js_sys::try_iter(&data)
            .map_err(|_| FormError::OpFailed("FormData iterator".into()))?
            .ok_or_else(|| FormError::OpFailed("FormData is not iterable".into()))?;
        let mut out = Vec::new();
        for item in iter {
            let item = item.map_err(|_| FormError::OpFailed("FormData entry".into()))?;
            let pair: js_sys::Array = item.unchecked_into();
            if let (Some(k), Some(v)) = (pair.get(0).as_string(), pair.get(1).as_string()) {
                out.push((k, v));
            }
        }
        Ok(out)
    }

    fn bind_autosave(self: &Rc<Self>) -> Result<(), FormError> {
        let page = Rc::downgrade(self);
        on(&self.form, "input", move |_e| {
            let Some(p) = page.upgrade() else {
                return;
            };
            let weak = Rc::downgrade(&p);
            p.autosave.arm(move || {
                if let Some(p) = weak.upgrade() {
                    p.save_draft();
                }
            });
        })
    }

    fn save_draft(&self) {
        let result = self.text_entries().and_then(|entries| {
            let draft = Draft::from_entries(entries);
            autosave(self.store.as_ref(), &self.config.draft_key, &draft)
        });
        if let Err(e) = result {
            warn!("autosave failed: {e}");
        }
    }

    fn restore_draft(&self) {
        let draft = match self.store.load(&self.config.draft_key) {
            Ok(Some(d)) if !d.is_empty() => d,
            Ok(_) => return,
            Err(e) => {
                warn!("discarding unreadable draft: {e}");
                if let Err(e) = self.store.remove(&self.config.draft_key) {
                    warn!("draft not removed: {e}");
                }
                return;
            }
        };
        let confirmed = DomBindings::window()
            .and_then(|w| {
                w.confirm_with_message(&self.config.messages.restore_prompt)
                    .map_err(|_| FormError::OpFailed("confirm".into()))
            })
            .unwrap_or(false);
        if !confirmed {
            return;
        }
        for (name, value) in draft.iter() {
            if let Err(e) = self.restore_field(name, value) {
                debug!("draft field {name} not restored: {e}");
            }
        }
        info!("draft restored ({} fields)", draft.len());
    }

    fn restore_field(&self, name: &str, value: &str) -> Result<(), FormError> {
        let selector = format!("[name=\"{name}\"]");
        let el = self
            .form
            .query_selector(&selector)
            .ok()
            .flatten()
            .ok_or_else(|| FormError::ElementNotFound(name.to_string()))?;
        let kind = FieldKind::from_input_type(&el.get_attribute("type").unwrap_or_default());
        match restore_action(kind, value) {
            RestoreAction::CheckRadio(v) => {
                let radio: HtmlInputElement = self
                    .form
                    .query_selector(&format!("input[name=\"{name}\"][value=\"{v}\"]"))
                    .ok()
                    .flatten()
                    .and_then(|r| r.dyn_into().ok())
                    .ok_or_else(|| FormError::ElementNotFound(format!("{name}={v}")))?;
                radio.set_checked(true);
                self.apply_rules(name, v);
            }
            RestoreAction::SetChecked(checked) => {
                let input: HtmlInputElement = el
                    .dyn_into()
                    .map_err(|_| FormError::ElementNotFound(name.to_string()))?;
                input.set_checked(checked);
            }
            RestoreAction::SetValue(v) => {
                js_sys::Reflect::set(&el, &JsValue::from_str("value"), &JsValue::from_str(v))
                    .map_err(|_| FormError::OpFailed(format!("value of {name}")))?;
            }
        }
        Ok(())
    }

    fn bind_submit(self: &Rc<Self>) -> Result<(), FormError> {
        let page = Rc::clone(self);
        on(&self.form, "submit", move |e| {
            e.prevent_default();
            wasm_bindgen_futures::spawn_local(Rc::clone(&page).submit());
        })
    }

    fn alert(&self, message: &str) {
        if let Ok(w) = DomBindings::window() {
            let _ = w.alert_with_message(message);
        }
    }

    fn submit_button(&self) -> Option<HtmlButtonElement> {
        self.form
            .query_selector("button[type=\"submit\"]")
            .ok()
            .flatten()
            .and_then(|b| b.dyn_into().ok())
    }

    fn set_loading(&self, button: Option<&HtmlButtonElement>, label: &str, loading: bool) {
        if let Some(b) = button {
            b.set_text_content(Some(label));
            b.set_disabled(loading);
        }
        let classes = self.form.class_list();
        let _ = if loading {
            classes.add_1("loading")
        } else {
            classes.remove_1("loading")
        };
    }

    async fn submit(self: Rc<Self>) {
        if !self.guard.try_begin() {
            debug!("submission already in flight");
            return;
        }
        let prepared = self.text_entries().and_then(|entries| {
            self.signature
                .with_pad(|pad| Submission::prepare(pad, entries, &self.config.access_key))
        });
        let submission = match prepared {
            Ok(s) => s,
            Err(FormError::MissingSignature) => {
                self.alert(&self.config.messages.missing_signature);
                self.guard.finish();
                return;
            }
            Err(e) => {
                error!("could not prepare submission: {e}");
                self.alert(&self.config.messages.submit_failed);
                self.guard.finish();
                return;
            }
        };

        let button = self.submit_button();
        let original = button
            .as_ref()
            .and_then(|b| b.text_content())
            .unwrap_or_default();
        self.set_loading(button.as_ref(), &self.config.messages.sending, true);

        let photo = self
            .photo_input
            .as_ref()
            .and_then(|i| i.files())
            .and_then(|f| f.get(0));

        match submit::send(&self.config.endpoint, &submission, photo.as_ref()).await {
            Ok(()) => self.on_submitted(),
            Err(e) => {
                error!("submission failed: {e}");
                self.alert(&self.config.messages.submit_failed);
                self.set_loading(button.as_ref(), &original, false);
                self.guard.finish();
            }
        }
    }

    fn on_submitted(&self) {
        self.autosave.cancel();
        if let Err(e) = self.store.remove(&self.config.draft_key) {
            warn!("draft not removed: {e}");
        }
        let _ = DomBindings::set_display(&self.form, "none");
        let ids = &self.config.ids;
        match DomBindings::element::<HtmlElement>(&self.document, &ids.success_message) {
            Ok(msg) => {
                let _ = DomBindings::set_display(&msg, "block");
            }
            Err(e) => warn!("{e}")
        }
        if let Ok(w) = DomBindings::window() {
            let opts = ScrollToOptions::new();
            opts.set_top(0.0);
            opts.set_behavior(ScrollBehavior::Smooth);
            w.scroll_to_with_scroll_to_options(&opts);
        }
    }
}

/// Browser entry point. `config_json` overrides [`FormConfig`] defaults.
#[wasm_bindgen]
pub fn start_admission_form(config_json: Option<String>) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let config = match config_json {
        Some(json) => FormConfig::from_json(&json),
        None => Ok(FormConfig::default())
    }
    .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let page = AdmissionPage::mount(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
    // handlers hold their own references; the page stays up with the document
    std::mem::forget(page);
    Ok(())
}
