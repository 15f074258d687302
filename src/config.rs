use serde::{Deserialize, Serialize};

use crate::{
    error::FormError,
    style::StrokeStyle,
    visibility::{default_rules, VisibilityRule}
};

/// Page configuration. Every field has a default, so `{}` is valid JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormConfig {
    /// Form-ingestion endpoint receiving the multipart POST.
    pub endpoint:          String,
    pub access_key:        String,
    /// Quiet period after the last edit before the draft is saved.
    pub autosave_delay_ms: u32,
    pub draft_key:         String,
    pub stroke:            StrokeStyle,
    pub rules:             Vec<VisibilityRule>,
    pub ids:               ElementIds,
    pub messages:          Messages
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            endpoint:          "https://api.web3forms.com/submit".into(),
            access_key:        "YOUR_WEB3FORMS_ACCESS_KEY".into(),
            autosave_delay_ms: 30_000,
            draft_key:         "admissionFormDraft".into(),
            stroke:            StrokeStyle::default(),
            rules:             default_rules(),
            ids:               ElementIds::default(),
            messages:          Messages::default()
        }
    }
}

impl FormConfig {
    pub fn from_json(json: &str) -> Result<Self, FormError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), FormError> {
        if self.endpoint.trim().is_empty() {
            return Err(FormError::Config("endpoint is empty".into()));
        }
        if self.draft_key.trim().is_empty() {
            return Err(FormError::Config("draftKey is empty".into()));
        }
        if !(self.stroke.width > 0.0) {
            return Err(FormError::Config(format!(
                "stroke width must be positive, got {}",
                self.stroke.width
            )));
        }
        Ok(())
    }
}

/// DOM ids the page wiring looks up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementIds {
    pub form:            String,
    pub canvas:          String,
    pub clear_button:    String,
    pub photo_input:     String,
    pub photo_preview:   String,
    pub birth_date:      String,
    pub age_years:       String,
    pub age_months:      String,
    pub success_message: String
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            form:            "admissionForm".into(),
            canvas:          "signatureCanvas".into(),
            clear_button:    "clearSignature".into(),
            photo_input:     "studentPhoto".into(),
            photo_preview:   "photoPreview".into(),
            birth_date:      "fechaNacimiento".into(),
            age_years:       "edadAnos".into(),
            age_months:      "edadMeses".into(),
            success_message: "successMessage".into()
        }
    }
}

/// User-facing texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Messages {
    pub missing_signature: String,
    pub submit_failed:     String,
    pub restore_prompt:    String,
    pub sending:           String,
    pub photo_alt:         String
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            missing_signature: "Por favor, firme el formulario antes de enviarlo.".into(),
            submit_failed:     "Hubo un error al enviar el formulario. Por favor, intente de \
                                nuevo o contacte a la oficina de admisiones."
                .into(),
            restore_prompt:    "Se encontró un borrador guardado. ¿Desea continuar donde lo \
                                dejó?"
                .into(),
            sending:           "Enviando...".into(),
            photo_alt:         "Vista previa de la foto".into()
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::style::Color;

    #[test]
    fn empty_object_yields_defaults() {
        assert_eq!(FormConfig::from_json("{}").unwrap(), FormConfig::default());
    }

    #[test]
    fn defaults_cover_original_page() {
        let c = FormConfig::default();
        assert_eq!(c.autosave_delay_ms, 30_000);
        assert_eq!(c.draft_key, "admissionFormDraft");
        assert_eq!(c.rules.len(), 4);
        assert_eq!(c.ids.canvas, "signatureCanvas");
        assert_eq!(c.stroke.color, Color::rgb(0x1e, 0x3a, 0x8a));
    }

    #[test]
    fn partial_override() {
        let c = FormConfig::from_json(
            r##"{
                "accessKey": "live-key",
                "autosaveDelayMs": 5000,
                "stroke": { "width": 3.5 },
                "ids": { "canvas": "firma" }
            }"##
        )
        .unwrap();
        assert_eq!(c.access_key, "live-key");
        assert_eq!(c.autosave_delay_ms, 5000);
        assert_eq!(c.stroke.width, 3.5);
        assert_eq!(c.stroke.color, Color::rgb(0x1e, 0x3a, 0x8a));
        assert_eq!(c.ids.canvas, "firma");
        assert_eq!(c.ids.form, "admissionForm");
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            FormConfig::from_json(r#"{"endpoint":"  "}"#),
            Err(FormError::Config(_))
        ));
        assert!(matches!(
            FormConfig::from_json(r#"{"stroke":{"width":0}}"#),
            Err(FormError::Config(_))
        ));
        assert!(matches!(
            FormConfig::from_json(r#"{"stroke":{"color":"blue"}}"#),
            Err(FormError::Json(_))
        ));
        assert!(matches!(FormConfig::from_json("not json"), Err(FormError::Json(_))));
    }
}
