use std::cell::Cell;

use log::{info, warn};
use serde::Deserialize;

use crate::{error::FormError, signature_core::SignaturePad, surface::Surface};

pub const SIGNATURE_FIELD: &str = "signature";
pub const ACCESS_KEY_FIELD: &str = "access_key";
pub const PHOTO_FIELD: &str = "studentPhoto";

/// Ordered multipart text fields for one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    fields: Vec<(String, String)>
}

impl Submission {
    /// Build the payload from the form's text entries and the signature.
    ///
    /// Refuses an empty pad: a blank export is not a signature.
    pub fn prepare<S, I>(
        pad: &SignaturePad<S>,
        entries: I,
        access_key: &str
    ) -> Result<Self, FormError>
    where
        S: Surface,
        I: IntoIterator<Item = (String, String)>
    {
        if pad.is_empty() {
            return Err(FormError::MissingSignature);
        }
        let signature = pad.export_image()?;
        let mut fields: Vec<(String, String)> = entries.into_iter().collect();
        fields.push((SIGNATURE_FIELD.to_string(), signature));
        fields.push((ACCESS_KEY_FIELD.to_string(), access_key.to_string()));
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Body returned by the form-ingestion endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String
}

impl SubmitResponse {
    pub fn from_json(body: &str) -> Result<Self, FormError> {
        Ok(serde_json::from_str(body)?)
    }

    pub fn into_result(self) -> Result<(), FormError> {
        if self.success {
            info!("submission accepted");
            Ok(())
        } else {
            warn!("submission rejected: {}", self.message);
            Err(FormError::Rejected(self.message))
        }
    }
}

/// Allows one submission in flight at a time.
#[derive(Debug, Default)]
pub struct SubmitGuard {
    in_flight: Cell<bool>
}

impl SubmitGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// `false` if a submission is already running.
    pub fn try_begin(&self) -> bool {
        !self.in_flight.replace(true)
    }

    pub fn finish(&self) {
        self.in_flight.set(false);
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.get()
    }
}

#[cfg(feature = "web")]
pub use web::send;

#[cfg(feature = "web")]
mod web {
    use gloo_net::http::Request;
    use log::{debug, error};
    use web_sys::{File, FormData};

    use super::{Submission, SubmitResponse, PHOTO_FIELD};
    use crate::error::FormError;

    impl Submission {
        pub fn to_form_data(&self, photo: Option<&File>) -> Result<FormData, FormError> {
            let data = FormData::new().map_err(|_| FormError::OpFailed("new FormData".into()))?;
            for (name, value) in &self.fields {
                data.append_with_str(name, value)
                    .map_err(|_| FormError::OpFailed(format!("FormData.append({name})")))?;
            }
            if let Some(file) = photo {
                data.append_with_blob_and_filename(PHOTO_FIELD, file, &file.name())
                    .map_err(|_| FormError::OpFailed("FormData.append(photo)".into()))?;
            }
            Ok(data)
        }
    }

    /// POST the submission as multipart form data.
    pub async fn send(
        endpoint: &str,
        submission: &Submission,
        photo: Option<&File>
    ) -> Result<(), FormError> {
        let body = submission.to_form_data(photo)?;
        debug!("posting {} fields to {endpoint}", submission.fields().len());
        let resp = Request::post(endpoint)
            .body(body)
            .map_err(|e| FormError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| FormError::Network(e.to_string()))?;
        let text = resp
            .text()
            .await
            .map_err(|e| FormError::Network(e.to_string()))?;
        if !resp.ok() {
            error!("endpoint answered {}", resp.status());
        }
        SubmitResponse::from_json(&text)?.into_result()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{raster::RasterSurface, style::StrokeStyle, surface::Point};

    fn entries() -> Vec<(String, String)> {
        vec![
            ("nombreEstudiante".into(), "Lucia".into()),
            ("grado".into(), "Primero".into())
        ]
    }

    #[test]
    fn blank_pad_is_refused() {
        let pad = SignaturePad::new(RasterSurface::new(50, 20).unwrap(), StrokeStyle::default());
        assert!(matches!(
            Submission::prepare(&pad, entries(), "key"),
            Err(FormError::MissingSignature)
        ));
    }

    #[test]
    fn payload_appends_signature_then_access_key() {
        let mut pad =
            SignaturePad::new(RasterSurface::new(50, 20).unwrap(), StrokeStyle::default());
        pad.press_start(Point::new(5.0, 5.0));
        pad.press_move(Point::new(45.0, 15.0));
        pad.press_end();

        let sub = Submission::prepare(&pad, entries(), "abc123").unwrap();
        let names: Vec<&str> = sub.fields().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, ["nombreEstudiante", "grado", "signature", "access_key"]);
        assert!(sub.get(SIGNATURE_FIELD).unwrap().starts_with("data:image/png;base64,"));
        assert_eq!(sub.get(ACCESS_KEY_FIELD), Some("abc123"));
    }

    #[test]
    fn response_mapping() {
        assert!(SubmitResponse::from_json(r#"{"success":true,"message":"ok"}"#)
            .unwrap()
            .into_result()
            .is_ok());

        let rejected = SubmitResponse::from_json(r#"{"success":false,"message":"Invalid key"}"#)
            .unwrap()
            .into_result();
        assert!(matches!(rejected, Err(FormError::Rejected(m)) if m == "Invalid key"));

        let bare = SubmitResponse::from_json(r#"{"success":false}"#).unwrap();
        assert_eq!(bare.message, "");
        assert!(SubmitResponse::from_json("<html>").is_err());
    }

    #[test]
    fn guard_blocks_reentry_until_finished() {
        let guard = SubmitGuard::new();
        assert!(guard.try_begin());
        assert!(guard.is_in_flight());
        assert!(!guard.try_begin());
        guard.finish();
        assert!(guard.try_begin());
    }
}
