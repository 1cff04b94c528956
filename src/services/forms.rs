// src/services/forms.rs

//! Contact and newsletter submission.

use serde_json::{Value, json};

use crate::error::Result;
use crate::models::{CaptchaState, ContactForm, FieldError, FormsConfig, NewsletterForm};
use crate::services::api::{ApiClient, ApiResponse};
use crate::services::endpoints::Endpoint;

/// Result of a form submission as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// The backend accepted the submission
    Sent,
    /// The backend was unreachable and success was simulated
    Simulated,
    /// Field validation failed; nothing was sent
    Invalid(Vec<FieldError>),
    /// No verified captcha token; nothing was sent
    CaptchaRequired,
    Failed(String),
}

impl FormOutcome {
    /// Whether the form should be cleared and a success message shown.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Sent | Self::Simulated)
    }

    fn from_response(response: ApiResponse) -> Self {
        match response {
            ApiResponse { simulated: true, .. } => Self::Simulated,
            ApiResponse { success: true, .. } => Self::Sent,
            ApiResponse { error, .. } => {
                Self::Failed(error.unwrap_or_else(|| "request failed".to_string()))
            }
        }
    }
}

/// Validates forms and submits them through the API client.
#[derive(Clone)]
pub struct FormSubmitter {
    client: ApiClient,
    require_captcha: bool,
}

impl FormSubmitter {
    pub fn new(client: ApiClient, config: &FormsConfig) -> Self {
        Self {
            client,
            require_captcha: config.require_captcha,
        }
    }

    /// Submit the contact form. Field errors are reported before the captcha check.
    pub async fn submit_contact(&self, form: &ContactForm, captcha: &CaptchaState) -> Result<FormOutcome> {
        let errors = form.validate();
        if !errors.is_empty() {
            log::debug!("Contact form has {} invalid fields", errors.len());
            return Ok(FormOutcome::Invalid(errors));
        }

        let mut payload = serde_json::to_value(form)?;
        if !self.attach_captcha(&mut payload, captcha) {
            log::info!("Contact form blocked: captcha not verified");
            return Ok(FormOutcome::CaptchaRequired);
        }

        self.send(&Endpoint::ContactSend, &payload).await
    }

    /// Sign up for the newsletter. Gated on the captcha like the contact form.
    pub async fn subscribe(&self, form: &NewsletterForm, captcha: &CaptchaState) -> Result<FormOutcome> {
        let errors = form.validate();
        if !errors.is_empty() {
            return Ok(FormOutcome::Invalid(errors));
        }

        let mut payload = json!({ "email": form.email.trim() });
        if !self.attach_captcha(&mut payload, captcha) {
            log::info!("Newsletter signup blocked: captcha not verified");
            return Ok(FormOutcome::CaptchaRequired);
        }

        self.send(&Endpoint::NewsletterSubscribe, &payload).await
    }

    pub async fn unsubscribe(&self, form: &NewsletterForm) -> Result<FormOutcome> {
        let errors = form.validate();
        if !errors.is_empty() {
            return Ok(FormOutcome::Invalid(errors));
        }
        let payload = json!({ "email": form.email.trim() });
        self.send(&Endpoint::NewsletterUnsubscribe, &payload).await
    }

    /// Adds the verified token to the payload. False when a token is required but missing.
    fn attach_captcha(&self, payload: &mut Value, captcha: &CaptchaState) -> bool {
        match captcha.token() {
            Some(token) => {
                if let Value::Object(fields) = payload {
                    fields.insert("captcha_token".into(), json!(token.as_str()));
                }
                true
            }
            None => !self.require_captcha,
        }
    }

    async fn send(&self, endpoint: &Endpoint, payload: &Value) -> Result<FormOutcome> {
        let response = self
            .client
            .make_api_request(endpoint, Some(payload), &self.client.form_options())
            .await;
        let outcome = FormOutcome::from_response(response);
        log::info!("{} -> {:?}", endpoint, outcome);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::ApiConfig;
    use crate::services::testing::{Scripted, ScriptedTransport};

    fn submitter(transport: Arc<ScriptedTransport>, simulate: bool) -> FormSubmitter {
        let api = ApiConfig {
            simulate_on_failure: simulate,
            ..Default::default()
        };
        let client = ApiClient::with_transport(&api, transport).unwrap();
        FormSubmitter::new(client, &FormsConfig::default())
    }

    fn contact() -> ContactForm {
        ContactForm {
            name: "Robin".into(),
            email: "robin@example.com".into(),
            phone: None,
            subject: Some("Pricing".into()),
            message: "Hello there".into(),
        }
    }

    fn verified() -> CaptchaState {
        let mut captcha = CaptchaState::default();
        captcha.loaded();
        captcha.verify("tok-123");
        captcha
    }

    #[tokio::test]
    async fn contact_without_captcha_sends_nothing() {
        let transport = ScriptedTransport::new(vec![]);
        let forms = submitter(transport.clone(), true);

        let mut captcha = CaptchaState::default();
        captcha.loaded();
        let outcome = forms.submit_contact(&contact(), &captcha).await.unwrap();

        assert_eq!(outcome, FormOutcome::CaptchaRequired);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn field_errors_come_before_captcha() {
        let transport = ScriptedTransport::new(vec![]);
        let forms = submitter(transport.clone(), true);
        let form = ContactForm {
            email: "not-an-email".into(),
            ..contact()
        };

        let outcome = forms
            .submit_contact(&form, &CaptchaState::default())
            .await
            .unwrap();

        let FormOutcome::Invalid(errors) = outcome else {
            panic!("expected field errors, got {outcome:?}");
        };
        assert_eq!(errors[0].field, "email");
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn contact_forwards_captcha_token() {
        let transport = ScriptedTransport::new(vec![Scripted::json(200, json!({"success": true}))]);
        let forms = submitter(transport.clone(), true);

        let outcome = forms.submit_contact(&contact(), &verified()).await.unwrap();
        assert_eq!(outcome, FormOutcome::Sent);

        let request = &transport.requests()[0];
        assert_eq!(request.url.path(), "/api/email/contact");
        let body = request.body.as_ref().unwrap();
        assert_eq!(body["captcha_token"], "tok-123");
        assert_eq!(body["subject"], "Pricing");
    }

    #[tokio::test]
    async fn unreachable_backend_is_simulated() {
        let transport = ScriptedTransport::new(vec![
            Scripted::fail("connection refused"),
            Scripted::fail("connection refused"),
        ]);
        let forms = submitter(transport.clone(), true);

        let outcome = forms
            .subscribe(&NewsletterForm::new("a@b.co"), &verified())
            .await
            .unwrap();
        assert_eq!(outcome, FormOutcome::Simulated);
        assert!(outcome.is_success());
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn failure_is_reported_without_simulation() {
        let transport = ScriptedTransport::new(vec![
            Scripted::text(500, "boom"),
            Scripted::text(500, "boom"),
        ]);
        let forms = submitter(transport, false);

        let outcome = forms
            .unsubscribe(&NewsletterForm::new("a@b.co"))
            .await
            .unwrap();
        assert!(matches!(outcome, FormOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn invalid_newsletter_email_is_rejected() {
        let transport = ScriptedTransport::new(vec![]);
        let forms = submitter(transport.clone(), true);

        let outcome = forms
            .subscribe(&NewsletterForm::new("nope"), &CaptchaState::default())
            .await
            .unwrap();
        assert!(matches!(outcome, FormOutcome::Invalid(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn newsletter_signup_without_captcha_sends_nothing() {
        let transport = ScriptedTransport::new(vec![]);
        let forms = submitter(transport.clone(), true);

        let mut captcha = CaptchaState::default();
        captcha.loaded();
        let outcome = forms
            .subscribe(&NewsletterForm::new("a@b.co"), &captcha)
            .await
            .unwrap();

        assert_eq!(outcome, FormOutcome::CaptchaRequired);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn newsletter_signup_forwards_captcha_token() {
        let transport = ScriptedTransport::new(vec![Scripted::json(200, json!({"success": true}))]);
        let forms = submitter(transport.clone(), true);

        let outcome = forms
            .subscribe(&NewsletterForm::new(" a@b.co "), &verified())
            .await
            .unwrap();
        assert_eq!(outcome, FormOutcome::Sent);

        let request = &transport.requests()[0];
        assert_eq!(request.url.path(), "/api/newsletter/subscribe");
        let body = request.body.as_ref().unwrap();
        assert_eq!(body["email"], "a@b.co");
        assert_eq!(body["captcha_token"], "tok-123");
    }

    #[tokio::test]
    async fn captcha_can_be_switched_off() {
        let transport = ScriptedTransport::new(vec![Scripted::json(200, json!({"success": true}))]);
        let api = ApiConfig::default();
        let client = ApiClient::with_transport(&api, transport.clone()).unwrap();
        let forms = FormSubmitter::new(
            client,
            &FormsConfig {
                require_captcha: false,
            },
        );

        let outcome = forms
            .subscribe(&NewsletterForm::new("a@b.co"), &CaptchaState::default())
            .await
            .unwrap();
        assert_eq!(outcome, FormOutcome::Sent);
        assert!(transport.requests()[0].body.as_ref().unwrap().get("captcha_token").is_none());
    }
}
