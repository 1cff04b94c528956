// src/pipeline/forms.rs

//! Form submission pipelines.

use crate::error::Result;
use crate::models::{CaptchaState, ContactForm, NewsletterForm};
use crate::pipeline::Context;
use crate::services::{AnalyticsEvent, FormOutcome, FormSubmitter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsletterAction {
    Subscribe,
    Unsubscribe,
}

/// Captcha state for a token solved out of band.
fn solved(captcha_token: Option<&str>) -> CaptchaState {
    let mut captcha = CaptchaState::default();
    captcha.loaded();
    if let Some(token) = captcha_token {
        captcha.verify(token);
    }
    captcha
}

/// Submit the contact form with a token solved out of band.
pub async fn run_contact(
    ctx: &Context,
    form: &ContactForm,
    captcha_token: Option<&str>,
) -> Result<FormOutcome> {
    let captcha = solved(captcha_token);
    let submitter = FormSubmitter::new(ctx.client.clone(), &ctx.config.forms);
    let outcome = submitter.submit_contact(form, &captcha).await?;
    if outcome.is_success() {
        ctx.track(AnalyticsEvent::new("contact_submit"));
    }
    Ok(outcome)
}

/// Subscribe or unsubscribe. Only signup needs the captcha token.
pub async fn run_newsletter(
    ctx: &Context,
    email: &str,
    action: NewsletterAction,
    captcha_token: Option<&str>,
) -> Result<FormOutcome> {
    let submitter = FormSubmitter::new(ctx.client.clone(), &ctx.config.forms);
    let form = NewsletterForm::new(email);
    let outcome = match action {
        NewsletterAction::Subscribe => submitter.subscribe(&form, &solved(captcha_token)).await?,
        NewsletterAction::Unsubscribe => submitter.unsubscribe(&form).await?,
    };
    if outcome.is_success() {
        ctx.track(AnalyticsEvent::new("newsletter").with("action", format!("{action:?}").to_lowercase()));
    }
    Ok(outcome)
}
