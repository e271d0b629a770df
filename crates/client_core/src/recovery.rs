//! Account-recovery flow: modal/method view state plus the submission that
//! trades a recovery credential for a token pair.

use std::time::Duration;

use reqwest::{multipart, Client, Response};
use shared::{
    error::ErrorBody,
    protocol::{RestoreByTextRequest, TokenPair},
};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::{
    events::{ClientEvent, Notice},
    normalize_base_url,
    session::SessionContext,
    ActionError,
};

/// Fixed navigation target after a successful recovery.
pub const POST_RECOVERY_URL: &str = "/static/COR_ID/mainscreen.html";
pub const POST_RECOVERY_REDIRECT_DELAY: Duration = Duration::from_millis(500);

const VALIDATION_MESSAGE: &str = "choose a recovery method and fill the required fields";
const GENERIC_FAILURE_MESSAGE: &str = "recovery request failed";

/// The two mutually exclusive recovery mechanisms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryMethod {
    SuperPassword,
    RecoveryFile,
}

/// Individually toggled elements of the recovery modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryField {
    Email,
    SuperPassword,
    FileUpload,
    SubmitButton,
}

#[derive(Debug, Clone)]
pub struct RecoveryFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

pub struct RecoveryFlowController {
    http: Client,
    base_url: String,
    session: SessionContext,
    events: broadcast::Sender<ClientEvent>,
    no_file_placeholder: String,
    modal_open: bool,
    method: Option<RecoveryMethod>,
    attached_file: Option<RecoveryFile>,
}

impl RecoveryFlowController {
    /// `no_file_placeholder` is the host-localized label shown while no
    /// recovery file is attached.
    pub fn new(
        http: Client,
        base_url: &str,
        session: SessionContext,
        events: broadcast::Sender<ClientEvent>,
        no_file_placeholder: impl Into<String>,
    ) -> Result<Self, ActionError> {
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url)?,
            session,
            events,
            no_file_placeholder: no_file_placeholder.into(),
            modal_open: false,
            method: None,
            attached_file: None,
        })
    }

    /// Opens the modal in its neutral state: no method chosen, every
    /// method-specific field hidden.
    pub fn open_modal(&mut self) {
        self.modal_open = true;
        self.method = None;
    }

    pub fn choose_super_password(&mut self) {
        self.method = Some(RecoveryMethod::SuperPassword);
    }

    pub fn choose_recovery_file(&mut self) {
        self.method = Some(RecoveryMethod::RecoveryFile);
    }

    /// Closes the modal only when the host's hit-test landed on the modal
    /// backdrop itself.
    pub fn dismiss_on_backdrop(&mut self, hit_backdrop: bool) {
        if hit_backdrop {
            self.modal_open = false;
        }
    }

    pub fn is_modal_open(&self) -> bool {
        self.modal_open
    }

    pub fn method(&self) -> Option<RecoveryMethod> {
        self.method
    }

    pub fn attach_file(&mut self, file: RecoveryFile) {
        self.attached_file = Some(file);
    }

    pub fn clear_file(&mut self) {
        self.attached_file = None;
    }

    /// Display label for the file selector: the chosen file name, or the
    /// localized placeholder when nothing is attached.
    pub fn file_label(&self) -> &str {
        self.attached_file
            .as_ref()
            .map(|file| file.filename.as_str())
            .unwrap_or(&self.no_file_placeholder)
    }

    /// The set of visible modal elements for the current state. Both methods
    /// share the email field and submit button.
    pub fn visible_fields(&self) -> &'static [RecoveryField] {
        if !self.modal_open {
            return &[];
        }
        match self.method {
            None => &[],
            Some(RecoveryMethod::SuperPassword) => &[
                RecoveryField::Email,
                RecoveryField::SuperPassword,
                RecoveryField::SubmitButton,
            ],
            Some(RecoveryMethod::RecoveryFile) => &[
                RecoveryField::Email,
                RecoveryField::FileUpload,
                RecoveryField::SubmitButton,
            ],
        }
    }

    /// Submits the recovery request. An attached file takes priority over a
    /// supplied super-password; with neither, no request is made. On success
    /// the token pair is persisted and the redirect event is emitted after
    /// the fixed delay.
    pub async fn submit(
        &mut self,
        email: &str,
        super_password: Option<&str>,
    ) -> Result<TokenPair, ActionError> {
        let outcome = if let Some(file) = self.attached_file.clone() {
            self.restore_by_file(email, file).await
        } else if let Some(code) = super_password.filter(|code| !code.is_empty()) {
            self.restore_by_text(email, code).await
        } else {
            let notice = Notice::error(VALIDATION_MESSAGE);
            self.notify(notice);
            return Err(ActionError::Validation(VALIDATION_MESSAGE.to_string()));
        };

        match outcome {
            Ok(tokens) => match self.session.store_tokens(&tokens).await {
                Ok(()) => {
                    self.notify(Notice::success("account access restored"));
                    info!("recovery: tokens persisted, redirect scheduled");
                    self.schedule_redirect();
                    Ok(tokens)
                }
                Err(err) => {
                    let err = ActionError::from(err);
                    self.notify(Notice::error(GENERIC_FAILURE_MESSAGE));
                    warn!(error = %err, "recovery: token persistence failed");
                    Err(err)
                }
            },
            Err(err) => {
                match &err {
                    ActionError::Api { detail, .. } => self.notify(Notice::error(detail.clone())),
                    _ => self.notify(Notice::error(GENERIC_FAILURE_MESSAGE)),
                }
                warn!(error = %err, "recovery: submission failed");
                Err(err)
            }
        }
    }

    async fn restore_by_file(
        &self,
        email: &str,
        file: RecoveryFile,
    ) -> Result<TokenPair, ActionError> {
        let form = multipart::Form::new().text("email", email.to_string()).part(
            "file",
            multipart::Part::bytes(file.bytes).file_name(file.filename),
        );
        let response = self
            .http
            .post(format!(
                "{}/api/auth/restore_account_by_recovery_file",
                self.base_url
            ))
            .multipart(form)
            .send()
            .await?;
        Self::parse_token_response(response).await
    }

    async fn restore_by_text(&self, email: &str, code: &str) -> Result<TokenPair, ActionError> {
        let response = self
            .http
            .post(format!("{}/api/auth/restore_account_by_text", self.base_url))
            .json(&RestoreByTextRequest {
                email: email.to_string(),
                recovery_code: code.to_string(),
            })
            .send()
            .await?;
        Self::parse_token_response(response).await
    }

    async fn parse_token_response(response: Response) -> Result<TokenPair, ActionError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<TokenPair>().await?);
        }

        match response.json::<ErrorBody>().await {
            Ok(body) => Err(ActionError::Api {
                status: status.as_u16(),
                detail: body.detail,
            }),
            Err(err) => Err(ActionError::Transport(err.to_string())),
        }
    }

    fn schedule_redirect(&self) {
        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(POST_RECOVERY_REDIRECT_DELAY).await;
            let _ = events.send(ClientEvent::RedirectRequested {
                url: POST_RECOVERY_URL.to_string(),
            });
        });
    }

    fn notify(&self, notice: Notice) {
        let _ = self.events.send(ClientEvent::Notice(notice));
    }
}
