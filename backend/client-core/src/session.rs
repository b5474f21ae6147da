//! Session lifecycle and the operator credential.

use common::RedactedSecret;

/// Where the session stands with the controller.
///
/// A fresh connection starts in `AwaitingAuth`; the controller's reply to
/// the opening `Authenticate` moves it to `Authenticated` or
/// `Unauthenticated`. Every close returns it to `Disconnected`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionStatus {
    #[default]
    Disconnected,
    AwaitingAuth,
    Authenticated,
    Unauthenticated,
}

/// Connection status plus the in-memory operator credential.
///
/// The credential here is independent of the persisted one: a rejection
/// clears only this copy.
#[derive(Debug, Clone, Default)]
pub struct Session {
    status: SessionStatus,
    credential: Option<RedactedSecret>,
}

impl Session {
    pub fn new(credential: Option<RedactedSecret>) -> Self {
        Self {
            status: SessionStatus::Disconnected,
            credential,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Whether a socket is currently open, authenticated or not.
    pub fn connected(&self) -> bool {
        self.status != SessionStatus::Disconnected
    }

    /// The controller's verdict on the credential, once one arrived
    /// this connection.
    pub fn authenticated(&self) -> Option<bool> {
        match self.status {
            SessionStatus::Authenticated => Some(true),
            SessionStatus::Unauthenticated => Some(false),
            SessionStatus::Disconnected | SessionStatus::AwaitingAuth => None,
        }
    }

    pub fn credential(&self) -> Option<&RedactedSecret> {
        self.credential.as_ref()
    }

    pub fn set_credential(&mut self, credential: Option<RedactedSecret>) {
        self.credential = credential;
    }

    /// A socket opened; the handshake is about to start.
    pub fn on_open(&mut self) {
        self.status = SessionStatus::AwaitingAuth;
    }

    /// The socket closed, whatever the cause.
    pub fn on_close(&mut self) {
        self.status = SessionStatus::Disconnected;
    }

    /// The controller answered the `Authenticate` request.
    ///
    /// A rejection also drops the in-memory credential; any persisted copy
    /// is left alone.
    pub fn on_auth_reply(&mut self, accepted: bool) {
        if accepted {
            self.status = SessionStatus::Authenticated;
        } else {
            self.status = SessionStatus::Unauthenticated;
            self.credential = None;
        }
    }
}
