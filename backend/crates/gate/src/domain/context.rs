//! Request-scoped gate state
//!
//! A [`RequestContext`] is created when a request is admitted and travels in
//! that request's extensions through every later stage into the business
//! handler. It is never shared between requests.

use derive_more::Display;
use std::net::IpAddr;

use crate::domain::claims::UserLogin;

/// Key the admission limiter counts requests under
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
#[display("{_0}")]
pub struct ClientIdentity(String);

impl ClientIdentity {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn from_ip(ip: Option<IpAddr>) -> Self {
        Self(platform::client::client_key(ip))
    }

    pub fn unknown() -> Self {
        Self::from_ip(None)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Position of a request in the gate
///
/// `Admitted → BearerChecked → SignatureChecked → Forwarded`. A failing check
/// emits the rejection response and drops the context, so `Rejected` has no
/// runtime representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum GateStage {
    #[display("admitted")]
    Admitted,
    #[display("bearer_checked")]
    BearerChecked,
    #[display("signature_checked")]
    SignatureChecked,
    #[display("forwarded")]
    Forwarded,
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    client: ClientIdentity,
    stage: GateStage,
    user_login: Option<UserLogin>,
    authorization: Option<String>,
}

impl RequestContext {
    pub fn admitted(client: ClientIdentity) -> Self {
        Self {
            client,
            stage: GateStage::Admitted,
            user_login: None,
            authorization: None,
        }
    }

    pub fn client(&self) -> &ClientIdentity {
        &self.client
    }

    pub fn stage(&self) -> GateStage {
        self.stage
    }

    /// Verified identity; `None` until the bearer check passed
    pub fn user_login(&self) -> Option<&UserLogin> {
        self.user_login.as_ref()
    }

    /// Literal `Authorization` header value the identity was taken from
    pub fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref()
    }

    pub fn is_forwarded(&self) -> bool {
        self.stage == GateStage::Forwarded
    }

    pub(crate) fn record_bearer(&mut self, user: UserLogin, authorization: String) {
        debug_assert_eq!(self.stage, GateStage::Admitted);
        self.user_login = Some(user);
        self.authorization = Some(authorization);
        self.stage = GateStage::BearerChecked;
    }

    pub(crate) fn record_signature(&mut self) {
        debug_assert_eq!(self.stage, GateStage::BearerChecked);
        self.stage = GateStage::SignatureChecked;
    }

    pub(crate) fn mark_forwarded(&mut self) {
        debug_assert_eq!(self.stage, GateStage::SignatureChecked);
        self.stage = GateStage::Forwarded;
    }
}
