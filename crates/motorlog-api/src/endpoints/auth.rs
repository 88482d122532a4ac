// Authentication flows
//
// Every flow that yields a token stores it through `Session::set_token`,
// so the dispatcher sees the new bearer on the very next request.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{AuthPayload, Registration, User};
use crate::routes;

/// Third-party identity providers accepted by `/auth/social/{provider}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SocialProvider {
    Google,
    Apple,
    Facebook,
}

impl ApiClient {
    /// Sign in with email and password. On success the token is persisted
    /// and the signed-in user returned.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<User, Error> {
        #[derive(Serialize)]
        struct Body<'a> {
            email: &'a str,
            password: &'a str,
        }

        let resp = self
            .post::<AuthPayload>(
                routes::LOGIN.path(),
                &Body {
                    email,
                    password: password.expose_secret(),
                },
            )
            .await?;
        self.adopt_token(resp.data)
    }

    /// Create an account and sign in with it.
    pub async fn register(&self, registration: &Registration) -> Result<User, Error> {
        let resp = self
            .post::<AuthPayload>(routes::REGISTER.path(), registration)
            .await?;
        self.adopt_token(resp.data)
    }

    /// Exchange a provider access token for a backend session.
    pub async fn social_login(
        &self,
        provider: SocialProvider,
        access_token: &SecretString,
    ) -> Result<User, Error> {
        #[derive(Serialize)]
        struct Body<'a> {
            access_token: &'a str,
        }

        let resp = self
            .post::<AuthPayload>(
                routes::SOCIAL_AUTH.child(provider),
                &Body {
                    access_token: access_token.expose_secret(),
                },
            )
            .await?;
        self.adopt_token(resp.data)
    }

    /// End the session. The server call is best effort; the local token is
    /// always removed.
    pub async fn logout(&self) -> Result<(), Error> {
        if self.session().is_authenticated() {
            if let Err(e) = self.post::<Value>(routes::LOGOUT.path(), &()).await {
                warn!(error = %e, "server-side logout failed, clearing local session anyway");
            }
        }
        self.session().remove_token()?;
        debug!("logged out");
        Ok(())
    }

    fn adopt_token(&self, payload: AuthPayload) -> Result<User, Error> {
        if payload.token.is_empty() {
            return Err(Error::Authentication {
                message: "backend response did not include a token".into(),
            });
        }
        self.session().set_token(SecretString::from(payload.token))?;
        self.session().set_guest_mode(false)?;
        debug!(user = %payload.user.email, "signed in");
        Ok(payload.user)
    }
}
