//! Signup and login against `/api/auth`

use serde::{Deserialize, Serialize};

use super::{check, read_json, Session};
use crate::error::Result;

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

pub struct AuthClient {
    http: reqwest::Client,
    session: Session,
}

impl AuthClient {
    pub fn new(session: Session) -> Self {
        Self {
            http: reqwest::Client::new(),
            session,
        }
    }

    pub async fn signup(&self, email: &str, password: &str) -> Result<()> {
        let response = self
            .http
            .post(self.session.url("/api/auth/signup"))
            .json(&Credentials { email, password })
            .send()
            .await?;
        check(response).await?;

        tracing::info!(email = %email, "Account created");
        Ok(())
    }

    /// Exchange credentials for a session token
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let response = self
            .http
            .post(self.session.url("/api/auth/login"))
            .json(&Credentials { email, password })
            .send()
            .await?;
        let body: LoginResponse = read_json(response).await?;
        Ok(body.token)
    }

    /// Log in and return a session carrying the new token
    pub async fn login_session(&self, email: &str, password: &str) -> Result<Session> {
        let token = self.login(email, password).await?;
        Ok(self.session.clone().with_token(token))
    }
}
