use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{multipart, Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, COOKIE};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::{ApiResult, Backend, BirthdayWindow, ContactQuery, DbAction};
use crate::auth::Credentials;
use crate::error::ApiError;
use crate::model::{Avatar, Contact, ContactId, ContactPayload, DbReply, UserProfile};

/// Blocking reqwest client for the contacts REST API.
pub struct HttpBackend {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl HttpBackend {
    pub fn new(base_url: &str, credentials: Credentials, timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ApiError::Network(format!("failed to create HTTP client: {err}")))?;

        let base_url = base_url.trim_end_matches('/').to_string();
        info!(
            base_url = %base_url,
            authenticated = !credentials.is_anonymous(),
            timeout_secs = timeout.as_secs(),
            "initialized contacts backend"
        );

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, mut req: RequestBuilder) -> RequestBuilder {
        if let Some(value) = &self.credentials.authorization {
            req = req.header(AUTHORIZATION, value);
        }
        if let Some(cookie) = &self.credentials.cookie {
            req = req.header(COOKIE, cookie);
        }
        req.header(ACCEPT, "application/json")
    }

    fn send(&self, req: RequestBuilder) -> ApiResult<Response> {
        let response = self.authorize(req).send()?;
        let status = response.status();
        debug!(url = %response.url(), status = status.as_u16(), "response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        let err = ApiError::from_body(status.as_u16(), &body);
        warn!(status = status.as_u16(), error = %err, "request failed");
        Err(err)
    }

    fn json<T: DeserializeOwned>(&self, req: RequestBuilder) -> ApiResult<T> {
        let response = self.send(req)?;
        let text = response.text()?;
        Ok(serde_json::from_str(&text)?)
    }

    fn discard(&self, req: RequestBuilder) -> ApiResult<()> {
        self.send(req).map(|_| ())
    }

    /// Lists tolerate any non-array body as "nothing found".
    fn contact_list(&self, req: RequestBuilder) -> ApiResult<Vec<Contact>> {
        let value: Value = self.json(req)?;
        match value {
            Value::Array(items) => Ok(serde_json::from_value(Value::Array(items))?),
            other => {
                debug!(body = %other, "non-array contact list treated as empty");
                Ok(Vec::new())
            }
        }
    }
}

impl Backend for HttpBackend {
    fn list_contacts(&self, query: &ContactQuery) -> ApiResult<Vec<Contact>> {
        let req = self
            .client
            .get(self.url("/contacts/"))
            .query(&query.params());
        self.contact_list(req)
    }

    fn contact(&self, id: &ContactId) -> ApiResult<Contact> {
        self.json(self.client.get(self.url(&format!("/contacts/{id}"))))
    }

    fn create_contact(&self, payload: &ContactPayload) -> ApiResult<Contact> {
        self.json(self.client.post(self.url("/contacts/")).json(payload))
    }

    fn update_contact(&self, id: &ContactId, payload: &ContactPayload) -> ApiResult<Contact> {
        self.json(
            self.client
                .put(self.url(&format!("/contacts/{id}")))
                .json(payload),
        )
    }

    fn delete_contact(&self, id: &ContactId) -> ApiResult<()> {
        self.discard(self.client.delete(self.url(&format!("/contacts/{id}"))))
    }

    fn birthdays(&self, window: BirthdayWindow) -> ApiResult<Vec<Contact>> {
        self.contact_list(self.client.get(self.url(window.path())))
    }

    fn db_action(&self, action: DbAction) -> ApiResult<DbReply> {
        let url = self.url(&action.path());
        let req = if action.is_query() {
            self.client.get(url)
        } else {
            self.client.post(url)
        };
        self.json(req)
    }

    fn current_user(&self) -> ApiResult<UserProfile> {
        self.json(self.client.get(self.url("/users/me")))
    }

    fn update_username(&self, username: &str) -> ApiResult<()> {
        self.discard(
            self.client
                .patch(self.url("/users/update/username"))
                .json(&json!({ "username": username })),
        )
    }

    fn update_password(&self, current: &str, new: &str) -> ApiResult<()> {
        self.discard(
            self.client
                .patch(self.url("/users/update/password"))
                .json(&json!({
                    "current_password": current,
                    "new_password": new,
                })),
        )
    }

    fn request_password_reset(&self) -> ApiResult<()> {
        self.discard(self.client.post(self.url("/password/reset")))
    }

    fn avatars(&self) -> ApiResult<Vec<Avatar>> {
        let value: Value = self.json(self.client.get(self.url("/users/avatars")))?;
        match value {
            Value::Array(items) => Ok(serde_json::from_value(Value::Array(items))?),
            _ => Ok(Vec::new()),
        }
    }

    fn upload_avatar(&self, path: &Path) -> ApiResult<()> {
        let form = multipart::Form::new()
            .file("file", path)
            .map_err(|err| ApiError::LocalFile {
                path: path.display().to_string(),
                message: err.to_string(),
            })?;
        self.discard(
            self.client
                .post(self.url("/users/avatars/upload"))
                .multipart(form),
        )
    }

    fn set_main_avatar(&self, id: i64) -> ApiResult<()> {
        self.discard(
            self.client
                .patch(self.url(&format!("/users/avatars/{id}/set-main"))),
        )
    }

    fn delete_avatar(&self, id: i64) -> ApiResult<()> {
        self.discard(self.client.delete(self.url(&format!("/users/avatars/{id}"))))
    }
}
