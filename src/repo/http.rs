use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::debug;
use url::Url;

use super::{ApiError, Result, TaskRepository};
use crate::domain::task::{Task, TaskFields, TaskId};

pub const DEFAULT_API_URL: &str = "https://localhost:7216/api/todo";

/// REST client for the task API: the collection lives at the base URL and
/// single tasks at `<base>/<id>`.
#[derive(Debug, Clone)]
pub struct HttpTaskRepo {
    client: Client,
    base: Url,
}

impl HttpTaskRepo {
    pub fn new(base: Url, accept_invalid_certs: bool) -> Result<Self> {
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base.to_string()));
        }
        let client = Client::builder()
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn item_url(&self, id: TaskId) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .push(&id.to_string());
        Ok(url)
    }
}

/// Turn a non-success response into `ApiError::Status`, keeping its body.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::status(status, body))
}

#[async_trait]
impl TaskRepository for HttpTaskRepo {
    async fn list(&self) -> Result<Vec<Task>> {
        debug!(url = %self.base, "GET tasks");
        let response = check(self.client.get(self.base.clone()).send().await?).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn create(&self, fields: &TaskFields) -> Result<()> {
        debug!(url = %self.base, name = %fields.name, "POST task");
        check(self.client.post(self.base.clone()).json(fields).send().await?).await?;
        Ok(())
    }

    async fn update(&self, id: TaskId, fields: &TaskFields) -> Result<()> {
        let url = self.item_url(id)?;
        debug!(%url, "PUT task");
        check(self.client.put(url).json(fields).send().await?).await?;
        Ok(())
    }

    async fn delete(&self, id: TaskId) -> Result<()> {
        let url = self.item_url(id)?;
        debug!(%url, "DELETE task");
        check(self.client.delete(url).send().await?).await?;
        Ok(())
    }
}
