//! Uploaded PDFs under `/api/pdf`

use reqwest::multipart::{Form, Part};
use serde::Serialize;

use super::{check, read_json, Session};
use crate::error::Result;
use crate::model::{Document, UploadedDocument};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RenameRequest<'a> {
    new_name: &'a str,
}

pub struct DocumentClient {
    http: reqwest::Client,
    session: Session,
}

impl DocumentClient {
    pub fn new(session: Session) -> Self {
        Self {
            http: reqwest::Client::new(),
            session,
        }
    }

    fn item_url(&self, uuid: &str) -> String {
        self.session
            .url(&format!("/api/pdf/{}", urlencoding::encode(uuid)))
    }

    /// The caller's documents, newest first
    pub async fn list(&self) -> Result<Vec<Document>> {
        let request = self.http.get(self.session.url("/api/pdf"));
        let response = self.session.authorize(request).send().await?;
        read_json(response).await
    }

    pub async fn upload(&self, file_name: &str, data: Vec<u8>) -> Result<UploadedDocument> {
        let size = data.len();
        let part = Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")?;
        let form = Form::new().part("file", part);

        let request = self
            .http
            .post(self.session.url("/api/pdf/upload"))
            .multipart(form);
        let response = self.session.authorize(request).send().await?;
        let uploaded: UploadedDocument = read_json(response).await?;

        tracing::info!(uuid = %uploaded.uuid, size, "PDF uploaded");
        Ok(uploaded)
    }

    /// Raw PDF bytes
    pub async fn download(&self, uuid: &str) -> Result<Vec<u8>> {
        let request = self.http.get(self.item_url(uuid));
        let response = self.session.authorize(request).send().await?;
        let response = check(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn rename(&self, uuid: &str, new_name: &str) -> Result<Document> {
        let request = self
            .http
            .put(self.item_url(uuid))
            .json(&RenameRequest { new_name });
        let response = self.session.authorize(request).send().await?;
        read_json(response).await
    }

    /// Delete a document; the server drops its highlights too
    pub async fn delete(&self, uuid: &str) -> Result<()> {
        let request = self.http.delete(self.item_url(uuid));
        let response = self.session.authorize(request).send().await?;
        check(response).await?;
        Ok(())
    }
}
