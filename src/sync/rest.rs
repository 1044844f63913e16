use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Method};
use serde::Deserialize;
use std::time::Duration;

use super::{GatewayError, GatewayResult, Snapshot, SnapshotStream, SyncGateway};
use crate::core::record::{Document, Fields, RecordId};

/// A document as it travels over the wire.
#[derive(Debug, Deserialize)]
struct WireDocument {
    id: RecordId,
    #[serde(default)]
    fields: Fields,
}

#[derive(Debug, Deserialize)]
struct Created {
    id: RecordId,
}

/// JSON-over-HTTP document store client.
///
/// Collections live at `{base}/{collection}`, documents at
/// `{base}/{collection}/{id}`. There is no push channel, so subscriptions poll
/// and only yield when the collection changed.
#[derive(Clone)]
pub struct RestGateway {
    base_url: String,
    token: Option<String>,
    poll_interval: Duration,
    http: Client,
}

impl RestGateway {
    pub fn new(
        base_url: &str,
        token: Option<String>,
        poll_interval: Duration,
    ) -> GatewayResult<Self> {
        let http = Client::builder().build().map_err(|source| GatewayError::Http {
            url: base_url.to_string(),
            source,
        })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            poll_interval,
            http,
        })
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.base_url, collection)
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, collection, id)
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and return the body of a successful response.
    async fn send(
        &self,
        method: Method,
        label: &'static str,
        url: &str,
        body: Option<&Fields>,
        query: &[(&str, &str)],
    ) -> GatewayResult<String> {
        let mut builder = self.request(method, url).query(query);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let resp = builder.send().await.map_err(|source| GatewayError::Http {
            url: url.to_string(),
            source,
        })?;
        let status = resp.status();
        let text = resp.text().await.map_err(|source| GatewayError::Http {
            url: url.to_string(),
            source,
        })?;
        if !status.is_success() {
            return Err(GatewayError::Status {
                method: label,
                url: url.to_string(),
                status,
                body: text,
            });
        }
        Ok(text)
    }

    /// Fetch the whole collection once.
    pub async fn fetch(&self, collection: &str, order_field: &str) -> GatewayResult<Snapshot> {
        let url = self.collection_url(collection);
        let text = self
            .send(Method::GET, "GET", &url, None, &[("orderBy", order_field)])
            .await?;
        let wire: Vec<WireDocument> =
            serde_json::from_str(&text).map_err(|source| GatewayError::Decode {
                url: url.clone(),
                source,
            })?;
        Ok(Snapshot {
            collection: collection.to_string(),
            documents: wire
                .into_iter()
                .map(|d| Document::new(d.id, d.fields))
                .collect(),
        })
    }
}

struct Poll {
    gateway: RestGateway,
    collection: String,
    order_field: String,
    last: Vec<Document>,
}

#[async_trait]
impl SyncGateway for RestGateway {
    async fn subscribe(
        &self,
        collection: &str,
        order_field: &str,
    ) -> GatewayResult<SnapshotStream> {
        let first = self.fetch(collection, order_field).await?;
        log::info!(
            "Subscribed to {} ({} documents, polling every {:?})",
            collection,
            first.documents.len(),
            self.poll_interval
        );

        let poll = Poll {
            gateway: self.clone(),
            collection: collection.to_string(),
            order_field: order_field.to_string(),
            last: first.documents.clone(),
        };
        let updates = futures::stream::unfold(poll, |mut poll| async move {
            loop {
                tokio::time::sleep(poll.gateway.poll_interval).await;
                match poll.gateway.fetch(&poll.collection, &poll.order_field).await {
                    Ok(snapshot) if snapshot.documents != poll.last => {
                        poll.last = snapshot.documents.clone();
                        return Some((snapshot, poll));
                    }
                    Ok(_) => {}
                    Err(e) => log::warn!("Polling {} failed: {}", poll.collection, e),
                }
            }
        });

        Ok(futures::stream::once(async move { first }).chain(updates).boxed())
    }

    async fn add_record(&self, collection: &str, fields: Fields) -> GatewayResult<RecordId> {
        let url = self.collection_url(collection);
        let text = self.send(Method::POST, "POST", &url, Some(&fields), &[]).await?;
        let created: Created =
            serde_json::from_str(&text).map_err(|source| GatewayError::Decode { url, source })?;
        log::debug!("Added {}/{}", collection, created.id);
        Ok(created.id)
    }

    async fn update_record(&self, collection: &str, id: &str, fields: Fields) -> GatewayResult<()> {
        let url = self.document_url(collection, id);
        self.send(Method::PATCH, "PATCH", &url, Some(&fields), &[])
            .await
            .map_err(|e| not_found(e, collection, id))?;
        Ok(())
    }

    async fn delete_record(&self, collection: &str, id: &str) -> GatewayResult<()> {
        let url = self.document_url(collection, id);
        self.send(Method::DELETE, "DELETE", &url, None, &[])
            .await
            .map_err(|e| not_found(e, collection, id))?;
        Ok(())
    }
}

fn not_found(e: GatewayError, collection: &str, id: &str) -> GatewayError {
    match e {
        GatewayError::Status { status, .. } if status == reqwest::StatusCode::NOT_FOUND => {
            GatewayError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            }
        }
        other => other,
    }
}
