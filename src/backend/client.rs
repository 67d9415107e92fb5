use reqwest::{Client, Response};
use tracing::{debug, error, info};
use url::Url;

use super::payload::{AddressPayload, AddressRecord};
use crate::error::BackendError;

/// Client for the user address-book service.
#[derive(Debug, Clone)]
pub struct AddressBookClient {
    base_url: Url,
    client: Client,
}

impl AddressBookClient {
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: &str, client: Client) -> Result<Self, BackendError> {
        let mut base_url = Url::parse(base_url)?;
        // Keep the last path segment when joining.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { base_url, client })
    }

    pub fn addresses_url(&self, user_id: &str) -> Result<Url, BackendError> {
        self.url(&["users", user_id, "addresses"])
    }

    pub fn address_url(&self, user_id: &str, address_id: &str) -> Result<Url, BackendError> {
        self.url(&["users", user_id, "addresses", address_id])
    }

    fn url(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<AddressRecord>, BackendError> {
        let url = self.addresses_url(user_id)?;
        let response = check(self.client.get(url).send().await?).await?;
        let records: Vec<AddressRecord> = response.json().await?;
        debug!("Fetched {} addresses for user {}", records.len(), user_id);
        Ok(records)
    }

    pub async fn create(
        &self,
        user_id: &str,
        payload: &AddressPayload,
    ) -> Result<AddressRecord, BackendError> {
        let url = self.addresses_url(user_id)?;
        let response = check(self.client.post(url).json(payload).send().await?).await?;
        let record: AddressRecord = response.json().await?;
        info!("Created address {} for user {}", record.id, user_id);
        Ok(record)
    }

    pub async fn update(
        &self,
        user_id: &str,
        address_id: &str,
        payload: &AddressPayload,
    ) -> Result<AddressRecord, BackendError> {
        let url = self.address_url(user_id, address_id)?;
        let response = check(self.client.put(url).json(payload).send().await?).await?;
        let record: AddressRecord = response.json().await?;
        info!("Updated address {} for user {}", address_id, user_id);
        Ok(record)
    }

    pub async fn delete(&self, user_id: &str, address_id: &str) -> Result<(), BackendError> {
        let url = self.address_url(user_id, address_id)?;
        check(self.client.delete(url).send().await?).await?;
        info!("Deleted address {} for user {}", address_id, user_id);
        Ok(())
    }
}

async fn check(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    error!("Address book request failed with {}: {}", status, body);
    Err(BackendError::Status {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_keep_base_path() {
        let client = AddressBookClient::new("https://api.example.com/v2").unwrap();
        assert_eq!(
            client.addresses_url("u1").unwrap().as_str(),
            "https://api.example.com/v2/users/u1/addresses"
        );
        assert_eq!(
            client.address_url("u1", "a9").unwrap().as_str(),
            "https://api.example.com/v2/users/u1/addresses/a9"
        );
    }

    #[test]
    fn test_segments_are_escaped() {
        let client = AddressBookClient::new("https://api.example.com/").unwrap();
        assert_eq!(
            client.address_url("u 1", "a/9").unwrap().as_str(),
            "https://api.example.com/users/u%201/addresses/a%2F9"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            AddressBookClient::new("not a url"),
            Err(BackendError::Url(_))
        ));
    }
}
