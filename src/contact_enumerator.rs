//! Contact enumeration from the private channel list

use crate::error::FetchError;
use crate::rate_limited_fetcher::RateLimitedFetcher;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, error, info};

/// A non-bot user sharing a private channel with the account owner
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Contact {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default, rename = "bot", deserialize_with = "null_as_default")]
    pub is_bot: bool,
}

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Contact {
    /// Name used in status messages
    pub fn label(&self) -> &str {
        [self.global_name.as_deref(), Some(self.username.as_str())]
            .into_iter()
            .flatten()
            .find(|name| !name.is_empty())
            .unwrap_or(&self.id)
    }
}

pub struct ContactEnumerator<'a> {
    fetcher: &'a RateLimitedFetcher,
}

impl<'a> ContactEnumerator<'a> {
    pub fn new(fetcher: &'a RateLimitedFetcher) -> Self {
        Self { fetcher }
    }

    /// Every non-bot recipient of every private channel, in response order.
    /// Recipients shared by several channels appear once per channel.
    pub async fn enumerate(&self) -> Result<Vec<Contact>, FetchError> {
        let url = self.fetcher.config().channels_url();
        let channels = match self.fetcher.fetch(&url, &[], "channel list").await {
            Ok(channels) => channels,
            Err(e) => {
                error!("Unable to get users (friends or DM channels): {}", e);
                return Err(e);
            }
        };

        let contacts = contacts_from_channels(&channels);
        info!("Found {} contacts", contacts.len());
        Ok(contacts)
    }
}

/// Flatten channel recipients, dropping bots and unreadable entries
pub fn contacts_from_channels(channels: &Value) -> Vec<Contact> {
    let Some(channels) = channels.as_array() else {
        debug!("Channel list was not an array");
        return Vec::new();
    };

    channels
        .iter()
        .filter_map(|channel| channel.get("recipients").and_then(Value::as_array))
        .flatten()
        .filter_map(
            |recipient| match serde_json::from_value::<Contact>(recipient.clone()) {
                Ok(contact) => Some(contact),
                Err(e) => {
                    debug!("Skipping unreadable recipient: {}", e);
                    None
                }
            },
        )
        .filter(|contact| !contact.is_bot)
        .collect()
}
