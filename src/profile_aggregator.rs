//! Profile Aggregator - Normalizes raw profile payloads into report blocks
//!
//! Every field is read leniently: a missing, null or wrongly typed value
//! degrades to its placeholder instead of failing the profile.

use crate::config::ScraperConfig;
use crate::error::{PipelineError, Stage};
use crate::profile_collector::RawProfile;
use crate::report_formatter::{ListItem, Placeholders, ProfileRecord, ReportFormatter};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::fmt;
use tracing::{debug, info};

/// CDN-hosted image kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Avatar,
    Banner,
}

impl AssetKind {
    fn path(self) -> &'static str {
        match self {
            AssetKind::Avatar => "avatars",
            AssetKind::Banner => "banners",
        }
    }

    fn name(self) -> &'static str {
        match self {
            AssetKind::Avatar => "Avatar",
            AssetKind::Banner => "Banner",
        }
    }
}

/// Rendered text for one successfully fetched profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedProfile {
    pub id: String,
    pub username: String,
    pub block: String,
}

impl fmt::Display for RenderedProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.block)
    }
}

pub struct ProfileAggregator {
    cdn_base: String,
    asset_size: u32,
    formatter: ReportFormatter,
}

impl ProfileAggregator {
    pub fn new(config: &ScraperConfig, formatter: ReportFormatter) -> Self {
        Self {
            cdn_base: config.cdn_base.clone(),
            asset_size: config.asset_size,
            formatter,
        }
    }

    pub fn render(&self, profiles: &[RawProfile]) -> Result<Vec<RenderedProfile>, PipelineError> {
        if profiles.is_empty() {
            return Err(PipelineError::EmptyInput(Stage::Render));
        }

        let total = profiles.len();
        let rendered: Vec<RenderedProfile> = profiles
            .iter()
            .enumerate()
            .map(|(idx, raw)| {
                let record = self.normalize(raw);
                debug!(
                    "Rendering {} [{}] [{}/{}]",
                    record.username,
                    record.id,
                    idx + 1,
                    total
                );
                RenderedProfile {
                    block: self.formatter.format(&record),
                    id: record.id,
                    username: record.username,
                }
            })
            .collect();

        info!(
            "Successfully scraped {} out of {} users",
            rendered.len(),
            total
        );
        Ok(rendered)
    }

    pub fn normalize(&self, raw: &RawProfile) -> ProfileRecord {
        let p = self.formatter.placeholders();
        let profile = raw.value();
        let user = profile.get("user");
        let user_profile = profile.get("user_profile");

        let id = text(user, "id").unwrap_or_else(|| p.unknown_id.clone());
        let username = text(user, "username").unwrap_or_else(|| p.unknown_user.clone());
        let display_name = text(user, "global_name").unwrap_or_else(|| username.clone());

        let bio = text(user, "bio")
            .or_else(|| text(user_profile, "bio"))
            .unwrap_or_else(|| p.no_bio.clone());
        let pronouns = text(user_profile, "pronouns").unwrap_or_else(|| p.no_pronouns.clone());

        let nitro = match profile.get("premium_type").and_then(Value::as_i64) {
            Some(1) => "Nitro Classic".to_string(),
            Some(2) => "Nitro".to_string(),
            _ => p.no_nitro.clone(),
        };
        let nitro_since = text(Some(profile), "premium_since")
            .and_then(|since| format_timestamp(&since))
            .unwrap_or_else(|| p.not_a_holder.clone());

        let avatar = self.asset_url(AssetKind::Avatar, text(user, "avatar").as_deref(), &id);
        let banner = self.asset_url(AssetKind::Banner, text(user, "banner").as_deref(), &id);

        let legacy_username =
            text(Some(profile), "legacy_username").unwrap_or_else(|| p.no_legacy_username.clone());

        let mutual_friends = items(profile, "mutual_friends")
            .map(|friend| ListItem {
                lines: vec![
                    ("ID", text(Some(friend), "id").unwrap_or_else(|| p.unknown_id.clone())),
                    (
                        "Name",
                        text(Some(friend), "global_name")
                            .or_else(|| text(Some(friend), "username"))
                            .unwrap_or_else(|| p.no_name.clone()),
                    ),
                ],
            })
            .collect();

        let mutual_guilds = items(profile, "mutual_guilds")
            .map(|guild| ListItem {
                lines: vec![(
                    "ID",
                    text(Some(guild), "id").unwrap_or_else(|| p.unknown_id.clone()),
                )],
            })
            .collect();

        let connected_accounts = items(profile, "connected_accounts")
            .map(|account| ListItem {
                lines: vec![
                    (
                        "Platform",
                        text(Some(account), "type")
                            .map(|platform| platform.to_uppercase())
                            .unwrap_or_else(|| p.unknown_platform.clone()),
                    ),
                    (
                        "Name",
                        text(Some(account), "name").unwrap_or_else(|| p.no_name.clone()),
                    ),
                ],
            })
            .collect();

        ProfileRecord {
            id,
            username,
            display_name,
            pronouns,
            bio,
            nitro,
            nitro_since,
            avatar,
            banner,
            legacy_username,
            mutual_friends,
            mutual_guilds,
            connected_accounts,
        }
    }

    /// CDN URL for an asset, or the placeholder naming the asset kind
    pub fn asset_url(&self, kind: AssetKind, asset_id: Option<&str>, user_id: &str) -> String {
        match asset_id.filter(|id| !id.is_empty()) {
            Some(asset_id) => {
                let ext = if asset_id.starts_with("a_") { "gif" } else { "png" };
                format!(
                    "{}/{}/{}/{}.{}?size={}",
                    self.cdn_base,
                    kind.path(),
                    user_id,
                    asset_id,
                    ext,
                    self.asset_size
                )
            }
            None => Placeholders::no_asset(kind.name()),
        }
    }
}

/// Non-blank string or number at `key`, if any
fn text(object: Option<&Value>, key: &str) -> Option<String> {
    match object?.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Elements of the array at `key`; nothing when missing or not an array
fn items<'v>(profile: &'v Value, key: &str) -> impl Iterator<Item = &'v Value> {
    profile
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

/// Reformat an ISO-8601 timestamp as `YYYY-MM-DD HH:MM:SS` in its own offset
pub fn format_timestamp(raw: &str) -> Option<String> {
    const OUTPUT: &str = "%Y-%m-%d %H:%M:%S";
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.format(OUTPUT).to_string());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, pattern) {
            return Some(dt.format(OUTPUT).to_string());
        }
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(dt.format(OUTPUT).to_string());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.format(OUTPUT).to_string());
    }

    debug!("Unparsable timestamp {:?}", raw);
    None
}
