//! Fixed-layout text rendering of normalized profile records

use std::fmt::Write;

const RULE: &str = "-------------------------";
const ITEM_RULE: &str = "----------------------";
const INDENT: &str = "    ";

/// Text substituted for every field the API left out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholders {
    pub unknown_user: String,
    pub unknown_id: String,
    pub no_bio: String,
    pub no_pronouns: String,
    pub no_nitro: String,
    pub not_a_holder: String,
    pub no_legacy_username: String,
    pub no_name: String,
    pub unknown_platform: String,
    pub no_mutual_friends: String,
    pub no_mutual_guilds: String,
    pub no_connected_accounts: String,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self {
            unknown_user: "Unknown User".to_string(),
            unknown_id: "Unknown ID".to_string(),
            no_bio: "No bio!".to_string(),
            no_pronouns: "No pronouns".to_string(),
            no_nitro: "User Doesn't Have Any Nitro!".to_string(),
            not_a_holder: "Not A Nitro Holder".to_string(),
            no_legacy_username: "No Legacy Username".to_string(),
            no_name: "No Name".to_string(),
            unknown_platform: "UNKNOWN".to_string(),
            no_mutual_friends: "No Mutual Friends".to_string(),
            no_mutual_guilds: "No Mutual Guilds".to_string(),
            no_connected_accounts: "No Connected Accounts".to_string(),
        }
    }
}

impl Placeholders {
    /// Placeholder for a missing avatar or banner
    pub fn no_asset(kind: &str) -> String {
        format!("No {kind}")
    }
}

/// One entry of a list section as `key: value` lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub lines: Vec<(&'static str, String)>,
}

/// A profile with every display field resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRecord {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub pronouns: String,
    pub bio: String,
    pub nitro: String,
    pub nitro_since: String,
    pub avatar: String,
    pub banner: String,
    pub legacy_username: String,
    pub mutual_friends: Vec<ListItem>,
    pub mutual_guilds: Vec<ListItem>,
    pub connected_accounts: Vec<ListItem>,
}

pub struct ReportFormatter {
    placeholders: Placeholders,
}

impl ReportFormatter {
    pub fn new(placeholders: Placeholders) -> Self {
        Self { placeholders }
    }

    pub fn placeholders(&self) -> &Placeholders {
        &self.placeholders
    }

    pub fn format(&self, record: &ProfileRecord) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.write_record(&mut out, record);
        out
    }

    fn write_record(&self, out: &mut String, record: &ProfileRecord) -> std::fmt::Result {
        writeln!(out)?;
        writeln!(out, "{RULE}{}{RULE}", record.username)?;
        writeln!(out, "Name: {}", record.username)?;
        writeln!(out, "ID: {}", record.id)?;
        writeln!(out, "Display Name: {}", record.display_name)?;
        writeln!(out, "Pronouns: {}", record.pronouns)?;
        writeln!(out, "Bio: {}", record.bio)?;
        writeln!(out, "Nitro: {}", record.nitro)?;
        writeln!(out, "Nitro Since: {}", record.nitro_since)?;
        writeln!(out, "Avatar: {}", record.avatar)?;
        writeln!(out, "Banner: {}", record.banner)?;
        writeln!(out, "Legacy Username: {}", record.legacy_username)?;

        self.write_section(
            out,
            "Mutual Friends",
            &record.mutual_friends,
            &self.placeholders.no_mutual_friends,
        )?;
        self.write_section(
            out,
            "Mutual Guilds",
            &record.mutual_guilds,
            &self.placeholders.no_mutual_guilds,
        )?;
        self.write_section(
            out,
            "Connected Accounts",
            &record.connected_accounts,
            &self.placeholders.no_connected_accounts,
        )
    }

    fn write_section(
        &self,
        out: &mut String,
        title: &str,
        items: &[ListItem],
        empty: &str,
    ) -> std::fmt::Result {
        writeln!(out, "{RULE}{title}{RULE}")?;
        writeln!(out, "Total {title}: {}", items.len())?;
        writeln!(out, "{title}:")?;
        writeln!(out, "{ITEM_RULE}")?;

        if items.is_empty() {
            writeln!(out, "{INDENT}{empty}")?;
        } else {
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    writeln!(out, "{ITEM_RULE}")?;
                }
                for (key, value) in &item.lines {
                    writeln!(out, "{INDENT}{key}: {value}")?;
                }
            }
        }
        writeln!(out)
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new(Placeholders::default())
    }
}
