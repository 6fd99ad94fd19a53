//! Typed helpers for the endpoints a crawl uses
//!
//! Each helper issues one call through [`PlatformApi`] and normalizes the
//! payload; the `parse_*` functions hold the normalization so it can be
//! tested on plain JSON.

use crate::api::{ApiFailure, PlatformApi};
use crate::state::{BioRecord, FollowerRecord};
use serde_json::Value;

/// One page of the follower listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowerPage {
    pub users: Vec<FollowerRecord>,
    /// Continuation token; `None` marks the end of the list
    pub next_cursor: Option<String>,
}

/// Probes the session; returns the authenticated username if the payload has one
pub async fn fetch_current_username<A>(api: &A) -> Result<Option<String>, ApiFailure>
where
    A: PlatformApi + ?Sized,
{
    let data = api
        .call("accounts/current_user/", &[("edit", "true")])
        .await?;
    Ok(parse_current_username(&data))
}

/// Looks up the numeric id of `username`
pub async fn resolve_user_id<A>(api: &A, username: &str) -> Result<String, ApiFailure>
where
    A: PlatformApi + ?Sized,
{
    let data = api
        .call("users/web_profile_info/", &[("username", username)])
        .await?;
    parse_user_id(&data)
}

/// Fetches one page of `user_id`'s followers, starting at `cursor`
pub async fn fetch_follower_page<A>(
    api: &A,
    user_id: &str,
    cursor: Option<&str>,
    page_size: u32,
) -> Result<FollowerPage, ApiFailure>
where
    A: PlatformApi + ?Sized,
{
    let path = format!("friendships/{}/followers/", user_id);
    let count = page_size.to_string();

    let mut query = vec![
        ("count", count.as_str()),
        ("search_surface", "follow_list_page"),
    ];
    if let Some(cursor) = cursor {
        query.push(("max_id", cursor));
    }

    let data = api.call(&path, &query).await?;
    Ok(parse_follower_page(&data))
}

/// Fetches profile details of one account
pub async fn fetch_bio<A>(api: &A, user_id: &str) -> Result<BioRecord, ApiFailure>
where
    A: PlatformApi + ?Sized,
{
    let data = api.call(&format!("users/{}/info/", user_id), &[]).await?;
    Ok(parse_bio(&data))
}

pub fn parse_current_username(data: &Value) -> Option<String> {
    data.pointer("/user/username")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Extracts `data.user.id`; an absent or empty id is an API error
pub fn parse_user_id(data: &Value) -> Result<String, ApiFailure> {
    data.pointer("/data/user/id")
        .map(id_string)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiFailure::ApiError {
            status: 200,
            detail: "No user ID in response".to_string(),
        })
}

pub fn parse_follower_page(data: &Value) -> FollowerPage {
    let users = data
        .get("users")
        .and_then(Value::as_array)
        .map(|users| {
            users
                .iter()
                .map(|u| FollowerRecord {
                    id: u.get("pk").map(id_string).unwrap_or_default(),
                    username: str_field(u, "username"),
                    display_name: str_field(u, "full_name"),
                })
                .collect()
        })
        .unwrap_or_default();

    let next_cursor = data
        .get("next_max_id")
        .map(id_string)
        .filter(|c| !c.is_empty());

    FollowerPage { users, next_cursor }
}

pub fn parse_bio(data: &Value) -> BioRecord {
    let user = data.get("user").unwrap_or(&Value::Null);

    BioRecord {
        biography: str_field(user, "biography"),
        external_url: str_field(user, "external_url"),
        follower_count: u64_field(user, "follower_count"),
        following_count: u64_field(user, "following_count"),
        is_private: bool_field(user, "is_private"),
        is_verified: bool_field(user, "is_verified"),
        category: str_field(user, "category"),
        media_count: u64_field(user, "media_count"),
    }
}

/// Ids and cursors arrive as strings or numbers
fn id_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn u64_field(value: &Value, key: &str) -> u64 {
    value.get(key).and_then(Value::as_u64).unwrap_or(0)
}

fn bool_field(value: &Value, key: &str) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(false)
}
