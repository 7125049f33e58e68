//! DTOs for the `/url` routes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnError, DisplayFromStr, serde_as};
use validator::Validate;

use super::validation::{Validatable, alias_problem, describe, is_web_url};
use crate::domain::entities::{DateSort, Link, LinkFilter, LinkPage};
use crate::error::AppError;

/// Default and maximum page size of a listing.
pub const MAX_LIST_LIMIT: i64 = 100;

/// Body of `POST /url/create_url` and `POST /url/guest`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateUrlPayload {
    #[validate(url(message = "originalUrl must be a valid url"))]
    pub original_url: String,

    /// Empty or absent means "generate one".
    #[serde(default)]
    pub alias: Option<String>,
}

impl Validatable for CreateUrlPayload {
    fn validate_payload(&self) -> Option<String> {
        if let Err(errors) = self.validate() {
            return Some(describe(&errors));
        }
        if !is_web_url(&self.original_url) {
            return Some("originalUrl must be an http or https url".to_string());
        }
        self.alias
            .as_deref()
            .filter(|a| !a.is_empty())
            .and_then(alias_problem)
    }
}

/// Body of `POST /url/check_alias`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckAliasPayload {
    pub alias: String,
}

impl Validatable for CheckAliasPayload {
    fn validate_payload(&self) -> Option<String> {
        alias_problem(&self.alias)
    }
}

/// Query of `GET /url/get_urls`.
///
/// Unparseable numbers fall back to their defaults instead of failing.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct ListUrlsQuery {
    #[serde(default)]
    pub query: Option<String>,

    /// `1` lists oldest first; anything else newest first.
    #[serde_as(as = "DefaultOnError<Option<DisplayFromStr>>")]
    #[serde(default)]
    pub date_sort: Option<i32>,

    #[serde_as(as = "DefaultOnError<Option<DisplayFromStr>>")]
    #[serde(default)]
    pub limit: Option<i64>,

    #[serde_as(as = "DefaultOnError<Option<DisplayFromStr>>")]
    #[serde(default)]
    pub skip: Option<i64>,
}

impl ListUrlsQuery {
    pub fn into_filter(self) -> LinkFilter {
        let limit = match self.limit {
            Some(l) if l > 0 => l.min(MAX_LIST_LIMIT),
            _ => MAX_LIST_LIMIT,
        };
        let sort = match self.date_sort {
            Some(1) => DateSort::Oldest,
            _ => DateSort::Newest,
        };
        let search = self
            .query
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());

        LinkFilter {
            search,
            sort,
            limit,
            skip: self.skip.unwrap_or(0).max(0),
        }
    }
}

/// Query of `DELETE /url/delete_urls`.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteUrlsQuery {
    #[serde(default)]
    pub url: Option<String>,
}

impl DeleteUrlsQuery {
    /// Parses `url=1,2,3`. One bad id rejects the whole request.
    pub fn ids(&self) -> Result<Vec<i64>, AppError> {
        let ids = self
            .url
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<i64>()
                    .map_err(|_| AppError::bad_request("invalid url id"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if ids.is_empty() {
            return Err(AppError::bad_request("one url id must be provided"));
        }
        Ok(ids)
    }
}

/// Query of `GET /url/redirect`.
#[derive(Debug, Default, Deserialize)]
pub struct RedirectQuery {
    #[serde(default)]
    pub alias: Option<String>,
}

/// A stored link as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub id: i64,
    pub user_id: Option<i64>,
    pub original_url: String,
    pub alias: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Link> for LinkResponse {
    fn from(link: Link) -> Self {
        Self {
            id: link.id,
            user_id: link.owner_id,
            original_url: link.original_url,
            alias: link.alias,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub data: Vec<LinkResponse>,
    pub total: i64,
}

impl From<LinkPage> for LinkListResponse {
    fn from(page: LinkPage) -> Self {
        Self {
            data: page.links.into_iter().map(LinkResponse::from).collect(),
            total: page.total,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::Uri;

    fn create(json: &str) -> Result<CreateUrlPayload, serde_json::Error> {
        serde_json::from_str(json)
    }

    fn list_query(uri: &str) -> ListUrlsQuery {
        let uri: Uri = uri.parse().unwrap();
        Query::<ListUrlsQuery>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn test_create_payload_valid() {
        let payload = create(r#"{"originalUrl":"https://example.com"}"#).unwrap();
        assert_eq!(payload.validate_payload(), None);
        assert!(payload.alias.is_none());

        let payload = create(r#"{"originalUrl":"https://example.com","alias":"Huixyk"}"#).unwrap();
        assert_eq!(payload.validate_payload(), None);
    }

    #[test]
    fn test_create_payload_empty_alias_is_absent() {
        let payload = create(r#"{"originalUrl":"https://example.com","alias":""}"#).unwrap();
        assert_eq!(payload.validate_payload(), None);
    }

    #[test]
    fn test_create_payload_rejects_unknown_fields() {
        assert!(create(r#"{"originalUrl":"https://example.com","user":"x"}"#).is_err());
        assert!(create(r#"{"alias":"abc"}"#).is_err());
    }

    #[test]
    fn test_create_payload_invalid_url() {
        let payload = create(r#"{"originalUrl":"not a url"}"#).unwrap();
        assert_eq!(
            payload.validate_payload().as_deref(),
            Some("originalUrl must be a valid url")
        );

        let payload = create(r#"{"originalUrl":"ftp://example.com/file"}"#).unwrap();
        assert!(payload.validate_payload().is_some());
    }

    #[test]
    fn test_create_payload_alias_rule() {
        let payload = create(r#"{"originalUrl":"https://example.com","alias":"ab"}"#).unwrap();
        assert!(payload.validate_payload().unwrap().contains("3 and 8"));

        let payload =
            create(r#"{"originalUrl":"https://example.com","alias":"toolongalias"}"#).unwrap();
        assert!(payload.validate_payload().is_some());
    }

    #[test]
    fn test_check_alias_payload() {
        let payload: CheckAliasPayload = serde_json::from_str(r#"{"alias":"abc"}"#).unwrap();
        assert_eq!(payload.validate_payload(), None);

        let payload: CheckAliasPayload = serde_json::from_str(r#"{"alias":""}"#).unwrap();
        assert!(payload.validate_payload().is_some());
    }

    #[test]
    fn test_list_query_defaults() {
        let filter = list_query("/url/get_urls").into_filter();

        assert_eq!(filter.limit, MAX_LIST_LIMIT);
        assert_eq!(filter.skip, 0);
        assert_eq!(filter.sort, DateSort::Newest);
        assert_eq!(filter.search, None);
    }

    #[test]
    fn test_list_query_values() {
        let filter = list_query("/url/get_urls?query=%20docs%20&date_sort=1&limit=20&skip=40")
            .into_filter();

        assert_eq!(filter.search.as_deref(), Some("docs"));
        assert_eq!(filter.sort, DateSort::Oldest);
        assert_eq!(filter.limit, 20);
        assert_eq!(filter.skip, 40);
    }

    #[test]
    fn test_list_query_bad_numbers_fall_back() {
        let filter = list_query("/url/get_urls?date_sort=x&limit=abc&skip=-3").into_filter();

        assert_eq!(filter.sort, DateSort::Newest);
        assert_eq!(filter.limit, MAX_LIST_LIMIT);
        assert_eq!(filter.skip, 0);

        let filter = list_query("/url/get_urls?limit=5000&date_sort=-1").into_filter();
        assert_eq!(filter.limit, MAX_LIST_LIMIT);
        assert_eq!(filter.sort, DateSort::Newest);
    }

    #[test]
    fn test_delete_urls_ids() {
        let query = DeleteUrlsQuery {
            url: Some("1, 2,,3".to_string()),
        };
        assert_eq!(query.ids().unwrap(), vec![1, 2, 3]);

        let query = DeleteUrlsQuery {
            url: Some("1,abc".to_string()),
        };
        assert_eq!(query.ids(), Err(AppError::bad_request("invalid url id")));

        assert_eq!(
            DeleteUrlsQuery::default().ids(),
            Err(AppError::bad_request("one url id must be provided"))
        );
    }

    #[test]
    fn test_link_response_is_camel_case() {
        let now = Utc::now();
        let link = Link::new(
            1,
            Some(2),
            "https://example.com".to_string(),
            "abc".to_string(),
            now,
            now,
        );

        let json = serde_json::to_value(LinkResponse::from(link)).unwrap();
        assert_eq!(json["originalUrl"], "https://example.com");
        assert_eq!(json["userId"], 2);
        assert!(json.get("createdAt").is_some());
    }
}
