use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{ApiError, Result};

/// One page of a list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub num_pages: i64,
    pub total: i64,
}

impl<T> Paginated<T> {
    pub fn map<U, F>(self, f: F) -> Paginated<U>
    where
        F: FnMut(T) -> U,
    {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            num_pages: self.num_pages,
            total: self.total,
        }
    }
}

/// Resolved page window over a result set of `total` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: i64,
    pub size: i64,
    pub num_pages: i64,
    pub total: i64,
}

pub fn num_pages(total: i64, page_size: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    total / page_size + i64::from(total % page_size != 0)
}

impl Page {
    /// Resolves the requested page number leniently: anything unparseable or
    /// below 1 is the first page, anything past the end is the last page, and
    /// `last` names the last page explicitly.
    pub fn resolve(requested: Option<&str>, page_size: i64, total: i64) -> Self {
        let size = page_size.max(1);
        let num_pages = num_pages(total, size);
        let last = num_pages.max(1);

        let number = match requested.map(str::trim) {
            Some("last") => last,
            Some(value) => value.parse::<i64>().unwrap_or(1).clamp(1, last),
            None => 1,
        };

        Page {
            number,
            size,
            num_pages,
            total,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.size
    }

    pub fn limit(&self) -> i64 {
        self.size
    }

    pub fn wrap<T>(self, items: Vec<T>) -> Paginated<T> {
        Paginated {
            items,
            num_pages: self.num_pages,
            total: self.total,
        }
    }
}

pub fn page_param(params: &HashMap<String, String>) -> Option<&str> {
    params.get("page").map(String::as_str)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn sql(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvertSortField {
    Id,
    Name,
    Price,
}

impl AdvertSortField {
    pub fn column(&self) -> &'static str {
        match self {
            AdvertSortField::Id => "a.id",
            AdvertSortField::Name => "a.name",
            AdvertSortField::Price => "a.price",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortParam {
    pub field: AdvertSortField,
    pub direction: SortDirection,
}

impl Default for SortParam {
    fn default() -> Self {
        SortParam {
            field: AdvertSortField::Price,
            direction: SortDirection::Descending,
        }
    }
}

/// Filters, ordering and page selection for the advert list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdvertQuery {
    pub page: Option<String>,
    pub sort: SortParam,
    pub category_id: Option<i64>,
    pub text: Option<String>,
    pub location: Option<String>,
    pub price_from: Option<i32>,
    pub price_to: Option<i32>,
    pub is_published: Option<bool>,
}

impl AdvertQuery {
    /// Parse list parameters from the HTTP query string
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self> {
        let sort = match non_blank(params, "ordering") {
            Some(value) => parse_sort_param(value)?,
            None => SortParam::default(),
        };

        Ok(AdvertQuery {
            page: page_param(params).map(str::to_string),
            sort,
            category_id: parse_number(params, "cat")?,
            text: non_blank(params, "text").map(str::to_string),
            location: non_blank(params, "location").map(str::to_string),
            price_from: parse_number(params, "price_from")?,
            price_to: parse_number(params, "price_to")?,
            is_published: parse_bool(params, "is_published")?,
        })
    }
}

fn non_blank<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

fn parse_number<T: std::str::FromStr>(params: &HashMap<String, String>, key: &str) -> Result<Option<T>> {
    non_blank(params, key)
        .map(|value| {
            value.parse::<T>().map_err(|_| {
                ApiError::BadRequest(format!("Invalid value '{}' for parameter '{}'", value, key))
            })
        })
        .transpose()
}

fn parse_bool(params: &HashMap<String, String>, key: &str) -> Result<Option<bool>> {
    match non_blank(params, key).map(|v| v.to_ascii_lowercase()) {
        None => Ok(None),
        Some(v) if v == "true" || v == "1" => Ok(Some(true)),
        Some(v) if v == "false" || v == "0" => Ok(Some(false)),
        Some(v) => Err(ApiError::BadRequest(format!(
            "Invalid value '{}' for parameter '{}'",
            v, key
        ))),
    }
}

fn parse_sort_param(value: &str) -> Result<SortParam> {
    let (direction, field_name) = match value.strip_prefix('-') {
        Some(stripped) => (SortDirection::Descending, stripped),
        None => (SortDirection::Ascending, value),
    };

    let field = match field_name {
        "id" => AdvertSortField::Id,
        "name" => AdvertSortField::Name,
        "price" => AdvertSortField::Price,
        other => {
            return Err(ApiError::BadRequest(format!(
                "Unsupported ordering '{}'. Use one of: id, name, price (prefix '-' for descending)",
                other
            )))
        }
    };

    Ok(SortParam { field, direction })
}

/// Escapes LIKE wildcards so user text matches literally
pub fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}
