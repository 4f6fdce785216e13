//! Campaign list filtering, sorting and pagination.
//!
//! [`CampaignQuery`] is the normalized form of the raw query string. Stores
//! either translate it to SQL or evaluate it in memory with
//! [`CampaignQuery::matches`] and [`CampaignQuery::compare`]; both paths must
//! agree.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::campaign::{Campaign, CampaignStatus, Objective};

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided 1-based page number.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}

string_enum! {
    SortField {
        CreatedAt => "createdAt",
        UpdatedAt => "updatedAt",
        Name => "name",
        StartDate => "startDate",
        EndDate => "endDate",
        Budget => "budget",
    }
}

string_enum! {
    SortOrder {
        Asc => "asc",
        Desc => "desc",
    }
}

impl SortField {
    /// Column the field sorts on.
    pub fn column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Name => "name",
            SortField::StartDate => "start_date",
            SortField::EndDate => "end_date",
            SortField::Budget => "budget",
        }
    }
}

impl SortOrder {
    pub fn sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Raw `GET /campaigns` query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignListParams {
    pub status: Option<CampaignStatus>,
    pub objective: Option<Objective>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
}

/// Normalized list query.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignQuery {
    pub status: Option<CampaignStatus>,
    pub objective: Option<Objective>,
    /// Lower-cased, trimmed; `None` when blank.
    pub search: Option<String>,
    pub page: i64,
    pub limit: i64,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl Default for CampaignQuery {
    fn default() -> Self {
        CampaignQuery::from(CampaignListParams::default())
    }
}

impl From<CampaignListParams> for CampaignQuery {
    fn from(params: CampaignListParams) -> Self {
        Self {
            status: params.status,
            objective: params.objective,
            search: params
                .search
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty()),
            page: clamp_page(params.page),
            limit: clamp_limit(params.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE),
            sort_by: params.sort_by.unwrap_or(SortField::CreatedAt),
            sort_order: params.sort_order.unwrap_or(SortOrder::Desc),
        }
    }
}

impl CampaignQuery {
    /// Rows to skip. Saturates, so absurd page numbers yield an empty page.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Filter predicate, excluding the owner and archive scoping the store
    /// applies itself.
    pub fn matches(&self, campaign: &Campaign) -> bool {
        if self.status.is_some_and(|s| s != campaign.status) {
            return false;
        }
        if self.objective.is_some_and(|o| o != campaign.objective) {
            return false;
        }
        match &self.search {
            None => true,
            Some(needle) => [
                Some(campaign.name.as_str()),
                campaign.description.as_deref(),
                campaign.keywords.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(needle.as_str())),
        }
    }

    /// Sort comparator with id as a stable tiebreaker.
    pub fn compare(&self, a: &Campaign, b: &Campaign) -> Ordering {
        let primary = match self.sort_by {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::Name => a.name.cmp(&b.name),
            SortField::StartDate => a.start_date.cmp(&b.start_date),
            SortField::EndDate => a.end_date.cmp(&b.end_date),
            SortField::Budget => a.budget.total_cmp(&b.budget),
        }
        .then_with(|| a.id.cmp(&b.id));
        match self.sort_order {
            SortOrder::Asc => primary,
            SortOrder::Desc => primary.reverse(),
        }
    }
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let pages = if total == 0 { 0 } else { (total + limit - 1) / limit };
        Self {
            page,
            limit,
            total,
            pages,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    /// Slice an already filtered and sorted list.
    pub fn from_sorted(all: Vec<T>, query: &CampaignQuery) -> Self {
        let total = all.len() as i64;
        let items = all
            .into_iter()
            .skip(usize::try_from(query.offset()).unwrap_or(usize::MAX))
            .take(query.limit as usize)
            .collect();
        Self {
            items,
            pagination: Pagination::new(query.page, query.limit, total),
        }
    }
}
