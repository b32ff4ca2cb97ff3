//! Query specifications: which rows, in what order.
//!
//! A `QuerySpec` is built from raw caller input without touching storage.
//! Sort fields are resolved against a per-entity whitelist and filters are
//! closed enums, so raw strings never reach the query builder.

use std::fmt::Debug;

use serde::Deserialize;

use crate::constants::{
    BACK_END_TYPES, FRONT_END_TYPES, IMPORTANT_PRIORITIES, STATUS_CLOSED, STATUS_OPEN,
    URGENT_PRIORITIES,
};

/// User identifier
pub type UserId = i32;

/// Which owners' rows a query may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerScope {
    /// Only rows owned by this user
    Owner(UserId),
    /// All rows (administrators)
    Unrestricted,
}

impl OwnerScope {
    pub fn owner(&self) -> Option<UserId> {
        match self {
            OwnerScope::Owner(id) => Some(*id),
            OwnerScope::Unrestricted => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Unknown or absent input sorts ascending.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }
}

/// A sortable column whitelist for one entity.
pub trait SortKey: Copy + Eq + Debug + Send + Sync + 'static {
    /// Map a raw field name to a whitelisted key.
    fn parse(raw: &str) -> Option<Self>;

    /// Ordering applied when no valid field was requested.
    fn default_order() -> Vec<(Self, SortDirection)>;
}

/// Resolved ORDER BY terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering<K> {
    terms: Vec<(K, SortDirection)>,
}

impl<K: SortKey> Ordering<K> {
    /// Whitelisted field: that field in the requested direction.
    /// Absent or unknown field: the entity default.
    pub fn resolve(field: Option<&str>, direction: Option<&str>) -> Self {
        match field.and_then(|f| K::parse(f.trim())) {
            Some(key) => Self {
                terms: vec![(key, SortDirection::parse(direction))],
            },
            None => Self::default_order(),
        }
    }

    pub fn default_order() -> Self {
        Self {
            terms: K::default_order(),
        }
    }

    pub fn terms(&self) -> &[(K, SortDirection)] {
        &self.terms
    }

    pub fn is_default(&self) -> bool {
        self.terms == K::default_order()
    }
}

// =============================================================================
// Sort whitelists
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BugSortKey {
    Name,
    StartDate,
    EndDate,
    Priority,
    Status,
    Type,
}

impl SortKey for BugSortKey {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "name" => Some(Self::Name),
            "startDate" | "start_date" => Some(Self::StartDate),
            "endDate" | "end_date" => Some(Self::EndDate),
            "priority" => Some(Self::Priority),
            "status" => Some(Self::Status),
            "type" => Some(Self::Type),
            _ => None,
        }
    }

    /// Open bugs first, most recently closed next, most urgent first within each.
    fn default_order() -> Vec<(Self, SortDirection)> {
        vec![
            (Self::Status, SortDirection::Asc),
            (Self::EndDate, SortDirection::Desc),
            (Self::Priority, SortDirection::Asc),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectSortKey {
    Name,
    StartDate,
    EndDate,
}

impl SortKey for ProjectSortKey {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "name" => Some(Self::Name),
            "startDate" | "start_date" => Some(Self::StartDate),
            "endDate" | "end_date" => Some(Self::EndDate),
            _ => None,
        }
    }

    fn default_order() -> Vec<(Self, SortDirection)> {
        vec![(Self::Name, SortDirection::Asc)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSortKey {
    Login,
    Role,
}

impl SortKey for UserSortKey {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "login" => Some(Self::Login),
            "role" => Some(Self::Role),
            _ => None,
        }
    }

    fn default_order() -> Vec<(Self, SortDirection)> {
        vec![(Self::Login, SortDirection::Asc)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagSortKey {
    Name,
}

impl SortKey for TagSortKey {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "name" => Some(Self::Name),
            _ => None,
        }
    }

    fn default_order() -> Vec<(Self, SortDirection)> {
        vec![(Self::Name, SortDirection::Asc)]
    }
}

/// Bookmarks are always listed by title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkSortKey {
    Title,
}

impl SortKey for BookmarkSortKey {
    fn parse(_raw: &str) -> Option<Self> {
        None
    }

    fn default_order() -> Vec<(Self, SortDirection)> {
        vec![(Self::Title, SortDirection::Asc)]
    }
}

// =============================================================================
// Bug filters
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriorityFilter {
    #[default]
    All,
    Important,
    Urgent,
}

impl PriorityFilter {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("important") => Self::Important,
            Some("urgent") => Self::Urgent,
            _ => Self::All,
        }
    }

    /// Priority ids to match, `None` for no restriction.
    pub fn priority_ids(&self) -> Option<&'static [i32]> {
        match self {
            Self::All => None,
            Self::Important => Some(IMPORTANT_PRIORITIES),
            Self::Urgent => Some(URGENT_PRIORITIES),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Open,
    Closed,
}

impl StatusFilter {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("open") => Self::Open,
            Some("closed") => Self::Closed,
            _ => Self::All,
        }
    }

    pub fn status_id(&self) -> Option<i32> {
        match self {
            Self::All => None,
            Self::Open => Some(STATUS_OPEN),
            Self::Closed => Some(STATUS_CLOSED),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    FrontEnd,
    BackEnd,
}

impl CategoryFilter {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("front-end") => Self::FrontEnd,
            Some("back-end") => Self::BackEnd,
            _ => Self::All,
        }
    }

    pub fn type_ids(&self) -> Option<&'static [i32]> {
        match self {
            Self::All => None,
            Self::FrontEnd => Some(FRONT_END_TYPES),
            Self::BackEnd => Some(BACK_END_TYPES),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BugFilters {
    pub priority: PriorityFilter,
    pub status: StatusFilter,
    pub category: CategoryFilter,
    /// Restrict to one project's bugs
    pub project_id: Option<i32>,
}

impl BugFilters {
    pub fn from_params(params: &ListParams) -> Self {
        Self {
            priority: PriorityFilter::parse(params.priority.as_deref()),
            status: StatusFilter::parse(params.status.as_deref()),
            category: CategoryFilter::parse(params.category.as_deref()),
            project_id: None,
        }
    }
}

// =============================================================================
// Specification
// =============================================================================

/// Raw list parameters as submitted. Every field is optional and unvalidated.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct ListParams {
    pub page: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
}

/// Which rows, in what order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec<K, F> {
    pub scope: OwnerScope,
    pub ordering: Ordering<K>,
    pub filters: F,
}

impl<K: SortKey, F: Default> QuerySpec<K, F> {
    /// Scope plus resolved ordering, no filters.
    pub fn from_sort(scope: OwnerScope, params: &ListParams) -> Self {
        Self {
            scope,
            ordering: Ordering::resolve(params.sort.as_deref(), params.direction.as_deref()),
            filters: F::default(),
        }
    }
}

pub type BugQuery = QuerySpec<BugSortKey, BugFilters>;
pub type ProjectQuery = QuerySpec<ProjectSortKey, ()>;
pub type UserQuery = QuerySpec<UserSortKey, ()>;
pub type TagQuery = QuerySpec<TagSortKey, ()>;
pub type BookmarkQuery = QuerySpec<BookmarkSortKey, ()>;

impl BugQuery {
    pub fn from_params(scope: OwnerScope, params: &ListParams) -> Self {
        Self {
            scope,
            ordering: Ordering::resolve(params.sort.as_deref(), params.direction.as_deref()),
            filters: BugFilters::from_params(params),
        }
    }

    /// Same query restricted to one project.
    pub fn for_project(mut self, project_id: i32) -> Self {
        self.filters.project_id = Some(project_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(sort: Option<&str>, direction: Option<&str>) -> ListParams {
        ListParams {
            sort: sort.map(String::from),
            direction: direction.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_whitelisted_field_is_used() {
        let ordering = Ordering::<BugSortKey>::resolve(Some("priority"), Some("desc"));
        assert_eq!(ordering.terms(), &[(BugSortKey::Priority, SortDirection::Desc)]);
        assert!(!ordering.is_default());
    }

    #[test]
    fn test_unknown_field_falls_back_to_default() {
        for field in [Some("password"), Some("name; DROP TABLE bugs"), Some(""), None] {
            let ordering = Ordering::<BugSortKey>::resolve(field, Some("desc"));
            assert!(ordering.is_default(), "{:?}", field);
            assert_eq!(
                ordering.terms(),
                &[
                    (BugSortKey::Status, SortDirection::Asc),
                    (BugSortKey::EndDate, SortDirection::Desc),
                    (BugSortKey::Priority, SortDirection::Asc),
                ]
            );
        }
    }

    #[test]
    fn test_unknown_direction_is_ascending() {
        assert_eq!(SortDirection::parse(Some("sideways")), SortDirection::Asc);
        assert_eq!(SortDirection::parse(Some("DESC")), SortDirection::Desc);
        assert_eq!(SortDirection::parse(None), SortDirection::Asc);
    }

    #[test]
    fn test_camel_and_snake_case_date_fields() {
        assert_eq!(BugSortKey::parse("startDate"), Some(BugSortKey::StartDate));
        assert_eq!(BugSortKey::parse("end_date"), Some(BugSortKey::EndDate));
        assert_eq!(ProjectSortKey::parse("endDate"), Some(ProjectSortKey::EndDate));
    }

    #[test]
    fn test_bookmarks_ignore_requested_sort() {
        let spec = BookmarkQuery::from_sort(OwnerScope::Unrestricted, &params(Some("url"), Some("desc")));
        assert_eq!(spec.ordering.terms(), &[(BookmarkSortKey::Title, SortDirection::Asc)]);
    }

    #[test]
    fn test_filters_parse_closed_sets() {
        let raw = ListParams {
            priority: Some("urgent".into()),
            status: Some("closed".into()),
            category: Some("back-end".into()),
            ..Default::default()
        };
        let spec = BugQuery::from_params(OwnerScope::Owner(3), &raw).for_project(9);

        assert_eq!(spec.filters.priority.priority_ids(), Some(&[1][..]));
        assert_eq!(spec.filters.status.status_id(), Some(STATUS_CLOSED));
        assert_eq!(spec.filters.category.type_ids(), Some(&[3, 4][..]));
        assert_eq!(spec.filters.project_id, Some(9));
        assert_eq!(spec.scope.owner(), Some(3));
    }

    #[test]
    fn test_invalid_filters_mean_all() {
        let raw = ListParams {
            priority: Some("whenever".into()),
            status: Some("1".into()),
            category: Some("duty".into()),
            ..Default::default()
        };
        let filters = BugFilters::from_params(&raw);
        assert_eq!(filters, BugFilters::default());
        assert_eq!(filters.priority.priority_ids(), None);
        assert_eq!(filters.category.type_ids(), None);
    }

    #[test]
    fn test_important_includes_urgent() {
        assert_eq!(PriorityFilter::Important.priority_ids(), Some(&[1, 2][..]));
    }
}
