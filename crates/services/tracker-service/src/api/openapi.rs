//! OpenAPI documentation.

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use domain::pagination::{BookmarkPage, BugPage, ProjectPage, TagPage, UserPage};
use domain::{
    Bookmark, BookmarkInput, Bug, BugInput, Lookup, LookupInput, LookupKind, Project,
    ProjectInput, ProjectStats, Tag, TagInput, User, UserInput, UserProfile, UserRole,
};

use super::handlers::{
    auth_handler, bookmark_handler, bug_handler, lookup_handler, project_handler, tag_handler,
    user_handler,
};
use super::handlers::auth_handler::LoginRequest;
use super::handlers::bug_handler::CountResponse;
use crate::service::TokenResponse;

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        auth_handler::register,
        auth_handler::login,
        bug_handler::list_bugs,
        bug_handler::save_bug,
        bug_handler::count_bugs,
        bug_handler::get_bug,
        bug_handler::delete_bug,
        bug_handler::change_bug_status,
        project_handler::list_projects,
        project_handler::save_project,
        project_handler::project_options,
        project_handler::get_project,
        project_handler::delete_project,
        project_handler::list_project_bugs,
        project_handler::project_stats,
        user_handler::list_users,
        user_handler::save_user,
        user_handler::get_profile,
        user_handler::get_user,
        user_handler::delete_user,
        tag_handler::list_tags,
        tag_handler::save_tag,
        tag_handler::get_tag,
        tag_handler::delete_tag,
        bookmark_handler::list_bookmarks,
        bookmark_handler::save_bookmark,
        bookmark_handler::get_bookmark,
        bookmark_handler::delete_bookmark,
        lookup_handler::list_lookups,
        lookup_handler::save_lookup,
        lookup_handler::delete_lookup,
    ),
    components(
        schemas(
            LoginRequest,
            TokenResponse,
            CountResponse,
            Bug,
            BugInput,
            BugPage,
            Project,
            ProjectInput,
            ProjectPage,
            ProjectStats,
            User,
            UserInput,
            UserPage,
            UserProfile,
            UserRole,
            Tag,
            TagInput,
            TagPage,
            Bookmark,
            BookmarkInput,
            BookmarkPage,
            Lookup,
            LookupInput,
            LookupKind,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration and login"),
        (name = "Bugs", description = "Bug tracking"),
        (name = "Projects", description = "Projects and their bugs"),
        (name = "Users", description = "Accounts and profiles"),
        (name = "Tags", description = "Tag catalog"),
        (name = "Bookmarks", description = "Shared bookmarks"),
        (name = "Lookups", description = "Types, priorities, statuses and roles"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_paths_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/bugs"));
        assert!(doc.paths.paths.contains_key("/projects/{id}/bugs"));
        assert!(doc.paths.paths.contains_key("/lookups/{kind}/{id}"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.schemas.contains_key("BugPage"));
    }
}
