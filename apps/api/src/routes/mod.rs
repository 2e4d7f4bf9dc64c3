pub mod health;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::editor::handlers as editor;
use crate::profiles::handlers as profiles;
use crate::state::AppState;
use crate::versions::handlers as versions;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Editor sessions, undo/redo
        .route(
            "/api/v1/resumes/:id/session",
            post(editor::handle_open_session)
                .get(editor::handle_get_session)
                .delete(editor::handle_close_session),
        )
        .route(
            "/api/v1/resumes/:id/session/template",
            put(editor::handle_set_template),
        )
        .route(
            "/api/v1/resumes/:id/session/style",
            put(editor::handle_set_style),
        )
        .route(
            "/api/v1/resumes/:id/session/user-info",
            put(editor::handle_set_user_info),
        )
        .route(
            "/api/v1/resumes/:id/session/job-info",
            put(editor::handle_set_job_info),
        )
        .route(
            "/api/v1/resumes/:id/session/state",
            put(editor::handle_set_state),
        )
        .route(
            "/api/v1/resumes/:id/session/content",
            put(editor::handle_update_content),
        )
        .route("/api/v1/resumes/:id/session/undo", post(editor::handle_undo))
        .route("/api/v1/resumes/:id/session/redo", post(editor::handle_redo))
        .route(
            "/api/v1/resumes/:id/session/undo-stack",
            get(editor::handle_undo_stack),
        )
        .route(
            "/api/v1/resumes/:id/session/undo-stack/:index/jump",
            post(editor::handle_jump),
        )
        // History panel
        .route(
            "/api/v1/resumes/:id/history",
            get(editor::handle_get_history).delete(editor::handle_clear_history),
        )
        .route(
            "/api/v1/resumes/:id/history/:index/select",
            post(editor::handle_select_history),
        )
        // Versions
        .route(
            "/api/v1/resumes/:id/versions",
            post(versions::handle_save_version)
                .get(versions::handle_list_versions)
                .delete(versions::handle_clear_versions),
        )
        .route(
            "/api/v1/resumes/:id/versions/cleanup",
            post(versions::handle_cleanup),
        )
        .route(
            "/api/v1/resumes/:id/versions/latest",
            get(versions::handle_latest_version),
        )
        .route(
            "/api/v1/resumes/:id/versions/compare",
            get(versions::handle_compare),
        )
        .route(
            "/api/v1/resumes/:id/versions/:version_id",
            patch(versions::handle_update_label)
                .delete(versions::handle_delete_version),
        )
        .route(
            "/api/v1/resumes/:id/versions/:version_id/restore",
            post(versions::handle_restore_version),
        )
        // Profiles
        .route("/api/v1/profiles", post(profiles::handle_create_profile))
        .route(
            "/api/v1/profiles/:id",
            get(profiles::handle_get_profile)
                .put(profiles::handle_update_profile)
                .delete(profiles::handle_delete_profile),
        )
        .route(
            "/api/v1/profiles/:id/preview",
            post(profiles::handle_preview_merge),
        )
        .route(
            "/api/v1/resumes/:id/profile-link",
            put(profiles::handle_set_link)
                .get(profiles::handle_get_link)
                .delete(profiles::handle_remove_link),
        )
        .route(
            "/api/v1/resumes/:id/merged-content",
            get(profiles::handle_merged_content),
        )
        .with_state(state)
}
