//! JSON REST API for the accreditation records store.
//!
//! Exposes an axum [`Router`] backed by any
//! [`abet_core::store::AccreditationStore`]. Every route except `/auth/*`
//! requires a bearer access token. TLS and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", abet_api::api_router(state))
//! ```

pub mod auth;
pub mod checklist;
pub mod courses;
pub mod error;
pub mod evidence;
pub mod extract;
pub mod faculty;
pub mod outcomes;
pub mod programs;
pub mod sections;

use std::sync::Arc;

use abet_core::store::AccreditationStore;
use axum::{
  Router, middleware,
  routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

pub use auth::AuthConfig;
pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub store: Arc<S>,
  pub auth:  Arc<AuthConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), auth: Arc::clone(&self.auth) }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: AccreditationStore + 'static,
{
  let public = Router::new()
    .route("/auth/login", post(auth::login::<S>))
    .route("/auth/refresh", post(auth::refresh::<S>));

  let protected = Router::new()
    // Programs and cycles
    .route("/programs", get(programs::list::<S>).post(programs::create::<S>))
    .route(
      "/programs/{id}",
      get(programs::get_one::<S>).put(programs::update::<S>).delete(programs::delete::<S>),
    )
    .route(
      "/programs/{id}/cycles",
      get(programs::list_cycles::<S>).post(programs::create_cycle::<S>),
    )
    .route(
      "/cycles/{id}",
      get(programs::get_cycle::<S>)
        .put(programs::update_cycle::<S>)
        .delete(programs::delete_cycle::<S>),
    )
    // Checklist
    .route("/cycles/{id}/checklist", get(checklist::cycle_checklist::<S>))
    .route("/checklist-items", get(checklist::list::<S>).post(checklist::create::<S>))
    .route(
      "/checklist-items/{id}",
      get(checklist::get_one::<S>).put(checklist::update::<S>).delete(checklist::delete::<S>),
    )
    // Evidence
    .route("/cycles/{id}/evidence", get(evidence::list::<S>).post(evidence::create::<S>))
    .route(
      "/evidence/{id}",
      get(evidence::get_one::<S>).put(evidence::update::<S>).delete(evidence::delete::<S>),
    )
    // Section records: background, criterion1..8, appendixa..d
    .route("/cycles/{id}/{section}", get(sections::get_one::<S>).put(sections::update::<S>))
    // Courses and syllabi
    .route(
      "/programs/{id}/courses",
      get(courses::list::<S>).post(courses::create::<S>),
    )
    .route(
      "/programs/{id}/courses/{cid}",
      get(courses::get_one::<S>).put(courses::update::<S>).delete(courses::delete::<S>),
    )
    .route(
      "/programs/{id}/courses/{cid}/sections",
      get(courses::list_sections::<S>).post(courses::create_section::<S>),
    )
    .route(
      "/programs/{id}/courses/{cid}/sections/{sid}/syllabus",
      get(courses::get_syllabus::<S>)
        .put(courses::update_syllabus::<S>)
        .delete(courses::delete_section::<S>),
    )
    // Outcomes and mappings
    .merge(outcomes::routes::<S>())
    .route(
      "/programs/{id}/so-peo-mappings",
      get(outcomes::so_peo::<S>).put(outcomes::replace_so_peo::<S>),
    )
    .route(
      "/courses/{id}/clo-so-mappings",
      get(outcomes::clo_so::<S>).put(outcomes::replace_clo_so::<S>),
    )
    // Faculty
    .route("/faculty", get(faculty::list::<S>).post(faculty::create::<S>))
    .route(
      "/faculty/{id}",
      get(faculty::get_one::<S>).put(faculty::update::<S>).delete(faculty::delete::<S>),
    )
    .route(
      "/faculty/{id}/profile",
      get(faculty::profile::<S>).put(faculty::update_profile::<S>),
    )
    .route("/faculty/{id}/programs", put(faculty::replace_programs::<S>))
    .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_auth::<S>));

  Router::new()
    .merge(public)
    .merge(protected)
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
mod tests;
