//! Router tests driven through `tower::ServiceExt::oneshot` against an
//! in-memory `SqliteStore`.

use std::sync::Arc;

use abet_core::{account::is_phc_hash, store::AccreditationStore};
use abet_store_sqlite::SqliteStore;
use axum::{
  Router,
  body::Body,
  http::{Method, Request, StatusCode, header},
};
use chrono::Duration;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{AppState, AuthConfig, api_router};

const ADMIN: &str = "admin@example.edu";
const PASSWORD: &str = "s3cret";

struct TestApp {
  router: Router,
  store:  Arc<SqliteStore>,
}

async fn app() -> TestApp {
  let store = Arc::new(SqliteStore::open_in_memory().await.expect("in-memory store"));
  store
    .upsert_user(ADMIN.into(), PASSWORD.into(), "admin".into())
    .await
    .unwrap();
  let state = AppState {
    store: store.clone(),
    auth:  Arc::new(AuthConfig {
      jwt_secret:  "test-secret".into(),
      access_ttl:  Duration::minutes(5),
      refresh_ttl: Duration::days(1),
      admin_role:  "admin".into(),
    }),
  };
  TestApp { router: api_router(state), store }
}

impl TestApp {
  async fn call(
    &self,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    self.send(method, uri, token, body.map(|value| value.to_string())).await
  }

  /// As [`Self::call`], with the body sent verbatim as `application/json`.
  async fn send(
    &self,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<String>,
  ) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
      req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
      Some(text) => {
        req = req.header(header::CONTENT_TYPE, "application/json");
        Body::from(text)
      }
      None => Body::empty(),
    };
    let res = self.router.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, json)
  }

  async fn login(&self) -> (StatusCode, Value) {
    self
      .call(
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": ADMIN, "password": PASSWORD })),
      )
      .await
  }

  async fn token(&self) -> String {
    let (status, body) = self.login().await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["access"].as_str().unwrap().to_string()
  }

  /// Program and cycle ids of a fresh program with one cycle.
  async fn program_and_cycle(&self, token: &str) -> (i64, i64) {
    let (status, program) = self
      .call(
        Method::POST,
        "/programs",
        Some(token),
        Some(json!({ "program_name": "Mechanical Engineering", "program_level": "Undergraduate" })),
      )
      .await;
    assert_eq!(status, StatusCode::CREATED, "{program}");
    let pid = program["program_id"].as_i64().unwrap();
    let (status, cycle) = self
      .call(
        Method::POST,
        &format!("/programs/{pid}/cycles"),
        Some(token),
        Some(json!({ "start_year": 2025, "end_year": 2031 })),
      )
      .await;
    assert_eq!(status, StatusCode::CREATED, "{cycle}");
    (pid, cycle["cycle_id"].as_i64().unwrap())
  }
}

// ─── Auth ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn login_upgrades_plaintext_password() {
  let app = app().await;
  let (status, body) = app.login().await;
  assert_eq!(status, StatusCode::OK);
  assert!(body["access"].is_string());
  assert!(body["refresh"].is_string());

  let user = app.store.find_user_by_email(ADMIN.into()).await.unwrap().unwrap();
  assert!(is_phc_hash(&user.password_hash));

  // The upgraded hash still verifies.
  let (status, _) = app.login().await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn login_rejects_wrong_password() {
  let app = app().await;
  let (status, body) = app
    .call(
      Method::POST,
      "/auth/login",
      None,
      Some(json!({ "email": ADMIN, "password": "nope" })),
    )
    .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert!(body["detail"].is_string());
}

#[tokio::test]
async fn only_admins_can_sign_in() {
  let app = app().await;
  app
    .store
    .upsert_user("reviewer@example.edu".into(), "pw".into(), "reviewer".into())
    .await
    .unwrap();
  let (status, _) = app
    .call(
      Method::POST,
      "/auth/login",
      None,
      Some(json!({ "email": "reviewer@example.edu", "password": "pw" })),
    )
    .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn requests_need_an_access_token() {
  let app = app().await;
  let (status, _) = app.call(Method::GET, "/programs", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (_, tokens) = app.login().await;
  let refresh = tokens["refresh"].as_str().unwrap();
  let (status, _) = app.call(Method::GET, "/programs", Some(refresh), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (status, body) = app
    .call(Method::POST, "/auth/refresh", None, Some(json!({ "refresh": refresh })))
    .await;
  assert_eq!(status, StatusCode::OK);
  let access = body["access"].as_str().unwrap();
  let (status, _) = app.call(Method::GET, "/programs", Some(access), None).await;
  assert_eq!(status, StatusCode::OK);
}

// ─── Programs and cycles ──────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_program_names_are_field_errors() {
  let app = app().await;
  let token = app.token().await;
  app.program_and_cycle(&token).await;

  let (status, body) = app
    .call(
      Method::POST,
      "/programs",
      Some(&token),
      Some(json!({ "program_name": "  mechanical engineering ", "program_level": "" })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["program_name"].is_array());
  assert!(body["program_level"].is_array());
}

#[tokio::test]
async fn cycle_years_are_checked() {
  let app = app().await;
  let token = app.token().await;
  let (pid, _) = app.program_and_cycle(&token).await;
  let (status, body) = app
    .call(
      Method::POST,
      &format!("/programs/{pid}/cycles"),
      Some(&token),
      Some(json!({ "start_year": 2030, "end_year": 2024 })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["end_year"].is_array());
}

#[tokio::test]
async fn deleted_program_is_gone() {
  let app = app().await;
  let token = app.token().await;
  let (pid, cycle_id) = app.program_and_cycle(&token).await;

  let (status, _) = app.call(Method::DELETE, &format!("/programs/{pid}"), Some(&token), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, body) = app.call(Method::GET, &format!("/programs/{pid}"), Some(&token), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["detail"].is_string());
  let (status, _) = app.call(Method::GET, &format!("/cycles/{cycle_id}"), Some(&token), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ─── Checklist and sections ───────────────────────────────────────────────────

#[tokio::test]
async fn checklist_starts_with_ten_items() {
  let app = app().await;
  let token = app.token().await;
  let (_, cycle_id) = app.program_and_cycle(&token).await;

  let (status, body) = app
    .call(Method::GET, &format!("/cycles/{cycle_id}/checklist"), Some(&token), None)
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["overall_progress"], 0.0);
  let items = body["items"].as_array().unwrap();
  assert_eq!(items.len(), 10);
  assert_eq!(items[0]["slot"], "background");
  assert_eq!(items[9]["criterion_number"], 9);
}

#[tokio::test]
async fn invalid_section_writes_nothing() {
  let app = app().await;
  let token = app.token().await;
  let (_, cycle_id) = app.program_and_cycle(&token).await;
  let uri = format!("/cycles/{cycle_id}/background");

  let (status, body) = app
    .call(
      Method::PUT,
      &uri,
      Some(&token),
      Some(json!({
        "program_contact_name": "Dr. Haddad",
        "phone_number": "555-CALL-NOW",
        "year_implemented": "2999",
      })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(
    body["phone_number"][0],
    "Phone number must contain digits only (optional leading +)."
  );
  assert!(body["year_implemented"].is_array());

  let (status, body) = app.call(Method::GET, &uri, Some(&token), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["record"]["program_contact_name"], "");
  assert_eq!(body["record"]["completion_percentage"], 0.0);
}

#[tokio::test]
async fn saved_section_feeds_cycle_progress() {
  let app = app().await;
  let token = app.token().await;
  let (_, cycle_id) = app.program_and_cycle(&token).await;

  let (status, body) = app
    .call(
      Method::PUT,
      &format!("/cycles/{cycle_id}/criterion3"),
      Some(&token),
      Some(json!({
        "outcomes_publication_location": "Undergraduate catalog",
        "so_peo_relationship_explanation": "SO 1-7 support every PEO.",
      })),
    )
    .await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert_eq!(body["record"]["completion_percentage"], 100.0);
  assert!(body["checklist_item_id"].is_i64());

  let (_, checklist) = app
    .call(Method::GET, &format!("/cycles/{cycle_id}/checklist"), Some(&token), None)
    .await;
  assert_eq!(checklist["overall_progress"], 10.0);
}

#[tokio::test]
async fn section_put_keeps_what_the_body_omits() {
  let app = app().await;
  let token = app.token().await;
  let token = Some(token.as_str());
  let (_, cycle_id) = app.program_and_cycle(token.unwrap()).await;
  let uri = format!("/cycles/{cycle_id}/criterion3");

  let (status, saved) = app
    .call(
      Method::PUT,
      &uri,
      token,
      Some(json!({
        "outcomes_publication_location": "Catalog",
        "so_peo_relationship_explanation": "SO 1-7 support every PEO.",
      })),
    )
    .await;
  assert_eq!(status, StatusCode::OK, "{saved}");
  assert_eq!(saved["record"]["completion_percentage"], 100.0);

  let (status, body) = app
    .call(Method::PUT, &uri, token, Some(json!({ "so_peo_relationship_explanation": "Revised." })))
    .await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert_eq!(body["record"]["outcomes_publication_location"], "Catalog");
  assert_eq!(body["record"]["so_peo_relationship_explanation"], "Revised.");
  assert_eq!(body["record"]["completion_percentage"], 100.0);

  // A GET response sent straight back is a no-op save.
  let (_, current) = app.call(Method::GET, &uri, token, None).await;
  let (status, body) = app.call(Method::PUT, &uri, token, Some(current)).await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert_eq!(body["record"]["outcomes_publication_location"], "Catalog");
  assert_eq!(body["record"]["completion_percentage"], 100.0);

  let (status, body) = app
    .call(Method::PUT, &uri, token, Some(json!({ "outcomes_location": "Website" })))
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["outcomes_location"].is_array());

  let (status, body) = app
    .call(Method::PUT, &uri, token, Some(json!({ "outcomes_publication_location": null })))
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["record"]["outcomes_publication_location"], "");
  assert_eq!(body["record"]["completion_percentage"], 50.0);
  let (_, checklist) = app
    .call(Method::GET, &format!("/cycles/{cycle_id}/checklist"), token, None)
    .await;
  assert_eq!(checklist["overall_progress"], 5.0);
}

#[tokio::test]
async fn section_rows_survive_a_narrative_only_put() {
  let app = app().await;
  let token = app.token().await;
  let token = Some(token.as_str());
  let (_, cycle_id) = app.program_and_cycle(token.unwrap()).await;
  let uri = format!("/cycles/{cycle_id}/appendixc");

  let (status, _) = app
    .call(
      Method::PUT,
      &uri,
      token,
      Some(json!({ "equipment_rows": [ { "equipment_name": "Lathe", "quantity": 2 } ] })),
    )
    .await;
  assert_eq!(status, StatusCode::OK);

  let (status, body) = app
    .call(Method::PUT, &uri, token, Some(json!({ "labs_covered_count": 4 })))
    .await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert_eq!(body["record"]["labs_covered_count"], 4);
  assert_eq!(body["equipment_rows"][0]["equipment_name"], "Lathe");

  let (_, body) = app
    .call(Method::PUT, &uri, token, Some(json!({ "equipment_rows": [] })))
    .await;
  assert!(body["equipment_rows"].as_array().unwrap().is_empty());
  assert_eq!(body["record"]["labs_covered_count"], 4);
}

#[tokio::test]
async fn unknown_section_is_not_found() {
  let app = app().await;
  let token = app.token().await;
  let (_, cycle_id) = app.program_and_cycle(&token).await;
  let (status, _) = app
    .call(Method::GET, &format!("/cycles/{cycle_id}/criterion9"), Some(&token), None)
    .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ─── Courses and syllabi ──────────────────────────────────────────────────────

#[tokio::test]
async fn course_codes_are_unique_within_a_cycle() {
  let app = app().await;
  let token = app.token().await;
  let (pid, cycle_id) = app.program_and_cycle(&token).await;
  let uri = format!("/programs/{pid}/courses?cycle_id={cycle_id}");

  let (status, course) = app
    .call(
      Method::POST,
      &uri,
      Some(&token),
      Some(json!({ "course_code": "mech 210", "course_title": "Statics", "credits": 3 })),
    )
    .await;
  assert_eq!(status, StatusCode::CREATED, "{course}");
  assert_eq!(course["course_code"], "MECH 210");

  let (status, body) = app
    .call(
      Method::POST,
      &uri,
      Some(&token),
      Some(json!({ "course_code": " MECH  210", "course_title": "Statics II" })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["course_code"].is_array());

  let (status, courses) = app.call(Method::GET, &uri, Some(&token), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(courses.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn mistyped_bodies_come_back_as_field_errors() {
  let app = app().await;
  let token = app.token().await;
  let (pid, cycle_id) = app.program_and_cycle(&token).await;
  let uri = format!("/programs/{pid}/courses?cycle_id={cycle_id}");

  let (status, body) = app
    .call(
      Method::POST,
      &uri,
      Some(&token),
      Some(json!({ "course_code": "MECH 210", "credits": "three" })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["credits"][0].as_str().unwrap().starts_with("invalid type"));
  let (_, courses) = app.call(Method::GET, &uri, Some(&token), None).await;
  assert!(courses.as_array().unwrap().is_empty());

  let (status, body) = app
    .call(
      Method::PUT,
      &format!("/programs/{pid}/so-peo-mappings"),
      Some(&token),
      Some(json!({ "mappings": [ { "so_id": "x", "peo_id": 1 } ] })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["mappings[0].so_id"].is_array());

  let (status, body) = app
    .send(Method::POST, "/programs", Some(&token), Some("{\"program_name\": ".into()))
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["detail"].is_string());
}

#[tokio::test]
async fn deleted_syllabus_section_is_not_found_and_sibling_survives() {
  let app = app().await;
  let token = app.token().await;
  let token = Some(token.as_str());
  let (pid, cycle_id) = app.program_and_cycle(token.unwrap()).await;

  let (_, course) = app
    .call(
      Method::POST,
      &format!("/programs/{pid}/courses?cycle_id={cycle_id}"),
      token,
      Some(json!({ "course_code": "MECH 310" })),
    )
    .await;
  let cid = course["course_id"].as_i64().unwrap();

  let mut syllabi = Vec::new();
  for (name, email) in [("L. Khoury", "l.khoury@example.edu"), ("S. Nader", "s.nader@example.edu")] {
    let (_, member) = app
      .call(Method::POST, "/faculty", token, Some(json!({ "full_name": name, "email": email })))
      .await;
    let (status, section) = app
      .call(
        Method::POST,
        &format!("/programs/{pid}/courses/{cid}/sections"),
        token,
        Some(json!({ "faculty_id": member["faculty_id"], "term": "Spring 2026" })),
      )
      .await;
    assert_eq!(status, StatusCode::CREATED, "{section}");
    let sid = section["section_id"].as_i64().unwrap();
    syllabi.push(format!("/programs/{pid}/courses/{cid}/sections/{sid}/syllabus"));
  }

  let (status, _) = app.call(Method::DELETE, &syllabi[0], token, None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = app.call(Method::GET, &syllabi[0], token, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) = app.call(Method::DELETE, &syllabi[0], token, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, detail) = app.call(Method::GET, &syllabi[1], token, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(detail["course"]["course_code"], "MECH 310");
}

#[tokio::test]
async fn syllabus_rejects_foreign_outcomes() {
  let app = app().await;
  let token = app.token().await;
  let token = Some(token.as_str());
  let (pid, cycle_id) = app.program_and_cycle(token.unwrap()).await;
  let courses = format!("/programs/{pid}/courses?cycle_id={cycle_id}");

  let (_, course) = app
    .call(Method::POST, &courses, token, Some(json!({ "course_code": "MECH 210" })))
    .await;
  let (_, other) = app
    .call(Method::POST, &courses, token, Some(json!({ "course_code": "MECH 220" })))
    .await;
  let cid = course["course_id"].as_i64().unwrap();
  let other_id = other["course_id"].as_i64().unwrap();

  let (_, foreign_clo) = app
    .call(
      Method::POST,
      &format!("/courses/{other_id}/clos"),
      token,
      Some(json!({ "code": "CLO 1", "description": "Draw free-body diagrams" })),
    )
    .await;
  let (status, member) = app
    .call(
      Method::POST,
      "/faculty",
      token,
      Some(json!({ "full_name": "R. Aoun", "email": "R.Aoun@Example.edu", "phone": "(555) 123-4567" })),
    )
    .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(member["email"], "r.aoun@example.edu");
  assert_eq!(member["phone"], "5551234567");
  let fid = member["faculty_id"].as_i64().unwrap();

  let sections = format!("/programs/{pid}/courses/{cid}/sections");
  let new_section = json!({ "faculty_id": fid, "term": "Fall 2025" });
  let (status, section) = app.call(Method::POST, &sections, token, Some(new_section.clone())).await;
  assert_eq!(status, StatusCode::CREATED);
  let (status, body) = app.call(Method::POST, &sections, token, Some(new_section)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["faculty_id"].is_array());

  let sid = section["section_id"].as_i64().unwrap();
  let syllabus = format!("/programs/{pid}/courses/{cid}/sections/{sid}/syllabus");
  let (status, body) = app
    .call(
      Method::PUT,
      &syllabus,
      token,
      Some(json!({
        "course": { "course_code": "MECH 210" },
        "section": { "term": "Fall 2025", "faculty_id": fid },
        "syllabus": {
          "clo_mappings": [ { "clo_id": foreign_clo["outcome_id"] } ],
          "assessments": [
            { "assessment_type": "Midterm", "weight_percentage": 60 },
            { "assessment_type": "Final", "weight_percentage": 60 }
          ]
        }
      })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["syllabus.clo_mappings[0].clo_id"].is_array());
  assert!(body["syllabus.assessments"].is_array());

  let (status, detail) = app.call(Method::GET, &syllabus, token, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(detail["course"]["course_code"], "MECH 210");
  assert_eq!(detail["section"]["term"], "Fall 2025");
  assert_eq!(detail["faculty_options"][0]["full_name"], "R. Aoun");
  assert!(detail["available_clos"].as_array().unwrap().is_empty());
  assert!(detail["syllabus"]["assessments"].as_array().unwrap().is_empty());

  let (status, _) = app.call(Method::DELETE, &syllabus, token, None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = app.call(Method::GET, &syllabus, token, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ─── Mappings ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn so_peo_mappings_must_stay_inside_the_program() {
  let app = app().await;
  let token = app.token().await;
  let token = Some(token.as_str());
  let (pid, _) = app.program_and_cycle(token.unwrap()).await;
  let (status, other) = app
    .call(
      Method::POST,
      "/programs",
      token,
      Some(json!({ "program_name": "Civil Engineering", "program_level": "Undergraduate" })),
    )
    .await;
  assert_eq!(status, StatusCode::CREATED);
  let other_pid = other["program_id"].as_i64().unwrap();

  let outcome = |code: &str| json!({ "code": code, "description": format!("{code} statement") });
  let (_, so) = app
    .call(Method::POST, &format!("/programs/{pid}/student-outcomes"), token, Some(outcome("SO 1")))
    .await;
  let (_, foreign_so) = app
    .call(Method::POST, &format!("/programs/{other_pid}/student-outcomes"), token, Some(outcome("SO 1")))
    .await;
  let (_, peo) = app
    .call(Method::POST, &format!("/programs/{pid}/peos"), token, Some(outcome("PEO 1")))
    .await;

  let uri = format!("/programs/{pid}/so-peo-mappings");
  let (status, body) = app
    .call(
      Method::PUT,
      &uri,
      token,
      Some(json!({ "mappings": [ { "so_id": foreign_so["outcome_id"], "peo_id": peo["outcome_id"] } ] })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["mappings[0].so_id"].is_array());
  assert!(body.get("mappings[0].peo_id").is_none());

  let pair = json!({ "so_id": so["outcome_id"], "peo_id": peo["outcome_id"] });
  let (status, body) = app
    .call(Method::PUT, &uri, token, Some(json!({ "mappings": [pair.clone(), pair] })))
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["mappings"].as_array().unwrap().len(), 1);
}

// ─── Evidence ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn evidence_records_the_uploader() {
  let app = app().await;
  let token = app.token().await;
  let (_, cycle_id) = app.program_and_cycle(&token).await;
  let uri = format!("/cycles/{cycle_id}/evidence");

  let (status, body) = app
    .call(
      Method::POST,
      &uri,
      Some(&token),
      Some(json!({ "file_name": "minutes.pdf", "file_type": "pdf", "upload_date": "2999-01-01" })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["upload_date"].is_array());

  let (status, file) = app
    .call(
      Method::POST,
      &uri,
      Some(&token),
      Some(json!({ "file_name": "minutes.pdf", "file_type": "pdf", "upload_date": "03/02/2026" })),
    )
    .await;
  assert_eq!(status, StatusCode::CREATED, "{file}");
  assert_eq!(file["upload_date"], "2026-03-02");
  let admin = app.store.find_user_by_email(ADMIN.into()).await.unwrap().unwrap();
  assert_eq!(file["user_id"], admin.user_id);
}
