//! Admin retrieval of contact submissions. Read-only.

use crate::prelude::*;

/// Add all `admin` routes to the router.
pub fn add_routes(router: AppRouter) -> AppRouter {
    router.admin_routes(|r| r.route("/admin/submissions", get(list_submissions)))
}

#[derive(Debug, serde::Deserialize)]
struct ListQuery {
    #[serde(default)]
    stats: bool,
}

#[derive(serde::Serialize)]
struct SubmissionsResponse {
    submissions: Vec<Submission>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<SubmissionStats>,
}

async fn list_submissions(
    State(state): State<SharedAppState>, Query(query): Query<ListQuery>,
) -> AppResult<Json<SubmissionsResponse>> {
    let submissions = Submission::list_all(&state.db).await?;
    let stats = query
        .stats
        .then(|| SubmissionStats::compute(&submissions, Utc::now(), state.config.app.tz));

    Ok(Json(SubmissionsResponse { submissions, stats }))
}
