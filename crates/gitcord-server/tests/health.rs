// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

mod common;

use axum::{body::Body, http::Request, http::StatusCode};
use common::*;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn healthy_store_reports_ok() {
	let app = spawn_app().await;

	let response = app
		.router
		.oneshot(Request::get("/health").body(Body::empty()).unwrap())
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(
		body_json(response).await,
		json!({"status": "ok", "store": "healthy"})
	);
}

#[tokio::test]
async fn nested_paths_reach_the_same_handlers() {
	let app = spawn_app().await;
	let body = json!({"zen": "Keep it logically awesome."}).to_string();
	let mut request = github_request_raw("ping", body, None);
	*request.uri_mut() = "/github/app".parse().unwrap();

	let response = app.router.oneshot(request).await.unwrap();
	assert_eq!(response.status(), StatusCode::OK);
}
