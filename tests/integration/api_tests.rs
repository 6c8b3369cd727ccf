//! API integration tests
//!
//! These run against a live server with a seeded database:
//! a `librarian` account holding `can_mark_returned` and a `reader` account
//! without permissions, each with the password equal to the username.

use reqwest::{header, redirect::Policy, Client, StatusCode};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:8080";

fn client() -> Client {
    Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("Failed to build client")
}

/// Log in through the form and return the bearer token
async fn get_auth_token(client: &Client, username: &str) -> String {
    let response = client
        .post(format!("{}/accounts/login/", BASE_URL))
        .form(&[("username", username), ("password", username)])
        .send()
        .await
        .expect("Failed to send login request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

async fn get_page(client: &Client, path: &str, token: &str) -> Value {
    let response = client
        .get(format!("{}{}", BASE_URL, path))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK, "{}", path);
    response.json().await.expect("Failed to parse response")
}

fn due_dates(body: &Value) -> Vec<String> {
    body["context"]["object_list"]
        .as_array()
        .expect("object_list")
        .iter()
        .filter_map(|row| row["due_back"].as_str().map(str::to_string))
        .collect()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_readiness() {
    let response = client()
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let response = client()
        .post(format!("{}/accounts/login/", BASE_URL))
        .form(&[("username", "librarian"), ("password", "wrong")])
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_index_counts_visits_per_session() {
    let client = client();

    let first = client
        .get(format!("{}/catalog/", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    let cookie = first
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .expect("Session cookie")
        .to_string();

    let body: Value = first.json().await.expect("Failed to parse response");
    assert_eq!(body["template"], "index.html");
    assert_eq!(body["context"]["num_visits"], 0);
    for key in ["num_books", "num_instances", "num_instances_available", "num_author", "num_genres"] {
        assert!(body["context"][key].is_i64(), "{}", key);
    }

    for expected in 1..3 {
        let body: Value = client
            .get(format!("{}/catalog/", BASE_URL))
            .header(header::COOKIE, &cookie)
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse response");
        assert_eq!(body["context"]["num_visits"], expected);
    }
}

#[tokio::test]
#[ignore]
async fn test_book_pages_cover_all_books() {
    let client = client();
    let mut seen = Vec::new();
    let mut page = 1;

    loop {
        let body: Value = client
            .get(format!("{}/catalog/books/?page={}", BASE_URL, page))
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse response");

        for book in body["context"]["object_list"].as_array().expect("object_list") {
            let id = book["id"].as_i64().expect("id");
            assert!(!seen.contains(&id));
            seen.push(id);
        }

        if body["context"]["page_obj"]["has_next"] != true {
            assert_eq!(body["context"]["page_obj"]["count"], seen.len());
            break;
        }
        page += 1;
    }

    let past_end = client
        .get(format!("{}/catalog/books/?page={}", BASE_URL, page + 1))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(past_end.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_my_loans_only_lists_own_copies_by_due_date() {
    let client = client();
    let token = get_auth_token(&client, "reader").await;

    let body = get_page(&client, "/catalog/mybooks/", &token).await;
    assert_eq!(body["template"], "catalog/bookinstance_list_borrowed_user.html");

    for row in body["context"]["object_list"].as_array().expect("object_list") {
        assert_eq!(row["borrower_username"], "reader");
        assert_eq!(row["status"], "on_loan");
    }

    let dates = due_dates(&body);
    assert!(dates.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
#[ignore]
async fn test_reader_cannot_see_all_loans() {
    let client = client();
    let token = get_auth_token(&client, "reader").await;

    let response = client
        .get(format!("{}/catalog/borrowed/", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore]
async fn test_librarian_renews_a_loan() {
    let client = client();
    let token = get_auth_token(&client, "librarian").await;

    let borrowed = get_page(&client, "/catalog/borrowed/", &token).await;
    assert!(due_dates(&borrowed).windows(2).all(|w| w[0] <= w[1]));
    let loans = borrowed["context"]["object_list"].as_array().expect("object_list");
    let loan = loans.first().expect("seed data has at least one loan");
    let renew_url = loan["renew_url"].as_str().expect("renew_url").to_string();

    let form = get_page(&client, &renew_url, &token).await;
    assert_eq!(form["template"], "catalog/book_renew_librarian.html");
    assert!(form["context"]["form"]["renewal_date"].is_string());

    // Invalid input re-renders the form and leaves the copy untouched
    let response = client
        .post(format!("{}{}", BASE_URL, renew_url))
        .bearer_auth(&token)
        .form(&[("renewal_date", "someday")])
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["context"]["form"]["errors"]["renewal_date"].is_array());
    assert_eq!(body["context"]["bookinst"]["due_back"], loan["due_back"]);

    let response = client
        .post(format!("{}{}", BASE_URL, renew_url))
        .bearer_auth(&token)
        .form(&[("renewal_date", "2099-12-31")])
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/catalog/borrowed/");

    let renewed = get_page(&client, &renew_url, &token).await;
    assert_eq!(renewed["context"]["bookinst"]["due_back"], "2099-12-31");
}
