#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt; // for .collect()
    use serde_json::{json, Value};
    use sqlx::migrate::MigrateDatabase;
    use sqlx::sqlite::SqlitePoolOptions;
    use tempfile::NamedTempFile;
    use tower::ServiceExt;

    use crate::config::{
        AppConfig, DatabaseConfig, LikeOperator, MailConfig, ServerConfig, SucheConfig,
    };
    use crate::routes;
    use crate::state::AppState;

    async fn setup_test_app() -> (axum::Router, AppState, NamedTempFile) {
        // Create temporary database
        let temp_db = NamedTempFile::new().unwrap();
        let db_url = format!("sqlite:{}", temp_db.path().display());

        sqlx::Sqlite::create_database(&db_url).await.unwrap();

        let pool = SqlitePoolOptions::new().max_connections(1).connect(&db_url).await.unwrap();

        // Initialize schema
        crate::db::init_db(&pool).await.unwrap();

        // Create test config
        let config = AppConfig {
            server: ServerConfig { host: "127.0.0.1".to_string(), port: 8080 },
            database: DatabaseConfig { url: db_url },
            suche: SucheConfig {
                default_page_size: 5,
                default_page_number: 0,
                max_page_size: 100,
                case_insensitive_operator: LikeOperator::Like,
            },
            mail: MailConfig {
                activated: false,
                host: "localhost".to_string(),
                port: 25,
                from: "Max Mustermann <Max.Mustermann@acme.com>".to_string(),
                to: "Maja Miesdrauf <Maja.Miesdrauf@acme.com>".to_string(),
            },
        };

        let state = AppState::new(pool, config);
        let app = routes::api_router(state.clone());
        (app, state, temp_db)
    }

    fn buch_json(isbn: &str, titel: &str) -> Value {
        json!({
            "isbn": isbn,
            "rating": 4,
            "art": "EPUB",
            "preis": 29.9,
            "rabatt": 0.1,
            "lieferbar": true,
            "datum": "2025-02-01",
            "homepage": "https://acme.example",
            "schlagwoerter": ["JAVASCRIPT"],
            "titel": { "titel": titel, "untertitel": "Untertitel" },
            "abbildungen": [{ "beschriftung": "Cover", "contentType": "image/png" }]
        })
    }

    async fn create_buch(app: &axum::Router, body: Value) -> String {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/rest/buecher")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        response.headers().get("location").unwrap().to_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_healthz_endpoint() {
        let (app, _, _guard) = setup_test_app().await;

        let response = app
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readyz_endpoint() {
        let (app, _, _guard) = setup_test_app().await;

        let response = app
            .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_version_endpoint() {
        let (app, _, _guard) = setup_test_app().await;

        let response = app
            .oneshot(Request::builder().uri("/version").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert!(json.get("name").is_some());
        assert!(json.get("version").is_some());
        assert!(json.get("build").is_some());
    }

    #[tokio::test]
    async fn test_create_buch_returns_location() {
        let (app, _, _guard) = setup_test_app().await;
        let location = create_buch(&app, buch_json("978-3-16-148410-0", "Alpha")).await;
        assert!(location.starts_with("/rest/buecher/"));
    }

    #[tokio::test]
    async fn test_create_buch_duplicate_isbn_conflicts() {
        let (app, _, _guard) = setup_test_app().await;
        create_buch(&app, buch_json("978-3-16-148410-0", "Alpha")).await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/rest/buecher")
                    .header("content-type", "application/json")
                    .body(Body::from(buch_json("978-3-16-148410-0", "Beta").to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_create_buch_invalid_rating_is_rejected() {
        let (app, _, _guard) = setup_test_app().await;
        let mut body = buch_json("978-3-16-148410-0", "Alpha");
        body["rating"] = json!(6);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/rest/buecher")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_buch_by_id_with_etag() {
        let (app, _, _guard) = setup_test_app().await;
        let location = create_buch(&app, buch_json("978-3-16-148410-0", "Alpha")).await;

        let response = app
            .clone()
            .oneshot(Request::builder().uri(&location).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let etag = response.headers().get("etag").unwrap().to_str().unwrap().to_string();
        assert_eq!(etag, "\"0\"");

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["isbn"], "978-3-16-148410-0");
        assert_eq!(json["titel"]["titel"], "Alpha");
        // Abbildungen werden nur auf Anfrage geladen
        assert!(json.get("abbildungen").is_none());

        // If-None-Match mit aktueller Version -> 304
        let not_modified = app
            .oneshot(
                Request::builder()
                    .uri(&location)
                    .header("if-none-match", etag)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(not_modified.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn test_get_buch_with_abbildungen_flag() {
        let (app, _, _guard) = setup_test_app().await;
        let location = create_buch(&app, buch_json("978-3-16-148410-0", "Alpha")).await;

        let uri = format!("{}?abbildungen=true", location);
        let response = app
            .oneshot(Request::builder().uri(&uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&body).unwrap();
        let abbildungen = json["abbildungen"].as_array().unwrap();
        assert_eq!(abbildungen.len(), 1);
        assert_eq!(abbildungen[0]["beschriftung"], "Cover");
    }

    #[tokio::test]
    async fn test_get_buch_not_found() {
        let (app, _, _guard) = setup_test_app().await;

        let response = app
            .oneshot(Request::builder().uri("/rest/buecher/4711").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_search_returns_page_with_total_elements() {
        let (app, _, _guard) = setup_test_app().await;
        create_buch(&app, buch_json("isbn-a", "Mountain BIKE Pro")).await;
        create_buch(&app, buch_json("isbn-b", "Rennrad")).await;

        let response = app
            .oneshot(
                Request::builder().uri("/rest/buecher?titel=bike").body(Body::empty()).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["totalElements"], 1);
        let content = json["content"].as_array().unwrap();
        assert_eq!(content.len(), 1);
        assert_eq!(content[0]["titel"]["titel"], "Mountain BIKE Pro");
    }

    #[tokio::test]
    async fn test_search_with_unknown_key_is_not_found() {
        let (app, _, _guard) = setup_test_app().await;
        create_buch(&app, buch_json("isbn-a", "Alpha")).await;

        let response = app
            .oneshot(Request::builder().uri("/rest/buecher?foo=bar").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_search_no_matches_is_not_found() {
        let (app, _, _guard) = setup_test_app().await;
        create_buch(&app, buch_json("isbn-a", "Alpha")).await;

        let response = app
            .oneshot(
                Request::builder().uri("/rest/buecher?titel=zzz").body(Body::empty()).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_put_requires_if_match() {
        let (app, _, _guard) = setup_test_app().await;
        let location = create_buch(&app, buch_json("978-3-16-148410-0", "Alpha")).await;

        let update = json!({
            "isbn": "978-3-16-148410-0",
            "rating": 5,
            "art": "HARDCOVER",
            "preis": 35.0,
            "lieferbar": false
        });

        // Ohne If-Match -> 428
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri(&location)
                    .header("content-type", "application/json")
                    .body(Body::from(update.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PRECONDITION_REQUIRED);

        // Veraltete Version -> 412
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri(&location)
                    .header("content-type", "application/json")
                    .header("if-match", "\"99\"")
                    .body(Body::from(update.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);

        // Korrekte Version -> 204 + neues ETag
        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri(&location)
                    .header("content-type", "application/json")
                    .header("if-match", "\"0\"")
                    .body(Body::from(update.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers().get("etag").unwrap(), "\"1\"");
    }

    #[tokio::test]
    async fn test_put_unknown_id_is_not_found() {
        let (app, _, _guard) = setup_test_app().await;

        let update = json!({ "isbn": "isbn-x", "preis": 1.0, "lieferbar": true });
        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/rest/buecher/4711")
                    .header("content-type", "application/json")
                    .header("if-match", "\"0\"")
                    .body(Body::from(update.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_buch_is_idempotent() {
        let (app, _, _guard) = setup_test_app().await;
        let location = create_buch(&app, buch_json("978-3-16-148410-0", "Alpha")).await;

        let response = app
            .clone()
            .oneshot(
                Request::builder().method("DELETE").uri(&location).body(Body::empty()).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        // Zweites Loeschen bleibt 204
        let response = app
            .clone()
            .oneshot(
                Request::builder().method("DELETE").uri(&location).body(Body::empty()).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(Request::builder().uri(&location).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    fn multipart_file_body(boundary: &str, content: &str) -> String {
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"cover.png\"\r\nContent-Type: image/png\r\n\r\n{c}\r\n--{b}--\r\n",
            b = boundary,
            c = content,
        )
    }

    #[tokio::test]
    async fn test_upload_and_download_buch_file() {
        let (app, _, _guard) = setup_test_app().await;
        let location = create_buch(&app, buch_json("978-3-16-148410-0", "Alpha")).await;
        let file_uri = format!("{}/file", location);

        let boundary = "XKATALOGBOUNDARY";
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(&file_uri)
                    .header("content-type", format!("multipart/form-data; boundary={}", boundary))
                    .body(Body::from(multipart_file_body(boundary, "PNGDATA")))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(Request::builder().uri(&file_uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("content-type").unwrap(), "image/png");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"PNGDATA");
    }

    #[tokio::test]
    async fn test_download_missing_file_is_not_found() {
        let (app, _, _guard) = setup_test_app().await;
        let location = create_buch(&app, buch_json("978-3-16-148410-0", "Alpha")).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri(&format!("{}/file", location))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bike_crud_roundtrip() {
        let (app, _, _guard) = setup_test_app().await;

        let bike = json!({
            "brand": "Canyon",
            "typ": "MTB",
            "frameSize": "L",
            "price": 2999.0,
            "available": true
        });
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/rest/bikes")
                    .header("content-type", "application/json")
                    .body(Body::from(bike.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let created: Value = serde_json::from_slice(&body).unwrap();
        let id = created["id"].as_i64().unwrap();

        // Listing mit Filter
        let response = app
            .clone()
            .oneshot(
                Request::builder().uri("/rest/bikes?brand=Canyon").body(Body::empty()).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let bikes: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(bikes.as_array().unwrap().len(), 1);

        // Filter ohne Treffer -> leere Liste
        let response = app
            .clone()
            .oneshot(
                Request::builder().uri("/rest/bikes?brand=Ghost").body(Body::empty()).unwrap(),
            )
            .await
            .unwrap();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let bikes: Value = serde_json::from_slice(&body).unwrap();
        assert!(bikes.as_array().unwrap().is_empty());

        // Preis-Patch
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("PATCH")
                    .uri(&format!("/rest/bikes/{}/price", id))
                    .header("content-type", "application/json")
                    .body(Body::from(json!({ "price": 1999.0 }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let patched: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(patched["price"], 1999.0);
    }

    #[tokio::test]
    async fn test_bike_image_upload_and_fetch() {
        let (app, _, _guard) = setup_test_app().await;

        let bike = json!({ "brand": "Canyon", "typ": "MTB", "price": 100.0 });
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/rest/bikes")
                    .header("content-type", "application/json")
                    .body(Body::from(bike.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let created: Value = serde_json::from_slice(&body).unwrap();
        let id = created["id"].as_i64().unwrap();

        let boundary = "XKATALOGBOUNDARY";
        let multipart = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"bikeId\"\r\n\r\n{id}\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"description\"\r\n\r\nSeitenansicht\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"bike.jpg\"\r\nContent-Type: image/jpeg\r\n\r\nJPEGDATA\r\n\
             --{b}--\r\n",
            b = boundary,
            id = id,
        );
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/rest/bikes/image")
                    .header("content-type", format!("multipart/form-data; boundary={}", boundary))
                    .body(Body::from(multipart))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(
                Request::builder()
                    .uri(&format!("/rest/bikes/image?bikeId={}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("content-type").unwrap(), "image/jpeg");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"JPEGDATA");
    }
}
