#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use crate::tests::TestApp;

    const BOOK_FIELDS: [(&str, &str); 3] =
        [("bookName", "Aab-e-Hayat"), ("shortIntro", "Urdu prose"), ("description", "Muhammad Husain Azad")];

    #[tokio::test]
    async fn test_book_image_upload_is_served() {
        let t = TestApp::new().await;
        let admin = t.admin_cookie().await;

        let res = t
            .multipart("/api/books", Some(&admin), &BOOK_FIELDS, &[("bookImage", "cover.PNG", b"fake-png-bytes")])
            .await;
        assert_eq!(res.status, StatusCode::OK);
        let path = res.body["bookImage"].as_str().unwrap().to_string();
        assert!(path.starts_with("/server/uploads/"));
        assert!(path.ends_with(".png"));
        assert_eq!(t.stored_uploads().len(), 1);

        let served = t.get(&path, None).await;
        assert_eq!(served.status, StatusCode::OK);
        assert_eq!(served.body, "fake-png-bytes");
        assert_eq!(served.headers.get("cache-control").unwrap(), "public, max-age=86400");

        let snapshot = t.state.metrics.get_snapshot();
        assert_eq!(snapshot.files_uploaded, 1);
        assert_eq!(snapshot.bytes_uploaded, "fake-png-bytes".len() as u64);
    }

    #[tokio::test]
    async fn test_uploaded_file_wins_over_text_field() {
        let t = TestApp::new().await;
        let admin = t.admin_cookie().await;
        let mut fields = BOOK_FIELDS.to_vec();
        fields.push(("bookImage", "https://example.com/cover.jpg"));

        let with_file = t.multipart("/api/books", Some(&admin), &fields, &[("bookImage", "c.jpg", b"jpg")]).await;
        assert!(with_file.body["bookImage"].as_str().unwrap().starts_with("/server/uploads/"));

        let text_only = t.multipart("/api/books", Some(&admin), &fields, &[]).await;
        assert_eq!(text_only.body["bookImage"], "https://example.com/cover.jpg");
    }

    #[tokio::test]
    async fn test_disallowed_extension_is_rejected_before_storage() {
        let t = TestApp::new().await;
        let admin = t.admin_cookie().await;

        let res = t
            .multipart("/api/books", Some(&admin), &BOOK_FIELDS, &[("bookImage", "payload.php", b"<?php echo 1; ?>")])
            .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(res.body["details"]["field"], "bookImage");
        assert!(t.stored_uploads().is_empty());
        assert_eq!(t.get("/api/books", None).await.body, serde_json::json!([]));

        let no_ext = t.multipart("/api/notes", Some(&admin), &[("class", "x")], &[("pdf", "README", b"text")]).await;
        assert_eq!(no_ext.status, StatusCode::BAD_REQUEST);
        assert!(t.stored_uploads().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_file_is_rejected() {
        let t = TestApp::with_config(|c| c.uploads.max_file_bytes = 8).await;
        let admin = t.admin_cookie().await;

        let res = t
            .multipart("/api/books", Some(&admin), &BOOK_FIELDS, &[("bookImage", "big.png", b"0123456789abcdef")])
            .await;
        assert_eq!(res.status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(t.stored_uploads().is_empty());
    }

    #[tokio::test]
    async fn test_validation_failure_does_not_store_file() {
        let t = TestApp::new().await;
        let admin = t.admin_cookie().await;

        // Missing required text fields: the valid PDF must not be written.
        let res = t.multipart("/api/notes", Some(&admin), &[("class", "FSc-I")], &[("pdf", "n.pdf", b"%PDF")]).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert!(t.stored_uploads().is_empty());
    }

    #[tokio::test]
    async fn test_non_admin_upload_is_forbidden() {
        let t = TestApp::new().await;
        let res = t.multipart("/api/books", None, &BOOK_FIELDS, &[("bookImage", "c.png", b"png")]).await;
        assert_eq!(res.status, StatusCode::FORBIDDEN);
        assert!(t.stored_uploads().is_empty());
    }

    #[tokio::test]
    async fn test_path_traversal_is_rejected() {
        let t = TestApp::new().await;
        let res = t.get("/server/uploads/%2e%2e/library.db", None).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_multipart_patch_replaces_book_image() {
        let t = TestApp::new().await;
        let admin = t.admin_cookie().await;
        let created = t.multipart("/api/books", Some(&admin), &BOOK_FIELDS, &[]).await;
        let id = created.body["id"].as_str().unwrap().to_string();
        assert!(created.body["bookImage"].is_null());

        let updated = t
            .multipart_request(
                Method::PATCH,
                &format!("/api/books/{id}"),
                Some(&admin),
                &[("totalCopies", "3")],
                &[("bookImage", "new.jpg", b"jpeg")],
            )
            .await;
        assert_eq!(updated.status, StatusCode::OK);
        assert_eq!(updated.body["totalCopies"], 3);
        let image = updated.body["bookImage"].as_str().unwrap().to_string();
        assert!(image.starts_with("/server/uploads/"));
        assert_eq!(t.stored_uploads().len(), 1);

        let listed = t.get("/api/books", None).await;
        assert_eq!(listed.body[0]["bookImage"], image.as_str());
        assert_eq!(t.get(&image, None).await.body, "jpeg");
    }

    #[tokio::test]
    async fn test_update_of_missing_book_stores_no_file() {
        let t = TestApp::new().await;
        let admin = t.admin_cookie().await;

        let res = t
            .multipart_request(
                Method::PATCH,
                "/api/books/does-not-exist",
                Some(&admin),
                &[("bookName", "Ghost")],
                &[("bookImage", "c.png", b"png")],
            )
            .await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(res.error(), "Book not found");
        assert!(t.stored_uploads().is_empty());
        assert_eq!(t.state.metrics.get_snapshot().files_uploaded, 0);

        let created = t.multipart("/api/books", Some(&admin), &BOOK_FIELDS, &[]).await;
        let id = created.body["id"].as_str().unwrap().to_string();
        let invalid = t
            .multipart_request(
                Method::PATCH,
                &format!("/api/books/{id}"),
                Some(&admin),
                &[("availableCopies", "-2")],
                &[("bookImage", "c.png", b"png")],
            )
            .await;
        assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
        assert!(t.stored_uploads().is_empty());
    }

    #[tokio::test]
    async fn test_rare_book_pdf_stream() {
        let t = TestApp::new().await;
        let admin = t.admin_cookie().await;

        let with_pdf = t
            .multipart(
                "/api/rare-books",
                Some(&admin),
                &[("title", "Diwan-e-Ghalib"), ("description", "1841 print")],
                &[("pdf", "diwan.pdf", b"%PDF-1.3 ghalib")],
            )
            .await;
        assert_eq!(with_pdf.status, StatusCode::OK);
        let id = with_pdf.body["id"].as_str().unwrap().to_string();

        let streamed = t.get(&format!("/api/rare-books/stream/{id}"), None).await;
        assert_eq!(streamed.status, StatusCode::OK);
        assert_eq!(streamed.headers.get("content-type").unwrap(), "application/pdf");
        assert_eq!(streamed.body, "%PDF-1.3 ghalib");

        // Hidden books stream for admins only.
        t.patch(&format!("/api/rare-books/{id}/toggle"), Some(&admin), serde_json::json!({})).await;
        assert_eq!(t.get(&format!("/api/rare-books/stream/{id}"), None).await.status, StatusCode::NOT_FOUND);
        assert_eq!(t.get(&format!("/api/rare-books/stream/{id}"), Some(&admin)).await.status, StatusCode::OK);

        let without_pdf = t
            .multipart("/api/rare-books", Some(&admin), &[("title", "Scroll"), ("description", "No scan yet")], &[])
            .await;
        let bare_id = without_pdf.body["id"].as_str().unwrap().to_string();
        let res = t.get(&format!("/api/rare-books/stream/{bare_id}"), None).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);

        let unknown = t.get("/api/rare-books/stream/nope", None).await;
        assert_eq!(unknown.status, StatusCode::NOT_FOUND);
        assert_eq!(unknown.error(), "Rare book not found");
    }
}
