#[cfg(test)]
mod tests {
    use crate::db;
    use crate::store::{
        self,
        books::{self, BookChanges, NewBook},
        library_cards::{self, CardStatus, NewApplication},
        notes::{self, NewNote},
        users::{self, NewUser},
        ActiveStatus,
    };
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use tempfile::TempDir;

    async fn setup_test_db() -> (sqlx::SqlitePool, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let options = SqliteConnectOptions::new().filename(dir.path().join("test.db")).create_if_missing(true);
        let pool = SqlitePoolOptions::new().max_connections(1).connect_with(options).await.unwrap();
        db::init_db(&pool).await.unwrap();
        (pool, dir)
    }

    fn new_user(email: &str, class: Option<&str>) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
            full_name: Some("Test User".to_string()),
            phone: None,
            roll_number: None,
            department: None,
            student_class: class.map(str::to_string),
        }
    }

    fn new_application(card_number: &str) -> NewApplication {
        NewApplication {
            user_id: None,
            first_name: "Zara".to_string(),
            last_name: "Malik".to_string(),
            father_name: None,
            dob: None,
            class: "BS-I".to_string(),
            field: None,
            roll_no: "R-1".to_string(),
            email: "zara@example.com".to_string(),
            phone: "0300".to_string(),
            address_street: "Street".to_string(),
            address_city: "City".to_string(),
            address_state: "State".to_string(),
            address_zip: "00000".to_string(),
            card_number: card_number.to_string(),
            student_id: None,
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_init_db_creates_tables_and_is_idempotent() {
        let (pool, _dir) = setup_test_db().await;
        db::init_db(&pool).await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .fetch_all(&pool)
            .await
            .unwrap();
        for expected in [
            "users",
            "user_roles",
            "profiles",
            "books",
            "library_card_applications",
            "book_borrows",
            "rare_books",
            "notes",
            "events",
            "notifications",
            "contact_messages",
            "donations",
        ] {
            assert!(tables.contains(&expected.to_string()), "missing table {expected}");
        }
    }

    #[tokio::test]
    async fn test_user_create_assigns_role_and_type() {
        let (pool, _dir) = setup_test_db().await;

        let student = users::create(&pool, new_user("kamran@example.com", Some("FSc-II"))).await.unwrap();
        assert_eq!(student.kind, "student");
        assert!(!student.is_admin);
        assert_eq!(users::roles(&pool, &student.id).await.unwrap(), vec!["user".to_string()]);

        let other = users::create(&pool, new_user("guest@example.com", Some(""))).await.unwrap();
        assert_eq!(other.kind, "user");

        let found = users::get_by_email(&pool, "KAMRAN@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, student.id);

        assert!(users::create(&pool, new_user("kamran@example.com", None)).await.is_err());
    }

    #[tokio::test]
    async fn test_user_delete_removes_roles_and_profile() {
        let (pool, _dir) = setup_test_db().await;
        let user = users::create(&pool, new_user("temp@example.com", None)).await.unwrap();
        users::upsert_profile(&pool, &user.id, users::ProfileChanges { full_name: Some("Temp".into()), ..Default::default() })
            .await
            .unwrap();

        assert!(users::delete(&pool, &user.id).await.unwrap());
        assert!(users::get(&pool, &user.id).await.unwrap().is_none());
        assert!(users::roles(&pool, &user.id).await.unwrap().is_empty());
        assert!(users::get_profile(&pool, &user.id).await.unwrap().is_none());
        assert!(!users::delete(&pool, &user.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_book_partial_update() {
        let (pool, _dir) = setup_test_db().await;
        let book = books::create(
            &pool,
            NewBook {
                book_name: "Shahab Nama".to_string(),
                short_intro: "Memoir".to_string(),
                description: "Qudrat Ullah Shahab".to_string(),
                book_image: None,
                total_copies: 2,
                available_copies: 2,
            },
        )
        .await
        .unwrap();

        let updated = books::update(&pool, &book.id, BookChanges { available_copies: Some(1), ..Default::default() })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.available_copies, 1);
        assert_eq!(updated.total_copies, 2);
        assert_eq!(updated.book_name, "Shahab Nama");

        assert!(books::update(&pool, "missing", BookChanges::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_card_approval_sets_dates_once() {
        let (pool, _dir) = setup_test_db().await;
        let app = library_cards::create(&pool, new_application("LIB-2026-000001")).await.unwrap();
        assert_eq!(app.status, CardStatus::Pending);
        assert!(app.issue_date.is_none());
        assert!(library_cards::card_number_exists(&pool, "LIB-2026-000001").await.unwrap());
        assert!(!library_cards::card_number_exists(&pool, "LIB-2026-000002").await.unwrap());

        let approved = library_cards::update_status(&pool, &app.id, CardStatus::Approved).await.unwrap().unwrap();
        let issue = approved.issue_date.clone().unwrap();
        let valid = approved.valid_through.clone().unwrap();
        assert_eq!(issue.len(), 10);
        assert!(valid > issue);

        let rejected = library_cards::update_status(&pool, &app.id, CardStatus::Rejected).await.unwrap().unwrap();
        assert_eq!(rejected.status, CardStatus::Rejected);
        assert_eq!(rejected.issue_date.as_deref(), Some(issue.as_str()));

        let by_card = library_cards::get_by_card_number(&pool, "LIB-2026-000001").await.unwrap().unwrap();
        assert_eq!(by_card.id, app.id);

        assert!(library_cards::create(&pool, new_application("LIB-2026-000001")).await.is_err());
    }

    #[tokio::test]
    async fn test_note_toggle_in_store() {
        let (pool, _dir) = setup_test_db().await;
        let note = notes::create(
            &pool,
            NewNote {
                class: "FSc-I".to_string(),
                subject: "Math".to_string(),
                title: "Limits".to_string(),
                description: "Ch. 2".to_string(),
                pdf_path: String::new(),
            },
        )
        .await
        .unwrap();
        assert_eq!(note.status, ActiveStatus::Active);

        let toggled = notes::toggle_status(&pool, &note.id).await.unwrap().unwrap();
        assert_eq!(toggled.status, note.status.toggled());
        assert!(notes::list_active(&pool).await.unwrap().is_empty());
        let restored = notes::toggle_status(&pool, &note.id).await.unwrap().unwrap();
        assert_eq!(restored.status, ActiveStatus::Active);
    }

    #[tokio::test]
    async fn test_new_ids_are_unique() {
        let a = store::new_id();
        let b = store::new_id();
        assert_ne!(a, b);
        assert!(uuid::Uuid::parse_str(&a).is_ok());
    }
}
