use sqlx::SqlitePool;

pub async fn init_db(pool: &SqlitePool) -> anyhow::Result<()> {
    // Pragmas for better durability/performance
    if let Err(e) = sqlx::query("PRAGMA journal_mode=WAL;").execute(pool).await {
        tracing::warn!("Failed to set WAL journal mode: {}", e);
    }
    if let Err(e) = sqlx::query("PRAGMA synchronous=NORMAL;").execute(pool).await {
        tracing::warn!("Failed to set synchronous mode: {}", e);
    }
    if let Err(e) = sqlx::query("PRAGMA busy_timeout=10000;").execute(pool).await {
        tracing::warn!("Failed to set busy_timeout: {}", e);
    }

    let tables = [
        r#"CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            username TEXT NULL UNIQUE,
            password TEXT NOT NULL,
            full_name TEXT NULL,
            phone TEXT NULL,
            roll_number TEXT NULL,
            department TEXT NULL,
            student_class TEXT NULL,
            type TEXT NOT NULL DEFAULT 'user',
            is_admin INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
            updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now'))
        )"#,
        r#"CREATE TABLE IF NOT EXISTS user_roles (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'user',
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now'))
        )"#,
        r#"CREATE TABLE IF NOT EXISTS profiles (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL UNIQUE,
            full_name TEXT NOT NULL,
            phone TEXT NULL,
            roll_number TEXT NULL,
            department TEXT NULL,
            student_class TEXT NULL,
            type TEXT NOT NULL DEFAULT 'user',
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
            updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now'))
        )"#,
        r#"CREATE TABLE IF NOT EXISTS books (
            id TEXT PRIMARY KEY,
            book_name TEXT NOT NULL,
            short_intro TEXT NOT NULL,
            description TEXT NOT NULL,
            book_image TEXT NULL,
            total_copies INTEGER NOT NULL DEFAULT 1,
            available_copies INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
            updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now'))
        )"#,
        r#"CREATE TABLE IF NOT EXISTS library_card_applications (
            id TEXT PRIMARY KEY,
            user_id TEXT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            father_name TEXT NULL,
            dob TEXT NULL,
            class TEXT NOT NULL,
            field TEXT NULL,
            roll_no TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT NOT NULL,
            address_street TEXT NOT NULL,
            address_city TEXT NOT NULL,
            address_state TEXT NOT NULL,
            address_zip TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            card_number TEXT NULL UNIQUE,
            student_id TEXT NULL,
            issue_date TEXT NULL,
            valid_through TEXT NULL,
            password TEXT NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
            updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now'))
        )"#,
        r#"CREATE TABLE IF NOT EXISTS book_borrows (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            book_id TEXT NOT NULL,
            book_title TEXT NOT NULL,
            borrower_name TEXT NOT NULL,
            borrower_phone TEXT NULL,
            borrower_email TEXT NULL,
            borrow_date TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
            due_date TEXT NOT NULL,
            return_date TEXT NULL,
            status TEXT NOT NULL DEFAULT 'borrowed',
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now'))
        )"#,
        r#"CREATE TABLE IF NOT EXISTS rare_books (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            category TEXT NOT NULL DEFAULT 'General',
            pdf_path TEXT NOT NULL,
            cover_image TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'active',
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now'))
        )"#,
        r#"CREATE TABLE IF NOT EXISTS notes (
            id TEXT PRIMARY KEY,
            class TEXT NOT NULL,
            subject TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            pdf_path TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'active',
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
            updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now'))
        )"#,
        r#"CREATE TABLE IF NOT EXISTS events (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            images TEXT NOT NULL DEFAULT '[]',
            date TEXT NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
            updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now'))
        )"#,
        r#"CREATE TABLE IF NOT EXISTS notifications (
            id TEXT PRIMARY KEY,
            title TEXT NULL,
            message TEXT NULL,
            image TEXT NULL,
            type TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now'))
        )"#,
        r#"CREATE TABLE IF NOT EXISTS contact_messages (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            subject TEXT NOT NULL,
            message TEXT NOT NULL,
            is_seen INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now'))
        )"#,
        r#"CREATE TABLE IF NOT EXISTS donations (
            id TEXT PRIMARY KEY,
            amount TEXT NOT NULL,
            method TEXT NOT NULL,
            name TEXT NULL,
            email TEXT NULL,
            message TEXT NULL,
            status TEXT NOT NULL DEFAULT 'completed',
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now'))
        )"#,
    ];

    for ddl in tables {
        sqlx::query(ddl).execute(pool).await?;
    }

    let indexes = [
        ("idx_user_roles_user", "CREATE INDEX IF NOT EXISTS idx_user_roles_user ON user_roles(user_id)"),
        ("idx_borrows_status", "CREATE INDEX IF NOT EXISTS idx_borrows_status ON book_borrows(status, created_at DESC)"),
        ("idx_notes_class_subject", "CREATE INDEX IF NOT EXISTS idx_notes_class_subject ON notes(class, subject, status)"),
        ("idx_cards_status", "CREATE INDEX IF NOT EXISTS idx_cards_status ON library_card_applications(status)"),
        ("idx_contact_seen", "CREATE INDEX IF NOT EXISTS idx_contact_seen ON contact_messages(is_seen, created_at DESC)"),
    ];

    for (name, query) in indexes {
        if let Err(e) = sqlx::query(query).execute(pool).await {
            tracing::warn!("Failed to create index {}: {}", name, e);
        }
    }

    Ok(())
}
