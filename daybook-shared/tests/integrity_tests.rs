//! Integrity rules enforced by the storage engine
//!
//! Uniqueness, foreign keys, cascading deletes, defaults and the loose
//! references on the OAuth tables.

mod common;

use daybook_shared::db::defaults::Timestamp;
use daybook_shared::error::DbError;
use daybook_shared::models::account::{Account, CreateAccount};
use daybook_shared::models::calendar_event::{CalendarEvent, CreateCalendarEvent};
use daybook_shared::models::daily_task::{CreateDailyTask, DailyTask, Priority};
use daybook_shared::models::music_playlist::{CreateMusicPlaylist, MusicPlaylist};
use daybook_shared::models::music_track::{CreateMusicTrack, MusicTrack, UpdateMusicTrack};
use daybook_shared::models::oauth_access_token::{CreateOAuthAccessToken, OAuthAccessToken};
use daybook_shared::models::oauth_application::{CreateOAuthApplication, OAuthApplication};
use daybook_shared::models::oauth_consent::{CreateOAuthConsent, OAuthConsent};
use daybook_shared::models::session::{CreateSession, Session};
use daybook_shared::models::user::{CreateUser, User};
use daybook_shared::models::verification::{CreateVerification, Verification};
use std::collections::HashSet;

const DEPENDENT_TABLES: [&str; 6] = [
    "session",
    "account",
    "calendar_events",
    "music_playlists",
    "music_tracks",
    "daily_tasks",
];

/// A user with one row in every dependent table
async fn seed_user_with_everything(pool: &sqlx::SqlitePool) -> User {
    let user = common::create_user(pool, "Grace").await;
    let start = common::morning();

    Session::create(
        pool,
        CreateSession::new(&user.id, "session-token", start.plus_seconds(3600)),
    )
    .await
    .unwrap();
    Account::create(pool, CreateAccount::new(&user.id, "credential", &user.id))
        .await
        .unwrap();
    CalendarEvent::create(
        pool,
        CreateCalendarEvent::new(&user.id, "Team Meeting", start, start.plus_seconds(3600)),
    )
    .await
    .unwrap();
    let playlist = MusicPlaylist::create(pool, CreateMusicPlaylist::new(&user.id, "Focus"))
        .await
        .unwrap();
    MusicTrack::create(
        pool,
        CreateMusicTrack::new(&playlist.id, "Blinding Lights", "The Weeknd", 200, 1),
    )
    .await
    .unwrap();
    MusicTrack::create(
        pool,
        CreateMusicTrack::new(&playlist.id, "poison", "Nobody", 1, 2),
    )
    .await
    .unwrap();
    DailyTask::create(pool, CreateDailyTask::new(&user.id, "Submit GitHub Link"))
        .await
        .unwrap();

    user
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let pool = common::setup_db().await;

    User::create(&pool, CreateUser::new("Ada", "ada@example.com"))
        .await
        .expect("First insert should succeed");

    let err = User::create(&pool, CreateUser::new("Other Ada", "ada@example.com"))
        .await
        .expect_err("Duplicate email must be rejected");

    match err {
        DbError::UniqueConstraintViolation { column } => assert_eq!(column, "user.email"),
        other => panic!("Expected unique violation, got {:?}", other),
    }
    assert_eq!(common::count_rows(&pool, "user").await, 1);
}

#[tokio::test]
async fn test_duplicate_explicit_id_rejected() {
    let pool = common::setup_db().await;

    let mut data = CreateUser::new("Ada", "ada@example.com");
    data.id = Some("fixed".to_string());
    User::create(&pool, data.clone()).await.unwrap();

    data.email = "ada2@example.com".to_string();
    let err = User::create(&pool, data).await.unwrap_err();
    assert!(matches!(err, DbError::UniqueConstraintViolation { .. }));
}

#[tokio::test]
async fn test_generated_ids_are_distinct() {
    let pool = common::setup_db().await;

    let mut ids = HashSet::new();
    for i in 0..25 {
        let user = User::create(&pool, CreateUser::new("User", format!("user{}@example.com", i)))
            .await
            .unwrap();
        assert!(!user.id.is_empty());
        ids.insert(user.id);
    }

    assert_eq!(ids.len(), 25);
}

#[tokio::test]
async fn test_defaults_applied_on_insert() {
    let pool = common::setup_db().await;
    let before = Timestamp::now();

    let user = common::create_user(&pool, "Ada").await;

    assert!(!user.email_verified);
    assert!(user.image.is_none());
    assert!(user.created_at >= before);
    assert_eq!(user.created_at, user.updated_at);
}

#[tokio::test]
async fn test_task_priority_defaults_to_medium() {
    let pool = common::setup_db().await;
    let user = common::create_user(&pool, "Ada").await;

    let task = DailyTask::create(&pool, CreateDailyTask::new(&user.id, "Complete MCP Submission"))
        .await
        .unwrap();

    assert_eq!(task.priority, Priority::Medium);
    assert!(!task.completed);

    let (stored,): (String,) = sqlx::query_as("SELECT priority FROM daily_tasks WHERE id = ?")
        .bind(&task.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, "medium");
}

#[tokio::test]
async fn test_raw_insert_uses_column_defaults() {
    let pool = common::setup_db().await;
    let user = common::create_user(&pool, "Ada").await;

    // Omit the columns with engine-side defaults
    sqlx::query(
        "INSERT INTO daily_tasks (id, user_id, title, created_at, updated_at) VALUES ('raw', ?, 'raw', 0, 0)",
    )
    .bind(&user.id)
    .execute(&pool)
    .await
    .expect("Defaults should fill the omitted columns");

    let task = DailyTask::find_by_id(&pool, "raw").await.unwrap().unwrap();
    assert_eq!(task.priority, Priority::Medium);
    assert!(!task.completed);
}

#[tokio::test]
async fn test_raw_insert_without_id_rejected() {
    let pool = common::setup_db().await;

    // Identifiers come from the insert path, never from the engine
    let result = sqlx::query(
        "INSERT INTO user (name, email, created_at, updated_at) VALUES ('x', 'x@example.com', 0, 0)",
    )
    .execute(&pool)
    .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_invalid_priority_rejected() {
    let pool = common::setup_db().await;
    let user = common::create_user(&pool, "Ada").await;

    let result = sqlx::query(
        "INSERT INTO daily_tasks (id, user_id, title, priority, created_at, updated_at) VALUES ('t', ?, 't', 'urgent', 0, 0)",
    )
    .bind(&user.id)
    .execute(&pool)
    .await;

    assert!(result.is_err(), "CHECK constraint should reject unknown priorities");
    assert!(DailyTask::find_by_id(&pool, "t").await.unwrap().is_none());
}

#[tokio::test]
async fn test_calendar_event_for_missing_user_rejected() {
    let pool = common::setup_db().await;
    let start = common::morning();

    let err = CalendarEvent::create(
        &pool,
        CreateCalendarEvent::new("no-such-user", "Ghost", start, start.plus_seconds(60)),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, DbError::ForeignKeyViolation(_)), "got {:?}", err);
    assert_eq!(common::count_rows(&pool, "calendar_events").await, 0);
}

#[tokio::test]
async fn test_track_for_missing_playlist_rejected() {
    let pool = common::setup_db().await;

    let err = MusicTrack::create(&pool, CreateMusicTrack::new("missing", "Peaches", "Justin Bieber", 198, 1))
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::ForeignKeyViolation(_)));
}

#[tokio::test]
async fn test_moving_track_to_missing_playlist_rejected() {
    let pool = common::setup_db().await;
    let user = common::create_user(&pool, "Ada").await;
    let playlist = MusicPlaylist::create(&pool, CreateMusicPlaylist::new(&user.id, "Mix"))
        .await
        .unwrap();
    let track = MusicTrack::create(&pool, CreateMusicTrack::new(&playlist.id, "Levitating", "Dua Lipa", 203, 1))
        .await
        .unwrap();

    let err = MusicTrack::update(
        &pool,
        &track.id,
        UpdateMusicTrack {
            playlist_id: Some("missing".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, DbError::ForeignKeyViolation(_)));

    let tracks = MusicTrack::list_by_playlist(&pool, &playlist.id).await.unwrap();
    assert_eq!(tracks, vec![track], "Failed update must leave the track untouched");
}

#[tokio::test]
async fn test_delete_user_cascades_to_all_dependents() {
    let pool = common::setup_db().await;
    let user = seed_user_with_everything(&pool).await;
    let bystander = seed_user_with_everything_for(&pool, "Linus").await;

    User::delete(&pool, &user.id).await.expect("Delete should succeed");

    assert!(User::find_by_id(&pool, &user.id).await.unwrap().is_none());
    for table in ["session", "account", "calendar_events", "music_playlists", "daily_tasks"] {
        let (count,): (i64,) =
            sqlx::query_as(&format!("SELECT COUNT(*) FROM \"{}\" WHERE user_id = ?", table))
                .bind(&user.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 0, "{} rows left behind", table);
    }

    // Only the bystander's two tracks remain
    assert_eq!(common::count_rows(&pool, "music_tracks").await, 2);
    assert!(User::find_by_id(&pool, &bystander.id).await.unwrap().is_some());
}

/// Same as [`seed_user_with_everything`] but with distinct unique values
async fn seed_user_with_everything_for(pool: &sqlx::SqlitePool, name: &str) -> User {
    let user = common::create_user(pool, name).await;
    Session::create(
        pool,
        CreateSession::new(&user.id, format!("{}-token", name), common::morning()),
    )
    .await
    .unwrap();
    let playlist = MusicPlaylist::create(pool, CreateMusicPlaylist::new(&user.id, "Mine"))
        .await
        .unwrap();
    for order in 1..=2 {
        MusicTrack::create(pool, CreateMusicTrack::new(&playlist.id, "Song", "Band", 100, order))
            .await
            .unwrap();
    }
    user
}

#[tokio::test]
async fn test_failed_cascade_leaves_everything_intact() {
    let pool = common::setup_db().await;
    let user = seed_user_with_everything(&pool).await;

    let mut before = Vec::new();
    for table in DEPENDENT_TABLES {
        before.push(common::count_rows(&pool, table).await);
    }

    // Abort the cascade when it reaches the second track
    sqlx::query(
        r#"
        CREATE TRIGGER abort_poison_delete BEFORE DELETE ON music_tracks
        WHEN OLD.title = 'poison'
        BEGIN
            SELECT RAISE(ABORT, 'injected fault');
        END
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    let err = User::delete(&pool, &user.id).await.unwrap_err();
    assert!(matches!(err, DbError::Database(_)), "got {:?}", err);

    assert!(User::find_by_id(&pool, &user.id).await.unwrap().is_some());
    for (table, expected) in DEPENDENT_TABLES.iter().zip(before) {
        assert_eq!(
            common::count_rows(&pool, table).await,
            expected,
            "{} changed after a failed delete",
            table
        );
    }

    // The pool must still be usable after the rollback
    sqlx::query("DROP TRIGGER abort_poison_delete")
        .execute(&pool)
        .await
        .unwrap();
    User::delete(&pool, &user.id).await.unwrap();
    assert_eq!(common::count_rows(&pool, "music_tracks").await, 0);
}

#[tokio::test]
async fn test_delete_missing_user_is_not_found() {
    let pool = common::setup_db().await;

    let err = User::delete(&pool, "missing").await.unwrap_err();
    assert!(matches!(err, DbError::NotFound { entity: "user", .. }));
}

#[tokio::test]
async fn test_delete_playlist_cascades_to_tracks() {
    let pool = common::setup_db().await;
    let user = common::create_user(&pool, "Ada").await;
    let playlist = MusicPlaylist::create(&pool, CreateMusicPlaylist::new(&user.id, "Mix"))
        .await
        .unwrap();
    MusicTrack::create(&pool, CreateMusicTrack::new(&playlist.id, "Peaches", "Justin Bieber", 198, 1))
        .await
        .unwrap();

    MusicPlaylist::delete(&pool, &playlist.id).await.unwrap();

    assert_eq!(common::count_rows(&pool, "music_tracks").await, 0);
    assert!(User::find_by_id(&pool, &user.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_session_tokens_unique() {
    let pool = common::setup_db().await;
    let ada = common::create_user(&pool, "Ada").await;
    let bob = common::create_user(&pool, "Bob").await;
    let expires = Timestamp::now().plus_seconds(3600);

    Session::create(&pool, CreateSession::new(&ada.id, "shared", expires))
        .await
        .unwrap();
    let err = Session::create(&pool, CreateSession::new(&bob.id, "shared", expires))
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::UniqueConstraintViolation { .. }));
}

#[tokio::test]
async fn test_oauth_client_and_token_uniqueness() {
    let pool = common::setup_db().await;

    let app = CreateOAuthApplication {
        client_id: Some("client-1".to_string()),
        ..Default::default()
    };
    OAuthApplication::create(&pool, app.clone()).await.unwrap();
    let err = OAuthApplication::create(&pool, app).await.unwrap_err();
    assert!(matches!(err, DbError::UniqueConstraintViolation { .. }));

    let token = CreateOAuthAccessToken {
        access_token: Some("at".to_string()),
        refresh_token: Some("rt".to_string()),
        ..Default::default()
    };
    OAuthAccessToken::create(&pool, token).await.unwrap();

    let err = OAuthAccessToken::create(
        &pool,
        CreateOAuthAccessToken {
            access_token: Some("other".to_string()),
            refresh_token: Some("rt".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    match err {
        DbError::UniqueConstraintViolation { column } => {
            assert_eq!(column, "oauth_access_token.refresh_token")
        }
        other => panic!("Expected unique violation, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unique_columns_allow_multiple_nulls() {
    let pool = common::setup_db().await;

    for _ in 0..2 {
        OAuthApplication::create(&pool, CreateOAuthApplication::default())
            .await
            .expect("NULL client ids never collide");
    }
}

#[tokio::test]
async fn test_oauth_rows_reference_missing_entities() {
    let pool = common::setup_db().await;

    let consent = OAuthConsent::create(
        &pool,
        CreateOAuthConsent {
            client_id: Some("no-such-client".to_string()),
            user_id: Some("no-such-user".to_string()),
            consent_given: Some(true),
            ..Default::default()
        },
    )
    .await
    .expect("Loose references are not checked");

    let found = OAuthConsent::find(&pool, "no-such-client", "no-such-user")
        .await
        .unwrap();
    assert_eq!(found, Some(consent));
}

#[tokio::test]
async fn test_oauth_rows_survive_user_delete() {
    let pool = common::setup_db().await;
    let user = common::create_user(&pool, "Ada").await;

    OAuthAccessToken::create(
        &pool,
        CreateOAuthAccessToken {
            access_token: Some("at".to_string()),
            user_id: Some(user.id.clone()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    User::delete(&pool, &user.id).await.unwrap();

    let token = OAuthAccessToken::find_by_access_token(&pool, "at").await.unwrap();
    assert_eq!(token.and_then(|t| t.user_id), Some(user.id));
}

#[tokio::test]
async fn test_track_order_and_current_flag_unconstrained() {
    let pool = common::setup_db().await;
    let user = common::create_user(&pool, "Ada").await;
    let playlist = MusicPlaylist::create(&pool, CreateMusicPlaylist::new(&user.id, "Mix"))
        .await
        .unwrap();

    for title in ["A", "B"] {
        let mut data = CreateMusicTrack::new(&playlist.id, title, "Band", 100, 1);
        data.is_current = Some(true);
        MusicTrack::create(&pool, data)
            .await
            .expect("Duplicate order and current flag are allowed");
    }

    let tracks = MusicTrack::list_by_playlist(&pool, &playlist.id).await.unwrap();
    assert_eq!(tracks.len(), 2);
    assert!(tracks.iter().all(|t| t.is_current && t.track_order == 1));
}

#[tokio::test]
async fn test_latest_row_wins_within_the_same_second() {
    let pool = common::setup_db().await;
    let issued = common::morning();

    // Ids sort the other way round, so only insertion order can decide
    for (id, value) in [("z-first", "111111"), ("a-second", "222222")] {
        Verification::create(
            &pool,
            CreateVerification {
                id: Some(id.to_string()),
                created_at: Some(issued),
                updated_at: Some(issued),
                ..CreateVerification::new("ada@example.com", value, issued.plus_seconds(600))
            },
        )
        .await
        .unwrap();
    }

    let found = Verification::find_by_identifier(&pool, "ada@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.value, "222222");

    for (id, given) in [("z-first", false), ("a-second", true)] {
        OAuthConsent::create(
            &pool,
            CreateOAuthConsent {
                id: Some(id.to_string()),
                client_id: Some("cli".to_string()),
                user_id: Some("u1".to_string()),
                consent_given: Some(given),
                created_at: Some(issued),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    }

    let consent = OAuthConsent::find(&pool, "cli", "u1").await.unwrap().unwrap();
    assert_eq!(consent.id, "a-second");
    assert_eq!(consent.consent_given, Some(true));

    let user = common::create_user(&pool, "Ada").await;
    for (id, token) in [("z-first", "tok-1"), ("a-second", "tok-2")] {
        Session::create(
            &pool,
            CreateSession {
                id: Some(id.to_string()),
                created_at: Some(issued),
                ..CreateSession::new(user.id.clone(), token, issued.plus_seconds(3600))
            },
        )
        .await
        .unwrap();
    }

    let sessions = Session::list_by_user(&pool, &user.id).await.unwrap();
    let tokens: Vec<&str> = sessions.iter().map(|s| s.token.as_str()).collect();
    assert_eq!(tokens, vec!["tok-2", "tok-1"]);
}

#[tokio::test]
async fn test_oauth_timestamps_stay_null_when_omitted() {
    let pool = common::setup_db().await;

    let app = OAuthApplication::create(&pool, CreateOAuthApplication::default())
        .await
        .unwrap();
    assert_eq!(app.created_at, None);
    assert_eq!(app.updated_at, None);

    let token = OAuthAccessToken::create(&pool, CreateOAuthAccessToken::default())
        .await
        .unwrap();
    assert_eq!(token.created_at, None);
    assert_eq!(token.updated_at, None);

    let consent = OAuthConsent::create(&pool, CreateOAuthConsent::default())
        .await
        .unwrap();
    assert_eq!(consent.created_at, None);
    assert_eq!(consent.updated_at, None);

    let issued = common::morning();
    let stamped = OAuthConsent::create(
        &pool,
        CreateOAuthConsent {
            created_at: Some(issued),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(stamped.created_at, Some(issued));
    assert_eq!(stamped.updated_at, None);
}
