//! End-to-end scenarios against an in-process profile server.

use std::time::Duration;

use auth::AuthenticatedUser;
use entities::{JoinedEvent, Preferences};
use profile_client::{
    ClientError, MemoryProfileCache, ProfileApi, ProfileClient, ProfileDetails, ProfileSync,
};
use profile_protocol::{ListProfilesQuery, ProfilePayload};
use profile_server::config::Config;
use profile_store::MemoryProfileStore;
use serde_json::json;
use tokio::net::TcpListener;

async fn spawn_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(profile_server::serve(
        listener,
        Config::default(),
        MemoryProfileStore::new(),
    ));

    format!("http://{addr}")
}

fn client(url: &str) -> ProfileClient {
    ProfileClient::new(url, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_update_before_create_fallback() {
    let url = spawn_server().await;
    let caller = AuthenticatedUser::new("unknown-id").with_email("bob@x.com");
    let mut sync = ProfileSync::new(client(&url), MemoryProfileCache::new(), caller);

    let saved = sync
        .update_details(ProfileDetails {
            name: "Bob".to_string(),
            location: Some("Porto".to_string()),
            ..ProfileDetails::default()
        })
        .await
        .unwrap();
    assert_eq!(saved.user_id, "unknown-id");

    let stored = client(&url).get_profile("unknown-id").await.unwrap();
    assert_eq!(stored.name, "Bob");
    assert_eq!(stored.email, "bob@x.com");
    assert_eq!(stored.location.as_deref(), Some("Porto"));
    assert_eq!(stored.preferences.email_notifications, Some(true));

    // The record exists now, so the next edit is a plain update.
    let saved = sync
        .update_preferences(Preferences::new().with_genres(["folk", "indie"]))
        .await
        .unwrap();
    assert_eq!(saved.preferences.genres().len(), 2);
    assert_eq!(saved.name, "Bob");
}

#[tokio::test]
async fn test_join_then_leave_event() {
    let url = spawn_server().await;
    let api = client(&url);
    let payload: ProfilePayload =
        serde_json::from_value(json!({ "userID": "u1", "name": "Ann", "email": "ann@x.com" }))
            .unwrap();
    api.create_profile(&payload).await.unwrap();

    let mut sync = ProfileSync::new(
        client(&url),
        MemoryProfileCache::new(),
        AuthenticatedUser::new("u1"),
    );

    let event = JoinedEvent::new("e1", "Jazz Night")
        .with_schedule("2024-06-01", "20:00")
        .with_venue("v1");
    sync.join_event(event).await.unwrap();

    let stored = api.get_profile("u1").await.unwrap();
    assert_eq!(stored.joined_events.len(), 1);
    assert_eq!(stored.joined_events[0].event_id, "e1");
    assert_eq!(stored.name, "Ann");

    sync.leave_event("e1").await.unwrap();

    let stored = api.get_profile("u1").await.unwrap();
    assert!(stored.joined_events.is_empty());
    assert_eq!(stored.email, "ann@x.com");
}

#[tokio::test]
async fn test_client_operations() {
    let url = spawn_server().await;
    let api = client(&url);
    api.health_check().await.unwrap();

    let payload: ProfilePayload =
        serde_json::from_value(json!({ "name": "Alice", "email": "alice@x.com" })).unwrap();
    let user_id = api.create_profile(&payload).await.unwrap();
    assert!(user_id.starts_with("usr-"));

    let by_email = api.get_profile("alice@x.com").await.unwrap();
    assert_eq!(by_email.user_id, user_id);

    let all = api.list_profiles(ListProfilesQuery::default()).await.unwrap();
    assert_eq!(all.len(), 1);

    let message = api.delete_profile(&user_id).await.unwrap();
    assert_eq!(message, format!("User {user_id} deleted"));

    let err = api.get_profile(&user_id).await.unwrap_err();
    assert!(err.is_not_found());

    let err = api
        .update_profile("ghost", &ProfilePayload::default())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_timeout_is_its_own_failure() {
    // Accepts connections (via the backlog) but never answers.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let api = ProfileClient::new(&url, Duration::from_millis(100)).unwrap();
    let err = api.get_profile("u1").await.unwrap_err();

    assert!(err.is_timeout(), "{err:?}");
    assert!(!err.is_not_found());
    drop(listener);
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = client(&url).get_profile("u1").await.unwrap_err();

    assert!(matches!(err, ClientError::Network(_)), "{err:?}");
}
