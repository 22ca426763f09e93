//! Drives the HTTP clients and the viewer against a real annotator server
//! listening on an ephemeral port.

use std::sync::Arc;

use annotator_server::{app, config::Config, db, state::AppState, storage::S3Client};
use annotator_viewer::{
    AuthClient, BoundingBox, ClientError, DocumentClient, DocumentViewer, FixedSelection,
    HighlightClient, HighlightPatch, HighlightService, Modifiers, NewHighlight, Rect, Session,
    ViewerConfig,
};

async fn spawn_server() -> String {
    let config = Config::default();
    let s3_client = S3Client::from_config(&config.storage);
    let pool = db::create_pool("sqlite::memory:").await.unwrap();
    let router = app(AppState::new(config, s3_client, pool));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn logged_in(base_url: &str, email: &str) -> Session {
    let auth = AuthClient::new(Session::new(base_url));
    auth.signup(email, "correct horse").await.unwrap();
    auth.login_session(email, "correct horse").await.unwrap()
}

fn new_highlight(document_id: &str, page: u32, text: &str) -> NewHighlight {
    NewHighlight {
        document_id: document_id.to_string(),
        page,
        text: text.to_string(),
        bounding_box: BoundingBox {
            x: 100.0,
            y: 200.0,
            width: 100.0,
            height: 20.0,
        },
        created_at: None,
    }
}

#[tokio::test]
async fn test_highlight_round_trip() {
    let base_url = spawn_server().await;
    let session = logged_in(&base_url, "reader@example.com").await;
    let client = HighlightClient::new(session);

    let created = client
        .create(&new_highlight("doc-1", 4, "a passage"))
        .await
        .unwrap();
    assert!(!created.id.is_empty());
    assert_eq!(created.document_id, "doc-1");
    assert_eq!(created.page, 4);

    let fetched = client.fetch_for_document("doc-1").await.unwrap();
    assert_eq!(fetched, vec![created.clone()]);

    let updated = client
        .update(
            &created.id,
            &HighlightPatch {
                text: Some("a longer passage".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.text, "a longer passage");
    assert_eq!(updated.bounding_box, created.bounding_box);

    client.delete(&created.id).await.unwrap();
    assert!(client.fetch_for_document("doc-1").await.unwrap().is_empty());

    let again = client.delete(&created.id).await;
    assert!(matches!(again, Err(ClientError::NotFound(_))));
}

#[tokio::test]
async fn test_errors_are_classified() {
    let base_url = spawn_server().await;

    let anonymous = HighlightClient::new(Session::new(&base_url));
    let err = anonymous.fetch_for_document("doc-1").await.unwrap_err();
    assert!(matches!(err, ClientError::Auth(_)));

    let forged = HighlightClient::new(Session::new(&base_url).with_token("forged"));
    let err = forged.fetch_for_document("doc-1").await.unwrap_err();
    assert_eq!(err, ClientError::Auth("Invalid token".to_string()));

    let auth = AuthClient::new(Session::new(&base_url));
    auth.signup("reader@example.com", "secret").await.unwrap();
    let err = auth.login("reader@example.com", "wrong").await.unwrap_err();
    assert!(matches!(err, ClientError::Auth(_)));

    let session = auth.login_session("reader@example.com", "secret").await.unwrap();
    let client = HighlightClient::new(session);
    let err = client
        .create(&new_highlight("doc-1", 0, "bad page"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Persistence(_)));

    let unreachable = HighlightClient::new(Session::new("http://127.0.0.1:9").with_token("t"));
    let err = unreachable.fetch_for_document("doc-1").await.unwrap_err();
    assert!(matches!(err, ClientError::Persistence(_)));
}

#[tokio::test]
async fn test_highlights_private_to_owner() {
    let base_url = spawn_server().await;
    let alice = HighlightClient::new(logged_in(&base_url, "alice@example.com").await);
    let bob = HighlightClient::new(logged_in(&base_url, "bob@example.com").await);

    let created = alice
        .create(&new_highlight("doc-1", 1, "alice's note"))
        .await
        .unwrap();

    assert!(bob.fetch_for_document("doc-1").await.unwrap().is_empty());
    assert!(matches!(
        bob.delete(&created.id).await,
        Err(ClientError::NotFound(_))
    ));
    assert_eq!(alice.fetch_for_document("doc-1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_document_routes_without_storage() {
    let base_url = spawn_server().await;
    let documents = DocumentClient::new(logged_in(&base_url, "reader@example.com").await);

    assert!(documents.list().await.unwrap().is_empty());
    assert!(matches!(
        documents.rename("missing", "new.pdf").await,
        Err(ClientError::NotFound(_))
    ));
    assert!(matches!(
        documents.delete("missing").await,
        Err(ClientError::NotFound(_))
    ));
    assert!(matches!(
        documents.download("missing").await,
        Err(ClientError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_viewer_against_server() {
    let base_url = spawn_server().await;
    let service = Arc::new(HighlightClient::new(
        logged_in(&base_url, "reader@example.com").await,
    ));
    let mut viewer = DocumentViewer::new(service.clone(), ViewerConfig::default());

    viewer.open_document("doc-1", 10).await;
    viewer.set_page(3);
    viewer.set_zoom(2.0);
    viewer.begin_selection();

    let mut selection = FixedSelection::new(
        Rect::new(110.0, 210.0, 100.0, 20.0),
        "captured on page three",
        Rect::new(10.0, 10.0, 1200.0, 1600.0),
    );
    assert!(viewer.capture(&mut selection).await);

    let saved = service.fetch_for_document("doc-1").await.unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].page, 3);
    assert_eq!(
        saved[0].bounding_box,
        BoundingBox {
            x: 50.0,
            y: 100.0,
            width: 50.0,
            height: 10.0
        }
    );

    // A fresh viewer at a different zoom sees the same highlight
    let mut reopened = DocumentViewer::new(service.clone(), ViewerConfig::default());
    reopened.open_document("doc-1", 10).await;
    reopened.set_page(3);
    let overlays = reopened.overlays();
    assert_eq!(overlays.len(), 1);
    assert_eq!(overlays[0].rect.left, 50.0);
    assert_eq!(overlays[0].rect.width, 50.0);

    let id = overlays[0].id.clone();
    assert!(reopened.remove_highlight(&id, Modifiers::SHIFT).await);
    assert!(service.fetch_for_document("doc-1").await.unwrap().is_empty());
}
