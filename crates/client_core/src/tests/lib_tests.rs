use super::*;
use crate::{
    mock_server::{spawn_agenda_server, MockAgendaServer},
    transport::RestTransport,
};
use axum::http::Method;
use serde_json::json;
use shared::{
    domain::{ItemId, SpeakerId, UserId},
    protocol::ItemDraft,
    tree::TreeNode,
};

async fn controller() -> (AgendaController, MockAgendaServer) {
    let (server_url, server) = spawn_agenda_server().await;
    let client = AgendaClient::new(&server_url).expect("client");
    (AgendaController::new(client), server)
}

#[test]
fn transport_keeps_base_path_prefix() {
    let transport = RestTransport::new("http://example.com/meetings").expect("transport");
    assert_eq!(
        transport.url("rest/agenda/item/").expect("url").as_str(),
        "http://example.com/meetings/rest/agenda/item/"
    );
    assert_eq!(
        transport.url("/rest/core/tag/").expect("url").as_str(),
        "http://example.com/meetings/rest/core/tag/"
    );
}

#[test]
fn client_rejects_unparseable_server_url() {
    let err = AgendaClient::new("not a url").err().expect("invalid url");
    assert!(matches!(err, ClientError::InvalidUrl { .. }), "{err:?}");
}

#[test]
fn alert_carries_error_detail() {
    let alert = Alert::from_error(&ClientError::Validation("title must not be empty".into()));
    assert!(alert.is_visible());
    assert_eq!(alert.message(), Some("invalid input: title must not be empty"));
    assert_eq!(Alert::default().message(), None);
}

#[tokio::test]
async fn missing_item_surfaces_server_detail_and_status() {
    let (controller, _server) = controller().await;
    let err = controller
        .client()
        .items
        .find(ItemId(999))
        .await
        .expect_err("missing item");
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.detail(), "Not found.");
}

#[tokio::test]
async fn item_types_come_from_options_metadata() {
    let (controller, _server) = controller().await;
    let types = controller.client().item_types().await.expect("types");
    let names: Vec<&str> = types.iter().map(|t| t.display_name.as_str()).collect();
    assert_eq!(names, vec!["Agenda item", "Hidden item"]);
}

#[tokio::test]
async fn project_agenda_replaces_projector_content() {
    let (controller, server) = controller().await;
    assert!(!controller.is_agenda_projected().await);

    controller.project_agenda().await.expect("project");

    let bodies = server
        .requests_to(Method::POST, "/rest/core/projector/1/prune_elements/")
        .await;
    assert_eq!(bodies, vec![json!([{"name": "agenda/item-list"}])]);

    // Only the cached projector is consulted.
    assert!(!controller.is_agenda_projected().await);
    controller.client().projector().await.expect("projector");
    assert!(controller.is_agenda_projected().await);
}

#[tokio::test]
async fn project_list_of_speakers_names_the_item() {
    let (controller, server) = controller().await;
    controller
        .project_list_of_speakers(ItemId(2))
        .await
        .expect("project");

    let bodies = server
        .requests_to(Method::POST, "/rest/core/projector/1/prune_elements/")
        .await;
    assert_eq!(
        bodies,
        vec![json!([{"name": "agenda/item", "id": 2, "list_of_speakers": true}])]
    );
}

#[tokio::test]
async fn projecting_to_unknown_projector_fails() {
    let (server_url, _server) = spawn_agenda_server().await;
    let client = AgendaClient::new(&server_url)
        .expect("client")
        .with_projector(shared::domain::ProjectorId(9));
    let err = client
        .project(&[shared::domain::ProjectorElement::agenda_list()])
        .await
        .expect_err("unknown projector");
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn add_speaker_posts_user_and_refreshes_cached_item() {
    let (controller, server) = controller().await;
    let mut subscription = controller.client().items.subscribe(ItemId(3));

    let alert = controller.add_speaker(ItemId(3), UserId(6)).await;
    assert_eq!(alert, Alert::Hidden);

    let bodies = server
        .requests_to(Method::POST, "/rest/agenda/item/3/manage_speaker/")
        .await;
    assert_eq!(bodies, vec![json!({"user": 6})]);

    match subscription.try_recv() {
        Some(StoreEvent::Changed(item)) => {
            assert_eq!(item.speakers.len(), 1);
            assert_eq!(item.speakers[0].user_id, UserId(6));
        }
        other => panic!("unexpected event: {other:?}"),
    }
    let cached = controller.client().items.get(ItemId(3)).await.expect("cached");
    assert_eq!(cached.waiting_speakers().count(), 1);
}

#[tokio::test]
async fn add_speaker_to_closed_list_shows_server_detail() {
    let (controller, server) = controller().await;
    let item = controller
        .client()
        .items
        .find(ItemId(1))
        .await
        .expect("item");

    let saved = controller.close_list(&item, true).await.expect("close");
    assert!(saved.speaker_list_closed);
    let puts = server.requests_to(Method::PUT, "/rest/agenda/item/1/").await;
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0]["speaker_list_closed"], json!(true));
    assert_eq!(puts[0]["title"], json!("Opening"));

    let alert = controller.add_speaker(ItemId(1), UserId(5)).await;
    assert_eq!(
        alert,
        Alert::Danger("The list of speakers is closed.".to_string())
    );
}

#[tokio::test]
async fn remove_speaker_sends_speaker_in_delete_body() {
    let (controller, server) = controller().await;

    let alert = controller.remove_speaker(ItemId(2), SpeakerId(22)).await;
    assert_eq!(alert, Alert::Hidden);
    let bodies = server
        .requests_to(Method::DELETE, "/rest/agenda/item/2/manage_speaker/")
        .await;
    assert_eq!(bodies, vec![json!({"speaker": 22})]);

    let alert = controller.remove_speaker(ItemId(2), SpeakerId(22)).await;
    assert_eq!(alert.message(), Some("Speaker does not exist."));
}

#[tokio::test]
async fn begin_and_end_speech_update_the_queue() {
    let (controller, server) = controller().await;

    let alert = controller.begin_speech(ItemId(2), None).await;
    assert_eq!(alert, Alert::Hidden);
    let bodies = server
        .requests_to(Method::PUT, "/rest/agenda/item/2/speak/")
        .await;
    assert_eq!(bodies, vec![json!({})]);

    let item = controller.client().items.get(ItemId(2)).await.expect("cached");
    assert_eq!(item.waiting_speakers().count(), 0);
    assert_eq!(item.current_speaker().map(|s| s.id), Some(SpeakerId(21)));

    let alert = controller.end_speech(ItemId(2)).await;
    assert_eq!(alert, Alert::Hidden);
    let item = controller.client().items.get(ItemId(2)).await.expect("cached");
    assert_eq!(item.current_speaker().map(|s| s.id), Some(SpeakerId(22)));
}

#[tokio::test]
async fn begin_speech_of_named_speaker_sends_its_id() {
    let (controller, server) = controller().await;
    let alert = controller.begin_speech(ItemId(2), Some(SpeakerId(22))).await;
    assert_eq!(alert, Alert::Hidden);
    let bodies = server
        .requests_to(Method::PUT, "/rest/agenda/item/2/speak/")
        .await;
    assert_eq!(bodies, vec![json!({"speaker": 22})]);
}

#[tokio::test]
async fn end_speech_without_current_speaker_shows_detail() {
    let (controller, _server) = controller().await;
    let alert = controller.end_speech(ItemId(3)).await;
    assert_eq!(
        alert.message(),
        Some("There is no one speaking at the moment.")
    );
}

#[tokio::test]
async fn create_and_update_return_to_item_list() {
    let (controller, server) = controller().await;

    let draft = ItemDraft {
        text: Some("Quarterly numbers".into()),
        duration: Some("0:30".into()),
        item_type: Some(1),
        ..ItemDraft::titled("Report")
    };
    let saved = controller.create(&draft).await.expect("create");
    assert_eq!(saved.next, Route::ItemList);
    assert_eq!(saved.item.title, "Report");
    assert_eq!(saved.item.duration.as_deref(), Some("0:30"));
    assert_eq!(
        server.requests_to(Method::POST, "/rest/agenda/item/").await,
        vec![json!({"title": "Report", "text": "Quarterly numbers", "duration": "0:30", "type": 1})]
    );

    let mut item = saved.item;
    item.title = "Annual report".into();
    let saved = controller.update(&item).await.expect("update");
    assert_eq!(saved.next, Route::ItemList);
    assert_eq!(saved.item.title, "Annual report");
    let cached = controller.client().items.get(item.id).await.expect("cached");
    assert_eq!(cached.title, "Annual report");
}

#[tokio::test]
async fn delete_removes_item_and_notifies_subscribers() {
    let (controller, server) = controller().await;
    controller.client().items.find(ItemId(3)).await.expect("item");
    let mut subscription = controller.client().items.subscribe(ItemId(3));

    controller.delete(ItemId(3)).await.expect("delete");

    match subscription.try_recv() {
        Some(StoreEvent::Removed(id)) => assert_eq!(id, ItemId(3)),
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(controller.client().items.get(ItemId(3)).await.is_none());
    assert_eq!(
        server
            .requests_to(Method::DELETE, "/rest/agenda/item/3/")
            .await
            .len(),
        1
    );

    let err = controller.delete(ItemId(3)).await.expect_err("already gone");
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn sort_dropped_writes_whole_tree() {
    let (controller, server) = controller().await;
    let tree = vec![
        TreeNode::leaf(ItemId(3)),
        TreeNode::with_children(ItemId(1), vec![TreeNode::leaf(ItemId(2))]),
    ];

    controller.sort_dropped(&tree).await.expect("sort");

    assert_eq!(
        server
            .requests_to(Method::PUT, "/rest/agenda/item/tree/")
            .await,
        vec![json!({"tree": [{"id": 3}, {"id": 1, "children": [{"id": 2}]}]})]
    );
    match resolve(controller.client(), Route::ItemSort).await.expect("resolve") {
        View::ItemSort(view) => {
            assert_eq!(view.tree, tree);
            assert_eq!(view.items.len(), 3);
        }
        other => panic!("unexpected view: {other:?}"),
    }
}

#[tokio::test]
async fn import_reports_each_draft_in_input_order() {
    let (controller, server) = controller().await;
    let drafts = vec![
        ItemDraft::titled("Welcome"),
        ItemDraft::titled("reject this one"),
        ItemDraft::titled("   "),
        ItemDraft::titled("Any other business"),
    ];

    let importer = controller.importer().with_concurrency(2);
    let progress = importer.progress();
    let report = importer.run(drafts).await;

    let titles: Vec<&str> = report.outcomes.iter().map(|o| o.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Welcome", "reject this one", "   ", "Any other business"]
    );
    let indexes: Vec<usize> = report.outcomes.iter().map(|o| o.index).collect();
    assert_eq!(indexes, vec![0, 1, 2, 3]);

    assert!(report.outcomes[0].result.is_ok());
    assert_eq!(
        report.outcomes[1].result,
        Err("Title is not allowed.".to_string())
    );
    assert_eq!(
        report.outcomes[2].result,
        Err("invalid input: title must not be empty".to_string())
    );
    assert!(report.outcomes[3].result.is_ok());
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 2);

    let created = report.created_ids();
    assert_eq!(created.len(), 2);
    assert_ne!(created[0], created[1]);
    for id in created {
        assert!(controller.client().items.get(id).await.is_some());
    }

    assert_eq!(
        *progress.borrow(),
        ImportProgress {
            total: 4,
            completed: 4,
            succeeded: 2,
            failed: 2,
        }
    );
    // The blank title never reaches the server.
    assert_eq!(
        server
            .requests_to(Method::POST, "/rest/agenda/item/")
            .await
            .len(),
        3
    );
}

#[tokio::test]
async fn empty_import_is_immediately_done() {
    let (controller, _server) = controller().await;
    let importer = controller.importer();
    let progress = importer.progress();
    let report = importer.run(Vec::new()).await;
    assert!(report.outcomes.is_empty());
    assert!(progress.borrow().is_done());
}
