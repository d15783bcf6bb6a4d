//! Integration tests for the Chantier API.
//!
//! End-to-end checks of the sharing and access model through the HTTP
//! surface: library visibility via shares, pending-share invisibility,
//! cascade deletes, batch-move skip semantics, self-share rejection,
//! folder subtree reassignment and transitive project→library access.
//!
//! All tests skip (and log) when `DATABASE_URL` is not set.

mod common;

use axum::http::StatusCode;
use chantier_shared::models::folder::{ProjectFolder, SystemFolder};
use common::TestContext;
use serde_json::json;

/// Extracts the "id" field of a JSON response object
fn id_of(value: &serde_json::Value) -> String {
    value["id"].as_str().expect("response has an id").to_string()
}

#[tokio::test]
async fn test_library_visibility_through_share() {
    let Some(ctx) = TestContext::new().await else { return };

    let alice = ctx.create_user(chantier_shared::models::user::UserRole::User).await;
    let bob = ctx.create_user(chantier_shared::models::user::UserRole::User).await;

    // Alice owns a private library
    let (status, library) = ctx
        .request(
            "POST",
            "/v1/libraries",
            Some(&alice.token),
            Some(json!({ "name": "Bibliothèque gros œuvre" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let library_id = id_of(&library);

    // Bob cannot see it, and cannot learn that it exists
    let (status, _) = ctx
        .request(
            "GET",
            &format!("/v1/libraries/{}", library_id),
            Some(&bob.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Alice shares it with Bob as viewer
    let (status, _) = ctx
        .request(
            "POST",
            &format!("/v1/libraries/{}/shares", library_id),
            Some(&alice.token),
            Some(json!({ "email": bob.user.email, "role": "viewer" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // Bob can now read it, with viewer role
    let (status, body) = ctx
        .request(
            "GET",
            &format!("/v1/libraries/{}", library_id),
            Some(&bob.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["access_role"], "viewer");

    // But a viewer cannot add articles
    let (status, _) = ctx
        .request(
            "POST",
            &format!("/v1/libraries/{}/articles", library_id),
            Some(&bob.token),
            Some(json!({
                "designation": "Béton C25/30",
                "lot": "Gros œuvre",
                "unit": "m3",
                "unit_price": 120.0
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    ctx.cleanup_user(alice.user.id).await;
    ctx.cleanup_user(bob.user.id).await;
}

#[tokio::test]
async fn test_pending_share_invisible_until_accepted() {
    let Some(ctx) = TestContext::new().await else { return };

    let alice = ctx.create_user(chantier_shared::models::user::UserRole::User).await;
    let bob = ctx.create_user(chantier_shared::models::user::UserRole::User).await;

    let (status, project) = ctx
        .request(
            "POST",
            "/v1/projects",
            Some(&alice.token),
            Some(json!({ "name": "Immeuble rue Paul Bellamy" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let project_id = id_of(&project);

    let (status, share) = ctx
        .request(
            "POST",
            &format!("/v1/projects/{}/shares", project_id),
            Some(&alice.token),
            Some(json!({ "email": bob.user.email, "role": "editor" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(share["status"], "pending");
    let share_id = id_of(&share);

    // Pending: the project must not appear in Bob's listing, and Bob must
    // not be able to read it
    let (_, listing) = ctx.request("GET", "/v1/projects", Some(&bob.token), None).await;
    assert!(!listing
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p["id"] == project_id.as_str()));

    let (status, _) = ctx
        .request(
            "GET",
            &format!("/v1/projects/{}", project_id),
            Some(&bob.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Bob accepts
    let (status, _) = ctx
        .request(
            "POST",
            &format!("/v1/project-shares/{}/accept", share_id),
            Some(&bob.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // Accepted: visible, and filed under Bob's "Projets partagés" folder
    let shared_folder = ProjectFolder::system(&ctx.db, bob.user.id, SystemFolder::Shared)
        .await
        .unwrap()
        .unwrap();

    let (_, listing) = ctx.request("GET", "/v1/projects", Some(&bob.token), None).await;
    let entry = listing
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["id"] == project_id.as_str())
        .expect("accepted share appears in listing")
        .clone();
    assert_eq!(entry["folder_id"], shared_folder.id.to_string());

    ctx.cleanup_user(alice.user.id).await;
    ctx.cleanup_user(bob.user.id).await;
}

#[tokio::test]
async fn test_library_delete_cascades_articles() {
    let Some(ctx) = TestContext::new().await else { return };

    let alice = ctx.create_user(chantier_shared::models::user::UserRole::User).await;

    let (_, library) = ctx
        .request(
            "POST",
            "/v1/libraries",
            Some(&alice.token),
            Some(json!({ "name": "Second œuvre" })),
        )
        .await;
    let library_id = id_of(&library);

    let mut article_ids = Vec::new();
    for designation in ["Cloison BA13", "Faux plafond", "Peinture mate"] {
        let (status, article) = ctx
            .request(
                "POST",
                &format!("/v1/libraries/{}/articles", library_id),
                Some(&alice.token),
                Some(json!({
                    "designation": designation,
                    "lot": "Plâtrerie",
                    "unit": "m²",
                    "unit_price": 25.0
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        article_ids.push(id_of(&article));
    }

    let (status, body) = ctx
        .request(
            "DELETE",
            &format!("/v1/libraries/{}", library_id),
            Some(&alice.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted_articles"], 3);

    // Every article id is gone
    for article_id in &article_ids {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles WHERE id = $1::uuid")
            .bind(article_id)
            .fetch_one(&ctx.db)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    ctx.cleanup_user(alice.user.id).await;
}

#[tokio::test]
async fn test_batch_move_skips_non_editable_sources() {
    let Some(ctx) = TestContext::new().await else { return };

    let alice = ctx.create_user(chantier_shared::models::user::UserRole::User).await;
    let bob = ctx.create_user(chantier_shared::models::user::UserRole::User).await;

    // Bob owns a source library with two articles and the target library
    let (_, source) = ctx
        .request("POST", "/v1/libraries", Some(&bob.token), Some(json!({ "name": "Source" })))
        .await;
    let source_id = id_of(&source);
    let (_, target) = ctx
        .request("POST", "/v1/libraries", Some(&bob.token), Some(json!({ "name": "Cible" })))
        .await;
    let target_id = id_of(&target);

    let mut movable_ids = Vec::new();
    for designation in ["Article un", "Article deux"] {
        let (_, article) = ctx
            .request(
                "POST",
                &format!("/v1/libraries/{}/articles", source_id),
                Some(&bob.token),
                Some(json!({
                    "designation": designation,
                    "lot": "Divers",
                    "unit": "u",
                    "unit_price": 10.0
                })),
            )
            .await;
        movable_ids.push(id_of(&article));
    }

    // Alice owns a library Bob has no grant on
    let (_, foreign) = ctx
        .request("POST", "/v1/libraries", Some(&alice.token), Some(json!({ "name": "Privée" })))
        .await;
    let foreign_id = id_of(&foreign);
    let (_, foreign_article) = ctx
        .request(
            "POST",
            &format!("/v1/libraries/{}/articles", foreign_id),
            Some(&alice.token),
            Some(json!({
                "designation": "Hors de portée",
                "lot": "Divers",
                "unit": "u",
                "unit_price": 99.0
            })),
        )
        .await;
    let foreign_article_id = id_of(&foreign_article);

    // Bob requests all three moves: the foreign article is skipped, not an
    // error
    let (status, body) = ctx
        .request(
            "POST",
            "/v1/articles/move",
            Some(&bob.token),
            Some(json!({
                "article_ids": [movable_ids[0], movable_ids[1], foreign_article_id],
                "target_library_id": target_id
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["moved_count"], 2);
    assert_eq!(body["total_requested"], 3);

    // The skipped article kept its original library
    let library_id: String = sqlx::query_scalar(
        "SELECT library_id::text FROM articles WHERE id = $1::uuid",
    )
    .bind(&foreign_article_id)
    .fetch_one(&ctx.db)
    .await
    .unwrap();
    assert_eq!(library_id, foreign_id);

    ctx.cleanup_user(alice.user.id).await;
    ctx.cleanup_user(bob.user.id).await;
}

#[tokio::test]
async fn test_self_share_rejected() {
    let Some(ctx) = TestContext::new().await else { return };

    let alice = ctx.create_user(chantier_shared::models::user::UserRole::User).await;

    let (_, project) = ctx
        .request(
            "POST",
            "/v1/projects",
            Some(&alice.token),
            Some(json!({ "name": "Projet solo" })),
        )
        .await;
    let project_id = id_of(&project);

    let (status, _) = ctx
        .request(
            "POST",
            &format!("/v1/projects/{}/shares", project_id),
            Some(&alice.token),
            Some(json!({ "email": alice.user.email, "role": "viewer" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    ctx.cleanup_user(alice.user.id).await;
}

#[tokio::test]
async fn test_folder_delete_reassigns_subtree() {
    let Some(ctx) = TestContext::new().await else { return };

    let alice = ctx.create_user(chantier_shared::models::user::UserRole::User).await;

    let (_, folder) = ctx
        .request(
            "POST",
            "/v1/folders",
            Some(&alice.token),
            Some(json!({ "name": "Chantiers 2025" })),
        )
        .await;
    let folder_id = id_of(&folder);

    let (_, subfolder) = ctx
        .request(
            "POST",
            "/v1/folders",
            Some(&alice.token),
            Some(json!({ "name": "Nantes", "parent_folder_id": folder_id })),
        )
        .await;
    let subfolder_id = id_of(&subfolder);

    let (_, p1) = ctx
        .request(
            "POST",
            "/v1/projects",
            Some(&alice.token),
            Some(json!({ "name": "P1", "folder_id": folder_id })),
        )
        .await;
    let (_, p3) = ctx
        .request(
            "POST",
            "/v1/projects",
            Some(&alice.token),
            Some(json!({ "name": "P3", "folder_id": subfolder_id })),
        )
        .await;

    let (status, body) = ctx
        .request(
            "DELETE",
            &format!("/v1/folders/{}", folder_id),
            Some(&alice.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted_folders"], 2);
    assert_eq!(body["reassigned_projects"], 2);

    // Both projects now sit in "Mes projets"
    let my_projects = ProjectFolder::system(&ctx.db, alice.user.id, SystemFolder::MyProjects)
        .await
        .unwrap()
        .unwrap();

    for project in [&p1, &p3] {
        let folder: String = sqlx::query_scalar(
            "SELECT folder_id::text FROM projects WHERE id = $1::uuid",
        )
        .bind(id_of(project))
        .fetch_one(&ctx.db)
        .await
        .unwrap();
        assert_eq!(folder, my_projects.id.to_string());
    }

    // The subtree itself is gone
    for folder in [&folder_id, &subfolder_id] {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM project_folders WHERE id = $1::uuid",
        )
        .bind(folder)
        .fetch_one(&ctx.db)
        .await
        .unwrap();
        assert_eq!(count, 0);
    }

    ctx.cleanup_user(alice.user.id).await;
}

#[tokio::test]
async fn test_system_folder_protected() {
    let Some(ctx) = TestContext::new().await else { return };

    let alice = ctx.create_user(chantier_shared::models::user::UserRole::User).await;

    let my_projects = ProjectFolder::system(&ctx.db, alice.user.id, SystemFolder::MyProjects)
        .await
        .unwrap()
        .unwrap();

    let (status, _) = ctx
        .request(
            "PUT",
            &format!("/v1/folders/{}", my_projects.id),
            Some(&alice.token),
            Some(json!({ "name": "Renommé" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .request(
            "DELETE",
            &format!("/v1/folders/{}", my_projects.id),
            Some(&alice.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    ctx.cleanup_user(alice.user.id).await;
}

#[tokio::test]
async fn test_transitive_project_library_access() {
    let Some(ctx) = TestContext::new().await else { return };

    let alice = ctx.create_user(chantier_shared::models::user::UserRole::User).await;
    let bob = ctx.create_user(chantier_shared::models::user::UserRole::User).await;
    let carol = ctx.create_user(chantier_shared::models::user::UserRole::User).await;

    // Alice owns project P, shared with Bob (editor) and Carol (viewer)
    let (_, project) = ctx
        .request(
            "POST",
            "/v1/projects",
            Some(&alice.token),
            Some(json!({ "name": "Groupe scolaire" })),
        )
        .await;
    let project_id = id_of(&project);

    for (user, role) in [(&bob, "editor"), (&carol, "viewer")] {
        let (_, share) = ctx
            .request(
                "POST",
                &format!("/v1/projects/{}/shares", project_id),
                Some(&alice.token),
                Some(json!({ "email": user.user.email, "role": role })),
            )
            .await;
        let (status, _) = ctx
            .request(
                "POST",
                &format!("/v1/project-shares/{}/accept", id_of(&share)),
                Some(&user.token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    // Bob owns library L2 and links it to P (editor on P, owner of L2)
    let (_, library) = ctx
        .request(
            "POST",
            "/v1/libraries",
            Some(&bob.token),
            Some(json!({ "name": "Bibliothèque de Bob" })),
        )
        .await;
    let library_id = id_of(&library);

    let (status, _) = ctx
        .request(
            "POST",
            &format!("/v1/projects/{}/libraries", project_id),
            Some(&bob.token),
            Some(json!({ "library_id": library_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // Carol has no share on L2, but her viewer role on P grants viewer on
    // L2 through the link
    let (status, body) = ctx
        .request(
            "GET",
            &format!("/v1/libraries/{}", library_id),
            Some(&carol.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["access_role"], "viewer");

    // Viewer is not enough to write
    let (status, _) = ctx
        .request(
            "POST",
            &format!("/v1/libraries/{}/articles", library_id),
            Some(&carol.token),
            Some(json!({
                "designation": "Tentative",
                "lot": "Divers",
                "unit": "u",
                "unit_price": 1.0
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Alice owns P, so she derives editor on L2 and may write
    let (status, _) = ctx
        .request(
            "POST",
            &format!("/v1/libraries/{}/articles", library_id),
            Some(&alice.token),
            Some(json!({
                "designation": "Ajout via chantier",
                "lot": "Divers",
                "unit": "u",
                "unit_price": 5.0
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // The listing reports L2 once for Carol, not once per matching grant
    let (_, listing) = ctx.request("GET", "/v1/libraries", Some(&carol.token), None).await;
    let occurrences = listing
        .as_array()
        .unwrap()
        .iter()
        .filter(|l| l["id"] == library_id.as_str())
        .count();
    assert_eq!(occurrences, 1);

    ctx.cleanup_user(alice.user.id).await;
    ctx.cleanup_user(bob.user.id).await;
    ctx.cleanup_user(carol.user.id).await;
}

#[tokio::test]
async fn test_csv_article_import_reports_row_errors() {
    let Some(ctx) = TestContext::new().await else { return };

    let alice = ctx.create_user(chantier_shared::models::user::UserRole::User).await;

    let (_, library) = ctx
        .request(
            "POST",
            "/v1/libraries",
            Some(&alice.token),
            Some(json!({ "name": "Import" })),
        )
        .await;
    let library_id = id_of(&library);

    let csv = "designation,lot,sous_categorie,unite,prix_unitaire,statut\n\
               Cloison BA13,Plâtrerie,Cloisons,m²,38.50,actif\n\
               ,Plâtrerie,,m²,10.00,\n\
               Peinture mate,Peinture,,m²,\"12,00\",\n";

    let (status, body) = ctx
        .request_text(
            "POST",
            &format!("/v1/libraries/{}/import", library_id),
            &alice.token,
            csv,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["created"], 2);
    assert_eq!(body["total_rows"], 3);
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);
    assert_eq!(body["errors"][0]["line"], 3);

    ctx.cleanup_user(alice.user.id).await;
}

#[tokio::test]
async fn test_unauthenticated_requests_rejected() {
    let Some(ctx) = TestContext::new().await else { return };

    let (status, _) = ctx.request("GET", "/v1/projects", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx
        .request("GET", "/v1/libraries", Some("not-a-valid-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_user_deletion_cascades() {
    let Some(ctx) = TestContext::new().await else { return };

    let admin = ctx.create_user(chantier_shared::models::user::UserRole::Admin).await;
    let victim = ctx.create_user(chantier_shared::models::user::UserRole::User).await;

    let (_, project) = ctx
        .request(
            "POST",
            "/v1/projects",
            Some(&victim.token),
            Some(json!({ "name": "Éphémère" })),
        )
        .await;
    let (_, library) = ctx
        .request(
            "POST",
            "/v1/libraries",
            Some(&victim.token),
            Some(json!({ "name": "Éphémère" })),
        )
        .await;

    // A non-admin cannot touch the endpoint
    let (status, _) = ctx
        .request(
            "DELETE",
            &format!("/v1/admin/users/{}", admin.user.id),
            Some(&victim.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admins cannot delete themselves
    let (status, _) = ctx
        .request(
            "DELETE",
            &format!("/v1/admin/users/{}", admin.user.id),
            Some(&admin.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = ctx
        .request(
            "DELETE",
            &format!("/v1/admin/users/{}", victim.user.id),
            Some(&admin.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted_projects"], 1);
    assert_eq!(body["deleted_libraries"], 1);

    for (table, id) in [("projects", id_of(&project)), ("libraries", id_of(&library))] {
        let count: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {} WHERE id = $1::uuid", table))
                .bind(id)
                .fetch_one(&ctx.db)
                .await
                .unwrap();
        assert_eq!(count, 0);
    }

    ctx.cleanup_user(admin.user.id).await;
}
