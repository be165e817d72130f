pub mod approvals;

pub mod auth;

pub mod files;

pub mod folders;

pub mod notifications;

pub mod onboarding;

pub mod system;

pub mod users;

pub mod workspaces;

pub use approvals::configure_approval_routes;
pub use auth::configure_auth_routes;
pub use files::configure_file_routes;
pub use folders::configure_folder_routes;
pub use notifications::configure_notification_routes;
pub use onboarding::configure_onboarding_routes;
pub use system::configure_system_routes;
pub use users::configure_user_routes;
pub use workspaces::configure_workspace_routes;

/// 注册全部 API 路由
pub fn configure_api_routes(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.configure(configure_auth_routes)
        .configure(configure_user_routes)
        .configure(configure_workspace_routes)
        .configure(configure_folder_routes)
        .configure(configure_file_routes)
        .configure(configure_approval_routes)
        .configure(configure_notification_routes)
        .configure(configure_onboarding_routes)
        .configure(configure_system_routes);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test, web};
    use serde_json::{Value, json};

    use super::configure_api_routes;
    use crate::config::OutboxConfig;
    use crate::models::users::entities::User;
    use crate::services::{OutboxDispatcher, OutboxNotifier};
    use crate::storage::Storage;
    use crate::storage::sea_orm_storage::testing::{memory_storage, seed_file, seed_user};
    use crate::utils::jwt::JwtUtils;

    fn bearer(user: &User) -> (&'static str, String) {
        let token = JwtUtils::generate_access_token(user.id, user.is_admin).expect("token");
        ("Authorization", format!("Bearer {token}"))
    }

    #[actix_web::test]
    async fn test_approval_flow_over_http() {
        let seaorm = memory_storage().await;
        let owner = seed_user(&seaorm, "owner").await;
        let approver = seed_user(&seaorm, "approver").await;
        let file = seed_file(&seaorm, &owner, "report.pdf").await;
        let storage: Arc<dyn Storage> = Arc::new(seaorm);
        let notifier = OutboxNotifier::new();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage.clone()))
                .app_data(web::Data::new(notifier.clone()))
                .configure(configure_api_routes),
        )
        .await;

        // 未带 token
        let req = test::TestRequest::get().uri("/api/v1/approvals").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        // 审批人不能操作别人的文件
        let req = test::TestRequest::post()
            .uri("/api/v1/approvals")
            .insert_header(bearer(&approver))
            .set_json(json!({ "file_id": file.id, "approver_id": owner.id }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::post()
            .uri("/api/v1/approvals")
            .insert_header(bearer(&owner))
            .set_json(json!({
                "file_id": file.id,
                "approver_id": approver.id,
                "note": "please check"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        let approval_id = body["data"]["approval"]["id"].as_i64().expect("approval id");
        let version = body["data"]["approval"]["version"].as_i64().expect("version");
        assert_eq!(body["data"]["approval"]["status"], "pending");

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/approvals/{approval_id}/escalate"))
            .insert_header(bearer(&approver))
            .set_json(json!({ "version": version }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        // 发起人不能批准自己的请求
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/approvals/{approval_id}/approve"))
            .insert_header(bearer(&owner))
            .set_json(json!({ "version": version }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/approvals/{approval_id}/approve"))
            .insert_header(bearer(&approver))
            .set_json(json!({ "version": version, "remarks": "ok" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["approval"]["status"], "approved");

        // 旧版本再提交一次，返回冲突和当前记录
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/approvals/{approval_id}/reject"))
            .insert_header(bearer(&approver))
            .set_json(json!({ "version": version }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 5002);
        assert_eq!(body["data"]["approval"]["status"], "approved");

        let dispatcher =
            OutboxDispatcher::new(storage.clone(), notifier.clone(), OutboxConfig::default());
        assert_eq!(dispatcher.run_once().await.expect("dispatch"), 2);

        for user in [&owner, &approver] {
            let req = test::TestRequest::get()
                .uri("/api/v1/notifications/unread-count")
                .insert_header(bearer(user))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["data"]["unread_count"], 1);
        }
    }

    #[actix_web::test]
    async fn test_non_admin_cannot_list_users() {
        let seaorm = memory_storage().await;
        let user = seed_user(&seaorm, "plain").await;
        let storage: Arc<dyn Storage> = Arc::new(seaorm);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage))
                .configure(configure_api_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/v1/users")
            .insert_header(bearer(&user))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri("/api/v1/workspaces")
            .insert_header(bearer(&user))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_folder_move_and_delete_rules() {
        use crate::models::folders::requests::CreateFolderRequest;

        let seaorm = memory_storage().await;
        let owner = seed_user(&seaorm, "owner").await;
        let file = seed_file(&seaorm, &owner, "plan.txt").await;
        let mk = |parent_id: Option<i64>, name: &str| CreateFolderRequest {
            workspace_id: file.workspace_id,
            parent_id,
            name: name.to_string(),
            description: Some("draft".to_string()),
            labels: Vec::new(),
        };
        let top = seaorm.create_folder_impl(owner.id, mk(None, "top")).await.unwrap();
        let mid = seaorm
            .create_folder_impl(owner.id, mk(Some(top.id), "mid"))
            .await
            .unwrap();
        let leaf = seaorm
            .create_folder_impl(owner.id, mk(Some(mid.id), "leaf"))
            .await
            .unwrap();
        let storage: Arc<dyn Storage> = Arc::new(seaorm);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage.clone()))
                .configure(configure_api_routes),
        )
        .await;

        for target in [top.id, leaf.id] {
            let req = test::TestRequest::put()
                .uri(&format!("/api/v1/folders/{}", top.id))
                .insert_header(bearer(&owner))
                .set_json(json!({ "parent_id": target }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["code"], 3103);
        }

        // 叶子移到根目录是允许的，顺便清空描述
        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/folders/{}", leaf.id))
            .insert_header(bearer(&owner))
            .set_json(json!({ "parent_id": null, "description": "" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let moved = storage.get_folder_by_id(leaf.id).await.unwrap().unwrap();
        assert_eq!(moved.parent_id, None);
        assert_eq!(moved.description, None);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/folders/{}", top.id))
            .insert_header(bearer(&owner))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 3102);
        assert!(storage.get_folder_by_id(mid.id).await.unwrap().is_some());

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/folders/{}?recursive=true", top.id))
            .insert_header(bearer(&owner))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(storage.get_folder_by_id(mid.id).await.unwrap().is_none());
        assert!(storage.get_folder_by_id(leaf.id).await.unwrap().is_some());
    }

    #[actix_web::test]
    async fn test_approver_has_read_only_file_access() {
        use crate::models::approvals::requests::NewApproval;

        let seaorm = memory_storage().await;
        let owner = seed_user(&seaorm, "owner").await;
        let approver = seed_user(&seaorm, "approver").await;
        let stranger = seed_user(&seaorm, "stranger").await;
        let file = seed_file(&seaorm, &owner, "budget.xlsx").await;
        seaorm
            .create_approval_impl(NewApproval {
                file_id: file.id,
                approver_id: approver.id,
                assigner_id: owner.id,
                request_note: None,
            })
            .await
            .unwrap();
        let storage: Arc<dyn Storage> = Arc::new(seaorm);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage.clone()))
                .configure(configure_api_routes),
        )
        .await;
        let file_uri = format!("/api/v1/files/{}", file.id);

        let req = test::TestRequest::get()
            .uri(&file_uri)
            .insert_header(bearer(&approver))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        // 通过了权限检查，只是磁盘上没有内容
        let req = test::TestRequest::get()
            .uri(&format!("{file_uri}/download"))
            .insert_header(bearer(&approver))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 4005);

        let req = test::TestRequest::put()
            .uri(&file_uri)
            .insert_header(bearer(&approver))
            .set_json(json!({ "name": "renamed.xlsx" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::delete()
            .uri(&file_uri)
            .insert_header(bearer(&approver))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert!(storage.get_file_by_id(file.id).await.unwrap().is_some());

        let req = test::TestRequest::get()
            .uri(&file_uri)
            .insert_header(bearer(&stranger))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
