mod support;

use serde_json::json;
use support::{get, send_json, send_raw, spawn_app, valid_resident};

#[tokio::test]
async fn health_reports_ok() {
    let server = spawn_app().await;
    let resp = get(server.addr, "/health").await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.json()["status"], "ok");
}

#[tokio::test]
async fn create_normalizes_fields_and_returns_201() {
    let server = spawn_app().await;

    let resp = send_json(server.addr, "POST", "/residentes", &valid_resident()).await;
    assert_eq!(resp.status, 201);
    let created = resp.json();
    assert!(created["id"].as_i64().expect("numeric id") > 0);
    assert_eq!(created["first_name"], "José");
    assert_eq!(created["last_name"], "Pérez García");
    assert_eq!(created["birth_date"], "1990-01-31");
    assert_eq!(created["passport"], "AB-123456");
    assert_eq!(created["email"], "jose@example.com");
    assert_eq!(created["phone"], "+1 (555) 123-4567");
    assert_eq!(created["address"], "Calle Mayor 1");
    assert_eq!(created["occupation"], "Ingeniero");
    assert_eq!(created["marital_status"], "Casado");

    let id = created["id"].as_i64().expect("numeric id");
    let resp = get(server.addr, &format!("/residentes/{id}")).await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.json(), created);
}

#[tokio::test]
async fn list_returns_every_resident() {
    let server = spawn_app().await;

    let resp = get(server.addr, "/residentes").await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.json(), json!([]));

    let mut second = valid_resident();
    second["passport"] = json!("ZX-998877");
    send_json(server.addr, "POST", "/residentes", &valid_resident()).await;
    send_json(server.addr, "POST", "/residentes", &second).await;

    let list = get(server.addr, "/residentes").await.json();
    let passports: Vec<_> = list
        .as_array()
        .expect("array")
        .iter()
        .map(|r| r["passport"].as_str().expect("passport").to_string())
        .collect();
    assert_eq!(passports.len(), 2);
    assert!(passports.contains(&"AB-123456".to_string()));
    assert!(passports.contains(&"ZX-998877".to_string()));
}

#[tokio::test]
async fn optional_fields_may_be_omitted_or_blank() {
    let server = spawn_app().await;
    let body = json!({
        "first_name": "Ana",
        "last_name": "Ruiz",
        "birth_date": "1985-03-09",
        "passport": "X1234567",
        "email": "ana@example.com",
        "phone": "   ",
        "occupation": ""
    });

    let resp = send_json(server.addr, "POST", "/residentes", &body).await;
    assert_eq!(resp.status, 201);
    let created = resp.json();
    assert!(created["phone"].is_null());
    assert!(created["address"].is_null());
    assert!(created["occupation"].is_null());
    assert!(created["marital_status"].is_null());
}

#[tokio::test]
async fn invalid_create_lists_every_field_error() {
    let server = spawn_app().await;
    let body = json!({
        "first_name": "J",
        "last_name": "Pérez",
        "birth_date": "2030-01-01",
        "passport": "AB 12",
        "email": "not-an-email",
        "marital_status": "complicado"
    });

    let resp = send_json(server.addr, "POST", "/residentes", &body).await;
    assert_eq!(resp.status, 422);
    let detail = resp.json()["detail"].clone();
    let fields: Vec<_> = detail
        .as_array()
        .expect("error list")
        .iter()
        .map(|e| e["field"].as_str().expect("field").to_string())
        .collect();
    assert_eq!(
        fields,
        ["first_name", "birth_date", "passport", "email", "marital_status"]
    );
    assert!(detail[4]["message"]
        .as_str()
        .expect("message")
        .contains("Unión Libre"));

    assert_eq!(get(server.addr, "/residentes").await.json(), json!([]));
}

#[tokio::test]
async fn malformed_json_is_unprocessable() {
    let server = spawn_app().await;
    let resp = send_raw(
        server.addr,
        "POST",
        "/residentes",
        &[("Content-Type", "application/json")],
        Some("{not json"),
    )
    .await;
    assert_eq!(resp.status, 422);
    assert_eq!(resp.json()["detail"][0]["field"], "body");
}

#[tokio::test]
async fn missing_resident_is_404() {
    let server = spawn_app().await;

    let resp = get(server.addr, "/residentes/999").await;
    assert_eq!(resp.status, 404);
    assert_eq!(resp.json(), json!({"detail": "Residente no encontrado"}));

    let resp = send_json(server.addr, "PUT", "/residentes/999", &valid_resident()).await;
    assert_eq!(resp.status, 404);

    let resp = send_raw(server.addr, "DELETE", "/residentes/999", &[], None).await;
    assert_eq!(resp.status, 404);
}

#[tokio::test]
async fn update_replaces_fields() {
    let server = spawn_app().await;
    let created = send_json(server.addr, "POST", "/residentes", &valid_resident())
        .await
        .json();
    let id = created["id"].as_i64().expect("numeric id");

    let mut changed = valid_resident();
    changed["first_name"] = json!("MARÍA");
    changed["phone"] = json!(null);
    let resp = send_json(server.addr, "PUT", &format!("/residentes/{id}"), &changed).await;
    assert_eq!(resp.status, 200);
    let updated = resp.json();
    assert_eq!(updated["id"], id);
    assert_eq!(updated["first_name"], "María");
    assert!(updated["phone"].is_null());

    let fetched = get(server.addr, &format!("/residentes/{id}")).await.json();
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn invalid_update_leaves_record_untouched() {
    let server = spawn_app().await;
    let created = send_json(server.addr, "POST", "/residentes", &valid_resident())
        .await
        .json();
    let id = created["id"].as_i64().expect("numeric id");

    let mut changed = valid_resident();
    changed["email"] = json!("broken");
    let resp = send_json(server.addr, "PUT", &format!("/residentes/{id}"), &changed).await;
    assert_eq!(resp.status, 422);

    let fetched = get(server.addr, &format!("/residentes/{id}")).await.json();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn delete_removes_resident() {
    let server = spawn_app().await;
    let created = send_json(server.addr, "POST", "/residentes", &valid_resident())
        .await
        .json();
    let id = created["id"].as_i64().expect("numeric id");

    let resp = send_raw(server.addr, "DELETE", &format!("/residentes/{id}"), &[], None).await;
    assert_eq!(resp.status, 200);
    assert_eq!(
        resp.json(),
        json!({"message": "Residente eliminado exitosamente"})
    );

    assert_eq!(get(server.addr, &format!("/residentes/{id}")).await.status, 404);
    assert_eq!(
        send_raw(server.addr, "DELETE", &format!("/residentes/{id}"), &[], None)
            .await
            .status,
        404
    );
    assert!(server.repository.list().expect("list").is_empty());
}

#[tokio::test]
async fn duplicate_passports_are_allowed() {
    let server = spawn_app().await;
    let first = send_json(server.addr, "POST", "/residentes", &valid_resident()).await;
    let second = send_json(server.addr, "POST", "/residentes", &valid_resident()).await;
    assert_eq!(first.status, 201);
    assert_eq!(second.status, 201);
    assert_ne!(first.json()["id"], second.json()["id"]);
}
