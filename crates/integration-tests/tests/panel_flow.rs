//! Browser flows through the admin panel, backed by the mock backend.

#![allow(clippy::unwrap_used)]

use reqwest::{Client, StatusCode, multipart};
use roster_admin::controllers::{SESSION_EXPIRED, UpdateStrategy};
use std::time::Duration;

use roster_integration_tests::{MockBackend, browser, start_panel, start_panel_with_debounce};
use rust_xlsxwriter::Workbook;
use serde_json::json;
use url::Url;

struct Panel {
    mock: MockBackend,
    url: Url,
    client: Client,
}

impl Panel {
    async fn start(strategy: UpdateStrategy) -> Self {
        let mock = MockBackend::start().await;
        let url = start_panel(&mock, strategy).await;
        Self {
            mock,
            url,
            client: browser(),
        }
    }

    async fn with_debounce(search_debounce: Duration) -> Self {
        let mock = MockBackend::start().await;
        let url = start_panel_with_debounce(&mock, UpdateStrategy::Patch, search_debounce).await;
        Self {
            mock,
            url,
            client: browser(),
        }
    }

    fn at(&self, path: &str) -> Url {
        self.url.join(path).unwrap()
    }

    async fn page(&self) -> String {
        let response = self.client.get(self.at("/")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        response.text().await.unwrap()
    }

    /// POST a form and return the page the redirect lands on.
    async fn post(&self, path: &str, form: &[(&str, &str)]) -> String {
        let response = self
            .client
            .post(self.at(path))
            .form(form)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        response.text().await.unwrap()
    }

    async fn search(&self, query: &str) -> reqwest::Response {
        let mut url = self.at("/records/search");
        url.query_pairs_mut().append_pair("q", query);
        self.client.get(url).send().await.unwrap()
    }

    async fn login(&self, username: &str, password: &str) -> String {
        self.post("/login", &[("username", username), ("password", password)])
            .await
    }
}

fn workbook(rows: &[&[&str]]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            sheet
                .write_string(u32::try_from(r).unwrap(), u16::try_from(c).unwrap(), *cell)
                .unwrap();
        }
    }
    workbook.save_to_buffer().unwrap()
}

#[tokio::test]
async fn test_wrong_password_shows_backend_message() {
    let panel = Panel::start(UpdateStrategy::Patch).await;

    let html = panel.login("admin", "errada").await;

    assert!(html.contains("Credenciais inválidas"));
    assert!(html.contains("id=\"login-form\""));
}

#[tokio::test]
async fn test_admin_login_shows_table_and_accounts() {
    let panel = Panel::start(UpdateStrategy::Patch).await;
    panel.mock.seed_records(vec![
        json!({"Nome Completo": "João Silva", "CPF": "111", "Numero": "555-0101"}),
        json!({"Nome Completo": "Maria Souza", "CPF": "222", "Numero": "555-0102"}),
    ]);

    let html = panel.login("admin", "admin123").await;

    assert!(html.contains("João Silva"));
    assert!(html.contains("Maria Souza"));
    assert!(html.contains("id=\"admin-panel\""));
    assert!(html.contains("<td>maria</td>"));
}

#[tokio::test]
async fn test_user_login_hides_account_admin() {
    let panel = Panel::start(UpdateStrategy::Patch).await;

    let html = panel.login("maria", "senha").await;

    assert!(html.contains("id=\"record-rows\""));
    assert!(!html.contains("id=\"admin-panel\""));
    assert!(!panel.mock.requests().contains(&"GET /usuarios".to_string()));
}

#[tokio::test]
async fn test_session_survives_page_reload_and_logout_ends_it() {
    let panel = Panel::start(UpdateStrategy::Patch).await;
    panel.login("maria", "senha").await;

    assert!(panel.page().await.contains("id=\"logout-button\""));

    let html = panel.post("/logout", &[]).await;
    assert!(html.contains("id=\"login-form\""));
    assert!(panel.mock.requests().contains(&"POST /logout".to_string()));
}

#[tokio::test]
async fn test_add_edit_delete_customer() {
    let panel = Panel::start(UpdateStrategy::Patch).await;
    panel.login("admin", "admin123").await;

    let html = panel
        .post(
            "/records",
            &[
                ("full_name", "Ana Lima"),
                ("tax_id", "333"),
                ("phone_number", ""),
            ],
        )
        .await;
    assert!(html.contains("Added Ana Lima."));
    assert!(html.contains("<td>-</td>"));

    let response = panel
        .client
        .get(panel.at("/records/row-0/edit"))
        .send()
        .await
        .unwrap();
    let html = response.text().await.unwrap();
    assert!(html.contains("action=\"/records/row-0\""));

    let html = panel
        .post(
            "/records/row-0",
            &[
                ("full_name", "Ana Lima"),
                ("tax_id", "333"),
                ("phone_number", "81 99999-0000"),
            ],
        )
        .await;
    assert!(html.contains("Customer updated."));
    assert_eq!(panel.mock.records()[0]["Numero"], json!("81 99999-0000"));
    assert!(
        panel
            .mock
            .requests()
            .contains(&"PATCH /records/0".to_string())
    );

    let html = panel.post("/records/row-0/delete", &[]).await;
    assert!(html.contains("id=\"confirm-dialog\""));
    assert_eq!(panel.mock.records().len(), 1);

    let html = panel.post("/confirm", &[("answer", "yes")]).await;
    assert!(html.contains("Customer deleted."));
    assert!(panel.mock.records().is_empty());
}

#[tokio::test]
async fn test_declined_delete_sends_nothing() {
    let panel = Panel::start(UpdateStrategy::Patch).await;
    panel.mock.seed_records(vec![json!({"Nome Completo": "Ana"})]);
    panel.login("admin", "admin123").await;

    panel.post("/records/row-0/delete", &[]).await;
    let html = panel.post("/confirm", &[("answer", "no")]).await;

    assert!(!html.contains("id=\"confirm-dialog\""));
    assert_eq!(panel.mock.records().len(), 1);
    assert!(
        !panel
            .mock
            .requests()
            .iter()
            .any(|r| r.starts_with("DELETE"))
    );
}

#[tokio::test]
async fn test_replace_strategy_deletes_then_creates() {
    let panel = Panel::start(UpdateStrategy::Replace).await;
    panel
        .mock
        .seed_records(vec![json!({"Nome Completo": "Ana", "CPF": "1", "Numero": "2"})]);
    panel.login("admin", "admin123").await;

    let html = panel
        .post(
            "/records/row-0",
            &[("full_name", "Ana"), ("tax_id", "1"), ("phone_number", "3")],
        )
        .await;

    assert!(html.contains("Customer updated."));
    let requests = panel.mock.requests();
    assert!(requests.contains(&"DELETE /records/0".to_string()));
    assert!(!requests.iter().any(|r| r.starts_with("PATCH")));
    assert_eq!(
        panel.mock.records(),
        vec![json!({"Nome Completo": "Ana", "CPF": "1", "Numero": "3"})]
    );
}

#[tokio::test]
async fn test_keystroke_search_returns_matching_rows() {
    let panel = Panel::start(UpdateStrategy::Patch).await;
    panel.mock.seed_records(vec![
        json!({"Nome Completo": "João Silva", "CPF": "111", "Numero": "1"}),
        json!({"Nome Completo": "Maria Souza", "CPF": "222", "Numero": "2"}),
    ]);
    panel.login("maria", "senha").await;

    let mut url = panel.at("/records/search");
    url.query_pairs_mut().append_pair("q", "JOÃO");
    let response = panel.client.get(url).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let rows = response.text().await.unwrap();
    assert!(rows.contains("João Silva"));
    assert!(!rows.contains("Maria Souza"));

    // The filter is kept for the next full page load
    let html = panel.page().await;
    assert!(html.contains("value=\"JOÃO\""));
    assert!(!html.contains("Maria Souza"));
}

#[tokio::test]
async fn test_search_requires_login() {
    let panel = Panel::start(UpdateStrategy::Patch).await;

    let response = panel
        .client
        .get(panel.at("/records/search?q=ana"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_import_creates_rows_in_order() {
    let panel = Panel::start(UpdateStrategy::Patch).await;
    panel.login("maria", "senha").await;

    let bytes = workbook(&[
        &["Nome Completo", "CPF", "Numero"],
        &["Ana", "1", "10"],
        &["Bia", "2", "20"],
    ]);
    let form = multipart::Form::new().part(
        "file",
        multipart::Part::bytes(bytes).file_name("clientes.xlsx"),
    );
    let response = panel
        .client
        .post(panel.at("/import"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    let html = response.text().await.unwrap();

    assert!(html.contains("Imported 2 customers from clientes.xlsx."));
    let records = panel.mock.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["Nome Completo"], json!("Ana"));
    assert_eq!(records[1]["Nome Completo"], json!("Bia"));
}

#[tokio::test]
async fn test_import_template_mismatch_writes_nothing() {
    let panel = Panel::start(UpdateStrategy::Patch).await;
    panel.login("maria", "senha").await;

    let bytes = workbook(&[&["Nome", "CPF", "Numero"], &["Ana", "1", "10"]]);
    let form = multipart::Form::new().part(
        "file",
        multipart::Part::bytes(bytes).file_name("clientes.xlsx"),
    );
    let html = panel
        .client
        .post(panel.at("/import"))
        .multipart(form)
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(html.contains("Template mismatch"));
    assert!(panel.mock.records().is_empty());
}

#[tokio::test]
async fn test_import_stops_at_first_failing_row() {
    let panel = Panel::start(UpdateStrategy::Patch).await;
    panel.login("maria", "senha").await;

    let bytes = workbook(&[
        &["Nome Completo", "CPF", "Numero"],
        &["Ana", "1", "10"],
        &["FAIL", "2", "20"],
        &["Caio", "3", "30"],
    ]);
    let form = multipart::Form::new().part(
        "file",
        multipart::Part::bytes(bytes).file_name("clientes.xlsx"),
    );
    let html = panel
        .client
        .post(panel.at("/import"))
        .multipart(form)
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(html.contains("Import failed"));
    assert_eq!(panel.mock.records(), vec![json!({"Nome Completo": "Ana", "CPF": "1", "Numero": "10"})]);
}

#[tokio::test]
async fn test_expired_token_returns_to_login() {
    let panel = Panel::start(UpdateStrategy::Patch).await;
    panel.login("maria", "senha").await;
    panel.mock.expire_tokens();

    let html = panel.post("/records/reload", &[]).await;

    assert!(html.contains("id=\"login-form\""));
    assert!(html.contains(SESSION_EXPIRED));
}

#[tokio::test]
async fn test_admin_creates_and_deletes_account() {
    let panel = Panel::start(UpdateStrategy::Patch).await;
    panel.login("admin", "admin123").await;

    let html = panel
        .post(
            "/users",
            &[("username", "joana"), ("password", "s3nha"), ("role", "user")],
        )
        .await;
    assert!(html.contains("Created account joana."));
    assert!(panel.mock.usernames().contains(&"joana".to_string()));

    let html = panel.post("/users/3/delete", &[]).await;
    assert!(html.contains("id=\"confirm-dialog\""));
    let html = panel.post("/confirm", &[("answer", "yes")]).await;

    assert!(html.contains("Deleted account joana."));
    assert!(!panel.mock.usernames().contains(&"joana".to_string()));
}

#[tokio::test]
async fn test_account_error_is_shown_on_the_form() {
    let panel = Panel::start(UpdateStrategy::Patch).await;
    panel.login("admin", "admin123").await;

    let html = panel
        .post(
            "/users",
            &[("username", "maria"), ("password", "x"), ("role", "user")],
        )
        .await;

    assert!(html.contains("id=\"user-error\""));
    assert!(html.contains("Usuário já existe"));
}

#[tokio::test]
async fn test_admin_changes_role() {
    let panel = Panel::start(UpdateStrategy::Patch).await;
    panel.login("admin", "admin123").await;

    let html = panel
        .post("/users/2", &[("role", "admin"), ("password", "")])
        .await;

    assert!(html.contains("Updated account maria."));
    assert_eq!(panel.mock.role_of("maria").as_deref(), Some("admin"));
}

#[tokio::test]
async fn test_toggle_hides_table() {
    let panel = Panel::start(UpdateStrategy::Patch).await;
    panel.login("maria", "senha").await;

    let html = panel.post("/records/toggle", &[]).await;
    assert!(!html.contains("id=\"record-rows\""));

    let html = panel.post("/records/toggle", &[]).await;
    assert!(html.contains("id=\"record-rows\""));
}

#[tokio::test]
async fn test_later_keystroke_supersedes_earlier_search() {
    let panel = Panel::with_debounce(Duration::from_millis(300)).await;
    panel.mock.seed_records(vec![
        json!({"Nome Completo": "João Silva", "CPF": "111", "Numero": "1"}),
        json!({"Nome Completo": "Joana Dias", "CPF": "222", "Numero": "2"}),
    ]);
    panel.login("maria", "senha").await;

    let (first, second) = tokio::join!(panel.search("jo"), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        panel.search("joão").await
    });

    assert_eq!(first.status(), StatusCode::NO_CONTENT);
    assert_eq!(second.status(), StatusCode::OK);
    let rows = second.text().await.unwrap();
    assert!(rows.contains("João Silva"));
    assert!(!rows.contains("Joana Dias"));
}

#[tokio::test]
async fn test_query_parameter_filters_page_immediately() {
    let panel = Panel::start(UpdateStrategy::Patch).await;
    panel.mock.seed_records(vec![
        json!({"Nome Completo": "João Silva", "CPF": "111", "Numero": "1"}),
        json!({"Nome Completo": "Maria Souza", "CPF": "222", "Numero": "2"}),
    ]);
    panel.login("maria", "senha").await;

    let response = panel.client.get(panel.at("/?q=souza")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("Maria Souza"));
    assert!(!html.contains("João Silva"));
    assert!(html.contains("value=\"souza\""));
}

#[tokio::test]
async fn test_toggle_while_search_settles_is_kept() {
    let panel = Panel::with_debounce(Duration::from_millis(300)).await;
    panel.mock.seed_records(vec![json!({
        "Nome Completo": "Ana Lima", "CPF": "1", "Numero": "2"
    })]);
    panel.login("maria", "senha").await;

    let (search, _) = tokio::join!(panel.search("an"), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        panel.post("/records/toggle", &[]).await
    });

    assert_eq!(search.status(), StatusCode::OK);
    let html = panel.page().await;
    assert!(!html.contains("id=\"record-rows\""));
    assert!(html.contains("value=\"an\""));
}

#[tokio::test]
async fn test_logout_while_search_settles_ends_session() {
    let panel = Panel::with_debounce(Duration::from_millis(300)).await;
    panel.login("maria", "senha").await;

    let (search, _) = tokio::join!(panel.search("an"), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        panel.post("/logout", &[]).await
    });

    assert_eq!(search.status(), StatusCode::UNAUTHORIZED);
    let html = panel.page().await;
    assert!(html.contains("id=\"login-form\""));
    assert!(!html.contains("id=\"logout-button\""));
}
