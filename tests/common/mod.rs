// tests/common/mod.rs
//
// A small double of the portal served by wiremock.

#![allow(dead_code)]

use unatrack_core::{ClientConfig, DelayConfig};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const RA: &str = "123456";
pub const PASSWORD: &str = "senha-correta";
pub const LOGIN_TOKEN: &str = "tok-8f2a91";

pub const LOGIN_PAGE: &str = r#"
<html><body>
  <form class="loginform" action="/login/index.php" method="post">
    <input type="hidden" name="logintoken" value="tok-8f2a91">
    <input type="text" name="username">
    <input type="password" name="password">
  </form>
</body></html>"#;

pub const LOGIN_REJECTED: &str = r#"
<html><body>
  <div class="alert alert-danger">Nome de usuário ou senha errados. Por favor tente outra vez.</div>
  <form class="loginform"><input type="hidden" name="logintoken" value="tok-retry"></form>
</body></html>"#;

pub const LOGGED_IN: &str = r#"
<html><body>
  <div class="usermenu"><a href="/login/logout.php?sesskey=abc">Sair</a></div>
</body></html>"#;

pub const DASHBOARD: &str = r#"
<html><body>
  <div id="nav-drawer">
    <nav class="list-group">
      <a class="list-group-item" href="/my/"><span class="media-body">Painel</span></a>
      <a class="list-group-item" href="/course/view.php?id=0"><span class="media-body">Minhas disciplinas</span></a>
      <a class="list-group-item" href="/course/view.php?id=101">
        <div class="media"><span class="media-body">Cálculo I</span></div></a>
      <a class="list-group-item" href="/course/view.php?id=102">
        <div class="media"><span class="media-body">Ética Profissional</span></div></a>
    </nav>
  </div>
</body></html>"#;

/// Course 101: a header tile, one gradable unit and one reading-only unit.
pub const CALCULUS_COURSE: &str = r#"
<html><body>
  <ul class="tiles">
    <li class="tile tile-clickable" data-section="0">
      <a data-original-title="Tarefa: Apresentação"><div class="tile-text"><h3>Boas-vindas</h3></div></a>
    </li>
    <li class="tile tile-clickable" data-section="1">
      <a data-original-title="Tarefa: Lista 1&lt;br&gt;Questionário: Prova 1">
        <div class="photo-tile-text"><h3>Unidade 1 - Limites</h3></div></a>
    </li>
    <li class="tile tile-clickable" data-section="2">
      <a data-original-title="Arquivo: Leitura complementar">
        <div class="photo-tile-text"><h3>Unidade 2 - Derivadas</h3></div></a>
    </li>
  </ul>
</body></html>"#;

pub const CALCULUS_UNIT_1: &str = r#"
<html><body>
  <ul class="section img-text">
    <li class="activity assign modtype_assign">
      <a href="/mod/assign/view.php?id=11"><span class="instancename">Lista 1</span></a>
    </li>
    <li class="activity assign modtype_assign">
      <a href="/mod/assign/view.php?id=13"><span class="instancename">Envio de tarefa fora do prazo: Lista 1</span></a>
    </li>
    <li class="activity quiz modtype_quiz">
      <a href="/mod/quiz/view.php?id=12"><span class="instancename">Prova 1</span></a>
    </li>
    <li class="activity workshop modtype_workshop">
      <a href="/mod/workshop/view.php?id=14"><span class="instancename">Revisão por pares</span></a>
    </li>
  </ul>
  <div class="summary"><a href="/mod/assign/view.php?id=11">Lista 1 (link repetido)</a></div>
</body></html>"#;

/// Course 102 has no tiles and no module links.
pub const ETHICS_COURSE: &str = r#"
<html><body><div class="course-content"><p>Conteúdo em breve.</p></div></body></html>"#;

pub const ASSIGNMENT_PAGE: &str = r#"
<html><body>
  <h2>Lista 1</h2>
  <table class="generaltable">
    <tr><td class="cell c0">Status de envio</td><td class="cell c1">Nenhuma tentativa</td></tr>
    <tr><td class="cell c0">Data de entrega</td><td class="cell c1">quinta-feira, 20 Nov 2025, 23:59</td></tr>
  </table>
</body></html>"#;

pub const QUIZ_PAGE: &str = r#"
<html><body>
  <div class="box quizinfo">
    <p>Tentativas permitidas: 1</p>
    <p>Este questionário será fechado em sexta-feira, 14 Nov 2025, 23:59</p>
  </div>
  <table><tr><td>Data de entrega</td><td>01/12/2025</td></tr></table>
</body></html>"#;

pub const WORKSHOP_PAGE: &str = r#"
<html><body><h2>Revisão por pares</h2><p>Instruções na sala.</p></body></html>"#;

pub fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html; charset=utf-8")
}

/// Client settings pointing at the mock server, with no politeness delay.
pub fn test_config(server: &MockServer) -> ClientConfig {
    let mut config = ClientConfig::with_base_url(&server.uri()).unwrap();
    config.delay = DelayConfig {
        enabled: false,
        ..Default::default()
    };
    config
}

/// Serves the login form and accepts only [`PASSWORD`].
pub async fn mount_login(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/login/index.php"))
        .respond_with(html(LOGIN_PAGE))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/login/index.php"))
        .and(body_string_contains(format!("logintoken={LOGIN_TOKEN}")))
        .and(body_string_contains(format!("password={PASSWORD}")))
        .respond_with(html(LOGGED_IN))
        .with_priority(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/login/index.php"))
        .respond_with(html(LOGIN_REJECTED))
        .mount(server)
        .await;
}

pub async fn mount_course_page(server: &MockServer, id: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path("/course/view.php"))
        .and(query_param("id", id))
        .respond_with(html(body))
        .mount(server)
        .await;
}

/// Unit pages are matched before the course page they share a path with.
pub async fn mount_unit_page(server: &MockServer, id: &str, section: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path("/course/view.php"))
        .and(query_param("id", id))
        .and(query_param("section", section))
        .respond_with(html(body))
        .with_priority(1)
        .mount(server)
        .await;
}

pub async fn mount_activity_page(server: &MockServer, module: &str, id: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/mod/{module}/view.php")))
        .and(query_param("id", id))
        .respond_with(html(body))
        .mount(server)
        .await;
}

/// The full two-course portal used by most tests.
pub async fn mount_portal(server: &MockServer) {
    mount_login(server).await;

    Mock::given(method("GET"))
        .and(path("/my/"))
        .respond_with(html(DASHBOARD))
        .mount(server)
        .await;

    mount_course_page(server, "101", CALCULUS_COURSE).await;
    mount_unit_page(server, "101", "1", CALCULUS_UNIT_1).await;
    mount_course_page(server, "102", ETHICS_COURSE).await;

    mount_activity_page(server, "assign", "11", ASSIGNMENT_PAGE).await;
    mount_activity_page(server, "quiz", "12", QUIZ_PAGE).await;
    mount_activity_page(server, "workshop", "14", WORKSHOP_PAGE).await;
}
