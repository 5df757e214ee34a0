use axum::http::{StatusCode, header::LOCATION};
use axum_test::TestServer;
use tower::ServiceExt;

use crate::{
    config::create_app,
    enrollments::{Team, list_for_team},
    landing::{countdown::DEADLINE_COOKIE, notice::NOTICE_COOKIE},
    msg::MsgContents,
    test::{
        assert_res_ok, body_string, empty_request, example_form,
        failing_state, form_request, set_cookie, test_state,
    },
};

#[tokio::test]
async fn same_phone_cannot_join_a_team_twice() {
    let state = test_state();
    let server = TestServer::new(create_app(state.clone())).unwrap();

    let first = server.post("/inscricao/Matira").form(&example_form()).await;
    assert_eq!(first.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(first.header(LOCATION), "/?etapa=enviado");

    // cookies are not kept between requests, so the cooldown does not apply
    let second = server.post("/inscricao/Matira").form(&example_form()).await;
    assert_eq!(second.status_code(), StatusCode::BAD_REQUEST);
    assert!(second.text().contains("já está inscrito nesta modalidade"));

    let other_team = server.post("/inscricao/Nexon").form(&example_form()).await;
    assert_eq!(other_team.status_code(), StatusCode::SEE_OTHER);

    let store = state.store.as_ref();
    assert_eq!(
        list_for_team(store, Team::find("Matira").unwrap())
            .unwrap()
            .len(),
        1
    );
    assert_eq!(
        list_for_team(store, Team::find("Nexon").unwrap())
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn enrollment_starts_cooldown() {
    let state = test_state();
    let mut rx = state.tx.subscribe();
    let app = create_app(state);

    let response = app
        .clone()
        .oneshot(form_request(
            "POST",
            "/inscricao/Falxtra",
            &example_form(),
            None,
        ))
        .await
        .unwrap();
    let cookie = set_cookie(&response);
    assert_res_ok!(response);

    let msg = rx.try_recv().unwrap();
    assert_eq!(msg.team, "Falxtra");
    assert_eq!(msg.inner, MsgContents::EnrollmentCreated);

    // picking another team shows the grid again with the time left
    let response = app
        .clone()
        .oneshot(empty_request("GET", "/inscricao/Nexon", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Aguarde"));
    assert!(!body.contains("enrollment-form"));

    let other_person = crate::enrollments::form::EnrollmentForm {
        numero_telefone: "11988887777".to_string(),
        ..example_form()
    };
    let response = app
        .clone()
        .oneshot(form_request(
            "POST",
            "/inscricao/Nexon",
            &other_person,
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(response).await.contains("Aguarde"));
}

#[tokio::test]
async fn incomplete_form_is_shown_again() {
    let server = TestServer::new(create_app(test_state())).unwrap();

    let form = crate::enrollments::form::EnrollmentForm {
        sala: String::new(),
        ..example_form()
    };
    let response = server.post("/inscricao/Matira").form(&form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.text();
    assert!(body.contains("O campo Turma é obrigatório."));
    assert!(body.contains("value=\"Ana Souza\""));
}

#[tokio::test]
async fn any_filled_in_phone_and_grade_are_stored() {
    let state = test_state();
    let server = TestServer::new(create_app(state.clone())).unwrap();

    for (phone, grade) in [
        ("1234567", "9"),
        ("11999990000", "13"),
        ("+55 11 99999 0000 1", "9"),
    ] {
        let form = crate::enrollments::form::EnrollmentForm {
            numero_telefone: phone.to_string(),
            ano_escolar: grade.to_string(),
            ..example_form()
        };
        let response = server.post("/inscricao/Matira").form(&form).await;
        assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    }

    let rows =
        list_for_team(state.store.as_ref(), Team::find("Matira").unwrap())
            .unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().any(|row| row.phone == "1234567"));
    assert!(rows.iter().any(|row| row.grade == "13ª série"));
}

#[tokio::test]
async fn unknown_team_is_not_found() {
    let server = TestServer::new(create_app(test_state())).unwrap();

    let response = server
        .get("/inscricao/Desconhecido")
        .expect_failure()
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let response = server
        .post("/inscricao/Desconhecido")
        .form(&example_form())
        .expect_failure()
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn store_failure_keeps_the_form() {
    let server = TestServer::new(create_app(failing_state())).unwrap();

    let response = server
        .post("/inscricao/Matira")
        .form(&example_form())
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.text();
    assert!(body.contains("Erro ao enviar a inscrição"));
    assert!(body.contains("value=\"11999990000\""));
}

#[tokio::test]
async fn landing_fixes_the_deadline_once() {
    let app = create_app(test_state());

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/", None))
        .await
        .unwrap();
    let cookie = set_cookie(&response);
    assert!(cookie.starts_with(DEADLINE_COOKIE));
    let body = body_string(response).await;
    assert!(body.contains("intro-text"));
    assert!(body.contains("hx-get=\"/prazo\""));

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/prazo", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("set-cookie").is_none());
    assert!(body_string(response).await.contains("Tempo restante"));
}

#[tokio::test]
async fn notice_can_be_dismissed() {
    let app = create_app(test_state());

    let response = app
        .clone()
        .oneshot(empty_request("POST", "/aviso/dispensar", None))
        .await
        .unwrap();
    let cookie = set_cookie(&response);
    assert!(cookie.starts_with(NOTICE_COOKIE));
    assert_res_ok!(response);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/?etapa=selecao", Some(&cookie)))
        .await
        .unwrap();
    let body = body_string(response).await;
    assert!(!body.contains("id=\"aviso\""));
    assert!(!body.contains("intro-text"));
}

#[tokio::test]
async fn unknown_step_shows_the_landing_page() {
    let app = create_app(test_state());

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/?etapa=desconhecida", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("intro-text"));
}

#[tokio::test]
async fn stylesheet_is_served() {
    let server = TestServer::new(create_app(test_state())).unwrap();

    let response = server.get("/static/style.css").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("intro-saida"));
}
