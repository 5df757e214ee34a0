use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Response},
};
use hypertext::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    auth::AdminUser,
    backend::store::DocumentStore,
    enrollments::{self, EnrollmentRow, TEAMS, Team},
    msg::{Msg, MsgContents},
    state::AppState,
    util_resp::{StandardResponse, err_not_found, success},
    widgets::{
        alert::{ErrorAlert, SuccessAlert},
        loading::Loading,
    },
};

pub const FETCH_FAILED: &str = "Erro ao carregar as inscrições. Tente novamente.";
pub const DELETE_FAILED: &str = "Erro ao deletar inscrição. Tente novamente.";
pub const LOADING: &str = "Carregando inscrições...";

#[derive(Deserialize, Serialize, Default)]
pub struct TeamQuery {
    #[serde(default)]
    pub time: Option<String>,
}

impl TeamQuery {
    /// The requested team, or the first one when none was named. `None`
    /// for a name that is not a team.
    pub fn team(&self) -> Option<&'static Team> {
        match &self.time {
            Some(name) => Team::find(name),
            None => Some(Team::first()),
        }
    }
}

/// Fetches the rows for `team`, logging (and hiding) store failures.
pub fn load(store: &dyn DocumentStore, team: &Team) -> Option<Vec<EnrollmentRow>> {
    match enrollments::list_for_team(store, team) {
        Ok(rows) => Some(rows),
        Err(e) => {
            tracing::error!("could not list enrollments for {}: {e}", team.name);
            None
        }
    }
}

/// The sidebar, header and table for one team. Replaced wholesale when
/// another team is picked.
pub struct Dashboard<'a> {
    pub admin: &'a AdminUser,
    pub team: &'static Team,
    /// `None` when the enrollments could not be fetched.
    pub rows: Option<Vec<EnrollmentRow>>,
}

impl Renderable for Dashboard<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        let team = self.team;

        maud! {
            div id="painel" class="admin" data-time=(team.name) {
                aside class="sidebar" {
                    div class="sidebar-header" {
                        i class="fas fa-users" {}
                        h2 { "Times" }
                    }
                    nav {
                        @for other in &TEAMS {
                            button
                                class=(if other == team { "team-button active" } else { "team-button" })
                                style=(format!("--team-color: {}; --team-hover: {}", other.color, other.hover_color))
                                hx-get=(format!("/painel-admin/inscricoes?time={}", other.name))
                                hx-target="#painel"
                                hx-swap="outerHTML"
                                hx-indicator="#carregando" {
                                i class=(other.icon) {}
                                div {
                                    span class="team-name" { (other.name) }
                                    span class="team-sport" { (other.sport) }
                                }
                            }
                        }
                    }
                }
                main class="admin-main" {
                    header class="admin-header" {
                        div {
                            h1 {
                                i class=(team.icon) style=(format!("color: {}", team.color)) {}
                                " Inscrições - " (team.name)
                            }
                            p class="admin-email" { (self.admin.email) }
                        }
                        button class="logout-button"
                            hx-post="/painel-admin/logout"
                            hx-swap="none" {
                            i class="fas fa-sign-out-alt" {}
                            " Sair"
                        }
                    }
                    div id="alerts" {}
                    div id="carregando" class="htmx-indicator" {
                        (Loading { msg: LOADING })
                    }
                    div hx-ext="ws"
                        "ws-connect"=(format!("/painel-admin/ws?time={}", team.name)) {
                        (EnrollmentTable { team, rows: self.rows.as_deref() })
                    }
                }
            }
        }
        .render_to(buffer);
    }
}

/// The part of the dashboard that is refreshed after a change: the count and
/// the table (or its empty and error states).
pub struct EnrollmentTable<'a> {
    pub team: &'static Team,
    pub rows: Option<&'a [EnrollmentRow]>,
}

impl Renderable for EnrollmentTable<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        let team = self.team;

        maud! {
            div id="inscricoes" {
                @if let Some(rows) = self.rows {
                    @if rows.is_empty() {
                        p class="count" { "Total: 0 inscrições" }
                        div class="empty" {
                            i class="fas fa-inbox" {}
                            p { "Nenhuma inscrição encontrada para o time " (team.name) "." }
                        }
                    } @else {
                        p class="count" {
                            "Total: " (rows.len())
                            @if rows.len() == 1 { " inscrição" } @else { " inscrições" }
                        }
                        div class="table-wrapper" {
                            table class="enrollments" {
                                thead {
                                    tr {
                                        th { "Nome" }
                                        th { "Série" }
                                        th { "Turma" }
                                        th { "Turno" }
                                        th { "Telefone" }
                                        th { "Email" }
                                        th { "Problema de Saúde" }
                                        th { "Data de Envio" }
                                        th { "Ações" }
                                    }
                                }
                                tbody {
                                    @for row in rows {
                                        tr id=(format!("inscricao-{}", row.id)) {
                                            td { (row.name) }
                                            td { (row.grade) }
                                            td { (row.class) }
                                            td { (row.shift) }
                                            td { (row.phone) }
                                            td { (row.email.as_deref().unwrap_or("Não informado")) }
                                            td { (row.health_issues.as_deref().unwrap_or("Nenhum problema relatado")) }
                                            td { (row.submitted_on()) }
                                            td {
                                                button class="delete-button"
                                                    title="Deletar inscrição"
                                                    hx-delete=(format!("/painel-admin/inscricoes/{}?time={}", row.id, team.name))
                                                    hx-confirm=(format!("Tem certeza que deseja deletar a inscrição de {}?", row.name))
                                                    hx-target="#inscricoes"
                                                    hx-swap="outerHTML" {
                                                    i class="fas fa-trash" {}
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                } @else {
                    div class="fetch-error" {
                        (ErrorAlert { msg: FETCH_FAILED })
                        button class="retry-button"
                            hx-get=(format!("/painel-admin/inscricoes?time={}", team.name))
                            hx-target="#painel"
                            hx-swap="outerHTML"
                            hx-indicator="#carregando" {
                            i class="fas fa-redo" {}
                            " Tentar novamente"
                        }
                    }
                }
            }
        }
        .render_to(buffer);
    }
}

pub fn render_dashboard(
    store: &dyn DocumentStore,
    admin: &AdminUser,
    team: &'static Team,
) -> Rendered<String> {
    Dashboard {
        admin,
        team,
        rows: load(store, team),
    }
    .render()
}

/// The dashboard for the team named in the query.
pub async fn enrollments_fragment(
    State(state): State<AppState>,
    admin: AdminUser,
    Query(query): Query<TeamQuery>,
) -> StandardResponse {
    let Some(team) = query.team() else {
        return err_not_found();
    };

    success(render_dashboard(state.store.as_ref(), &admin, team))
}

/// Deletes one of `team`'s enrollments and answers with the refreshed table
/// and a confirmation. Ids that are not in the team's table are refused. On
/// failure the table is left alone and only the alert area changes.
pub async fn delete_enrollment(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Query(query): Query<TeamQuery>,
) -> Response {
    let Some(team) = query.team() else {
        return err_not_found().into_response();
    };

    let Some(rows) = load(state.store.as_ref(), team) else {
        return delete_failed();
    };
    let Some(name) = rows.into_iter().find(|row| row.id == id).map(|row| row.name)
    else {
        tracing::warn!("enrollment {id} is not one of {}'s", team.name);
        return delete_failed();
    };

    if let Err(e) = enrollments::delete(state.store.as_ref(), &id) {
        tracing::error!("could not delete enrollment {id}: {e}");
        return delete_failed();
    }

    let _ = state.tx.send(Msg {
        team: team.name.to_string(),
        inner: MsgContents::EnrollmentDeleted,
    });

    let msg = format!("Inscrição de {name} deletada com sucesso!");
    let rows = load(state.store.as_ref(), team);

    Html(
        maud! {
            (EnrollmentTable { team, rows: rows.as_deref() })
            (AlertSlot { alert: SuccessAlert { msg: &msg } })
        }
        .render()
        .into_inner(),
    )
    .into_response()
}

fn delete_failed() -> Response {
    (
        [("HX-Reswap", "none")],
        Html(
            AlertSlot {
                alert: ErrorAlert { msg: DELETE_FAILED },
            }
            .render()
            .into_inner(),
        ),
    )
        .into_response()
}

/// Replaces the dashboard's alert area out of band.
struct AlertSlot<R> {
    alert: R,
}

impl<R: Renderable> Renderable for AlertSlot<R> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            div id="alerts" hx-swap-oob="true" {
                (self.alert)
            }
        }
        .render_to(buffer);
    }
}
