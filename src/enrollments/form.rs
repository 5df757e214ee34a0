use axum::{
    extract::{Form, Path, State},
    response::Redirect,
};
use axum_extra::extract::{CookieJar, PrivateCookieJar};
use chrono::Utc;
use hypertext::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    enrollments::{
        NewEnrollment, Shift, SubmitError, TRAINING_SLOT, Team, submit,
    },
    landing::{cooldown, flow, render_landing},
    msg::{Msg, MsgContents},
    state::AppState,
    template::Page,
    util_resp::{
        FailureResponse, StandardResponse, bad_request, err_not_found,
        see_other_ok, success,
    },
    validation::{is_valid_email, parse_form_date},
    widgets::alert::{ErrorAlert, WarningAlert},
};

/// The enrollment form exactly as submitted. Missing fields deserialize as
/// empty strings so that they can be reported alongside the others.
#[derive(Deserialize, Serialize, Default, Clone, Debug)]
#[serde(default, rename_all = "camelCase")]
pub struct EnrollmentForm {
    pub nome_completo: String,
    pub data_nascimento: String,
    pub email: String,
    pub numero_telefone: String,
    pub sala: String,
    pub turno: String,
    pub ano_escolar: String,
    pub problema_saude: String,
}

impl EnrollmentForm {
    pub fn validate(
        &self,
        team: &'static Team,
    ) -> Result<NewEnrollment, Vec<String>> {
        let mut problems = Vec::new();

        let mut required = |value: &str, label: &str| {
            let value = value.trim();
            if value.is_empty() {
                problems.push(format!("O campo {label} é obrigatório."));
            }
            value.to_string()
        };

        let full_name = required(&self.nome_completo, "Nome Completo");
        let phone = required(&self.numero_telefone, "Número de Telefone");
        let class = required(&self.sala, "Turma");
        let shift = required(&self.turno, "Turno");
        let grade = required(&self.ano_escolar, "Série");
        let birth_date = required(&self.data_nascimento, "Data de Nascimento");

        let email = self.email.trim().to_string();
        if !email.is_empty() {
            if let Err(e) = is_valid_email(&email) {
                problems.push(format!("Email: {e}."));
            }
        }

        let shift = match Shift::parse(&shift) {
            Some(shift) => Some(shift),
            None if shift.is_empty() => None,
            None => {
                problems.push("Selecione um turno válido.".to_string());
                None
            }
        };
        let grade = match grade.parse::<u32>() {
            Ok(grade) => Some(grade),
            Err(_) if grade.is_empty() => None,
            Err(_) => {
                problems.push("A série deve ser um número.".to_string());
                None
            }
        };
        let birth_date = match parse_form_date(&birth_date) {
            Ok(date) => Some(date),
            Err(_) if birth_date.is_empty() => None,
            Err(e) => {
                problems.push(format!("Data de Nascimento: {e}."));
                None
            }
        };

        match (shift, grade, birth_date) {
            (Some(shift), Some(grade), Some(birth_date)) if problems.is_empty() => {
                Ok(NewEnrollment {
                    full_name,
                    birth_date,
                    email,
                    phone,
                    class,
                    shift,
                    grade,
                    health_issues: self.problema_saude.trim().to_string(),
                    team,
                })
            }
            _ => Err(problems),
        }
    }
}

struct EnrollmentFormView<'a> {
    team: &'static Team,
    form: &'a EnrollmentForm,
}

impl Renderable for EnrollmentFormView<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        let team = self.team;
        let form = self.form;

        maud! {
            div class="enrollment-form" {
                div class="form-header" {
                    div class="header-info" {
                        i class=(team.icon) style=(format!("color: {}", team.color)) {}
                        h2 { "Inscrição - " (team.name) }
                    }
                    div class="team-info" {
                        span { (team.name) " - " (team.sport) }
                        i class=(team.icon) style=(format!("color: {}", team.color)) {}
                    }
                }
                form method="post" action=(format!("/inscricao/{}", team.name)) {
                    div class="form-row" {
                        div class="form-group full-width" {
                            label for="nomeCompleto" { "Nome Completo" }
                            input type="text" id="nomeCompleto" name="nomeCompleto"
                                value=(form.nome_completo) required;
                        }
                    }
                    div class="form-row three-cols" {
                        div class="form-group" {
                            label for="email" { "Email (não obrigatório)" }
                            input type="email" id="email" name="email"
                                value=(form.email);
                        }
                        div class="form-group" {
                            label for="numeroTelefone" { "Número de Telefone" }
                            input type="tel" id="numeroTelefone" name="numeroTelefone"
                                value=(form.numero_telefone) required;
                        }
                        div class="form-group" {
                            label for="problemaSaude" { "Problema de Saúde?" }
                            input type="text" id="problemaSaude" name="problemaSaude"
                                placeholder="Descreva, se houver"
                                value=(form.problema_saude);
                        }
                    }
                    div class="form-row three-cols" {
                        div class="form-group" {
                            label for="anoEscolar" { "Série" }
                            input type="number" id="anoEscolar" name="anoEscolar"
                                min="1" max="12"
                                value=(form.ano_escolar) required;
                        }
                        div class="form-group" {
                            label for="sala" { "Turma" }
                            input type="text" id="sala" name="sala"
                                value=(form.sala) required;
                        }
                        div class="form-group" {
                            label for="turno" { "Turno" }
                            select id="turno" name="turno" required {
                                option value="" { "Selecione o turno" }
                                @for shift in Shift::ALL {
                                    @if form.turno == shift.stored() {
                                        option value=(shift.stored()) selected { (shift.label()) }
                                    } @else {
                                        option value=(shift.stored()) { (shift.label()) }
                                    }
                                }
                            }
                        }
                    }
                    div class="form-row three-cols" {
                        div class="form-group" {
                            label for="dataNascimento" { "Data de Nascimento" }
                            input type="date" id="dataNascimento" name="dataNascimento"
                                value=(form.data_nascimento) required;
                        }
                        div class="form-group" {
                            label for="horarioTreino" { "Horário de Treino" }
                            select id="horarioTreino" name="horarioTreino" {
                                option value=(TRAINING_SLOT) selected { (TRAINING_SLOT) }
                            }
                        }
                    }
                    div class="form-actions" {
                        a class="back-button" href="/?etapa=selecao" { "Voltar" }
                        button type="submit" class="submit-button" { "Enviar Inscrição" }
                    }
                }
            }
        }
        .render_to(buffer);
    }
}

fn form_page<R: Renderable>(
    team: &'static Team,
    form: &EnrollmentForm,
    alert: Option<R>,
) -> Rendered<String> {
    Page::new()
        .title("Inscrição - Solarys")
        .body(maud! {
            div class="content" {
                @if let Some(alert) = &alert {
                    (alert)
                }
                (EnrollmentFormView { team, form })
            }
        })
        .render()
}

/// Choosing a team. Opens its (blank) form unless this browser is still in
/// its cooldown, in which case the team grid is shown again with the time
/// left.
pub async fn enrollment_page(
    State(state): State<AppState>,
    Path(team): Path<String>,
    jar: CookieJar,
    private: PrivateCookieJar,
) -> (CookieJar, StandardResponse) {
    let Some(team) = Team::find(&team) else {
        return (jar, err_not_found());
    };

    let selection = flow::choose(
        team,
        cooldown::last_submission(&private),
        Utc::now(),
        state.settings.cooldown(),
    );

    match selection {
        flow::Selection::Enroll(team) => (
            jar,
            success(form_page(
                team,
                &EnrollmentForm::default(),
                None::<ErrorAlert<String>>,
            )),
        ),
        flow::Selection::Blocked { remaining } => {
            let (jar, page) = render_landing(
                &state.settings,
                jar,
                flow::Step::Selecting,
                Some(remaining),
            );
            (jar, success(page))
        }
    }
}

pub async fn do_enroll(
    State(state): State<AppState>,
    Path(team): Path<String>,
    jar: PrivateCookieJar,
    Form(form): Form<EnrollmentForm>,
) -> (PrivateCookieJar, StandardResponse) {
    let Some(team) = Team::find(&team) else {
        return (jar, err_not_found());
    };

    let now = Utc::now();

    if let Some(left) = cooldown::remaining(
        cooldown::last_submission(&jar),
        now,
        state.settings.cooldown(),
    ) {
        let msg = format!(
            "Você enviou uma inscrição recentemente. Aguarde {} para fazer uma nova inscrição.",
            cooldown::describe(left)
        );
        return (
            jar,
            bad_request(form_page(team, &form, Some(WarningAlert { msg }))),
        );
    }

    let enrollment = match form.validate(team) {
        Ok(enrollment) => enrollment,
        Err(problems) => {
            return (
                jar,
                bad_request(form_page(
                    team,
                    &form,
                    Some(ErrorAlert {
                        msg: problems.join(" "),
                    }),
                )),
            );
        }
    };

    match submit(state.store.as_ref(), &enrollment, now) {
        Ok(_) => {
            let _ = state.tx.send(Msg {
                team: team.name.to_string(),
                inner: MsgContents::EnrollmentCreated,
            });

            (
                cooldown::start(jar, now),
                see_other_ok(Redirect::to("/?etapa=enviado")),
            )
        }
        Err(SubmitError::Duplicate) => (
            jar,
            bad_request(form_page(
                team,
                &form,
                Some(WarningAlert {
                    msg: "Este número de telefone já está inscrito nesta modalidade.",
                }),
            )),
        ),
        Err(SubmitError::Store(e)) => {
            tracing::error!("could not store enrollment: {e}");
            (
                jar,
                Err(FailureResponse::ServerError(form_page(
                    team,
                    &form,
                    Some(ErrorAlert {
                        msg: "Erro ao enviar a inscrição. Tente novamente.",
                    }),
                ))),
            )
        }
    }
}
