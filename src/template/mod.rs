//! Templating code.
//!
//! This defines the [`Page`] item, which wraps every full page the site
//! serves. Fragments requested by htmx are rendered without it.

use axum::{
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use hypertext::prelude::*;

pub struct Page<R: Renderable> {
    title: &'static str,
    body: Option<R>,
    scripts: Vec<&'static str>,
}

impl<R: Renderable> Page<R> {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn title(mut self, title: &'static str) -> Self {
        self.title = title;
        self
    }

    pub fn body(mut self, body: R) -> Self {
        self.body = Some(body);
        self
    }

    pub fn script(mut self, src: &'static str) -> Self {
        self.scripts.push(src);
        self
    }
}

impl<R: Renderable> Renderable for Page<R> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            html lang="pt-BR" {
                head {
                    meta charset="utf-8";
                    title { (self.title) }
                    script src="https://cdn.jsdelivr.net/npm/htmx.org@2.0.7/dist/htmx.min.js" integrity="sha384-ZBXiYtYQ6hJ2Y0ZNoYuI+Nq5MqWBr+chMrS/RkXpNzQCApHEhOt2aY8EJgqwHLkJ" crossorigin="anonymous" {
                    }
                    link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.0.0/css/all.min.css";
                    link rel="stylesheet" href="https://fonts.googleapis.com/css2?family=Poppins:wght@300;400;500;600;700&display=swap";
                    link rel="stylesheet" href="/static/style.css";
                    meta
                        name="viewport"
                        content="width=device-width, initial-scale=1";
                    @for src in &self.scripts {
                        script src=(*src) {}
                    }
                }
                body {
                    @if let Some(body) = &self.body {
                        (body)
                    }
                }
            }
        }
        .render_to(buffer)
    }
}

impl<R: Renderable> Default for Page<R> {
    fn default() -> Self {
        Self {
            title: "Solarys",
            body: None,
            scripts: Vec::new(),
        }
    }
}

pub async fn stylesheet() -> Response {
    (
        [(CONTENT_TYPE, "text/css; charset=utf-8")],
        include_str!("../../assets/style.css"),
    )
        .into_response()
}
