use hypertext::prelude::*;

pub struct ErrorAlert<S> {
    pub msg: S,
}

impl<S: ToString> Renderable for ErrorAlert<S> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud!({
            div class="alert alert-danger" role="alert" {
                i class="fas fa-exclamation-triangle" {}
                " "
                (self.msg.to_string())
            }
        })
        .render_to(buffer);
    }
}

pub struct WarningAlert<S> {
    pub msg: S,
}

impl<S: ToString> Renderable for WarningAlert<S> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud!({
            div class="alert alert-warning" role="alert" {
                i class="fas fa-clock" {}
                " "
                (self.msg.to_string())
            }
        })
        .render_to(buffer);
    }
}

pub struct SuccessAlert<S> {
    pub msg: S,
}

impl<S: ToString> Renderable for SuccessAlert<S> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud!({
            div class="alert alert-success" role="status" {
                i class="fas fa-check-circle" {}
                " "
                (self.msg.to_string())
            }
        })
        .render_to(buffer);
    }
}
