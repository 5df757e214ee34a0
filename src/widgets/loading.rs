use hypertext::prelude::*;

/// Spinner shown while a fragment is being fetched.
pub struct Loading<'r> {
    pub msg: &'r str,
}

impl<'r> Renderable for Loading<'r> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            div class="loading" {
                i class="fas fa-spinner fa-spin" {}
                p { (self.msg) }
            }
        }
        .render_to(buffer);
    }
}
