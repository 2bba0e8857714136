use hypertext::prelude::*;

/// A row of buttons. Links are followed with a GET; `posts` are submitted as
/// empty forms, for actions which change state.
pub struct Actions<'r> {
    pub options: &'r [(&'r str, &'r str)],
    pub posts: &'r [(&'r str, &'r str)],
}

impl<'r> Renderable for Actions<'r> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            div class = "row mt-3 mb-3" {
                @for (link, text) in self.options {
                    div class = "col-md-auto" {
                        a class="btn btn-primary"
                            href=(link) {
                            (text)
                        }
                    }
                }
                @for (action, text) in self.posts {
                    div class = "col-md-auto" {
                        form method="post" action=(action) {
                            button type="submit" class="btn btn-danger" {
                                (text)
                            }
                        }
                    }
                }
            }
        }
        .render_to(buffer);
    }
}
