//! Templating code.
//!
//! This defines the [`Page`] item, which is used in most of the other parts of
//! this crate.

use hypertext::prelude::*;

use crate::{auth::User, teams::Team};

pub mod form;

pub struct Page<R: Renderable> {
    body: Option<R>,
    user: Option<User>,
    team: Option<Team>,
}

impl<R: Renderable> Page<R> {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn team(mut self, team: Team) -> Self {
        self.team = Some(team);
        self
    }

    pub fn body(mut self, body: R) -> Self {
        self.body = Some(body);
        self
    }

    pub fn user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    pub fn user_opt(mut self, user: Option<User>) -> Self {
        self.user = user;
        self
    }
}

impl<R: Renderable> Renderable for Page<R> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            html {
                head {
                    title { "TeamBuilder" }
                    link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css" rel="stylesheet" crossorigin="anonymous";
                    meta
                        name="viewport"
                        content="width=device-width, initial-scale=1";
                }
                body class="d-flex flex-column vh-100" {
                    nav class="navbar navbar-expand"
                        style="background-color: #1d4d2b; display: flex; justify-content: space-between; align-items: center;"
                        data-bs-theme="dark" {
                        div class="container-fluid" style="display: flex; justify-content: space-between; align-items: center;" {
                            @if let Some(team) = &self.team {
                                a class="navbar-brand text-white"
                                  href=(format!("/teams/{}", team.id)) {
                                    (team.name)
                                }
                            } @else {
                                a class="navbar-brand text-white" href="/" {
                                    "Home"
                                }
                            }
                            @if let Some(team) = &self.team {
                                ul class="navbar-nav" style="display: flex; gap: 1rem;" data-bs-theme="dark" {
                                    li class="nav-item" {
                                        a class="nav-link text-white" href=(format!("/teams/{}/fixtures", team.id)) {
                                            "Fixtures"
                                        }
                                    }
                                    li class="nav-item" {
                                        a class="nav-link text-white" href=(format!("/teams/{}/evaluations", team.id)) {
                                            "Evaluations"
                                        }
                                    }
                                    li class="nav-item" {
                                        a class="nav-link text-white" href=(format!("/teams/{}/videos", team.id)) {
                                            "Videos"
                                        }
                                    }
                                }
                            }
                            div {
                                ul class="navbar-nav" style="display: flex; gap: 1rem;" data-bs-theme="dark" {
                                    @if let Some(user) = &self.user {
                                        li class="nav-item" {
                                            a class="nav-link text-white" href="/user" {
                                                (user.full_name())
                                            }
                                        }
                                        li class="nav-item" {
                                            form method="post" action="/logout" {
                                                button type="submit" class="btn btn-link nav-link text-white" {
                                                    "Log out"
                                                }
                                            }
                                        }
                                    } @else {
                                        li class="nav-item" {
                                            a class="nav-link text-white" href="/login" {
                                                "Login"
                                            }
                                        }
                                        li class="nav-item" {
                                            a class="nav-link text-white" href="/register" {
                                                "Register"
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                    div class="container flex-grow-1 mt-3" {
                        @if let Some(body) = &self.body {
                            (body)
                        }
                    }
                }
            }
        }.render_to(buffer)
    }
}

impl<R: Renderable> Default for Page<R> {
    fn default() -> Self {
        Self {
            body: Default::default(),
            user: Default::default(),
            team: Default::default(),
        }
    }
}
