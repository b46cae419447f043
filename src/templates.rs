use crate::{
    context::{Context, Site},
    forms,
    journal_storage::{Category, Journal},
    summary::{Aggregates, Count, DayCount, Series},
};
use askama::Template;

#[derive(Template)]
#[template(path = "login.html")]
pub struct Login<'a> {
    pub site: Site<'a>,
    pub registration_enabled: bool,
    pub return_to: Option<&'a str>,
    pub error: Option<&'a str>,
}

impl<'a> Login<'a> {
    pub fn new(ctx: &'a Context, return_to: Option<&'a str>, error: Option<&'a str>) -> Self {
        Self {
            site: ctx.site(None),
            registration_enabled: ctx.registration_possible(),
            return_to,
            error,
        }
    }
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct Register<'a> {
    pub site: Site<'a>,
    pub errors: &'a [&'a str],
}

impl<'a> Register<'a> {
    pub fn new(site: Site<'a>) -> Self {
        Self { site, errors: &[] }
    }

    pub fn error(site: Site<'a>, errors: &'a [&'a str]) -> Self {
        Self { site, errors }
    }
}

#[derive(Template)]
#[template(path = "register_refresh.html")]
pub struct RegisterRefresh<'a> {
    pub site: Site<'a>,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct Dashboard<'a> {
    pub site: Site<'a>,
    pub journals: &'a [JournalPreview<'a>],
}

pub struct JournalPreview<'a> {
    pub journal: &'a Journal,
    pub excerpt: String,
}

#[derive(Template)]
#[template(path = "journal.html")]
pub struct JournalPage<'a> {
    pub site: Site<'a>,
    pub journal: &'a Journal,
    pub content: &'a str,
}

#[derive(Template)]
#[template(path = "journal_form.html")]
pub struct JournalForm<'a> {
    pub site: Site<'a>,
    pub heading: &'a str,
    pub action: &'a str,
    pub submit: &'a str,
    pub categories: &'a [Category],
    pub form: &'a forms::Journal,
    pub errors: &'a [&'a str],
}

impl JournalForm<'_> {
    fn selected(&self, category: &Category) -> bool {
        self.form.category_id.trim() == category.id.to_string()
    }
}

#[derive(Template)]
#[template(path = "summaries.html")]
pub struct Summaries<'a> {
    pub site: Site<'a>,
    pub start_date: &'a str,
    pub end_date: &'a str,
    pub error: Option<&'a str>,
    pub aggregates: Option<&'a Aggregates>,
    pub frequency: &'a [DayCount],
    pub categories: &'a [Count],
    pub sentiments: &'a [Count],
    pub word_trends: &'a [Series],
}

#[derive(Template)]
#[template(path = "password.html")]
pub struct ChangePassword<'a> {
    pub site: Site<'a>,
    pub errors: &'a [&'a str],
    pub changed: bool,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct Error<'a> {
    pub site: Site<'a>,
    code: u16,
    msg: &'a str,
}

impl<'a> Error<'a> {
    fn new(site: Site<'a>, code: u16, msg: &'a str) -> Self {
        Self { site, code, msg }
    }

    pub fn internal_server(site: Site<'a>) -> Self {
        Self::new(site, 500, "Internal server error")
    }

    pub fn not_found(site: Site<'a>) -> Self {
        Self::new(site, 404, "Not found")
    }

    pub fn registration_closed(site: Site<'a>) -> Self {
        Self::new(
            site,
            501,
            "Registration is closed. Ask whoever runs this site to create an account for you.",
        )
    }

    pub fn bad_request(site: Site<'a>, msg: &'a str) -> Self {
        Self::new(site, 400, msg)
    }
}
