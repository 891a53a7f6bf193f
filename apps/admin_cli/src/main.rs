use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    layout::{Chrome, ChromeConfig, ThemeMode},
    AuthContext, ClientError, DeleteOutcome, FormMode, HttpTeacherApi, HttpTransport, Route,
    SearchContext, Session, SessionUser, TeacherApi, TeacherForm, TeacherListView,
};
use shared::domain::{TeacherField, TeacherId};
use tracing_subscriber::EnvFilter;

mod config;
mod console;

use config::{Overrides, Settings};
use console::{ConsoleNavigator, PromptConfirm};

#[derive(Parser, Debug)]
#[command(name = "teacher-admin", about = "Manage teacher records over the school API")]
struct Args {
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    token: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one page of teachers.
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        page_size: Option<u32>,
        /// Delete this teacher from the list before printing it.
        #[arg(long)]
        delete: Option<i64>,
        #[arg(long)]
        yes: bool,
    },
    Show {
        id: i64,
    },
    Add {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Delete a teacher after typing its name.
    Delete {
        id: i64,
        #[arg(long)]
        yes: bool,
    },
}

struct App {
    settings: Settings,
    auth: AuthContext,
    search: SearchContext,
    api: Arc<dyn TeacherApi>,
    navigator: Arc<ConsoleNavigator>,
}

impl App {
    fn new(settings: Settings) -> Result<Self> {
        let token = settings
            .api_token
            .clone()
            .context("no API token configured; set API_TOKEN or pass --token")?;
        let auth = AuthContext::with_session(Session::new(token, SessionUser::default()));
        let transport = HttpTransport::with_timeout(
            settings.api_url.clone(),
            auth.clone(),
            settings.request_timeout,
        )
        .map_err(|err| anyhow!(err.user_message()))?;

        Ok(Self {
            settings,
            auth,
            search: SearchContext::new(),
            api: Arc::new(HttpTeacherApi::new(transport)),
            navigator: Arc::new(ConsoleNavigator::default()),
        })
    }

    fn chrome(&self) -> Chrome {
        Chrome::new(
            ChromeConfig {
                default_theme: self.settings.default_theme.clone(),
            },
            self.auth.clone(),
            self.search.clone(),
            ThemeMode::from_stored(self.settings.theme_mode.as_deref()),
            u32::MAX,
        )
    }

    async fn form(&self, mode: FormMode) -> TeacherForm {
        let form = TeacherForm::open(
            self.api.clone(),
            self.navigator.clone(),
            mode,
            self.settings.default_password.clone(),
        )
        .await;
        self.search.set_title(form.heading());
        form
    }

    async fn list(
        &self,
        search: Option<String>,
        page: u32,
        delete: Option<i64>,
        yes: bool,
    ) -> Result<()> {
        if let Some(term) = search {
            self.search.set_term(term);
        }
        let view = TeacherListView::mount(
            self.api.clone(),
            &self.auth,
            self.search.clone(),
            self.navigator.clone(),
            self.settings.page_size,
        );
        let controller = view.controller();
        controller.settled().await;
        if page > 1 {
            controller.set_page(page);
            controller.settled().await;
        }

        let mut delete_failure = None;
        if let Some(id) = delete {
            match view
                .delete(TeacherId(id), &PromptConfirm { assume_yes: yes })
                .await
            {
                Ok(DeleteOutcome::Deleted) => println!("Deleted teacher {id}."),
                Ok(DeleteOutcome::Cancelled) => println!("Delete cancelled."),
                Err(err) => delete_failure = Some(err),
            }
            controller.settled().await;
        }

        console::print_header(&self.chrome(), &Route::TeacherList.path());
        console::render_list(&view.screen()).map_err(anyhow::Error::msg)?;
        match delete_failure {
            Some(err) => {
                let message = view.action_error().unwrap_or_else(|| err.user_message());
                Err(failure(&err, message))
            }
            None => Ok(()),
        }
    }

    async fn show(&self, id: i64) -> Result<()> {
        let form = self.form(FormMode::Edit(TeacherId(id))).await;
        console::print_header(&self.chrome(), &Route::TeacherEdit(TeacherId(id)).path());
        if let Some(message) = form.error_message() {
            bail!(message);
        }
        let fields = form.fields();
        println!("Name:  {}", fields.name);
        println!("Phone: {}", fields.phone_number);
        println!("Email: {}", fields.email);
        Ok(())
    }

    async fn save(
        &self,
        mode: FormMode,
        name: Option<String>,
        phone: Option<String>,
        email: Option<String>,
    ) -> Result<()> {
        let mut form = self.form(mode).await;
        let route = match mode {
            FormMode::Create => Route::TeacherAdd,
            FormMode::Edit(id) => Route::TeacherEdit(id),
        };
        console::print_header(&self.chrome(), &route.path());
        if let Some(message) = form.error_message() {
            bail!(message);
        }

        let prompt_missing = mode == FormMode::Create;
        for (field, value, label) in [
            (TeacherField::Name, name, "Name"),
            (TeacherField::PhoneNumber, phone, "Phone number"),
            (TeacherField::Email, email, "Email"),
        ] {
            let value = match value {
                Some(value) => Some(value),
                None if prompt_missing => Some(console::prompt_text(label)?),
                None => None,
            };
            if let Some(value) = value {
                form.set_field(field, value);
            }
        }

        form.submit().await.map_err(|err| describe(&form, err))?;
        println!(
            "Saved. Back to {}",
            self.navigator
                .last_path()
                .unwrap_or_else(|| Route::TeacherList.path())
        );
        Ok(())
    }

    async fn delete(&self, id: i64, yes: bool) -> Result<()> {
        let mut form = self.form(FormMode::Edit(TeacherId(id))).await;
        console::print_header(&self.chrome(), &Route::TeacherEdit(TeacherId(id)).path());
        if !form.begin_delete() {
            bail!(form
                .error_message()
                .unwrap_or_else(|| "This teacher cannot be deleted right now.".to_string()));
        }

        let typed = if yes {
            form.display_name().to_string()
        } else {
            let prompt = form.delete_prompt().unwrap_or_default();
            console::prompt_text(prompt.trim_end_matches(':'))?
        };
        form.set_delete_input(typed);
        if !form.delete_enabled() {
            form.cancel_delete();
            bail!("The typed name does not match; nothing was deleted.");
        }

        form.confirm_delete()
            .await
            .map_err(|err| describe(&form, err))?;
        println!("Deleted teacher {id}.");
        Ok(())
    }
}

fn describe(form: &TeacherForm, err: ClientError) -> anyhow::Error {
    let message = form.error_message().unwrap_or_else(|| err.user_message());
    failure(&err, message)
}

/// Error for the terminal; rejected credentials get a hint on where the token comes from.
fn failure(err: &ClientError, message: String) -> anyhow::Error {
    if err.requires_reauth() {
        anyhow!("{message} Set API_TOKEN or pass --token.")
    } else {
        anyhow!(message)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let page_size = match &args.command {
        Command::List { page_size, .. } => *page_size,
        _ => None,
    };
    let overrides = Overrides {
        api_url: args.api_url.clone(),
        api_token: args.token.clone(),
        page_size,
    };
    let settings = config::load_settings(&args.config, &overrides)?;
    tracing::info!(api_url = %settings.api_url, "teacher-admin starting");
    let app = App::new(settings)?;

    match args.command {
        Command::List {
            search,
            page,
            delete,
            yes,
            ..
        } => app.list(search, page, delete, yes).await,
        Command::Show { id } => app.show(id).await,
        Command::Add { name, phone, email } => {
            app.save(FormMode::Create, name, phone, email).await
        }
        Command::Edit {
            id,
            name,
            phone,
            email,
        } => {
            app.save(FormMode::Edit(TeacherId(id)), name, phone, email)
                .await
        }
        Command::Delete { id, yes } => app.delete(id, yes).await,
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
