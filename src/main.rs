#![forbid(unsafe_code)]

use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use hr_candidate_client::{
    config::Config,
    dto::candidate_dto::QueryParams,
    error::Error,
    forms::{FileUpload, FormHandler},
    models::{candidate::Candidate, upload::UploadFile},
    services::export_service::ExportService,
    validation::{
        CandidateFilter, CandidateRegistration, CandidateUpdateForm, StatusCheck,
        StatusHistoryFilter, StatusUpdateForm,
    },
    AppState,
};
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "hr-client: candidate registration and admin console",
    long_about = None
)]
struct Cli {
    /// Print raw JSON instead of the human summary.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Submit a new application with a resume.
    Register(RegisterArgs),
    /// Look up an application by email (public).
    Status {
        #[arg(long)]
        email: String,
    },
    /// List candidates.
    List(ListArgs),
    /// Show one candidate.
    Show { id: Uuid },
    /// Edit candidate fields.
    Update(UpdateArgs),
    /// Move a candidate to a new status.
    UpdateStatus(UpdateStatusArgs),
    /// Delete a candidate.
    Delete { id: Uuid },
    /// Status-change history, for one candidate or filtered.
    History(HistoryArgs),
    /// Download a candidate's resume.
    Resume {
        id: Uuid,
        /// File name without extension.
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Export candidates to an XLSX workbook.
    Export {
        #[arg(long, default_value = "candidates.xlsx")]
        output: PathBuf,
        #[command(flatten)]
        filters: ListArgs,
    },
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    full_name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    /// YYYY-MM-DD
    #[arg(long)]
    date_of_birth: Option<NaiveDate>,
    #[arg(long)]
    years_of_experience: Option<f64>,
    /// it, hr or finance
    #[arg(long)]
    department: String,
    #[arg(long)]
    resume: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
struct ListArgs {
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    page_size: Option<u32>,
    #[arg(long)]
    full_name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    status: Option<String>,
    #[arg(long)]
    min_experience: Option<f64>,
    #[arg(long)]
    max_experience: Option<f64>,
    #[arg(long)]
    from: Option<NaiveDate>,
    #[arg(long)]
    to: Option<NaiveDate>,
}

impl ListArgs {
    fn uses_advanced_filters(&self) -> bool {
        self.status.is_some()
            || self.min_experience.is_some()
            || self.max_experience.is_some()
            || self.from.is_some()
            || self.to.is_some()
    }

    fn filter(&self) -> CandidateFilter {
        CandidateFilter {
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            current_status: self.status.clone(),
            years_of_experience_min: self.min_experience,
            years_of_experience_max: self.max_experience,
            date_from: self.from,
            date_to: self.to,
        }
    }
}

#[derive(Args, Debug)]
struct UpdateArgs {
    id: Uuid,
    #[arg(long)]
    full_name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    date_of_birth: Option<NaiveDate>,
    #[arg(long)]
    years_of_experience: Option<f64>,
    #[arg(long)]
    department: Option<String>,
    #[arg(long)]
    resume: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct UpdateStatusArgs {
    id: Uuid,
    #[arg(long)]
    status: String,
    #[arg(long)]
    feedback: String,
    #[arg(long)]
    admin_name: String,
    #[arg(long)]
    admin_email: String,
}

#[derive(Args, Debug)]
struct HistoryArgs {
    /// Limit to one candidate.
    #[arg(long)]
    candidate: Option<Uuid>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    status: Option<String>,
    #[arg(long)]
    admin_name: Option<String>,
    #[arg(long)]
    from: Option<NaiveDate>,
    #[arg(long)]
    to: Option<NaiveDate>,
}

fn init_tracing(config: &Config) {
    let default_level = if config.app.debug {
        "hr_candidate_client=debug,hr_client=debug,warn"
    } else if config.app.enable_logging {
        "hr_candidate_client=info,hr_client=info,warn"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        _ => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init(),
    }
}

/// Keeps server field messages visible when an error reaches the terminal.
fn explain(err: Error) -> anyhow::Error {
    if err.field_errors().is_empty() {
        err.into()
    } else {
        anyhow!("{}: {}", err, err.field_errors().join("; "))
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_candidate_line(config: &Config, candidate: &Candidate) {
    let status = candidate
        .current_status
        .map(|s| config.status_label(s.as_str()).to_string())
        .unwrap_or_else(|| "-".to_string());
    let department = candidate.department.map(|d| d.label()).unwrap_or("-");
    println!(
        "{}  {:<30} {:<30} {:<24} {}",
        candidate.id, candidate.full_name, candidate.email, department, status
    );
}

fn form_failure(errors: &std::collections::BTreeMap<String, Vec<String>>) -> anyhow::Error {
    let lines: Vec<String> = errors
        .iter()
        .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
        .collect();
    anyhow!("Invalid input\n  {}", lines.join("\n  "))
}

async fn load_resume(state: &AppState, path: &Path) -> anyhow::Result<UploadFile> {
    state.require_file_upload()?;
    let file = UploadFile::from_path(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;

    let mut upload = FileUpload::new(state.config.upload.clone());
    if !upload.handle_file_select(vec![file]) {
        return Err(anyhow!(
            "{}",
            upload.upload_error().unwrap_or("File rejected")
        ));
    }
    upload
        .files()
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("No file selected"))
}

async fn fetch_list(state: &AppState, args: &ListArgs) -> anyhow::Result<()> {
    if args.uses_advanced_filters() {
        state.require_advanced_filters()?;
    }
    let mut form = FormHandler::new(args.filter());
    if !form.validate() {
        return Err(form_failure(form.errors()));
    }

    let mut params: QueryParams = form.values().to_query_params();
    state.store.set_active_filters(params.clone());
    if let Some(page) = args.page {
        params.insert("page".into(), json!(page));
    }
    if let Some(page_size) = args.page_size {
        params.insert("page_size".into(), json!(page_size));
    }
    state.store.fetch_candidates(params).await.map_err(explain)
}

async fn run(state: AppState, cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Register(args) => {
            let resume = match &args.resume {
                Some(path) => Some(load_resume(&state, path).await?),
                None => None,
            };
            let mut form = FormHandler::new(CandidateRegistration::default());
            *form.values_mut() = CandidateRegistration {
                full_name: args.full_name,
                email: args.email,
                phone: args.phone,
                date_of_birth: args.date_of_birth,
                years_of_experience: args.years_of_experience,
                department: args.department,
                resume,
                upload: state.config.upload.clone(),
            };

            let store = &state.store;
            let result = form
                .submit(|values| async move {
                    let candidate = values.to_new_candidate()?;
                    store.create_candidate(&candidate).await
                })
                .await;

            if !form.errors().is_empty() {
                return Err(form_failure(form.errors()));
            }
            if let Some(error) = result.error {
                return Err(anyhow!(error));
            }
            let snapshot = store.snapshot();
            if let Some(created) = snapshot.candidates.first() {
                if cli.json {
                    print_json(created)?;
                } else {
                    println!("Application submitted. Reference: {}", created.id);
                }
            }
        }
        Commands::Status { email } => {
            let check = StatusCheck { email };
            let mut form = FormHandler::new(check);
            if !form.validate() {
                return Err(form_failure(form.errors()));
            }
            let status = state
                .store
                .get_candidate_status(&form.values().email)
                .await
                .map_err(explain)?;
            if cli.json {
                print_json(&status)?;
            } else {
                let label = status
                    .current_status_display
                    .clone()
                    .or_else(|| status.current_status.map(|s| s.label().to_string()))
                    .unwrap_or_else(|| "Unknown".to_string());
                println!("{} <{}>: {}", status.full_name, status.email, label);
            }
        }
        Commands::List(args) => {
            fetch_list(&state, &args).await?;
            let snapshot = state.store.snapshot();
            if cli.json {
                print_json(&snapshot.candidates)?;
            } else {
                for candidate in &snapshot.candidates {
                    print_candidate_line(&state.config, candidate);
                }
                println!(
                    "Page {} · {} of {} candidates{}{}",
                    snapshot.pagination.page,
                    snapshot.candidates.len(),
                    snapshot.total_candidates(),
                    if snapshot.has_previous_page() { " · previous" } else { "" },
                    if snapshot.has_next_page() { " · next" } else { "" },
                );
            }
        }
        Commands::Show { id } => {
            let candidate = state.store.fetch_candidate(id).await.map_err(explain)?;
            if cli.json {
                print_json(&candidate)?;
            } else {
                print_candidate_line(&state.config, &candidate);
                for entry in &candidate.status_history {
                    println!(
                        "  {} -> {} by {}: {}",
                        entry.previous_status.map(|s| s.label()).unwrap_or("-"),
                        entry.new_status.label(),
                        entry.admin_name,
                        entry.feedback
                    );
                }
            }
        }
        Commands::Update(args) => {
            let resume = match &args.resume {
                Some(path) => Some(load_resume(&state, path).await?),
                None => None,
            };
            let form = CandidateUpdateForm {
                full_name: args.full_name,
                email: args.email,
                phone: args.phone,
                date_of_birth: args.date_of_birth,
                years_of_experience: args.years_of_experience,
                department: args.department,
                resume,
                upload: state.config.upload.clone(),
            };
            let update = form.to_update().map_err(explain)?;
            let candidate = state
                .store
                .update_candidate(args.id, &update)
                .await
                .map_err(explain)?;
            if cli.json {
                print_json(&candidate)?;
            } else {
                print_candidate_line(&state.config, &candidate);
            }
        }
        Commands::UpdateStatus(args) => {
            let mut form = FormHandler::new(StatusUpdateForm {
                new_status: args.status,
                admin_name: args.admin_name,
                admin_email: args.admin_email,
                feedback: args.feedback,
            });
            if !form.validate() {
                return Err(form_failure(form.errors()));
            }
            let update = form.values().to_status_update().map_err(explain)?;
            let candidate = state
                .store
                .update_candidate_status(args.id, &update)
                .await
                .map_err(explain)?;
            if cli.json {
                print_json(&candidate)?;
            } else {
                print_candidate_line(&state.config, &candidate);
            }
        }
        Commands::Delete { id } => {
            state.store.delete_candidate(id).await.map_err(explain)?;
            println!("Deleted {}", id);
        }
        Commands::History(args) => {
            let history = match args.candidate {
                Some(id) => state
                    .status_history_service
                    .get_candidate_status_history(id)
                    .await
                    .map_err(explain)?,
                None => {
                    let filter = StatusHistoryFilter {
                        candidate_email: args.email,
                        new_status: args.status,
                        admin_name: args.admin_name,
                        date_from: args.from,
                        date_to: args.to,
                    };
                    let mut form = FormHandler::new(filter);
                    if !form.validate() {
                        return Err(form_failure(form.errors()));
                    }
                    state
                        .status_history_service
                        .get_status_history(form.values().to_query_params())
                        .await
                        .map_err(explain)?
                }
            };
            if cli.json {
                print_json(history.entries())?;
            } else {
                for entry in history.entries() {
                    let when = entry
                        .created_at
                        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_default();
                    println!(
                        "{}  {} -> {}  {}",
                        when,
                        entry.previous_status.map(|s| s.label()).unwrap_or("-"),
                        entry.new_status.label(),
                        entry.admin_name
                    );
                }
            }
        }
        Commands::Resume { id, name, out } => {
            let path = state
                .store
                .download_resume(id, name.as_deref(), &out)
                .await
                .map_err(explain)?;
            println!("Saved {}", path.display());
        }
        Commands::Export { output, filters } => {
            state.require_export()?;
            fetch_list(&state, &filters).await?;
            let snapshot = state.store.snapshot();
            let bytes =
                ExportService::generate_candidates_xlsx(&snapshot.candidates, &state.config.app.title)
                    .map_err(explain)?;
            tokio::fs::write(&output, bytes)
                .await
                .with_context(|| format!("writing {}", output.display()))?;
            info!(rows = snapshot.candidates.len(), path = %output.display(), "Export written");
            println!("Exported {} candidates to {}", snapshot.candidates.len(), output.display());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config);

    let cli = Cli::parse();
    let state = AppState::new(config)?;
    info!(
        title = %state.config.app.title,
        version = %state.config.app.version,
        api = %state.api.base_url(),
        "Starting"
    );

    run(state, cli).await
}
