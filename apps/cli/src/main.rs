use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use shared::domain::{AgendaId, VoteValue};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use voting_client::{
    config::{load_settings, normalize_base_url},
    forms::{submit_agenda, submit_member, AgendaDraft, FormOutcome, MemberDraft},
    AgendaBoard, HttpVotingApi, ResultsController, SessionController, SubmitOutcome, VotingApi,
};

mod render;

#[derive(Parser, Debug)]
#[command(name = "coopvote", about = "Cooperative voting client")]
struct Cli {
    /// Backend base URL, e.g. http://localhost:8080/api
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Config file (defaults to ./coopvote.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List agendas and their session status
    Agendas {
        #[arg(long)]
        json: bool,
    },
    CreateAgenda {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
    },
    OpenSession {
        agenda_id: String,
        #[arg(long)]
        minutes: Option<i64>,
    },
    Members,
    CreateMember {
        #[arg(long)]
        cpf: String,
        #[arg(long)]
        name: String,
    },
    /// Show the voting session view for an agenda
    Session { agenda_id: String },
    Vote {
        agenda_id: String,
        #[arg(long)]
        cpf: String,
        /// SIM or NAO
        #[arg(long)]
        choice: VoteValue,
    },
    Results { agenda_id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(url) = cli.api_url.as_deref() {
        settings.api_base_url = normalize_base_url(url)?;
    }
    debug!(api_base_url = %settings.api_base_url, "settings loaded");
    let api: Arc<dyn VotingApi> = Arc::new(HttpVotingApi::from_settings(&settings)?);

    match cli.command {
        Command::Agendas { json } => {
            let mut board = AgendaBoard::new(api);
            let agendas = match board.refresh().await {
                Ok(agendas) => agendas,
                Err(notice) => bail!("{notice}"),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(agendas)?);
            } else {
                print!("{}", render::agenda_list(agendas, chrono::Utc::now()));
            }
        }
        Command::CreateAgenda { title, description } => {
            let outcome = submit_agenda(api.as_ref(), &AgendaDraft::new(title, description)).await;
            if let FormOutcome::Created(id, _) = &outcome {
                println!("agenda_id={id}");
            }
            report_form(&outcome)?;
        }
        Command::OpenSession { agenda_id, minutes } => {
            let minutes = minutes.or(Some(i64::from(settings.default_session_minutes)));
            let mut board = AgendaBoard::new(api);
            let notice = board.open_session(&AgendaId(agenda_id), minutes).await;
            println!("{}", render::notice(&notice));
            if !notice.is_success() {
                std::process::exit(1);
            }
        }
        Command::Members => {
            let members = match api.list_members().await {
                Ok(members) => members,
                Err(err) => bail!("failed to list members: {err}"),
            };
            print!("{}", render::member_list(&members));
        }
        Command::CreateMember { cpf, name } => {
            let outcome = submit_member(api.as_ref(), &MemberDraft::new(cpf, name)).await;
            report_form(&outcome)?;
        }
        Command::Session { agenda_id } => {
            let session = SessionController::new(api, AgendaId(agenda_id));
            let view = session.load().await;
            print!(
                "{}",
                render::session(&view, session.notice().await.as_ref(), chrono::Utc::now())
            );
        }
        Command::Vote {
            agenda_id,
            cpf,
            choice,
        } => {
            let session = SessionController::new(api, AgendaId(agenda_id));
            session.load().await;
            session.select_member(&cpf).await;
            let outcome = session.submit_vote(choice).await;
            print!(
                "{}",
                render::session(
                    &session.view().await,
                    session.notice().await.as_ref(),
                    chrono::Utc::now()
                )
            );
            match outcome {
                SubmitOutcome::Registered(_) => {}
                SubmitOutcome::Ignored => bail!("voting is not open for this agenda"),
                SubmitOutcome::Refused(_) | SubmitOutcome::Failed(_) => std::process::exit(1),
            }
        }
        Command::Results { agenda_id } => {
            let view = ResultsController::new(api, AgendaId(agenda_id)).load().await;
            print!("{}", render::results(&view));
        }
    }

    Ok(())
}

fn report_form<T>(outcome: &FormOutcome<T>) -> Result<()> {
    println!("{}", render::notice(outcome.notice()));
    match outcome {
        FormOutcome::Created(..) => Ok(()),
        FormOutcome::Invalid(_) | FormOutcome::Failed(_) => std::process::exit(1),
    }
}
