//! Client-side core of the cooperative voting front end.
//!
//! The backend owns persistence, vote uniqueness, session expiry and the
//! authoritative tally. This crate owns what a view needs on top of that:
//! the voting-session state machine ([`session::SessionController`]), the
//! pure result aggregation ([`aggregator`]), the agenda board, the creation
//! forms, and the HTTP contract ([`api::VotingApi`]).

pub mod agenda_board;
pub mod aggregator;
pub mod api;
pub mod config;
pub mod forms;
pub mod notice;
pub mod results;
pub mod session;
pub mod validation;

pub use agenda_board::AgendaBoard;
pub use aggregator::{classify, percentage, ResultSummary, Verdict, VoteRow};
pub use api::{ApiCallError, FetchOutcome, HttpVotingApi, VotingApi};
pub use config::Settings;
pub use notice::{Notice, NoticeKind};
pub use results::{ResultsController, ResultsReport, ResultsView};
pub use session::{
    OpenSession, SelectOutcome, SessionController, SessionEvent, SessionView, SubmitOutcome,
};

#[cfg(test)]
#[path = "tests/fake_api.rs"]
pub(crate) mod fake_api;
