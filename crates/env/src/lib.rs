use std::{env::var, path::PathBuf, sync::Arc};

use dotenv::dotenv;
use eyre::{eyre, Context, Error};
use log::info;

const DEFAULT_SESSIONS_PATH: &str = "data/sessions.json";
const DEFAULT_PAYROLL_PATH: &str = "data/payroll.json";
const DEFAULT_CLIENTS_PATH: &str = "data/clients.json";
const DEFAULT_TOP_COUNT: usize = 5;
const DEFAULT_RUST_LOG: &str = "info";

#[derive(Clone)]
pub struct Env(Arc<EnvInner>);

#[derive(Clone)]
pub struct EnvInner {
    sessions_path: PathBuf,
    payroll_path: PathBuf,
    clients_path: PathBuf,
    client_filter_path: Option<PathBuf>,
    top_count: usize,
    rust_log: String,
}

impl Env {
    pub fn sessions_path(&self) -> &PathBuf {
        &self.0.sessions_path
    }

    pub fn payroll_path(&self) -> &PathBuf {
        &self.0.payroll_path
    }

    pub fn clients_path(&self) -> &PathBuf {
        &self.0.clients_path
    }

    pub fn client_filter_path(&self) -> Option<&PathBuf> {
        self.0.client_filter_path.as_ref()
    }

    pub fn top_count(&self) -> usize {
        self.0.top_count
    }

    pub fn rust_log(&self) -> &str {
        &self.0.rust_log
    }

    /// Reads `.env` when present, then the process environment.
    pub fn load() -> Result<Env, Error> {
        if let Err(err) = dotenv() {
            info!("No .env file loaded: {}", err);
        }
        Env::from_lookup(|key| var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Env, Error> {
        let path = |key: &str, default: &str| PathBuf::from(lookup(key).unwrap_or_else(|| default.to_owned()));

        let top_count = match lookup("REPORT_TOP_COUNT") {
            Some(value) => value
                .trim()
                .parse::<usize>()
                .with_context(|| format!("REPORT_TOP_COUNT is not a number: {:?}", value))?,
            None => DEFAULT_TOP_COUNT,
        };
        if top_count == 0 {
            return Err(eyre!("REPORT_TOP_COUNT must be positive"));
        }

        Ok(Env(Arc::new(EnvInner {
            sessions_path: path("SESSIONS_PATH", DEFAULT_SESSIONS_PATH),
            payroll_path: path("PAYROLL_PATH", DEFAULT_PAYROLL_PATH),
            clients_path: path("CLIENTS_PATH", DEFAULT_CLIENTS_PATH),
            client_filter_path: lookup("CLIENT_FILTER_PATH").map(PathBuf::from),
            top_count,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_RUST_LOG.to_owned()),
        })))
    }
}
