//! Apply one user edit to a JSON user store.
//!
//! The store is read, the edit runs through the same service an inbound
//! adapter would call, and the store is written back only after the edit
//! committed. Change log entries and verification requests are emitted as
//! JSON tracing events.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use accounts::config::AccountSettings;
use accounts::domain::ports::UserRepository;
use accounts::domain::{
    ArgumentKey, EditUserRequest, JobArguments, Principal, User, UserEditService, UserId,
    UserJobPorts,
};
use accounts::outbound::change_log::TracingChangeLog;
use accounts::outbound::notification::TracingVerificationSender;
use accounts::outbound::persistence::InMemoryUserRepository;
use cap_std::{ambient_authority, fs::Dir};
use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
use zeroize::Zeroizing;

/// `edit-user` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "edit-user",
    about = "Edit the rank, name, password or email of a stored user",
    version
)]
struct CliArgs {
    /// Path to the JSON user store.
    #[arg(long, value_name = "path")]
    store: PathBuf,
    /// Identifier of the acting user. Anonymous when omitted.
    #[arg(long, value_name = "uuid")]
    actor: Option<String>,
    /// Identifier of the user to edit.
    #[arg(long, value_name = "uuid")]
    target: String,
    /// New access rank.
    #[arg(long, value_name = "rank")]
    rank: Option<String>,
    /// New user name.
    #[arg(long, value_name = "name")]
    name: Option<String>,
    /// New password.
    #[arg(long, value_name = "password")]
    password: Option<String>,
    /// New email address.
    #[arg(long, value_name = "email")]
    email: Option<String>,
    /// Only report whether the actor may edit anything about the target.
    #[arg(long)]
    check_only: bool,
}

impl CliArgs {
    fn arguments(&mut self) -> JobArguments {
        let mut arguments = JobArguments::new();
        let supplied = [
            (ArgumentKey::NewAccessRank, self.rank.take()),
            (ArgumentKey::NewName, self.name.take()),
            (ArgumentKey::NewPassword, self.password.take()),
            (ArgumentKey::NewEmail, self.email.take()),
        ];
        for (key, value) in supplied {
            if let Some(value) = value.map(Zeroizing::new) {
                arguments.insert(key, value.as_str());
            }
        }
        arguments
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    run(CliArgs::parse())
}

fn run(mut args: CliArgs) -> Result<()> {
    let settings = AccountSettings::load_from_iter([OsString::from("edit-user")])
        .map_err(|error| eyre!("failed to load account settings: {error}"))?;
    let rules = settings.edit_rules()?;
    let policy = settings.rank_policy()?;

    let store = StoreFile::open(&args.store)?;
    let users = Arc::new(InMemoryUserRepository::from_json(&store.read()?)?);
    let principal = resolve_principal(&users, args.actor.as_deref())?;
    let target = UserId::new(&args.target).wrap_err("invalid --target")?;

    let ports = UserJobPorts::new(
        users.clone(),
        Arc::new(TracingChangeLog),
        Arc::new(TracingVerificationSender),
        Arc::new(rules),
    );
    let service = UserEditService::new(ports, Arc::new(policy));

    if args.check_only {
        let allowed = service.can_edit_anything(&principal, &target)?;
        println!("can_edit_anything={allowed}");
        return Ok(());
    }

    let request = EditUserRequest::new(principal, target, args.arguments());
    let user = service.edit_user(request)?;
    store.write(&users.to_json()?)?;
    print_user(&user);
    Ok(())
}

fn resolve_principal(users: &InMemoryUserRepository, actor: Option<&str>) -> Result<Principal> {
    let Some(actor) = actor else {
        return Ok(Principal::anonymous());
    };
    let id = UserId::new(actor).wrap_err("invalid --actor")?;
    let user = users
        .find_by_id(&id)?
        .ok_or_else(|| eyre!("actor {id} not found in store"))?;
    Ok(Principal::for_user(&user))
}

fn print_user(user: &User) {
    println!("id={}", user.id());
    println!("name={}", user.name());
    println!("rank={}", user.rank());
    if let Some(email) = user.email() {
        println!("email={email}");
    }
    if let Some(pending) = user.pending_email() {
        println!("pending_email={pending}");
    }
}

/// Store file opened through its parent directory capability.
struct StoreFile {
    directory: Dir,
    file_name: PathBuf,
    display: String,
}

impl StoreFile {
    fn open(path: &Path) -> Result<Self> {
        let parent = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file_name = path
            .file_name()
            .ok_or_else(|| eyre!("store path must name a file"))?;
        let directory = Dir::open_ambient_dir(parent, ambient_authority())
            .wrap_err_with(|| format!("open store directory '{}'", parent.display()))?;
        Ok(Self {
            directory,
            file_name: PathBuf::from(file_name),
            display: path.display().to_string(),
        })
    }

    fn read(&self) -> Result<String> {
        self.directory
            .read_to_string(&self.file_name)
            .wrap_err_with(|| format!("read store '{}'", self.display))
    }

    fn write(&self, contents: &str) -> Result<()> {
        self.directory
            .write(&self.file_name, contents)
            .wrap_err_with(|| format!("write store '{}'", self.display))
    }
}
