//! CLI subcommands

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::{Subcommand, ValueEnum};

use atelier_client::ApiClient;
use atelier_client::types::{
    AuditQuery, ChangePasswordRequest, RegisterRequest, SystemSettingsUpdate, UserCreate,
    UserUpdate,
};
use atelier_core::types::{User, UserRole};

use crate::config::{CliConfig, save_config};

/// Role argument accepted on the command line
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RoleArg {
    Guest,
    User,
    Manager,
    Admin,
    SuperAdmin,
}

impl From<RoleArg> for UserRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Guest => Self::Guest,
            RoleArg::User => Self::User,
            RoleArg::Manager => Self::Manager,
            RoleArg::Admin => Self::Admin,
            RoleArg::SuperAdmin => Self::SuperAdmin,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in with email and password
    Login {
        email: String,
        /// Password; prompted for when omitted
        #[arg(long)]
        password: Option<String>,
        /// Request a long-lived refresh token
        #[arg(long)]
        remember: bool,
    },
    /// Log out and clear stored credentials
    Logout,
    /// Show the logged-in account
    Whoami,
    /// Register a new account
    Register {
        email: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
    },
    /// Change the logged-in account's password
    ChangePassword,
    /// Manage accounts
    #[command(subcommand)]
    User(UserCommand),
    /// Inspect and edit system settings
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Browse the audit log
    #[command(subcommand)]
    Audit(AuditCommand),
    /// Manage passkeys for the logged-in account
    #[command(subcommand)]
    Passkey(PasskeyCommand),
    /// Manage active sessions
    #[command(subcommand)]
    Session(SessionCommand),
    /// CLI configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
pub enum UserCommand {
    /// List accounts
    List {
        #[arg(long)]
        page: Option<u32>,
    },
    /// Show one account
    Get { id: i64 },
    /// Create an account
    Create {
        email: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long, value_enum, default_value = "user")]
        role: RoleArg,
    },
    /// Update an account
    Update {
        id: i64,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long, value_enum)]
        role: Option<RoleArg>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Soft-delete an account
    Deactivate { id: i64 },
    /// Restore a soft-deleted account
    Restore { id: i64 },
    /// Permanently delete an account
    Delete {
        id: i64,
        /// Required; hard deletion cannot be undone
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Print the current system settings
    Show,
    /// Update system settings fields
    Set {
        #[arg(long)]
        company_name: Option<String>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        qr_base_url: Option<String>,
        #[arg(long)]
        print_agent_url: Option<String>,
        #[arg(long)]
        registration_enabled: Option<bool>,
        #[arg(long)]
        require_email_verification: Option<bool>,
        #[arg(long)]
        password_reset_expiry_hours: Option<u32>,
        #[arg(long)]
        loss_factor_oil_percent: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AuditCommand {
    /// List audit entries, newest first
    List {
        #[arg(long)]
        page: Option<u32>,
        /// Exact action code, e.g. USER_UPDATE
        #[arg(long)]
        action: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum PasskeyCommand {
    /// List registered passkeys
    List,
    /// Delete a passkey
    Remove { id: i64 },
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// List active sessions
    List,
    /// Revoke one session
    Revoke { session_id: String },
    /// End every session, including this one
    LogoutAll,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Persist the API base URL
    SetUrl { url: String },
}

impl Commands {
    pub async fn execute(
        self,
        client: &ApiClient,
        config: &CliConfig,
        data_dir: &Path,
    ) -> Result<()> {
        match self {
            Self::Login {
                email,
                password,
                remember,
            } => {
                let password = match password {
                    Some(p) => p,
                    None => prompt("Password: ")?,
                };
                let response = client.login(&email, &password, remember).await?;
                println!(
                    "Logged in as {} ({:?})",
                    response.user.display_name(),
                    response.user.role
                );
            }
            Self::Logout => {
                client.logout().await?;
                println!("Logged out");
            }
            Self::Whoami => {
                if client.stored_session()?.is_none() {
                    bail!("not logged in; run `atelier login <email>`");
                }
                let user = client.me().await?;
                print_user(&user);
            }
            Self::Register {
                email,
                first_name,
                last_name,
            } => {
                let password = prompt("Password: ")?;
                let confirm = prompt("Confirm password: ")?;
                let status = client
                    .register(RegisterRequest {
                        email,
                        first_name,
                        last_name,
                        password,
                        password_confirm: confirm,
                    })
                    .await?;
                println!("{}", status.message.or(status.status).unwrap_or_default());
            }
            Self::ChangePassword => {
                let current_password = prompt("Current password: ")?;
                let new_password = prompt("New password: ")?;
                let new_password_confirm = prompt("Confirm new password: ")?;
                client
                    .change_password(ChangePasswordRequest {
                        current_password,
                        new_password,
                        new_password_confirm,
                    })
                    .await?;
                println!("Password changed");
            }
            Self::User(command) => execute_user(command, client).await?,
            Self::Settings(command) => execute_settings(command, client).await?,
            Self::Audit(command) => execute_audit(command, client).await?,
            Self::Passkey(command) => execute_passkey(command, client).await?,
            Self::Session(command) => execute_session(command, client).await?,
            Self::Config(command) => execute_config(command, config, data_dir)?,
        }
        Ok(())
    }
}

async fn execute_user(command: UserCommand, client: &ApiClient) -> Result<()> {
    match command {
        UserCommand::List { page } => {
            let users = client.users(page).await?;
            println!("{} account(s)", users.count);
            for user in &users.results {
                println!(
                    "{:>5}  {:<30} {:<12} {}",
                    user.id,
                    user.email,
                    format!("{:?}", user.role),
                    if user.is_active { "active" } else { "inactive" }
                );
            }
            if users.has_next() {
                println!("(more pages available)");
            }
        }
        UserCommand::Get { id } => {
            let user = client.user(id).await?;
            print_user(&user);
        }
        UserCommand::Create {
            email,
            first_name,
            last_name,
            role,
        } => {
            let password = prompt("Initial password: ")?;
            let user = client
                .create_user(UserCreate {
                    email,
                    first_name,
                    last_name,
                    role: role.into(),
                    password,
                    is_active: true,
                })
                .await?;
            println!("Created account {} ({})", user.id, user.email);
        }
        UserCommand::Update {
            id,
            email,
            first_name,
            last_name,
            role,
            active,
        } => {
            let user = client
                .update_user(
                    id,
                    UserUpdate {
                        email,
                        first_name,
                        last_name,
                        role: role.map(Into::into),
                        is_active: active,
                        ..Default::default()
                    },
                )
                .await?;
            print_user(&user);
        }
        UserCommand::Deactivate { id } => {
            client.soft_delete_user(id).await?;
            println!("Account {id} deactivated");
        }
        UserCommand::Restore { id } => {
            client.restore_user(id).await?;
            println!("Account {id} restored");
        }
        UserCommand::Delete { id, yes } => {
            if !yes {
                bail!("hard deletion is permanent; pass --yes to confirm");
            }
            client.hard_delete_user(id).await?;
            println!("Account {id} permanently deleted");
        }
    }
    Ok(())
}

async fn execute_settings(command: SettingsCommand, client: &ApiClient) -> Result<()> {
    match command {
        SettingsCommand::Show => {
            let settings = client.system_settings().await?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SettingsCommand::Set {
            company_name,
            currency,
            qr_base_url,
            print_agent_url,
            registration_enabled,
            require_email_verification,
            password_reset_expiry_hours,
            loss_factor_oil_percent,
        } => {
            let update = SystemSettingsUpdate {
                company_name,
                currency,
                qr_base_url,
                print_agent_url,
                registration_enabled,
                require_email_verification,
                password_reset_token_expiry_hours: password_reset_expiry_hours,
                default_loss_factor_oil_percent: loss_factor_oil_percent,
                ..Default::default()
            };
            let settings = client.update_system_settings(update).await?;
            println!("Settings updated ({})", settings.updated_at);
        }
    }
    Ok(())
}

async fn execute_audit(command: AuditCommand, client: &ApiClient) -> Result<()> {
    match command {
        AuditCommand::List {
            page,
            action,
            search,
        } => {
            let entries = client
                .audit_logs(AuditQuery {
                    page,
                    action,
                    search,
                })
                .await?;
            println!("{} entr(ies)", entries.count);
            for entry in &entries.results {
                let actor = entry
                    .actor
                    .as_ref()
                    .map_or("system".to_string(), |a| a.email.clone());
                println!(
                    "{}  {:<22} {:<28} {}",
                    entry.created_at.format("%Y-%m-%d %H:%M:%S"),
                    entry.action,
                    actor,
                    entry.description.as_deref().unwrap_or("")
                );
            }
        }
    }
    Ok(())
}

async fn execute_passkey(command: PasskeyCommand, client: &ApiClient) -> Result<()> {
    match command {
        PasskeyCommand::List => {
            let passkeys = client.passkeys().await?;
            println!("{} passkey(s)", passkeys.count);
            for key in &passkeys.results {
                println!(
                    "{:>5}  {:<44} registered {}",
                    key.id,
                    key.credential_id,
                    key.created_at.format("%Y-%m-%d")
                );
            }
        }
        PasskeyCommand::Remove { id } => {
            client.delete_passkey(id).await?;
            println!("Passkey {id} removed");
        }
    }
    Ok(())
}

async fn execute_session(command: SessionCommand, client: &ApiClient) -> Result<()> {
    match command {
        SessionCommand::List => {
            let response = client.sessions().await?;
            println!("{} session(s)", response.total_count);
            for session in &response.sessions {
                println!(
                    "{}  {:<20} {:<16} expires {}{}",
                    session.id,
                    session.device_name.as_deref().unwrap_or("unknown device"),
                    session.ip_address.as_deref().unwrap_or("-"),
                    session.expires_at.format("%Y-%m-%d"),
                    if session.is_current { "  (current)" } else { "" }
                );
            }
        }
        SessionCommand::Revoke { session_id } => {
            client.revoke_session(session_id).await?;
            println!("Session revoked");
        }
        SessionCommand::LogoutAll => {
            client.logout_all().await?;
            println!("All sessions ended");
        }
    }
    Ok(())
}

fn execute_config(command: ConfigCommand, config: &CliConfig, data_dir: &Path) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            println!("base_url: {}", config.base_url);
            println!("data_dir: {}", data_dir.display());
        }
        ConfigCommand::SetUrl { url } => {
            let updated = CliConfig { base_url: url };
            save_config(&updated, data_dir)?;
            println!("base_url set to {}", updated.base_url);
        }
    }
    Ok(())
}

fn print_user(user: &User) {
    println!("id:        {}", user.id);
    println!("email:     {}", user.email);
    println!("name:      {}", user.display_name());
    println!("role:      {:?}", user.role);
    println!("active:    {}", user.is_active);
    println!("verified:  {}", user.email_verified);
    if let Some(last_login) = user.last_login {
        println!("last seen: {}", last_login.format("%Y-%m-%d %H:%M:%S"));
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("failed to read input")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
