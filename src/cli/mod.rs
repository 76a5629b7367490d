//! CLI module for the parish platform client.
//!
//! Every subcommand drives the same [`ViewController`] a graphical front-end
//! would use, then prints the resulting screen state:
//! - `info`, `services`, `pastorals`, `mass-times` - public pages
//! - `register`, `login`, `logout`, `whoami` - session management
//! - `enroll`, `registrations`, `contribute`, `contributions` - member area
//! - `admin ...` - dashboard, registration approval and user editing

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::client::ApiClient;
use crate::config::Config;
use crate::models::{
    Amount, Contribution, MassTime, PaymentMethod, RegisterRequest, Registration,
    RegistrationStatus, UserUpdate,
};
use crate::session::{FileStorage, SessionStore};
use crate::view::{Loadable, NotificationKind, Page, ViewController};

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "paroquia")]
#[command(author, version, about = "Client for the Paróquia Santo Antônio platform", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "paroquia.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Backend URL (overrides `api.base_url`)
    #[arg(long, env = "PAROQUIA_API_URL")]
    pub api_url: Option<String>,

    /// Session file (overrides `session.path`)
    #[arg(long, env = "PAROQUIA_SESSION_FILE")]
    pub session_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show parish information, services and pastoral groups
    Info,

    /// List services open for enrollment
    Services,

    /// List pastoral groups
    Pastorals,

    /// Show the mass schedule
    MassTimes,

    /// Create an account and log in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "PAROQUIA_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        address: Option<String>,
        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        dob: Option<NaiveDate>,
        #[arg(long)]
        gender: Option<String>,
    },

    /// Log in and save the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "PAROQUIA_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the saved session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Enroll in a service
    Enroll {
        /// Service ID
        service_id: u64,
    },

    /// List your registrations
    Registrations,

    /// Record a contribution intent
    Contribute {
        /// Amount in reais, e.g. `50` or `50,00`
        value: Amount,
        /// pix, card or boleto
        #[arg(short, long, default_value = "pix")]
        method: PaymentMethod,
    },

    /// List your contributions
    Contributions,

    /// Administration commands
    #[command(subcommand)]
    Admin(AdminCommands),
}

/// Admin subcommands
#[derive(Subcommand, Debug)]
pub enum AdminCommands {
    /// Show dashboard counters
    Stats,
    /// List all registrations
    Registrations,
    /// Confirm a pending registration
    Approve { id: u64 },
    /// Decline a pending registration
    Decline { id: u64 },
    /// List all users
    Users,
    /// Edit a user's profile; omitted fields keep their current value
    EditUser {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        address: Option<String>,
        /// Grant or revoke admin rights
        #[arg(long)]
        admin: Option<bool>,
    },
}

/// Build the controller from configuration
fn create_controller(config: &Config) -> Result<ViewController> {
    let storage = Arc::new(FileStorage::new(&config.session.path));
    let session = Arc::new(SessionStore::open(storage));
    let client = ApiClient::new(&config.api, session).context("Failed to create HTTP client")?;
    Ok(ViewController::new(client, &config.contribution.pix_key))
}

/// Run a CLI command
pub async fn run_command(cli: &Cli, config: &Config) -> Result<()> {
    let mut ctrl = create_controller(config)?;

    match &cli.command {
        Commands::Info => cmd_info(&mut ctrl).await?,
        Commands::Services => cmd_services(&mut ctrl).await?,
        Commands::Pastorals => cmd_pastorals(&mut ctrl).await?,
        Commands::MassTimes => cmd_mass_times(&mut ctrl).await?,
        Commands::Register {
            name,
            email,
            password,
            address,
            dob,
            gender,
        } => {
            let request = RegisterRequest {
                name: name.clone(),
                email: email.clone(),
                password: password.clone(),
                address: address.clone(),
                dob: *dob,
                gender: gender.clone(),
            };
            ctrl.register(request).await;
        }
        Commands::Login { email, password } => ctrl.login(email, password).await,
        Commands::Logout => ctrl.logout(),
        Commands::Whoami => cmd_whoami(&ctrl),
        Commands::Enroll { service_id } => ctrl.enroll(*service_id).await,
        Commands::Registrations => cmd_registrations(&mut ctrl).await?,
        Commands::Contribute { value, method } => cmd_contribute(&mut ctrl, *value, *method).await?,
        Commands::Contributions => cmd_contributions(&mut ctrl).await?,
        Commands::Admin(command) => cmd_admin(&mut ctrl, command).await?,
    }

    finish(&mut ctrl)
}

/// Print the pending notification; an error notification fails the command
fn finish(ctrl: &mut ViewController) -> Result<()> {
    let prompt = ctrl.auth_prompt_open();
    match ctrl.take_notification() {
        Some(note) if note.kind == NotificationKind::Error => {
            if prompt {
                anyhow::bail!("{} Run `paroquia login` first.", note.message);
            }
            anyhow::bail!("{}", note.message);
        }
        Some(note) => {
            println!("[OK] {}", note.message);
            Ok(())
        }
        None => Ok(()),
    }
}

/// Show a section that failed to load without hiding the others
fn print_unavailable<T>(label: &str, state: &Loadable<T>) {
    if let Some(message) = state.error() {
        println!("{}: unavailable ({})", label, message);
    }
}

async fn cmd_info(ctrl: &mut ViewController) -> Result<()> {
    ctrl.navigate(Page::Home).await;

    if let Some(info) = ctrl.parish_info().data() {
        println!();
        println!("=== {} ===", info.name);
        if !info.history.is_empty() {
            println!();
            println!("{}", info.history);
        }
        if let Some(hours) = &info.secretariat_hours {
            println!();
            println!("Secretariat:  {}", hours);
        }
        if let Some(hours) = &info.priest_hours {
            println!("Priest:       {}", hours);
        }
        if let Some(url) = &info.liturgical_calendar_url {
            println!("Calendar:     {}", url);
        }
        if !info.mass_times.is_empty() {
            println!();
            println!("Mass times:");
            print_mass_times(&info.mass_times);
        }
    }
    print_unavailable("Parish info", ctrl.parish_info());

    if let Some(services) = ctrl.services().data() {
        println!();
        println!("Services:");
        for service in services {
            println!("  [{}] {}", service.id, service.name);
        }
    }

    if let Some(pastorals) = ctrl.pastorals().data() {
        println!();
        println!("Pastorals:");
        for pastoral in pastorals {
            println!("  {}", pastoral.name);
        }
    }

    println!();
    Ok(())
}

async fn cmd_services(ctrl: &mut ViewController) -> Result<()> {
    ctrl.navigate(Page::Services).await;
    let Some(services) = ctrl.services().data() else {
        return Ok(());
    };

    if services.is_empty() {
        println!("No services available.");
        return Ok(());
    }

    println!();
    println!("{:<6}  {:<30}  {:<50}", "ID", "NAME", "DESCRIPTION");
    println!("{}", "-".repeat(90));
    for service in services {
        println!(
            "{:<6}  {:<30}  {:<50}",
            service.id,
            truncate(&service.name, 30),
            truncate(&service.description, 50)
        );
    }
    println!();
    println!("Enroll with: paroquia enroll <ID>");
    Ok(())
}

async fn cmd_pastorals(ctrl: &mut ViewController) -> Result<()> {
    ctrl.navigate(Page::Pastorals).await;
    let Some(pastorals) = ctrl.pastorals().data() else {
        return Ok(());
    };

    if pastorals.is_empty() {
        println!("No pastoral groups found.");
        return Ok(());
    }

    for pastoral in pastorals {
        println!();
        println!("{}", pastoral.name);
        if !pastoral.description.is_empty() {
            println!("  {}", pastoral.description);
        }
        if !pastoral.meeting_info.is_empty() {
            println!("  Meetings: {}", pastoral.meeting_info);
        }
    }
    println!();
    Ok(())
}

async fn cmd_mass_times(ctrl: &mut ViewController) -> Result<()> {
    ctrl.navigate(Page::MassTimes).await;
    if let Some(times) = ctrl.mass_times().data() {
        if times.is_empty() {
            println!("No mass times published.");
        } else {
            print_mass_times(times);
        }
    }
    Ok(())
}

fn print_mass_times(times: &[MassTime]) {
    for mass in times {
        let location = if mass.location.is_empty() {
            "-"
        } else {
            mass.location.as_str()
        };
        println!("  {:<14} {:<8} {}", mass.day, mass.time, location);
    }
}

fn cmd_whoami(ctrl: &ViewController) {
    match ctrl.session() {
        Some(session) => {
            println!("Name:   {}", session.user.name);
            println!("Email:  {}", session.user.email);
            println!("Role:   {}", session.role());
        }
        None => println!("Not logged in."),
    }
}

async fn cmd_registrations(ctrl: &mut ViewController) -> Result<()> {
    ctrl.navigate(Page::MyArea).await;
    if let Some(list) = ctrl.my_registrations().data() {
        print_registrations(list, false);
    }
    Ok(())
}

async fn cmd_contribute(ctrl: &mut ViewController, value: Amount, method: PaymentMethod) -> Result<()> {
    ctrl.contribute(value, method).await;

    if let Some(receipt) = ctrl.receipt() {
        println!();
        println!("Amount:  {}", receipt.value);
        println!("Method:  {}", receipt.method);
        if let Some(key) = &receipt.pix_key {
            println!("PIX key: {}", key);
        }
        println!();
    }
    Ok(())
}

async fn cmd_contributions(ctrl: &mut ViewController) -> Result<()> {
    ctrl.navigate(Page::Contribute).await;
    if let Some(list) = ctrl.my_contributions().data() {
        print_contributions(list);
    }
    Ok(())
}

async fn cmd_admin(ctrl: &mut ViewController, command: &AdminCommands) -> Result<()> {
    ctrl.navigate(Page::Admin).await;
    if ctrl.page() != Page::Admin {
        return Ok(());
    }

    match command {
        AdminCommands::Stats => {
            print_unavailable("Stats", ctrl.stats());
            if let Some(stats) = ctrl.stats().data() {
                println!();
                println!("=== Dashboard ===");
                println!();
                println!("Users:          {}", stats.total_users);
                println!(
                    "Registrations:  {} ({} pending)",
                    stats.total_registrations, stats.pending_registrations
                );
                println!(
                    "Contributions:  {} totalling {}",
                    stats.total_contributions, stats.contributions_total
                );
                println!();
            }
        }
        AdminCommands::Registrations => {
            if let Some(list) = ctrl.admin_registrations().data() {
                print_registrations(list, true);
            }
        }
        AdminCommands::Approve { id } => {
            ctrl.set_registration_status(*id, RegistrationStatus::Confirmed)
                .await
        }
        AdminCommands::Decline { id } => {
            ctrl.set_registration_status(*id, RegistrationStatus::Declined)
                .await
        }
        AdminCommands::Users => {
            if let Some(users) = ctrl.admin_users().data() {
                println!();
                println!("{:<6}  {:<28}  {:<34}  {:<6}", "ID", "NAME", "EMAIL", "ROLE");
                println!("{}", "-".repeat(80));
                for user in users {
                    println!(
                        "{:<6}  {:<28}  {:<34}  {:<6}",
                        user.id,
                        truncate(&user.name, 28),
                        truncate(&user.email, 34),
                        user.role()
                    );
                }
                println!();
            }
        }
        AdminCommands::EditUser {
            id,
            name,
            email,
            address,
            admin,
        } => {
            if let Some(message) = ctrl.admin_users().error() {
                anyhow::bail!("Could not load users: {}", message);
            }
            let current = ctrl
                .admin_users()
                .data()
                .and_then(|users| users.iter().find(|u| u.id == *id))
                .with_context(|| format!("User not found: {}", id))?;

            let mut update = UserUpdate::from(current);
            if let Some(name) = name {
                update.name = name.clone();
            }
            if let Some(email) = email {
                update.email = email.clone();
            }
            if let Some(address) = address {
                update.address = Some(address.clone());
            }
            if let Some(admin) = admin {
                update.is_admin = *admin;
            }
            ctrl.edit_user(*id, update).await;
        }
    }
    Ok(())
}

fn print_registrations(list: &[Registration], with_user: bool) {
    if list.is_empty() {
        println!("No registrations found.");
        return;
    }

    println!();
    if with_user {
        println!(
            "{:<6}  {:<24}  {:<24}  {:<10}  {:<10}",
            "ID", "USER", "SERVICE", "STATUS", "DATE"
        );
    } else {
        println!("{:<6}  {:<24}  {:<10}  {:<10}", "ID", "SERVICE", "STATUS", "DATE");
    }
    println!("{}", "-".repeat(if with_user { 84 } else { 58 }));

    for reg in list {
        let date = reg
            .created_at
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| "-".to_string());
        if with_user {
            let user = reg.user.as_ref().map(|u| u.name.as_str()).unwrap_or("-");
            println!(
                "{:<6}  {:<24}  {:<24}  {:<10}  {:<10}",
                reg.id,
                truncate(user, 24),
                truncate(&reg.service.name, 24),
                reg.status.to_string(),
                date
            );
        } else {
            println!(
                "{:<6}  {:<24}  {:<10}  {:<10}",
                reg.id,
                truncate(&reg.service.name, 24),
                reg.status.to_string(),
                date
            );
        }
    }
    println!();
}

fn print_contributions(list: &[Contribution]) {
    if list.is_empty() {
        println!("No contributions yet.");
        return;
    }

    println!();
    println!("{:<6}  {:>14}  {:<8}  {:<10}  {:<10}", "ID", "VALUE", "METHOD", "STATUS", "DATE");
    println!("{}", "-".repeat(56));
    for c in list {
        let date = c
            .created_at
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<6}  {:>14}  {:<8}  {:<10}  {:<10}",
            c.id,
            c.value.to_string(),
            c.method.to_string(),
            format!("{:?}", c.status),
            date
        );
    }
    println!();
}

/// Truncate a string to max length with ellipsis
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate("Crisma", 10), "Crisma");
        assert_eq!(truncate("Pastoral da Criança", 12), "Pastoral ...");
        assert_eq!(truncate("Catequese de Adultos", 8), "Cateq...");
    }

    #[test]
    fn test_parses_contribute_arguments() {
        let cli = Cli::try_parse_from(["paroquia", "contribute", "50,00", "--method", "boleto"]).unwrap();
        match cli.command {
            Commands::Contribute { value, method } => {
                assert_eq!(value.cents(), 5000);
                assert_eq!(method, PaymentMethod::Boleto);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_payment_method() {
        assert!(Cli::try_parse_from(["paroquia", "contribute", "10", "--method", "cash"]).is_err());
    }

    #[tokio::test]
    async fn test_edit_user_surfaces_user_list_failure() {
        use crate::models::UserProfile;
        use crate::session::Session;
        use crate::testing::{reply_get, MockBackend};
        use axum::http::StatusCode;
        use axum::Router;
        use serde_json::json;

        let backend = MockBackend::start(
            Router::new()
                .route("/api/admin/dashboard-stats", reply_get(StatusCode::OK, json!({})))
                .route("/api/admin/registrations", reply_get(StatusCode::OK, json!([])))
                .route(
                    "/api/admin/users",
                    reply_get(StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "db down"})),
                ),
        )
        .await;
        let admin = UserProfile {
            id: 1,
            name: "Frei Carlos".to_string(),
            email: "frei@example.com".to_string(),
            is_admin: true,
            address: None,
            date_of_birth: None,
            gender: None,
        };
        backend.session().set(Session::new("tok", admin));
        let mut ctrl = ViewController::new(backend.client(), "pix");

        let command = AdminCommands::EditUser {
            id: 4,
            name: Some("Teresa".to_string()),
            email: None,
            address: None,
            admin: None,
        };
        let err = cmd_admin(&mut ctrl, &command).await.unwrap_err();

        assert!(err.to_string().contains("db down"));
        assert_eq!(backend.count("PUT", "/api/admin/users/4"), 0);
    }

    #[test]
    fn test_parses_admin_edit_user() {
        let cli = Cli::try_parse_from(["paroquia", "admin", "edit-user", "4", "--admin", "true"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Admin(AdminCommands::EditUser { id: 4, admin: Some(true), .. })
        ));
    }
}
