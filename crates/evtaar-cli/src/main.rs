//! EvtaarPro CLI - a command-line front-end for the EvtaarPro admin platform.
//!
//! Each invocation restores the persisted session, runs one command through
//! the session container, and prints whatever notices the command raised.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use evtaar_core::models::{
    AttendanceQuery, AttendanceStatus, CreateInteractionRequest, CreateMeetingRequest,
    CustomerQuery, EmployeeQuery, MarkAttendanceRequest, MeetingQuery, NotificationQuery, Page,
    Pagination, PayrollQuery, RegisterRequest, UpdateProfileRequest, UserQuery,
};
use evtaar_core::{
    ApiClient, Config, CredentialStore, Notice, NoticeLevel, SessionContainer, StorageBackend,
};

// ============================================================================
// Constants
// ============================================================================

/// Overrides `base_url` from the config file
const API_URL_ENV: &str = "EVTAAR_API_URL";

/// Overrides `storage` from the config file
const STORAGE_ENV: &str = "EVTAAR_STORAGE";

/// How long to wait for a 401 seen by the command to reach the session
const SETTLE_TIMEOUT_MS: u64 = 500;

// ============================================================================
// Command line
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "evtaar", version, about = "EvtaarPro admin platform client")]
struct Cli {
    /// Print raw JSON instead of formatted output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and persist the session
    Login {
        /// Defaults to the last email used
        email: Option<String>,
    },
    /// End the session and forget the saved login
    Logout,
    /// Create an account (log in afterwards)
    Register {
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        role: Option<String>,
    },
    /// Show the logged-in user
    Whoami,
    /// Update your profile
    Profile {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        department: Option<String>,
    },
    /// Upcoming meetings and unread notifications at a glance
    Dashboard,
    #[command(subcommand)]
    Users(UsersCommand),
    #[command(subcommand)]
    Meetings(MeetingsCommand),
    #[command(subcommand)]
    Payroll(PayrollCommand),
    #[command(subcommand)]
    Crm(CrmCommand),
    #[command(subcommand)]
    Notifications(NotificationsCommand),
}

#[derive(Subcommand, Debug)]
enum UsersCommand {
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        page: Option<u32>,
    },
    Show {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
enum MeetingsCommand {
    List {
        #[arg(long)]
        page: Option<u32>,
    },
    Show {
        id: String,
    },
    Create {
        title: String,
        /// RFC 3339 start time, e.g. 2024-03-01T10:00:00Z
        #[arg(long)]
        start: DateTime<Utc>,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        max_participants: Option<u32>,
    },
    /// Print the room link for a meeting
    Join {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
enum PayrollCommand {
    Employees {
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        page: Option<u32>,
    },
    Attendance {
        #[arg(long)]
        employee: Option<String>,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Record attendance for one day
    Mark {
        employee: String,
        date: NaiveDate,
        /// present, absent, halfday, leave or holiday
        status: AttendanceStatus,
        #[arg(long, default_value = "")]
        notes: String,
    },
    Records {
        #[arg(long)]
        employee: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    Approve {
        id: String,
    },
    Pay {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
enum CrmCommand {
    Customers {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        page: Option<u32>,
    },
    Show {
        id: String,
    },
    Interactions {
        customer_id: String,
    },
    /// Log an interaction with a customer
    Log {
        customer_id: String,
        /// call, email, meeting, note...
        #[arg(long = "type")]
        kind: String,
        #[arg(long)]
        subject: String,
        #[arg(long, default_value = "")]
        description: String,
    },
}

#[derive(Subcommand, Debug)]
enum NotificationsCommand {
    List {
        #[arg(long)]
        unread: bool,
    },
    /// Number of unread notifications
    Count,
    Read {
        id: String,
    },
    ReadAll,
    Delete {
        id: String,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    let cli = Cli::parse();

    let config = load_config()?;
    let store = config.open_store().context("Failed to open session storage")?;
    let api = ApiClient::from_config(&config, CredentialStore::new(store))?;
    debug!(base_url = api.base_url(), storage = ?config.storage, "Client configured");

    let session = SessionContainer::start(api).await;
    let mut notices = session.notices();

    let result = run(&cli, &session, &config).await;
    if !session.settle(Duration::from_millis(SETTLE_TIMEOUT_MS)).await {
        debug!("Session did not settle before exit");
    }
    print_notices(&mut notices);
    result
}

/// Config file plus environment overrides
fn load_config() -> Result<Config> {
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        Config::default()
    });
    if let Ok(url) = std::env::var(API_URL_ENV) {
        config.base_url = Some(url);
    }
    if let Ok(storage) = std::env::var(STORAGE_ENV) {
        config.storage = storage
            .parse::<StorageBackend>()
            .with_context(|| format!("Invalid {}", STORAGE_ENV))?;
    }
    Ok(config)
}

async fn run(cli: &Cli, session: &SessionContainer, config: &Config) -> Result<()> {
    match &cli.command {
        Command::Login { email } => login(session, config, email.clone()).await,
        Command::Logout => ensure(session.logout().await),
        Command::Register {
            email,
            first_name,
            last_name,
            role,
        } => {
            let password = rpassword::prompt_password("Password: ")?;
            let request = RegisterRequest {
                email: email.clone(),
                password,
                first_name: first_name.clone(),
                last_name: last_name.clone(),
                role: role.clone(),
            };
            ensure(session.register(&request).await)
        }
        command => {
            require_session(session)?;
            run_authenticated(cli.json, command, session).await
        }
    }
}

async fn login(session: &SessionContainer, config: &Config, email: Option<String>) -> Result<()> {
    let email = match email.or_else(|| config.last_email.clone()) {
        Some(email) => email,
        None => prompt("Email: ")?,
    };
    let password = rpassword::prompt_password(format!("Password for {}: ", email))?;

    ensure(session.login(&email, &password).await)?;

    remember_email(email);
    if let Some(user) = session.current_user() {
        println!("Logged in as {} <{}>", user.display_name(), user.email);
    }
    Ok(())
}

async fn run_authenticated(json: bool, command: &Command, session: &SessionContainer) -> Result<()> {
    let api = session.api();
    match command {
        Command::Whoami => {
            let user = session
                .current_user()
                .ok_or_else(|| anyhow!("Not logged in"))?;
            if json {
                return print_json(&user);
            }
            println!("{} ({})", user.display_name(), user.initials());
            println!("  email:      {}", user.email);
            println!("  role:       {}", user.role);
            if let Some(department) = &user.department {
                println!("  department: {}", department);
            }
            if let Some(phone) = &user.phone {
                println!("  phone:      {}", phone);
            }
            Ok(())
        }
        Command::Profile {
            first_name,
            last_name,
            phone,
            department,
        } => {
            let request = UpdateProfileRequest {
                first_name: first_name.clone(),
                last_name: last_name.clone(),
                phone: phone.clone(),
                department: department.clone(),
            };
            if request.is_empty() {
                bail!("Nothing to update. Pass at least one of --first-name, --last-name, --phone, --department");
            }
            ensure(session.update_profile(&request).await)
        }
        Command::Dashboard => {
            let meetings_api = api.meetings();
            let notifications_api = api.notifications();
            let meetings_query = MeetingQuery::default();
            let unread_query = NotificationQuery::unread();
            let (meetings, unread_count, unread) = futures::try_join!(
                meetings_api.list(&meetings_query),
                notifications_api.unread_count(),
                notifications_api.list(&unread_query),
            )?;

            let now = Utc::now();
            let upcoming: Vec<_> = meetings.items.iter().filter(|m| m.is_upcoming(now)).collect();
            println!("Upcoming meetings ({})", upcoming.len());
            for meeting in upcoming {
                println!("  {}  {}", meeting.formatted_start(), meeting.title);
            }
            println!();
            println!("Unread notifications ({})", unread_count);
            for notification in &unread.items {
                println!("  [{}] {}", notification.kind, notification.title);
            }
            Ok(())
        }
        Command::Users(command) => match command {
            UsersCommand::List { search, page } => {
                let query = UserQuery {
                    page: *page,
                    page_size: None,
                    search: search.clone(),
                };
                let users = api.users().list(&query).await?;
                print_page(json, &users, |u| {
                    format!("{:<36}  {:<28}  {:<10}  {}", u.id, u.email, u.role, u.display_name())
                })
            }
            UsersCommand::Show { id } => print_json(&api.users().get(id).await?),
        },
        Command::Meetings(command) => match command {
            MeetingsCommand::List { page } => {
                let query = MeetingQuery {
                    page: *page,
                    page_size: None,
                };
                let meetings = api.meetings().list(&query).await?;
                print_page(json, &meetings, |m| {
                    format!("{:<36}  {}  {:<10}  {}", m.id, m.formatted_start(), m.status(), m.title)
                })
            }
            MeetingsCommand::Show { id } => print_json(&api.meetings().get(id).await?),
            MeetingsCommand::Create {
                title,
                start,
                description,
                max_participants,
            } => {
                let request = CreateMeetingRequest {
                    title: title.clone(),
                    description: description.clone(),
                    start_time: *start,
                    max_participants: *max_participants,
                };
                let meeting = api.meetings().create(&request).await?;
                info!(meeting_id = %meeting.id, "Meeting created");
                println!("Created meeting {} ({})", meeting.title, meeting.id);
                Ok(())
            }
            MeetingsCommand::Join { id } => {
                let join = api.meetings().join(id).await?;
                if json {
                    return print_json(&join);
                }
                println!("{}", join.room_url);
                Ok(())
            }
        },
        Command::Payroll(command) => run_payroll(json, command, api).await,
        Command::Crm(command) => run_crm(json, command, api).await,
        Command::Notifications(command) => match command {
            NotificationsCommand::List { unread } => {
                let query = if *unread {
                    NotificationQuery::unread()
                } else {
                    NotificationQuery::default()
                };
                let notifications = api.notifications().list(&query).await?;
                print_page(json, &notifications, |n| {
                    let marker = if n.read { " " } else { "*" };
                    format!("{} {:<36}  [{}] {}: {}", marker, n.id, n.kind, n.title, n.message)
                })
            }
            NotificationsCommand::Count => {
                println!("{}", api.notifications().unread_count().await?);
                Ok(())
            }
            NotificationsCommand::Read { id } => Ok(api.notifications().mark_read(id).await?),
            NotificationsCommand::ReadAll => Ok(api.notifications().mark_all_read().await?),
            NotificationsCommand::Delete { id } => Ok(api.notifications().delete(id).await?),
        },
        Command::Login { .. } | Command::Logout | Command::Register { .. } => {
            bail!("Command does not run inside a session")
        }
    }
}

async fn run_payroll(json: bool, command: &PayrollCommand, api: &ApiClient) -> Result<()> {
    let payroll = api.payroll();
    match command {
        PayrollCommand::Employees { department, page } => {
            let query = EmployeeQuery {
                department: department.clone(),
                page: *page,
                limit: None,
            };
            let employees = payroll.list_employees(&query).await?;
            print_page(json, &employees, |e| {
                format!(
                    "{:<12}  {:<16}  {:<20}  {:>10.2}",
                    e.employee_code, e.department, e.designation, e.salary_amount
                )
            })
        }
        PayrollCommand::Attendance { employee, from, to } => {
            let query = AttendanceQuery {
                employee_id: employee.clone(),
                start_date: *from,
                end_date: *to,
                ..Default::default()
            };
            let attendance = payroll.list_attendance(&query).await?;
            print_page(json, &attendance, |a| {
                format!(
                    "{}  {:<36}  {:<9}  {:>5.1}h",
                    a.date.format("%Y-%m-%d"),
                    a.employee_id,
                    a.status,
                    a.hours_worked
                )
            })
        }
        PayrollCommand::Mark {
            employee,
            date,
            status,
            notes,
        } => {
            let request = MarkAttendanceRequest {
                employee_id: employee.clone(),
                date: date.and_time(NaiveTime::MIN).and_utc(),
                check_in: None,
                check_out: None,
                status: *status,
                notes: notes.clone(),
            };
            let attendance = payroll.mark_attendance(&request).await?;
            println!("Marked {} as {}", attendance.date.format("%Y-%m-%d"), attendance.status);
            Ok(())
        }
        PayrollCommand::Records { employee, status } => {
            let query = PayrollQuery {
                employee_id: employee.clone(),
                status: status.clone(),
                ..Default::default()
            };
            let records = payroll.list_records(&query).await?;
            print_page(json, &records, |r| {
                format!(
                    "{:<36}  {}  {:<36}  {:>10.2}  {}",
                    r.id, r.period(), r.employee_id, r.net_salary, r.payment_status
                )
            })
        }
        PayrollCommand::Approve { id } => {
            let record = payroll.get_record(id).await?;
            if !record.status().can_approve() {
                bail!("Record {} is {} and cannot be approved", id, record.payment_status);
            }
            payroll.approve_record(id).await?;
            println!("Approved payroll {} for {}", record.period(), record.employee_id);
            Ok(())
        }
        PayrollCommand::Pay { id } => {
            let record = payroll.get_record(id).await?;
            if !record.status().can_pay() {
                bail!("Record {} must be approved before it is paid", id);
            }
            payroll.pay_record(id).await?;
            println!("Paid payroll {} for {}", record.period(), record.employee_id);
            Ok(())
        }
    }
}

async fn run_crm(json: bool, command: &CrmCommand, api: &ApiClient) -> Result<()> {
    let crm = api.crm();
    match command {
        CrmCommand::Customers { status, page } => {
            let query = CustomerQuery {
                status: status.clone(),
                page: *page,
                ..Default::default()
            };
            let customers = crm.list_customers(&query).await?;
            print_page(json, &customers, |c| {
                format!("{:<36}  {:<10}  {:<28}  {}", c.id, c.status, c.email, c.display_name())
            })
        }
        CrmCommand::Show { id } => print_json(&crm.get_customer(id).await?),
        CrmCommand::Interactions { customer_id } => {
            let interactions = crm.list_interactions(customer_id).await?;
            if json {
                return print_json(&interactions);
            }
            for interaction in &interactions {
                let when = interaction
                    .completed_at
                    .or(interaction.scheduled_at)
                    .or(interaction.created_at)
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                let done = if interaction.is_completed() { "done" } else { "open" };
                println!("{:<16}  {:<8}  {:<4}  {}", when, interaction.kind, done, interaction.subject);
            }
            Ok(())
        }
        CrmCommand::Log {
            customer_id,
            kind,
            subject,
            description,
        } => {
            let request = CreateInteractionRequest {
                kind: kind.clone(),
                subject: subject.clone(),
                description: description.clone(),
                scheduled_at: None,
            };
            let interaction = crm.add_interaction(customer_id, &request).await?;
            println!("Logged {} {}", interaction.kind, interaction.id);
            Ok(())
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn require_session(session: &SessionContainer) -> Result<()> {
    if session.is_authenticated() {
        Ok(())
    } else {
        bail!("Not logged in. Run `evtaar login` first.")
    }
}

/// Transitions report details through notices; this only sets the exit code.
fn ensure(succeeded: bool) -> Result<()> {
    if succeeded {
        Ok(())
    } else {
        Err(anyhow!("Command failed"))
    }
}

/// Persist the login email in the on-disk config, without env overrides
fn remember_email(email: String) {
    let mut saved = Config::load().unwrap_or_default();
    saved.last_email = Some(email);
    if let Err(e) = saved.save() {
        warn!(error = %e, "Failed to save config");
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let line = line.trim().to_string();
    if line.is_empty() {
        bail!("No input given");
    }
    Ok(line)
}

fn print_notices(notices: &mut broadcast::Receiver<Notice>) {
    loop {
        match notices.try_recv() {
            Ok(notice) => match notice.level {
                NoticeLevel::Success => println!("{}", notice.message),
                NoticeLevel::Error => eprintln!("{}", notice.message),
            },
            Err(TryRecvError::Lagged(skipped)) => {
                debug!(skipped, "Dropped notices");
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_page<T, F>(json: bool, page: &Page<T>, line: F) -> Result<()>
where
    T: Serialize,
    F: Fn(&T) -> String,
{
    if json {
        return print_json(page);
    }
    if page.is_empty() {
        println!("Nothing found.");
        return Ok(());
    }
    for item in &page.items {
        println!("{}", line(item));
    }
    if let Some(pagination) = page.pagination.filter(Pagination::has_next) {
        println!("{} (use --page {} for more)", pagination.display(), pagination.page + 1);
    } else if let Some(pagination) = page.pagination {
        println!("{}", pagination.display());
    }
    Ok(())
}
