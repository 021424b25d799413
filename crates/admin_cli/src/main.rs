use std::{
    error::Error,
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use api_types::payment::Payment;
use clap::{Args, Parser, Subcommand, ValueEnum};
use collect_client::{
    Client, FirebaseAuth, FirebaseConfig, HtmlPrinter, PrintOutcome, Printer, PrinterTarget,
    SessionContext,
};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{
    ReceiptOptions, Role, StkForm, build_receipt, filter_payments, normalize_kenyan_mobile,
    write_payments_csv,
};

type CliResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "collectpro_admin")]
#[command(about = "Admin utilities for CollectPro (roles, receipts, STK pushes, exports)")]
struct Cli {
    /// CollectPro backend base URL.
    #[arg(
        long,
        env = "COLLECTPRO_BASE_URL",
        default_value = "http://127.0.0.1:5000"
    )]
    base_url: String,

    #[arg(long, env = "COLLECTPRO_FIREBASE_API_KEY", default_value = "")]
    firebase_api_key: String,

    #[arg(long, env = "COLLECTPRO_FIREBASE_PROJECT_ID", default_value = "")]
    firebase_project_id: String,

    /// Account used for commands that talk to the backend.
    #[arg(long, env = "COLLECTPRO_ADMIN_EMAIL")]
    email: Option<String>,

    /// Log filter level (trace, debug, info, warn, error).
    #[arg(long, env = "COLLECTPRO_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Role(RoleCmd),
    Receipt(ReceiptCmd),
    /// Send an MPESA STK push prompt.
    Stk(StkArgs),
    Phone(PhoneCmd),
    Payments(PaymentsCmd),
}

#[derive(Args, Debug)]
struct RoleCmd {
    #[command(subcommand)]
    command: RoleCommand,
}

#[derive(Subcommand, Debug)]
enum RoleCommand {
    /// Write the role field on a user's document.
    Set(RoleSetArgs),
}

#[derive(Args, Debug)]
struct RoleSetArgs {
    /// Firebase uid of the user to change.
    #[arg(long)]
    uid: String,
    /// admin, manager or any other label (which grants no admin access).
    #[arg(long)]
    role: String,
}

#[derive(Args, Debug)]
struct ReceiptCmd {
    #[command(subcommand)]
    command: ReceiptCommand,
}

#[derive(Subcommand, Debug)]
enum ReceiptCommand {
    /// Print the receipt of one payment.
    Print(ReceiptPrintArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Transport {
    Device,
    Tcp,
    Html,
}

#[derive(Args, Debug)]
struct ReceiptPrintArgs {
    /// Payment id to fetch from the backend.
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    id: Option<String>,
    /// Read the payment from a JSON file instead of the backend.
    #[arg(long)]
    file: Option<PathBuf>,
    #[arg(long, value_enum, default_value = "html")]
    transport: Transport,
    /// Serial device of the Bluetooth printer.
    #[arg(long, default_value = "/dev/rfcomm0")]
    device: PathBuf,
    /// host:port of a network printer.
    #[arg(long, default_value = "192.168.1.100:9100")]
    address: String,
    #[arg(long, default_value = "receipts")]
    receipts_dir: PathBuf,
    #[arg(long, default_value = "xdg-open")]
    opener: String,
    #[arg(long, default_value = "Africa/Nairobi")]
    timezone: String,
    #[arg(long)]
    business_name: Option<String>,
}

#[derive(Args, Debug)]
struct StkArgs {
    #[arg(long)]
    phone: String,
    /// Whole shillings.
    #[arg(long)]
    amount: String,
}

#[derive(Args, Debug)]
struct PhoneCmd {
    #[command(subcommand)]
    command: PhoneCommand,
}

#[derive(Subcommand, Debug)]
enum PhoneCommand {
    /// Print the 254XXXXXXXXX form of a Kenyan mobile number.
    Normalize { raw: String },
}

#[derive(Args, Debug)]
struct PaymentsCmd {
    #[command(subcommand)]
    command: PaymentsCommand,
}

#[derive(Subcommand, Debug)]
enum PaymentsCommand {
    /// Write payments as CSV.
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Output file; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Same search as the payments page (id, phone, name, source).
    #[arg(long, default_value = "")]
    search: String,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> CliResult<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> CliResult<String> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            ..
        }) = event::read()?
        else {
            continue;
        };
        if kind == KeyEventKind::Release {
            continue;
        }

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

/// Signs in with `--email` and a password from `COLLECTPRO_ADMIN_PASSWORD`
/// or the prompt.
async fn sign_in(cli: &Cli) -> CliResult<SessionContext> {
    let Some(email) = cli.email.as_deref() else {
        return Err("--email (or COLLECTPRO_ADMIN_EMAIL) is required for this command".into());
    };
    let password = match std::env::var("COLLECTPRO_ADMIN_PASSWORD") {
        Ok(password) if !password.is_empty() => password,
        _ => prompt_password(&format!("Password for {email}: "))?,
    };

    let session = SessionContext::new(FirebaseAuth::new(FirebaseConfig::new(
        &cli.firebase_api_key,
        &cli.firebase_project_id,
    )));
    let user = session.sign_in(email, &password).await?;
    tracing::info!(uid = %user.uid, role = ?user.role, "signed in");
    Ok(session)
}

fn printer_for(args: &ReceiptPrintArgs) -> Printer {
    match args.transport {
        Transport::Device => Printer::Thermal(PrinterTarget::Device(args.device.clone())),
        Transport::Tcp => Printer::Thermal(PrinterTarget::Tcp(args.address.clone())),
        Transport::Html => Printer::Html(HtmlPrinter {
            dir: args.receipts_dir.clone(),
            opener: args.opener.clone(),
        }),
    }
}

fn receipt_options(args: &ReceiptPrintArgs) -> CliResult<ReceiptOptions> {
    let timezone = args
        .timezone
        .parse::<chrono_tz::Tz>()
        .map_err(|_| format!("unknown timezone: {}", args.timezone))?;
    let defaults = ReceiptOptions::default();
    Ok(ReceiptOptions {
        business_name: args.business_name.clone().unwrap_or(defaults.business_name),
        timezone,
        ..ReceiptOptions::default()
    })
}

/// Accepts a bare payment object or the backend's `{"payment": {...}}`.
fn read_payment(path: &Path) -> CliResult<Payment> {
    let raw = std::fs::read_to_string(path)?;
    let mut value: serde_json::Value = serde_json::from_str(&raw)?;
    if let Some(inner) = value.get_mut("payment") {
        value = inner.take();
    }
    Ok(serde_json::from_value(value)?)
}

/// Default export file name, stamped with the local time.
fn export_file_name(now: chrono::DateTime<chrono::Local>) -> String {
    format!("payments-{}.csv", now.format("%Y%m%d-%H%M%S"))
}

async fn run(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Command::Role(RoleCmd {
            command: RoleCommand::Set(args),
        }) => {
            let session = sign_in(cli).await?;
            session.set_role(&args.uid, args.role.trim()).await?;
            let grants = Role::parse(&args.role).is_some_and(|role| role.can_administer());
            println!(
                "set role of {} to {} ({})",
                args.uid,
                args.role.trim(),
                if grants {
                    "admin panel access"
                } else {
                    "no admin panel access"
                }
            );
        }
        Command::Receipt(ReceiptCmd {
            command: ReceiptCommand::Print(args),
        }) => {
            let payment = match (&args.file, &args.id) {
                (Some(path), _) => read_payment(path)?,
                (None, Some(id)) => {
                    let session = sign_in(cli).await?;
                    let token = session.id_token().await?;
                    Client::new(&cli.base_url)?.payment(&token, id).await?
                }
                (None, None) => return Err("pass --id or --file".into()),
            };

            let receipt = build_receipt(&payment, &receipt_options(args)?);
            match printer_for(args).print(&receipt).await? {
                PrintOutcome::Sent { target, bytes } => {
                    println!("sent receipt {} to {target} ({bytes} bytes)", payment.id);
                }
                PrintOutcome::Saved(path) => {
                    println!("saved receipt {} to {}", payment.id, path.display());
                }
            }
        }
        Command::Stk(args) => {
            let mut form = StkForm::default();
            form.set_phone(&args.phone);
            form.amount = args.amount.clone();
            let push = form.validate().map_err(|err| format!("{}: {err}", err.title()))?;

            let session = sign_in(cli).await?;
            let token = session.id_token().await?;
            let ack = Client::new(&cli.base_url)?.stk_push(&token, &push).await?;
            println!(
                "{}",
                ack.text()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("STK push sent to {} for {}", push.phone, push.amount))
            );
        }
        Command::Phone(PhoneCmd {
            command: PhoneCommand::Normalize { raw },
        }) => {
            let normalized = normalize_kenyan_mobile(raw);
            println!("{}", normalized.value);
            if !normalized.is_valid {
                eprintln!("not a valid Kenyan mobile number: {raw}");
                std::process::exit(2);
            }
        }
        Command::Payments(PaymentsCmd {
            command: PaymentsCommand::Export(args),
        }) => {
            let session = sign_in(cli).await?;
            let token = session.id_token().await?;
            let payments = Client::new(&cli.base_url)?.payments(&token).await?;
            let rows: Vec<Payment> = filter_payments(&payments, &args.search)
                .into_iter()
                .cloned()
                .collect();

            match &args.out {
                Some(path) => {
                    let path = if path.is_dir() {
                        path.join(export_file_name(chrono::Local::now()))
                    } else {
                        path.clone()
                    };
                    write_payments_csv(&rows, File::create(&path)?)?;
                    eprintln!("exported {} payments to {}", rows.len(), path.display());
                }
                None => write_payments_csv(&rows, std::io::stdout().lock())?,
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    let level = &cli.log_level;
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "collectpro_admin={level},collect_client={level},engine={level}"
        ))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(&cli).await {
        tracing::error!("{err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn role_set_parses() {
        let cli = Cli::try_parse_from([
            "collectpro_admin",
            "--email",
            "ops@jobawu.test",
            "role",
            "set",
            "--uid",
            "u-42",
            "--role",
            "manager",
        ])
        .unwrap();
        match cli.command {
            Command::Role(RoleCmd {
                command: RoleCommand::Set(args),
            }) => {
                assert_eq!(args.uid, "u-42");
                assert_eq!(args.role, "manager");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn receipt_print_needs_a_source() {
        assert!(Cli::try_parse_from(["collectpro_admin", "receipt", "print"]).is_err());
        assert!(
            Cli::try_parse_from([
                "collectpro_admin",
                "receipt",
                "print",
                "--id",
                "QK7",
                "--file",
                "p.json"
            ])
            .is_err()
        );

        let cli = Cli::try_parse_from([
            "collectpro_admin",
            "receipt",
            "print",
            "--file",
            "p.json",
            "--transport",
            "tcp",
            "--address",
            "10.0.0.7:9100",
        ])
        .unwrap();
        let Command::Receipt(ReceiptCmd {
            command: ReceiptCommand::Print(args),
        }) = cli.command
        else {
            panic!("expected receipt print");
        };
        match printer_for(&args) {
            Printer::Thermal(target) => assert_eq!(target.describe(), "tcp://10.0.0.7:9100"),
            other => panic!("unexpected printer {other:?}"),
        }
    }

    #[test]
    fn payment_files_may_be_wrapped() {
        let dir = std::env::temp_dir().join(format!("collectpro-admin-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let bare = dir.join("bare.json");
        std::fs::write(&bare, r#"{"id": "QK7", "name": "Grace"}"#).unwrap();
        assert_eq!(read_payment(&bare).unwrap().id, "QK7");

        let wrapped = dir.join("wrapped.json");
        std::fs::write(&wrapped, r#"{"payment": {"id": "QK8"}}"#).unwrap();
        assert_eq!(read_payment(&wrapped).unwrap().id, "QK8");
    }

    #[test]
    fn receipt_options_reject_unknown_zones() {
        let cli = Cli::try_parse_from([
            "collectpro_admin",
            "receipt",
            "print",
            "--file",
            "p.json",
            "--timezone",
            "Mars/Olympus",
        ])
        .unwrap();
        let Command::Receipt(ReceiptCmd {
            command: ReceiptCommand::Print(args),
        }) = cli.command
        else {
            panic!("expected receipt print");
        };
        assert!(receipt_options(&args).is_err());
    }

    #[test]
    fn export_names_carry_the_timestamp() {
        let at = chrono::Local
            .with_ymd_and_hms(2026, 3, 5, 14, 7, 9)
            .unwrap();
        assert_eq!(export_file_name(at), "payments-20260305-140709.csv");
    }
}
