use std::path::PathBuf;

use chrono_tz::Tz;
use clap::Parser;
use collect_client::{
    FirebaseConfig, HtmlPrinter, Printer, PrinterTarget,
    auth::{DEFAULT_FIRESTORE_URL, DEFAULT_IDENTITY_URL, DEFAULT_SECURETOKEN_URL},
};
use engine::ReceiptOptions;
use serde::Deserialize;

use crate::{
    error::{AppError, Result},
    local_state,
};

const DEFAULT_CONFIG_PATH: &str = "config/tui.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub firebase_api_key: String,
    pub firebase_project_id: String,
    pub identity_url: String,
    pub securetoken_url: String,
    pub firestore_url: String,
    /// Prefills the login form.
    pub email: String,
    pub timezone: String,
    pub state_path: String,
    pub export_dir: String,
    pub log_file: String,
    pub log_level: String,
    pub receipt: ReceiptConfig,
    pub printer: PrinterConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            firebase_api_key: String::new(),
            firebase_project_id: String::new(),
            identity_url: DEFAULT_IDENTITY_URL.to_string(),
            securetoken_url: DEFAULT_SECURETOKEN_URL.to_string(),
            firestore_url: DEFAULT_FIRESTORE_URL.to_string(),
            email: String::new(),
            timezone: "Africa/Nairobi".to_string(),
            state_path: local_state::default_state_path().to_string(),
            export_dir: "exports".to_string(),
            log_file: "collectpro_tui.log".to_string(),
            log_level: "info".to_string(),
            receipt: ReceiptConfig::default(),
            printer: PrinterConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReceiptConfig {
    pub business_name: String,
    pub verify_url: String,
    pub footer: Vec<String>,
}

impl Default for ReceiptConfig {
    fn default() -> Self {
        let defaults = ReceiptOptions::default();
        Self {
            business_name: defaults.business_name,
            verify_url: defaults.verify_url,
            footer: defaults.footer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PrinterTransport {
    /// Serial binding of the Bluetooth printer.
    Device,
    /// Raw printer port on the network.
    Tcp,
    /// Save a printable page and open it.
    Html,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
    pub transport: PrinterTransport,
    pub device: String,
    pub address: String,
    pub receipts_dir: String,
    pub opener: String,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            transport: PrinterTransport::Html,
            device: "/dev/rfcomm0".to_string(),
            address: "192.168.1.100:9100".to_string(),
            receipts_dir: "receipts".to_string(),
            opener: "xdg-open".to_string(),
        }
    }
}

impl AppConfig {
    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| AppError::Timezone(self.timezone.clone()))
    }

    pub fn receipt_options(&self) -> Result<ReceiptOptions> {
        Ok(ReceiptOptions {
            business_name: self.receipt.business_name.clone(),
            verify_url: self.receipt.verify_url.clone(),
            footer: self.receipt.footer.clone(),
            timezone: self.timezone()?,
            ..ReceiptOptions::default()
        })
    }

    pub fn printer(&self) -> Printer {
        let printer = &self.printer;
        match printer.transport {
            PrinterTransport::Device => {
                Printer::Thermal(PrinterTarget::Device(PathBuf::from(&printer.device)))
            }
            PrinterTransport::Tcp => Printer::Thermal(PrinterTarget::Tcp(printer.address.clone())),
            PrinterTransport::Html => Printer::Html(HtmlPrinter {
                dir: PathBuf::from(&printer.receipts_dir),
                opener: printer.opener.clone(),
            }),
        }
    }

    pub fn firebase(&self) -> FirebaseConfig {
        FirebaseConfig {
            identity_url: self.identity_url.clone(),
            securetoken_url: self.securetoken_url.clone(),
            firestore_url: self.firestore_url.clone(),
            ..FirebaseConfig::new(&self.firebase_api_key, &self.firebase_project_id)
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "collectpro_tui", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override backend base URL (e.g. http://127.0.0.1:5000).
    #[arg(long)]
    base_url: Option<String>,
    /// Override the email shown on the login form (password is never read from CLI).
    #[arg(long)]
    email: Option<String>,
    /// Override timezone (IANA name).
    #[arg(long)]
    timezone: Option<String>,
    /// Override the printer transport.
    #[arg(long, value_enum)]
    printer: Option<PrinterTransport>,
    /// Override the log file path.
    #[arg(long)]
    log_file: Option<String>,
}

pub fn load() -> Result<AppConfig> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(
        config::Environment::with_prefix("COLLECTPRO_TUI")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("receipt.footer")
            .try_parsing(true),
    );
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(email) = args.email {
        settings.email = email;
    }
    if let Some(timezone) = args.timezone {
        settings.timezone = timezone;
    }
    if let Some(transport) = args.printer {
        settings.printer.transport = transport;
    }
    if let Some(log_file) = args.log_file {
        settings.log_file = log_file;
    }

    Ok(settings)
}
