//! Network and device I/O for CollectPro: Firebase sign-in, the REST
//! backend and receipt printers.

pub mod api;
pub mod auth;
pub mod error;
pub mod printer;
pub mod session;

pub use api::Client;
pub use auth::{Credentials, FirebaseAuth, FirebaseConfig};
pub use error::{AuthError, ClientError, PrinterError};
pub use printer::{HtmlPrinter, PrintOutcome, Printer, PrinterTarget};
pub use session::{AuthSubscription, SessionContext};
