//! Pure CollectPro logic shared by the dashboard and the admin CLI.
//!
//! Nothing in here performs I/O: receipts are built into an ordered
//! [`Receipt`] layout and then rendered to bytes or HTML, routes are checked
//! against an [`AuthState`] snapshot, and form input is validated into the
//! request bodies from [`api_types`].

pub use contacts::{Contact, ContactKind, directory_rows, stk_contacts};
pub use error::EngineError;
pub use export::write_payments_csv;
pub use forms::{FormError, FormMode, PaymentEditForm, PlotForm, StkForm, TenantRow};
pub use guard::{
    Access, AdminPage, AuthState, Decision, GuardState, Role, Route, SignedInUser, decide,
    post_login_target,
};
pub use phone::{NormalizedPhone, is_complete_kenyan_phone, normalize_kenyan_mobile};
pub use receipt::{Align, Op, Receipt, ReceiptOptions, build_receipt};
pub use search::{MONTHS, ReceiptFilter, filter_contacts, filter_payments};
pub use status::ReceiptStatus;
pub use summary::{MonthlySummary, PlotStanding, plot_standing, summarize};

pub mod escpos;
pub mod html;

mod contacts;
mod error;
mod export;
mod forms;
mod guard;
mod phone;
mod receipt;
mod search;
mod status;
mod summary;

pub type ResultEngine<T> = Result<T, EngineError>;
