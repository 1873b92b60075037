//! IPMI Panel - help block for driving a KVM host over IPMI or the ATX API
//!
//! Fetches `GET /api/info` from the KVM daemon, extracts the IPMI port and
//! renders example `ipmitool` / `curl` command pairs into the page:
//! - 200: render into `ipmi-text`
//! - 401/403: navigate to `/login`
//! - anything else: retry every second, forever

pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod models;
pub mod page;
pub mod passwd;
pub mod render;
pub mod source;

pub use config::{AuthConfig, CliOverrides, PanelConfig};
pub use error::{PanelError, Result};
pub use loader::{InfoPanelLoader, LoadOutcome, LoaderState};
pub use models::{InfoReply, PageLocation, StatusResponse};
pub use page::{Output, Page, TerminalPage};
pub use passwd::{IpmiAuthManager, IpmiUserCredentials, PasswdError};
pub use render::{render_ipmi_help, RenderContext};
pub use source::{HttpInfoSource, InfoSource};
