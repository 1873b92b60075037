//! The page the panel lives in: its location, its DOM, its navigation.

use std::io::Write;
use std::path::PathBuf;
use tracing::info;

use crate::error::Result;
use crate::models::PageLocation;

pub trait Page: Send {
    /// Current location, read once per attempt by the loader.
    fn location(&self) -> PageLocation;

    /// Replace the content of `element_id` with `html`.
    fn set_inner_html(&mut self, element_id: &str, html: &str) -> Result<()>;

    /// Leave the page for `href` (same-origin path).
    fn navigate(&mut self, href: &str) -> Result<()>;
}

/// Where a `TerminalPage` puts the rendered element.
#[derive(Debug, Clone)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

/// Page used by the CLI: the element becomes an HTML fragment on stdout or in
/// a file, and navigation is recorded for the caller to act on.
#[derive(Debug)]
pub struct TerminalPage {
    location: PageLocation,
    output: Output,
    redirect: Option<String>,
}

impl TerminalPage {
    pub fn new(location: PageLocation, output: Output) -> Self {
        Self {
            location,
            output,
            redirect: None,
        }
    }

    /// Absolute URL of the last navigation, if any.
    pub fn redirect(&self) -> Option<&str> {
        self.redirect.as_deref()
    }
}

fn element_fragment(element_id: &str, html: &str) -> String {
    format!("<div id=\"{element_id}\">\n{html}\n</div>\n")
}

impl Page for TerminalPage {
    fn location(&self) -> PageLocation {
        self.location.clone()
    }

    fn set_inner_html(&mut self, element_id: &str, html: &str) -> Result<()> {
        let fragment = element_fragment(element_id, html);
        match &self.output {
            Output::Stdout => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(fragment.as_bytes())?;
                stdout.flush()?;
            }
            Output::File(path) => {
                std::fs::write(path, fragment)?;
                info!("wrote #{} to {}", element_id, path.display());
            }
        }
        Ok(())
    }

    fn navigate(&mut self, href: &str) -> Result<()> {
        let target = format!("{}{}", self.location.origin(), href);
        info!("navigation requested: {}", target);
        self.redirect = Some(target);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(output: Output) -> TerminalPage {
        TerminalPage::new(PageLocation::new("https:", "kvm.local", "kvm.local:8443"), output)
    }

    #[test]
    fn test_writes_fragment_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ipmi.html");
        let mut page = page(Output::File(path.clone()));

        page.set_inner_html("ipmi-text", "hello<br>").unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "<div id=\"ipmi-text\">\nhello<br>\n</div>\n");
        assert!(page.redirect().is_none());
    }

    #[test]
    fn test_navigate_records_absolute_target() {
        let mut page = page(Output::Stdout);
        page.navigate("/login").unwrap();
        assert_eq!(page.redirect(), Some("https://kvm.local:8443/login"));
    }
}
