/*!
Test Harness pour le loader ipmi-panel

Assemble une `ScriptedSource` et une `MockPage`, construit le loader et
fournit des assertions sur les effets observés.
*/

use crate::mock_page::MockPage;
use crate::scripted_source::ScriptedSource;
use ipmi_panel::{InfoPanelLoader, PageLocation};
use std::time::Duration;
use tokio::time::Instant;

pub struct TestHarness {
    pub source: ScriptedSource,
    pub page: MockPage,
}

impl TestHarness {
    /// Page servie depuis `https://kvm.local`
    pub fn new() -> Self {
        Self::at(PageLocation::new("https:", "kvm.local", "kvm.local"))
    }

    pub fn at(location: PageLocation) -> Self {
        env_logger::try_init().ok(); // Init logging pour tests

        Self {
            source: ScriptedSource::new(),
            page: MockPage::new(location),
        }
    }

    /// Remplace le script de la source
    pub fn with_source(mut self, source: ScriptedSource) -> Self {
        self.source = source;
        self
    }

    /// Loader branché sur des clones de la source et de la page
    pub fn loader(&self) -> InfoPanelLoader<ScriptedSource, MockPage> {
        InfoPanelLoader::new(self.source.clone(), self.page.clone())
    }

    /// Écarts entre requêtes successives
    pub fn request_gaps(&self) -> Vec<Duration> {
        let times: Vec<Instant> = self.source.request_times();
        times.windows(2).map(|w| w[1] - w[0]).collect()
    }

    pub fn assert_untouched(&self) {
        assert!(
            self.page.is_untouched(),
            "expected no DOM write and no navigation, got {:?}",
            self.page.effects()
        );
    }

    /// Vérifie un rendu unique dans `element_id` et le retourne
    pub fn assert_rendered_once(&self, element_id: &str) -> String {
        let writes = self.page.writes_to(element_id);
        assert_eq!(writes.len(), 1, "expected exactly one write to #{element_id}");
        assert!(self.page.navigations().is_empty(), "unexpected navigation");
        writes[0].clone()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
