/*!
Page mockée pour tester le loader sans navigateur

Enregistre chaque écriture `innerHTML` et chaque navigation, dans l'ordre.
Les clones partagent le même journal: on garde un clone dans le test
pendant que le loader possède l'autre.
*/

use ipmi_panel::{Page, PageLocation};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEffect {
    InnerHtml { element_id: String, html: String },
    Navigate { href: String },
}

#[derive(Clone)]
pub struct MockPage {
    location: PageLocation,
    effects: Arc<Mutex<Vec<PageEffect>>>,
}

impl MockPage {
    pub fn new(location: PageLocation) -> Self {
        Self {
            location,
            effects: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Page servie depuis `url`, ex: `https://kvm.local`
    pub fn at(url: &str) -> anyhow::Result<Self> {
        Ok(Self::new(PageLocation::from_url(url)?))
    }

    /// Tous les effets enregistrés (pour assertions de tests)
    pub fn effects(&self) -> Vec<PageEffect> {
        self.effects.lock().clone()
    }

    /// Contenu écrit dans un élément, dans l'ordre
    pub fn writes_to(&self, element_id: &str) -> Vec<String> {
        self.effects
            .lock()
            .iter()
            .filter_map(|e| match e {
                PageEffect::InnerHtml { element_id: id, html } if id == element_id => Some(html.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.effects
            .lock()
            .iter()
            .filter_map(|e| match e {
                PageEffect::Navigate { href } => Some(href.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn is_untouched(&self) -> bool {
        self.effects.lock().is_empty()
    }

    pub fn clear(&self) {
        self.effects.lock().clear();
    }
}

impl Page for MockPage {
    fn location(&self) -> PageLocation {
        self.location.clone()
    }

    fn set_inner_html(&mut self, element_id: &str, html: &str) -> ipmi_panel::Result<()> {
        log::info!("📝 [MOCK] #{} <- {} bytes", element_id, html.len());
        self.effects.lock().push(PageEffect::InnerHtml {
            element_id: element_id.to_string(),
            html: html.to_string(),
        });
        Ok(())
    }

    fn navigate(&mut self, href: &str) -> ipmi_panel::Result<()> {
        log::info!("➡️ [MOCK] navigate to {}", href);
        self.effects.lock().push(PageEffect::Navigate { href: href.to_string() });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_journal() {
        let page = MockPage::at("https://kvm.local").unwrap();
        let mut handle = page.clone();

        handle.set_inner_html("ipmi-text", "<br>").unwrap();
        handle.set_inner_html("other", "x").unwrap();
        handle.navigate("/login").unwrap();

        assert_eq!(page.writes_to("ipmi-text"), vec!["<br>"]);
        assert_eq!(page.navigations(), vec!["/login"]);
        assert_eq!(page.effects().len(), 3);

        page.clear();
        assert!(page.is_untouched());
    }
}
