/*!
# Panel DevKit - Stubs et utilitaires de test pour ipmi-panel

Bibliothèque facilitant les tests du loader sans daemon KVM réel:
- Page mockée qui enregistre les écritures DOM et les navigations
- Source `/api/info` scriptée (réponses et erreurs de transport)
- Serveur HTTP stub `/api/info` (axum) pour les tests de bout en bout
- Harness combinant le tout
*/

pub mod mock_page;
pub mod scripted_source;
pub mod stub_server;
pub mod test_utils;

pub use mock_page::{MockPage, PageEffect};
pub use scripted_source::{info_body, ScriptedSource};
pub use stub_server::StubInfoServer;
pub use test_utils::TestHarness;
