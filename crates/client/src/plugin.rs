//! Statically linked extensions
//!
//! An extension is constructed by the host and registered with the client
//! before it runs. On start each one is installed once: it subscribes its
//! callbacks on the [`Dispatcher`] and keeps a [`ClientHandle`] for sending.

use crate::dispatch::Dispatcher;
use crate::ClientHandle;

#[derive(Debug, thiserror::Error)]
#[error("Extension {name} failed to install: {reason}")]
pub struct ExtensionError {
    pub name: String,
    pub reason: String,
}

pub trait Extension: Send {
    fn name(&self) -> &str;

    fn install(&mut self, dispatcher: &mut Dispatcher, handle: &ClientHandle) -> Result<(), ExtensionError>;
}

#[derive(Default)]
pub struct ExtensionRegistry {
    extensions: Vec<Box<dyn Extension>>,
}

impl std::fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, extension: impl Extension + 'static) {
        self.extensions.push(Box::new(extension));
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(|extension| extension.name())
    }

    /// Installs every extension in registration order
    ///
    /// A failing extension is logged and skipped. Returns how many installed.
    pub fn install_all(&mut self, dispatcher: &mut Dispatcher, handle: &ClientHandle) -> usize {
        let mut installed = 0;
        for extension in &mut self.extensions {
            match extension.install(dispatcher, handle) {
                Ok(()) => {
                    installed += 1;
                    tracing::info!(session = %handle.session_id(), extension = extension.name(), "Extension installed");
                }
                Err(e) => {
                    tracing::warn!(session = %handle.session_id(), error = %e, "Extension skipped");
                }
            }
        }
        installed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::credentials::StaticCredentials;
    use crate::transport::memory::MemoryConnector;
    use crate::Client;
    use realmlink_protocol::messages::incoming::Ping;

    struct Counter;

    impl Extension for Counter {
        fn name(&self) -> &str {
            "counter"
        }

        fn install(&mut self, dispatcher: &mut Dispatcher, _handle: &ClientHandle) -> Result<(), ExtensionError> {
            dispatcher.on::<Ping, _>(|_| Ok(()));
            Ok(())
        }
    }

    struct Broken;

    impl Extension for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn install(&mut self, _dispatcher: &mut Dispatcher, _handle: &ClientHandle) -> Result<(), ExtensionError> {
            Err(ExtensionError {
                name: self.name().to_string(),
                reason: "missing resource".to_string(),
            })
        }
    }

    #[test]
    fn test_install_skips_failures() {
        let (connector, _listener) = MemoryConnector::pair(64);
        let client = Client::with_connector(
            ClientConfig::default(),
            StaticCredentials::new(Default::default()),
            connector,
        )
        .unwrap();

        let mut registry = ExtensionRegistry::new();
        registry.add(Broken);
        registry.add(Counter);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["broken", "counter"]);

        let mut dispatcher = Dispatcher::new();
        assert_eq!(registry.install_all(&mut dispatcher, &client.handle()), 1);
        assert_eq!(dispatcher.len(), 1);
    }
}
