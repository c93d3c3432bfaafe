//! Integration tests for Teeshop.
//!
//! Flows run against the in-memory backend with device-local state in a
//! temporary directory, so they need no network:
//!
//! ```bash
//! cargo test -p teeshop-integration-tests
//! ```
//!
//! Tests marked `#[ignore]` talk to a live backend configured through the
//! usual `TEESHOP_*` variables:
//!
//! ```bash
//! cargo test -p teeshop-integration-tests -- --ignored
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use teeshop_core::{Product, ProductId, UserId};
use teeshop_storefront::Storefront;
use teeshop_storefront::backend::MemoryBackend;
use teeshop_storefront::session::{CurrentUser, SessionProvider};
use teeshop_storefront::storage::FileStorage;

/// Upper bound on every backend call made by a test storefront.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(2);

/// One device talking to a shared in-memory backend.
///
/// [`restart`](Self::restart) simulates relaunching the app: the backend and
/// the data directory survive, every store is rebuilt.
pub struct TestContext {
    pub backend: Arc<MemoryBackend>,
    pub storefront: Storefront,
    data_dir: TempDir,
}

impl TestContext {
    /// A signed-out storefront over an empty backend.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the temporary data directory cannot be created.
    pub fn new() -> io::Result<Self> {
        let backend = Arc::new(MemoryBackend::new());
        let data_dir = TempDir::new()?;
        let storefront = build(&backend, data_dir.path(), SessionProvider::signed_out());
        Ok(Self {
            backend,
            storefront,
            data_dir,
        })
    }

    /// Rebuild the storefront from the same backend and data directory,
    /// keeping whoever is signed in.
    pub fn restart(&mut self) {
        let session = SessionProvider::new(self.storefront.session().current());
        self.storefront = build(&self.backend, self.data_dir.path(), session);
    }

    /// Sign in a fresh user and return their id.
    pub fn sign_in(&self) -> UserId {
        let user = UserId::generate();
        self.storefront.session().sign_in(CurrentUser::new(user));
        user
    }

    pub fn sign_out(&self) {
        self.storefront.session().sign_out();
    }

    /// Catalog product by id.
    #[must_use]
    pub fn product(&self, id: &str) -> Option<Product> {
        self.storefront
            .catalog()
            .get(&ProductId::from(id))
            .cloned()
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        self.data_dir.path()
    }
}

fn build(backend: &Arc<MemoryBackend>, dir: &Path, session: SessionProvider) -> Storefront {
    Storefront::with_backend(
        Arc::clone(backend),
        Arc::new(FileStorage::new(dir)),
        session,
        TEST_TIMEOUT,
    )
}
