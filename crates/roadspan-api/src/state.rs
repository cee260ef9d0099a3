use roadspan_resolve::Resolver;

/// Which reference backend the server reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Memory => "memory",
            StorageBackend::Postgres => "postgres",
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub resolver: Resolver,
    pub storage: StorageBackend,
}

impl AppState {
    pub fn new(resolver: Resolver, storage: StorageBackend) -> Self {
        Self { resolver, storage }
    }
}
