use pnode_service::NodeService;

/// Shared application state across all routes.
pub struct AppState {
    /// Node aggregation service; read-only after startup.
    pub service: NodeService,
}

impl AppState {
    pub fn new(service: NodeService) -> Self {
        Self { service }
    }
}
