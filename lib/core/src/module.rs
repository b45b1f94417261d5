use axum::Router;

/// One business module of the server.
///
/// Implementations hand the binary a named router; the binary nests
/// each one under `/{name}` and owns the shared middleware stack.
pub trait Module: Send + Sync {
    /// Name used for the route prefix and in startup logs.
    fn name(&self) -> &str;

    /// The module's routes, relative to its prefix.
    fn routes(&self) -> Router;
}
