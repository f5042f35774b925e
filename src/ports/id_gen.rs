//! ID generator port for producing link group identifiers.

/// Generates unique identifiers.
///
/// Abstracting ID generation allows tests to substitute a predictable
/// sequence for random UUIDs.
pub trait IdGenerator: Send + Sync {
    /// Generates a new unique identifier string.
    fn generate_id(&self) -> String;
}
