use trackerblocker_domain::DomainError;

/// Small synchronous, process-durable key/value persistence.
pub trait KeyValueStore: Send + Sync {
    fn get_string(&self, key: &str) -> Option<String>;

    fn set_string(&self, key: &str, value: Option<&str>) -> Result<(), DomainError>;

    fn get_bytes(&self, key: &str) -> Option<Vec<u8>>;

    fn set_bytes(&self, key: &str, value: Option<&[u8]>) -> Result<(), DomainError>;
}
