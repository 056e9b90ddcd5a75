/// Service name stamped into every response envelope.
pub fn service_name() -> String {
    std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::service_name;

    #[test]
    fn service_name_always_resolves() {
        // Either the configured name or the "Unknown" fallback
        assert!(!service_name().is_empty());
    }
}
