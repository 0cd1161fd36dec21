//! # Structured Logging
//!
//! Span macros for connector calls and submission hooks. Fields carry ids,
//! keys and counts only; secured values never appear in a span or event.

/// Create a tracing span for a connector operation.
///
/// ```rust,ignore
/// let span = connector_span!("vault", "add_record", entry_id = %entry_id);
/// ```
#[macro_export]
macro_rules! connector_span {
    ($connector:expr, $operation:expr) => {
        tracing::debug_span!(
            "connector_operation",
            connector = %$connector,
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4()
        )
    };
    ($connector:expr, $operation:expr, $($field:tt)*) => {
        tracing::debug_span!(
            "connector_operation",
            connector = %$connector,
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Create a tracing span for a submission lifecycle hook.
///
/// ```rust,ignore
/// let span = submission_span!("after_submission", form.id, entry_id = %entry.id);
/// ```
#[macro_export]
macro_rules! submission_span {
    ($hook:expr, $form_id:expr) => {
        tracing::info_span!(
            "submission_hook",
            hook = %$hook,
            form_id = %$form_id,
            request_id = %uuid::Uuid::new_v4()
        )
    };
    ($hook:expr, $form_id:expr, $($field:tt)*) => {
        tracing::info_span!(
            "submission_hook",
            hook = %$hook,
            form_id = %$form_id,
            request_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Log configuration at startup
pub fn log_config_info(config: &crate::config::AppConfig) {
    tracing::info!(
        service_name = %config.observability.service_name,
        site_id = %config.site_id,
        default_connector = %config.default_connector,
        vault_api_url = %config.vault.api_url,
        max_connections = config.database.max_connections,
        allow_unsupported_delete = config.deletion.allow_unsupported_delete,
        "Secure form storage configuration"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macros_compile() {
        let _span = connector_span!("vault", "get_record");
        let _span = connector_span!("relational", "add_record", entry_id = 42, form_id = 7);
        let _span = submission_span!("before_submission", 7);
        let _span = submission_span!("after_submission", 7, entry_id = 42);
    }

    #[test]
    fn test_log_config_info() {
        let config = crate::config::AppConfig::default();

        // This should not panic
        log_config_info(&config);
    }
}
