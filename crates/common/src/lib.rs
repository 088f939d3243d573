//! Shared building blocks for the auth workspace: response types and
//! logging setup.

pub mod types;
pub mod utils;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health { status: "ok" };
        assert_eq!(h.status, "ok");
    }

    #[test]
    fn test_message_reports_success() {
        let msg = types::TestMessage::working();
        assert_eq!(msg.message, "API is working correctly");
        assert_eq!(msg.status, "success");
    }
}
