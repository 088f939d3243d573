use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Body of the unauthenticated `/test` probe.
#[derive(Serialize, Debug)]
pub struct TestMessage {
    pub message: &'static str,
    pub status: &'static str,
}

impl TestMessage {
    pub fn working() -> Self {
        Self { message: "API is working correctly", status: "success" }
    }
}
