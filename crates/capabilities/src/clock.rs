//! Current-time capability.

use async_trait::async_trait;
use chrono::Local;
use promptweave_core::Capability;

pub struct CurrentTimeCapability;

#[async_trait]
impl Capability for CurrentTimeCapability {
    fn name(&self) -> &str {
        "CurrentTime"
    }

    fn description(&self) -> &str {
        "Get the current local date and time."
    }

    fn input_shape(&self) -> &str {
        "Ignored."
    }

    async fn invoke(&self, _input: &str) -> String {
        format!("Current time is {}\n", Local::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_current_time() {
        let result = CurrentTimeCapability.invoke("").await;
        assert!(result.starts_with("Current time is "));
        assert!(result.ends_with('\n'));
    }
}
