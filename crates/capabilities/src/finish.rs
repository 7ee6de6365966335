//! Finish capability — the terminal action.
//!
//! Invoking it produces no output; the control loop recognizes the name and
//! ends the run with the best available answer. It is registered like any
//! other capability so it appears in the catalog the model sees.

use async_trait::async_trait;
use promptweave_core::Capability;

pub struct FinishCapability;

#[async_trait]
impl Capability for FinishCapability {
    fn name(&self) -> &str {
        "Finish"
    }

    fn description(&self) -> &str {
        "Signal that the task is complete and the final answer is ready."
    }

    fn input_shape(&self) -> &str {
        "The result of the task."
    }

    async fn invoke(&self, _input: &str) -> String {
        String::new()
    }
}
