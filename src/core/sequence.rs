use crate::domain::command::BtpCommand;
use crate::domain::model::{ProvisionContext, StepResult};
use crate::domain::ports::{CommandRunner, ProvisionStep};
use crate::utils::error::{ProvisionError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Runs provisioning steps in order, stopping at the first failure.
pub struct StepSequence {
    steps: Vec<Box<dyn ProvisionStep>>,
    runner: Arc<dyn CommandRunner>,
}

impl StepSequence {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            steps: Vec::new(),
            runner,
        }
    }

    pub fn add_step(&mut self, step: Box<dyn ProvisionStep>) {
        self.steps.push(step);
    }

    pub fn with_step(mut self, step: Box<dyn ProvisionStep>) -> Self {
        self.add_step(step);
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Executes every step against `context`. The failing step's error is
    /// wrapped with its name; later steps never run.
    pub async fn execute_all(&self, context: &mut ProvisionContext) -> Result<()> {
        let total = self.steps.len();

        for (index, step) in self.steps.iter().enumerate() {
            let start_time = Instant::now();
            tracing::info!(
                execution_id = %context.execution_id,
                "▶️ [{}/{}] {}",
                index + 1,
                total,
                step.name()
            );

            match step.execute(self.runner.as_ref(), context).await {
                Ok(()) => {
                    let result = StepResult {
                        step_name: step.name().to_string(),
                        duration: start_time.elapsed(),
                    };
                    tracing::info!(
                        "✅ Step completed: {} (duration: {:?})",
                        result.step_name,
                        result.duration
                    );
                    context.add_result(result);
                }
                Err(e) => {
                    tracing::error!("❌ Step {} failed: {}", step.name(), e);
                    return Err(ProvisionError::StepFailed {
                        step: step.name().to_string(),
                        source: Box::new(e),
                    });
                }
            }
        }

        Ok(())
    }

    /// Commands each step would issue, without running anything.
    pub fn plan(&self, context: &ProvisionContext) -> Vec<(String, Vec<BtpCommand>)> {
        self.steps
            .iter()
            .map(|step| (step.name().to_string(), step.planned_commands(context)))
            .collect()
    }

    pub fn get_execution_summary(context: &ProvisionContext) -> HashMap<String, serde_json::Value> {
        let results = &context.completed;
        let mut summary = HashMap::new();

        summary.insert(
            "execution_id".to_string(),
            serde_json::Value::String(context.execution_id.clone()),
        );

        let total_duration: std::time::Duration = results.iter().map(|r| r.duration).sum();
        summary.insert(
            "total_steps".to_string(),
            serde_json::Value::Number(results.len().into()),
        );
        summary.insert(
            "total_duration_ms".to_string(),
            serde_json::Value::Number((total_duration.as_millis() as u64).into()),
        );

        let step_names: Vec<serde_json::Value> = results
            .iter()
            .map(|r| serde_json::Value::String(r.step_name.clone()))
            .collect();
        summary.insert("executed_steps".to_string(), serde_json::Value::Array(step_names));

        summary
    }
}
