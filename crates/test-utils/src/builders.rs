#![allow(dead_code)]

use std::path::Path;

use serde_json::{Map, Value};

use dagremote::dag::{StageSpec, WorkflowSpec};
use dagremote::exec::JobHandle;
use dagremote::progress::{ProgressBucket, ProgressSnapshot};
use dagremote::step::{EnvironmentSpec, ProcessSpec, PublisherSpec, StepSpec, StepState};

/// Builder for `StepSpec`.
pub struct StepSpecBuilder {
    spec: StepSpec,
}

impl StepSpecBuilder {
    pub fn command(cmd: &str) -> Self {
        Self::with_process(ProcessSpec::command(cmd))
    }

    pub fn script(script: &str, interpreter: &str) -> Self {
        Self::with_process(ProcessSpec::script(script, interpreter))
    }

    pub fn with_process(process: ProcessSpec) -> Self {
        Self {
            spec: StepSpec {
                process,
                environment: EnvironmentSpec {
                    environment_type: Some("docker-encapsulated".to_string()),
                    image: "busybox".to_string(),
                    imagetag: None,
                    resources: vec![],
                },
                publisher: PublisherSpec::default(),
            },
        }
    }

    pub fn image(mut self, image: &str, tag: &str) -> Self {
        self.spec.environment.image = image.to_string();
        self.spec.environment.imagetag = Some(tag.to_string());
        self
    }

    pub fn resource(mut self, entry: Value) -> Self {
        self.spec.environment.resources.push(entry);
        self
    }

    pub fn publisher(mut self, publisher: PublisherSpec) -> Self {
        self.spec.publisher = publisher;
        self
    }

    pub fn build(self) -> StepSpec {
        self.spec
    }
}

/// Builder for `StageSpec`.
pub struct StageBuilder {
    stage: StageSpec,
}

impl StageBuilder {
    pub fn new(name: &str, step: StepSpec) -> Self {
        Self {
            stage: StageSpec {
                name: name.to_string(),
                dependencies: vec![],
                parameters: Map::new(),
                step,
                pure_publishing: false,
            },
        }
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.stage.dependencies.push(dep.to_string());
        self
    }

    pub fn parameter(mut self, key: &str, value: Value) -> Self {
        self.stage.parameters.insert(key.to_string(), value);
        self
    }

    pub fn pure_publishing(mut self) -> Self {
        self.stage.pure_publishing = true;
        self
    }

    pub fn build(self) -> StageSpec {
        self.stage
    }
}

/// Builder for `WorkflowSpec`. `build` validates the document.
#[derive(Default)]
pub struct WorkflowSpecBuilder {
    stages: Vec<StageSpec>,
}

impl WorkflowSpecBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(mut self, stage: StageSpec) -> Self {
        self.stages.push(stage);
        self
    }

    /// Shorthand for a command stage depending on `deps`.
    pub fn command_stage(self, name: &str, cmd: &str, deps: &[&str]) -> Self {
        let mut stage = StageBuilder::new(name, StepSpecBuilder::command(cmd).build());
        for dep in deps {
            stage = stage.after(dep);
        }
        self.stage(stage.build())
    }

    pub fn build_unchecked(self) -> WorkflowSpec {
        WorkflowSpec {
            stages: self.stages,
        }
    }

    pub fn build(self) -> WorkflowSpec {
        let spec = self.build_unchecked();
        spec.validate()
            .expect("Failed to build valid workflow from builder");
        spec
    }
}

/// A snapshot with the given bucket counts and no job ids or rendering.
pub fn progress_state(
    planned: usize,
    total: usize,
    failed: usize,
    running: usize,
    finished: usize,
) -> ProgressSnapshot {
    ProgressSnapshot {
        planned: ProgressBucket::with_total(planned),
        total: ProgressBucket::with_total(total),
        failed: ProgressBucket::with_total(failed),
        running: ProgressBucket::with_total(running),
        finished: ProgressBucket::with_total(finished),
        engine_specific: Default::default(),
    }
}

/// A handle for a command step named after `job_id`, rooted in `workspace`.
pub fn job_handle(job_id: &str, workspace: &Path) -> JobHandle {
    JobHandle {
        job_id: job_id.to_string(),
        spec: StepSpecBuilder::command("echo hi").build(),
        pars: Map::new(),
        state: StepState::for_step(workspace, job_id),
    }
}
