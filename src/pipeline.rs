//! One linear pass from a [`FeatureRequest`] to a [`ValidatedResult`] or [`ClassifiedError`].
//!
//! The pipeline holds no mutable state; clones share the gateway and may run concurrently.
//! The gateway call is the only await point and the only place a deadline applies.

use std::sync::Arc;
use std::time::Duration;

use tracing::Instrument;
use uuid::Uuid;

use crate::classify::{ClassifiedError, ErrorKind};
use crate::clients::{GatewayError, HttpGateway, ModelGateway, RawModelResponse};
use crate::config::Config;
use crate::error::{Result, UnravelerError};
use crate::extract::extract_candidate;
use crate::request::{Feature, FeatureRequest, PromptSpec, RequestBuilder};
use crate::results::ValidatedResult;
use crate::schemas::validate_candidate;

const RAW_LOG_CAP: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Building,
    AwaitingModel,
    Extracting,
    Validating,
    Done,
    Failed(ErrorKind),
}

impl PipelineStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed(_))
    }

    pub fn can_transition_to(self, next: PipelineStage) -> bool {
        use PipelineStage::*;
        match (self, next) {
            (Idle, Building)
            | (Building, AwaitingModel)
            | (AwaitingModel, Extracting)
            | (Extracting, Validating)
            | (Validating, Done) => true,
            (Idle, Failed(_)) => false,
            (current, Failed(_)) => !current.is_terminal(),
            _ => false,
        }
    }
}

/// Record of a finished invocation: every stage visited plus the outcome
#[derive(Debug)]
pub struct Invocation {
    pub id: Uuid,
    pub feature: Feature,
    stages: Vec<PipelineStage>,
    outcome: std::result::Result<ValidatedResult, ClassifiedError>,
}

impl Invocation {
    /// Terminal stage (`Done` or `Failed`)
    pub fn stage(&self) -> PipelineStage {
        self.stages.last().copied().unwrap_or(PipelineStage::Idle)
    }

    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }

    pub fn outcome(&self) -> std::result::Result<&ValidatedResult, &ClassifiedError> {
        self.outcome.as_ref()
    }

    pub fn into_result(self) -> std::result::Result<ValidatedResult, ClassifiedError> {
        self.outcome
    }
}

struct StageTracker {
    stages: Vec<PipelineStage>,
}

impl StageTracker {
    fn new() -> Self {
        Self {
            stages: vec![PipelineStage::Idle],
        }
    }

    fn enter(&mut self, next: PipelineStage) {
        let current = self.stages.last().copied().unwrap_or(PipelineStage::Idle);
        debug_assert!(
            current.can_transition_to(next),
            "illegal transition {:?} -> {:?}",
            current,
            next
        );
        tracing::debug!("stage {:?} -> {:?}", current, next);
        self.stages.push(next);
    }
}

#[derive(Clone)]
pub struct Pipeline {
    builder: RequestBuilder,
    gateway: Arc<dyn ModelGateway>,
    deadline: Option<Duration>,
}

impl Pipeline {
    pub fn new(builder: RequestBuilder, gateway: Arc<dyn ModelGateway>) -> Self {
        Self {
            builder,
            gateway,
            deadline: None,
        }
    }

    /// Bound the gateway call; expiry is classified as `UpstreamError`.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let gateway = HttpGateway::from_config(config)?;
        let mut pipeline = Self::new(
            RequestBuilder::new(config.gateway.model.clone()),
            Arc::new(gateway),
        );
        if let Some(ms) = config.gateway.deadline_ms {
            pipeline = pipeline.with_deadline(Duration::from_millis(ms));
        }
        Ok(pipeline)
    }

    pub async fn run(
        &self,
        request: &FeatureRequest,
    ) -> std::result::Result<ValidatedResult, ClassifiedError> {
        self.execute(request).await.into_result()
    }

    pub async fn execute(&self, request: &FeatureRequest) -> Invocation {
        let id = Uuid::new_v4();
        let feature = request.feature();
        let span = tracing::info_span!("invocation", %id, %feature);

        async move {
            tracing::info!("invocation started");
            let mut tracker = StageTracker::new();
            let outcome = self
                .drive(request, &mut tracker)
                .await
                .map_err(ClassifiedError::from);

            match &outcome {
                Ok(_) => {
                    tracker.enter(PipelineStage::Done);
                    tracing::info!("invocation done");
                }
                Err(err) => {
                    tracker.enter(PipelineStage::Failed(err.kind));
                    tracing::warn!(
                        kind = %err.kind,
                        retryable = err.retryable,
                        "invocation failed: {}",
                        err.message
                    );
                }
            }

            Invocation {
                id,
                feature,
                stages: tracker.stages,
                outcome,
            }
        }
        .instrument(span)
        .await
    }

    async fn drive(
        &self,
        request: &FeatureRequest,
        tracker: &mut StageTracker,
    ) -> Result<ValidatedResult> {
        tracker.enter(PipelineStage::Building);
        let prompt = self.builder.build(request)?;

        tracker.enter(PipelineStage::AwaitingModel);
        let raw = self.call_gateway(&prompt).await?;
        let preview: String = raw.text.chars().take(RAW_LOG_CAP).collect();
        tracing::debug!("AI response ({} bytes): {}", raw.text.len(), preview);

        tracker.enter(PipelineStage::Extracting);
        let candidate = extract_candidate(&raw.text)?;
        tracing::debug!("candidate located via {:?}", candidate.source);

        tracker.enter(PipelineStage::Validating);
        validate_candidate(candidate.text, request.feature())
    }

    async fn call_gateway(&self, prompt: &PromptSpec) -> Result<RawModelResponse> {
        let reply = match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.gateway.complete(prompt))
                .await
                .map_err(|_| GatewayError::Timeout {
                    timeout_ms: deadline.as_millis() as u64,
                })?,
            None => self.gateway.complete(prompt).await,
        };
        reply.map_err(UnravelerError::from)
    }
}
